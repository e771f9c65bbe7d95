use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Prompt shown in interactive mode.
const PROMPT: &str = "⤑ ";

#[derive(Parser, Debug)]
#[command(
    name = "dly",
    about = "Add a line to today's daily note",
    version
)]
pub struct Cli {
    /// Text to add, passed as a single argument
    #[arg(long = "quotedText", value_name = "TEXT", conflicts_with = "words")]
    pub quoted_text: Option<String>,

    /// Directory holding dly.yml (defaults to ~/.config/dly)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Text to add; words are joined with single spaces
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub words: Vec<String>,
}

impl Cli {
    /// Text given on the command line, `None` when interactive input is
    /// needed.
    pub fn inline_text(&self) -> Option<String> {
        if let Some(text) = &self.quoted_text {
            return Some(text.clone());
        }
        if self.words.is_empty() {
            None
        } else {
            Some(self.words.join(" "))
        }
    }

    /// Inline text, or one line read interactively from stdin.
    pub fn text_to_add(&self) -> io::Result<String> {
        match self.inline_text() {
            Some(text) => Ok(text),
            None => prompt_line(&mut io::stdin().lock(), &mut io::stdout()),
        }
    }
}

fn prompt_line(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<String> {
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

#[cfg(test)]
mod tests {
    use super::{prompt_line, Cli, PROMPT};
    use clap::Parser;

    #[test]
    fn words_are_joined_with_spaces() {
        let cli = Cli::try_parse_from(["dly", "standup", "done"]).unwrap();
        assert_eq!(cli.inline_text().as_deref(), Some("standup done"));
    }

    #[test]
    fn quoted_text_is_used_verbatim() {
        let cli = Cli::try_parse_from(["dly", "--quotedText", "a  b"]).unwrap();
        assert_eq!(cli.inline_text().as_deref(), Some("a  b"));
    }

    #[test]
    fn dashed_words_are_kept() {
        let cli = Cli::try_parse_from(["dly", "fix", "-", "done"]).unwrap();
        assert_eq!(cli.inline_text().as_deref(), Some("fix - done"));
    }

    #[test]
    fn no_arguments_means_interactive() {
        let cli = Cli::try_parse_from(["dly"]).unwrap();
        assert_eq!(cli.inline_text(), None);
    }

    #[test]
    fn prompt_reads_one_line_without_terminator() {
        let mut input = "typed text\r\nignored\n".as_bytes();
        let mut output = Vec::new();
        let line = prompt_line(&mut input, &mut output).unwrap();
        assert_eq!(line, "typed text");
        assert_eq!(output, PROMPT.as_bytes());
    }
}
