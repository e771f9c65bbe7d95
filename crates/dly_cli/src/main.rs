//! `dly` command line entry point.
//!
//! # Responsibility
//! - Wire configuration, input and the append service together.
//! - Map outcomes to exit status: 0 success, 1 failure, 2 default
//!   configuration created.

mod cli;
mod update;

use chrono::Local;
use clap::Parser;
use cli::Cli;
use dly_core::config::CONFIG_FILE_NAME;
use dly_core::notify::{notifier_for, RELEASES_URL};
use dly_core::{
    default_config_dir, init_logging, load_config, logging_status, AppendService,
    AppendSettings, ConfigLoad, FsNoteStore, LoggingOptions, Notifier,
};
use log::{error, info, warn};
use std::process::ExitCode;
use std::time::Duration;

const RELEASE_WAIT: Duration = Duration::from_secs(2);
const RELEASE_WAIT_DEBUG: Duration = Duration::from_secs(6);

/// Exit status after writing a default configuration file.
const EXIT_CONFIG_CREATED: u8 = 2;

fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(err) = LoggingOptions::from_env().and_then(|options| init_logging(&options)) {
        eprintln!("cannot initialize logging: {err}");
    }

    let config_dir = match &args.config_dir {
        Some(dir) => dir.clone(),
        None => match default_config_dir() {
            Ok(dir) => dir,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
    };
    let config = match load_config(&config_dir) {
        Ok(ConfigLoad::Loaded(config)) => config,
        Ok(ConfigLoad::Created(path)) => {
            info!(
                "minimal config file created at {}, you MUST now edit it to at least set the path to daily notes",
                path.display()
            );
            return ExitCode::from(EXIT_CONFIG_CREATED);
        }
        Err(err) => {
            error!("cannot use {CONFIG_FILE_NAME}: {err}");
            return ExitCode::FAILURE;
        }
    };
    if config.resolved_hashtag().from_legacy_keys {
        warn!("the configuration parameter AddHashtag is deprecated and will be removed in a future version. Use AppendHashtag instead");
    }

    let release_check = update::spawn_check();

    let text = match args.text_to_add() {
        Ok(text) => text,
        Err(err) => {
            error!("cannot read the text to add: {err}");
            return ExitCode::FAILURE;
        }
    };

    let service = AppendService::new(
        FsNoteStore::new(config.backup_locations()),
        notifier_for(config.show_notification_on_success),
        AppendSettings::from_config(&config),
    );
    // The service already logged the failure details.
    if service.append(&text, Local::now().naive_local()).is_err() {
        return ExitCode::FAILURE;
    }

    if let Some(check) = release_check {
        let debug_enabled = logging_status().is_some_and(|options| options.level == "debug");
        let wait = if debug_enabled {
            RELEASE_WAIT_DEBUG
        } else {
            RELEASE_WAIT
        };
        if let Some(release) = check.wait(wait) {
            warn!("new version {} available at {RELEASES_URL}", release.name);
            notifier_for(config.show_notification_on_new_version).new_version(&release.name);
        }
    }

    ExitCode::SUCCESS
}
