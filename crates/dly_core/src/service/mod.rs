//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate load, format, merge and persist into one append operation.
//! - Own all logging of the append flow, so merge and writer stay pure.

pub mod append_service;
