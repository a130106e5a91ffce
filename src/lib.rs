//! gradebook: course, student and grade records in a SQLite database.
//!
//! Layers, leaf first:
//! - [`domain`]: records and grade parsing
//! - [`infrastructure`]: table layout, SQLite store, service wiring
//! - [`application`]: the gradebook service
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
