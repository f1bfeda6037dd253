//! jobsub-cli library: command handlers exposed for tests.

pub mod app;
pub mod commands;
