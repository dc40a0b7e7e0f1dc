//! Integration tests for the winrice CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! They never run `winrice run`, which would provision the host.

mod cli_tests;
mod config_command;
