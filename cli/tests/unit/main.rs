//! Unit tests for the winrice CLI
//!
//! These tests use a fake host and run fast without external I/O.

mod environment_adapter;
mod pipeline_service;
