//! Logging utilities.
//!
//! This module centralizes logger initialization. Library code only uses the
//! `log` facade; `env_logger` is installed by hosts and tests.

mod init;

pub use init::{init_logging, init_test_logging, LoggingConfig};
