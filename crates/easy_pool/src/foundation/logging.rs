//! Logging utilities and structured logging support
//!
//! The pool reports every non-fatal condition through the `log` facade.
//! Hosts decide where it goes; binaries and tests can call [`init`].

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize logging for tests, ignoring repeated initialization
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
