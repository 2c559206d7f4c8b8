//! CivicReport shared infrastructure.
//!
//! Currently holds the logging bootstrap used by every binary.

pub mod logging;
