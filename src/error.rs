//! Error types for presence calculus operations
//!
//! Only caller contract violations are errors. Degenerate windows resolve to
//! zero-valued metrics, unmappable presences are dropped from the matrix, and
//! joins across covers return `None`.

use thiserror::Error;

/// Errors raised by timescale, presence, and window query operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PresenceError {
    #[error(
        "Window [{t0}, {t1}) is outside the timescale range [{timescale_t0}, {timescale_t1}]"
    )]
    OutOfRangeWindow {
        t0: f64,
        t1: f64,
        timescale_t0: f64,
        timescale_t1: f64,
    },

    #[error("Invalid timescale: t0={t0}, t1={t1}, bin_width={bin_width} ({reason})")]
    InvalidTimescale {
        t0: f64,
        t1: f64,
        bin_width: f64,
        reason: &'static str,
    },

    #[error("Invalid presence [{start}, {end}): {reason}")]
    InvalidPresence {
        start: f64,
        end: f64,
        reason: &'static str,
    },

    #[error("Exit of element '{element}' from boundary '{boundary}' at {time} has no open entry")]
    UnmatchedExit {
        element: String,
        boundary: String,
        time: f64,
    },

    #[error(
        "Element '{element}' entered boundary '{boundary}' at {time} while already present since {open_since}"
    )]
    DuplicateEntry {
        element: String,
        boundary: String,
        time: f64,
        open_since: f64,
    },
}

/// Result type for presence calculus operations
pub type Result<T> = std::result::Result<T, PresenceError>;
