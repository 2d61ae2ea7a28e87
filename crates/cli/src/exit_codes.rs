//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                               |
//! |---------|-----------|-------------------------------------------|
//! | 0       | Universal | Success                                   |
//! | 2       | Universal | CLI usage error (bad args, missing file)  |
//! | 10-19   | run       | Reconciliation run codes                  |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, undetectable input files.
pub const EXIT_USAGE: u8 = 2;

/// Matching config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 10;

/// A required input file is missing or unreadable.
pub const EXIT_MISSING_INPUT: u8 = 11;

/// Runtime failure: malformed input data or an output write error.
pub const EXIT_RUNTIME: u8 = 12;
