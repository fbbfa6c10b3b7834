//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (duplicates found is still success)          |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments, unknown tab filter)      |
//! | 3    | Store I/O (dataset missing, read/write failure)      |
//! | 4    | Duplicate report could not be parsed                 |
//! | 5    | Permission denied by the store                       |
//! | 6    | Settings file missing or invalid                     |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Store failure: dataset or tab not found, I/O error, retries exhausted.
pub const EXIT_STORE: u8 = 3;

/// Duplicate report file unreadable or missing required columns.
pub const EXIT_REPORT_PARSE: u8 = 4;

/// Store refused access (credentials, file permissions).
pub const EXIT_PERMISSION: u8 = 5;

/// Settings file unreadable or invalid.
pub const EXIT_CONFIG: u8 = 6;
