// src/constants.rs
//! Domain constants that define where the tool keeps its state and how it
//! talks about itself.

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Environment variable overriding the state directory.
pub const STATE_DIR_ENV: &str = "JUPITER_STATE_DIR";

/// State directory used when neither `--state-dir` nor the environment
/// names one. Relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = ".jupiter";

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log file name, created in the system temp dir.
pub const LOG_FILE_NAME: &str = "jupiter_sync.log";
