//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Client Defaults
// =============================================================================

pub fn default_prefix() -> String {
    "!".to_string()
}

// =============================================================================
// Argument Defaults
// =============================================================================

/// Seconds to wait for an answer to an argument prompt.
pub fn default_wait_secs() -> u64 {
    30
}

// =============================================================================
// Settings Defaults
// =============================================================================

pub fn default_settings_path() -> String {
    "settings.db".to_string()
}
