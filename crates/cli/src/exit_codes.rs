//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success (saved, cancelled, printed)      |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad id)       |
//! | 40-49   | scripts          | Scripts API and edit session codes       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `scripts_exit_code` or the command's error handling

use scriptedit_client::ScriptsError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
/// `edit` also exits 0 when the user cancels.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (terminal setup, file I/O).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Scripts (40-49)
// =============================================================================

/// Not authenticated (no saved token).
pub const EXIT_NOT_AUTH: u8 = 40;

/// Network failure talking to the scripts API.
pub const EXIT_NETWORK: u8 = 41;

/// No script with the requested id.
pub const EXIT_NOT_FOUND: u8 = 42;

/// Server rejected the request (validation, permission, other HTTP status).
pub const EXIT_REJECTED: u8 = 43;

/// The edit session closed on a load error.
pub const EXIT_LOAD_FAILED: u8 = 44;

/// Map a ScriptsError to its exit code.
pub fn scripts_exit_code(err: &ScriptsError) -> u8 {
    match err {
        ScriptsError::NotAuthenticated => EXIT_NOT_AUTH,
        ScriptsError::Network(_) => EXIT_NETWORK,
        ScriptsError::NotFound(_) => EXIT_NOT_FOUND,
        ScriptsError::Validation(_)
        | ScriptsError::Unauthorized(_)
        | ScriptsError::Http(_, _) => EXIT_REJECTED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_codes_are_in_range() {
        let errors = [
            ScriptsError::NotAuthenticated,
            ScriptsError::Network("refused".into()),
            ScriptsError::NotFound(1),
            ScriptsError::Validation(String::new()),
            ScriptsError::Unauthorized(String::new()),
            ScriptsError::Http(500, String::new()),
        ];
        for err in &errors {
            let code = scripts_exit_code(err);
            assert!((40..50).contains(&code), "{:?} -> {}", err, code);
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE,
            EXIT_NOT_AUTH, EXIT_NETWORK, EXIT_NOT_FOUND, EXIT_REJECTED, EXIT_LOAD_FAILED,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
