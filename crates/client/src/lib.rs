//! Scripts API client, shared between the edit session and the CLI.
//!
//! This crate is the single source of truth for the scripts wire contract:
//! auth, download script content, update script content, error reasons.
//!
//! No UI concepts. No retries. Blocking calls only; callers that must stay
//! responsive run them on a worker thread.

mod auth;
mod client;
mod error;

pub use auth::{AuthCredentials, auth_file_path, load_auth, save_auth, delete_auth};
pub use client::{ScriptsApi, ScriptsClient, ScriptId, DEFAULT_TIMEOUT};
pub use error::{ScriptsError, error_message, DEFAULT_ERROR_MESSAGE};
