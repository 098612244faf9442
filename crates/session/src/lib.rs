//! Edit-script modal session.
//!
//! Opens on a script, fetches its content, lets the user edit it as plain
//! text, and saves it back. Rendering is the host's job: this crate only
//! owns the state machine, the text buffer, and the two request workers.

mod buffer;
mod host;
mod runner;
mod session;
mod status;

pub use buffer::TextBuffer;
pub use host::{FlashLevel, Notifier, ScriptRef, SessionHost, SessionProps};
pub use runner::{Job, TaskRunner, ThreadRunner};
pub use session::{ScriptEditSession, LOAD_ERROR_MESSAGE, SAVE_SUCCESS_MESSAGE};
pub use status::{CloseReason, SessionError, SessionStatus};

/// Guidance shown under the editor.
pub const HELP_TEXT: &str = "To run this script on a host, go to the Hosts page and select a host. \
To run the script across multiple hosts, add a policy automation on the Policies page.";
