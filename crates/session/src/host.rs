//! Capabilities a session borrows from whoever hosts the modal.

use scriptedit_client::ScriptId;

/// Immutable identifier + display name, supplied when the modal opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    pub id: ScriptId,
    pub name: String,
}

impl ScriptRef {
    pub fn new(id: ScriptId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Inbound props for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProps {
    pub script: ScriptRef,
    /// Host keeps the session alive but does not draw it.
    pub is_hidden: bool,
}

impl SessionProps {
    pub fn new(script: ScriptRef) -> Self {
        Self { script, is_hidden: false }
    }
}

/// Callbacks into the view that opened the modal.
pub trait SessionHost {
    /// Close the modal. Called once, on cancel or after a successful save.
    fn on_cancel(&mut self);

    /// Reload the calling list view after a successful save.
    /// Hosts without a list leave the default no-op.
    fn refetch_host_scripts(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

/// Transient notification sink (toast, status line).
pub trait Notifier {
    fn render_flash(&mut self, level: FlashLevel, message: &str);
}
