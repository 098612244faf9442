//! Session status, close reasons, and rejected-operation errors.

/// Where an open session is in its load/edit/save lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Content fetch in flight; progress indicator shown.
    Loading,
    /// Content fetch failed. Terminal: only cancel is available.
    LoadError,
    /// Content loaded; buffer is editable and savable.
    Ready,
    /// Save request in flight.
    Submitting,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Loading => "loading",
            SessionStatus::LoadError => "load error",
            SessionStatus::Ready => "ready",
            SessionStatus::Submitting => "submitting",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a session closed. The status at close time is kept alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// User dismissed the modal (any status).
    Cancelled,
    /// Save succeeded.
    Saved,
}

/// An operation the current status does not allow. Nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Edit or save attempted outside `Ready`.
    NotReady { status: SessionStatus },
    /// The session already closed.
    Closed,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotReady { status } => write!(f, "script is not editable while {}", status),
            SessionError::Closed => write!(f, "edit session is closed"),
        }
    }
}

impl std::error::Error for SessionError {}
