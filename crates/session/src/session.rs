//! The script edit session: fetch → edit → save → close.
//!
//! Both network calls run on a [`TaskRunner`] and report back over a channel.
//! The host drains that channel with [`ScriptEditSession::pump`] from its
//! event loop, so every state change happens on the host's thread as a
//! transition guarded on the current status. Results that arrive after the
//! session closed are dropped.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use scriptedit_client::{error_message, ScriptsApi, ScriptsError};

use crate::buffer::TextBuffer;
use crate::host::{FlashLevel, Notifier, ScriptRef, SessionHost, SessionProps};
use crate::runner::{TaskRunner, ThreadRunner};
use crate::status::{CloseReason, SessionError, SessionStatus};

pub const SAVE_SUCCESS_MESSAGE: &str = "Successfully saved script.";

/// Shown in place of the editor when the content could not be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Close this modal and try again.";

enum Completion {
    Loaded(Result<String, ScriptsError>),
    Saved(Result<(), ScriptsError>),
}

impl Completion {
    fn kind(&self) -> &'static str {
        match self {
            Completion::Loaded(_) => "load result",
            Completion::Saved(_) => "save result",
        }
    }
}

/// A worker that panicked is reported like a dropped connection.
fn aborted() -> ScriptsError {
    ScriptsError::Network("request aborted".into())
}

pub struct ScriptEditSession<H: SessionHost, N: Notifier> {
    props: SessionProps,
    status: SessionStatus,
    buffer: TextBuffer,
    remote_content: Option<String>,
    load_error: Option<String>,
    closed: Option<CloseReason>,
    refetch_after_save: bool,

    api: Arc<dyn ScriptsApi>,
    runner: Box<dyn TaskRunner>,
    host: H,
    notifier: N,

    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl<H: SessionHost, N: Notifier> ScriptEditSession<H, N> {
    /// Open the modal and start fetching the script on a background thread.
    pub fn open(props: SessionProps, api: Arc<dyn ScriptsApi>, host: H, notifier: N) -> Self {
        Self::open_with_runner(props, api, host, notifier, Box::new(ThreadRunner))
    }

    pub fn open_with_runner(
        props: SessionProps,
        api: Arc<dyn ScriptsApi>,
        host: H,
        notifier: N,
        runner: Box<dyn TaskRunner>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut session = Self {
            props,
            status: SessionStatus::Loading,
            buffer: TextBuffer::new(),
            remote_content: None,
            load_error: None,
            closed: None,
            refetch_after_save: true,
            api,
            runner,
            host,
            notifier,
            tx,
            rx,
        };

        log::debug!(
            "opening edit session for script {} ({})",
            session.props.script.id, session.props.script.name
        );
        session.start_load();
        session
    }

    /// Enable or disable the list-refresh hook after a successful save.
    pub fn set_refetch_after_save(&mut self, enabled: bool) {
        self.refetch_after_save = enabled;
    }

    fn start_load(&mut self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let id = self.props.script.id;

        let job = Box::new(move || {
            let result = catch_unwind(AssertUnwindSafe(|| api.download_script(id)))
                .unwrap_or_else(|_| Err(aborted()));
            // Receiver gone means the session was dropped; nothing to update.
            let _ = tx.send(Completion::Loaded(result));
        });

        if let Err(e) = self.runner.spawn(job) {
            log::warn!("could not start load for script {}: {}", id, e);
            self.apply(Completion::Loaded(Err(ScriptsError::Network(e))));
        }
    }

    /// Apply every completion that has arrived. Returns how many were drained.
    pub fn pump(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            drained += 1;
        }
        drained
    }

    fn apply(&mut self, completion: Completion) {
        if let Some(reason) = self.closed {
            log::debug!("ignoring {} after session closed ({:?})", completion.kind(), reason);
            return;
        }

        match (self.status, completion) {
            (SessionStatus::Loading, Completion::Loaded(Ok(content))) => {
                log::debug!("script {} loaded ({} bytes)", self.props.script.id, content.len());
                self.buffer.set_text(content.clone());
                self.remote_content = Some(content);
                self.status = SessionStatus::Ready;
            }
            (SessionStatus::Loading, Completion::Loaded(Err(e))) => {
                log::warn!("failed to load script {}: {}", self.props.script.id, e);
                self.load_error = Some(error_message(&e));
                self.status = SessionStatus::LoadError;
            }
            (SessionStatus::Submitting, Completion::Saved(Ok(()))) => {
                log::info!("saved script {} ({})", self.props.script.id, self.props.script.name);
                self.notifier.render_flash(FlashLevel::Success, SAVE_SUCCESS_MESSAGE);
                if self.refetch_after_save {
                    self.host.refetch_host_scripts();
                }
                self.close(CloseReason::Saved);
            }
            (SessionStatus::Submitting, Completion::Saved(Err(e))) => {
                log::warn!("failed to save script {}: {}", self.props.script.id, e);
                self.notifier.render_flash(FlashLevel::Error, &error_message(&e));
                self.status = SessionStatus::Ready;
            }
            (status, other) => {
                log::warn!("unexpected {} while {}", other.kind(), status);
            }
        }
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        if self.closed.is_some() {
            return Err(SessionError::Closed);
        }
        match self.status {
            SessionStatus::Ready => Ok(()),
            status => Err(SessionError::NotReady { status }),
        }
    }

    /// Replace the whole buffer. No validation.
    pub fn edit(&mut self, new_text: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_ready()?;
        let cursor = self.buffer.cursor();
        self.buffer.set_text(new_text.into());
        self.buffer.set_cursor(cursor);
        Ok(())
    }

    /// Incremental editing access (typing, cursor movement).
    pub fn buffer_mut(&mut self) -> Result<&mut TextBuffer, SessionError> {
        self.ensure_ready()?;
        Ok(&mut self.buffer)
    }

    /// Send the buffer to the server. The outcome arrives through [`pump`](Self::pump).
    pub fn save(&mut self) -> Result<(), SessionError> {
        self.ensure_ready()?;
        self.status = SessionStatus::Submitting;

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let ScriptRef { id, name } = self.props.script.clone();
        let content = self.buffer.text().to_string();
        log::debug!("saving script {} ({} bytes)", id, content.len());

        let job = Box::new(move || {
            let result = catch_unwind(AssertUnwindSafe(|| api.update_script(id, &content, &name)))
                .unwrap_or_else(|_| Err(aborted()));
            let _ = tx.send(Completion::Saved(result));
        });

        if let Err(e) = self.runner.spawn(job) {
            log::warn!("could not start save for script {}: {}", id, e);
            self.apply(Completion::Saved(Err(ScriptsError::Network(e))));
        }
        Ok(())
    }

    /// Close without saving. Allowed in every status; unsaved edits are dropped.
    pub fn cancel(&mut self) {
        if self.closed.is_some() {
            return;
        }
        log::debug!("edit session for script {} cancelled while {}", self.props.script.id, self.status);
        self.close(CloseReason::Cancelled);
    }

    fn close(&mut self, reason: CloseReason) {
        self.closed = Some(reason);
        self.host.on_cancel();
    }

    pub fn props(&self) -> &SessionProps {
        &self.props
    }

    pub fn script(&self) -> &ScriptRef {
        &self.props.script
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn content(&self) -> &str {
        self.buffer.text()
    }

    /// Server copy as fetched at open. `None` until loaded.
    pub fn remote_content(&self) -> Option<&str> {
        self.remote_content.as_deref()
    }

    /// Extracted reason for a failed load.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.remote_content
            .as_deref()
            .is_some_and(|remote| remote != self.buffer.text())
    }

    pub fn can_edit(&self) -> bool {
        self.ensure_ready().is_ok()
    }

    pub fn is_alive(&self) -> bool {
        self.closed.is_none()
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.closed
    }

    pub fn is_hidden(&self) -> bool {
        self.props.is_hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.props.is_hidden = hidden;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }
}
