//! Where blocking API calls run.

/// A unit of background work. It reports its own result back to the session.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Executes jobs off the session's thread.
///
/// `spawn` returning `Err` means the job was never started; the session then
/// fails the pending operation itself.
pub trait TaskRunner {
    fn spawn(&self, job: Job) -> Result<(), String>;
}

/// One named OS thread per job. Requests are rare (one load, a few saves),
/// so there is no pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRunner;

impl TaskRunner for ThreadRunner {
    fn spawn(&self, job: Job) -> Result<(), String> {
        std::thread::Builder::new()
            .name("scriptedit-request".into())
            .spawn(job)
            .map(|_| ())
            .map_err(|e| format!("failed to start request thread: {}", e))
    }
}
