/// Progress events emitted by the Monte Carlo run loop.
#[derive(Debug, Clone)]
pub enum Progress {
    /// The run loop starts; `total_steps` Monte Carlo steps will follow.
    RunStart { total_steps: u64 },
    /// One Monte Carlo step (a full sweep of proposals) completed.
    StepCompleted,
    /// The run loop finished.
    RunFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Callback-style progress reporting, so the library never draws a
/// progress bar itself; the CLI wires this to indicatif.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
