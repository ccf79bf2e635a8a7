use std::fmt;

/// Coarse stage of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPhase {
    WritingTable,
    RewritingSource,
}

impl fmt::Display for CommitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitPhase::WritingTable => write!(f, "writing table"),
            CommitPhase::RewritingSource => write!(f, "rewriting source"),
        }
    }
}

/// Receives commit progress. Commits cannot be cancelled from here.
pub trait ProgressSink {
    fn on_phase(&mut self, phase: CommitPhase);

    /// Called once per occurrence; `current` is 1-based, `label` is the file name.
    fn on_progress(&mut self, current: usize, total: usize, label: &str);
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_phase(&mut self, _: CommitPhase) {}

    fn on_progress(&mut self, _: usize, _: usize, _: &str) {}
}
