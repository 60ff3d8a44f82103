// src/progress.rs
/// Lightweight progress reporting for the collection loop.
/// Frontends implement this to surface status; every hook defaults to a no-op.
pub trait Progress {
    /// Called once the page is ready, with the target item count.
    fn begin(&mut self, _target: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A new unique item was recorded.
    fn item_found(&mut self, _rank: usize, _link: &str) {}

    /// One read/extract round completed.
    fn round_done(&mut self, _round: usize, _collected: usize, _stagnant: usize) {}

    /// Called at the end with the final count.
    fn finish(&mut self, _collected: usize) {}
}

/// Progress sink that writes to the debug log; what the CLI uses.
pub struct LogProgress;

impl Progress for LogProgress {
    fn begin(&mut self, target: usize) {
        logf!("Collect: page ready, target={target}");
    }
    fn log(&mut self, msg: &str) {
        logf!("{msg}");
    }
    fn round_done(&mut self, round: usize, collected: usize, stagnant: usize) {
        logd!("Collect: round={round} collected={collected} stagnant={stagnant}");
    }
    fn finish(&mut self, collected: usize) {
        logf!("Collect: done, collected={collected}");
    }
}
