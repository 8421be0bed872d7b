//! Progress reporting for the synthesis stage.

/// Receives progress notifications from the orchestrator.
///
/// Observers only watch; they never influence which units succeed.
pub trait ProgressObserver: Send + Sync {
    /// Called once before the first unit with the number of units.
    fn on_start(&self, _total: usize) {}

    /// Called after every attempted unit.
    fn on_unit(&self, attempted: usize, total: usize, index: usize, succeeded: bool);

    /// Called once after the last unit, or on cancellation.
    fn on_finish(&self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_unit(&self, _attempted: usize, _total: usize, _index: usize, _succeeded: bool) {}
}

/// Terminal progress bar on stderr.
#[cfg(feature = "cli")]
pub struct ProgressBarObserver {
    bar: indicatif::ProgressBar,
}

#[cfg(feature = "cli")]
impl ProgressBarObserver {
    pub fn new() -> Self {
        let bar = indicatif::ProgressBar::hidden();
        // Fall back to the default style if the template is rejected.
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} units ({eta}) {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }
}

#[cfg(feature = "cli")]
impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "cli")]
impl ProgressObserver for ProgressBarObserver {
    fn on_start(&self, total: usize) {
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.set_length(total as u64);
    }

    fn on_unit(&self, attempted: usize, _total: usize, index: usize, succeeded: bool) {
        if !succeeded {
            self.bar.set_message(format!("unit {} skipped", index));
        }
        self.bar.set_position(attempted as u64);
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}
