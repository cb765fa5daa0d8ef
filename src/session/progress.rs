/// Reported when asset loading starts.
pub const LOAD_STARTED: f64 = 5.0;
/// Reported once every asset task has joined.
pub const ASSETS_LOADED: f64 = 25.0;
/// Reported once the mix graph and muxer inputs are ready.
pub const STREAMS_READY: f64 = 30.0;
/// Share of the scale covered by frame rendering.
pub const RENDER_SPAN: f64 = 65.0;
/// Reported after the artifact is finalized.
pub const COMPLETE: f64 = 100.0;

/// Progress after `frames_done` of `total_frames` frames were handed to the encoder.
pub fn render_percent(frames_done: u64, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return STREAMS_READY;
    }
    let done = frames_done.min(total_frames) as f64;
    STREAMS_READY + RENDER_SPAN * done / total_frames as f64
}

/// Forwards progress to a callback, clamped to `[0, 100]` and strictly increasing.
///
/// Values at or below the last forwarded one are dropped, so observers never see progress go
/// backwards or repeat.
pub struct ProgressReporter<'a> {
    callback: Box<dyn FnMut(f64) + 'a>,
    last: Option<f64>,
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl<'a> ProgressReporter<'a> {
    /// Wrap `callback`.
    pub fn new(callback: impl FnMut(f64) + 'a) -> Self {
        Self {
            callback: Box::new(callback),
            last: None,
        }
    }

    /// Reporter that discards every value.
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    /// Forward `value` if it advances progress. Returns `true` when forwarded.
    pub fn report(&mut self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        let value = value.clamp(0.0, COMPLETE);
        if self.last.is_some_and(|last| value <= last) {
            return false;
        }
        self.last = Some(value);
        tracing::trace!(progress = value, "progress");
        (self.callback)(value);
        true
    }

    /// Last forwarded value.
    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/progress.rs"]
mod tests;
