//! Overlap-trim reconciliation of streamed frames.
//!
//! The agent does not promise pure deltas: a frame may restate some tail of
//! what it already sent before continuing. Each frame is compared against the
//! previous *raw* frame and only the unseen suffix is kept.
//!
//! The overlap search only considers prefixes up to half the new frame's
//! length. An overlap longer than that is not trimmed unless the frame is an
//! exact restatement of the previous one.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationState {
    pub previous_raw_frame_text: String,
    pub accumulated_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Streaming,
    Terminated,
}

/// Returns the part of `new` that is not already covered by the end of
/// `previous`.
pub fn trim_overlap<'a>(previous: &str, new: &'a str) -> &'a str {
    if new.is_empty() || new == previous {
        return "";
    }
    if previous.is_empty() {
        return new;
    }

    let max_overlap = new.chars().count() / 2;
    // Byte offsets just past the 1st, 2nd, ... max_overlap-th character.
    let prefix_ends: Vec<usize> = new
        .char_indices()
        .skip(1)
        .take(max_overlap)
        .map(|(idx, _)| idx)
        .collect();

    for &end in prefix_ends.iter().rev() {
        if previous.ends_with(&new[..end]) {
            return &new[end..];
        }
    }
    new
}

#[derive(Debug)]
pub struct Reconciler {
    state: ReconciliationState,
    phase: Phase,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            state: ReconciliationState::default(),
            phase: Phase::Streaming,
        }
    }

    /// Reconciles one frame's raw `chunk` text. Returns the non-empty delta
    /// that was appended, if any.
    pub fn apply<'a>(&mut self, raw: &'a str) -> Option<&'a str> {
        if self.phase == Phase::Terminated || raw.is_empty() {
            return None;
        }

        let delta = trim_overlap(&self.state.previous_raw_frame_text, raw);
        self.state.accumulated_text.push_str(delta);
        self.state.previous_raw_frame_text.clear();
        self.state.previous_raw_frame_text.push_str(raw);

        (!delta.is_empty()).then_some(delta)
    }

    pub fn terminate(&mut self) {
        self.phase = Phase::Terminated;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    pub fn state(&self) -> &ReconciliationState {
        &self.state
    }

    pub fn accumulated_text(&self) -> &str {
        &self.state.accumulated_text
    }

    pub fn into_accumulated_text(self) -> String {
        self.state.accumulated_text
    }
}
