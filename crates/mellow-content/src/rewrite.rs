//! Rewrite orchestration. The state machine here is pure: it owns the panel
//! model and the in-flight attempt bookkeeping, while the DOM driver in
//! `lib.rs` feeds it events and mirrors its state into the page.

use async_trait::async_trait;
use mellow_protocol::RewriteRequest;

/// Result of one transform round-trip, as rendered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    SuggestedText(String),
    Failure(String),
}

/// The external transformer seam. The production implementation is the
/// background message channel; tests substitute their own.
#[async_trait(?Send)]
pub trait Transformer {
    async fn transform(&self, request: &RewriteRequest) -> RewriteOutcome;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PanelContent {
    Empty,
    Loading,
    Suggestion(String),
    Failure(String),
}

/// Observable panel state, derived from visibility plus content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase<'a> {
    Hidden,
    Loading,
    ShowingSuggestion(&'a str),
    ShowingError(&'a str),
}

/// Panel model: what the panel holds and whether it is on screen. The two
/// are separate axes so a response can land in a dismissed panel without
/// bringing it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelModel {
    visible: bool,
    content: PanelContent,
}

impl PanelModel {
    fn hidden() -> Self {
        Self {
            visible: false,
            content: PanelContent::Empty,
        }
    }

    pub fn phase(&self) -> PanelPhase<'_> {
        if !self.visible {
            return PanelPhase::Hidden;
        }
        match &self.content {
            PanelContent::Empty | PanelContent::Loading => PanelPhase::Loading,
            PanelContent::Suggestion(text) => PanelPhase::ShowingSuggestion(text),
            PanelContent::Failure(message) => PanelPhase::ShowingError(message),
        }
    }

    pub fn accept_enabled(&self) -> bool {
        matches!(self.phase(), PanelPhase::ShowingSuggestion(_))
    }
}

/// What `begin` decided to do with a trigger activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginOutcome {
    /// Draft was empty or whitespace; nothing dispatched, prompt the user.
    EmptyDraft,
    /// Attempt dispatched under this generation.
    Dispatch { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

/// Per-attempt state machine. Attempts carry a monotonically increasing
/// generation; a newer attempt supersedes an older in-flight one, whose
/// eventual resolution is dropped as stale.
#[derive(Debug)]
pub struct RewriteFlow {
    panel: PanelModel,
    next_generation: u64,
    inflight: Option<u64>,
}

impl Default for RewriteFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteFlow {
    pub fn new() -> Self {
        Self {
            panel: PanelModel::hidden(),
            next_generation: 0,
            inflight: None,
        }
    }

    pub fn panel(&self) -> &PanelModel {
        &self.panel
    }

    /// Starts an attempt for the captured draft. Empty drafts short-circuit
    /// before any channel traffic.
    pub fn begin(&mut self, draft: &str) -> BeginOutcome {
        if draft.trim().is_empty() {
            return BeginOutcome::EmptyDraft;
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.inflight = Some(generation);
        self.panel = PanelModel {
            visible: true,
            content: PanelContent::Loading,
        };
        BeginOutcome::Dispatch { generation }
    }

    /// Lands a transform resolution. Resolutions for superseded generations
    /// are dropped without touching the panel. A resolution landing after a
    /// dismiss still updates content, but visibility stays off, so nothing
    /// changes on screen.
    pub fn resolve(&mut self, generation: u64, outcome: RewriteOutcome) -> Resolution {
        if self.inflight != Some(generation) {
            return Resolution::Stale;
        }
        self.inflight = None;
        self.panel.content = match outcome {
            RewriteOutcome::SuggestedText(text) => PanelContent::Suggestion(text),
            RewriteOutcome::Failure(message) => PanelContent::Failure(message),
        };
        Resolution::Applied
    }

    /// Hides the panel. An in-flight request is not cancelled; its
    /// resolution lands in the hidden panel.
    pub fn dismiss(&mut self) {
        self.panel.visible = false;
    }

    /// Takes the suggestion for splicing back into the surface, hiding the
    /// panel. Only available while a suggestion is showing.
    pub fn accept(&mut self) -> Option<String> {
        if !self.panel.accept_enabled() {
            return None;
        }
        let PanelContent::Suggestion(text) = &self.panel.content else {
            return None;
        };
        let text = text.clone();
        self.panel.visible = false;
        Some(text)
    }
}
