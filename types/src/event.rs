//! Lifecycle events emitted by the engine.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Progress,
    Tick,
    Lock,
    Complete,
    Render,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Progress,
        EventKind::Tick,
        EventKind::Lock,
        EventKind::Complete,
        EventKind::Render,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::Tick => "tick",
            Self::Lock => "lock",
            Self::Complete => "complete",
            Self::Render => "render",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecryptEvent {
    /// Completion fraction in `[0, 1]`.
    Progress(f64),
    /// Scramble tick count for the current run.
    Tick(u64),
    /// A dynamic slot committed: absolute index and final character.
    Lock { index: usize, ch: char },
    /// The resolved code.
    Complete(String),
    /// The full display string.
    Render(String),
}

impl DecryptEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Progress(_) => EventKind::Progress,
            Self::Tick(_) => EventKind::Tick,
            Self::Lock { .. } => EventKind::Lock,
            Self::Complete(_) => EventKind::Complete,
            Self::Render(_) => EventKind::Render,
        }
    }
}
