use super::row_kind::RowKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPhase {
    Idle,
    InHeader,
    InBody,
}

/// What the stitcher should do with a freshly classified row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Skip,
    Regular(RowKind),
    /// The row continues the row before the header, processed as that kind.
    Continuation(RowKind),
}

/// The two most recent row kinds, newest first.
///
/// | phase    | observed kind | next phase |
/// |----------|---------------|------------|
/// | Idle     | Header        | InHeader   |
/// | Idle     | other         | InBody     |
/// | InHeader | Header        | InHeader   |
/// | InHeader | other         | InBody     |
/// | InBody   | Header        | InHeader   |
/// | InBody   | other         | InBody     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKindMemory {
    recent: [RowKind; 2],
    observed: usize,
}

impl Default for RowKindMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl RowKindMemory {
    pub fn new() -> Self {
        Self {
            recent: [RowKind::Empty, RowKind::Empty],
            observed: 0,
        }
    }

    pub fn phase(&self) -> MemoryPhase {
        if self.observed == 0 {
            MemoryPhase::Idle
        } else if self.recent[0] == RowKind::Header {
            MemoryPhase::InHeader
        } else {
            MemoryPhase::InBody
        }
    }

    pub fn observe(&mut self, kind: RowKind) {
        self.recent = [kind, self.recent[0]];
        self.observed += 1;
    }

    pub fn dispatch(&self, kind: RowKind) -> Dispatch {
        match (kind, self.phase()) {
            (RowKind::Header, _) => Dispatch::Skip,
            (RowKind::Empty, MemoryPhase::InHeader) => Dispatch::Continuation(self.recent[1]),
            (kind, _) => Dispatch::Regular(kind),
        }
    }
}
