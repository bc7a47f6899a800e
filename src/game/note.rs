use crate::game::lane::Lane;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteId(pub u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Short,
    Long,
}

/// Where a note is in its judgment lifecycle.
///
/// `Released` and `Missed` are terminal. A short note that is hit leaves the
/// store immediately, so it never shows up as anything but `Pending`,
/// `Hittable` or `Missed`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteState {
    Pending,
    Hittable,
    Held,
    Released,
    Missed,
}

impl NoteState {
    #[inline(always)]
    pub const fn is_terminal(self) -> bool {
        matches!(self, NoteState::Released | NoteState::Missed)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub lane: Lane,
    pub kind: NoteKind,
    pub position: f32,
    pub length: f32, // Zero for short notes
    pub state: NoteState,
}

impl Note {
    /// Trailing edge of the note; equal to `position` for short notes.
    #[inline(always)]
    pub fn tail(&self) -> f32 {
        self.position - self.length
    }

    /// True while the head has reached `line` and the tail has not passed it.
    #[inline(always)]
    pub fn spans(&self, line: f32) -> bool {
        self.position >= line && self.tail() <= line
    }

    #[inline(always)]
    pub fn is_being_held(&self) -> bool {
        self.state == NoteState::Held
    }
}
