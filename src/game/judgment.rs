use crate::game::note::{Note, NoteKind, NoteState};
use serde::Serialize;

pub const HIT_SCORE: u64 = 100;
pub const HOLD_TICK_SCORE: u64 = 1;

/// Symmetric band around the hit line inside which a note can be struck.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitWindow {
    pub line: f32,
    pub tolerance: f32,
}

impl HitWindow {
    #[inline(always)]
    pub fn contains(&self, position: f32) -> bool {
        (position - self.line).abs() < self.tolerance
    }

    /// The head has moved beyond the far edge of the window.
    #[inline(always)]
    pub fn passed(&self, position: f32) -> bool {
        position > self.line + self.tolerance
    }

    /// Whether a key-down on the note's lane would engage this note.
    pub fn accepts_press(&self, note: &Note) -> bool {
        matches!(note.state, NoteState::Pending | NoteState::Hittable) && self.contains(note.position)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stimulus {
    /// Once per frame, after the note has advanced.
    Tick,
    Press,
    Release,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissCause {
    /// Scrolled past the window without being played.
    Passed,
    /// A held long note let go after the head left the window.
    ReleasedLate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    None,
    Hit,
    HoldStarted,
    HoldTick,
    HoldReleased,
    HoldCompleted,
    Missed(MissCause),
}

pub fn points_for(verdict: Verdict) -> u64 {
    match verdict {
        Verdict::Hit | Verdict::HoldStarted => HIT_SCORE,
        Verdict::HoldTick => HOLD_TICK_SCORE,
        Verdict::None
        | Verdict::HoldReleased
        | Verdict::HoldCompleted
        | Verdict::Missed(_) => 0,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: NoteState,
    pub verdict: Verdict,
}

impl Transition {
    const fn stay(state: NoteState) -> Self {
        Transition { state, verdict: Verdict::None }
    }

    const fn to(state: NoteState, verdict: Verdict) -> Self {
        Transition { state, verdict }
    }
}

/// Next state of `note` under `stimulus`. Pure: the caller applies the state
/// and acts on the verdict (scoring, removal, hold bookkeeping).
pub fn step(note: &Note, stimulus: Stimulus, window: &HitWindow) -> Transition {
    let state = note.state;
    if state.is_terminal() {
        return Transition::stay(state);
    }
    match stimulus {
        Stimulus::Tick => tick(note, window),
        Stimulus::Press => {
            if !window.accepts_press(note) {
                return Transition::stay(state);
            }
            match note.kind {
                // The short note is gone after this; the state is never stored.
                NoteKind::Short => Transition::to(NoteState::Hittable, Verdict::Hit),
                NoteKind::Long => Transition::to(NoteState::Held, Verdict::HoldStarted),
            }
        }
        Stimulus::Release => {
            if state != NoteState::Held {
                return Transition::stay(state);
            }
            if window.passed(note.position) {
                Transition::to(NoteState::Missed, Verdict::Missed(MissCause::ReleasedLate))
            } else {
                Transition::to(NoteState::Released, Verdict::HoldReleased)
            }
        }
    }
}

fn tick(note: &Note, window: &HitWindow) -> Transition {
    match note.state {
        NoteState::Pending | NoteState::Hittable => {
            if window.passed(note.position) {
                Transition::to(NoteState::Missed, Verdict::Missed(MissCause::Passed))
            } else if window.contains(note.position) {
                Transition::stay(NoteState::Hittable)
            } else {
                Transition::stay(note.state)
            }
        }
        NoteState::Held => {
            if note.tail() > window.line {
                Transition::to(NoteState::Released, Verdict::HoldCompleted)
            } else if note.spans(window.line) {
                Transition::to(NoteState::Held, Verdict::HoldTick)
            } else {
                Transition::stay(NoteState::Held)
            }
        }
        NoteState::Released | NoteState::Missed => Transition::stay(note.state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::lane::Lane;
    use crate::game::note::NoteId;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const WINDOW: HitWindow = HitWindow { line: 10.0, tolerance: 1.0 };

    fn note(kind: NoteKind, position: f32, length: f32, state: NoteState) -> Note {
        Note { id: NoteId(1), lane: Lane::J, kind, position, length, state }
    }

    #[test_case(9.5, true; "just before the line")]
    #[test_case(10.0, true; "on the line")]
    #[test_case(10.99, true; "near far edge")]
    #[test_case(11.0, false; "far edge is exclusive")]
    #[test_case(9.0, false; "near edge is exclusive")]
    #[test_case(-22.5, false; "at spawn")]
    fn window_bounds(position: f32, expected: bool) {
        assert_eq!(expected, WINDOW.contains(position));
    }

    #[test]
    fn pressing_a_short_note_in_window_hits() {
        let n = note(NoteKind::Short, 10.0, 0.0, NoteState::Hittable);
        assert_eq!(Verdict::Hit, step(&n, Stimulus::Press, &WINDOW).verdict);
        assert_eq!(HIT_SCORE, points_for(Verdict::Hit));
    }

    #[test]
    fn pressing_a_long_note_in_window_starts_a_hold() {
        let n = note(NoteKind::Long, 10.2, 6.0, NoteState::Hittable);
        assert_eq!(
            Transition::to(NoteState::Held, Verdict::HoldStarted),
            step(&n, Stimulus::Press, &WINDOW)
        );
    }

    #[test_case(NoteState::Missed; "missed")]
    #[test_case(NoteState::Held; "already held")]
    #[test_case(NoteState::Released; "released")]
    fn press_ignores_notes_out_of_play(state: NoteState) {
        let n = note(NoteKind::Long, 10.0, 6.0, state);
        assert_eq!(Transition::stay(state), step(&n, Stimulus::Press, &WINDOW));
    }

    #[test]
    fn press_outside_window_is_a_no_op() {
        let n = note(NoteKind::Short, 5.0, 0.0, NoteState::Pending);
        assert_eq!(Transition::stay(NoteState::Pending), step(&n, Stimulus::Press, &WINDOW));
    }

    #[test]
    fn pending_note_becomes_hittable_inside_window() {
        let n = note(NoteKind::Short, 9.2, 0.0, NoteState::Pending);
        assert_eq!(NoteState::Hittable, step(&n, Stimulus::Tick, &WINDOW).state);
    }

    #[test_case(NoteKind::Short, 0.0)]
    #[test_case(NoteKind::Long, 7.0)]
    fn unplayed_note_is_missed_once_past_window(kind: NoteKind, length: f32) {
        let n = note(kind, 11.2, length, NoteState::Hittable);
        let t = step(&n, Stimulus::Tick, &WINDOW);
        assert_eq!(Transition::to(NoteState::Missed, Verdict::Missed(MissCause::Passed)), t);

        // Missed stays missed and reports nothing further.
        let later = Note { state: t.state, position: 20.0, ..n };
        assert_eq!(Transition::stay(NoteState::Missed), step(&later, Stimulus::Tick, &WINDOW));
    }

    #[test_case(10.0, Verdict::HoldTick; "head on the line")]
    #[test_case(15.9, Verdict::HoldTick; "tail almost at the line")]
    #[test_case(9.6, Verdict::None; "head not yet at the line")]
    fn held_note_scores_while_spanning(position: f32, expected: Verdict) {
        let n = note(NoteKind::Long, position, 6.0, NoteState::Held);
        assert_eq!(expected, step(&n, Stimulus::Tick, &WINDOW).verdict);
    }

    #[test]
    fn held_note_completes_when_tail_passes() {
        let n = note(NoteKind::Long, 16.2, 6.0, NoteState::Held);
        assert_eq!(
            Transition::to(NoteState::Released, Verdict::HoldCompleted),
            step(&n, Stimulus::Tick, &WINDOW)
        );
    }

    #[test_case(9.5, Transition::to(NoteState::Released, Verdict::HoldReleased); "before the line")]
    #[test_case(10.6, Transition::to(NoteState::Released, Verdict::HoldReleased); "inside window")]
    #[test_case(11.0, Transition::to(NoteState::Released, Verdict::HoldReleased); "exactly at far edge")]
    #[test_case(11.4, Transition::to(NoteState::Missed, Verdict::Missed(MissCause::ReleasedLate)); "too late")]
    fn release_judges_by_head_position(position: f32, expected: Transition) {
        let n = note(NoteKind::Long, position, 6.0, NoteState::Held);
        assert_eq!(expected, step(&n, Stimulus::Release, &WINDOW));
    }

    #[test]
    fn released_note_is_never_missed_later() {
        let n = note(NoteKind::Long, 14.0, 6.0, NoteState::Released);
        assert_eq!(Transition::stay(NoteState::Released), step(&n, Stimulus::Tick, &WINDOW));
    }

    #[test]
    fn release_without_hold_is_a_no_op() {
        let n = note(NoteKind::Long, 10.4, 6.0, NoteState::Hittable);
        assert_eq!(Transition::stay(NoteState::Hittable), step(&n, Stimulus::Release, &WINDOW));
    }
}
