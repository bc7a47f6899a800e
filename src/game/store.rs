use crate::game::judgment::HitWindow;
use crate::game::lane::Lane;
use crate::game::note::{Note, NoteId, NoteKind, NoteState};

/// Owns every live note, in spawn order.
#[derive(Debug, Clone)]
pub struct NoteStore {
    notes: Vec<Note>,
    next_id: u64,
    spawn_position: f32,
}

impl NoteStore {
    pub fn new(spawn_position: f32) -> Self {
        Self {
            notes: Vec::new(),
            next_id: 0,
            spawn_position,
        }
    }

    /// Places a new note at the top of the track.
    pub fn spawn(&mut self, lane: Lane, kind: NoteKind, length: f32) -> NoteId {
        self.insert_at(lane, kind, length, self.spawn_position)
    }

    /// Places a new note anywhere on the track. Short notes always get a
    /// zero length.
    pub fn insert_at(&mut self, lane: Lane, kind: NoteKind, length: f32, position: f32) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        let length = match kind {
            NoteKind::Short => 0.0,
            NoteKind::Long => length.max(0.0),
        };
        self.notes.push(Note {
            id,
            lane,
            kind,
            position,
            length,
            state: NoteState::Pending,
        });
        id
    }

    /// Moves every note forward by `delta`. Negative deltas are ignored so
    /// positions never go back.
    pub fn advance(&mut self, delta: f32) {
        let delta = delta.max(0.0);
        for note in &mut self.notes {
            note.position += delta;
        }
    }

    pub fn remove(&mut self, id: NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(index))
    }

    /// Drops every note whose trailing edge is beyond `exit_threshold` and
    /// returns them in store order.
    pub fn cull(&mut self, exit_threshold: f32) -> Vec<Note> {
        let (gone, kept): (Vec<Note>, Vec<Note>) = std::mem::take(&mut self.notes)
            .into_iter()
            .partition(|n| n.tail() > exit_threshold);
        self.notes = kept;
        gone
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Note> {
        self.notes.iter_mut()
    }

    pub fn in_lane(&self, lane: Lane) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(move |n| n.lane == lane)
    }

    pub fn of_kind(&self, kind: NoteKind) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(move |n| n.kind == kind)
    }

    /// First note in store order that a key-down on `lane` would engage.
    pub fn first_press_candidate(&self, lane: Lane, window: &HitWindow) -> Option<&Note> {
        self.in_lane(lane).find(|n| window.accepts_press(n))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WINDOW: HitWindow = HitWindow { line: 10.0, tolerance: 1.0 };

    fn ids(store: &NoteStore) -> Vec<NoteId> {
        store.iter().map(|n| n.id).collect()
    }

    #[test]
    fn spawn_uses_top_of_track_and_unique_ids() {
        let mut store = NoteStore::new(-22.5);
        let a = store.spawn(Lane::A, NoteKind::Short, 3.0);
        let b = store.spawn(Lane::L, NoteKind::Long, 7.5);
        assert_ne!(a, b);
        assert_eq!(Some(-22.5), store.get(a).map(|n| n.position));
        assert_eq!(Some(0.0), store.get(a).map(|n| n.length));
        assert_eq!(Some(7.5), store.get(b).map(|n| n.length));
        assert_eq!(Some(NoteState::Pending), store.get(b).map(|n| n.state));
    }

    #[test]
    fn advance_moves_every_note_by_delta() {
        let mut store = NoteStore::new(-22.5);
        store.spawn(Lane::A, NoteKind::Short, 0.0);
        store.insert_at(Lane::K, NoteKind::Long, 5.0, 3.0);
        let before: Vec<f32> = store.iter().map(|n| n.position).collect();

        store.advance(0.2);
        let after: Vec<f32> = store.iter().map(|n| n.position).collect();
        for (b, a) in before.iter().zip(&after) {
            assert!((a - b - 0.2).abs() < 1e-6);
        }

        store.advance(-1.0);
        assert_eq!(after, store.iter().map(|n| n.position).collect::<Vec<_>>());
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let mut store = NoteStore::new(0.0);
        let a = store.spawn(Lane::A, NoteKind::Short, 0.0);
        let b = store.spawn(Lane::S, NoteKind::Short, 0.0);
        let c = store.spawn(Lane::J, NoteKind::Short, 0.0);

        assert_eq!(Some(b), store.remove(b).map(|n| n.id));
        assert_eq!(vec![a, c], ids(&store));
        assert_eq!(None, store.remove(b));
    }

    #[test]
    fn two_notes_expiring_on_the_same_tick_are_both_culled() {
        let mut store = NoteStore::new(0.0);
        let keep_a = store.insert_at(Lane::A, NoteKind::Short, 0.0, 30.0);
        let gone_a = store.insert_at(Lane::S, NoteKind::Short, 0.0, 32.4);
        let gone_b = store.insert_at(Lane::J, NoteKind::Short, 0.0, 32.45);
        let keep_b = store.insert_at(Lane::K, NoteKind::Long, 6.0, 38.0);

        store.advance(0.2);
        let culled: Vec<NoteId> = store.cull(32.5).iter().map(|n| n.id).collect();

        assert_eq!(vec![gone_a, gone_b], culled);
        assert_eq!(vec![keep_a, keep_b], ids(&store));
        assert!(store.iter().all(|n| n.tail() <= 32.5));
    }

    #[test]
    fn long_note_stays_until_its_tail_exits() {
        let mut store = NoteStore::new(0.0);
        let id = store.insert_at(Lane::L, NoteKind::Long, 5.0, 35.0);
        assert!(store.cull(32.5).is_empty());
        store.advance(3.0);
        assert_eq!(vec![id], store.cull(32.5).iter().map(|n| n.id).collect::<Vec<_>>());
        assert!(store.is_empty());
    }

    #[test]
    fn press_candidate_is_first_in_store_order() {
        let mut store = NoteStore::new(0.0);
        store.insert_at(Lane::J, NoteKind::Short, 0.0, 4.0);
        let first = store.insert_at(Lane::J, NoteKind::Short, 0.0, 10.4);
        store.insert_at(Lane::J, NoteKind::Long, 6.0, 9.8);
        store.insert_at(Lane::K, NoteKind::Short, 0.0, 10.0);

        assert_eq!(Some(first), store.first_press_candidate(Lane::J, &WINDOW).map(|n| n.id));
        assert_eq!(None, store.first_press_candidate(Lane::A, &WINDOW).map(|n| n.id));
    }

    #[test]
    fn missed_notes_are_not_press_candidates() {
        let mut store = NoteStore::new(0.0);
        let id = store.insert_at(Lane::S, NoteKind::Long, 6.0, 10.5);
        if let Some(note) = store.get_mut(id) {
            note.state = NoteState::Missed;
        }
        assert!(store.first_press_candidate(Lane::S, &WINDOW).is_none());
    }

    #[test]
    fn queries_filter_by_lane_and_kind() {
        let mut store = NoteStore::new(0.0);
        store.spawn(Lane::A, NoteKind::Short, 0.0);
        store.spawn(Lane::A, NoteKind::Long, 5.0);
        store.spawn(Lane::S, NoteKind::Long, 5.0);
        assert_eq!(2, store.in_lane(Lane::A).count());
        assert_eq!(2, store.of_kind(NoteKind::Long).count());
        assert_eq!(3, store.len());
    }
}
