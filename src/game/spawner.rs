use crate::game::lane::{Lane, LANE_COUNT};
use crate::game::note::{NoteId, NoteKind};
use crate::game::store::NoteStore;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPolicy {
    pub spawn_chance: f64,
    pub long_chance: f64,
    pub min_length: f32,
    pub max_length: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub lane: Lane,
    pub kind: NoteKind,
    pub length: f32,
}

/// Rolls once per tick for a new note.
pub struct Spawner<R> {
    policy: SpawnPolicy,
    rng: R,
}

impl<R: Rng> Spawner<R> {
    pub fn new(policy: SpawnPolicy, rng: R) -> Self {
        let mut policy = policy;
        policy.spawn_chance = clamp_unit(policy.spawn_chance);
        policy.long_chance = clamp_unit(policy.long_chance);
        if policy.min_length > policy.max_length {
            std::mem::swap(&mut policy.min_length, &mut policy.max_length);
        }
        Self { policy, rng }
    }

    pub fn policy(&self) -> &SpawnPolicy {
        &self.policy
    }

    /// Decides whether this tick produces a note, and what it looks like.
    pub fn roll(&mut self) -> Option<SpawnRequest> {
        if !self.rng.random_bool(self.policy.spawn_chance) {
            return None;
        }
        let lane = Lane::ALL[self.rng.random_range(0..LANE_COUNT)];
        let (kind, length) = if self.rng.random_bool(self.policy.long_chance) {
            let length = self
                .rng
                .random_range(self.policy.min_length..=self.policy.max_length);
            (NoteKind::Long, length)
        } else {
            (NoteKind::Short, 0.0)
        };
        Some(SpawnRequest { lane, kind, length })
    }

    /// One roll; on success the note lands at the top of `store`.
    pub fn spawn_into(&mut self, store: &mut NoteStore) -> Option<NoteId> {
        let request = self.roll()?;
        Some(store.spawn(request.lane, request.kind, request.length))
    }
}

fn clamp_unit(p: f64) -> f64 {
    if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn policy(spawn_chance: f64, long_chance: f64) -> SpawnPolicy {
        SpawnPolicy { spawn_chance, long_chance, min_length: 5.0, max_length: 10.0 }
    }

    #[test]
    fn chance_zero_then_one_spawns_exactly_zero_then_one() {
        let mut store = NoteStore::new(-22.5);
        let mut never = Spawner::new(policy(0.0, 0.3), StdRng::seed_from_u64(1));
        assert_eq!(None, never.spawn_into(&mut store));
        assert_eq!(0, store.len());

        let mut always = Spawner::new(policy(1.0, 0.3), StdRng::seed_from_u64(1));
        assert!(always.spawn_into(&mut store).is_some());
        assert_eq!(1, store.len());
        assert_eq!(Some(-22.5), store.iter().next().map(|n| n.position));
    }

    #[test]
    fn long_notes_draw_length_from_range() {
        let mut spawner = Spawner::new(policy(1.0, 1.0), StdRng::seed_from_u64(7));
        for _ in 0..200 {
            let request = spawner.roll().expect("chance 1 always spawns");
            assert_eq!(NoteKind::Long, request.kind);
            assert!((5.0..=10.0).contains(&request.length), "length {}", request.length);
        }
    }

    #[test]
    fn short_notes_have_no_length() {
        let mut spawner = Spawner::new(policy(1.0, 0.0), StdRng::seed_from_u64(7));
        for _ in 0..50 {
            let request = spawner.roll().expect("chance 1 always spawns");
            assert_eq!((NoteKind::Short, 0.0), (request.kind, request.length));
        }
    }

    #[test]
    fn every_lane_gets_notes() {
        let mut spawner = Spawner::new(policy(1.0, 0.3), StdRng::seed_from_u64(99));
        let mut seen = [false; LANE_COUNT];
        for _ in 0..500 {
            if let Some(request) = spawner.roll() {
                seen[request.lane.index()] = true;
            }
        }
        assert_eq!([true; LANE_COUNT], seen);
    }

    #[test]
    fn out_of_range_chances_are_clamped() {
        let spawner = Spawner::new(policy(4.0, -1.0), StdRng::seed_from_u64(0));
        assert_eq!((1.0, 0.0), (spawner.policy().spawn_chance, spawner.policy().long_chance));
    }
}
