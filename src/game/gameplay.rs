use crate::config::Config;
use crate::core::clock::FrameClock;
use crate::core::input::{self, LaneEdge};
use crate::game::events::{EventSink, GameEvent};
use crate::game::judgment::{self, HitWindow, MissCause, Stimulus, Verdict};
use crate::game::lane::{Lane, LANE_COUNT};
use crate::game::note::{NoteId, NoteKind};
use crate::game::spawner::Spawner;
use crate::game::store::NoteStore;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use winit::event::KeyEvent;

const STATUS_LOG_INTERVAL_FRAMES: u32 = 60;

/// A lane whose key is down on a long note that is being validly sustained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveHold {
    pub note_id: NoteId,
    pub engaged_at: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JudgmentCounts {
    pub hits: u32,
    pub holds_started: u32,
    pub holds_released: u32,
    pub holds_completed: u32,
    pub misses: u32,
}

pub struct State {
    pub notes: NoteStore,
    pub spawner: Spawner<StdRng>,
    pub clock: FrameClock,
    pub window: HitWindow,
    pub exit_threshold: f32,

    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub counts: JudgmentCounts,

    pub active_holds: [Option<ActiveHold>; LANE_COUNT],
    lane_pressed: [bool; LANE_COUNT],

    pub playing: bool,
    pub debug: bool,
    log_timer: u32,
}

pub fn init(config: &Config, rng: StdRng) -> State {
    let spawner = Spawner::new(config.spawn_policy(), rng);
    let policy = spawner.policy();
    info!(
        "Initializing gameplay: hit line {} ±{}, exit at {}, {} per frame.",
        config.hit_position,
        config.hit_tolerance,
        config.exit_threshold(),
        config.scroll_speed
    );
    info!(
        "Spawning: chance {}, long chance {}, long length {}..={}",
        policy.spawn_chance, policy.long_chance, policy.min_length, policy.max_length
    );
    State {
        notes: NoteStore::new(config.spawn_position()),
        spawner,
        clock: FrameClock::new(config.scroll_speed),
        window: config.hit_window(),
        exit_threshold: config.exit_threshold(),
        score: 0,
        combo: 0,
        max_combo: 0,
        counts: JudgmentCounts::default(),
        active_holds: Default::default(),
        lane_pressed: [false; LANE_COUNT],
        playing: false,
        debug: false,
        log_timer: 0,
    }
}

pub fn start(state: &mut State, sink: &mut impl EventSink) {
    set_playing(state, true, sink);
}

pub fn pause(state: &mut State, sink: &mut impl EventSink) {
    set_playing(state, false, sink);
}

fn set_playing(state: &mut State, playing: bool, sink: &mut impl EventSink) {
    if state.playing == playing {
        return;
    }
    state.playing = playing;
    sink.emit(GameEvent::PlayingChanged { playing });
}

pub fn toggle_debug(state: &mut State, sink: &mut impl EventSink) {
    state.debug = !state.debug;
    sink.emit(GameEvent::DebugToggled { enabled: state.debug });
}

#[inline(always)]
pub fn is_lane_pressed(state: &State, lane: Lane) -> bool {
    state.lane_pressed[lane.index()]
}

/// Routes a keyboard event to the lane it belongs to, if any.
pub fn handle_key_press(state: &mut State, event: &KeyEvent, sink: &mut impl EventSink) {
    if let Some(LaneEdge { lane, pressed }) = input::lane_edge(event) {
        handle_lane_input(state, lane, pressed, sink);
    }
}

/// Applies a lane key edge. Repeats of the current pressed state are
/// dropped. Key-down only judges while playing; key-up always ends a hold.
pub fn handle_lane_input(state: &mut State, lane: Lane, pressed: bool, sink: &mut impl EventSink) {
    let lane_idx = lane.index();
    if state.lane_pressed[lane_idx] == pressed {
        return;
    }
    state.lane_pressed[lane_idx] = pressed;
    sink.emit(GameEvent::LaneKey { lane, pressed });

    if pressed {
        if state.playing {
            judge_press(state, lane, sink);
        }
    } else {
        judge_release(state, lane, sink);
    }
}

fn judge_press(state: &mut State, lane: Lane, sink: &mut impl EventSink) -> bool {
    let Some(note) = state.notes.first_press_candidate(lane, &state.window).cloned() else {
        return false;
    };
    if note.kind == NoteKind::Long && state.active_holds[lane.index()].is_some() {
        warn!("Lane {} already has an active hold; ignoring press.", lane.key());
        return false;
    }

    let transition = judgment::step(&note, Stimulus::Press, &state.window);
    match transition.verdict {
        Verdict::Hit => {
            state.notes.remove(note.id);
            state.counts.hits += 1;
            bump_combo(state);
            info!("HIT: note {} lane {} at {:.2}", note.id.0, lane.key(), note.position);
            sink.emit(GameEvent::Hit {
                id: note.id,
                lane,
                position: note.position,
                color: lane.color(),
            });
            sink.emit(GameEvent::Removed { id: note.id, lane });
        }
        Verdict::HoldStarted => {
            if let Some(n) = state.notes.get_mut(note.id) {
                n.state = transition.state;
            }
            state.active_holds[lane.index()] = Some(ActiveHold {
                note_id: note.id,
                engaged_at: note.position,
            });
            state.counts.holds_started += 1;
            bump_combo(state);
            info!("HOLD START: note {} lane {} at {:.2}", note.id.0, lane.key(), note.position);
            sink.emit(GameEvent::HoldStarted {
                id: note.id,
                lane,
                position: note.position,
                color: lane.color(),
            });
        }
        _ => return false,
    }
    award(state, judgment::points_for(transition.verdict), sink);
    true
}

fn judge_release(state: &mut State, lane: Lane, sink: &mut impl EventSink) {
    let Some(active) = state.active_holds[lane.index()].take() else {
        return;
    };
    let Some(note) = state.notes.get_mut(active.note_id) else {
        return;
    };

    let transition = judgment::step(note, Stimulus::Release, &state.window);
    note.state = transition.state;
    let (id, position, kind) = (note.id, note.position, note.kind);

    match transition.verdict {
        Verdict::HoldReleased => {
            state.counts.holds_released += 1;
            info!(
                "HOLD RELEASED: note {} lane {} held {:.2} -> {:.2}",
                id.0,
                lane.key(),
                active.engaged_at,
                position
            );
            sink.emit(GameEvent::HoldReleased { id, lane, position });
        }
        Verdict::Missed(cause) => record_miss(state, id, lane, kind, cause, sink),
        _ => {}
    }
}

/// One frame: advance, re-judge, retire, spawn. Does nothing while paused.
pub fn update(state: &mut State, sink: &mut impl EventSink) {
    if !state.playing {
        return;
    }

    let delta = state.clock.tick();
    state.notes.advance(delta);
    for note in state.notes.iter() {
        sink.emit(GameEvent::Advanced { id: note.id, position: note.position });
    }

    reevaluate_notes(state, sink);
    cull_exited_notes(state, sink);
    spawn_new_notes(state, sink);

    state.log_timer += 1;
    if state.log_timer >= STATUS_LOG_INTERVAL_FRAMES {
        state.log_timer = 0;
        let long_notes = state.notes.of_kind(NoteKind::Long).count();
        let holding = state.notes.iter().filter(|n| n.is_being_held()).count();
        debug!(
            "Frame: {}, Score: {}, Combo: {}, Misses: {}, Notes: {} ({} long), Holding: {}",
            state.clock.frame(),
            state.score,
            state.combo,
            state.counts.misses,
            state.notes.len(),
            long_notes,
            holding
        );
    }
}

fn reevaluate_notes(state: &mut State, sink: &mut impl EventSink) {
    let window = state.window;
    let mut outcomes = Vec::new();
    for note in state.notes.iter_mut() {
        let transition = judgment::step(note, Stimulus::Tick, &window);
        note.state = transition.state;
        if transition.verdict != Verdict::None {
            outcomes.push((note.id, note.lane, note.kind, note.position, transition.verdict));
        }
    }

    for (id, lane, kind, position, verdict) in outcomes {
        match verdict {
            Verdict::HoldTick => {
                let holds_this_note =
                    state.active_holds[lane.index()].is_some_and(|h| h.note_id == id);
                if !holds_this_note {
                    warn!("Note {} is held without an active hold on lane {}.", id.0, lane.key());
                    continue;
                }
                sink.emit(GameEvent::HoldTick { id, lane, position, color: lane.color() });
                award(state, judgment::points_for(verdict), sink);
            }
            Verdict::HoldCompleted => {
                let slot = &mut state.active_holds[lane.index()];
                let engaged_at = match *slot {
                    Some(h) if h.note_id == id => {
                        *slot = None;
                        h.engaged_at
                    }
                    _ => position,
                };
                state.counts.holds_completed += 1;
                info!(
                    "HOLD COMPLETE: note {} lane {} held {:.2} -> {:.2}",
                    id.0,
                    lane.key(),
                    engaged_at,
                    position
                );
                sink.emit(GameEvent::HoldCompleted { id, lane });
            }
            Verdict::Missed(cause) => record_miss(state, id, lane, kind, cause, sink),
            _ => {}
        }
    }
}

fn cull_exited_notes(state: &mut State, sink: &mut impl EventSink) {
    if state.notes.is_empty() {
        return;
    }
    for note in state.notes.cull(state.exit_threshold) {
        let slot = &mut state.active_holds[note.lane.index()];
        if slot.is_some_and(|h| h.note_id == note.id) {
            *slot = None;
        }
        sink.emit(GameEvent::Removed { id: note.id, lane: note.lane });
    }
}

fn spawn_new_notes(state: &mut State, sink: &mut impl EventSink) {
    let Some(id) = state.spawner.spawn_into(&mut state.notes) else {
        return;
    };
    if let Some(note) = state.notes.get(id) {
        debug!("Spawned {:?} note {} in lane {}", note.kind, id.0, note.lane.key());
        sink.emit(GameEvent::Spawned {
            id,
            lane: note.lane,
            kind: note.kind,
            position: note.position,
            length: note.length,
            offset: note.lane.offset(),
            color: note.lane.color(),
        });
    }
}

fn record_miss(
    state: &mut State,
    id: NoteId,
    lane: Lane,
    kind: NoteKind,
    cause: MissCause,
    sink: &mut impl EventSink,
) {
    state.counts.misses += 1;
    state.combo = 0;
    info!("MISSED: note {} lane {} ({:?})", id.0, lane.key(), cause);
    sink.emit(GameEvent::Missed { id, lane, kind, cause });
}

fn bump_combo(state: &mut State) {
    state.combo = state.combo.saturating_add(1);
    state.max_combo = state.max_combo.max(state.combo);
}

fn award(state: &mut State, points: u64, sink: &mut impl EventSink) {
    if points == 0 {
        return;
    }
    state.score = state.score.saturating_add(points);
    sink.emit(GameEvent::ScoreChanged { score: state.score });
}
