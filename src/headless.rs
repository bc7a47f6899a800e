use crate::config::Config;
use crate::game::events::{EventSink, JsonLinesSink};
use crate::game::gameplay::{self, JudgmentCounts, State};
use crate::game::lane::Lane;
use log::info;
use rand::rngs::StdRng;
use std::error::Error;
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    pub frames: u64,
    pub autoplay: bool,
    pub positions: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub frames: u64,
    pub score: u64,
    pub max_combo: u32,
    pub counts: JudgmentCounts,
}

/// Runs the engine without a window, streaming events as JSON lines.
pub fn run<W: Write>(
    config: &Config,
    rng: StdRng,
    options: Options,
    out: W,
) -> Result<Summary, Box<dyn Error>> {
    let mut sink = JsonLinesSink::new(out);
    if !options.positions {
        sink = sink.without_positions();
    }

    let mut state = gameplay::init(config, rng);
    gameplay::start(&mut state, &mut sink);
    for _ in 0..options.frames {
        if options.autoplay {
            autoplay(&mut state, &mut sink);
        }
        gameplay::update(&mut state, &mut sink);
        if sink.has_failed() {
            return Err("event stream closed".into());
        }
    }
    sink.flush()?;

    let summary = Summary {
        frames: state.clock.frame(),
        score: state.score,
        max_combo: state.max_combo,
        counts: state.counts,
    };
    info!(
        "Headless run finished: {} frames, score {}, max combo {}, {} misses",
        summary.frames, summary.score, summary.max_combo, summary.counts.misses
    );
    Ok(summary)
}

/// A perfect player: presses as a note reaches the line and keeps long
/// notes down until their tail has crossed it.
fn autoplay(state: &mut State, sink: &mut impl EventSink) {
    let reach = state.window.line - state.clock.scroll_delta() / 2.0;
    for lane in Lane::ALL {
        let pressed = gameplay::is_lane_pressed(state, lane);
        if pressed {
            if state.active_holds[lane.index()].is_none() {
                gameplay::handle_lane_input(state, lane, false, sink);
            }
            continue;
        }
        let due = state
            .notes
            .first_press_candidate(lane, &state.window)
            .is_some_and(|n| n.position >= reach);
        if due {
            gameplay::handle_lane_input(state, lane, true, sink);
        }
    }
}
