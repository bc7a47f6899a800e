use crate::game::judgment::MissCause;
use crate::game::lane::Lane;
use crate::game::note::{NoteId, NoteKind};
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::io::Write;

/// Everything the presentation side needs to draw and animate the track.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Spawned {
        id: NoteId,
        lane: Lane,
        kind: NoteKind,
        position: f32,
        length: f32,
        offset: f32,
        color: u32,
    },
    Advanced { id: NoteId, position: f32 },
    Removed { id: NoteId, lane: Lane },
    Hit { id: NoteId, lane: Lane, position: f32, color: u32 },
    HoldStarted { id: NoteId, lane: Lane, position: f32, color: u32 },
    HoldTick { id: NoteId, lane: Lane, position: f32, color: u32 },
    HoldReleased { id: NoteId, lane: Lane, position: f32 },
    HoldCompleted { id: NoteId, lane: Lane },
    Missed { id: NoteId, lane: Lane, kind: NoteKind, cause: MissCause },
    ScoreChanged { score: u64 },
    LaneKey { lane: Lane, pressed: bool },
    PlayingChanged { playing: bool },
    DebugToggled { enabled: bool },
}

pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Collects events in order; mostly useful for inspection and tests.
impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Writes events to the log. Per-frame noise goes to `trace`.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: GameEvent) {
        match event {
            GameEvent::Advanced { .. } | GameEvent::HoldTick { .. } => trace!("{:?}", event),
            GameEvent::PlayingChanged { playing } => {
                info!("Gameplay {}", if playing { "started" } else { "paused" })
            }
            GameEvent::DebugToggled { enabled } => {
                info!("Debug view {}", if enabled { "ON" } else { "OFF" })
            }
            _ => debug!("{:?}", event),
        }
    }
}

/// One JSON object per line. The first write error is logged and the sink
/// goes quiet afterwards.
pub struct JsonLinesSink<W: Write> {
    out: W,
    failed: bool,
    skip_advanced: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, failed: false, skip_advanced: false }
    }

    /// Drops the per-note `advanced` events, which dominate the stream.
    pub fn without_positions(mut self) -> Self {
        self.skip_advanced = true;
        self
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &GameEvent) -> Result<(), Box<dyn std::error::Error>> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: GameEvent) {
        if self.failed || (self.skip_advanced && matches!(event, GameEvent::Advanced { .. })) {
            return;
        }
        if let Err(e) = self.write_event(&event) {
            warn!("Event stream write failed, dropping further events: {}", e);
            self.failed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_lines_are_tagged_and_snake_case() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(GameEvent::Hit { id: NoteId(3), lane: Lane::K, position: 10.0, color: 0x0000ff });
        sink.emit(GameEvent::Missed {
            id: NoteId(4),
            lane: Lane::A,
            kind: NoteKind::Long,
            cause: MissCause::ReleasedLate,
        });
        sink.emit(GameEvent::ScoreChanged { score: 200 });

        let text = String::from_utf8(sink.into_inner()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            vec![
                r#"{"event":"hit","id":3,"lane":"K","position":10.0,"color":255}"#,
                r#"{"event":"missed","id":4,"lane":"A","kind":"long","cause":"released_late"}"#,
                r#"{"event":"score_changed","score":200}"#,
            ],
            lines
        );
    }

    #[test]
    fn positions_can_be_filtered_out() {
        let mut sink = JsonLinesSink::new(Vec::new()).without_positions();
        sink.emit(GameEvent::Advanced { id: NoteId(0), position: 1.0 });
        sink.emit(GameEvent::LaneKey { lane: Lane::J, pressed: true });
        let text = String::from_utf8(sink.into_inner()).expect("utf8");
        assert_eq!(r#"{"event":"lane_key","lane":"J","pressed":true}"#, text.trim_end());
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_marks_sink_failed() {
        let mut sink = JsonLinesSink::new(Broken);
        sink.emit(GameEvent::ScoreChanged { score: 1 });
        assert!(sink.has_failed());
    }
}
