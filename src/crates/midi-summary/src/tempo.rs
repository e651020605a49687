//! Tick to wall-clock conversion.
//!
//! Metrical files measure time in ticks per quarter note, so the length of a
//! tick depends on the tempo in effect. Timecode files use a fixed number of
//! ticks per second and ignore tempo events for timing.

use midly::Timing;
use serde::Serialize;

use crate::error::{MidiError, Result};

/// Default tempo: 120 BPM = 500000 microseconds per beat
pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

/// A tempo change on the merged timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TempoChange {
    /// Absolute tick where the tempo takes effect
    pub tick: u64,
    /// Seconds from the start of the file
    pub time: f64,
    /// Tempo in beats per minute
    pub bpm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickTiming {
    Metrical { ticks_per_beat: u16 },
    Timecode { frames_per_second: f32, ticks_per_frame: u8 },
}

impl TickTiming {
    pub fn from_header(timing: Timing) -> Result<Self> {
        match timing {
            Timing::Metrical(tpb) => {
                let ticks_per_beat = tpb.as_int();
                if ticks_per_beat == 0 {
                    return Err(MidiError::InvalidTiming("zero ticks per beat"));
                }
                Ok(TickTiming::Metrical { ticks_per_beat })
            }
            Timing::Timecode(fps, subframe) => {
                if subframe == 0 {
                    return Err(MidiError::InvalidTiming("zero ticks per frame"));
                }
                Ok(TickTiming::Timecode {
                    frames_per_second: fps.as_f32(),
                    ticks_per_frame: subframe,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    tick: u64,
    seconds: f64,
    micros_per_beat: u32,
}

/// Piecewise tempo map built from set-tempo events
#[derive(Debug, Clone)]
pub struct TempoMap {
    timing: TickTiming,
    segments: Vec<Segment>,
}

impl TempoMap {
    /// Build the map from `(tick, microseconds_per_beat)` pairs.
    ///
    /// Events are ordered by tick (stable, so file order breaks ties). When
    /// several events share a tick the last one wins, and events that do not
    /// change the tempo in effect are dropped.
    pub fn new(timing: TickTiming, mut events: Vec<(u64, u32)>) -> Self {
        events.sort_by_key(|&(tick, _)| tick);

        let mut segments: Vec<Segment> = Vec::with_capacity(events.len());
        for (tick, micros_per_beat) in events {
            if micros_per_beat == 0 {
                continue;
            }

            if let Some(last) = segments.last_mut() {
                if last.tick == tick {
                    last.micros_per_beat = micros_per_beat;
                    Self::drop_if_redundant(&mut segments);
                    continue;
                }
                if last.micros_per_beat == micros_per_beat {
                    continue;
                }
            }

            let seconds = Self::seconds_with(&timing, &segments, tick);
            segments.push(Segment {
                tick,
                seconds,
                micros_per_beat,
            });
        }

        Self { timing, segments }
    }

    // A same-tick overwrite can make a segment equal to its predecessor.
    fn drop_if_redundant(segments: &mut Vec<Segment>) {
        let len = segments.len();
        if len >= 2 && segments[len - 1].micros_per_beat == segments[len - 2].micros_per_beat {
            segments.pop();
        }
    }

    /// Seconds elapsed from tick 0 to `tick`
    pub fn seconds_at(&self, tick: u64) -> f64 {
        Self::seconds_with(&self.timing, &self.segments, tick)
    }

    fn seconds_with(timing: &TickTiming, segments: &[Segment], tick: u64) -> f64 {
        match *timing {
            TickTiming::Timecode {
                frames_per_second,
                ticks_per_frame,
            } => tick as f64 / (frames_per_second as f64 * ticks_per_frame as f64),
            TickTiming::Metrical { ticks_per_beat } => {
                let idx = segments.partition_point(|s| s.tick <= tick);
                let (base_tick, base_seconds, micros_per_beat) = if idx == 0 {
                    (0, 0.0, DEFAULT_MICROS_PER_BEAT)
                } else {
                    let seg = segments[idx - 1];
                    (seg.tick, seg.seconds, seg.micros_per_beat)
                };
                base_seconds + tick_to_second(tick - base_tick, ticks_per_beat, micros_per_beat)
            }
        }
    }

    /// The tempo timeline, in time order
    pub fn changes(&self) -> Vec<TempoChange> {
        self.segments
            .iter()
            .map(|seg| TempoChange {
                tick: seg.tick,
                time: seg.seconds,
                bpm: micros_to_bpm(seg.micros_per_beat),
            })
            .collect()
    }
}

pub fn micros_to_bpm(micros_per_beat: u32) -> f64 {
    60_000_000.0 / micros_per_beat as f64
}

fn tick_to_second(ticks: u64, ticks_per_beat: u16, micros_per_beat: u32) -> f64 {
    let seconds_per_tick = (micros_per_beat as f64 / 1_000_000.0) / ticks_per_beat as f64;
    ticks as f64 * seconds_per_tick
}

#[cfg(test)]
mod tests {
    use super::*;

    const PPQ: TickTiming = TickTiming::Metrical { ticks_per_beat: 480 };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_tempo_without_events() {
        let map = TempoMap::new(PPQ, Vec::new());
        // 480 ticks = 1 beat at 120 BPM = 0.5 seconds
        assert!(approx(map.seconds_at(480), 0.5));
        assert!(map.changes().is_empty());
    }

    #[test]
    fn test_tempo_change_midway() {
        // First 480 ticks at 120 BPM, then 60 BPM
        let map = TempoMap::new(PPQ, vec![(0, 500_000), (480, 1_000_000)]);
        assert!(approx(map.seconds_at(960), 1.5));

        let changes = map.changes();
        assert_eq!(changes.len(), 2);
        assert!(approx(changes[1].time, 0.5));
        assert!(approx(changes[1].bpm, 60.0));
    }

    #[test]
    fn test_first_event_after_start_uses_default_before_it() {
        let map = TempoMap::new(PPQ, vec![(960, 1_000_000)]);
        let changes = map.changes();
        assert_eq!(changes.len(), 1);
        assert!(approx(changes[0].time, 1.0));
        assert!(approx(map.seconds_at(1440), 2.0));
    }

    #[test]
    fn test_unsorted_events_are_ordered() {
        let map = TempoMap::new(PPQ, vec![(960, 400_000), (0, 600_000)]);
        let bpms: Vec<f64> = map.changes().iter().map(|c| c.bpm).collect();
        assert!(approx(bpms[0], 100.0));
        assert!(approx(bpms[1], 150.0));
    }

    #[test]
    fn test_same_tick_last_event_wins() {
        let map = TempoMap::new(PPQ, vec![(0, 500_000), (0, 600_000)]);
        let changes = map.changes();
        assert_eq!(changes.len(), 1);
        assert!(approx(changes[0].bpm, 100.0));
    }

    #[test]
    fn test_redundant_events_are_dropped() {
        let map = TempoMap::new(PPQ, vec![(0, 600_000), (480, 600_000), (960, 400_000)]);
        let ticks: Vec<u64> = map.changes().iter().map(|c| c.tick).collect();
        assert_eq!(ticks, vec![0, 960]);
    }

    proptest::proptest! {
        #[test]
        fn prop_timeline_is_ordered_and_monotonic(
            events in proptest::collection::vec((0u64..100_000, 1u32..16_777_215), 0..32),
            probe in 0u64..200_000,
        ) {
            let map = TempoMap::new(PPQ, events);
            let changes = map.changes();

            for pair in changes.windows(2) {
                proptest::prop_assert!(pair[0].tick < pair[1].tick);
                proptest::prop_assert!(pair[0].time <= pair[1].time);
                proptest::prop_assert!(pair[0].bpm != pair[1].bpm);
            }
            proptest::prop_assert!(map.seconds_at(probe) <= map.seconds_at(probe + 1));
        }
    }

    #[test]
    fn test_timecode_ignores_tempo() {
        let timing = TickTiming::Timecode {
            frames_per_second: 25.0,
            ticks_per_frame: 40,
        };
        let map = TempoMap::new(timing, vec![(0, 1_000_000)]);
        assert!(approx(map.seconds_at(1000), 1.0));
    }
}
