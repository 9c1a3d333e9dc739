//! Burst segmentation
//!
//! A single forward scan with a run-length accumulator. Runs of intervals
//! below the burst threshold are flushed when the first slower interval
//! arrives, and once more after the loop for a run that reaches the end.

use crate::config::RhythmConfig;
use crate::types::BurstSegment;

/// Result of the burst scan
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BurstScan {
    pub segments: Vec<BurstSegment>,
    /// Highest segment speed in keys/sec, 0 without segments
    pub max_burst_speed: f64,
}

impl BurstScan {
    pub fn burst_count(&self) -> u32 {
        self.segments.len() as u32
    }
}

#[derive(Debug, Default)]
struct RunAccumulator {
    start_index: usize,
    length: usize,
    elapsed_sec: f64,
}

impl RunAccumulator {
    fn extend(&mut self, index: usize, interval: f64) {
        if self.length == 0 {
            self.start_index = index;
        }
        self.length += 1;
        self.elapsed_sec += interval;
    }

    /// Emit a segment if the run is long enough, then reset either way
    fn flush(&mut self, min_length: usize) -> Option<BurstSegment> {
        let run = std::mem::take(self);
        if run.length < min_length {
            return None;
        }
        let avg_speed = if run.elapsed_sec > 0.0 {
            run.length as f64 / run.elapsed_sec
        } else {
            0.0
        };
        Some(BurstSegment {
            start_index: run.start_index,
            length: run.length,
            avg_speed,
        })
    }
}

pub fn detect_bursts(intervals: &[f64], config: &RhythmConfig) -> BurstScan {
    let mut segments = Vec::new();
    let mut run = RunAccumulator::default();

    for (index, &interval) in intervals.iter().enumerate() {
        if interval < config.burst_interval_max_sec {
            run.extend(index, interval);
        } else {
            segments.extend(run.flush(config.burst_min_length));
        }
    }
    segments.extend(run.flush(config.burst_min_length));

    let max_burst_speed = segments
        .iter()
        .map(|s| s.avg_speed)
        .fold(0.0, f64::max);

    BurstScan {
        segments,
        max_burst_speed,
    }
}
