//! Offline replay of recorded per-frame detections through the tracker.
//!
//! A recording is JSON lines, one frame per line:
//!
//! ```text
//! {"t": 0.0, "detection": {"score": 0.93, "x0": 100, "y0": 100, "x1": 200, "y1": 200}}
//! {"t": 0.1, "detection": null}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::io::BufRead;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tracker::{Action, Detection, SteadinessTracker, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedDetection {
    pub score: f32,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Seconds since the start of the recording
    pub t: f64,
    #[serde(default)]
    pub detection: Option<RecordedDetection>,
}

impl RecordedFrame {
    pub fn detection(&self) -> Option<Detection> {
        self.detection
            .map(|d| Detection::new(d.x0, d.y0, d.x1, d.y1, d.score))
    }
}

/// Parse a recording, reporting the 1-based line of the first bad entry.
pub fn read_recording<R: BufRead>(reader: R) -> Result<Vec<(Timestamp, RecordedFrame)>> {
    let mut frames = Vec::new();
    let mut previous = Duration::ZERO;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let frame: RecordedFrame = serde_json::from_str(trimmed).map_err(|e| Error::Replay {
            line: line_no,
            message: e.to_string(),
        })?;
        let at = Duration::try_from_secs_f64(frame.t).map_err(|_| Error::Replay {
            line: line_no,
            message: format!("invalid timestamp {}", frame.t),
        })?;
        if at < previous {
            return Err(Error::Replay {
                line: line_no,
                message: format!("timestamp {} goes backwards", frame.t),
            });
        }
        previous = at;
        frames.push((at, frame));
    }

    Ok(frames)
}

/// Feed every recorded frame to `tracker`, returning each tick's action.
pub fn replay(
    tracker: &mut SteadinessTracker,
    frames: &[(Timestamp, RecordedFrame)],
) -> Vec<(Timestamp, Action)> {
    frames
        .iter()
        .map(|(at, frame)| (*at, tracker.update(frame.detection(), *at)))
        .collect()
}
