//! Sample sources for driving a session without a device
//!
//! - `SyntheticTilt`: seeded, reproducible stream of a slowly rocking device
//! - recordings: JSON lines, one `AccelerationSample` per line

use std::fmt;
use std::path::Path;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::AccelerationSample;

/// Standard gravity, m/s²
pub const GRAVITY: f32 = 9.81;

/// Delivery period of a game-rate sensor stream (50 Hz)
pub const GAME_RATE_PERIOD_NANOS: i64 = 20_000_000;

/// A device rocking back and forth under gravity, plus sensor noise
#[derive(Debug, Clone)]
pub struct SyntheticTilt {
    rng: Pcg32,
    /// Next timestamp to emit
    t_nanos: i64,
    period_nanos: i64,
    /// Maximum tilt from flat (radians)
    amplitude: f32,
    /// Rocking frequency (Hz)
    frequency: f32,
    /// Peak noise per axis (m/s²)
    noise: f32,
    remaining: usize,
}

impl SyntheticTilt {
    pub fn new(seed: u64, count: usize) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            t_nanos: 0,
            period_nanos: GAME_RATE_PERIOD_NANOS,
            amplitude: 0.35,
            frequency: 0.25,
            noise: 0.05,
            remaining: count,
        }
    }

    pub fn with_period(mut self, period_nanos: i64) -> Self {
        self.period_nanos = period_nanos.max(1);
        self
    }

    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise.abs();
        self
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Tilt angles (roll, pitch) at time `t` seconds
    fn tilt_at(&self, t: f32) -> Vec2 {
        let phase = std::f32::consts::TAU * self.frequency * t;
        Vec2::new(phase.sin(), (phase * 0.5).cos()) * self.amplitude
    }
}

impl Iterator for SyntheticTilt {
    type Item = AccelerationSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let t_nanos = self.t_nanos;
        self.t_nanos = self.t_nanos.saturating_add(self.period_nanos);

        let tilt = self.tilt_at(t_nanos as f32 / 1e9);
        let mut jitter = || {
            if self.noise > 0.0 {
                self.rng.random_range(-self.noise..=self.noise)
            } else {
                0.0
            }
        };

        let x = GRAVITY * tilt.x.sin() + jitter();
        let y = GRAVITY * tilt.y.sin() + jitter();
        let z = GRAVITY * tilt.x.cos() * tilt.y.cos() + jitter();
        Some(AccelerationSample::new(x, y, z, t_nanos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SyntheticTilt {}

/// Failure reading a recorded sample stream
#[derive(Debug)]
pub enum RecordingError {
    Io(std::io::Error),
    /// Bad JSON on a 1-based line
    Parse { line: usize, source: serde_json::Error },
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::Io(e) => write!(f, "failed to read recording: {}", e),
            RecordingError::Parse { line, source } => {
                write!(f, "bad sample on line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for RecordingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordingError::Io(e) => Some(e),
            RecordingError::Parse { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for RecordingError {
    fn from(e: std::io::Error) -> Self {
        RecordingError::Io(e)
    }
}

/// Parse JSON lines; blank lines and `#` comments are skipped
pub fn parse_recording(text: &str) -> Result<Vec<AccelerationSample>, RecordingError> {
    let mut samples = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let sample = serde_json::from_str(line)
            .map_err(|source| RecordingError::Parse { line: idx + 1, source })?;
        samples.push(sample);
    }
    Ok(samples)
}

pub fn load_recording(path: impl AsRef<Path>) -> Result<Vec<AccelerationSample>, RecordingError> {
    let text = std::fs::read_to_string(path)?;
    parse_recording(&text)
}

/// Serialize samples as JSON lines (inverse of `parse_recording`)
pub fn write_recording(samples: &[AccelerationSample]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for sample in samples {
        out.push_str(&serde_json::to_string(sample)?);
        out.push('\n');
    }
    Ok(out)
}
