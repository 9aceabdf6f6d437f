use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Where the absolute position samples come from
pub enum EncoderBackend {
    /// Deterministic constant-velocity rotation, advanced by one tick period
    /// per read (no wall clock, so runs are reproducible)
    Simulation {
        velocity_rps: f64,
        tick_period: f64,
        turns: f64,
    },
    /// Pre-recorded samples from a text file, one fraction per line.
    /// The last sample is held once the file runs out.
    Replay { samples: Vec<f64>, index: usize },
}

/// Absolute position source.
///
/// Produces one cyclic fractional position in [0, 1) per tick. The real
/// device decodes a duty-cycle signal in hardware; here the sample either
/// comes from a simulated rotation or from a replay file.
pub struct EncoderController {
    backend: EncoderBackend,
    last_reading: f64,
}

impl EncoderController {
    /// Create a simulated encoder spinning at `velocity_rps` rotations per
    /// second, sampled at `freq` Hz.
    ///
    /// A zero frequency is rejected; it would make the tick period infinite
    /// and every reading NaN.
    pub fn new_simulation(velocity_rps: f64, freq: u32) -> Result<Self> {
        if freq == 0 {
            return Err(anyhow::anyhow!("Tick frequency must be non-zero"));
        }
        Ok(Self {
            backend: EncoderBackend::Simulation {
                velocity_rps,
                tick_period: 1.0 / freq as f64,
                turns: 0.0,
            },
            last_reading: 0.0,
        })
    }

    /// Create a replay encoder from a sample file.
    ///
    /// One fractional sample per line; blank lines and `#` comments are
    /// skipped. Every sample must be in [0, 1).
    pub fn new_replay<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read replay file: {}", path.display()))?;

        let mut samples = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let sample: f64 = line.parse().context(format!(
                "Invalid sample at {}:{}: {:?}",
                path.display(),
                line_no + 1,
                line
            ))?;
            if !(0.0..1.0).contains(&sample) {
                return Err(anyhow::anyhow!(
                    "Sample {} at {}:{} out of range [0, 1)",
                    sample,
                    path.display(),
                    line_no + 1
                ));
            }
            samples.push(sample);
        }

        if samples.is_empty() {
            return Err(anyhow::anyhow!(
                "Replay file {} contains no samples",
                path.display()
            ));
        }

        Ok(Self {
            backend: EncoderBackend::Replay { samples, index: 0 },
            last_reading: 0.0,
        })
    }

    /// Read the next absolute position sample, a fraction in [0, 1)
    pub fn read(&mut self) -> Result<f64> {
        let reading = match &mut self.backend {
            EncoderBackend::Simulation {
                velocity_rps,
                tick_period,
                turns,
            } => {
                *turns += *velocity_rps * *tick_period;
                // Fold into [0, 1); rem_euclid keeps backward rotation positive
                turns.rem_euclid(1.0)
            }
            EncoderBackend::Replay { samples, index } => {
                let reading = samples[(*index).min(samples.len() - 1)];
                *index += 1;
                reading
            }
        };

        self.last_reading = reading;
        Ok(reading)
    }

    /// Last sample returned by `read`
    pub fn last_reading(&self) -> f64 {
        self.last_reading
    }

    /// Number of replay samples left, if replaying
    pub fn replay_remaining(&self) -> Option<usize> {
        match &self.backend {
            EncoderBackend::Replay { samples, index } => {
                Some(samples.len().saturating_sub(*index))
            }
            EncoderBackend::Simulation { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_advances_by_velocity() {
        // 0.25 rot/s at 50 Hz is 0.005 rotation per tick
        let mut encoder = EncoderController::new_simulation(0.25, 50).unwrap();
        let first = encoder.read().unwrap();
        let second = encoder.read().unwrap();
        assert!((first - 0.005).abs() < 1e-12);
        assert!((second - 0.010).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_zero_frequency() {
        // 1/0 Hz would be an infinite tick period and NaN readings
        assert!(EncoderController::new_simulation(0.25, 0).is_err());
    }

    #[test]
    fn test_simulation_stays_in_range() {
        let mut encoder = EncoderController::new_simulation(3.7, 50).unwrap();
        for _ in 0..500 {
            let reading = encoder.read().unwrap();
            assert!((0.0..1.0).contains(&reading));
        }
    }

    #[test]
    fn test_simulation_backward_rotation_stays_positive() {
        let mut encoder = EncoderController::new_simulation(-1.3, 50).unwrap();
        for _ in 0..200 {
            let reading = encoder.read().unwrap();
            assert!((0.0..1.0).contains(&reading));
        }
    }

    #[test]
    fn test_replay_parses_and_holds_last() {
        let dir = std::env::temp_dir();
        let path = dir.join("distance_tracker_replay_test.txt");
        fs::write(&path, "# header comment\n0.1\n\n0.95\n0.2\n").unwrap();

        let mut encoder = EncoderController::new_replay(&path).unwrap();
        assert_eq!(encoder.replay_remaining(), Some(3));
        assert_eq!(encoder.read().unwrap(), 0.1);
        assert_eq!(encoder.read().unwrap(), 0.95);
        assert_eq!(encoder.read().unwrap(), 0.2);
        // Exhausted: holds the last sample
        assert_eq!(encoder.read().unwrap(), 0.2);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_replay_rejects_out_of_range_sample() {
        let dir = std::env::temp_dir();
        let path = dir.join("distance_tracker_replay_bad.txt");
        fs::write(&path, "0.5\n1.5\n").unwrap();
        assert!(EncoderController::new_replay(&path).is_err());
        fs::remove_file(&path).ok();
    }
}
