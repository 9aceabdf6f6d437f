use anyhow::Result;
use clap::ValueEnum;
use std::f64::consts::PI;

/// Distance travelled per full rotation in linear mode, in feet.
/// The encoder sits on the axle of a 4" diameter wheel: C = PI*d, ft = in/12.
pub const LINEAR_FEET_PER_ROTATION: f64 = PI * 4.0 / 12.0;

/// Distance travelled per full rotation in angular mode, in degrees.
pub const ANGULAR_DEGREES_PER_ROTATION: f64 = 360.0;

/// Unit interpretation for the continuous distance output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DistanceMode {
    /// Feet travelled by a 4" wheel on the encoder axle
    Linear,
    /// Degrees of continuous rotation (negative infinity to infinity)
    Angular,
}

impl DistanceMode {
    /// Conversion factor from one full rotation to the output unit
    pub fn distance_per_rotation(&self) -> f64 {
        match self {
            DistanceMode::Linear => LINEAR_FEET_PER_ROTATION,
            DistanceMode::Angular => ANGULAR_DEGREES_PER_ROTATION,
        }
    }

    /// Label printed in front of the distance value
    pub fn label(&self) -> &'static str {
        match self {
            DistanceMode::Linear => "Net Feet Travelled",
            DistanceMode::Angular => "Net Degrees Travelled",
        }
    }
}

/// Tracker configuration, chosen once at startup
#[derive(Debug, Clone)]
pub struct DistanceConfig {
    pub mode: DistanceMode,
    /// Output units per full rotation, resolved from the mode
    pub distance_per_rotation: f64,
    /// Constant subtracted from raw readings to shift the zero point, in [0, 1)
    pub position_offset: Option<f64>,
    /// Zero the continuous distance at the reading seen during initialization
    pub reset_on_start: bool,
}

impl DistanceConfig {
    /// Create a config with the conversion factor resolved from the mode
    pub fn new(mode: DistanceMode, position_offset: Option<f64>, reset_on_start: bool) -> Self {
        Self {
            mode,
            distance_per_rotation: mode.distance_per_rotation(),
            position_offset,
            reset_on_start,
        }
    }
}

/// Converts cyclic absolute-position samples into a running continuous distance.
///
/// The raw sample is a fraction of one rotation in [0, 1) with no memory of
/// prior rotations. Successive samples are unwrapped: a step larger than half
/// a rotation is taken to be a wrap through the 0/1 boundary in the other
/// direction. This holds as long as the true displacement between two samples
/// is under half a rotation, which the fixed tick period guarantees.
///
/// Owned exclusively by the tick loop; there is no shared state.
pub struct DistanceTracker {
    config: DistanceConfig,
    /// Last offset-adjusted reading, the unwrap reference
    last_position: f64,
    /// Continuous distance in output units, unbounded
    distance: f64,
}

impl DistanceTracker {
    /// Initialize the tracker at the current raw reading.
    ///
    /// Rejects a zero distance-per-rotation and an offset outside [0, 1);
    /// both would make the distance metric meaningless. With `reset_on_start`
    /// the distance is defined to be zero at `initial_raw`; otherwise it
    /// starts at the offset-adjusted reading scaled to output units, matching
    /// an absolute continuous encoder that was never reset.
    pub fn new(config: DistanceConfig, initial_raw: f64) -> Result<Self> {
        if config.distance_per_rotation == 0.0 {
            return Err(anyhow::anyhow!(
                "distance_per_rotation must be non-zero"
            ));
        }
        if let Some(offset) = config.position_offset {
            if !(0.0..1.0).contains(&offset) {
                return Err(anyhow::anyhow!(
                    "position offset {} out of range [0, 1)",
                    offset
                ));
            }
        }

        let adjusted = initial_raw - config.position_offset.unwrap_or(0.0);
        let distance = if config.reset_on_start {
            0.0
        } else {
            adjusted * config.distance_per_rotation
        };

        Ok(Self {
            config,
            last_position: adjusted,
            distance,
        })
    }

    /// Fold the next raw sample into the running distance and return it.
    ///
    /// The raw value is trusted to be in [0, 1); the external source never
    /// produces anything else.
    pub fn update(&mut self, raw: f64) -> f64 {
        let adjusted = raw - self.config.position_offset.unwrap_or(0.0);
        let mut delta = adjusted - self.last_position;

        // Unwrap: a jump over half a rotation is a wrap through 0/1,
        // take the shorter arc
        if delta > 0.5 {
            delta -= 1.0;
        } else if delta < -0.5 {
            delta += 1.0;
        }

        self.distance += delta * self.config.distance_per_rotation;
        self.last_position = adjusted;
        self.distance
    }

    /// Current continuous distance in output units
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn mode(&self) -> DistanceMode {
        self.config.mode
    }
}
