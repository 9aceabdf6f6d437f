use clap::ValueEnum;

/// Autonomous routine stub.
///
/// The selection is announced at startup and carried through the run, but
/// neither routine does anything yet; this mirrors the selector that robot
/// programs grow an actual autonomous mode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AutoRoutine {
    #[default]
    Default,
    Custom,
}

impl AutoRoutine {
    pub fn name(&self) -> &'static str {
        match self {
            AutoRoutine::Default => "Default Auto",
            AutoRoutine::Custom => "My Auto",
        }
    }

    /// One autonomous step per tick. Both routines are currently no-ops.
    pub fn step(&self) {
        match self {
            AutoRoutine::Custom => {}
            AutoRoutine::Default => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routine_names() {
        assert_eq!(AutoRoutine::Default.name(), "Default Auto");
        assert_eq!(AutoRoutine::Custom.name(), "My Auto");
    }

    #[test]
    fn test_default_selection() {
        assert_eq!(AutoRoutine::default(), AutoRoutine::Default);
    }
}
