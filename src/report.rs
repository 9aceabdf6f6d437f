use crate::distance::DistanceMode;

/// Default report interval: one line per second at the 50 Hz tick rate
pub const DEFAULT_REPORT_INTERVAL: u64 = 50;

/// Rate-limits the distance printout to one line per `interval` ticks.
///
/// The heartbeat counter increments on every call whether or not a line
/// fires, so reports land on heartbeats 0, 50, 100, ...
pub struct Reporter {
    heartbeats: u64,
    interval: u64,
}

impl Reporter {
    pub fn new(interval: u64) -> Self {
        Self {
            heartbeats: 0,
            interval: interval.max(1),
        }
    }

    /// Format a report line if one is due this tick
    pub fn report_if_due(&mut self, mode: DistanceMode, distance: f64, raw: f64) -> Option<String> {
        let due = self.heartbeats % self.interval == 0;
        self.heartbeats += 1;

        if due {
            Some(format!(
                "{}: {:9.6}  (Absolute Encoder: {})",
                mode.label(),
                distance,
                raw
            ))
        } else {
            None
        }
    }

    /// Total ticks seen so far
    pub fn heartbeats(&self) -> u64 {
        self.heartbeats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_reports() {
        let mut reporter = Reporter::new(50);
        assert!(reporter.report_if_due(DistanceMode::Angular, 0.0, 0.0).is_some());
    }

    #[test]
    fn test_one_report_per_interval() {
        let mut reporter = Reporter::new(50);
        let mut fired = Vec::new();
        for tick in 0..150u64 {
            if reporter.report_if_due(DistanceMode::Angular, 0.0, 0.0).is_some() {
                fired.push(tick);
            }
        }
        assert_eq!(fired, vec![0, 50, 100]);
        assert_eq!(reporter.heartbeats(), 150);
    }

    #[test]
    fn test_pre_call_heartbeat_is_the_report_tick() {
        // Callers that label a sample with `heartbeats()` before the call
        // get the same tick number the report fires on
        let mut reporter = Reporter::new(50);
        for _ in 0..150u64 {
            let tick = reporter.heartbeats();
            let fired = reporter
                .report_if_due(DistanceMode::Angular, 0.0, 0.0)
                .is_some();
            assert_eq!(fired, tick % 50 == 0);
        }
    }

    #[test]
    fn test_heartbeat_counts_suppressed_ticks() {
        let mut reporter = Reporter::new(10);
        for _ in 0..7 {
            reporter.report_if_due(DistanceMode::Linear, 1.0, 0.5);
        }
        assert_eq!(reporter.heartbeats(), 7);
    }

    #[test]
    fn test_angular_line_format() {
        let mut reporter = Reporter::new(1);
        let line = reporter
            .report_if_due(DistanceMode::Angular, -54.0, 0.95)
            .unwrap();
        assert_eq!(line, "Net Degrees Travelled: -54.000000  (Absolute Encoder: 0.95)");
    }

    #[test]
    fn test_linear_line_format_pads_width() {
        let mut reporter = Reporter::new(1);
        let line = reporter
            .report_if_due(DistanceMode::Linear, 0.0, 0.2457)
            .unwrap();
        // 9-wide, 6-decimal fixed formatting
        assert_eq!(line, "Net Feet Travelled:  0.000000  (Absolute Encoder: 0.2457)");
    }
}
