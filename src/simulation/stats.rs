//! Step bookkeeping shared by simulated components

/// Counts steps and the simulated time they covered
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepStats {
    pub step_count: u64,
    pub simulated_time: f32,
}

impl StepStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a simulation step
    pub fn record_step(&mut self, delta_time: f32) {
        self.step_count += 1;
        self.simulated_time += delta_time;
    }

    /// Average step length over the recorded steps
    pub fn average_step_time(&self) -> f32 {
        if self.step_count > 0 {
            self.simulated_time / self.step_count as f32
        } else {
            0.0
        }
    }

    /// Steps per simulated second
    pub fn frequency(&self) -> f32 {
        let avg = self.average_step_time();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.step_count = 0;
        self.simulated_time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let mut stats = StepStats::new();
        assert_eq!(stats.frequency(), 0.0);

        stats.record_step(0.02);
        stats.record_step(0.02);
        assert_eq!(stats.step_count, 2);
        assert!((stats.average_step_time() - 0.02).abs() < 1e-6);
        assert!((stats.frequency() - 50.0).abs() < 1e-3);

        stats.reset();
        assert_eq!(stats, StepStats::default());
    }
}
