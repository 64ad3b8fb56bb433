/// Configuration for a playback session.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Characters per second at `text_speed == 0.0`.
    pub min_cps: f64,
    /// Characters per second at `text_speed == 1.0` (at exactly 1.0 the
    /// reveal is instant instead).
    pub max_cps: f64,
    /// Seconds to wait after a line completes before auto-play advances.
    pub auto_play_delay: f64,
    /// Upper bound on consecutive skip-mode advances; guarantees the skip
    /// loop terminates even on a cyclic graph with no choices or end.
    pub skip_iteration_cap: usize,
    /// Maximum history backlog entries (oldest evicted). 0 = unlimited.
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_cps: 30.0,
            max_cps: 100.0,
            auto_play_delay: 2.0,
            skip_iteration_cap: 100,
            history_limit: 100,
        }
    }
}

impl EngineConfig {
    /// Set the typewriter speed range in characters per second.
    pub fn with_cps_range(mut self, min: f64, max: f64) -> Self {
        self.min_cps = min;
        self.max_cps = max;
        self
    }

    /// Set the auto-play delay in seconds.
    pub fn with_auto_play_delay(mut self, seconds: f64) -> Self {
        self.auto_play_delay = seconds;
        self
    }

    /// Set the skip-mode iteration cap.
    pub fn with_skip_iteration_cap(mut self, cap: usize) -> Self {
        self.skip_iteration_cap = cap;
        self
    }

    /// Set the history backlog limit (0 = unlimited).
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Reveal rate for a given text speed: linear between `min_cps` and
    /// `max_cps`.
    pub fn cps_for_speed(&self, text_speed: f64) -> f64 {
        let t = text_speed.clamp(0.0, 1.0);
        self.min_cps + (self.max_cps - self.min_cps) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = EngineConfig::default();
        assert!((config.min_cps - 30.0).abs() < f64::EPSILON);
        assert!((config.max_cps - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.skip_iteration_cap, 100);
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn config_builder_chain() {
        let config = EngineConfig::default()
            .with_cps_range(10.0, 50.0)
            .with_auto_play_delay(1.5)
            .with_skip_iteration_cap(10)
            .with_history_limit(5);
        assert!((config.cps_for_speed(0.0) - 10.0).abs() < f64::EPSILON);
        assert!((config.auto_play_delay - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.skip_iteration_cap, 10);
        assert_eq!(config.history_limit, 5);
    }

    #[test]
    fn cps_is_linear_in_speed() {
        let config = EngineConfig::default();
        assert!((config.cps_for_speed(0.0) - 30.0).abs() < f64::EPSILON);
        assert!((config.cps_for_speed(0.5) - 65.0).abs() < f64::EPSILON);
        assert!((config.cps_for_speed(1.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cps_clamps_out_of_range_speed() {
        let config = EngineConfig::default();
        assert!((config.cps_for_speed(-2.0) - 30.0).abs() < f64::EPSILON);
        assert!((config.cps_for_speed(7.0) - 100.0).abs() < f64::EPSILON);
    }
}
