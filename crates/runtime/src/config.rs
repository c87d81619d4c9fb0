//! Simulation configuration.

use gameplay_core::EngineConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Engine tuning handed to every spawned owner.
    pub engine: EngineConfig,
    /// Largest `dt` a single step may advance; longer steps are clamped.
    pub max_step: f32,
    /// Number of drained events kept for [`Simulation::take_events`](crate::Simulation::take_events).
    /// Older events are dropped once the log is full.
    pub event_log_capacity: usize,
}

impl SimulationConfig {
    pub const DEFAULT_MAX_STEP: f32 = 0.25;
    pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 1024;

    pub fn with_engine(engine: EngineConfig) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// Clamps a caller-supplied delta into `[0, max_step]`.
    pub fn clamp_step(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_step.max(0.0))
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            max_step: Self::DEFAULT_MAX_STEP,
            event_log_capacity: Self::DEFAULT_EVENT_LOG_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_clamped() {
        let config = SimulationConfig::default();
        assert_eq!(config.clamp_step(1.0), SimulationConfig::DEFAULT_MAX_STEP);
        assert_eq!(config.clamp_step(-1.0), 0.0);
        assert_eq!(config.clamp_step(f32::NAN), 0.0);
        assert_eq!(config.clamp_step(0.1), 0.1);
    }
}
