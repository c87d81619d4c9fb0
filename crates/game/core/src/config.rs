/// Engine configuration constants and tunable parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Tolerance used when deciding whether an attribute value actually changed.
    /// Differences at or below this are treated as floating-point noise.
    pub value_epsilon: f32,

    /// Upper bound applied to every effect's `max_stacks`, whatever the content says.
    pub stack_ceiling: u32,

    /// Whether periodic effects' modifiers also count toward final values.
    /// When off, periodic effects only act through their stored-value ticks.
    pub fold_periodic_modifiers: bool,
}

impl EngineConfig {
    // ===== compile-time constants =====
    /// Stack cap used by effects that allow stacking but don't name a limit.
    pub const DEFAULT_MAX_STACKS: u32 = 1;
    /// Separator between tag path segments.
    pub const TAG_SEPARATOR: char = '.';
    /// Countdowns within this many seconds of zero count as elapsed.
    pub const TIME_EPSILON: f32 = 1.0e-4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_VALUE_EPSILON: f32 = 1.0e-5;
    pub const DEFAULT_STACK_CEILING: u32 = 99;
    pub const DEFAULT_FOLD_PERIODIC_MODIFIERS: bool = true;

    pub fn new() -> Self {
        Self {
            value_epsilon: Self::DEFAULT_VALUE_EPSILON,
            stack_ceiling: Self::DEFAULT_STACK_CEILING,
            fold_periodic_modifiers: Self::DEFAULT_FOLD_PERIODIC_MODIFIERS,
        }
    }

    /// Approximate float comparison scaled to the magnitude of the operands.
    pub fn approx_eq(&self, a: f32, b: f32) -> bool {
        let scale = a.abs().max(b.abs()).max(1.0);
        (a - b).abs() <= self.value_epsilon * scale
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_ignores_float_noise() {
        let config = EngineConfig::default();
        assert!(config.approx_eq(0.1 + 0.2, 0.3));
        assert!(config.approx_eq(1000.0, 1000.0001));
        assert!(!config.approx_eq(1.0, 1.01));
    }
}
