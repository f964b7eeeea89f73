/// Quiz size limits for callers taking sizes from users.
///
/// `QuizManager::generate` only caps to the pool size; front ends run user
/// input through `clamp` before calling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Quiz size callers should use when the user did not pick one.
    pub default_quiz_size: usize,
    /// Upper bound applied by `clamp`.
    pub max_quiz_size: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_quiz_size: 10,
            max_quiz_size: 40,
        }
    }
}

impl ManagerConfig {
    #[must_use]
    pub fn with_max_quiz_size(mut self, max: usize) -> Self {
        self.max_quiz_size = max.max(1);
        self
    }

    #[must_use]
    pub fn with_default_quiz_size(mut self, size: usize) -> Self {
        self.default_quiz_size = size.max(1);
        self
    }

    /// Clamp a requested size into `1..=max_quiz_size`.
    #[must_use]
    pub fn clamp(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_quiz_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upload_form_limits() {
        let config = ManagerConfig::default();
        assert_eq!(config.default_quiz_size, 10);
        assert_eq!(config.max_quiz_size, 40);
    }

    #[test]
    fn clamp_keeps_sizes_in_range() {
        let config = ManagerConfig::default().with_max_quiz_size(5);
        assert_eq!(config.clamp(0), 1);
        assert_eq!(config.clamp(3), 3);
        assert_eq!(config.clamp(99), 5);
    }

    #[test]
    fn builders_never_go_below_one() {
        let config = ManagerConfig::default()
            .with_max_quiz_size(0)
            .with_default_quiz_size(0);
        assert_eq!(config.max_quiz_size, 1);
        assert_eq!(config.default_quiz_size, 1);
    }
}
