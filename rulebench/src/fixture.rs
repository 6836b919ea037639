use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::errors::{BenchError, BenchResult};
use crate::search::matcher::{self, CompiledPattern};

/// The ordered patterns a strategy scans.
///
/// The standard fixture is `pattern_count` handles to one compiled `miss_pattern`,
/// followed by a single compiled `hit_pattern`, so exactly the last element matches the
/// target.
#[derive(Debug, Clone)]
pub struct Fixture {
    patterns: Vec<CompiledPattern>,
}

impl Fixture {
    /// Builds the standard fixture: `pattern_count` misses, then one hit
    pub fn build(config: &BenchConfig) -> BenchResult<Self> {
        let mut fixture = Self::build_without_match(config)?;
        fixture
            .patterns
            .push(CompiledPattern::compile(&config.hit_pattern)?);
        info!(
            "Built fixture of {} patterns, match expected at index {}",
            fixture.len(),
            fixture.len() - 1
        );
        Ok(fixture)
    }

    /// Builds `pattern_count` misses with no matching pattern appended
    pub fn build_without_match(config: &BenchConfig) -> BenchResult<Self> {
        let miss = CompiledPattern::compile(&config.miss_pattern)?;
        let count = usize::try_from(config.pattern_count)
            .map_err(|_| BenchError::config_error("pattern_count does not fit in memory"))?;

        let mut patterns = Vec::with_capacity(count + 1);
        patterns.extend(std::iter::repeat(miss).take(count));

        debug!("Filled fixture with {} copies of {}", count, config.miss_pattern);
        Ok(Self { patterns })
    }

    /// Wraps an explicit pattern sequence
    pub fn from_patterns(patterns: Vec<CompiledPattern>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Indices of every pattern that matches `target`
    pub fn match_positions(&self, target: &str) -> Vec<usize> {
        self.patterns
            .iter()
            .enumerate()
            .filter(|(_, pattern)| matcher::matches(pattern, target))
            .map(|(index, _)| index)
            .collect()
    }
}
