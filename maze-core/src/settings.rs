//! Generation settings and their validation.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Smallest grid side the generator accepts. A non-corner finish needs a side of at least 3.
pub const MIN_GENERATION_DIMENSION: usize = 3;

/// Default number of rows.
pub const DEFAULT_NROWS: usize = 100;
/// Default number of columns.
pub const DEFAULT_NCOLS: usize = 100;
/// Default cap on enrichment walks.
pub const DEFAULT_RANDOM_WALKS: u32 = 50;
/// Default time budget in milliseconds.
pub const DEFAULT_ALLOTTED_TIME_MS: u64 = 5_000;
/// Default target fraction of open cells.
pub const DEFAULT_DESIRED_COVERAGE: f64 = 0.5;
/// Default number of solve attempts.
pub const DEFAULT_MAX_SOLVE_ATTEMPTS: u32 = 32;

/// Errors raised when validating [`GenerationSettings`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// A grid dimension is below [`MIN_GENERATION_DIMENSION`].
    #[error("{name} must be at least {min}, got {value}")]
    DimensionTooSmall {
        /// Which dimension ("nrows" or "ncols").
        name: &'static str,
        /// The rejected value.
        value: usize,
        /// The smallest accepted value.
        min: usize,
    },
    /// Coverage must be a finite fraction in `[0, 1]`.
    #[error("Desired coverage must be within [0, 1], got {0}")]
    CoverageOutOfRange(f64),
    /// At least one solve attempt is needed to produce a maze.
    #[error("Maximum solve attempts must be at least 1")]
    ZeroSolveAttempts,
}

/// Immutable configuration for one maze generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct GenerationSettings {
    /// Number of grid rows.
    pub nrows: usize,
    /// Number of grid columns.
    pub ncols: usize,
    /// Upper bound on enrichment walks after the maze is solved.
    pub n_random_walks: u32,
    /// Wall-clock budget for a solve attempt, in milliseconds. Enrichment walks share it.
    pub allotted_time_ms: u64,
    /// Target fraction of open cells; enrichment stops once reached.
    pub desired_coverage: f64,
    /// Seed for deterministic generation. `None` seeds from system entropy.
    pub seed: Option<u64>,
    /// How many fresh grids to try before giving up on solving.
    pub max_solve_attempts: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            nrows: DEFAULT_NROWS,
            ncols: DEFAULT_NCOLS,
            n_random_walks: DEFAULT_RANDOM_WALKS,
            allotted_time_ms: DEFAULT_ALLOTTED_TIME_MS,
            desired_coverage: DEFAULT_DESIRED_COVERAGE,
            seed: None,
            max_solve_attempts: DEFAULT_MAX_SOLVE_ATTEMPTS,
        }
    }
}

impl GenerationSettings {
    /// Creates a new builder for `GenerationSettings`.
    pub fn builder() -> GenerationSettingsBuilder {
        GenerationSettingsBuilder::default()
    }

    /// The allotted budget as a `Duration`.
    pub const fn allotted_time(&self) -> Duration {
        Duration::from_millis(self.allotted_time_ms)
    }

    /// Cells in a grid of these dimensions.
    pub const fn total_cells(&self) -> usize {
        self.nrows * self.ncols
    }

    /// Checks every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, value) in [("nrows", self.nrows), ("ncols", self.ncols)] {
            if value < MIN_GENERATION_DIMENSION {
                return Err(SettingsError::DimensionTooSmall {
                    name,
                    value,
                    min: MIN_GENERATION_DIMENSION,
                });
            }
        }
        if !self.desired_coverage.is_finite() || !(0.0..=1.0).contains(&self.desired_coverage) {
            return Err(SettingsError::CoverageOutOfRange(self.desired_coverage));
        }
        if self.max_solve_attempts == 0 {
            return Err(SettingsError::ZeroSolveAttempts);
        }
        Ok(())
    }
}

/// Builder for `GenerationSettings`.
///
/// Unset fields fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerationSettingsBuilder {
    settings: GenerationSettings,
}

impl GenerationSettingsBuilder {
    /// Sets the grid dimensions.
    pub fn dimensions(mut self, nrows: usize, ncols: usize) -> Self {
        self.settings.nrows = nrows;
        self.settings.ncols = ncols;
        self
    }

    /// Sets the maximum number of enrichment walks.
    pub fn random_walks(mut self, n_random_walks: u32) -> Self {
        self.settings.n_random_walks = n_random_walks;
        self
    }

    /// Sets the time budget in milliseconds.
    pub fn allotted_time_ms(mut self, millis: u64) -> Self {
        self.settings.allotted_time_ms = millis;
        self
    }

    /// Sets the time budget from a `Duration`, saturating at `u64::MAX` milliseconds.
    pub fn allotted_time(mut self, budget: Duration) -> Self {
        self.settings.allotted_time_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the coverage target.
    pub fn desired_coverage(mut self, coverage: f64) -> Self {
        self.settings.desired_coverage = coverage;
        self
    }

    /// Sets the seed for the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    /// Sets how many solve attempts are made before generation fails.
    pub fn max_solve_attempts(mut self, attempts: u32) -> Self {
        self.settings.max_solve_attempts = attempts;
        self
    }

    /// Validates and builds the settings.
    pub fn build(self) -> Result<GenerationSettings, SettingsError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GenerationSettings::default().validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let settings = GenerationSettings::builder()
            .dimensions(12, 20)
            .random_walks(7)
            .allotted_time(Duration::from_millis(1500))
            .desired_coverage(0.25)
            .seed(42)
            .max_solve_attempts(3)
            .build()
            .unwrap();
        assert_eq!(settings.nrows, 12);
        assert_eq!(settings.ncols, 20);
        assert_eq!(settings.n_random_walks, 7);
        assert_eq!(settings.allotted_time(), Duration::from_millis(1500));
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.total_cells(), 240);
    }

    #[test]
    fn test_rejects_small_dimensions() {
        let err = GenerationSettings::builder()
            .dimensions(10, 2)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SettingsError::DimensionTooSmall {
                name: "ncols",
                value: 2,
                min: MIN_GENERATION_DIMENSION
            }
        );
    }

    #[test]
    fn test_rejects_coverage_outside_unit_interval() {
        for coverage in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let result = GenerationSettings::builder()
                .desired_coverage(coverage)
                .build();
            assert!(
                matches!(result, Err(SettingsError::CoverageOutOfRange(_))),
                "coverage {coverage} was accepted"
            );
        }
    }

    #[test]
    fn test_accepts_coverage_bounds() {
        for coverage in [0.0, 1.0] {
            assert!(GenerationSettings::builder()
                .desired_coverage(coverage)
                .build()
                .is_ok());
        }
    }

    #[test]
    fn test_rejects_zero_solve_attempts() {
        assert_eq!(
            GenerationSettings::builder().max_solve_attempts(0).build(),
            Err(SettingsError::ZeroSolveAttempts)
        );
    }
}
