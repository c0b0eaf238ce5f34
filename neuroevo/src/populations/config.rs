use super::errors::PopulationError;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]; [`validate`]
/// rejects values outside of it.
///
/// [`validate`]: PopulationConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of the population. Must be at least 2,
    /// so that the population has at least one elite.
    pub size: NonZeroUsize,
    /// Chance that any single parameter of a
    /// non-elite offspring is perturbed.
    pub mutation_rate: f32,
    /// Bound of the uniform distribution
    /// perturbations are drawn from.
    pub mutation_strength: f32,
}

impl PopulationConfig {
    /// Returns a "zero-valued" configuration.
    /// All values are 0, or in the case of
    /// `NonZeroUsize`s, 2.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use neuroevo::PopulationConfig;
    ///
    /// let cfg = PopulationConfig {
    ///     mutation_rate: 0.5,
    ///     ..PopulationConfig::zero()
    /// };
    /// assert_eq!(cfg.size.get(), 2);
    /// assert_eq!(cfg.mutation_strength, 0.0);
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 2 is a valid NonZeroUsize.
            size: unsafe { NonZeroUsize::new_unchecked(2) },
            mutation_rate: 0.0,
            mutation_strength: 0.0,
        }
    }

    /// Checks that every value is usable for evolution.
    ///
    /// # Errors
    /// Returns an error if the size is below 2, the mutation
    /// rate is outside of [0, 1], or the mutation strength is
    /// negative or not finite.
    ///
    /// # Examples
    /// ```
    /// use neuroevo::PopulationConfig;
    ///
    /// assert!(PopulationConfig::default().validate().is_ok());
    /// assert!(PopulationConfig {
    ///     mutation_rate: 1.5,
    ///     ..PopulationConfig::default()
    /// }
    /// .validate()
    /// .is_err());
    /// ```
    pub fn validate(&self) -> Result<(), PopulationError> {
        if self.size.get() < 2 {
            return Err(PopulationError::TooSmall(self.size.get()));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(PopulationError::InvalidMutationRate(self.mutation_rate));
        }
        if !self.mutation_strength.is_finite() || self.mutation_strength < 0.0 {
            return Err(PopulationError::InvalidMutationStrength(
                self.mutation_strength,
            ));
        }
        Ok(())
    }
}

impl Default for PopulationConfig {
    fn default() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 50 is a valid NonZeroUsize.
            size: unsafe { NonZeroUsize::new_unchecked(50) },
            mutation_rate: 0.1,
            mutation_strength: 0.3,
        }
    }
}
