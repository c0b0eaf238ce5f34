use crate::errors::{NetworkError, Result};
use crate::ActivationType;

use serde::{Deserialize, Serialize};

/// Activation and training hyperparameters of a network.
///
/// # Note
/// Ranges are checked by [`validate`], which every
/// network constructor calls.
///
/// [`validate`]: NetworkConfig::validate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Activation function of all non-input layers.
    pub activation_type: ActivationType,
    /// Step size of each training update, in (0, 1].
    pub learning_rate: f32,
    /// L2 weight decay factor, in [0, 0.1].
    pub regularization_factor: f32,
    /// Fraction of the previous update blended
    /// into the next one, in [0, 1).
    pub momentum_factor: f32,
}

impl NetworkConfig {
    /// Checks every hyperparameter against its valid range.
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidHyperparameters`] naming
    /// the first offending value.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::NetworkConfig;
    ///
    /// assert!(NetworkConfig::default().validate().is_ok());
    ///
    /// let config = NetworkConfig {
    ///     momentum_factor: 1.0,
    ///     ..NetworkConfig::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (
                "learning_rate",
                self.learning_rate,
                self.learning_rate > 0.0 && self.learning_rate <= 1.0,
            ),
            (
                "regularization_factor",
                self.regularization_factor,
                (0.0..=0.1).contains(&self.regularization_factor),
            ),
            (
                "momentum_factor",
                self.momentum_factor,
                (0.0..1.0).contains(&self.momentum_factor),
            ),
        ];
        match checks.iter().find(|(_, _, valid)| !valid) {
            Some(&(name, value, _)) => Err(NetworkError::InvalidHyperparameters { name, value }),
            None => Ok(()),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> NetworkConfig {
        NetworkConfig {
            activation_type: ActivationType::Sigmoid,
            learning_rate: 0.1,
            regularization_factor: 0.001,
            momentum_factor: 0.9,
        }
    }
}
