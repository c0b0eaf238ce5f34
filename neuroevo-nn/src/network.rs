//! A Network is a dense feed-forward neural network.
//! Every neuron of a layer is connected to every neuron
//! of the previous layer, and all non-input layers share
//! one activation function.
//!
//! Networks are evaluated with [`Network::feed_forward`],
//! trained by backpropagation with [`Network::train`], and
//! evolved as genomes of a [`neuroevo::Population`].
mod matrix;
mod training;

pub(crate) use matrix::Matrix;

use crate::errors::{NetworkError, Result};
use crate::{ActivationType, NetworkConfig};

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;

/// A dense feed-forward neural network.
///
/// Weights of the transition from layer `i` to layer `i + 1`
/// are stored as a row-major `layer_sizes[i + 1] × layer_sizes[i]`
/// matrix; row `j` holds the incoming weights of neuron `j`.
///
/// Supports Serde through [`NetworkRecord`], so only parameters
/// and hyperparameters are persisted.
///
/// [`NetworkRecord`]: crate::NetworkRecord
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "crate::NetworkRecord", into = "crate::NetworkRecord")]
pub struct Network {
    layer_sizes: Box<[usize]>,
    weights: Box<[Matrix]>,
    biases: Box<[Box<[f32]>]>,
    weight_momentum: Box<[Matrix]>,
    bias_momentum: Box<[Box<[f32]>]>,
    activations: Box<[Box<[f32]>]>,
    config: NetworkConfig,
    pub(crate) fitness: f32,
}

impl Network {
    /// Creates a new network with the specified layer sizes
    /// (input layer first, output layer last) and hyperparameters.
    ///
    /// Weights and biases of each layer transition are drawn
    /// uniformly from `[-r, r]`, with `r = sqrt(6 / (fan_in + fan_out))`.
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidArchitecture`] if fewer than
    /// two layers are given or any layer is empty, and
    /// [`NetworkError::InvalidHyperparameters`] if the configuration
    /// is out of range.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{ActivationType, Network, NetworkConfig, NetworkError};
    ///
    /// let config = NetworkConfig {
    ///     activation_type: ActivationType::Tanh,
    ///     learning_rate: 0.05,
    ///     regularization_factor: 0.0,
    ///     momentum_factor: 0.5,
    /// };
    /// let network = Network::new(&[10, 16, 16, 2], config).unwrap();
    ///
    /// assert_eq!(network.layer_sizes(), &[10, 16, 16, 2]);
    /// // Glorot range of the first transition.
    /// let r = (6.0f32 / (10.0 + 16.0)).sqrt();
    /// assert!(network.weights(0).flatten().all(|w| w.abs() <= r));
    ///
    /// assert!(matches!(
    ///     Network::new(&[3], config),
    ///     Err(NetworkError::InvalidArchitecture(_))
    /// ));
    /// ```
    pub fn new(layer_sizes: &[usize], config: NetworkConfig) -> Result<Network> {
        Self::new_with_rng(layer_sizes, config, &mut rand::thread_rng())
    }

    /// Same as [`new`], drawing parameters from the
    /// passed random number generator.
    ///
    /// [`new`]: Network::new
    pub fn new_with_rng<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        config: NetworkConfig,
        rng: &mut R,
    ) -> Result<Network> {
        validate_architecture(layer_sizes)?;
        config.validate()?;
        Ok(Self::random(layer_sizes, config, rng))
    }

    /// Creates a new network with all weights and biases set to 0.
    ///
    /// # Errors
    /// Same as [`new`].
    ///
    /// [`new`]: Network::new
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let mut network = Network::zeroed(&[3, 5, 2], NetworkConfig::default()).unwrap();
    /// assert_eq!(network.feed_forward(&[0.3, -1.0, 4.0]).unwrap(), vec![0.5, 0.5]);
    /// ```
    pub fn zeroed(layer_sizes: &[usize], config: NetworkConfig) -> Result<Network> {
        validate_architecture(layer_sizes)?;
        config.validate()?;
        let weights = layer_sizes
            .windows(2)
            .map(|pair| Matrix::zeros(pair[1], pair[0]))
            .collect();
        let biases = layer_sizes[1..]
            .iter()
            .map(|&size| vec![0.0; size].into_boxed_slice())
            .collect();
        Ok(Self::from_parts(layer_sizes.into(), weights, biases, config))
    }

    /// Assumes validated layer sizes and configuration.
    fn random<R: Rng + ?Sized>(layer_sizes: &[usize], config: NetworkConfig, rng: &mut R) -> Network {
        let mut weights: Vec<Matrix> = Vec::with_capacity(layer_sizes.len() - 1);
        let mut biases: Vec<Box<[f32]>> = Vec::with_capacity(layer_sizes.len() - 1);
        for pair in layer_sizes.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let range = glorot_range(fan_in, fan_out);
            weights.push(Matrix::from_fn(fan_out, fan_in, || {
                rng.gen_range(-range..=range)
            }));
            biases.push(
                std::iter::repeat_with(|| rng.gen_range(-range..=range))
                    .take(fan_out)
                    .collect(),
            );
        }
        Self::from_parts(layer_sizes.into(), weights.into(), biases.into(), config)
    }

    /// Assembles a network around already shaped parameters,
    /// with zeroed momentum, activations and fitness.
    pub(crate) fn from_parts(
        layer_sizes: Box<[usize]>,
        weights: Box<[Matrix]>,
        biases: Box<[Box<[f32]>]>,
        config: NetworkConfig,
    ) -> Network {
        let weight_momentum = weights
            .iter()
            .map(|w| Matrix::zeros(w.rows(), w.columns()))
            .collect();
        let bias_momentum = biases
            .iter()
            .map(|b| vec![0.0; b.len()].into_boxed_slice())
            .collect();
        let activations = layer_sizes
            .iter()
            .map(|&size| vec![0.0; size].into_boxed_slice())
            .collect();
        Network {
            layer_sizes,
            weights,
            biases,
            weight_momentum,
            bias_momentum,
            activations,
            config,
            fitness: 0.0,
        }
    }

    /// Returns a network with the same topology and
    /// hyperparameters, and freshly randomized parameters.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let template = Network::new(&[4, 3], NetworkConfig::default()).unwrap();
    /// let other = template.randomized();
    ///
    /// assert_eq!(template.layer_sizes(), other.layer_sizes());
    /// assert_eq!(template.config(), other.config());
    /// ```
    pub fn randomized(&self) -> Network {
        self.randomized_with_rng(&mut rand::thread_rng())
    }

    /// Same as [`randomized`], drawing parameters from the
    /// passed random number generator.
    ///
    /// [`randomized`]: Network::randomized
    pub fn randomized_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Network {
        Self::random(&self.layer_sizes, self.config, rng)
    }

    /// Returns a copy of the network for genetic reproduction:
    /// weights, biases and hyperparameters are copied exactly,
    /// while momentum and fitness start over from 0.
    ///
    /// Use `clone` to copy the full training state instead.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let mut parent = Network::new(&[2, 2], NetworkConfig::default()).unwrap();
    /// let mut child = parent.offspring();
    ///
    /// assert_eq!(parent.to_flat(), child.to_flat());
    /// assert_eq!(
    ///     parent.feed_forward(&[0.1, 0.9]).unwrap(),
    ///     child.feed_forward(&[0.1, 0.9]).unwrap()
    /// );
    /// ```
    pub fn offspring(&self) -> Network {
        Self::from_parts(
            self.layer_sizes.clone(),
            self.weights.clone(),
            self.biases.clone(),
            self.config,
        )
    }

    /// Evaluates the network at `inputs`, returning a copy
    /// of the output layer's activations.
    ///
    /// Every layer's activations are overwritten in place.
    ///
    /// # Errors
    /// Returns [`NetworkError::InputSizeMismatch`] if `inputs`
    /// doesn't have exactly as many values as the input layer.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{Network, NetworkConfig, NetworkError};
    ///
    /// let mut network = Network::new(&[3, 2], NetworkConfig::default()).unwrap();
    ///
    /// let outputs = network.feed_forward(&[1.0, 0.5, -0.5]).unwrap();
    /// assert_eq!(outputs.len(), 2);
    /// assert_eq!(outputs, network.feed_forward(&[1.0, 0.5, -0.5]).unwrap());
    ///
    /// assert_eq!(
    ///     network.feed_forward(&[1.0, 0.5]),
    ///     Err(NetworkError::InputSizeMismatch { expected: 3, found: 2 })
    /// );
    /// ```
    pub fn feed_forward(&mut self, inputs: &[f32]) -> Result<Vec<f32>> {
        self.check_input(inputs)?;
        self.propagate(inputs);
        Ok(self.outputs().to_vec())
    }

    fn check_input(&self, inputs: &[f32]) -> Result<()> {
        if inputs.len() != self.layer_sizes[0] {
            return Err(NetworkError::InputSizeMismatch {
                expected: self.layer_sizes[0],
                found: inputs.len(),
            });
        }
        Ok(())
    }

    /// Computes every layer's activations.
    /// Assumes the input size has been checked.
    fn propagate(&mut self, inputs: &[f32]) {
        self.activations[0].copy_from_slice(inputs);
        let activation_type = self.config.activation_type;
        for (i, (weights, biases)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            let (previous, next) = self.activations.split_at_mut(i + 1);
            let (previous, next) = (&previous[i], &mut next[0]);
            for ((neuron, row), bias) in next.iter_mut().zip(weights.iter_rows()).zip(biases.iter()) {
                let sum = bias
                    + row
                        .iter()
                        .zip(previous.iter())
                        .map(|(w, a)| w * a)
                        .sum::<f32>();
                *neuron = activation_type.activate(sum);
            }
        }
    }

    /// Mutates the network's parameters. Each weight and bias is
    /// independently nudged, with probability `rate`, by a value
    /// drawn uniformly from `[-strength, strength]`.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let mut network = Network::new(&[3, 4, 2], NetworkConfig::default()).unwrap();
    /// let before = network.to_flat();
    ///
    /// network.mutate(0.0, 10.0);
    /// assert_eq!(network.to_flat(), before);
    ///
    /// network.mutate(1.0, 0.5);
    /// let after = network.to_flat();
    /// assert!(before
    ///     .weights_flat
    ///     .iter()
    ///     .zip(&after.weights_flat)
    ///     .all(|(b, a)| (b - a).abs() <= 0.5 + f32::EPSILON));
    /// ```
    pub fn mutate(&mut self, rate: f32, strength: f32) {
        self.mutate_with_rng(rate, strength, &mut rand::thread_rng());
    }

    /// Same as [`mutate`], drawing from the passed
    /// random number generator.
    ///
    /// [`mutate`]: Network::mutate
    pub fn mutate_with_rng<R: Rng + ?Sized>(&mut self, rate: f32, strength: f32, rng: &mut R) {
        let parameters = self
            .weights
            .iter_mut()
            .flat_map(|w| w.as_mut_slice())
            .chain(self.biases.iter_mut().flat_map(|b| b.iter_mut()));
        for parameter in parameters {
            if rng.gen::<f32>() < rate {
                *parameter += (rng.gen::<f32>() * 2.0 - 1.0) * strength;
            }
        }
    }

    /// Clears the momentum of every weight and bias,
    /// so the next training step starts from rest.
    pub fn reset_momentum(&mut self) {
        self.weight_momentum.iter_mut().for_each(|m| m.fill(0.0));
        self.bias_momentum
            .iter_mut()
            .for_each(|m| m.iter_mut().for_each(|x| *x = 0.0));
    }

    /// Returns the size of each layer, input layer first.
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Returns the network's hyperparameters.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Replaces the network's hyperparameters.
    ///
    /// # Errors
    /// Returns an error, leaving the network unchanged,
    /// if the configuration is out of range.
    pub fn set_config(&mut self, config: NetworkConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Returns the activation function of non-input layers.
    pub fn activation_type(&self) -> ActivationType {
        self.config.activation_type
    }

    /// Returns the rows of the weight matrix between layers
    /// `transition` and `transition + 1`. Row `j` holds the
    /// incoming weights of neuron `j` of layer `transition + 1`.
    ///
    /// # Panics
    /// Panics if `transition >= layer_sizes().len() - 1`.
    pub fn weights(&self, transition: usize) -> impl Iterator<Item = &[f32]> + '_ {
        self.weights[transition].iter_rows()
    }

    /// Returns the biases of layer `transition + 1`,
    /// the first non-input layer being `transition == 0`.
    ///
    /// # Panics
    /// Panics if `transition >= layer_sizes().len() - 1`.
    pub fn biases(&self, transition: usize) -> &[f32] {
        &self.biases[transition]
    }

    /// Returns the activations of every layer computed
    /// by the most recent forward pass.
    pub fn activations(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.activations.iter().map(|a| &a[..])
    }

    /// Returns the output layer's activations computed
    /// by the most recent forward pass.
    pub fn outputs(&self) -> &[f32] {
        &self.activations[self.activations.len() - 1]
    }

    /// Returns the total number of weights and biases.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let network = Network::new(&[3, 4, 2], NetworkConfig::default()).unwrap();
    /// assert_eq!(network.parameter_count(), (3 * 4 + 4) + (4 * 2 + 2));
    /// ```
    pub fn parameter_count(&self) -> usize {
        self.weights.iter().map(|w| w.as_slice().len()).sum::<usize>()
            + self.biases.iter().map(|b| b.len()).sum::<usize>()
    }

    pub(crate) fn weight_matrices(&self) -> &[Matrix] {
        &self.weights
    }

    pub(crate) fn bias_vectors(&self) -> &[Box<[f32]>] {
        &self.biases
    }
}

/// Checks that there are at least two layers, and that
/// every layer size is positive and representable as an `i32`.
pub(crate) fn validate_architecture(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2
        || layer_sizes
            .iter()
            .any(|&size| size == 0 || size > i32::MAX as usize)
    {
        return Err(NetworkError::InvalidArchitecture(layer_sizes.to_vec()));
    }
    Ok(())
}

fn glorot_range(fan_in: usize, fan_out: usize) -> f32 {
    (6.0 / (fan_in + fan_out) as f32).sqrt()
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Network {:?} ({:?}, {} parameters, fitness {})",
            self.layer_sizes,
            self.config.activation_type,
            self.parameter_count(),
            self.fitness
        )
    }
}
