use super::{Matrix, Network};
use crate::errors::{NetworkError, Result};
use crate::NetworkConfig;

use log::trace;

/// Per-parameter error gradients summed over a batch.
struct Gradients {
    weights: Box<[Matrix]>,
    biases: Box<[Box<[f32]>]>,
}

impl Gradients {
    fn zeros_like(network: &Network) -> Gradients {
        Gradients {
            weights: network
                .weights
                .iter()
                .map(|w| Matrix::zeros(w.rows(), w.columns()))
                .collect(),
            biases: network
                .biases
                .iter()
                .map(|b| vec![0.0; b.len()].into_boxed_slice())
                .collect(),
        }
    }
}

impl Network {
    /// Performs one mini-batch training step by backpropagation.
    ///
    /// Error gradients of every sample are accumulated, then
    /// averaged over the batch and applied to each weight as
    /// ```text
    /// update = learning_rate * (gradient / batch_size - regularization_factor * w)
    ///          + momentum_factor * previous_update
    /// ```
    /// Biases are updated the same way, without the
    /// regularization term. An empty batch does nothing.
    ///
    /// # Errors
    /// Returns [`NetworkError::BatchSizeMismatch`] if the batches
    /// differ in length, [`NetworkError::InputSizeMismatch`] or
    /// [`NetworkError::OutputSizeMismatch`] if any sample doesn't
    /// fit the network. All samples are checked before any
    /// parameter is touched.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let mut network = Network::new(&[2, 3, 1], NetworkConfig::default()).unwrap();
    /// let inputs = [[0.0f32, 1.0], [1.0, 1.0]];
    /// let expected = [[1.0f32], [0.0]];
    ///
    /// for _ in 0..10 {
    ///     network.train(&inputs, &expected).unwrap();
    /// }
    /// assert!(network.train(&inputs, &expected[..1]).is_err());
    /// ```
    pub fn train<I, E>(&mut self, input_batch: &[I], expected_output_batch: &[E]) -> Result<()>
    where
        I: AsRef<[f32]>,
        E: AsRef<[f32]>,
    {
        if input_batch.len() != expected_output_batch.len() {
            return Err(NetworkError::BatchSizeMismatch {
                inputs: input_batch.len(),
                expected_outputs: expected_output_batch.len(),
            });
        }
        let output_size = self.layer_sizes[self.layer_sizes.len() - 1];
        for (inputs, expected) in input_batch.iter().zip(expected_output_batch) {
            self.check_input(inputs.as_ref())?;
            if expected.as_ref().len() != output_size {
                return Err(NetworkError::OutputSizeMismatch {
                    expected: output_size,
                    found: expected.as_ref().len(),
                });
            }
        }
        if input_batch.is_empty() {
            return Ok(());
        }

        let mut gradients = Gradients::zeros_like(self);
        let mut squared_error = 0.0;
        for (inputs, expected) in input_batch.iter().zip(expected_output_batch) {
            self.propagate(inputs.as_ref());
            squared_error += self.accumulate_gradients(expected.as_ref(), &mut gradients);
        }
        self.apply_update(&gradients, input_batch.len());

        trace!(
            "trained on {} samples, mean squared error before update: {}",
            input_batch.len(),
            squared_error / (input_batch.len() * output_size) as f32
        );
        Ok(())
    }

    /// Backpropagates the error of the last forward pass
    /// against `expected`, adding each parameter's gradient
    /// to `gradients`. Returns the sample's summed squared error.
    fn accumulate_gradients(&self, expected: &[f32], gradients: &mut Gradients) -> f32 {
        let activation_type = self.config.activation_type;
        let mut errors: Vec<f32> = expected
            .iter()
            .zip(self.outputs())
            .map(|(e, y)| e - y)
            .collect();
        let squared_error = errors.iter().map(|e| e * e).sum::<f32>();

        for i in (0..self.weights.len()).rev() {
            let previous = &self.activations[i];
            let next = &self.activations[i + 1];
            let weights = &self.weights[i];
            let mut previous_errors = vec![0.0; previous.len()];

            for (j, (error, &y)) in errors.iter().zip(next.iter()).enumerate() {
                let delta = error * activation_type.derivative(y);
                gradients.biases[i][j] += delta;
                let parameters = gradients.weights[i]
                    .row_mut(j)
                    .iter_mut()
                    .zip(weights.row(j))
                    .zip(previous.iter())
                    .zip(previous_errors.iter_mut());
                for (((gradient, weight), a), previous_error) in parameters {
                    *gradient += delta * a;
                    *previous_error += weight * delta;
                }
            }
            errors = previous_errors;
        }
        squared_error
    }

    fn apply_update(&mut self, gradients: &Gradients, batch_size: usize) {
        let NetworkConfig {
            learning_rate,
            regularization_factor,
            momentum_factor,
            ..
        } = self.config;
        let batch_size = batch_size as f32;

        let weights = self
            .weights
            .iter_mut()
            .zip(self.weight_momentum.iter_mut())
            .zip(gradients.weights.iter());
        for ((layer, momentum), layer_gradients) in weights {
            let parameters = layer
                .as_mut_slice()
                .iter_mut()
                .zip(momentum.as_mut_slice())
                .zip(layer_gradients.as_slice());
            for ((w, m), g) in parameters {
                let update = learning_rate * (g / batch_size - regularization_factor * *w)
                    + momentum_factor * *m;
                *w += update;
                *m = update;
            }
        }

        let biases = self
            .biases
            .iter_mut()
            .zip(self.bias_momentum.iter_mut())
            .zip(gradients.biases.iter());
        for ((layer, momentum), layer_gradients) in biases {
            for ((b, m), g) in layer.iter_mut().zip(momentum.iter_mut()).zip(layer_gradients.iter()) {
                let update = learning_rate * (g / batch_size) + momentum_factor * *m;
                *b += update;
                *m = update;
            }
        }
    }
}
