use crate::errors::{NetworkError, Result, ShapeContext};
use crate::network::{validate_architecture, Matrix};
use crate::{Network, NetworkConfig};

use serde::{Deserialize, Serialize};

/// Flat, shape-annotated representation of a network's parameters.
///
/// Weights are flattened row-major, one matrix after the other,
/// with each matrix's `(rows, columns)` recorded in `weight_shapes`.
/// Biases are concatenated per non-input layer, with each
/// layer's length recorded in `bias_shapes`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatParams {
    pub layer_sizes: Vec<i32>,
    pub weights_flat: Vec<f32>,
    pub weight_shapes: Vec<(i32, i32)>,
    pub biases_flat: Vec<f32>,
    pub bias_shapes: Vec<i32>,
}

impl FlatParams {
    /// Returns the total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.weights_flat.len() + self.biases_flat.len()
    }
}

/// A network's flat parameters together with its
/// activation function and training hyperparameters.
///
/// This is the persisted form of a [`Network`]; momentum,
/// activations and fitness are not part of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub config: NetworkConfig,
    pub params: FlatParams,
}

impl Network {
    /// Flattens the network's parameters.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let network = Network::new(&[3, 4, 2], NetworkConfig::default()).unwrap();
    /// let flat = network.to_flat();
    ///
    /// assert_eq!(flat.layer_sizes, vec![3, 4, 2]);
    /// assert_eq!(flat.weight_shapes, vec![(4, 3), (2, 4)]);
    /// assert_eq!(flat.bias_shapes, vec![4, 2]);
    /// assert_eq!(flat.parameter_count(), network.parameter_count());
    /// ```
    pub fn to_flat(&self) -> FlatParams {
        let weights = self.weight_matrices();
        let biases = self.bias_vectors();
        FlatParams {
            layer_sizes: self.layer_sizes().iter().map(|&size| size as i32).collect(),
            weights_flat: weights
                .iter()
                .flat_map(|w| w.as_slice().iter().copied())
                .collect(),
            weight_shapes: weights
                .iter()
                .map(|w| (w.rows() as i32, w.columns() as i32))
                .collect(),
            biases_flat: biases.iter().flat_map(|b| b.iter().copied()).collect(),
            bias_shapes: biases.iter().map(|b| b.len() as i32).collect(),
        }
    }

    /// Rebuilds a network from flat parameters,
    /// with the default [`NetworkConfig`].
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidArchitecture`] if the layer sizes
    /// are invalid, and [`NetworkError::ShapeMismatch`] if the declared
    /// shapes disagree with the layer sizes or the flat data.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::{Network, NetworkConfig, NetworkError};
    ///
    /// let mut network = Network::new(&[2, 3, 1], NetworkConfig::default()).unwrap();
    /// let mut copy = Network::from_flat(&network.to_flat()).unwrap();
    /// assert_eq!(
    ///     network.feed_forward(&[0.2, 0.8]).unwrap(),
    ///     copy.feed_forward(&[0.2, 0.8]).unwrap()
    /// );
    ///
    /// let mut flat = network.to_flat();
    /// flat.biases_flat.pop();
    /// assert!(matches!(
    ///     Network::from_flat(&flat),
    ///     Err(NetworkError::ShapeMismatch { .. })
    /// ));
    /// ```
    pub fn from_flat(flat: &FlatParams) -> Result<Network> {
        Self::from_flat_with_config(flat, NetworkConfig::default())
    }

    /// Same as [`from_flat`], with the specified hyperparameters.
    ///
    /// # Errors
    /// Same as [`from_flat`], plus [`NetworkError::InvalidHyperparameters`]
    /// if `config` is out of range.
    ///
    /// [`from_flat`]: Network::from_flat
    pub fn from_flat_with_config(flat: &FlatParams, config: NetworkConfig) -> Result<Network> {
        // Negative sizes become 0, which never validates.
        let layer_sizes: Vec<usize> = flat.layer_sizes.iter().map(|&size| dimension(size)).collect();
        validate_architecture(&layer_sizes)?;
        config.validate()?;
        let transitions = layer_sizes.len() - 1;

        check(ShapeContext::WeightShapeCount, transitions, flat.weight_shapes.len())?;
        let mut weight_count = 0usize;
        for (i, (&(rows, columns), pair)) in flat
            .weight_shapes
            .iter()
            .zip(layer_sizes.windows(2))
            .enumerate()
        {
            check(ShapeContext::WeightRows(i), pair[1], dimension(rows))?;
            check(ShapeContext::WeightColumns(i), pair[0], dimension(columns))?;
            weight_count = weight_count.saturating_add(pair[0].saturating_mul(pair[1]));
        }
        check(ShapeContext::WeightCount, weight_count, flat.weights_flat.len())?;

        check(ShapeContext::BiasShapeCount, transitions, flat.bias_shapes.len())?;
        for (i, (&length, &size)) in flat.bias_shapes.iter().zip(&layer_sizes[1..]).enumerate() {
            check(ShapeContext::BiasLength(i), size, dimension(length))?;
        }
        let bias_count = layer_sizes[1..].iter().sum();
        check(ShapeContext::BiasCount, bias_count, flat.biases_flat.len())?;

        let mut remaining = &flat.weights_flat[..];
        let weights = layer_sizes
            .windows(2)
            .map(|pair| {
                let (matrix, rest) = remaining.split_at(pair[0] * pair[1]);
                remaining = rest;
                Matrix::from_row_major(pair[1], pair[0], matrix)
            })
            .collect();
        let mut remaining = &flat.biases_flat[..];
        let biases = layer_sizes[1..]
            .iter()
            .map(|&size| {
                let (layer, rest) = remaining.split_at(size);
                remaining = rest;
                Box::<[f32]>::from(layer)
            })
            .collect();

        Ok(Network::from_parts(layer_sizes.into(), weights, biases, config))
    }

    /// Returns the network's persistable record:
    /// flat parameters plus hyperparameters.
    pub fn to_record(&self) -> NetworkRecord {
        NetworkRecord {
            config: *self.config(),
            params: self.to_flat(),
        }
    }

    /// Rebuilds a network from a record.
    ///
    /// # Errors
    /// Same as [`from_flat_with_config`].
    ///
    /// [`from_flat_with_config`]: Network::from_flat_with_config
    pub fn from_record(record: &NetworkRecord) -> Result<Network> {
        Self::from_flat_with_config(&record.params, record.config)
    }
}

/// Flattens `network`'s parameters. See [`Network::to_flat`].
pub fn to_flat(network: &Network) -> FlatParams {
    network.to_flat()
}

/// Rebuilds a network from flat parameters. See [`Network::from_flat`].
pub fn from_flat(flat: &FlatParams) -> Result<Network> {
    Network::from_flat(flat)
}

impl TryFrom<NetworkRecord> for Network {
    type Error = NetworkError;

    fn try_from(record: NetworkRecord) -> Result<Network> {
        Network::from_record(&record)
    }
}

impl From<Network> for NetworkRecord {
    fn from(network: Network) -> NetworkRecord {
        network.to_record()
    }
}

fn dimension(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

fn check(context: ShapeContext, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(NetworkError::ShapeMismatch {
            context,
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActivationType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn network(layer_sizes: &[usize]) -> Network {
        let mut rng = StdRng::seed_from_u64(1234);
        Network::new_with_rng(layer_sizes, NetworkConfig::default(), &mut rng).unwrap()
    }

    fn shape_error(flat: &FlatParams) -> Option<(ShapeContext, usize, usize)> {
        match Network::from_flat(flat) {
            Err(NetworkError::ShapeMismatch {
                context,
                expected,
                found,
            }) => Some((context, expected, found)),
            _ => None,
        }
    }

    #[test]
    fn round_trip_is_exact() {
        for layer_sizes in [&[1, 1][..], &[5, 3][..], &[4, 7, 7, 2][..]] {
            let mut original = network(layer_sizes);
            let flat = original.to_flat();
            let mut decoded = Network::from_flat(&flat).unwrap();

            assert_eq!(decoded.to_flat(), flat);
            assert_eq!(decoded.layer_sizes(), layer_sizes);
            let inputs = vec![0.5; layer_sizes[0]];
            assert_eq!(
                original.feed_forward(&inputs).unwrap(),
                decoded.feed_forward(&inputs).unwrap()
            );
        }
    }

    #[test]
    fn flat_layout() {
        let flat = FlatParams {
            layer_sizes: vec![2, 1],
            weights_flat: vec![1.5, -2.0],
            weight_shapes: vec![(1, 2)],
            biases_flat: vec![0.25],
            bias_shapes: vec![1],
        };
        let mut decoded = from_flat(&flat).unwrap();

        assert_eq!(decoded.weights(0).collect::<Vec<_>>(), vec![&[1.5f32, -2.0][..]]);
        assert_eq!(decoded.biases(0), &[0.25]);
        assert_eq!(
            decoded.feed_forward(&[1.0, 1.0]).unwrap(),
            vec![ActivationType::Sigmoid.activate(0.25 + (1.5 + -2.0))]
        );
        assert_eq!(to_flat(&decoded), flat);
    }

    #[test]
    fn invalid_layer_sizes() {
        let mut flat = network(&[2, 2]).to_flat();
        flat.layer_sizes = vec![2, -2];
        assert_eq!(
            Network::from_flat(&flat).err(),
            Some(NetworkError::InvalidArchitecture(vec![2, 0]))
        );
        flat.layer_sizes = vec![2];
        assert!(matches!(
            Network::from_flat(&flat),
            Err(NetworkError::InvalidArchitecture(_))
        ));
    }

    #[test]
    fn weight_shape_mismatches() {
        let flat = network(&[3, 4, 2]).to_flat();

        let mut broken = flat.clone();
        broken.weight_shapes.pop();
        assert_eq!(shape_error(&broken), Some((ShapeContext::WeightShapeCount, 2, 1)));

        let mut broken = flat.clone();
        broken.weight_shapes[1] = (3, 4);
        assert_eq!(shape_error(&broken), Some((ShapeContext::WeightRows(1), 2, 3)));

        let mut broken = flat.clone();
        broken.weight_shapes[0] = (4, 5);
        assert_eq!(shape_error(&broken), Some((ShapeContext::WeightColumns(0), 3, 5)));

        let mut broken = flat;
        broken.weights_flat.push(1.0);
        assert_eq!(shape_error(&broken), Some((ShapeContext::WeightCount, 20, 21)));
    }

    #[test]
    fn bias_shape_mismatches() {
        let flat = network(&[3, 4, 2]).to_flat();

        let mut broken = flat.clone();
        broken.bias_shapes.push(2);
        assert_eq!(shape_error(&broken), Some((ShapeContext::BiasShapeCount, 2, 3)));

        let mut broken = flat.clone();
        broken.bias_shapes[0] = 3;
        assert_eq!(shape_error(&broken), Some((ShapeContext::BiasLength(0), 4, 3)));

        let mut broken = flat;
        broken.biases_flat.clear();
        assert_eq!(shape_error(&broken), Some((ShapeContext::BiasCount, 6, 0)));
    }

    #[test]
    fn record_keeps_hyperparameters() {
        let config = NetworkConfig {
            activation_type: ActivationType::Tanh,
            learning_rate: 0.3,
            regularization_factor: 0.0,
            momentum_factor: 0.25,
        };
        let original = Network::new(&[2, 2], config).unwrap();
        let record = original.to_record();
        let decoded = Network::try_from(record.clone()).unwrap();

        assert_eq!(decoded.config(), &config);
        assert_eq!(NetworkRecord::from(decoded), record);
    }

    #[test]
    fn serde_round_trip() {
        let original = network(&[3, 5, 2]);
        let json = serde_json::to_string(&original).unwrap();
        let decoded: Network = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.to_record(), original.to_record());
    }

    #[test]
    fn serde_rejects_invalid_records() {
        let mut record = network(&[2, 2]).to_record();
        record.config.learning_rate = 5.0;
        let json = serde_json::to_string(&record).unwrap();
        assert!(serde_json::from_str::<Network>(&json).is_err());

        let mut record = network(&[2, 2]).to_record();
        record.params.bias_shapes = vec![3];
        let json = serde_json::to_string(&record).unwrap();
        assert!(serde_json::from_str::<Network>(&json).is_err());
    }
}
