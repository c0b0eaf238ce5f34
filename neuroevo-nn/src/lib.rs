//! # neuroevo-nn
//! A dense feed-forward neural network implementing the
//! [`neuroevo` crate](../neuroevo/index.html)'s `Genome` trait.
//!
//! A [`Network`] can be used on its own, evaluated with
//! [`Network::feed_forward`] and trained by mini-batch backpropagation
//! with [`Network::train`], or evolved in a `neuroevo` `Population`,
//! where each genome may keep learning during its lifetime.
//!
//! Parameters convert to and from a flat, shape-annotated
//! [`FlatParams`] form, and whole networks serialize
//! through [`NetworkRecord`].
//!
//! # Example usage: Backpropagation on XOR
//! ```
//! use neuroevo_nn::{ActivationType, Network, NetworkConfig};
//!
//! let inputs = [[0.0f32, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
//! let expected = [[0.0f32], [1.0], [1.0], [0.0]];
//!
//! let mut network = Network::new(
//!     &[2, 4, 1],
//!     NetworkConfig {
//!         activation_type: ActivationType::Sigmoid,
//!         learning_rate: 0.5,
//!         regularization_factor: 0.0,
//!         momentum_factor: 0.5,
//!     },
//! )
//! .unwrap();
//!
//! let error = |network: &mut Network| -> f32 {
//!     inputs
//!         .iter()
//!         .zip(&expected)
//!         .map(|(i, e)| (network.feed_forward(i).unwrap()[0] - e[0]).powi(2))
//!         .sum()
//! };
//!
//! let initial_error = error(&mut network);
//! for _ in 0..500 {
//!     network.train(&inputs, &expected).unwrap();
//! }
//! assert!(error(&mut network) < initial_error);
//!
//! // Networks can be stored and restored exactly.
//! let json = serde_json::to_string(&network).unwrap();
//! let restored: Network = serde_json::from_str(&json).unwrap();
//! assert_eq!(restored.to_flat(), network.to_flat());
//! ```

mod activation;
mod codec;
mod config;
mod errors;
mod genome;
mod network;

pub use activation::ActivationType;
pub use codec::{from_flat, to_flat, FlatParams, NetworkRecord};
pub use config::NetworkConfig;
pub use errors::{NetworkError, Result, ShapeContext};
pub use network::Network;

pub use neuroevo::Genome;
