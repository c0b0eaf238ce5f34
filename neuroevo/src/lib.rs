//! A generational genetic optimizer for fixed-size populations,
//! using fitness-ranked elitism and mutation.
//!
//! Any genomic structure can be evolved through the `Genome` trait.
//! A dense feed-forward neural network genome, trainable by
//! backpropagation during each generation, is supplied by the
//! `neuroevo-nn` crate.
//!
//! Each call to [`Population::evolve`] ranks genomes by fitness,
//! keeps the top half unchanged, and refills the bottom half
//! with mutated copies of it. Generational statistics can be
//! recorded with the [`logging`] module.
//!
//! # Example usage: Evolution of an XOR approximator, using `neuroevo-nn`
//! ```
//! use neuroevo::{Genome, Population, PopulationConfig};
//! use neuroevo_nn::{ActivationType, Network, NetworkConfig};
//! use std::num::NonZeroUsize;
//!
//! const XOR: [([f32; 2], f32); 4] = [
//!     ([0.0, 0.0], 0.0),
//!     ([0.0, 1.0], 1.0),
//!     ([1.0, 0.0], 1.0),
//!     ([1.0, 1.0], 0.0),
//! ];
//!
//! fn evaluate_xor(network: &Network) -> f32 {
//!     let mut network = network.clone();
//!     let error: f32 = XOR
//!         .iter()
//!         .map(|(input, output)| (network.feed_forward(input).unwrap()[0] - output).abs())
//!         .sum();
//!     4.0 - error
//! }
//!
//! let network_config = NetworkConfig {
//!     activation_type: ActivationType::Sigmoid,
//!     ..NetworkConfig::default()
//! };
//! let template = Network::new(&[2, 4, 1], network_config).unwrap();
//!
//! let population_config = PopulationConfig {
//!     size: NonZeroUsize::new(40).unwrap(),
//!     mutation_rate: 0.2,
//!     mutation_strength: 0.5,
//! };
//! let mut population = Population::new(population_config, || template.randomized()).unwrap();
//!
//! let mut best = f32::MIN;
//! for _ in 0..20 {
//!     population.evaluate_fitness(evaluate_xor);
//!     let champion = population.champion().fitness();
//!     // Elites are carried over unchanged, so the best fitness never decreases.
//!     assert!(champion >= best);
//!     best = champion;
//!     population.evolve();
//! }
//! ```

mod genome;
mod populations;

pub use genome::*;
pub use populations::*;
