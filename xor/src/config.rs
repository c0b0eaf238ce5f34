use crate::persistence::{PersistenceError, SaveFormat};

use neuroevo::logging::ReportingLevel;
use neuroevo::PopulationConfig;
use neuroevo_nn::{ActivationType, NetworkConfig};

use serde::{Deserialize, Serialize};

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Configuration of the XOR demo runs.
///
/// Loaded from a RON file; missing fields take their default values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Hidden layer sizes, between the 2 inputs and the single output.
    pub hidden_layers: Vec<usize>,
    pub network: NetworkConfig,
    /// Full-batch training steps of the backpropagation run.
    pub backprop_epochs: usize,
    pub population: PopulationConfig,
    /// Maximum number of generations of the neuroevolution run.
    pub generations: usize,
    /// Passes over the XOR table each genome trains
    /// on through reward shaping before being scored.
    pub lifetime_steps: usize,
    /// Fitness at which evolution stops early. The best possible is 4.
    pub target_fitness: f32,
    pub reporting_level: ReportingLevel,
    /// Periodic population snapshots. Disabled if absent.
    pub save: Option<SaveConfig>,
}

/// Where and how often population snapshots are saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveConfig {
    pub directory: PathBuf,
    pub format: SaveFormat,
    pub save_every: NonZeroUsize,
    /// Resume from the latest snapshot in `directory`, if any.
    pub resume: bool,
}

impl DemoConfig {
    /// Reads a configuration from a RON file.
    pub fn from_file(path: &Path) -> Result<DemoConfig, PersistenceError> {
        let contents = fs::read_to_string(path)?;
        ron::from_str(&contents).map_err(|e| PersistenceError::Ron(e.to_string()))
    }

    /// Input layer, hidden layers and output layer sizes.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut layer_sizes = vec![2];
        layer_sizes.extend(&self.hidden_layers);
        layer_sizes.push(1);
        layer_sizes
    }
}

impl Default for DemoConfig {
    fn default() -> DemoConfig {
        DemoConfig {
            hidden_layers: vec![4],
            network: NetworkConfig {
                activation_type: ActivationType::Sigmoid,
                learning_rate: 0.5,
                regularization_factor: 0.0,
                momentum_factor: 0.5,
            },
            backprop_epochs: 5000,
            population: PopulationConfig {
                mutation_rate: 0.2,
                mutation_strength: 0.5,
                ..PopulationConfig::default()
            },
            generations: 200,
            lifetime_steps: 5,
            target_fitness: 3.6,
            reporting_level: ReportingLevel::PopulationChampion,
            save: None,
        }
    }
}
