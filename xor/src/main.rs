mod config;
mod persistence;
mod reward;

use config::DemoConfig;
use persistence::SaveManager;

use neuroevo::logging::{EvolutionLogger, GenerationMemberRecord};
use neuroevo::{Genome, Population};
use neuroevo_nn::{Network, NetworkError};

use log::{error, info};
use rayon::prelude::*;

use std::path::PathBuf;

const XOR: [([f32; 2], f32); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("Loading config from: {:?}", path);
            DemoConfig::from_file(&path)?
        }
        None => {
            info!("Using default configuration");
            DemoConfig::default()
        }
    };

    backpropagation_run(&config)?;
    neuroevolution_run(&config)?;
    Ok(())
}

/// Sum of absolute errors over the XOR table.
fn xor_error(network: &mut Network) -> Result<f32, NetworkError> {
    let mut error = 0.0;
    for (inputs, expected) in XOR.iter() {
        error += (network.feed_forward(inputs)?[0] - expected).abs();
    }
    Ok(error)
}

/// Trains a single network on the XOR table by backpropagation.
fn backpropagation_run(config: &DemoConfig) -> Result<(), NetworkError> {
    let mut network = Network::new(&config.layer_sizes(), config.network)?;
    let inputs: Vec<[f32; 2]> = XOR.iter().map(|(inputs, _)| *inputs).collect();
    let expected: Vec<[f32; 1]> = XOR.iter().map(|(_, output)| [*output]).collect();

    info!("Backpropagation: training {}", network);
    info!("Initial XOR error: {}", xor_error(&mut network)?);
    for epoch in 1..=config.backprop_epochs {
        network.train(&inputs, &expected)?;
        if epoch % 1000 == 0 {
            info!("Epoch {}: XOR error {}", epoch, xor_error(&mut network)?);
        }
    }
    for (inputs, _) in XOR.iter() {
        info!("{:?} -> {:.3}", inputs, network.feed_forward(inputs)?[0]);
    }
    Ok(())
}

/// Lets a genome learn from shaped rewards for its lifetime,
/// then scores it. The best possible fitness is 4.
fn live(network: &mut Network, lifetime_steps: usize) -> Result<f32, NetworkError> {
    for _ in 0..lifetime_steps {
        for (inputs, expected) in XOR.iter() {
            let outputs = network.feed_forward(inputs)?;
            let reward = reward::xor_reward(*expected, outputs[0]);
            let targets = reward::shaped_targets(reward, &outputs);
            network.train(&[inputs], &[targets])?;
        }
    }
    Ok(XOR.len() as f32 - xor_error(network)?)
}

/// Evolves a population of networks on XOR, evaluating
/// genomes in parallel.
fn neuroevolution_run(config: &DemoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let template = Network::new(&config.layer_sizes(), config.network)?;
    let manager = config
        .save
        .as_ref()
        .map(|save| SaveManager::new(&save.directory, save.format, save.save_every));
    let resume = config.save.as_ref().map_or(false, |save| save.resume);

    let snapshot = match &manager {
        Some(manager) if resume => manager.load_latest()?,
        _ => None,
    };
    let mut population = match snapshot {
        Some(snapshot) => {
            info!(
                "Resuming from generation {} ({} genomes)",
                snapshot.generation,
                snapshot.genomes.len()
            );
            Population::from_genomes_at(snapshot.genomes, snapshot.generation, config.population.clone())?
        }
        None => Population::new(config.population.clone(), || template.randomized())?,
    };

    if let Some(manager) = manager {
        population.subscribe(move |generation, genomes| {
            match manager.on_generation(generation, genomes) {
                Ok(Some(path)) => info!("Saved generation {} to {:?}", generation, path),
                Ok(None) => {}
                Err(e) => error!("Failed to save generation {}: {}", generation, e),
            }
        });
    }

    let mut logger = EvolutionLogger::new(config.reporting_level);
    let stat_extractor = |network: &Network| [network.fitness()];
    for _ in 0..config.generations {
        let lifetime_steps = config.lifetime_steps;
        population
            .genomes_mut()
            .par_iter_mut()
            .map(|network| -> Result<(), NetworkError> {
                let fitness = live(network, lifetime_steps)?;
                network.set_fitness(fitness);
                Ok(())
            })
            .collect::<Result<(), NetworkError>>()?;

        logger.log(&population, &stat_extractor, ["fitness"]);
        if let Some(log) = logger.last() {
            info!(
                "Generation {}: fitness {}",
                log.generation_number, log.genome_stats[0].1
            );
        }
        if population.champion().fitness() >= config.target_fitness {
            break;
        }
        population.evolve();
    }

    let champion = population.champion();
    info!(
        "Champion of generation {}: {}",
        population.generation(),
        champion
    );
    let mut champion = champion.clone();
    for (inputs, _) in XOR.iter() {
        info!("{:?} -> {:.3}", inputs, champion.feed_forward(inputs)?[0]);
    }
    if let Some(GenerationMemberRecord::PopulationChampion(first)) =
        logger.iter().next().map(|log| &log.generation_sample)
    {
        info!("First generation's champion: {}", first);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SaveConfig;
    use crate::persistence::SaveFormat;
    use neuroevo_nn::NetworkConfig;

    use std::num::NonZeroUsize;
    use tempfile::tempdir;

    #[test]
    fn undecided_network_scores_two() {
        let mut network = Network::zeroed(&[2, 1], NetworkConfig::default()).unwrap();
        // 0.5 everywhere: off by half on each case.
        assert_eq!(xor_error(&mut network).unwrap(), 2.0);
        assert_eq!(live(&mut network, 0).unwrap(), 2.0);
    }

    #[test]
    fn lifetime_learning_changes_parameters() {
        let mut network = Network::new(&[2, 3, 1], NetworkConfig::default()).unwrap();
        let before = network.to_flat();
        let fitness = live(&mut network, 2).unwrap();

        assert!((0.0..=4.0).contains(&fitness));
        assert_ne!(network.to_flat(), before);
    }

    #[test]
    fn short_runs_complete() {
        let config = DemoConfig {
            backprop_epochs: 10,
            generations: 3,
            lifetime_steps: 1,
            ..DemoConfig::default()
        };
        backpropagation_run(&config).unwrap();
        neuroevolution_run(&config).unwrap();
    }

    #[test]
    fn resumed_runs_save_after_their_snapshot() {
        let dir = tempdir().unwrap();
        let save = SaveConfig {
            directory: dir.path().to_path_buf(),
            format: SaveFormat::Ron,
            save_every: NonZeroUsize::new(10).unwrap(),
            resume: true,
        };
        let manager = SaveManager::new(&save.directory, save.format, save.save_every);
        let template = Network::new(&[2, 4, 1], NetworkConfig::default()).unwrap();
        let genomes: Vec<Network> = (0..6).map(|_| template.randomized()).collect();
        manager.save(50, &genomes).unwrap();

        let config = DemoConfig {
            generations: 20,
            lifetime_steps: 0,
            target_fitness: f32::INFINITY,
            save: Some(save),
            ..DemoConfig::default()
        };
        neuroevolution_run(&config).unwrap();

        let latest = manager.load_latest().unwrap().unwrap();
        assert_eq!(latest.generation, 70);
        assert_eq!(latest.genomes.len(), 6);
        assert_eq!(manager.saved_files().unwrap().len(), 3);
    }
}
