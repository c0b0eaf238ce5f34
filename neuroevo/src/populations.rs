//! A Population is a fixed-size collection of genomes,
//! evolved generation by generation using fitness-ranked
//! elitism and mutation.
mod config;
mod errors;
pub mod logging;

use crate::Genome;
pub use config::PopulationConfig;
pub use errors::PopulationError;

use log::{debug, warn};
use rand::Rng;

use std::cmp::Ordering;
use std::fmt;

/// A callback notified with the generation number and
/// the genomes of every newly evolved generation.
pub type Subscriber<G> = Box<dyn FnMut(usize, &[G]) + Send>;

/// A population of genomes.
pub struct Population<G> {
    genomes: Vec<G>,
    generation: usize,
    config: PopulationConfig,
    subscribers: Vec<Subscriber<G>>,
}

impl<G: Genome> Population<G> {
    /// Creates a new population using the passed configuration,
    /// filling it with `config.size` genomes produced by `spawn`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid
    /// (see [`PopulationConfig::validate`]).
    ///
    /// # Examples
    /// ```
    /// use neuroevo::{Population, PopulationConfig};
    /// use neuroevo_nn::{Network, NetworkConfig};
    /// use std::num::NonZeroUsize;
    ///
    /// let template = Network::new(&[3, 4, 2], NetworkConfig::default()).unwrap();
    /// let population = Population::new(
    ///     PopulationConfig {
    ///         size: NonZeroUsize::new(10).unwrap(),
    ///         ..PopulationConfig::default()
    ///     },
    ///     || template.randomized(),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(population.genomes().len(), 10);
    /// ```
    pub fn new<F>(config: PopulationConfig, spawn: F) -> Result<Population<G>, PopulationError>
    where
        F: FnMut() -> G,
    {
        config.validate()?;
        let genomes = std::iter::repeat_with(spawn)
            .take(config.size.get())
            .collect();
        Ok(Population {
            genomes,
            generation: 0,
            config,
            subscribers: vec![],
        })
    }

    /// Creates a population from already existing genomes,
    /// e.g. ones loaded from a saved snapshot. Their fitness
    /// values are kept as they are.
    ///
    /// The configured size is replaced by the number of
    /// genomes passed.
    ///
    /// # Errors
    /// Returns an error if fewer than two genomes are passed,
    /// or the mutation parameters are invalid.
    ///
    /// # Examples
    /// ```
    /// use neuroevo::{Population, PopulationConfig};
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let template = Network::new(&[2, 1], NetworkConfig::default()).unwrap();
    /// let genomes = vec![template.randomized(), template.randomized(), template.randomized()];
    ///
    /// let population = Population::from_genomes(genomes, PopulationConfig::default()).unwrap();
    /// assert_eq!(population.config().size.get(), 3);
    ///
    /// assert!(Population::from_genomes(vec![template], PopulationConfig::default()).is_err());
    /// ```
    pub fn from_genomes(
        genomes: Vec<G>,
        config: PopulationConfig,
    ) -> Result<Population<G>, PopulationError> {
        Population::from_genomes_at(genomes, 0, config)
    }

    /// Same as [`from_genomes`], continuing from the
    /// passed generation number instead of 0.
    ///
    /// [`from_genomes`]: Population::from_genomes
    ///
    /// # Examples
    /// ```
    /// use neuroevo::{Population, PopulationConfig};
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let template = Network::new(&[2, 1], NetworkConfig::default()).unwrap();
    /// let genomes = vec![template.randomized(), template.randomized()];
    ///
    /// let mut population = Population::from_genomes_at(genomes, 50, PopulationConfig::default()).unwrap();
    /// population.evolve();
    /// assert_eq!(population.generation(), 51);
    /// ```
    pub fn from_genomes_at(
        genomes: Vec<G>,
        generation: usize,
        config: PopulationConfig,
    ) -> Result<Population<G>, PopulationError> {
        let size = std::num::NonZeroUsize::new(genomes.len())
            .ok_or(PopulationError::TooSmall(0))?;
        let config = PopulationConfig { size, ..config };
        config.validate()?;
        Ok(Population {
            genomes,
            generation,
            config,
            subscribers: vec![],
        })
    }

    /// Evaluates the fitness of each genome in the
    /// population using the passed evaluator.
    ///
    /// Drivers that evaluate genomes in parallel can
    /// instead set fitness values through [`genomes_mut`],
    /// as long as all of them are done before calling [`evolve`].
    ///
    /// [`genomes_mut`]: Population::genomes_mut
    /// [`evolve`]: Population::evolve
    ///
    /// # Examples
    /// ```
    /// use neuroevo::{Genome, Population, PopulationConfig};
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let template = Network::new(&[1, 1], NetworkConfig::default()).unwrap();
    /// let mut population = Population::new(PopulationConfig::default(), || template.randomized()).unwrap();
    ///
    /// population.evaluate_fitness(|network| {
    ///     // Networks with outputs closer to 1 are given higher scores.
    ///     let output = network.clone().feed_forward(&[1.0]).unwrap()[0];
    ///     1.0 - (1.0 - output).abs()
    /// });
    ///
    /// assert!(population.genomes().iter().all(|g| g.fitness() > 0.0));
    /// ```
    pub fn evaluate_fitness<E>(&mut self, mut evaluator: E)
    where
        E: FnMut(&G) -> f32,
    {
        for genome in &mut self.genomes {
            let fitness = evaluator(genome);
            genome.set_fitness(fitness);
        }
    }

    /// Evolves the population into its next generation.
    ///
    /// Genomes are ranked by decreasing fitness (ties keep
    /// their relative order). The top half, rounded down, is
    /// carried over unmutated as the _elite_; every remaining
    /// slot `i` receives a mutated copy of elite `i mod elite_count`.
    /// All genomes of the new generation start with fitness 0,
    /// and every [subscriber] is notified of them.
    ///
    /// The previous generation is replaced wholesale, so all
    /// fitness evaluation must be finished beforehand.
    ///
    /// [subscriber]: Population::subscribe
    ///
    /// # Examples
    /// ```
    /// use neuroevo::{Genome, Population, PopulationConfig};
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let template = Network::new(&[2, 3, 1], NetworkConfig::default()).unwrap();
    /// let mut population = Population::new(PopulationConfig::default(), || template.randomized()).unwrap();
    ///
    /// let mut score = 0.0;
    /// population.evaluate_fitness(|_| {
    ///     score += 1.0;
    ///     score
    /// });
    /// population.evolve();
    ///
    /// assert_eq!(population.generation(), 1);
    /// assert_eq!(population.genomes().len(), 50);
    /// assert!(population.genomes().iter().all(|g| g.fitness() == 0.0));
    /// ```
    pub fn evolve(&mut self) {
        self.evolve_with_rng(&mut rand::thread_rng());
    }

    /// Same as [`evolve`], drawing mutations from the passed
    /// random number generator.
    ///
    /// [`evolve`]: Population::evolve
    pub fn evolve_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.sort_genomes_by_decreasing_fitness();

        let population_size = self.genomes.len();
        let elite_count = population_size / 2;
        debug!(
            "evolving generation {}: best fitness {}, {} elites out of {}",
            self.generation,
            self.genomes[0].fitness(),
            elite_count,
            population_size
        );

        let mut next_genomes = Vec::with_capacity(population_size);
        next_genomes.extend(self.genomes[..elite_count].iter().map(G::offspring));
        for i in elite_count..population_size {
            let mut child = self.genomes[i % elite_count].offspring();
            child.mutate(
                self.config.mutation_rate,
                self.config.mutation_strength,
                rng,
            );
            next_genomes.push(child);
        }

        self.genomes = next_genomes;
        self.generation += 1;
        self.notify_subscribers();
    }

    /// Stable-sorts genomes by fitness in descending order.
    /// NaN fitness values are ranked last.
    fn sort_genomes_by_decreasing_fitness(&mut self) {
        if self.genomes.iter().any(|g| g.fitness().is_nan()) {
            warn!(
                "generation {} contains NaN fitness values, ranking them last",
                self.generation
            );
        }
        self.genomes.sort_by(|g1, g2| {
            ranking_key(g2.fitness())
                .partial_cmp(&ranking_key(g1.fitness()))
                .unwrap_or(Ordering::Equal)
        });
    }

    fn notify_subscribers(&mut self) {
        for subscriber in &mut self.subscribers {
            subscriber(self.generation, &self.genomes);
        }
    }

    /// Registers a callback that will receive the generation
    /// number and the genomes of every new generation, e.g. to
    /// snapshot populations periodically.
    ///
    /// # Examples
    /// ```
    /// use neuroevo::{Population, PopulationConfig};
    /// use neuroevo_nn::{Network, NetworkConfig};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let template = Network::new(&[1, 1], NetworkConfig::default()).unwrap();
    /// let mut population = Population::new(PopulationConfig::default(), || template.randomized()).unwrap();
    ///
    /// let seen = Arc::new(Mutex::new(vec![]));
    /// let sink = Arc::clone(&seen);
    /// population.subscribe(move |generation, genomes| {
    ///     sink.lock().unwrap().push((generation, genomes.len()));
    /// });
    ///
    /// population.evolve();
    /// population.evolve();
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![(1, 50), (2, 50)]);
    /// ```
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(usize, &[G]) + Send + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Returns the currently best-performing genome.
    /// Among equally fit genomes, the first one is returned.
    ///
    /// # Examples
    /// ```
    /// use neuroevo::{Genome, Population, PopulationConfig};
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let template = Network::new(&[1, 1], NetworkConfig::default()).unwrap();
    /// let mut population = Population::new(PopulationConfig::default(), || template.randomized()).unwrap();
    ///
    /// let mut fitness = 0.0;
    /// population.evaluate_fitness(move |_| {
    ///     fitness += 10.0;
    ///     fitness
    /// });
    ///
    /// assert_eq!(population.champion().fitness(), 50.0 * 10.0);
    /// ```
    pub fn champion(&self) -> &G {
        let mut champion = &self.genomes[0];
        for genome in &self.genomes[1..] {
            if ranking_key(genome.fitness()) > ranking_key(champion.fitness()) {
                champion = genome;
            }
        }
        champion
    }

    /// Returns all current genomes.
    pub fn genomes(&self) -> &[G] {
        &self.genomes
    }

    /// Returns all current genomes, mutably. This is how
    /// drivers assign fitness values and train genomes
    /// during a generation.
    ///
    /// The slice cannot be resized, so the population
    /// size stays constant.
    pub fn genomes_mut(&mut self) -> &mut [G] {
        &mut self.genomes
    }

    /// Returns the current generation number.
    ///
    /// # Examples
    /// ```
    /// use neuroevo::{Population, PopulationConfig};
    /// use neuroevo_nn::{Network, NetworkConfig};
    ///
    /// let template = Network::new(&[1, 1], NetworkConfig::default()).unwrap();
    /// let population = Population::new(PopulationConfig::default(), || template.randomized()).unwrap();
    ///
    /// assert_eq!(population.generation(), 0);
    /// ```
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's configuration.
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Consumes the population, returning its genomes.
    pub fn into_genomes(self) -> Vec<G> {
        self.genomes
    }
}

impl<G: fmt::Debug> fmt::Debug for Population<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Population")
            .field("genomes", &self.genomes)
            .field("generation", &self.generation)
            .field("config", &self.config)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

fn ranking_key(fitness: f32) -> f32 {
    if fitness.is_nan() {
        f32::NEG_INFINITY
    } else {
        fitness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::num::NonZeroUsize;
    use std::sync::{Arc, Mutex};

    /// Minimal genome: a tag identifying its lineage,
    /// and a parameter vector.
    #[derive(Clone, Debug, PartialEq)]
    struct TestGenome {
        tag: char,
        params: Vec<f32>,
        fitness: f32,
    }

    impl TestGenome {
        fn new(tag: char, fitness: f32) -> TestGenome {
            TestGenome {
                tag,
                params: vec![tag as u32 as f32; 4],
                fitness,
            }
        }
    }

    impl Genome for TestGenome {
        fn offspring(&self) -> Self {
            TestGenome {
                fitness: 0.0,
                ..self.clone()
            }
        }

        fn mutate<R: Rng + ?Sized>(&mut self, rate: f32, strength: f32, rng: &mut R) {
            for p in &mut self.params {
                if rng.gen::<f32>() < rate {
                    *p += (rng.gen::<f32>() * 2.0 - 1.0) * strength;
                }
            }
        }

        fn set_fitness(&mut self, fitness: f32) {
            self.fitness = fitness;
        }

        fn fitness(&self) -> f32 {
            self.fitness
        }
    }

    fn config(size: usize) -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::new(size).unwrap(),
            mutation_rate: 1.0,
            mutation_strength: 0.5,
        }
    }

    fn population(fitnesses: &[(char, f32)]) -> Population<TestGenome> {
        let genomes = fitnesses
            .iter()
            .map(|&(tag, fitness)| TestGenome::new(tag, fitness))
            .collect();
        Population::from_genomes(genomes, config(fitnesses.len())).unwrap()
    }

    #[test]
    fn new_fills_population() {
        let mut count = 0;
        let population = Population::new(config(7), || {
            count += 1;
            TestGenome::new('a', 0.0)
        })
        .unwrap();
        assert_eq!(population.genomes().len(), 7);
        assert_eq!(count, 7);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let result = Population::new(config(1), || TestGenome::new('a', 0.0));
        assert_eq!(result.err(), Some(PopulationError::TooSmall(1)));
    }

    #[test]
    fn from_genomes_rejects_empty() {
        let result = Population::<TestGenome>::from_genomes(vec![], config(2));
        assert_eq!(result.err(), Some(PopulationError::TooSmall(0)));
    }

    #[test]
    fn evolve_preserves_size() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in 2..12 {
            let mut population = Population::new(config(size), || TestGenome::new('x', 1.0)).unwrap();
            population.evolve_with_rng(&mut rng);
            assert_eq!(population.genomes().len(), size);
        }
    }

    #[test]
    fn evolve_keeps_elites_unmutated() {
        let mut population = population(&[('c', 1.0), ('a', 10.0), ('d', 0.0), ('b', 5.0)]);
        let a = TestGenome::new('a', 0.0);
        let b = TestGenome::new('b', 0.0);

        population.evolve_with_rng(&mut StdRng::seed_from_u64(1));

        assert_eq!(population.genomes()[0], a);
        assert_eq!(population.genomes()[1], b);
    }

    #[test]
    fn evolve_fills_remaining_slots_cyclically() {
        let mut population = population(&[
            ('a', 5.0),
            ('b', 4.0),
            ('c', 3.0),
            ('d', 2.0),
            ('e', 1.0),
        ]);
        population.evolve_with_rng(&mut StdRng::seed_from_u64(3));

        // 2 elites (a, b), then 3 mutated copies of a, b, a.
        let tags: Vec<char> = population.genomes().iter().map(|g| g.tag).collect();
        assert_eq!(tags, vec!['a', 'b', 'a', 'b', 'a']);
        for child in &population.genomes()[2..] {
            assert_ne!(child, &TestGenome::new(child.tag, 0.0));
        }
    }

    #[test]
    fn evolve_resets_fitness() {
        let mut population = population(&[('a', 3.0), ('b', 2.0), ('c', 1.0)]);
        population.evolve_with_rng(&mut StdRng::seed_from_u64(0));
        assert!(population.genomes().iter().all(|g| g.fitness() == 0.0));
    }

    #[test]
    fn ranking_is_stable() {
        let mut population = population(&[('a', 1.0), ('b', 2.0), ('c', 1.0), ('d', 2.0)]);
        population.sort_genomes_by_decreasing_fitness();
        let tags: Vec<char> = population.genomes().iter().map(|g| g.tag).collect();
        assert_eq!(tags, vec!['b', 'd', 'a', 'c']);
    }

    #[test]
    fn nan_fitness_ranked_last() {
        let mut population = population(&[('a', f32::NAN), ('b', -3.0), ('c', 2.0)]);
        population.sort_genomes_by_decreasing_fitness();
        let tags: Vec<char> = population.genomes().iter().map(|g| g.tag).collect();
        assert_eq!(tags, vec!['c', 'b', 'a']);
        assert_eq!(population.champion().tag, 'c');
    }

    #[test]
    fn champion_prefers_first_of_equals() {
        let population = population(&[('a', 1.0), ('b', 4.0), ('c', 4.0)]);
        assert_eq!(population.champion().tag, 'b');
    }

    #[test]
    fn subscribers_receive_new_generation() {
        let mut population = population(&[('a', 2.0), ('b', 1.0)]);
        let received = Arc::new(Mutex::new(vec![]));
        let sink = Arc::clone(&received);
        population.subscribe(move |generation, genomes| {
            let tags: Vec<char> = genomes.iter().map(|g| g.tag).collect();
            sink.lock().unwrap().push((generation, tags));
        });

        population.evolve_with_rng(&mut StdRng::seed_from_u64(0));

        assert_eq!(*received.lock().unwrap(), vec![(1, vec!['a', 'a'])]);
    }

    #[test]
    fn resumed_population_continues_numbering() {
        let genomes = vec![TestGenome::new('a', 2.0), TestGenome::new('b', 1.0)];
        let mut population = Population::from_genomes_at(genomes, 50, config(2)).unwrap();
        assert_eq!(population.generation(), 50);

        let received = Arc::new(Mutex::new(vec![]));
        let sink = Arc::clone(&received);
        population.subscribe(move |generation, _| sink.lock().unwrap().push(generation));
        population.evolve_with_rng(&mut StdRng::seed_from_u64(0));
        population.evolve_with_rng(&mut StdRng::seed_from_u64(1));

        assert_eq!(*received.lock().unwrap(), vec![51, 52]);
    }

    #[test]
    fn evaluate_fitness_sets_every_genome() {
        let mut population = population(&[('a', 0.0), ('b', 0.0), ('c', 0.0)]);
        population.evaluate_fitness(|g| g.tag as u32 as f32);
        assert!(population
            .genomes()
            .iter()
            .all(|g| g.fitness() == g.tag as u32 as f32));
    }
}
