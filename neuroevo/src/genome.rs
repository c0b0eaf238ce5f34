use rand::Rng;

/// An interface for genomes that can be evolved by a [`Population`].
///
/// The population only ever ranks genomes by fitness, copies them and
/// perturbs the copies, so this is all it needs to know about them.
///
/// [`Population`]: crate::Population
pub trait Genome {
    /// Returns a copy of the genome suitable for the next generation.
    ///
    /// Heritable parameters are copied exactly. Any per-lifetime state
    /// (training history, fitness) starts fresh, so the fitness of the
    /// returned genome should be 0.
    fn offspring(&self) -> Self;

    /// Perturbs each heritable parameter independently: with
    /// probability `rate`, a value drawn uniformly from
    /// `[-strength, strength]` is added to it.
    ///
    /// A `rate` of 0 must leave the genome untouched.
    fn mutate<R: Rng + ?Sized>(&mut self, rate: f32, strength: f32, rng: &mut R);

    /// Sets the genome's fitness value.
    fn set_fitness(&mut self, fitness: f32);

    /// Returns the genome's fitness value.
    fn fitness(&self) -> f32;
}
