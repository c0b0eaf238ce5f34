use crate::Network;
use neuroevo::Genome;

use rand::Rng;

impl Genome for Network {
    fn offspring(&self) -> Network {
        Network::offspring(self)
    }

    fn mutate<R: Rng + ?Sized>(&mut self, rate: f32, strength: f32, rng: &mut R) {
        self.mutate_with_rng(rate, strength, rng);
    }

    fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    fn fitness(&self) -> f32 {
        self.fitness
    }
}
