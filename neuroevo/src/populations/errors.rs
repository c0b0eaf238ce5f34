use std::error::Error;
use std::fmt;

/// An error type indicating a population
/// cannot be built with the given genomes
/// or configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopulationError {
    /// The population holds fewer than two genomes,
    /// leaving no room for an elite.
    TooSmall(usize),
    /// The mutation rate is not a probability.
    InvalidMutationRate(f32),
    /// The mutation strength is negative or not finite.
    InvalidMutationStrength(f32),
}

impl fmt::Display for PopulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall(size) => write!(
                f,
                "population of size {} is too small to evolve (minimum is 2)",
                size
            ),
            Self::InvalidMutationRate(rate) => {
                write!(f, "mutation rate {} is outside of [0, 1]", rate)
            }
            Self::InvalidMutationStrength(strength) => write!(
                f,
                "mutation strength {} is not a finite non-negative value",
                strength
            ),
        }
    }
}

impl Error for PopulationError {}
