use log::debug;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{AgeBracket, Demographic, Gender, Location, SimErrors, VoterDistribution};

/// Draws independent voters from a validated [`VoterDistribution`].
///
/// The gender-age joint table and the location marginal are sampled
/// separately and combined per voter, which realizes the full 24-outcome
/// joint distribution without ever materializing per-category lists. Memory
/// stays constant in the population size, so populations in the tens of
/// millions are fine.
pub struct PopulationSampler {
    cells: [(Gender, AgeBracket); 8],
    gender_age: WeightedIndex<f64>,
    location: WeightedIndex<f64>,
}

impl PopulationSampler {
    pub fn new(distribution: &VoterDistribution) -> Result<PopulationSampler, SimErrors> {
        let mut cells = [(Gender::Male, AgeBracket::Under21); 8];
        let mut idx = 0;
        for gender in Gender::ALL {
            for age in AgeBracket::ALL {
                cells[idx] = (gender, age);
                idx += 1;
            }
        }
        // The tables were validated at construction; a degenerate all-zero
        // table is the only way the index can still fail.
        let gender_age =
            WeightedIndex::new(distribution.gender_age()).map_err(|_| SimErrors::DistributionSum {
                axis: "genderAge".to_string(),
                total: distribution.gender_age().iter().sum(),
            })?;
        let location =
            WeightedIndex::new(distribution.location()).map_err(|_| SimErrors::DistributionSum {
                axis: "location".to_string(),
                total: distribution.location().iter().sum(),
            })?;
        Ok(PopulationSampler {
            cells,
            gender_age,
            location,
        })
    }

    /// Draws `n` independent voters. `n = 0` yields an empty population.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Demographic> {
        let mut population = Vec::with_capacity(n);
        for _ in 0..n {
            let (gender, age) = self.cells[self.gender_age.sample(rng)];
            let location = Location::ALL[self.location.sample(rng)];
            population.push(Demographic::new(gender, age, location));
        }
        population
    }
}

/// Samples a full population from the given distribution.
///
/// A fixed `seed` makes the draw reproducible across runs; without one the
/// generator is seeded from the operating system.
pub fn generate_population(
    n: usize,
    distribution: &VoterDistribution,
    seed: Option<u64>,
) -> Result<Vec<Demographic>, SimErrors> {
    let sampler = PopulationSampler::new(distribution)?;
    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    debug!("generate_population: drawing {} voters", n);
    Ok(sampler.sample(n, &mut rng))
}
