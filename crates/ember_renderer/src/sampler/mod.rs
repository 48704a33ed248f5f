//! Anti-aliasing sampler.
//!
//! A sampler pre-generates `num_sets` sets of `num_samples` points on the unit
//! square, then serves them one set at a time. Every `num_samples` calls pick a
//! new random set and reshuffle its index permutation, so neighbouring pixels
//! see decorrelated but equally well stratified patterns.

mod mapping;
mod patterns;

pub use mapping::{concentric_disk, cosine_power_hemisphere};

use std::sync::Arc;

use ember_core::SamplerKind;
use ember_math::{Vec2, Vec3};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use thiserror::Error;

/// Errors that can occur while building a sampler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    #[error("{kind:?} sampling needs a perfect square sample count, got {count}")]
    NotPerfectSquare { kind: SamplerKind, count: u32 },

    #[error("Sampler needs at least one sample and one set")]
    Empty,
}

/// A pool of sample sets and a cursor over them.
///
/// The generated points are shared between forks; only the cursor, the index
/// permutations and the RNG are per instance.
#[derive(Clone)]
pub struct Sampler {
    kind: SamplerKind,
    num_samples: usize,
    num_sets: usize,
    samples: Arc<[Vec2]>,
    disk_samples: Arc<[Vec2]>,
    hemisphere_samples: Arc<[Vec3]>,
    shuffled_indices: Vec<usize>,
    /// Calls served from the current set
    count: usize,
    /// Offset of the current set
    jump: usize,
    rng: StdRng,
}

impl Sampler {
    /// Generate `num_sets` sets of `num_samples` points.
    pub fn new(
        kind: SamplerKind,
        num_samples: u32,
        num_sets: u32,
        seed: u64,
    ) -> Result<Self, SamplerError> {
        if num_samples == 0 || num_sets == 0 {
            return Err(SamplerError::Empty);
        }
        let side = patterns::grid_side(num_samples as usize);
        if kind.needs_square_count() && side * side != num_samples as usize {
            return Err(SamplerError::NotPerfectSquare {
                kind,
                count: num_samples,
            });
        }

        let (ns, sets) = (num_samples as usize, num_sets as usize);
        let mut rng = StdRng::seed_from_u64(seed);
        let samples: Arc<[Vec2]> = patterns::generate(kind, ns, sets, &mut rng).into();
        let disk_samples = samples.iter().map(|&p| concentric_disk(p)).collect();
        let hemisphere_samples = samples
            .iter()
            .map(|&p| cosine_power_hemisphere(p, 1.0))
            .collect();

        let mut shuffled_indices = Vec::with_capacity(ns * sets);
        for _ in 0..sets {
            let mut indices: Vec<usize> = (0..ns).collect();
            indices.shuffle(&mut rng);
            shuffled_indices.extend(indices);
        }

        log::debug!("Generated {sets} {kind:?} sets of {ns} samples");

        Ok(Self {
            kind,
            num_samples: ns,
            num_sets: sets,
            samples,
            disk_samples,
            hemisphere_samples,
            shuffled_indices,
            count: 0,
            jump: 0,
            rng,
        })
    }

    /// Rebuild the hemisphere pool with a cosine-power exponent.
    pub fn with_hemisphere_exponent(mut self, exponent: f32) -> Self {
        self.hemisphere_samples = self
            .samples
            .iter()
            .map(|&p| cosine_power_hemisphere(p, exponent))
            .collect();
        self
    }

    /// A sampler sharing this one's points with a fresh cursor and RNG.
    pub fn fork(&self, seed: u64) -> Self {
        Self {
            samples: Arc::clone(&self.samples),
            disk_samples: Arc::clone(&self.disk_samples),
            hemisphere_samples: Arc::clone(&self.hemisphere_samples),
            shuffled_indices: self.shuffled_indices.clone(),
            count: 0,
            jump: 0,
            rng: StdRng::seed_from_u64(seed),
            ..*self
        }
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Offset of the set currently being served.
    pub fn jump(&self) -> usize {
        self.jump
    }

    /// The points of set `index`, in generation order.
    pub fn set_samples(&self, index: usize) -> &[Vec2] {
        let start = index * self.num_samples;
        &self.samples[start..start + self.num_samples]
    }

    /// All generated points.
    pub fn samples(&self) -> &[Vec2] {
        &self.samples
    }

    fn next_index(&mut self) -> usize {
        if self.count == 0 {
            let set = self.rng.gen_range(0..self.num_sets);
            self.jump = set * self.num_samples;
            self.shuffled_indices[self.jump..self.jump + self.num_samples].shuffle(&mut self.rng);
        }

        let index = self.jump + self.shuffled_indices[self.jump + self.count];
        self.count = (self.count + 1) % self.num_samples;
        index
    }

    /// Next point on the unit square.
    pub fn sample_unit_square(&mut self) -> Vec2 {
        let index = self.next_index();
        self.samples[index]
    }

    /// Next point on the unit disk.
    pub fn sample_unit_disk(&mut self) -> Vec2 {
        let index = self.next_index();
        self.disk_samples[index]
    }

    /// Next direction on the `+z` hemisphere.
    pub fn sample_hemisphere(&mut self) -> Vec3 {
        let index = self.next_index();
        self.hemisphere_samples[index]
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("kind", &self.kind)
            .field("num_samples", &self.num_samples)
            .field("num_sets", &self.num_sets)
            .field("count", &self.count)
            .field("jump", &self.jump)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [SamplerKind; 5] = [
        SamplerKind::Regular,
        SamplerKind::Random,
        SamplerKind::Jittered,
        SamplerKind::NRooks,
        SamplerKind::MultiJittered,
    ];

    fn sorted_bits(points: &[Vec2]) -> Vec<(u32, u32)> {
        let mut bits: Vec<_> = points.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect();
        bits.sort_unstable();
        bits
    }

    #[test]
    fn test_sample_counts_and_range() {
        for kind in ALL_KINDS {
            let sampler = Sampler::new(kind, 16, 5, 42).unwrap();

            assert_eq!(sampler.samples().len(), 80, "{kind:?}");
            for p in sampler.samples() {
                assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y), "{kind:?} {p:?}");
            }
        }
    }

    #[test]
    fn test_non_square_counts() {
        for kind in [SamplerKind::Regular, SamplerKind::Jittered, SamplerKind::MultiJittered] {
            assert_eq!(
                Sampler::new(kind, 10, 4, 0).unwrap_err(),
                SamplerError::NotPerfectSquare { kind, count: 10 }
            );
        }
        assert!(Sampler::new(SamplerKind::NRooks, 10, 4, 0).is_ok());
        assert!(Sampler::new(SamplerKind::Random, 10, 4, 0).is_ok());
    }

    #[test]
    fn test_empty_sampler() {
        assert_eq!(
            Sampler::new(SamplerKind::Random, 0, 4, 0).unwrap_err(),
            SamplerError::Empty
        );
        assert_eq!(
            Sampler::new(SamplerKind::Random, 4, 0, 0).unwrap_err(),
            SamplerError::Empty
        );
    }

    #[test]
    fn test_each_span_is_a_permutation_of_one_set() {
        let mut sampler = Sampler::new(SamplerKind::MultiJittered, 9, 6, 1).unwrap();

        for _ in 0..20 {
            let span: Vec<Vec2> = (0..9).map(|_| sampler.sample_unit_square()).collect();
            let set = sampler.jump() / sampler.num_samples();
            assert_eq!(sorted_bits(&span), sorted_bits(sampler.set_samples(set)));
        }
    }

    #[test]
    fn test_fork_shares_points_and_is_deterministic() {
        let template = Sampler::new(SamplerKind::Jittered, 4, 8, 5).unwrap();
        let mut a = template.fork(99);
        let mut b = template.fork(99);

        assert!(Arc::ptr_eq(&a.samples, &template.samples));
        for _ in 0..32 {
            assert_eq!(a.sample_unit_square(), b.sample_unit_square());
        }
    }

    #[test]
    fn test_disk_and_hemisphere_pools() {
        let mut sampler = Sampler::new(SamplerKind::Random, 16, 3, 8)
            .unwrap()
            .with_hemisphere_exponent(5.0);

        for _ in 0..48 {
            assert!(sampler.sample_unit_disk().length() <= 1.0 + 1e-5);
            let h = sampler.sample_hemisphere();
            assert!(h.z >= 0.0 && (h.length() - 1.0).abs() < 1e-4);
        }
    }
}
