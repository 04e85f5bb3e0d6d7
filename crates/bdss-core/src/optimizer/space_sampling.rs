//! Generators of simplex weight vectors: non-negative vectors of a fixed dimension
//! whose components sum to one.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Dirichlet, Distribution};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    #[error("Weight vectors need a dimension of at least 1")]
    ZeroDimension,
    #[error("Sampler resolution must be at least 1")]
    ZeroResolution,
    #[error("Invalid Dirichlet concentration {0}. Alpha must be positive")]
    InvalidAlpha(f64),
    #[error("Failed to create Dirichlet distribution: {0}")]
    Distribution(String),
}

pub type WeightIter = Box<dyn Iterator<Item = Vec<f64>> + Send>;

pub trait SpaceSampler {
    fn dimension(&self) -> usize;

    /// A finite, lazily generated sequence of weight vectors.
    fn generate_space_sample(&self) -> WeightIter;
}

/// Enumerates the simplex lattice of spacing `1 / (resolution - 1)`.
///
/// The enumeration is exhaustive and deterministic: every weak composition of
/// `resolution - 1` into `dimension` parts, first component descending. When zero
/// weights are excluded only compositions with positive parts are produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSpaceSampler {
    dimension: usize,
    resolution: usize,
    with_zero_values: bool,
}

impl UniformSpaceSampler {
    pub fn new(
        dimension: usize,
        resolution: usize,
        with_zero_values: bool,
    ) -> Result<Self, SamplingError> {
        if dimension == 0 {
            return Err(SamplingError::ZeroDimension);
        }
        if resolution == 0 {
            return Err(SamplingError::ZeroResolution);
        }
        Ok(Self {
            dimension,
            resolution,
            with_zero_values,
        })
    }

    /// Number of vectors [`generate_space_sample`](SpaceSampler::generate_space_sample)
    /// yields.
    pub fn sample_count(&self) -> usize {
        if self.resolution == 1 {
            return 1;
        }
        let total = self.resolution - 1;
        if self.with_zero_values {
            binomial(total + self.dimension - 1, self.dimension - 1)
        } else if total < self.dimension {
            0
        } else {
            binomial(total - 1, self.dimension - 1)
        }
    }
}

impl SpaceSampler for UniformSpaceSampler {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn generate_space_sample(&self) -> WeightIter {
        if self.resolution == 1 {
            let even = 1.0 / self.dimension as f64;
            return Box::new(std::iter::once(vec![even; self.dimension]));
        }
        let total = self.resolution - 1;
        let compositions = Compositions::new(
            total,
            self.dimension,
            if self.with_zero_values { 0 } else { 1 },
        );
        Box::new(compositions.map(move |parts| {
            parts
                .into_iter()
                .map(|p| p as f64 / total as f64)
                .collect()
        }))
    }
}

/// Compositions of `total` into `parts` parts, each at least `min`, in reverse
/// lexicographic order.
struct Compositions {
    current: Option<Vec<usize>>,
    min: usize,
}

impl Compositions {
    fn new(total: usize, parts: usize, min: usize) -> Self {
        let reserved = (parts - 1) * min;
        let current = (total >= parts * min).then(|| {
            let mut first = vec![min; parts];
            first[0] = total - reserved;
            first
        });
        Self { current, min }
    }
}

impl Iterator for Compositions {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let parts = current.len();

        let pivot = (0..parts.saturating_sub(1))
            .rev()
            .find(|&i| current[i] > self.min);
        if let Some(i) = pivot {
            let mut following = current.clone();
            let tail: usize = following[i + 1..].iter().sum();
            following[i] -= 1;
            following[i + 1] = tail + 1 - (parts - i - 2) * self.min;
            for part in following.iter_mut().skip(i + 2) {
                *part = self.min;
            }
            self.current = Some(following);
        }
        Some(current)
    }
}

fn binomial(n: usize, k: usize) -> usize {
    let k = k.min(n - k);
    (0..k).fold(1usize, |acc, i| acc * (n - i) / (i + 1))
}

/// Draws `resolution` independent weight vectors from a symmetric Dirichlet
/// distribution. With a seed the sequence is reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct DirichletSpaceSampler {
    dimension: usize,
    resolution: usize,
    alpha: f64,
    seed: Option<u64>,
}

impl DirichletSpaceSampler {
    pub fn new(dimension: usize, resolution: usize, alpha: f64) -> Result<Self, SamplingError> {
        if dimension == 0 {
            return Err(SamplingError::ZeroDimension);
        }
        if resolution == 0 {
            return Err(SamplingError::ZeroResolution);
        }
        if alpha.is_nan() || alpha <= 0.0 {
            return Err(SamplingError::InvalidAlpha(alpha));
        }
        if dimension > 1 {
            Dirichlet::new_with_size(alpha, dimension)
                .map_err(|e| SamplingError::Distribution(e.to_string()))?;
        }
        Ok(Self {
            dimension,
            resolution,
            alpha,
            seed: None,
        })
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl SpaceSampler for DirichletSpaceSampler {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn generate_space_sample(&self) -> WeightIter {
        if self.dimension == 1 {
            return Box::new(std::iter::repeat_n(vec![1.0], self.resolution));
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        // Parameters were validated in `new`.
        let Ok(distribution) = Dirichlet::new_with_size(self.alpha, self.dimension) else {
            return Box::new(std::iter::empty());
        };
        Box::new((0..self.resolution).map(move |_| distribution.sample(&mut rng)))
    }
}
