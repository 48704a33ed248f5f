//! Point set generators on the unit square.
//!
//! Each generator fills `num_sets` consecutive sets of `num_samples` points.
//! Square-grid patterns take `num_samples = n * n`.

use ember_core::SamplerKind;
use ember_math::Vec2;
use rand::{rngs::StdRng, seq::SliceRandom, Rng};

/// Largest f32 strictly below one.
pub(crate) const ONE_MINUS_EPSILON: f32 = 1.0_f32 - f32::EPSILON;

fn unit(v: f32) -> f32 {
    v.clamp(0.0, ONE_MINUS_EPSILON)
}

fn point(x: f32, y: f32) -> Vec2 {
    Vec2::new(unit(x), unit(y))
}

/// Generate `num_sets * num_samples` points for `kind`.
///
/// `num_samples` must be a perfect square for grid kinds; the caller checks.
pub(super) fn generate(
    kind: SamplerKind,
    num_samples: usize,
    num_sets: usize,
    rng: &mut StdRng,
) -> Vec<Vec2> {
    let mut samples = Vec::with_capacity(num_samples * num_sets);
    for _ in 0..num_sets {
        let set = match kind {
            SamplerKind::Regular => regular(num_samples),
            SamplerKind::Random => random(num_samples, rng),
            SamplerKind::Jittered => jittered(num_samples, rng),
            SamplerKind::NRooks => n_rooks(num_samples, rng),
            SamplerKind::MultiJittered => multi_jittered(num_samples, rng),
        };
        samples.extend(set);
    }
    samples
}

/// Side length of a square sample grid.
pub(super) fn grid_side(num_samples: usize) -> usize {
    (num_samples as f64).sqrt().round() as usize
}

fn regular(num_samples: usize) -> Vec<Vec2> {
    let n = grid_side(num_samples);
    let inv = 1.0 / n as f32;
    (0..n)
        .flat_map(|p| (0..n).map(move |q| point((q as f32 + 0.5) * inv, (p as f32 + 0.5) * inv)))
        .collect()
}

fn random(num_samples: usize, rng: &mut StdRng) -> Vec<Vec2> {
    (0..num_samples)
        .map(|_| point(rng.gen(), rng.gen()))
        .collect()
}

fn jittered(num_samples: usize, rng: &mut StdRng) -> Vec<Vec2> {
    let n = grid_side(num_samples);
    let inv = 1.0 / n as f32;
    let mut samples = Vec::with_capacity(num_samples);
    for p in 0..n {
        for q in 0..n {
            let (jx, jy): (f32, f32) = (rng.gen(), rng.gen());
            samples.push(point((q as f32 + jx) * inv, (p as f32 + jy) * inv));
        }
    }
    samples
}

fn n_rooks(num_samples: usize, rng: &mut StdRng) -> Vec<Vec2> {
    let inv = 1.0 / num_samples as f32;
    let mut samples: Vec<Vec2> = (0..num_samples)
        .map(|j| {
            let (jx, jy): (f32, f32) = (rng.gen(), rng.gen());
            point((j as f32 + jx) * inv, (j as f32 + jy) * inv)
        })
        .collect();

    // Decouple the diagonal
    let mut xs: Vec<f32> = samples.iter().map(|s| s.x).collect();
    let mut ys: Vec<f32> = samples.iter().map(|s| s.y).collect();
    xs.shuffle(rng);
    ys.shuffle(rng);
    for ((sample, x), y) in samples.iter_mut().zip(xs).zip(ys) {
        *sample = Vec2::new(x, y);
    }
    samples
}

/// Chiu, Shirley and Wang's multi-jittered pattern.
///
/// The sample at index `i * n + j` stays in coarse cell `i` along x and
/// coarse cell `j` along y, while the whole set also covers every one of the
/// `n * n` sub-cell columns and rows exactly once.
fn multi_jittered(num_samples: usize, rng: &mut StdRng) -> Vec<Vec2> {
    let n = grid_side(num_samples);
    let subcell = 1.0 / num_samples as f32;

    let mut samples = Vec::with_capacity(num_samples);
    for i in 0..n {
        for j in 0..n {
            let (jx, jy): (f32, f32) = (rng.gen(), rng.gen());
            samples.push(point(
                ((i * n + j) as f32 + jx) * subcell,
                ((j * n + i) as f32 + jy) * subcell,
            ));
        }
    }

    // Shuffle x within each coarse x cell
    for i in 0..n {
        for j in 0..n {
            let k = rng.gen_range(j..n);
            let (a, b) = (i * n + j, i * n + k);
            let tmp = samples[a].x;
            samples[a].x = samples[b].x;
            samples[b].x = tmp;
        }
    }

    // Shuffle y within each coarse y cell
    for j in 0..n {
        for i in 0..n {
            let k = rng.gen_range(i..n);
            let (a, b) = (i * n + j, k * n + j);
            let tmp = samples[a].y;
            samples[a].y = samples[b].y;
            samples[b].y = tmp;
        }
    }

    samples
}
