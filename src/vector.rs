//! Operations on dense `f32` vectors, represented as plain slices.
//!
//! Binary operations require equal-length operands and panic otherwise.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::StandardNormal;

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    assert_same_len(a, b);
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn add(a: &[f32], b: &[f32]) -> Vec<f32> {
    zip_with(a, b, |x, y| x + y)
}

pub fn subtract(a: &[f32], b: &[f32]) -> Vec<f32> {
    zip_with(a, b, |x, y| x - y)
}

pub fn multiply_elem(a: &[f32], b: &[f32]) -> Vec<f32> {
    zip_with(a, b, |x, y| x * y)
}

pub fn divide_elem(a: &[f32], b: &[f32]) -> Vec<f32> {
    zip_with(a, b, |x, y| x / y)
}

pub fn scale(a: &[f32], scalar: f32) -> Vec<f32> {
    a.iter().map(|x| x * scalar).collect()
}

/// Euclidean norm.
pub fn norm(a: &[f32]) -> f32 {
    a.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scales `a` to unit length. A zero vector is returned unchanged.
pub fn normalize(a: &[f32]) -> Vec<f32> {
    let mag = norm(a);
    if mag == 0.0 {
        a.to_vec()
    } else {
        scale(a, 1.0 / mag)
    }
}

pub fn zeros(len: usize) -> Vec<f32> {
    vec![0.0; len]
}

pub fn ones(len: usize) -> Vec<f32> {
    vec![1.0; len]
}

/// Fills `vec` with values drawn uniformly from `[-1, 1]`.
pub fn randomize_uniform<R: Rng + ?Sized>(vec: &mut [f32], rng: &mut R) {
    let range = Uniform::new_inclusive(-1.0f32, 1.0);
    for v in vec {
        *v = range.sample(rng);
    }
}

/// Fills `vec` with standard-normal samples.
pub fn randomize_normal<R: Rng + ?Sized>(vec: &mut [f32], rng: &mut R) {
    for v in vec {
        *v = StandardNormal.sample(rng);
    }
}

pub fn map_inplace<F>(vec: &mut [f32], mut f: F)
where
    F: FnMut(f32) -> f32,
{
    for v in vec {
        *v = f(*v);
    }
}

/// Returns the index of the largest element. Ties go to the lowest index.
///
/// # Panics
///
/// Panics if `a` is empty.
pub fn arg_max(a: &[f32]) -> usize {
    assert!(!a.is_empty(), "arg_max of an empty vector");
    let mut best = 0;
    for (i, &v) in a.iter().enumerate().skip(1) {
        if v > a[best] {
            best = i;
        }
    }
    best
}

fn zip_with<F>(a: &[f32], b: &[f32], f: F) -> Vec<f32>
where
    F: Fn(f32, f32) -> f32,
{
    assert_same_len(a, b);
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}

#[inline(always)]
fn assert_same_len(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len(), "vector lengths differ");
}
