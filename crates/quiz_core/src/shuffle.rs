//! crates/quiz_core/src/shuffle.rs
//!
//! Option shuffling. The only contract that matters here: after shuffling,
//! the option at the returned index is the option that was correct before.

use rand::seq::SliceRandom;
use rand::Rng;

/// Reorders `options` by `permutation`, where `new[i] = old[permutation[i]]`,
/// and returns the index the correct option moved to.
///
/// Returns `None` when `permutation` is not a permutation of `0..options.len()`
/// or `correct_index` is out of range.
pub fn apply_permutation<T: Clone>(
    options: &[T],
    correct_index: usize,
    permutation: &[usize],
) -> Option<(Vec<T>, usize)> {
    if correct_index >= options.len() || !is_permutation(permutation, options.len()) {
        return None;
    }
    let reordered = permutation.iter().map(|&i| options[i].clone()).collect();
    let new_correct = permutation.iter().position(|&i| i == correct_index)?;
    Some((reordered, new_correct))
}

/// Shuffles `options` uniformly at random and remaps `correct_index`.
pub fn shuffle_options<T: Clone, R: Rng + ?Sized>(
    options: &[T],
    correct_index: usize,
    rng: &mut R,
) -> Option<(Vec<T>, usize)> {
    let mut permutation: Vec<usize> = (0..options.len()).collect();
    permutation.shuffle(rng);
    apply_permutation(options, correct_index, &permutation)
}

fn is_permutation(permutation: &[usize], len: usize) -> bool {
    if permutation.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &i in permutation {
        match seen.get_mut(i) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
