//! Unique answer-option generation
//!
//! Options are drawn uniformly from a closed range until the requested count
//! of distinct values is reached. The random phase has a fixed budget; if it
//! runs out, the remaining slots are filled from the unused values of the
//! range in a random order, so generation always terminates. A range with
//! fewer distinct values than requested is a configuration error.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ConfigError;

/// Random draws allowed before falling back to the exhaustive fill
pub const MAX_DRAW_ATTEMPTS: usize = 1000;

/// Number of distinct integers in `lo..=hi`
#[inline]
pub fn range_len(lo: i32, hi: i32) -> usize {
    if hi < lo {
        0
    } else {
        (hi as i64 - lo as i64 + 1) as usize
    }
}

/// Fail early if `lo..=hi` cannot supply `count` distinct values
pub fn check_range(lo: i32, hi: i32, count: usize) -> Result<(), ConfigError> {
    if range_len(lo, hi) < count {
        return Err(ConfigError::RangeTooSmall { lo, hi, count });
    }
    Ok(())
}

/// Build `count` distinct values from `lo..=hi`, containing `correct` exactly
/// once, in shuffled order.
///
/// `correct` is always included even when it lies outside the range.
pub fn unique_options<R: Rng>(
    rng: &mut R,
    correct: i32,
    count: usize,
    lo: i32,
    hi: i32,
) -> Result<Vec<i32>, ConfigError> {
    let in_range = (lo..=hi).contains(&correct);
    let available = range_len(lo, hi) + usize::from(!in_range);
    if available < count {
        return Err(ConfigError::RangeTooSmall { lo, hi, count });
    }

    let mut values = Vec::with_capacity(count);
    values.push(correct);

    let mut attempts = 0;
    while values.len() < count && attempts < MAX_DRAW_ATTEMPTS {
        let candidate = rng.random_range(lo..=hi);
        if !values.contains(&candidate) {
            values.push(candidate);
        }
        attempts += 1;
    }

    if values.len() < count {
        log::debug!(
            "option draw budget exhausted for {lo}..={hi}, filling {} deterministically",
            count - values.len()
        );
        let mut unused: Vec<i32> = (lo..=hi).filter(|v| !values.contains(v)).collect();
        unused.shuffle(rng);
        values.extend(unused.into_iter().take(count - values.len()));
    }

    values.shuffle(rng);
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_options_are_unique_and_contain_correct_once() {
        let mut rng = Pcg32::seed_from_u64(7);
        for correct in 0..=5 {
            let opts = unique_options(&mut rng, correct, 4, 0, 5).unwrap();
            assert_eq!(opts.len(), 4);
            assert_eq!(opts.iter().filter(|&&v| v == correct).count(), 1);
            let mut sorted = opts.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), 4);
            assert!(opts.iter().all(|v| (0..=5).contains(v)));
        }
    }

    #[test]
    fn test_exact_fit_range_terminates() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut opts = unique_options(&mut rng, 2, 4, 0, 3).unwrap();
        opts.sort();
        assert_eq!(opts, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_undersized_range_is_config_error() {
        let mut rng = Pcg32::seed_from_u64(1);
        let err = unique_options(&mut rng, 1, 4, 0, 2).unwrap_err();
        assert!(matches!(err, ConfigError::RangeTooSmall { count: 4, .. }));
        assert!(check_range(0, 2, 4).is_err());
        assert!(check_range(0, 3, 4).is_ok());
    }

    #[test]
    fn test_correct_outside_range_still_included() {
        let mut rng = Pcg32::seed_from_u64(3);
        let opts = unique_options(&mut rng, 99, 3, 0, 10).unwrap();
        assert!(opts.contains(&99));
        assert_eq!(opts.len(), 3);
    }
}
