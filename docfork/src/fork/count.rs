//! Translating a requested fork count into a number of processes.

use crate::error::ForkError;

const MAX_FORKS: f64 = 1000.0;

/// Compute how many copies to launch for a `--fork` value.
///
/// Values of at least 1 are rounded to the nearest integer. Values in
/// `(0, 1)` are a fraction of the `n_cpu` logical cores (detected when
/// `None`), leaving one core free but launching at least one process. Zero
/// and negative values mean no forking.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn resolve_fork_count(requested: f64, n_cpu: Option<usize>) -> Result<usize, ForkError> {
    if !requested.is_finite() || requested > MAX_FORKS {
        return Err(ForkError::InvalidForkCount(requested));
    }
    if requested <= 0.0 {
        return Ok(0);
    }
    if requested < 1.0 {
        let n_cpu = n_cpu.unwrap_or_else(num_cpus::get).max(1);
        let share = (requested * n_cpu as f64).round_ties_even() as usize;
        return Ok(share.min(n_cpu - 1).max(1));
    }
    Ok(requested.round_ties_even() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_counts() {
        assert_eq!(resolve_fork_count(1.0, None).unwrap(), 1);
        assert_eq!(resolve_fork_count(2.0, None).unwrap(), 2);
        assert_eq!(resolve_fork_count(2.3, None).unwrap(), 2);
        assert_eq!(resolve_fork_count(2.6, None).unwrap(), 3);
        assert_eq!(resolve_fork_count(1000.0, None).unwrap(), 1000);
    }

    #[test]
    fn fractions_of_cores() {
        assert_eq!(resolve_fork_count(0.5, Some(10)).unwrap(), 5);
        assert_eq!(resolve_fork_count(0.3, Some(10)).unwrap(), 3);
        assert_eq!(resolve_fork_count(0.5, Some(16)).unwrap(), 8);
        assert_eq!(resolve_fork_count(0.99, Some(8)).unwrap(), 7);
        assert_eq!(resolve_fork_count(0.5, Some(1)).unwrap(), 1);
        assert_eq!(resolve_fork_count(0.01, Some(4)).unwrap(), 1);
    }

    #[test]
    fn detected_cores() {
        let n = resolve_fork_count(0.5, None).unwrap();
        assert!((1..10_000).contains(&n));
    }

    #[test]
    fn no_forking() {
        assert_eq!(resolve_fork_count(0.0, None).unwrap(), 0);
        assert_eq!(resolve_fork_count(-1.0, None).unwrap(), 0);
    }

    #[test]
    fn invalid_counts() {
        assert!(matches!(
            resolve_fork_count(f64::NAN, None),
            Err(ForkError::InvalidForkCount(_))
        ));
        assert!(resolve_fork_count(f64::INFINITY, None).is_err());
        assert!(resolve_fork_count(1000.5, None).is_err());
    }
}
