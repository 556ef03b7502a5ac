//! CPU reference for the adder kernel.

use super::thresholds::{get_parallel_config, ParallelThresholdsConfig};
use crate::core::error::{HostError, Result};
use crate::core::types::Lane;
use rayon::prelude::*;

/// Write `input[i] + increment` (wrapping) into `output[i]` for every element.
pub fn add_scalar<T: Lane>(input: &[T], output: &mut [T], increment: T) -> Result<()> {
    add_scalar_with(get_parallel_config(), input, output, increment)
}

/// Same as [`add_scalar`] with explicit parallel thresholds.
pub fn add_scalar_with<T: Lane>(
    thresholds: &ParallelThresholdsConfig,
    input: &[T],
    output: &mut [T],
    increment: T,
) -> Result<()> {
    if input.len() != output.len() {
        return Err(HostError::length_mismatch(input.len(), output.len()));
    }

    if thresholds.should_parallelize(input.len()) {
        let chunk = thresholds.optimal_chunk_size(input.len());
        output
            .par_chunks_mut(chunk)
            .zip(input.par_chunks(chunk))
            .for_each(|(out, inp)| add_chunk(inp, out, increment));
    } else {
        add_chunk(input, output, increment);
    }
    Ok(())
}

#[inline]
fn add_chunk<T: Lane>(input: &[T], output: &mut [T], increment: T) {
    for (o, i) in output.iter_mut().zip(input) {
        *o = i.wrapping_add(&increment);
    }
}

/// Compute the expected device output for `input`.
pub fn software_reference<T: Lane>(input: &[T], increment: T) -> Vec<T> {
    let thresholds = get_parallel_config();
    if thresholds.should_parallelize(input.len()) {
        input.par_iter().map(|x| x.wrapping_add(&increment)).collect()
    } else {
        input.iter().map(|x| x.wrapping_add(&increment)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::thresholds::ParallelThresholdsBuilder;

    #[test]
    fn test_reference_matches_example() {
        let input: Vec<i32> = (0..4096).collect();
        let sw = software_reference(&input, 10);
        assert_eq!(sw[0], 10);
        assert_eq!(sw[4095], 4105);
    }

    #[test]
    fn test_wraps_on_overflow() {
        let sw = software_reference(&[i32::MAX, i32::MIN], 1);
        assert_eq!(sw, vec![i32::MIN, i32::MIN + 1]);
    }

    #[test]
    fn test_length_mismatch() {
        let mut out = vec![0i32; 3];
        let err = add_scalar(&[1, 2], &mut out, 1).unwrap_err();
        assert!(matches!(err, HostError::LengthMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_zero_min_chunk_on_empty_input() {
        let config = ParallelThresholdsConfig {
            vector_threshold: 0,
            num_threads: 4,
            min_chunk_size: 0,
        };
        let mut out: Vec<i32> = Vec::new();
        add_scalar_with(&config, &[], &mut out, 1).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_reference_of_empty_input() {
        assert!(software_reference::<i32>(&[], 5).is_empty());
    }

    #[test]
    fn test_parallel_path_agrees_with_sequential() {
        let forced = ParallelThresholdsConfig {
            num_threads: 4,
            ..ParallelThresholdsBuilder::new()
                .vector_threshold(1)
                .min_chunk_size(7)
                .build()
        };
        let input: Vec<i64> = (0..1000).map(|i| i * 3 - 500).collect();
        let mut parallel = vec![0i64; input.len()];
        add_scalar_with(&forced, &input, &mut parallel, -9).unwrap();

        let sequential: Vec<i64> = input.iter().map(|v| v - 9).collect();
        assert_eq!(parallel, sequential);
    }
}
