//! Property tests: every output element equals its input plus the increment.

use fpga_adder_core::compute::{add_scalar_with, software_reference, ParallelThresholdsBuilder};
use fpga_adder_core::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_emulated_output_is_input_plus_increment(
        input in prop::collection::vec(any::<i32>(), 1..2048),
        increment in any::<i32>(),
    ) {
        let mut backend = EmulatedBackend::new();
        backend.load_kernel(None, "adder").unwrap();
        let size = i32::try_from(input.len()).unwrap();
        let mut output = vec![0; input.len()];

        backend.execute(&input, &mut output, AdderArgs { increment, size }).unwrap();

        for (i, (&o, &x)) in output.iter().zip(&input).enumerate() {
            prop_assert_eq!(o, x.wrapping_add(increment), "element {}", i);
        }
    }

    #[test]
    fn prop_device_agrees_with_reference(
        seed in any::<u64>(),
        size in 1usize..5000,
        increment in -1000i32..1000,
    ) {
        let config = AdderConfigBuilder::new()
            .data_size(size)
            .increment(increment)
            .input_pattern(InputPattern::Random { seed })
            .build()
            .unwrap();
        let report = AdderHost::new(config)
            .unwrap()
            .run(&mut EmulatedBackend::new())
            .unwrap();
        prop_assert!(report.passed());
    }

    #[test]
    fn prop_parallel_reference_matches_sequential(
        input in prop::collection::vec(any::<i32>(), 0..4096),
        increment in any::<i32>(),
        chunk in 1usize..512,
    ) {
        let forced = ParallelThresholdsBuilder::new()
            .vector_threshold(0)
            .min_chunk_size(chunk)
            .build();
        let mut parallel = vec![0; input.len()];
        add_scalar_with(&forced, &input, &mut parallel, increment).unwrap();

        prop_assert_eq!(parallel, software_reference(&input, increment));
    }

    #[test]
    fn prop_verify_finds_the_corrupted_index(
        len in 1usize..1000,
        corrupt in any::<prop::sample::Index>(),
    ) {
        let sw: Vec<i32> = (0..len as i32).collect();
        let mut hw = sw.clone();
        let index = corrupt.index(len);
        hw[index] = hw[index].wrapping_add(1);

        let mismatch = *verify(&hw, &sw).unwrap().mismatch().unwrap();
        prop_assert_eq!(mismatch.index, index);
        prop_assert_eq!(mismatch.cpu, sw[index]);
        prop_assert_eq!(mismatch.device, hw[index]);
    }
}
