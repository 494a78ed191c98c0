//! Property-based tests for the planning invariants.

use archstrap::disk::plan::{swap_size_mib, ESP_SIZE_MIB, ESP_START_MIB};
use archstrap::disk::{PartitionPlan, PartitionRole};
use archstrap::Stage;
use proptest::prelude::*;

proptest! {
    /// Swap never shrinks as RAM grows and never exceeds RAM.
    #[test]
    fn swap_is_monotonic_and_bounded(ram in 1u64..1_048_576) {
        let swap = swap_size_mib(ram);
        prop_assert!(swap <= ram);
        prop_assert!(swap_size_mib(ram + 1) >= swap);
        // RAM-sized up to the knee
        if ram <= 8192 {
            prop_assert_eq!(swap, ram);
        }
    }

    /// For any disk at least one MiB larger than ESP + swap, the three
    /// boundaries are strictly increasing and stay within capacity.
    #[test]
    fn plan_boundaries_are_strictly_increasing(
        ram in 1u64..262_144,
        slack in 1u64..1_048_576,
    ) {
        let disk_mib = ESP_START_MIB + ESP_SIZE_MIB + swap_size_mib(ram) + slack;
        let plan = PartitionPlan::compute(disk_mib, ram).expect("disk is large enough");

        prop_assert!(plan.esp_start_mib < plan.swap_start_mib);
        prop_assert!(plan.swap_start_mib < plan.root_start_mib);
        prop_assert!(plan.root_start_mib < plan.disk_mib);
        prop_assert!(plan.is_well_formed());
        prop_assert_eq!(plan.root_mib(), slack);
    }

    /// Any disk no larger than ESP + swap is refused.
    #[test]
    fn undersized_disks_are_always_refused(
        ram in 1u64..262_144,
        disk_mib in 0u64..8192,
    ) {
        let required = ESP_START_MIB + ESP_SIZE_MIB + swap_size_mib(ram);
        if disk_mib <= required {
            prop_assert!(PartitionPlan::compute(disk_mib, ram).is_err());
        }
    }
}

proptest! {
    /// Role and stage enum strings round-trip through parse.
    #[test]
    fn role_strings_roundtrip(role in prop_oneof![
        Just(PartitionRole::Root),
        Just(PartitionRole::Efi),
    ]) {
        let parsed: PartitionRole = role.to_string().parse().expect("round-trips");
        prop_assert_eq!(parsed, role);
    }

    #[test]
    fn stage_strings_roundtrip(stage in prop_oneof![
        Just(Stage::Preflight),
        Just(Stage::Disk),
        Just(Stage::Bootstrap),
    ]) {
        let parsed: Stage = stage.to_string().parse().expect("round-trips");
        prop_assert_eq!(parsed, stage);
    }
}
