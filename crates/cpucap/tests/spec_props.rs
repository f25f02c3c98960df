use cpucap::prelude::*;
use cpucap::spec::{parse, Assignment};
use cpucap::SpecError;
use cpucap_test_utils::{create_controller_with_values, distinct_values};
use proptest::prelude::*;

const UNITS: u32 = 32;
const MAX: u64 = 1024;

fn in_bounds_assignment() -> impl Strategy<Value = Assignment> {
    (0..UNITS, 0..UNITS, 0..=MAX).prop_map(|(a, b, value)| {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Assignment::range(start, end, value).unwrap()
    })
}

fn join(batch: &[Assignment]) -> String {
    batch
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[test]
fn test_hex_and_octal_forms() {
    assert_eq!(parse("0x10:0x400").unwrap(), vec![Assignment::single(16, 1024)]);
    assert_eq!(parse("017:01").unwrap(), vec![Assignment::single(15, 1)]);
}

proptest! {
    #[test]
    fn prop_rendered_batch_parses_back(batch in prop::collection::vec(in_bounds_assignment(), 0..8)) {
        prop_assert_eq!(parse(&join(&batch)).unwrap(), batch);
    }

    #[test]
    fn prop_whitespace_is_ignored(
        batch in prop::collection::vec(in_bounds_assignment(), 1..6),
        pad in "[ \t]{0,3}",
    ) {
        let padded = batch
            .iter()
            .map(|a| format!("{pad}{a}{pad}"))
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(parse(&format!("{padded}\n")).unwrap(), batch);
    }

    #[test]
    fn prop_inverted_range_rejected(a in 0u32..1000, b in 0u32..1000, value in 0u64..2048) {
        prop_assume!(a != b);
        let (start, end) = if a > b { (a, b) } else { (b, a) };
        prop_assert_eq!(
            parse(&format!("{start}-{end}:{value}")),
            Err(SpecError::InvertedRange { start, end })
        );
    }

    #[test]
    fn prop_single_write_lands(unit in 0..UNITS, value in 0..=MAX) {
        let ctl = create_controller_with_values(distinct_values(UNITS as usize));
        ctl.set_configuration(Some(format!("{unit}:{value}").as_str())).unwrap();
        prop_assert_eq!(ctl.capacity(unit), Some(value));
        prop_assert_eq!(ctl.get_configuration(), format!("{unit}:{value}"));
    }

    #[test]
    fn prop_out_of_bounds_changes_nothing(
        unit in UNITS..UNITS * 4,
        value in 0..=MAX * 4,
    ) {
        let ctl = create_controller_with_values(distinct_values(UNITS as usize));
        let before = ctl.table();

        let result = ctl.set_configuration(Some(format!("0:1,{unit}:{value}").as_str()));
        prop_assert!(result.is_err());

        let after = ctl.table();
        prop_assert_eq!(after.values, before.values);
        prop_assert_eq!(after.configuration, before.configuration);
    }

    #[test]
    fn prop_restore_returns_pristine(batches in prop::collection::vec(
        prop::collection::vec(in_bounds_assignment(), 1..4),
        1..6,
    )) {
        let pristine = distinct_values(UNITS as usize);
        let ctl = create_controller_with_values(pristine.clone());

        for batch in &batches {
            ctl.set_configuration(Some(join(batch).as_str())).unwrap();
        }
        prop_assert_eq!(ctl.table().snapshot, Some(pristine.clone()));

        ctl.on_unload();
        prop_assert_eq!(ctl.table().values, pristine);
        prop_assert!(!ctl.is_saved());
    }
}
