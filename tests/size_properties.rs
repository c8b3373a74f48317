//! Properties of the size helpers

use installer_storage::describe::size::{exact_size, format_size, parse_size, UNLIMITED};
use proptest::prelude::*;

proptest! {
    #[test]
    fn exact_size_parses_back(bytes in 0u64..(1u64 << 62)) {
        let text = exact_size(bytes);
        prop_assert_eq!(parse_size(&text).unwrap(), bytes, "{}", text);
    }

    // Formatting keeps two decimals, so the round trip is off by less than
    // half a hundredth of the unit.
    #[test]
    fn formatted_size_parses_back_within_rounding(bytes in 0i64..(1i64 << 52)) {
        let text = format_size(bytes).unwrap();
        let parsed = parse_size(&text).unwrap() as f64;
        let tolerance = bytes as f64 * 0.005 + 1.0;
        prop_assert!((parsed - bytes as f64).abs() <= tolerance, "{} -> {} -> {}", bytes, text, parsed);
    }

    #[test]
    fn negative_sizes_are_never_rendered(bytes in i64::MIN..0) {
        prop_assert_eq!(format_size(bytes), None);
    }
}

#[test]
fn unlimited_sentinel_has_no_text() {
    assert_eq!(format_size(UNLIMITED), None);
}
