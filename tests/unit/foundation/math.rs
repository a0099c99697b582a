use super::*;

#[test]
fn format_secs_trims_trailing_zeros() {
    assert_eq!(format_secs(0.0), "0");
    assert_eq!(format_secs(29.0), "29");
    assert_eq!(format_secs(12.5), "12.5");
    assert_eq!(format_secs(12.345_678), "12.345678");
}

#[test]
fn format_secs_never_uses_exponent_notation() {
    assert_eq!(format_secs(1e-7), "0");
    assert_eq!(format_secs(4e-6), "0.000004");
    assert_eq!(format_secs(1e12), "1000000000000");
    assert!(!format_secs(-1e-9).starts_with('-'));
}

#[test]
fn format_secs_rounds_float_noise() {
    // 29.9 - 29.0 is 0.8999999999999986 in binary floating point.
    assert_eq!(format_secs(29.9 - 29.0), "0.9");
    assert_eq!(format_secs(0.1 + 0.2), "0.3");
}

#[test]
fn as_whole_rejects_fractions_and_non_finite() {
    assert_eq!(as_whole(12.0), Some(12.0));
    assert_eq!(as_whole(12.5), None);
    assert_eq!(as_whole(f64::NAN), None);
    assert_eq!(as_whole(f64::INFINITY), None);
}
