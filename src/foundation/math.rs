/// Fractional digits kept when handing time offsets to `ffmpeg`.
pub const SECONDS_PRECISION: usize = 6;

/// Round `v` to [`SECONDS_PRECISION`] fractional digits.
pub fn round_secs(v: f64) -> f64 {
    let scale = 10f64.powi(SECONDS_PRECISION as i32);
    let r = (v * scale).round() / scale;
    // Avoid handing out a negative zero.
    if r == 0.0 { 0.0 } else { r }
}

/// Render seconds as a plain decimal string accepted by `ffmpeg` time options.
///
/// Never uses scientific notation (`1e-7` becomes `0`), keeps at most
/// [`SECONDS_PRECISION`] fractional digits and trims trailing zeros, so `29.0` renders as `29`
/// and `0.9000000001` as `0.9`.
pub fn format_secs(v: f64) -> String {
    let mut s = format!("{:.*}", SECONDS_PRECISION, round_secs(v));
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Return `Some(v)` when `v` is a finite whole number.
pub fn as_whole(v: f64) -> Option<f64> {
    (v.is_finite() && v.fract() == 0.0).then_some(v)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
