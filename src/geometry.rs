/// Decodes a raw target field using the sensor's sign convention.
///
/// The most significant bit is set for positive values and clear for negative
/// ones, the opposite of two's complement:
///
/// - `0x8000` decodes to `0`, `0x8001` to `1`
/// - `0x0001` decodes to `-32767`, `0x0000` to `-32768`
pub fn signed_magnitude(raw: u16) -> i16 {
    if raw & 0x8000 != 0 {
        (raw & 0x7FFF) as i16
    } else {
        // 0x8000 - raw is in 1..=0x8000, so the result always fits in an i16
        (-(0x8000 - i32::from(raw))) as i16
    }
}

/// Rotates a point around the origin by `degrees`.
///
/// A zero angle returns the point untouched.
pub fn rotate(x: f32, y: f32, degrees: f32) -> (f32, f32) {
    if degrees == 0.0 {
        return (x, y);
    }
    let theta = degrees * (core::f32::consts::PI / 180.0);
    let (sin, cos) = (libm::sinf(theta), libm::cosf(theta));
    (x * cos - y * sin, x * sin + y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_signed_magnitude_reference_values() {
        assert_eq!(signed_magnitude(0x8000), 0);
        assert_eq!(signed_magnitude(0x8001), 1);
        assert_eq!(signed_magnitude(0xFFFF), 32767);
        assert_eq!(signed_magnitude(0x0001), -32767);
        assert_eq!(signed_magnitude(0x0000), -32768);
        assert_eq!(signed_magnitude(0x7FFF), -1);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let (x, y) = rotate(1000.0, 0.0, 90.0);
        assert!(x.abs() < 0.01);
        assert!((y - 1000.0).abs() < 0.01);

        let (x, y) = rotate(0.0, 500.0, -90.0);
        assert!((x - 500.0).abs() < 0.01);
        assert!(y.abs() < 0.01);
    }

    #[test]
    fn test_rotate_half_turn() {
        let (x, y) = rotate(-120.0, 340.0, 180.0);
        assert!((x - 120.0).abs() < 0.01);
        assert!((y + 340.0).abs() < 0.01);
    }

    proptest! {
        #[test]
        fn zero_rotation_is_identity(x in -32768i32..=32767, y in -32768i32..=32767) {
            let (rx, ry) = rotate(x as f32, y as f32, 0.0);
            prop_assert_eq!(rx, x as f32);
            prop_assert_eq!(ry, y as f32);
        }

        #[test]
        fn signed_magnitude_sign_follows_high_bit(raw in any::<u16>()) {
            let value = signed_magnitude(raw);
            if raw & 0x8000 != 0 {
                prop_assert!(value >= 0);
                prop_assert_eq!(value as u16, raw & 0x7FFF);
            } else {
                prop_assert!(value < 0);
                prop_assert_eq!(i32::from(value), i32::from(raw) - 0x8000);
            }
        }

        #[test]
        fn rotation_preserves_distance(
            x in -6000.0f32..6000.0,
            y in 0.0f32..6000.0,
            angle in -180.0f32..180.0,
        ) {
            let (rx, ry) = rotate(x, y, angle);
            let before = libm::sqrtf(x * x + y * y);
            let after = libm::sqrtf(rx * rx + ry * ry);
            prop_assert!((before - after).abs() < 0.5);
        }
    }
}
