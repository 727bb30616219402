use crate::components::{Image, Property, TIME_START};

/// Reflectance of 1.0 in fixed point units.
pub const REFLECTANCE_SCALE: f64 = 10_000.;

/// Truncates toward zero, saturating at the `i16` bounds.
pub fn encode_value(reflectance: f64) -> i16 {
    (reflectance * REFLECTANCE_SCALE) as i16
}

pub fn decode_value(encoded: i16) -> f64 {
    f64::from(encoded) / REFLECTANCE_SCALE
}

/// Fixed point `Int16` reflectance, keeping the acquisition time.
pub fn encode(image: &Image) -> Image {
    image
        .multiply_scalar(REFLECTANCE_SCALE)
        .to_int16()
        .set(TIME_START, Property::copied(image, TIME_START))
}

/// Floating point reflectance from [encode]d pixels, keeping the acquisition time.
pub fn decode(image: &Image) -> Image {
    image
        .divide_scalar(REFLECTANCE_SCALE)
        .set(TIME_START, Property::copied(image, TIME_START))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::PixelType,
        engines::{
            fixtures::{engine, first_scene, flat, june},
            Engine,
        },
    };
    use rstest::rstest;

    #[rstest]
    #[case(0.45213, 4521)]
    #[case(-0.45213, -4521)]
    #[case(0.99999, 9999)]
    #[case(3.5, i16::MAX)]
    #[case(-4., i16::MIN)]
    fn encode_truncates_toward_zero(#[case] reflectance: f64, #[case] expected: i16) {
        assert_eq!(encode_value(reflectance), expected);
    }

    #[rstest]
    #[case(-0.01)]
    #[case(0.)]
    #[case(0.1234)]
    #[case(0.9999)]
    #[case(3.2767)]
    fn decode_inverts_encode(#[case] reflectance: f64) {
        assert!((decode_value(encode_value(reflectance)) - reflectance).abs() <= 1e-4);
    }

    #[test_log::test]
    fn encoded_pixels_match_scalar_encoding() {
        let values = [0.45213, -0.01, 0.1234, 3.5];
        let engine = engine(&[(june(1), flat(&values))]);
        let scene = first_scene(&engine, values.len());
        let encoded = encode(&scene);
        assert_eq!(encoded.pixel_type(), PixelType::Int16);
        let raster = engine.compute_pixels(&encoded).unwrap();
        for (band, value) in values.iter().enumerate() {
            assert_eq!(raster.value(band, 0, 0), Some(f64::from(encode_value(*value))));
        }
        let decoded = engine.compute_pixels(&decode(&encoded)).unwrap();
        assert!((decoded.value(2, 3, 3).unwrap() - 0.1234).abs() <= 1e-4);
    }

    #[test_log::test]
    fn rescaling_keeps_time_start() {
        let engine = engine(&[(june(7), flat(&[0.2]))]);
        let decoded = decode(&encode(&first_scene(&engine, 1)));
        let values = engine.compute_properties(&decoded).unwrap();
        assert_eq!(values[TIME_START].as_time(), Some(&june(7)));
    }
}
