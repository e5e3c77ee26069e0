//! Dew-point derivations. Pure functions over an already-converted
//! temperature/humidity pair.

use libm::{expf, fabsf, logf};

/// Magnus approximation constants, valid over the sensor's range.
const MAGNUS_A: f32 = 17.271;
const MAGNUS_B: f32 = 237.7;

const NEWTON_MAX_STEPS: usize = 8;
const NEWTON_TOLERANCE_C: f32 = 1e-4;

/// Fast closed-form dew point (Magnus formula), in degrees Celsius.
///
/// `relative_humidity` is in percent. Accurate to a few tenths of a degree
/// over normal indoor conditions.
pub fn dew_point(celsius: f32, relative_humidity: f32) -> f32 {
    let gamma = (MAGNUS_A * celsius) / (MAGNUS_B + celsius) + logf(relative_humidity * 0.01);
    (MAGNUS_B * gamma) / (MAGNUS_A - gamma)
}

/// High-precision dew point, in degrees Celsius.
///
/// Solves `svp(td) == svp(t) * rh` for `td` by Newton-Raphson on the
/// Arden Buck saturation vapour-pressure curve, seeded with the fast
/// approximation. Slower than [`dew_point`] but tighter near the edges of
/// the sensor's range.
pub fn dew_point_slow(celsius: f32, relative_humidity: f32) -> f32 {
    let target = saturation_vp(celsius) * relative_humidity * 0.01;

    let mut td = dew_point(celsius, relative_humidity);
    for _ in 0..NEWTON_MAX_STEPS {
        let residual = saturation_vp(td) - target;
        let h = 0.01;
        let slope = (saturation_vp(td + h) - saturation_vp(td - h)) / (2.0 * h);
        let step = residual / slope;
        td -= step;
        if fabsf(step) < NEWTON_TOLERANCE_C {
            break;
        }
    }
    td
}

/// Saturation vapour pressure in hPa (Arden Buck equation).
fn saturation_vp(celsius: f32) -> f32 {
    6.1121 * expf((18.678 - celsius / 234.5) * (celsius / (257.14 + celsius)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominal_indoor_conditions() {
        // 20.0C at 65.2% RH has a dew point just above 13C.
        let fast = dew_point(20.0, 65.2);
        assert!((fast - 13.2).abs() < 0.3, "fast = {fast}");

        let slow = dew_point_slow(20.0, 65.2);
        assert!((slow - 13.2).abs() < 0.3, "slow = {slow}");
    }

    #[test]
    fn saturated_air_dews_at_air_temperature() {
        for t in [-5.0_f32, 0.0, 12.5, 30.0] {
            assert!((dew_point(t, 100.0) - t).abs() < 0.05);
            assert!((dew_point_slow(t, 100.0) - t).abs() < 0.05);
        }
    }

    #[test]
    fn slow_and_fast_agree() {
        for (t, rh) in [(25.0_f32, 40.0_f32), (5.0, 80.0), (35.0, 55.0)] {
            let fast = dew_point(t, rh);
            let slow = dew_point_slow(t, rh);
            assert!((fast - slow).abs() < 0.5, "t={t} rh={rh}: {fast} vs {slow}");
        }
    }

    #[test]
    fn dew_point_is_below_air_temperature() {
        let slow = dew_point_slow(22.0, 45.0);
        assert!(slow < 22.0);
        assert!(slow > 0.0);
    }
}
