//! [Window functions](https://en.wikipedia.org/wiki/Window_function).

use crate::config::FFT_POINTS;

/// The half sine window `w[i] = sin(pi * i / (N - 1))` for `N = FFT_POINTS`,
/// evaluated in double precision and rounded to `f32`.
///
/// Note that this is not the Hann window, which is the square of this function.
pub const HALF_SINE_WINDOW: [f32; FFT_POINTS] = [
    0.0, 0.0498458855, 0.0995678455, 0.149042264,
    0.19814615, 0.246757403, 0.294755161, 0.342020154,
    0.388434798, 0.433883727, 0.47825399, 0.521435201,
    0.563320041, 0.60380441, 0.642787635, 0.680172741,
    0.715866864, 0.749781191, 0.781831503, 0.811937988,
    0.840025902, 0.866025388, 0.889871836, 0.911505878,
    0.930873752, 0.947927356, 0.962624252, 0.974927902,
    0.98480773, 0.992239177, 0.997203827, 0.999689162,
    0.999689162, 0.997203827, 0.992239177, 0.98480773,
    0.974927902, 0.962624252, 0.947927356, 0.930873752,
    0.911505878, 0.889871836, 0.866025388, 0.840025902,
    0.811937988, 0.781831503, 0.749781191, 0.715866864,
    0.680172741, 0.642787635, 0.60380441, 0.563320041,
    0.521435201, 0.47825399, 0.433883727, 0.388434798,
    0.342020154, 0.294755161, 0.246757403, 0.19814615,
    0.149042264, 0.0995678455, 0.0498458855, 1.22464685e-16,
];

#[cfg(test)]
mod tests {
    use super::HALF_SINE_WINDOW;
    use crate::config::FFT_POINTS;

    #[test]
    fn test_half_sine_window() {
        let last = (FFT_POINTS - 1) as f64;
        for (i, value) in HALF_SINE_WINDOW.iter().enumerate() {
            let expected = (core::f64::consts::PI * (i as f64) / last).sin() as f32;
            assert_eq!(*value, expected, "coefficient {}", i);
        }
        // Symmetric around the center
        for i in 0..FFT_POINTS / 2 {
            assert_eq!(HALF_SINE_WINDOW[i + 1], HALF_SINE_WINDOW[FFT_POINTS - 2 - i]);
        }
    }

    #[test]
    fn test_not_hann() {
        // Hann would be sin^2, i.e. 0.25 where the half sine is 0.5.
        // sin(pi * 10.5 / 63) = 0.5, so w[10] < 0.5 < w[11].
        assert!(HALF_SINE_WINDOW[10] < 0.5 && HALF_SINE_WINDOW[11] > 0.5);
        assert!(HALF_SINE_WINDOW[10] > 0.47);
    }
}
