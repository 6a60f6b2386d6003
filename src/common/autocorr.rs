/// Computes a single lag of the [autocorrelation](https://en.wikipedia.org/wiki/Autocorrelation)
/// of a buffer over a window of fixed length, i.e
/// `sum(buffer[k] * buffer[k + lag])` for `k` in `0..window_length`.
///
/// # Arguments
///
/// * `buffer` - Input buffer. Must hold at least `window_length + lag` values.
/// * `lag` - The offset between the correlated samples.
/// * `window_length` - The number of products to sum.
pub fn lag_correlation(buffer: &[f32], lag: usize, window_length: usize) -> f32 {
    if window_length + lag > buffer.len() {
        panic!(
            "Lag {} with window length {} exceeds buffer of length {}",
            lag,
            window_length,
            buffer.len()
        )
    }

    let window = &buffer[..window_length];
    let lagged = &buffer[lag..lag + window_length];
    let mut sum: f32 = 0.0;
    for (x, x_lagged) in window.iter().zip(lagged.iter()) {
        sum += x * x_lagged;
    }
    sum
}
