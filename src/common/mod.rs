//! Common algorithms and utilities.

mod autocorr;
mod buffer;
mod f32_array_ext;
mod fft;
mod window_function;

pub use autocorr::lag_correlation;
pub use buffer::try_boxed_slice;
pub use f32_array_ext::F32ArrayExt;
pub use fft::{transform, Complex32, Direction};
pub use window_function::HALF_SINE_WINDOW;
