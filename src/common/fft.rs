use core::convert::TryInto;
use core::mem::swap;

pub use microfft::Complex32;

/// The direction of a [`transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The unnormalized forward DFT.
    Forward,
    /// The inverse DFT, scaled by `1 / N`.
    Inverse,
}

/// Performs an in-place complex FFT on a given buffer.
///
/// The buffer length must be a power of two between 8 and 4096. The forward
/// transform is not normalized.
pub fn transform(buffer: &mut [Complex32], direction: Direction) {
    match direction {
        Direction::Forward => complex_fft_in_place(buffer),
        Direction::Inverse => {
            // ifft(x) = swap(fft(swap(x))) / N, where swap exchanges re and im.
            for value in buffer.iter_mut() {
                swap(&mut value.re, &mut value.im);
            }
            complex_fft_in_place(buffer);
            let scale = 1.0 / (buffer.len() as f32);
            for value in buffer.iter_mut() {
                swap(&mut value.re, &mut value.im);
                value.re *= scale;
                value.im *= scale;
            }
        }
    }
}

fn complex_fft_in_place(buffer: &mut [Complex32]) {
    let fft_size = buffer.len();
    match fft_size {
        8 => {
            let _ = microfft::complex::cfft_8(buffer.try_into().unwrap());
        }
        16 => {
            let _ = microfft::complex::cfft_16(buffer.try_into().unwrap());
        }
        32 => {
            let _ = microfft::complex::cfft_32(buffer.try_into().unwrap());
        }
        64 => {
            let _ = microfft::complex::cfft_64(buffer.try_into().unwrap());
        }
        128 => {
            let _ = microfft::complex::cfft_128(buffer.try_into().unwrap());
        }
        256 => {
            let _ = microfft::complex::cfft_256(buffer.try_into().unwrap());
        }
        512 => {
            let _ = microfft::complex::cfft_512(buffer.try_into().unwrap());
        }
        1024 => {
            let _ = microfft::complex::cfft_1024(buffer.try_into().unwrap());
        }
        2048 => {
            let _ = microfft::complex::cfft_2048(buffer.try_into().unwrap());
        }
        4096 => {
            let _ = microfft::complex::cfft_4096(buffer.try_into().unwrap());
        }
        _ => panic!("Unsupported fft size {}", fft_size),
    }
}
