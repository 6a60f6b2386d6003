use crate::common::{transform, Complex32, Direction, HALF_SINE_WINDOW};
use crate::config::FFT_POINTS;

/// The number of usable power spectrum bins per block.
pub const POWER_BIN_COUNT: usize = FFT_POINTS / 2;

/// Computes the windowed power spectrum of one block of 16 bit PCM samples.
pub struct SpectralExtractor {
    fft_buffer: [Complex32; FFT_POINTS],
    power: [f32; POWER_BIN_COUNT],
}

impl SpectralExtractor {
    pub fn new() -> Self {
        SpectralExtractor {
            fft_buffer: [Complex32::new(0., 0.); FFT_POINTS],
            power: [0.; POWER_BIN_COUNT],
        }
    }

    /// The most recently computed power spectrum. Index `i` holds
    /// the power of bin `i + 1`, the DC bin is dropped.
    pub fn power_spectrum(&self) -> &[f32; POWER_BIN_COUNT] {
        &self.power
    }

    /// Processes one block of `FFT_POINTS` frames with `channels` interleaved
    /// channels and returns its power spectrum. Stereo input is mixed to mono.
    ///
    /// # Panics
    /// If `channels` is not 1 or 2 or if the block length is not `FFT_POINTS * channels`.
    pub fn process_block(&mut self, samples: &[i16], channels: usize) -> &[f32; POWER_BIN_COUNT] {
        if channels != 1 && channels != 2 {
            panic!("Unsupported channel count {}", channels)
        }
        if samples.len() != FFT_POINTS * channels {
            panic!(
                "Got block of {} samples, expected {}",
                samples.len(),
                FFT_POINTS * channels
            )
        }

        let frames = samples.chunks_exact(channels);
        for ((value, frame), w) in self.fft_buffer.iter_mut().zip(frames).zip(HALF_SINE_WINDOW.iter()) {
            let sample = if channels == 2 {
                (frame[0] as f32 + frame[1] as f32) * w / 2.0
            } else {
                frame[0] as f32 * w
            };
            *value = Complex32::new(sample, 0.);
        }

        transform(&mut self.fft_buffer, Direction::Forward);

        // |X|^2 / N equals (|X| / sqrt(N))^2
        let scale = 1.0 / (FFT_POINTS as f32);
        for (power, z) in self.power.iter_mut().zip(self.fft_buffer[1..POWER_BIN_COUNT].iter()) {
            *power = z.norm_sqr() * scale;
        }
        // The Nyquist bin is real valued for real input, ignore rounding noise in its
        // imaginary part.
        let nyquist = self.fft_buffer[POWER_BIN_COUNT].re;
        self.power[POWER_BIN_COUNT - 1] = nyquist * nyquist * scale;

        &self.power
    }
}

impl Default for SpectralExtractor {
    fn default() -> Self {
        SpectralExtractor::new()
    }
}
