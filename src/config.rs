//! Detector configuration and tuning constants.
//!
//! The tuning constants were determined empirically. Changing them changes
//! which tempo gets detected, not just how fast.

use crate::error::Error;

/// The number of sample frames per analysis block, which is also the FFT size.
pub const FFT_POINTS: usize = 64;

/// The number of frequency subbands the power spectrum is divided into.
pub const SUBBAND_COUNT: usize = 8;

/// The number of power spectrum bins per subband.
pub const SUBBAND_WIDTH: usize = FFT_POINTS / (2 * SUBBAND_COUNT);

/// The duration of a subband energy buffer in milliseconds.
pub const BUFFER_MS: u32 = 1000;

/// The duration of the correlation window in milliseconds.
pub const WINDOW_MS: u32 = 500;

/// The duration of buffer history to keep after an estimate inside the valid tempo range.
pub const SUCCESS_RETENTION_MS: u32 = 500;

/// The duration of buffer history to keep after an estimate in the margin zone.
pub const FAILURE_RETENTION_MS: u32 = 875;

/// The number of neighbouring history hits needed to commit a subband tempo.
pub const HISTORY_HIT: u32 = 5;

/// Extra tempo candidates searched below [`MIN_BPM`].
pub const MIN_MARGIN: u32 = 1;

/// Extra tempo candidates searched above [`MAX_BPM`].
pub const MAX_MARGIN: u32 = 1;

/// The lowest detectable tempo.
pub const MIN_BPM: u32 = 55;

/// The highest detectable tempo.
pub const MAX_BPM: u32 = 200;

/// Scales `sample_rate / (bpm * FFT_POINTS)` to a lag in energy samples.
/// Equals `(BUFFER_MS - WINDOW_MS) / 1000 * (MIN_BPM - MIN_MARGIN - 1)`, rounded.
pub const LAG_FACTOR: u32 = 26;

/// A frequency range in Hz, `[low_hz, high_hz)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyBand {
    pub low_hz: u32,
    pub high_hz: u32,
}

impl FrequencyBand {
    pub fn new(low_hz: u32, high_hz: u32) -> Self {
        FrequencyBand { low_hz, high_hz }
    }
}

/// Parameters of a detection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// The audio sample rate in Hz.
    pub sample_rate: u32,
    /// The number of interleaved channels, 1 or 2. Stereo input is mixed to mono.
    pub channels: u32,
    /// The frequency band to analyze. `None` analyzes all subbands.
    pub band: Option<FrequencyBand>,
}

impl DetectorConfig {
    pub fn new(sample_rate: u32, channels: u32) -> Self {
        DetectorConfig {
            sample_rate,
            channels,
            band: None,
        }
    }

    pub fn with_band(mut self, low_hz: u32, high_hz: u32) -> Self {
        self.band = Some(FrequencyBand::new(low_hz, high_hz));
        self
    }

    /// Checks the sample rate and channel count.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.channels != 1 && self.channels != 2 {
            return Err(Error::InvalidChannelCount(self.channels));
        }
        Ok(())
    }

    /// The number of interleaved samples in one block.
    pub fn samples_per_block(&self) -> usize {
        FFT_POINTS * self.channels as usize
    }
}
