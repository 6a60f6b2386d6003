//! Errors returned when setting up a detection session.

use alloc::collections::TryReserveError;
use thiserror::Error;

/// Errors that can occur when initializing a [`BpmDetector`](crate::bpm::BpmDetector).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The sample rate was zero.
    #[error("invalid sample rate {0} Hz, must be greater than 0")]
    InvalidSampleRate(u32),
    /// Only mono and interleaved stereo input is supported.
    #[error("invalid channel count {0}, must be 1 or 2")]
    InvalidChannelCount(u32),
    /// The sample rate is too low for the longest lag to fit in the energy buffer.
    #[error("sample rate {0} Hz is too low for tempo detection")]
    SampleRateTooLow(u32),
    /// A detector buffer could not be allocated.
    #[error("failed to allocate detector buffers: {0}")]
    Allocation(TryReserveError),
}

impl From<TryReserveError> for Error {
    fn from(error: TryReserveError) -> Self {
        Error::Allocation(error)
    }
}
