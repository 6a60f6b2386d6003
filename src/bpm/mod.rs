//! Tempo detection based on subband energy periodicity.
//!
//! Each block of input samples goes through the following stages:
//! * [`SpectralExtractor`] computes the half sine windowed power spectrum.
//! * [`subband_energy`] folds the spectrum into [`SUBBAND_COUNT`](crate::config::SUBBAND_COUNT)
//!   equal width subbands, giving one energy sample per subband.
//! * Each [`Subband`] appends its sample to an energy buffer. When the buffer is full,
//!   the tempo candidate whose lag maximizes the buffer autocorrelation is recorded in a
//!   hit history. The subband commits once its history agrees on a tempo.
//! * [`consensus_bpm`] combines the committed subband tempos.
//!
//! [`BpmDetector`] owns all of the above for one session.

mod consensus;
mod detector;
mod sizing;
mod spectrum;
mod subband;

pub use consensus::consensus_bpm;
pub use detector::BpmDetector;
pub use sizing::{Sizing, FIRST_CANDIDATE, HISTORY_LEN, LAST_CANDIDATE};
pub use spectrum::{SpectralExtractor, POWER_BIN_COUNT};
pub use subband::{best_candidate, subband_energy, Step, Subband, SubbandState};
