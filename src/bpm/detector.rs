use alloc::vec::Vec;
use core::ops::Range;

use log::{debug, trace, warn};

use crate::bpm::consensus::consensus_bpm;
use crate::bpm::sizing::Sizing;
use crate::bpm::spectrum::SpectralExtractor;
use crate::bpm::subband::{subband_energy, Step, Subband};
use crate::config::{DetectorConfig, FrequencyBand, FFT_POINTS, SUBBAND_COUNT};
use crate::error::Error;

/// Buffers and state of an initialized session.
struct Session {
    config: DetectorConfig,
    sizing: Sizing,
    spectrum: SpectralExtractor,
    subbands: Vec<Subband>,
    committed_count: usize,
    completion_signalled: bool,
}

impl Session {
    fn new(config: DetectorConfig, sizing: Sizing) -> Result<Self, Error> {
        let mut subbands = Vec::new();
        subbands.try_reserve_exact(SUBBAND_COUNT)?;
        for _ in 0..SUBBAND_COUNT {
            subbands.push(Subband::new(&sizing)?);
        }
        Ok(Session {
            config,
            sizing,
            spectrum: SpectralExtractor::new(),
            subbands,
            committed_count: 0,
            completion_signalled: false,
        })
    }

    fn reset(&mut self) {
        for subband in self.subbands.iter_mut() {
            subband.reset();
        }
        self.committed_count = 0;
        self.completion_signalled = false;
    }

    /// The number of committed subbands in a range of subband indices.
    fn committed_in(&self, band: &Range<usize>) -> usize {
        self.subbands[band.clone()]
            .iter()
            .filter(|subband| subband.bpm().is_some())
            .count()
    }
}

/// Computes the subband index range `[low, high)` covered by a frequency band.
fn band_indices(sample_rate: u32, band: Option<FrequencyBand>) -> Range<usize> {
    match band {
        None => 0..SUBBAND_COUNT,
        Some(band) => {
            let subband_hz = sample_rate as f64 / (SUBBAND_COUNT * 2) as f64;
            let high = ((band.high_hz as f64 / subband_hz) as usize).min(SUBBAND_COUNT);
            let low = ((band.low_hz as f64 / subband_hz) as usize).min(high);
            low..high
        }
    }
}

/// Detects the tempo of a stream of 16 bit PCM blocks.
///
/// * Call [`init`](BpmDetector::init) before each new track.
/// * Feed blocks of [`block_size`](BpmDetector::block_size) frames using
///   [`push_block`](BpmDetector::push_block) until it returns true or the track ends.
/// * Get the tempo using [`result`](BpmDetector::result).
///
/// A detector holds the state of exactly one session. Use separate instances
/// to analyze several tracks concurrently.
pub struct BpmDetector {
    session: Option<Session>,
    band: Option<FrequencyBand>,
    active: Range<usize>,
}

impl BpmDetector {
    /// Creates an uninitialized detector.
    pub fn new() -> Self {
        BpmDetector {
            session: None,
            band: None,
            active: 0..SUBBAND_COUNT,
        }
    }

    /// Creates a detector and initializes a session from a given configuration.
    pub fn with_config(config: &DetectorConfig) -> Result<Self, Error> {
        let mut detector = BpmDetector::new();
        detector.band = config.band;
        detector.init(config.sample_rate, config.channels)?;
        Ok(detector)
    }

    /// Starts a new session. Buffers are reused if the sample rate and channel
    /// count are the same as for the previous session, otherwise they are
    /// reallocated. All tempo state is reset in both cases.
    ///
    /// If the configuration is rejected, including sample rates too low to hold
    /// one correlation window, the current session is untouched. If allocation
    /// fails, the detector is left uninitialized.
    pub fn init(&mut self, sample_rate: u32, channels: u32) -> Result<(), Error> {
        let config = DetectorConfig {
            sample_rate,
            channels,
            band: self.band,
        };
        config.validate()?;

        let is_same_format = match self.session.as_ref() {
            Some(session) => {
                session.config.sample_rate == sample_rate && session.config.channels == channels
            }
            None => false,
        };

        if let (true, Some(session)) = (is_same_format, self.session.as_mut()) {
            debug!("Reusing buffers for {} Hz, {} channel(s)", sample_rate, channels);
            session.config = config;
            session.reset();
        } else {
            let sizing = Sizing::new(sample_rate)?;
            // Free the previous buffers before allocating new ones.
            self.session = None;
            let session = Session::new(config, sizing)?;
            debug!(
                "Allocated buffers for {} Hz, {} channel(s): capacity {}, window {}, tails {}/{}",
                sample_rate,
                channels,
                session.sizing.capacity(),
                session.sizing.window_length(),
                session.sizing.success_tail(),
                session.sizing.failure_tail()
            );
            self.session = Some(session);
        }

        self.active = band_indices(sample_rate, self.band);
        Ok(())
    }

    /// Sets the frequency band to analyze. The band is mapped to subbands using the
    /// sample rate of the current session, or of the next one if the detector is
    /// not initialized. Only subbands inside the band take part in detection.
    pub fn set_frequency_band(&mut self, low_hz: u32, high_hz: u32) {
        let band = FrequencyBand::new(low_hz, high_hz);
        self.band = Some(band);
        if let Some(session) = self.session.as_mut() {
            session.config.band = Some(band);
            session.completion_signalled = false;
            self.active = band_indices(session.config.sample_rate, Some(band));
            debug!(
                "Frequency band {}-{} Hz covers subbands {:?}",
                low_hz, high_hz, self.active
            );
        }
    }

    /// The number of sample frames expected by [`push_block`](BpmDetector::push_block).
    pub fn block_size(&self) -> u32 {
        FFT_POINTS as u32
    }

    /// Processes a block of [`block_size`](BpmDetector::block_size) frames of
    /// interleaved samples. Returns true on the first push after which all active
    /// subbands have committed to a tempo, which is the first push if the active
    /// band is empty. Further blocks are ignored by committed subbands and there
    /// is no need to push more. Changing the frequency band rearms the signal.
    ///
    /// Returns false without processing if the detector is not initialized.
    ///
    /// # Panics
    /// If the number of samples is not `block_size() * channels`.
    pub fn push_block(&mut self, samples: &[i16]) -> bool {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                warn!("Pushed a block to an uninitialized detector");
                return false;
            }
        };

        let expected_len = session.config.samples_per_block();
        if samples.len() != expected_len {
            panic!(
                "Got block of {} samples, expected {}",
                samples.len(),
                expected_len
            )
        }

        let width = self.active.len();

        let power = session
            .spectrum
            .process_block(samples, session.config.channels as usize);
        for index in self.active.clone() {
            let subband = &mut session.subbands[index];
            if subband.bpm().is_some() {
                continue;
            }
            match subband.push(subband_energy(power, index), &session.sizing) {
                Step::Committed { bpm } => {
                    session.committed_count += 1;
                    debug!(
                        "Subband {} committed to {} BPM ({}/{})",
                        index, bpm, session.committed_count, width
                    );
                }
                Step::Hit { bpm } => trace!("Subband {} hit {} BPM", index, bpm),
                Step::Miss { bpm } => trace!("Subband {} missed at {} BPM", index, bpm),
                Step::Accumulating | Step::Skipped => {}
            }
        }

        let is_complete = session.committed_in(&self.active) == width;
        if !is_complete || session.completion_signalled {
            return false;
        }
        session.completion_signalled = true;
        debug!("Detection complete");
        true
    }

    /// Returns the consensus tempo of the committed subbands, or 0 if no subband
    /// has committed. May be called before detection is complete.
    pub fn result(&self) -> u32 {
        match self.session.as_ref() {
            Some(session) => {
                let mut bpms = [0_u32; SUBBAND_COUNT];
                for (bpm, subband) in bpms.iter_mut().zip(session.subbands[self.active.clone()].iter()) {
                    *bpm = subband.bpm().unwrap_or(0);
                }
                consensus_bpm(&bpms[..self.active.len()])
            }
            None => 0,
        }
    }

    /// Frees all buffers. The detector must be initialized again before use.
    pub fn release(&mut self) {
        self.session = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Returns true if all active subbands have committed.
    pub fn is_complete(&self) -> bool {
        match self.session.as_ref() {
            Some(session) => session.committed_in(&self.active) == self.active.len(),
            None => false,
        }
    }

    /// The configuration of the current session.
    pub fn config(&self) -> Option<&DetectorConfig> {
        self.session.as_ref().map(|session| &session.config)
    }

    /// The range of subband indices taking part in detection.
    pub fn active_band(&self) -> Range<usize> {
        self.active.clone()
    }

    /// The number of subbands that have committed to a tempo during the current session.
    pub fn committed_count(&self) -> usize {
        self.session
            .as_ref()
            .map(|session| session.committed_count)
            .unwrap_or(0)
    }

    /// The committed tempo of each active subband, in subband order.
    pub fn subband_bpms(&self) -> Vec<Option<u32>> {
        match self.session.as_ref() {
            Some(session) => session.subbands[self.active.clone()]
                .iter()
                .map(|subband| subband.bpm())
                .collect(),
            None => Vec::new(),
        }
    }
}

impl Default for BpmDetector {
    fn default() -> Self {
        BpmDetector::new()
    }
}
