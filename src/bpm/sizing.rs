use alloc::boxed::Box;

use crate::common::try_boxed_slice;
use crate::config::{
    BUFFER_MS, FAILURE_RETENTION_MS, FFT_POINTS, LAG_FACTOR, MAX_BPM, MAX_MARGIN, MIN_BPM,
    MIN_MARGIN, SUCCESS_RETENTION_MS, WINDOW_MS,
};
use crate::error::Error;

/// The lowest tempo candidate evaluated by the correlation search.
pub const FIRST_CANDIDATE: u32 = MIN_BPM - MIN_MARGIN - 1;

/// The highest tempo candidate evaluated by the correlation search.
pub const LAST_CANDIDATE: u32 = MAX_BPM + MAX_MARGIN;

/// The highest tempo covered by the lag table.
const LAST_TABULATED: u32 = MAX_BPM + MAX_MARGIN + 1;

/// The length of a per subband hit history, indexed by tempo.
pub const HISTORY_LEN: usize = (MAX_BPM + MAX_MARGIN + 1) as usize;

/// Converts a duration in milliseconds to a number of analysis blocks.
fn ms_to_blocks(sample_rate: u32, ms: u32) -> usize {
    ((sample_rate as u64 * ms as u64) / (1000 * FFT_POINTS as u64)) as usize
}

/// Buffer sizes and tempo lags derived from the sample rate. All sizes are
/// in energy samples, i.e analysis blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Sizing {
    capacity: usize,
    window_length: usize,
    success_tail: usize,
    failure_tail: usize,
    // Lags for FIRST_CANDIDATE..=LAST_TABULATED
    lags: Box<[usize]>,
}

impl Sizing {
    pub fn new(sample_rate: u32) -> Result<Self, Error> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }

        let capacity = ms_to_blocks(sample_rate, BUFFER_MS).max(1);
        let window_length = ms_to_blocks(sample_rate, WINDOW_MS).max(1);
        // Never retain the full buffer, there must be room for new samples.
        let success_tail = ms_to_blocks(sample_rate, SUCCESS_RETENTION_MS).min(capacity - 1);
        let failure_tail = ms_to_blocks(sample_rate, FAILURE_RETENTION_MS).min(capacity - 1);

        let lag_count = (LAST_TABULATED - FIRST_CANDIDATE + 1) as usize;
        let mut lags = try_boxed_slice(lag_count, 0_usize)?;
        for (lag, bpm) in lags.iter_mut().zip(FIRST_CANDIDATE..=LAST_TABULATED) {
            let exact = (LAG_FACTOR as f64 * sample_rate as f64) / ((bpm as usize * FFT_POINTS) as f64);
            *lag = (exact + 0.5) as usize;
        }

        let max_lag = lags.iter().copied().max().unwrap_or(0);
        if window_length + max_lag > capacity {
            return Err(Error::SampleRateTooLow(sample_rate));
        }

        Ok(Sizing {
            capacity,
            window_length,
            success_tail,
            failure_tail,
            lags,
        })
    }

    /// The number of energy samples a subband buffer holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of products summed per correlation.
    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// The number of samples kept after an estimate inside the valid tempo range.
    pub fn success_tail(&self) -> usize {
        self.success_tail
    }

    /// The number of samples kept after an estimate in the margin zone.
    pub fn failure_tail(&self) -> usize {
        self.failure_tail
    }

    /// The buffer index of the first retained sample after a hit.
    pub fn success_start(&self) -> usize {
        self.capacity - self.success_tail
    }

    /// The buffer index of the first retained sample after a miss.
    pub fn failure_start(&self) -> usize {
        self.capacity - self.failure_tail
    }

    /// The lag, in energy samples, of one beat period at a given tempo.
    ///
    /// # Panics
    /// If `bpm` is outside the tabulated candidate range.
    pub fn lag(&self, bpm: u32) -> usize {
        if bpm < FIRST_CANDIDATE || bpm > LAST_TABULATED {
            panic!("No lag tabulated for {} BPM", bpm)
        }
        self.lags[(bpm - FIRST_CANDIDATE) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_44100() {
        let sizing = Sizing::new(44100).unwrap();
        // 44100 * 1000 / 64000 = 689.06
        assert_eq!(sizing.capacity(), 689);
        // 44100 * 500 / 64000 = 344.53
        assert_eq!(sizing.window_length(), 344);
        assert_eq!(sizing.success_tail(), 344);
        assert_eq!(sizing.success_start(), 345);
        // 44100 * 875 / 64000 = 602.9
        assert_eq!(sizing.failure_tail(), 602);
        assert_eq!(sizing.failure_start(), 87);
    }

    #[test]
    fn test_lag_table() {
        let sizing = Sizing::new(44100).unwrap();
        // round(26 * 44100 / (120 * 64)) = round(149.297)
        assert_eq!(sizing.lag(120), 149);
        // round(26 * 44100 / (53 * 64)) = round(338.03)
        assert_eq!(sizing.lag(FIRST_CANDIDATE), 338);
        // round(26 * 44100 / (202 * 64)) = round(88.69)
        assert_eq!(sizing.lag(202), 89);
        // Lags decrease with tempo
        for bpm in FIRST_CANDIDATE..LAST_CANDIDATE {
            assert!(sizing.lag(bpm) >= sizing.lag(bpm + 1));
        }
        // The longest lag fits in the buffer
        assert!(sizing.window_length() + sizing.lag(FIRST_CANDIDATE) <= sizing.capacity());
    }

    #[test]
    fn test_candidate_range() {
        assert_eq!(FIRST_CANDIDATE, 53);
        assert_eq!(LAST_CANDIDATE, 201);
        assert_eq!(HISTORY_LEN, 202);
    }

    #[test]
    fn test_tails_are_clamped() {
        // At 64 Hz the buffer holds a single sample, which must never be retained.
        let sizing = Sizing::new(64);
        match sizing {
            Ok(sizing) => {
                assert!(sizing.success_tail() < sizing.capacity());
                assert!(sizing.failure_tail() < sizing.capacity());
            }
            Err(error) => assert_eq!(error, Error::SampleRateTooLow(64)),
        }
        for sample_rate in [8000, 22050, 32000, 48000, 96000].iter() {
            let sizing = Sizing::new(*sample_rate).unwrap();
            assert!(sizing.success_tail() < sizing.capacity());
            assert!(sizing.failure_tail() < sizing.capacity());
            assert!(sizing.success_tail() <= sizing.failure_tail());
        }
    }

    #[test]
    fn test_zero_sample_rate() {
        assert_eq!(Sizing::new(0), Err(Error::InvalidSampleRate(0)));
    }

    #[test]
    #[should_panic]
    fn test_lag_out_of_range() {
        let sizing = Sizing::new(44100).unwrap();
        sizing.lag(MAX_BPM + MAX_MARGIN + 2);
    }
}
