use alloc::boxed::Box;

use crate::bpm::sizing::{Sizing, FIRST_CANDIDATE, HISTORY_LEN, LAST_CANDIDATE};
use crate::bpm::spectrum::POWER_BIN_COUNT;
use crate::common::{lag_correlation, try_boxed_slice, F32ArrayExt};
use crate::config::{HISTORY_HIT, MAX_BPM, MIN_BPM, SUBBAND_COUNT, SUBBAND_WIDTH};
use crate::error::Error;

/// Returns the instantaneous energy of a subband, i.e the mean power of its bins.
pub fn subband_energy(power: &[f32; POWER_BIN_COUNT], subband_index: usize) -> f32 {
    if subband_index >= SUBBAND_COUNT {
        panic!("Subband index {} out of range", subband_index)
    }
    let start = subband_index * SUBBAND_WIDTH;
    power[start..start + SUBBAND_WIDTH].mean()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubbandState {
    /// Collecting energy samples and estimating tempo.
    Accumulating,
    /// The tempo is final for the rest of the session.
    Committed { bpm: u32 },
}

/// The outcome of feeding one energy sample to a subband.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The buffer is not full yet.
    Accumulating,
    /// The best matching tempo was inside the valid range.
    Hit { bpm: u32 },
    /// The best matching tempo was in the margin zone.
    Miss { bpm: u32 },
    /// A hit that made the subband commit.
    Committed { bpm: u32 },
    /// The subband had already committed, the sample was ignored.
    Skipped,
}

/// Tempo estimation state for a single frequency subband.
pub struct Subband {
    state: SubbandState,
    /// Hit counts indexed by tempo in BPM.
    history: Box<[u32]>,
    /// Energy samples, one per block. Samples at `load..` are stale.
    buffer: Box<[f32]>,
    load: usize,
}

impl Subband {
    pub fn new(sizing: &Sizing) -> Result<Self, Error> {
        Ok(Subband {
            state: SubbandState::Accumulating,
            history: try_boxed_slice(HISTORY_LEN, 0)?,
            buffer: try_boxed_slice(sizing.capacity(), 0.)?,
            load: 0,
        })
    }

    /// Clears all state for a new track.
    pub fn reset(&mut self) {
        self.state = SubbandState::Accumulating;
        self.load = 0;
        for count in self.history.iter_mut() {
            *count = 0;
        }
        for value in self.buffer.iter_mut() {
            *value = 0.;
        }
    }

    pub fn state(&self) -> SubbandState {
        self.state
    }

    /// The committed tempo, if any.
    pub fn bpm(&self) -> Option<u32> {
        match self.state {
            SubbandState::Committed { bpm } => Some(bpm),
            SubbandState::Accumulating => None,
        }
    }

    /// The number of valid samples in the energy buffer.
    pub fn load(&self) -> usize {
        self.load
    }

    /// The valid part of the energy buffer.
    pub fn energy(&self) -> &[f32] {
        &self.buffer[..self.load]
    }

    /// The number of hits recorded for a given tempo.
    pub fn hit_count(&self, bpm: u32) -> u32 {
        self.history.get(bpm as usize).copied().unwrap_or(0)
    }

    /// Appends an energy sample and, if the buffer is full, estimates the tempo.
    pub fn push(&mut self, energy: f32, sizing: &Sizing) -> Step {
        if let SubbandState::Committed { .. } = self.state {
            return Step::Skipped;
        }

        self.buffer[self.load] = energy;
        self.load += 1;
        if self.load < sizing.capacity() {
            return Step::Accumulating;
        }

        let bpm = best_candidate(&self.buffer, sizing);
        if bpm >= MIN_BPM && bpm <= MAX_BPM {
            let step = self.record_hit(bpm);
            self.retain_tail(sizing.success_start(), sizing.success_tail());
            step
        } else {
            self.retain_tail(sizing.failure_start(), sizing.failure_tail());
            Step::Miss { bpm }
        }
    }

    fn record_hit(&mut self, bpm: u32) -> Step {
        let index = bpm as usize;
        let neighbours = &self.history[index - 1..=index + 1];
        let hits: u32 = neighbours.iter().sum();

        let mut step = Step::Hit { bpm };
        if hits != 0 && hits >= HISTORY_HIT {
            let weighted: u32 = neighbours
                .iter()
                .zip(bpm - 1..=bpm + 1)
                .map(|(count, candidate)| count * candidate)
                .sum();
            // Round to nearest
            let committed = (weighted + hits / 2) / hits;
            self.state = SubbandState::Committed { bpm: committed };
            step = Step::Committed { bpm: committed };
        }

        self.history[index] += 1;
        step
    }

    fn retain_tail(&mut self, start: usize, len: usize) {
        self.buffer.copy_within(start..start + len, 0);
        self.load = len;
    }
}

/// Finds the tempo candidate whose beat period lag gives the largest
/// correlation. Among equal scores the highest candidate wins.
pub fn best_candidate(buffer: &[f32], sizing: &Sizing) -> u32 {
    let window_length = sizing.window_length();
    let mut best_bpm = FIRST_CANDIDATE;
    let mut max_correlation: f32 = 0.;
    for bpm in FIRST_CANDIDATE..=LAST_CANDIDATE {
        let correlation = lag_correlation(buffer, sizing.lag(bpm), window_length);
        if correlation >= max_correlation {
            max_correlation = correlation;
            best_bpm = bpm;
        }
    }
    best_bpm
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    /// An energy envelope with a unit pulse every `period` samples.
    fn pulse_train(len: usize, period: usize, phase: usize) -> Vec<f32> {
        (0..len)
            .map(|i| if (i + phase) % period == 0 { 1.0 } else { 0.0 })
            .collect()
    }

    /// The candidate tempo with a lag closest to `period`, highest tempo on ties.
    fn bpm_for_period(sizing: &Sizing, period: usize) -> u32 {
        let mut best = FIRST_CANDIDATE;
        for bpm in FIRST_CANDIDATE..=LAST_CANDIDATE {
            let distance = (sizing.lag(bpm) as i64 - period as i64).abs();
            let best_distance = (sizing.lag(best) as i64 - period as i64).abs();
            if distance <= best_distance {
                best = bpm;
            }
        }
        best
    }

    #[test]
    fn test_subband_energy() {
        let mut power = [0.0_f32; POWER_BIN_COUNT];
        for (i, value) in power.iter_mut().enumerate() {
            *value = i as f32;
        }
        // Subband 0 is bins 0..4, mean 1.5
        assert_eq!(subband_energy(&power, 0), 1.5);
        // Subband 7 is bins 28..32, mean 29.5
        assert_eq!(subband_energy(&power, 7), 29.5);
    }

    #[test]
    fn test_accumulating() {
        let sizing = Sizing::new(44100).unwrap();
        let mut subband = Subband::new(&sizing).unwrap();
        for i in 0..sizing.capacity() - 1 {
            assert_eq!(subband.push(1.0, &sizing), Step::Accumulating);
            assert_eq!(subband.load(), i + 1);
        }
        assert_eq!(subband.state(), SubbandState::Accumulating);
    }

    #[test]
    fn test_silence_is_a_miss() {
        // All correlations are zero, so the last candidate, which is in the margin, wins.
        let sizing = Sizing::new(44100).unwrap();
        let buffer = vec![0.0_f32; sizing.capacity()];
        assert_eq!(best_candidate(&buffer, &sizing), LAST_CANDIDATE);

        let mut subband = Subband::new(&sizing).unwrap();
        let mut last_step = Step::Accumulating;
        for _ in 0..sizing.capacity() {
            last_step = subband.push(0.0, &sizing);
        }
        assert_eq!(last_step, Step::Miss { bpm: LAST_CANDIDATE });
        assert_eq!(subband.load(), sizing.failure_tail());
        assert!((FIRST_CANDIDATE..=LAST_CANDIDATE).all(|bpm| subband.hit_count(bpm) == 0));
    }

    #[test]
    fn test_tie_break_picks_last_candidate() {
        let sizing = Sizing::new(44100).unwrap();
        // Lags of 120 and 121 BPM differ. Put one pulse pair at each lag so both
        // candidates score exactly 1.0 and every other candidate scores 0.
        let lag_120 = sizing.lag(120);
        let lag_121 = sizing.lag(121);
        assert!(lag_120 != lag_121);
        let mut buffer = vec![0.0_f32; sizing.capacity()];
        buffer[0] = 1.0;
        buffer[lag_120] = 1.0;
        buffer[lag_121] = 1.0;
        // Correlation at lag_120 is buffer[0] * buffer[lag_120] = 1, same for lag_121.
        let score_120 = lag_correlation(&buffer, lag_120, sizing.window_length());
        let score_121 = lag_correlation(&buffer, lag_121, sizing.window_length());
        assert_eq!(score_120, score_121);
        let best = best_candidate(&buffer, &sizing);
        // Every candidate whose lag is lag_120 or lag_121 ties, the highest one wins.
        let highest_tied = (FIRST_CANDIDATE..=LAST_CANDIDATE)
            .filter(|bpm| {
                let lag = sizing.lag(*bpm);
                lag_correlation(&buffer, lag, sizing.window_length()) == score_120
            })
            .max()
            .unwrap();
        assert_eq!(best, highest_tied);
        assert!(best >= 121);
    }

    #[test]
    fn test_pulse_train_best_candidate() {
        let sizing = Sizing::new(44100).unwrap();
        // Pulses spaced lag(120) blocks apart only correlate at that lag.
        let period = sizing.lag(120);
        let buffer = pulse_train(sizing.capacity(), period, 0);
        let best = best_candidate(&buffer, &sizing);
        assert_eq!(best, bpm_for_period(&sizing, period));
        assert!((best as i64 - 120).abs() <= 1);
    }

    #[test]
    fn test_commit_after_history_hits() {
        let sizing = Sizing::new(44100).unwrap();
        let period = sizing.lag(100);
        let expected = bpm_for_period(&sizing, period);
        let mut subband = Subband::new(&sizing).unwrap();

        let mut hits = 0;
        let mut committed = None;
        for i in 0..100 * sizing.capacity() {
            let energy = if i % period == 0 { 1.0 } else { 0.0 };
            match subband.push(energy, &sizing) {
                Step::Hit { .. } => hits += 1,
                Step::Committed { bpm } => {
                    committed = Some(bpm);
                    break;
                }
                _ => {}
            }
        }

        // Five hits in history are needed before the next hit commits.
        assert!(hits >= HISTORY_HIT as usize);
        let bpm = committed.unwrap();
        assert!((bpm as i64 - expected as i64).abs() <= 1);
        assert_eq!(subband.bpm(), Some(bpm));
        assert_eq!(subband.load(), sizing.success_tail());
    }

    #[test]
    fn test_committed_subband_is_frozen() {
        let sizing = Sizing::new(44100).unwrap();
        let period = sizing.lag(150);
        let mut subband = Subband::new(&sizing).unwrap();
        let mut i = 0;
        while subband.bpm().is_none() {
            let energy = if i % period == 0 { 1.0 } else { 0.0 };
            subband.push(energy, &sizing);
            i += 1;
            assert!(i < 1000 * sizing.capacity());
        }

        let bpm = subband.bpm();
        let energy: Vec<f32> = subband.energy().to_vec();
        let load = subband.load();
        for j in 0..10 * sizing.capacity() {
            assert_eq!(subband.push(j as f32, &sizing), Step::Skipped);
        }
        assert_eq!(subband.bpm(), bpm);
        assert_eq!(subband.load(), load);
        assert_eq!(subband.energy(), &energy[..]);
    }

    #[test]
    fn test_weighted_commit_rounds_to_nearest() {
        let sizing = Sizing::new(44100).unwrap();
        let mut subband = Subband::new(&sizing).unwrap();
        // History: 119 x1, 120 x2, 121 x2 = 5 hits, weighted mean 120.2
        subband.history[119] = 1;
        subband.history[120] = 2;
        subband.history[121] = 2;
        assert_eq!(subband.record_hit(120), Step::Committed { bpm: 120 });
        assert_eq!(subband.hit_count(120), 3);

        // 119 x0, 120 x2, 121 x3: weighted mean 120.6, rounds up
        let mut subband = Subband::new(&sizing).unwrap();
        subband.history[120] = 2;
        subband.history[121] = 3;
        assert_eq!(subband.record_hit(120), Step::Committed { bpm: 121 });
    }

    #[test]
    fn test_hit_below_threshold() {
        let sizing = Sizing::new(44100).unwrap();
        let mut subband = Subband::new(&sizing).unwrap();
        subband.history[89] = 2;
        subband.history[90] = 2;
        // Four neighbouring hits do not commit, the current one is only counted afterwards.
        assert_eq!(subband.record_hit(90), Step::Hit { bpm: 90 });
        assert_eq!(subband.hit_count(90), 3);
        assert_eq!(subband.record_hit(90), Step::Committed { bpm: 90 });
    }

    #[test]
    fn test_reset() {
        let sizing = Sizing::new(44100).unwrap();
        let mut subband = Subband::new(&sizing).unwrap();
        subband.history[100] = 7;
        subband.state = SubbandState::Committed { bpm: 100 };
        subband.load = 12;
        subband.reset();
        assert_eq!(subband.state(), SubbandState::Accumulating);
        assert_eq!(subband.load(), 0);
        assert_eq!(subband.hit_count(100), 0);
    }
}
