//! A block based [tempo](https://en.wikipedia.org/wiki/Tempo) (BPM) detector for streamed,
//! decoded audio.
//!
//! The detector splits the short time power spectrum of each incoming block into
//! a number of frequency subbands. Every subband accumulates an energy envelope, and the
//! periodicity that best explains that envelope is found by correlating it with lagged
//! copies of itself. A subband commits to a tempo once enough consecutive estimates agree,
//! and the final BPM is a consensus between the committed subbands.
//!
//! * `no_std` compatible. Buffers are allocated once, when a session is initialized.
//! * Input is fed in fixed size blocks of interleaved 16 bit PCM, so the whole
//!   track never needs to be buffered.
//!
//! # Examples
//!
//! ```
//! use micro_bpm::bpm::BpmDetector;
//!
//! let sample_rate = 44100;
//! let mut detector = BpmDetector::new();
//! detector.init(sample_rate, 1).unwrap();
//!
//! // A click track with short tone bursts every 149 blocks.
//! let block_size = detector.block_size() as usize;
//! let click_distance = 149 * block_size;
//! let mut block = vec![0_i16; block_size];
//! let mut sample_index = 0;
//! for _ in 0..10000 {
//!     for sample in block.iter_mut() {
//!         let is_click = sample_index % click_distance < block_size;
//!         *sample = if is_click && sample_index % 8 < 4 { 12000 } else { 0 };
//!         sample_index += 1;
//!     }
//!     if detector.push_block(&block) {
//!         break;
//!     }
//! }
//!
//! // The result is 0 if no subband committed to a tempo.
//! let bpm = detector.result();
//! assert!(bpm == 0 || (55..=200).contains(&bpm));
//! ```
#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod bpm;
pub mod common;
pub mod config;
pub mod error;

pub use error::Error;
