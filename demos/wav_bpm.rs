//! Detects the tempo of a 16 bit mono or stereo WAV file.
//!
//! `cargo run --example wav_bpm -- path/to/file.wav`
//!
//! Set `RUST_LOG=debug` to see subband commits.

use anyhow::{bail, Context};
use log::info;
use micro_bpm::bpm::BpmDetector;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => bail!("Usage: wav_bpm <file.wav>"),
    };

    let mut reader =
        hound::WavReader::open(&path).with_context(|| format!("Failed to open {}", path))?;
    let spec = reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        bail!("Only 16 bit integer WAV files are supported");
    }
    info!(
        "{}: {} Hz, {} channel(s), {} frames",
        path,
        spec.sample_rate,
        spec.channels,
        reader.duration()
    );

    let mut detector = BpmDetector::new();
    detector.init(spec.sample_rate, spec.channels as u32)?;

    let block_len = (detector.block_size() * spec.channels as u32) as usize;
    let mut block: Vec<i16> = Vec::with_capacity(block_len);
    let mut block_count = 0;
    let mut is_complete = false;
    for sample in reader.samples::<i16>() {
        block.push(sample?);
        if block.len() == block_len {
            block_count += 1;
            if detector.push_block(&block) {
                is_complete = true;
                break;
            }
            block.clear();
        }
    }

    let seconds = (block_count * detector.block_size() as usize) as f32 / spec.sample_rate as f32;
    if is_complete {
        println!("{} BPM (detected after {:.1} s)", detector.result(), seconds);
    } else {
        let bpm = detector.result();
        if bpm == 0 {
            println!("No tempo found in {:.1} s of audio", seconds);
        } else {
            println!(
                "{} BPM (partial, {}/{} subbands)",
                bpm,
                detector.committed_count(),
                detector.active_band().len()
            );
        }
    }

    Ok(())
}
