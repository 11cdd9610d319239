//! WAV file input and output.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Mono audio decoded from a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoAudio {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
    /// Channel count of the source file before downmixing.
    pub channels: u16,
}

impl MonoAudio {
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Reads a WAV file, averaging all channels to mono.
pub fn read_mono(path: &Path) -> Result<MonoAudio> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let header = reader.spec();
    if header.channels == 0 {
        bail!("WAV file has no channels: {}", path.display());
    }

    let interleaved: Vec<f64> = match header.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (header.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<Result<_, _>>()
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>(),
    }
    .with_context(|| format!("Failed to decode WAV samples: {}", path.display()))?;

    Ok(MonoAudio {
        samples: downmix(&interleaved, header.channels),
        sample_rate: header.sample_rate,
        channels: header.channels,
    })
}

/// Averages interleaved frames of `channels` samples. A trailing partial
/// frame is dropped.
pub fn downmix(interleaved: &[f64], channels: u16) -> Vec<f64> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect()
}

/// Writes mono 32-bit float samples.
pub fn write_mono(path: &Path, samples: &[f64], sample_rate: u32) -> Result<()> {
    let header = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, header)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(sample as f32)?;
    }
    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;
    Ok(())
}
