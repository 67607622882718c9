#![allow(dead_code)]

use deafield::model::SampleBuffer;
use std::fs;
use std::path::{Path, PathBuf};

pub const RATE: u32 = 44100;

/// Write a 16-bit PCM WAV file
pub fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
    let data_len = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let byte_rate = sample_rate * block_align as u32;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }

    fs::write(path, bytes).expect("Failed to write WAV fixture");
}

/// Mono WAV: `first` for the first half, `second` for the rest
pub fn write_step_wav(dir: &Path, name: &str, seconds: u32, first: i16, second: i16) -> PathBuf {
    let total = (RATE * seconds) as usize;
    let samples: Vec<i16> = (0..total)
        .map(|i| if i < total / 2 { first } else { second })
        .collect();
    let path = dir.join(name);
    write_wav(&path, RATE, 1, &samples);
    path
}

/// Buffer whose first half is `first` and second half `second`
pub fn step_buffer(len: usize, first: f64, second: f64) -> SampleBuffer {
    let samples = (0..len)
        .map(|i| if i < len / 2 { first } else { second })
        .collect();
    SampleBuffer::new(samples, RATE as f64)
}
