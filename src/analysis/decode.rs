//! Recording decoder built on symphonia
//!
//! Reads the first channel of the first audio track as f32 PCM and widens
//! it to the f64 sample buffer the estimator works on.

use super::traits::SampleSource;
use crate::error::DecodeError;
use crate::model::SampleBuffer;
use std::path::Path;
use symphonia::core::audio::SampleBuffer as PcmBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decodes recordings from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaSource;

impl SymphoniaSource {
    pub fn new() -> Self {
        Self
    }
}

impl SampleSource for SymphoniaSource {
    fn load(&self, path: &Path) -> Result<SampleBuffer, DecodeError> {
        let (samples, sample_rate) = decode_first_channel(path)?;
        Ok(SampleBuffer::from_f32(&samples, f64::from(sample_rate)))
    }
}

/// Decode the first channel of an audio file to f32 samples
pub fn decode_first_channel(path: &Path) -> Result<(Vec<f32>, u32), DecodeError> {
    log::debug!("Decoding: {:?}", path);

    let file = std::fs::File::open(path).map_err(|source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|source| DecodeError::Probe {
            path: path.to_path_buf(),
            source,
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::NoAudioTrack(path.to_path_buf()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| DecodeError::UnknownSampleRate(path.to_path_buf()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|source| DecodeError::Decoder {
            path: path.to_path_buf(),
            source,
        })?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(source) => {
                return Err(DecodeError::Packet {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping corrupt packet in {:?}: {}", path, e);
                continue;
            }
            Err(source) => {
                return Err(DecodeError::Packet {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let spec = *decoded.spec();
        let mut pcm = PcmBuffer::<f32>::new(decoded.capacity() as u64, spec);
        pcm.copy_interleaved_ref(decoded);

        // Memos are mono; for anything wider keep channel 0
        let channels = spec.channels.count().max(1);
        if channels == 1 {
            all_samples.extend_from_slice(pcm.samples());
        } else {
            all_samples.extend(pcm.samples().iter().step_by(channels));
        }
    }

    log::debug!(
        "Decoded {} samples ({:.1}s) at {}Hz from {:?}",
        all_samples.len(),
        all_samples.len() as f32 / sample_rate as f32,
        sample_rate,
        path
    );

    Ok((all_samples, sample_rate))
}
