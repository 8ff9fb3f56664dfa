//! File decode/encode at the engine boundary
//!
//! WAV goes through hound; compressed containers are decoded with symphonia.
//! Output is always mono 16-bit PCM, peak-normalized.

use super::buffer::AudioBuffer;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, SampleBuffer, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Largest 16-bit magnitude used for quantized output
const PCM16_MAX: f64 = i16::MAX as f64;

/// Largest signed 24-bit value
const PCM24_MAX: f64 = 8_388_607.0;

/// Supported containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Flac,
    Mp3,
    Aac,
    Ogg,
}

impl AudioFormat {
    /// Format implied by a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Ok(AudioFormat::Wav),
            "flac" => Ok(AudioFormat::Flac),
            "mp3" => Ok(AudioFormat::Mp3),
            "aac" | "adts" => Ok(AudioFormat::Aac),
            "ogg" => Ok(AudioFormat::Ogg),
            other => Err(EngineError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    /// Format implied by a path's extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| EngineError::UnsupportedFormat(format!("{} has no extension", path.display())))?;
        Self::from_extension(extension)
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aac => "aac",
            AudioFormat::Ogg => "ogg",
        }
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim_start_matches('.'))
    }
}

fn decode_failure(path: &Path, reason: impl ToString) -> EngineError {
    EngineError::DecodeFailure {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn write_failure(path: &Path, reason: impl ToString) -> EngineError {
    EngineError::WriteFailure {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Decode a file into a normalized mono buffer
///
/// The container is chosen from the extension. Multi-channel input keeps
/// only its first channel.
pub fn decode(path: impl AsRef<Path>) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let format = AudioFormat::from_path(path)?;

    let buffer = match format {
        AudioFormat::Wav => decode_wav(path)?,
        _ => decode_compressed(path)?,
    };

    log::info!(
        "Decoded {} samples @ {}Hz from {}",
        buffer.len(),
        buffer.sample_rate(),
        path.display()
    );
    Ok(buffer)
}

fn decode_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = hound::WavReader::open(path).map_err(|e| decode_failure(path, e))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| decode_failure(path, e))?,
        hound::SampleFormat::Int => {
            let max_val = ((1u64 << (spec.bits_per_sample - 1)) - 1) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| decode_failure(path, e))?
        }
    };

    let samples = interleaved
        .iter()
        .step_by(channels)
        .map(|&v| v.clamp(-1.0, 1.0))
        .collect();
    AudioBuffer::new(spec.sample_rate, samples)
}

fn decode_compressed(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path).map_err(|e| decode_failure(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| decode_failure(path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_failure(path, "no audio track"))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| decode_failure(path, "unknown sample rate"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_failure(path, e))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_failure(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_first_channel(decoded, &mut samples),
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping malformed packet in {}: {e}", path.display());
            }
            Err(e) => return Err(decode_failure(path, e)),
        }
    }

    for s in samples.iter_mut() {
        *s = f64::clamp(*s, -1.0, 1.0);
    }
    AudioBuffer::new(sample_rate, samples)
}

/// Normalize the first channel of a decoded packet and append it
fn append_first_channel(decoded: AudioBufferRef<'_>, out: &mut Vec<f64>) {
    match decoded {
        AudioBufferRef::S16(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f64 / PCM16_MAX)),
        AudioBufferRef::S24(buf) => out.extend(buf.chan(0).iter().map(|s| s.inner() as f64 / PCM24_MAX)),
        AudioBufferRef::S32(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f64 / i32::MAX as f64)),
        AudioBufferRef::F32(buf) => out.extend(buf.chan(0).iter().map(|&s| s as f64)),
        AudioBufferRef::F64(buf) => out.extend_from_slice(buf.chan(0)),
        other => {
            let frames = other.frames();
            let mut converted = SampleBuffer::<f64>::new(other.capacity() as u64, *other.spec());
            converted.copy_planar_ref(other);
            out.extend_from_slice(&converted.samples()[..frames]);
        }
    }
}

/// Peak-normalize to 16-bit PCM
///
/// The largest magnitude maps to ±32767. A silent buffer yields zeros.
pub fn quantize(samples: &[f64]) -> Vec<i16> {
    let peak = samples.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()));
    if peak == 0.0 || !peak.is_finite() {
        log::debug!("Silent or non-finite buffer, writing {} zero samples", samples.len());
        return vec![0; samples.len()];
    }

    let scale = PCM16_MAX / peak;
    samples
        .iter()
        .map(|&x| (x * scale).round().clamp(-PCM16_MAX, PCM16_MAX) as i16)
        .collect()
}

/// Encode a buffer as mono 16-bit PCM in the given container
pub fn encode(buffer: &AudioBuffer, path: impl AsRef<Path>, format: AudioFormat) -> Result<()> {
    let path = path.as_ref();
    let pcm = quantize(buffer.samples());

    match format {
        AudioFormat::Wav => write_wav(path, &pcm, buffer.sample_rate())?,
        AudioFormat::Flac => write_flac(path, &pcm, buffer.sample_rate())?,
        AudioFormat::Mp3 => write_mp3(path, &pcm, buffer.sample_rate())?,
        AudioFormat::Aac | AudioFormat::Ogg => {
            return Err(EngineError::UnsupportedFormat(format!(
                "no encoder available for .{}",
                format.extension()
            )))
        }
    }

    log::info!(
        "Encoded {} samples @ {}Hz to {} ({:?})",
        pcm.len(),
        buffer.sample_rate(),
        path.display(),
        format
    );
    Ok(())
}

fn write_wav(path: &Path, pcm: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| write_failure(path, e))?;
    for &sample in pcm {
        writer.write_sample(sample).map_err(|e| write_failure(path, e))?;
    }
    writer.finalize().map_err(|e| write_failure(path, e))
}

fn write_flac(path: &Path, pcm: &[i16], sample_rate: u32) -> Result<()> {
    use flacenc::component::BitRepr;
    use flacenc::error::Verify;

    let samples: Vec<i32> = pcm.iter().map(|&s| s as i32).collect();
    let config = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|e| write_failure(path, format!("{e:?}")))?;
    let source = flacenc::source::MemSource::from_samples(&samples, 1, 16, sample_rate as usize);
    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| write_failure(path, format!("{e:?}")))?;

    let mut sink = flacenc::bitsink::ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|_| write_failure(path, "FLAC bitstream serialization failed"))?;
    std::fs::write(path, sink.as_slice()).map_err(|e| write_failure(path, e))
}

#[cfg(feature = "mp3")]
fn write_mp3(path: &Path, pcm: &[i16], sample_rate: u32) -> Result<()> {
    use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, MonoPcm, Quality};

    let mut builder = Builder::new().ok_or_else(|| write_failure(path, "LAME initialization failed"))?;
    builder.set_num_channels(1).map_err(|e| write_failure(path, format!("{e:?}")))?;
    builder.set_sample_rate(sample_rate).map_err(|e| write_failure(path, format!("{e:?}")))?;
    builder.set_brate(Bitrate::Kbps192).map_err(|e| write_failure(path, format!("{e:?}")))?;
    builder.set_quality(Quality::Best).map_err(|e| write_failure(path, format!("{e:?}")))?;
    let mut encoder = builder.build().map_err(|e| write_failure(path, format!("{e:?}")))?;

    let mut out = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(pcm.len()));
    encoder
        .encode_to_vec(MonoPcm(pcm), &mut out)
        .map_err(|e| write_failure(path, format!("{e:?}")))?;
    encoder
        .flush_to_vec::<FlushNoGap>(&mut out)
        .map_err(|e| write_failure(path, format!("{e:?}")))?;

    std::fs::write(path, &out).map_err(|e| write_failure(path, e))
}

#[cfg(not(feature = "mp3"))]
fn write_mp3(_path: &Path, _pcm: &[i16], _sample_rate: u32) -> Result<()> {
    Err(EngineError::UnsupportedFormat(
        "MP3 encoding requires the `mp3` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use tempfile::tempdir;

    /// 0.8-amplitude tone with a single full-scale sample, so encoding does not rescale
    fn full_scale_tone(sample_rate: u32, len: usize) -> AudioBuffer {
        let mut samples: Vec<f64> = (0..len)
            .map(|i| 0.8 * (2.0 * PI * 440.0 * i as f64 / sample_rate as f64).sin())
            .collect();
        samples[len / 2] = 1.0;
        AudioBuffer::new(sample_rate, samples).unwrap()
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(AudioFormat::from_path("a/b/track.WAV").unwrap(), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_path("x.flac").unwrap(), AudioFormat::Flac);
        assert_eq!(AudioFormat::from_path("x.adts").unwrap(), AudioFormat::Aac);
        assert_eq!("ogg".parse::<AudioFormat>().unwrap(), AudioFormat::Ogg);
        assert!(matches!(
            AudioFormat::from_path("notes.txt"),
            Err(EngineError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            AudioFormat::from_path("no_extension"),
            Err(EngineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_quantize_peak_normalization() {
        assert_eq!(quantize(&[0.5, -0.25, 0.0]), vec![32767, -16384, 0]);
        assert_eq!(quantize(&[-0.5, 0.125]), vec![-32767, 8192]);
        assert_eq!(quantize(&[0.0; 4]), vec![0; 4]);
        assert!(quantize(&[]).is_empty());
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let original = full_scale_tone(22050, 4410);
        encode(&original, &path, AudioFormat::Wav).unwrap();
        let loaded = decode(&path).unwrap();

        assert_eq!(loaded.sample_rate(), 22050);
        assert_eq!(loaded.len(), original.len());
        for (a, b) in original.samples().iter().zip(loaded.samples()) {
            assert!((a - b).abs() <= 1.0 / 32767.0);
        }
    }

    #[test]
    fn test_silent_buffer_encodes_zeros() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silence.wav");

        let silent = AudioBuffer::new(8000, vec![0.0; 800]).unwrap();
        encode(&silent, &path, AudioFormat::Wav).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().bits_per_sample, 16);
        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 800);
        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_flac_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.flac");

        let original = full_scale_tone(16000, 8192);
        encode(&original, &path, AudioFormat::Flac).unwrap();
        let loaded = decode(&path).unwrap();

        assert_eq!(loaded.sample_rate(), 16000);
        assert_eq!(loaded.len(), original.len());
        for (a, b) in original.samples().iter().zip(loaded.samples()) {
            assert!((a - b).abs() <= 2.0 / 32767.0);
        }
    }

    /// |DFT| of `samples` at `freq_hz`, normalized by length
    #[cfg(feature = "mp3")]
    fn tone_level(samples: &[f64], sample_rate: u32, freq_hz: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / sample_rate as f64;
        let (re, im) = samples.iter().enumerate().fold((0.0, 0.0), |(re, im), (n, &s)| {
            (re + s * (omega * n as f64).cos(), im - s * (omega * n as f64).sin())
        });
        (re * re + im * im).sqrt() / samples.len() as f64
    }

    #[cfg(feature = "mp3")]
    #[test]
    fn test_mp3_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.mp3");

        let original = full_scale_tone(44100, 44100);
        encode(&original, &path, AudioFormat::Mp3).unwrap();
        let loaded = decode(&path).unwrap();

        assert_eq!(loaded.sample_rate(), 44100);
        // Lossy: encoder delay and frame padding shift the length by a few frames
        assert!(loaded.len() + 1152 >= original.len());
        assert!(loaded.len() <= original.len() + 4 * 1152);

        let tone = tone_level(loaded.samples(), 44100, 440.0);
        assert!((tone - 0.4).abs() < 0.04, "440 Hz level {}", tone);
        assert!(tone_level(loaded.samples(), 44100, 1000.0) < tone / 20.0);
    }

    #[test]
    fn test_wav_first_channel_and_depths() {
        let dir = tempdir().unwrap();

        // Stereo 24-bit: left full scale, right silent
        let path = dir.path().join("stereo24.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 24,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..10 {
            writer.write_sample(8_388_607i32).unwrap();
            writer.write_sample(0i32).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = decode(&path).unwrap();
        assert_eq!(loaded.len(), 10);
        assert!(loaded.samples().iter().all(|&s| (s - 1.0).abs() < 1e-12));

        // Float samples pass through, out-of-range values are clamped
        let path = dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for &v in &[0.25f32, -0.5, 1.5] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = decode(&path).unwrap();
        assert_eq!(loaded.samples(), &[0.25, -0.5, 1.0]);
    }

    #[test]
    fn test_unsupported_formats() {
        let dir = tempdir().unwrap();
        let buffer = full_scale_tone(8000, 100);

        assert!(matches!(
            decode(dir.path().join("clip.xyz")),
            Err(EngineError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            encode(&buffer, dir.path().join("clip.aac"), AudioFormat::Aac),
            Err(EngineError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            encode(&buffer, dir.path().join("clip.ogg"), AudioFormat::Ogg),
            Err(EngineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_malformed_and_missing_files() {
        let dir = tempdir().unwrap();

        let bad_wav = dir.path().join("bad.wav");
        std::fs::write(&bad_wav, b"definitely not RIFF data").unwrap();
        assert!(matches!(decode(&bad_wav), Err(EngineError::DecodeFailure { .. })));

        let bad_flac = dir.path().join("bad.flac");
        std::fs::write(&bad_flac, vec![0u8; 256]).unwrap();
        assert!(matches!(decode(&bad_flac), Err(EngineError::DecodeFailure { .. })));

        assert!(matches!(
            decode(dir.path().join("missing.mp3")),
            Err(EngineError::DecodeFailure { .. })
        ));
    }

    #[test]
    fn test_write_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.wav");
        let buffer = full_scale_tone(8000, 100);
        assert!(matches!(
            encode(&buffer, &path, AudioFormat::Wav),
            Err(EngineError::WriteFailure { .. })
        ));
    }
}
