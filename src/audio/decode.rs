use std::fmt::Display;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use claxon::FlacReader;
use hound::{SampleFormat, WavReader};

use crate::error::VisemeError;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate_hz: u32,
    /// Source channel count before downmixing.
    pub channels: u16,
    /// Mono samples in `[-1, 1]`.
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate_hz as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Wav,
    Flac,
}

fn sniff(bytes: &[u8]) -> Option<Container> {
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        return Some(Container::Wav);
    }
    if bytes.starts_with(b"fLaC") {
        return Some(Container::Flac);
    }
    None
}

/// Decodes an in-memory WAV or FLAC clip to mono.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedAudio, VisemeError> {
    if bytes.is_empty() {
        return Err(VisemeError::invalid_input("audio buffer is empty"));
    }
    let decoded = match sniff(bytes) {
        Some(Container::Wav) => decode_wav(bytes)?,
        Some(Container::Flac) => decode_flac(bytes)?,
        None => {
            return Err(VisemeError::decode(
                "detect container",
                "unrecognized audio data (expected RIFF/WAVE or FLAC)",
            ))
        }
    };
    tracing::debug!(
        sample_rate_hz = decoded.sample_rate_hz,
        channels = decoded.channels,
        samples = decoded.samples.len(),
        "audio decoded"
    );
    Ok(decoded)
}

/// Reads and decodes a clip from disk. Files larger than `max_bytes` are
/// rejected without being read in full.
pub fn decode_file(path: &Path, max_bytes: usize) -> Result<DecodedAudio, VisemeError> {
    let file = File::open(path).map_err(|e| {
        VisemeError::decode("read audio file", format!("'{}': {e}", path.display()))
    })?;
    let mut bytes = Vec::new();
    file.take(max_bytes as u64 + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| {
            VisemeError::decode("read audio file", format!("'{}': {e}", path.display()))
        })?;
    if bytes.len() > max_bytes {
        return Err(VisemeError::decode(
            "read audio file",
            format!("'{}' exceeds limit of {max_bytes} bytes", path.display()),
        ));
    }
    decode_bytes(&bytes)
}

fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, VisemeError> {
    let mut reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| VisemeError::decode("parse WAV header", e))?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => downmix(reader.samples::<f32>(), spec.channels, "read WAV samples")?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample as u32);
            downmix(
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale)),
                spec.channels,
                "read WAV samples",
            )?
        }
    };
    Ok(DecodedAudio {
        sample_rate_hz: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}

fn decode_flac(bytes: &[u8]) -> Result<DecodedAudio, VisemeError> {
    let mut reader =
        FlacReader::new(Cursor::new(bytes)).map_err(|e| VisemeError::decode("parse FLAC header", e))?;
    let streaminfo = reader.streaminfo();
    let scale = int_scale(streaminfo.bits_per_sample);
    let channels = u16::try_from(streaminfo.channels)
        .map_err(|_| VisemeError::decode("parse FLAC header", "channel count out of range"))?;
    let samples = downmix(
        reader.samples().map(|s| s.map(|v| v as f32 / scale)),
        channels,
        "read FLAC samples",
    )?;
    Ok(DecodedAudio {
        sample_rate_hz: streaminfo.sample_rate,
        channels,
        samples,
    })
}

fn int_scale(bits_per_sample: u32) -> f32 {
    if bits_per_sample > 1 {
        ((1_i64 << (bits_per_sample - 1)) - 1) as f32
    } else {
        1.0
    }
}

/// Averages interleaved frames into one channel. A trailing partial frame
/// is discarded.
fn downmix<E: Display>(
    samples: impl Iterator<Item = Result<f32, E>>,
    channels: u16,
    context: &'static str,
) -> Result<Vec<f32>, VisemeError> {
    let channels = channels as usize;
    if channels == 0 {
        return Err(VisemeError::decode(context, "audio has zero channels"));
    }
    let mut mono = Vec::new();
    let mut acc = 0.0f32;
    let mut filled = 0usize;
    for sample in samples {
        acc += sample.map_err(|e| VisemeError::decode(context, e))?;
        filled += 1;
        if filled == channels {
            mono.push(acc / channels as f32);
            acc = 0.0;
            filled = 0;
        }
    }
    Ok(mono)
}

#[cfg(test)]
mod tests {
    use hound::{WavSpec, WavWriter};

    use super::*;

    fn wav_bytes(spec: WavSpec, write: impl FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).expect("wav writer");
            write(&mut writer);
            writer.finalize().expect("finalize wav");
        }
        cursor.into_inner()
    }

    #[test]
    fn empty_buffer_is_input_error() {
        let err = decode_bytes(&[]).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = decode_bytes(b"definitely not audio").unwrap_err();
        assert!(matches!(err, VisemeError::AudioDecode { .. }));
    }

    #[test]
    fn truncated_wav_is_decode_error() {
        let bytes = wav_bytes(
            WavSpec {
                channels: 1,
                sample_rate: 22_050,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            |w| {
                for _ in 0..100 {
                    w.write_sample(1000i16).unwrap();
                }
            },
        );
        let err = decode_bytes(&bytes[..20]).unwrap_err();
        assert!(matches!(err, VisemeError::AudioDecode { .. }));
    }

    #[test]
    fn pcm16_mono_is_scaled() {
        let bytes = wav_bytes(
            WavSpec {
                channels: 1,
                sample_rate: 22_050,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            |w| {
                w.write_sample(i16::MAX).unwrap();
                w.write_sample(0i16).unwrap();
                w.write_sample(-i16::MAX).unwrap();
            },
        );
        let audio = decode_bytes(&bytes).expect("decode");
        assert_eq!(audio.sample_rate_hz, 22_050);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), 3);
        assert!((audio.samples[0] - 1.0).abs() < 1e-6);
        assert_eq!(audio.samples[1], 0.0);
        assert!((audio.samples[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn stereo_float_is_averaged() {
        let bytes = wav_bytes(
            WavSpec {
                channels: 2,
                sample_rate: 44_100,
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
            |w| {
                for (l, r) in [(0.5f32, 0.1f32), (-0.2, 0.2)] {
                    w.write_sample(l).unwrap();
                    w.write_sample(r).unwrap();
                }
            },
        );
        let audio = decode_bytes(&bytes).expect("decode");
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.samples.len(), 2);
        assert!((audio.samples[0] - 0.3).abs() < 1e-6);
        assert!(audio.samples[1].abs() < 1e-6);
        assert!((audio.duration_secs() - 2.0 / 44_100.0).abs() < 1e-12);
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = decode_file(Path::new("/nonexistent/clip.wav"), 1024).unwrap_err();
        assert!(matches!(err, VisemeError::AudioDecode { .. }));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let bytes = wav_bytes(
            WavSpec {
                channels: 1,
                sample_rate: 22_050,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            |w| {
                for _ in 0..1000 {
                    w.write_sample(0i16).unwrap();
                }
            },
        );
        let mut file = tempfile::NamedTempFile::new().expect("temp wav");
        std::io::Write::write_all(&mut file, &bytes).expect("write wav");

        let err = decode_file(file.path(), bytes.len() - 1).unwrap_err();
        match err {
            VisemeError::AudioDecode { message, .. } => assert!(message.contains("exceeds limit")),
            other => panic!("unexpected error {other:?}"),
        }
        let audio = decode_file(file.path(), bytes.len()).expect("decode at limit");
        assert_eq!(audio.samples.len(), 1000);
    }

    const STEREO_FLAC: &[u8] = include_bytes!("../../tests/fixtures/tone_stereo_22050.flac");

    #[test]
    fn stereo_flac_is_scaled_and_averaged() {
        let audio = decode_bytes(STEREO_FLAC).expect("decode flac");
        assert_eq!(audio.sample_rate_hz, 22_050);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.samples.len(), 11_025);
        // frame 0 is full scale on both channels, frame 1 is 0 and -full
        assert!((audio.samples[0] - 1.0).abs() < 1e-6);
        assert!((audio.samples[1] + 0.5).abs() < 1e-6);
        assert!((audio.samples[2] + 16_384.0 / 32_767.0).abs() < 1e-6);
        assert!(audio.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!((audio.duration_secs() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn truncated_flac_is_decode_error() {
        let err = decode_bytes(&STEREO_FLAC[..STEREO_FLAC.len() / 2]).unwrap_err();
        assert!(matches!(err, VisemeError::AudioDecode { .. }));
    }
}
