use rubato::{FftFixedIn, Resampler};

/// Input frames per FFT chunk.
const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Converts mono samples between rates. FFT resampling is used when it can be
/// constructed; otherwise linear interpolation keeps the request alive.
pub fn resample_mono(samples: &[f32], from_hz: u32, to_hz: u32) -> Vec<f32> {
    if from_hz == to_hz || samples.is_empty() || from_hz == 0 || to_hz == 0 {
        return samples.to_vec();
    }
    match resample_fft(samples, from_hz, to_hz) {
        Ok(out) => out,
        Err(err) => {
            tracing::warn!(
                from_hz,
                to_hz,
                error = %err,
                "FFT resampler unavailable, falling back to linear interpolation"
            );
            resample_linear(samples, from_hz, to_hz)
        }
    }
}

fn expected_len(len: usize, from_hz: u32, to_hz: u32) -> usize {
    (len as f64 * to_hz as f64 / from_hz as f64).round() as usize
}

fn resample_fft(samples: &[f32], from_hz: u32, to_hz: u32) -> Result<Vec<f32>, String> {
    let mut resampler =
        FftFixedIn::<f64>::new(from_hz as usize, to_hz as usize, CHUNK_FRAMES, SUB_CHUNKS, 1)
            .map_err(|e| e.to_string())?;

    let input: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    let expected = expected_len(samples.len(), from_hz, to_hz);
    let delay = resampler.output_delay();
    let mut output: Vec<f64> = Vec::with_capacity(expected + delay + CHUNK_FRAMES);

    let mut pos = 0;
    while pos + resampler.input_frames_next() <= input.len() {
        let needed = resampler.input_frames_next();
        let chunk = [&input[pos..pos + needed]];
        let frames = resampler
            .process(&chunk[..], None)
            .map_err(|e| e.to_string())?;
        output.extend_from_slice(&frames[0]);
        pos += needed;
    }
    if pos < input.len() {
        let tail = [&input[pos..]];
        let frames = resampler
            .process_partial(Some(&tail[..]), None)
            .map_err(|e| e.to_string())?;
        output.extend_from_slice(&frames[0]);
    }
    // flush the filter delay
    while output.len() < expected + delay {
        let frames = resampler
            .process_partial::<&[f64]>(None, None)
            .map_err(|e| e.to_string())?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    Ok(output
        .into_iter()
        .skip(delay)
        .take(expected)
        .map(|s| s as f32)
        .collect())
}

pub(crate) fn resample_linear(samples: &[f32], from_hz: u32, to_hz: u32) -> Vec<f32> {
    let out_len = expected_len(samples.len(), from_hz, to_hz);
    let step = from_hz as f64 / to_hz as f64;
    let last = samples.len().saturating_sub(1);
    (0..out_len)
        .map(|i| {
            let src = i as f64 * step;
            let idx = (src as usize).min(last);
            let frac = (src - idx as f64) as f32;
            let a = samples[idx];
            let b = samples[(idx + 1).min(last)];
            a + (b - a) * frac
        })
        .collect()
}
