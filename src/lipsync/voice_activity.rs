use rayon::prelude::*;

use crate::types::{AudioAnalysis, EnergyProfile, VoicedInterval};

/// Power floor used before converting to decibels.
const POWER_FLOOR: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub frame_length: usize,
    pub hop_length: usize,
    pub top_db: f32,
    pub emphasis_percentile: f32,
}

/// Splits a mono clip into voiced intervals and computes its energy profile.
///
/// Frames are centered on multiples of `hop_length` with zero padding at the
/// clip edges. A frame is voiced when its power is within `top_db` of the
/// loudest frame; a clip of digital silence has no voiced frames.
pub fn analyze_clip(samples: &[f32], sample_rate_hz: u32, params: &AnalysisParams) -> AudioAnalysis {
    let mean_square = frame_mean_square(samples, params.frame_length, params.hop_length);
    let voiced = voiced_frames(&mean_square, params.top_db);
    let intervals = frames_to_intervals(&voiced, samples.len(), sample_rate_hz, params.hop_length);

    let energies: Vec<f32> = mean_square.iter().map(|&ms| ms.sqrt() as f32).collect();
    let threshold = percentile(&energies, params.emphasis_percentile);
    let total_duration_secs = if sample_rate_hz == 0 {
        0.0
    } else {
        samples.len() as f64 / sample_rate_hz as f64
    };

    tracing::debug!(
        frames = energies.len(),
        intervals = intervals.len(),
        emphasis_threshold = format!("{threshold:.5}"),
        total_duration_secs = format!("{total_duration_secs:.3}"),
        "voice activity: clip analyzed"
    );

    AudioAnalysis {
        intervals,
        energy: EnergyProfile::new(energies, threshold, sample_rate_hz, params.hop_length),
        total_duration_secs,
    }
}

/// Mean power of each centered frame. Frames are independent, so they are
/// computed in parallel; `collect` keeps frame order.
fn frame_mean_square(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f64> {
    if samples.is_empty() || frame_length == 0 || hop_length == 0 {
        return Vec::new();
    }
    let frame_count = 1 + samples.len() / hop_length;
    let half = frame_length / 2;
    (0..frame_count)
        .into_par_iter()
        .map(|frame_idx| {
            let center = frame_idx * hop_length;
            let start = center.saturating_sub(half);
            let end = (center + frame_length - half).min(samples.len());
            let energy = samples[start.min(end)..end]
                .iter()
                .map(|&x| (x as f64) * (x as f64))
                .sum::<f64>();
            energy / frame_length as f64
        })
        .collect()
}

fn voiced_frames(mean_square: &[f64], top_db: f32) -> Vec<bool> {
    let peak = mean_square.iter().copied().fold(0.0f64, f64::max);
    if peak <= POWER_FLOOR {
        return vec![false; mean_square.len()];
    }
    let ref_db = 10.0 * peak.log10();
    mean_square
        .iter()
        .map(|&ms| 10.0 * ms.max(POWER_FLOOR).log10() - ref_db > -(top_db as f64))
        .collect()
}

fn frames_to_intervals(
    voiced: &[bool],
    sample_count: usize,
    sample_rate_hz: u32,
    hop_length: usize,
) -> Vec<VoicedInterval> {
    let mut intervals = Vec::new();
    if sample_rate_hz == 0 {
        return intervals;
    }
    let mut run_start: Option<usize> = None;
    for (frame_idx, is_voiced) in voiced
        .iter()
        .copied()
        .chain(std::iter::once(false))
        .enumerate()
    {
        match (run_start, is_voiced) {
            (None, true) => run_start = Some(frame_idx),
            (Some(first), false) => {
                let start_sample = (first * hop_length).min(sample_count);
                let end_sample = (frame_idx * hop_length).min(sample_count);
                if start_sample < end_sample {
                    intervals.push(VoicedInterval {
                        start_secs: start_sample as f64 / sample_rate_hz as f64,
                        end_secs: end_sample as f64 / sample_rate_hz as f64,
                        start_sample,
                        end_sample,
                    });
                }
                run_start = None;
            }
            _ => {}
        }
    }
    intervals
}

/// Percentile with linear interpolation between the two nearest ranks.
pub(crate) fn percentile(values: &[f32], pct: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (pct.clamp(0.0, 100.0) as f64 / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    (sorted[lo] as f64 + (sorted[hi] as f64 - sorted[lo] as f64) * frac) as f32
}
