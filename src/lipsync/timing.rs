use crate::types::{AlignedPhoneme, AudioAnalysis, PhonemeToken, VoicedInterval};

const FILLER: &[PhonemeToken] = &[PhonemeToken::FILLER];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingParams {
    pub phonemes_per_second: f64,
    pub max_phonemes_per_interval: usize,
    /// Silences longer than this between voiced intervals get a pause entry.
    pub min_pause_secs: f64,
}

/// Places phonemes on the clip timeline.
///
/// With voiced intervals, each interval takes a quota of phonemes
/// proportional to its length and spaces them evenly; without any, phonemes
/// are spread over the whole clip. Timestamps are rounded to centiseconds
/// and never decrease.
///
/// # Panics
///
/// Panics if the analysis reports a negative or non-finite duration.
pub fn align_phonemes(
    phonemes: &[PhonemeToken],
    analysis: &AudioAnalysis,
    params: &TimingParams,
) -> Vec<AlignedPhoneme> {
    assert!(
        analysis.total_duration_secs.is_finite() && analysis.total_duration_secs >= 0.0,
        "clip duration must be finite and non-negative, got {}",
        analysis.total_duration_secs
    );

    let aligned = if analysis.intervals.is_empty() {
        spread_over_clip(phonemes, analysis)
    } else {
        distribute_over_intervals(phonemes, analysis, params)
    };

    debug_assert!(
        aligned.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
        "aligned timestamps must be non-decreasing"
    );
    aligned
}

fn distribute_over_intervals(
    phonemes: &[PhonemeToken],
    analysis: &AudioAnalysis,
    params: &TimingParams,
) -> Vec<AlignedPhoneme> {
    let intervals = &analysis.intervals;
    let mut aligned = Vec::with_capacity(phonemes.len() + intervals.len());
    let mut cursor = 0usize;

    for (idx, interval) in intervals.iter().enumerate() {
        let quota = interval_quota(interval, params);
        let assigned = if cursor < phonemes.len() {
            &phonemes[cursor..(cursor + quota).min(phonemes.len())]
        } else {
            FILLER
        };

        let spacing = interval.duration_secs() / assigned.len() as f64;
        for (i, &phoneme) in assigned.iter().enumerate() {
            let timestamp = round_centis(interval.start_secs + i as f64 * spacing);
            aligned.push(AlignedPhoneme::new(
                phoneme,
                timestamp,
                analysis.energy.is_emphasized(timestamp),
            ));
        }
        cursor += quota;

        if let Some(next) = intervals.get(idx + 1) {
            let gap = next.start_secs - interval.end_secs;
            if gap > params.min_pause_secs {
                let midpoint = round_centis(interval.end_secs + gap / 2.0);
                tracing::debug!(
                    gap_secs = format!("{gap:.3}"),
                    midpoint,
                    "timing: pause inserted between voiced intervals"
                );
                aligned.push(AlignedPhoneme::pause(midpoint));
            }
        }
    }

    if cursor < phonemes.len() {
        tracing::debug!(
            dropped = phonemes.len() - cursor,
            "timing: voiced intervals exhausted before phonemes"
        );
    }
    aligned
}

fn interval_quota(interval: &VoicedInterval, params: &TimingParams) -> usize {
    let target = (interval.duration_secs() * params.phonemes_per_second).floor();
    (target.max(0.0) as usize).clamp(1, params.max_phonemes_per_interval.max(1))
}

fn spread_over_clip(phonemes: &[PhonemeToken], analysis: &AudioAnalysis) -> Vec<AlignedPhoneme> {
    let spacing = analysis.total_duration_secs / phonemes.len().max(1) as f64;
    phonemes
        .iter()
        .enumerate()
        .map(|(i, &phoneme)| {
            let timestamp = round_centis(i as f64 * spacing);
            AlignedPhoneme::new(phoneme, timestamp, analysis.energy.is_emphasized(timestamp))
        })
        .collect()
}

pub(crate) fn round_centis(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::types::EnergyProfile;

    const SR: u32 = 22_050;

    fn params() -> TimingParams {
        TimingParams {
            phonemes_per_second: 3.0,
            max_phonemes_per_interval: 4,
            min_pause_secs: 0.15,
        }
    }

    fn tokens(labels: &[&str]) -> Vec<PhonemeToken> {
        labels
            .iter()
            .map(|l| PhonemeToken::from_label(l).expect("known label"))
            .collect()
    }

    fn interval(start_secs: f64, end_secs: f64) -> VoicedInterval {
        VoicedInterval {
            start_secs,
            end_secs,
            start_sample: (start_secs * SR as f64) as usize,
            end_sample: (end_secs * SR as f64) as usize,
        }
    }

    fn analysis(intervals: Vec<VoicedInterval>, total: f64, energies: Vec<f32>) -> AudioAnalysis {
        AudioAnalysis {
            intervals,
            energy: EnergyProfile::new(energies, 0.5, SR, 512),
            total_duration_secs: total,
        }
    }

    fn times(aligned: &[AlignedPhoneme]) -> Vec<f64> {
        aligned.iter().map(|a| a.timestamp).collect()
    }

    #[test]
    fn no_intervals_spreads_evenly_over_duration() {
        let phonemes = tokens(&["h", "o", "l", "a"]);
        let aligned = align_phonemes(&phonemes, &analysis(vec![], 1.0, vec![0.0; 44]), &params());
        assert_eq!(aligned.len(), 4);
        assert_eq!(times(&aligned), [0.0, 0.25, 0.5, 0.75]);
        assert!(aligned.iter().all(|a| !a.pause && !a.emphasized));
    }

    #[test]
    fn zero_duration_clip_stacks_at_zero() {
        let phonemes = tokens(&["a", "e"]);
        let aligned = align_phonemes(&phonemes, &analysis(vec![], 0.0, vec![]), &params());
        assert_eq!(times(&aligned), [0.0, 0.0]);
    }

    #[test]
    fn interval_quota_follows_duration() {
        let phonemes = tokens(&["a", "e", "i", "o", "u", "a", "e"]);
        // 1.0s -> 3 phonemes
        let aligned = align_phonemes(
            &phonemes,
            &analysis(vec![interval(0.0, 1.0)], 1.0, vec![0.0; 44]),
            &params(),
        );
        assert_eq!(aligned.len(), 3);
        assert_eq!(times(&aligned), [0.0, 0.33, 0.67]);
    }

    #[test]
    fn quota_is_clamped_between_one_and_max() {
        let phonemes = tokens(&["a", "e", "i", "o", "u", "a", "e"]);
        let long = align_phonemes(
            &phonemes,
            &analysis(vec![interval(0.0, 5.0)], 5.0, vec![0.0; 216]),
            &params(),
        );
        assert_eq!(long.len(), 4);

        let short = align_phonemes(
            &phonemes,
            &analysis(vec![interval(0.2, 0.3)], 0.5, vec![0.0; 22]),
            &params(),
        );
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].timestamp, 0.2);
    }

    #[test]
    fn exhausted_phonemes_use_filler_vowel() {
        let phonemes = tokens(&["m"]);
        let aligned = align_phonemes(
            &phonemes,
            &analysis(
                vec![interval(0.0, 0.5), interval(0.6, 1.0)],
                1.0,
                vec![0.0; 44],
            ),
            &params(),
        );
        let labels: Vec<&str> = aligned.iter().map(|a| a.phoneme.as_str()).collect();
        assert_eq!(labels, ["m", "a"]);
        assert_eq!(times(&aligned), [0.0, 0.6]);
    }

    #[test]
    fn long_gap_inserts_single_pause_at_midpoint() {
        let phonemes = tokens(&["h", "o", "l", "a", "sil", "m", "u"]);
        let aligned = align_phonemes(
            &phonemes,
            &analysis(
                vec![interval(0.0, 1.0), interval(1.3, 2.3)],
                2.3,
                vec![0.0; 100],
            ),
            &params(),
        );
        let pauses: Vec<&AlignedPhoneme> = aligned.iter().filter(|a| a.pause).collect();
        assert_eq!(pauses.len(), 1);
        assert_eq!(pauses[0].timestamp, 1.15);
        assert_eq!(pauses[0].phoneme, PhonemeToken::NEUTRAL);
        // pause sits between the two intervals' phonemes
        let pause_idx = aligned.iter().position(|a| a.pause).unwrap();
        assert_eq!(pause_idx, 3);
    }

    #[test]
    fn short_gap_has_no_pause() {
        let phonemes = tokens(&["a", "e", "i", "o"]);
        let aligned = align_phonemes(
            &phonemes,
            &analysis(
                vec![interval(0.0, 0.5), interval(0.62, 1.0)],
                1.0,
                vec![0.0; 44],
            ),
            &params(),
        );
        assert!(aligned.iter().all(|a| !a.pause));
    }

    #[test]
    fn leftover_phonemes_after_last_interval_are_dropped() {
        let phonemes = tokens(&["a", "e", "i", "o", "u", "a", "e", "i"]);
        let aligned = align_phonemes(
            &phonemes,
            &analysis(vec![interval(0.0, 0.7)], 0.7, vec![0.0; 31]),
            &params(),
        );
        assert_eq!(aligned.len(), 2);
    }

    #[test]
    fn emphasis_follows_energy_profile() {
        let mut energies = vec![0.1f32; 44];
        // frame covering t = 0.5s: floor(0.5 * 22050 / 512) = 21
        energies[21] = 0.9;
        let phonemes = tokens(&["a", "e"]);
        let aligned = align_phonemes(&phonemes, &analysis(vec![], 1.0, energies), &params());
        assert!(!aligned[0].emphasized);
        assert!(aligned[1].emphasized);
    }

    #[test]
    fn timestamps_never_decrease() {
        let mut rng = StdRng::seed_from_u64(7);
        let phonemes = tokens(&["a", "b", "e", "sil", "i", "c", "o", "u", "d", "a"]);
        for _ in 0..200 {
            let mut intervals = Vec::new();
            let mut t = rng.gen_range(0.0..0.3);
            for _ in 0..rng.gen_range(0..6) {
                let end = t + rng.gen_range(0.01..2.0);
                intervals.push(interval(t, end));
                t = end + rng.gen_range(0.0..0.6);
            }
            let total = t + 0.1;
            let frames = 1 + (total * SR as f64 / 512.0) as usize;
            let aligned = align_phonemes(
                &phonemes,
                &analysis(intervals, total, vec![0.2; frames]),
                &params(),
            );
            assert!(!aligned.is_empty());
            for pair in aligned.windows(2) {
                assert!(pair[0].timestamp <= pair[1].timestamp, "{aligned:?}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "clip duration")]
    fn negative_duration_is_a_programming_error() {
        let phonemes = tokens(&["a"]);
        align_phonemes(&phonemes, &analysis(vec![], -1.0, vec![]), &params());
    }
}
