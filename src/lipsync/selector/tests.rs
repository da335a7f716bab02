use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::tables::{base_viseme, VisemeGroup};
use super::{select_visemes, TieBreakStrategy, VisemeSelector, HISTORY_LEN};
use crate::types::{AlignedPhoneme, PhonemeToken, Viseme, VisemeEvent};

fn phoneme(label: &str) -> PhonemeToken {
    PhonemeToken::from_label(label).expect("known label")
}

fn entry(label: &str, t: f64) -> AlignedPhoneme {
    AlignedPhoneme::new(phoneme(label), t, false)
}

fn emphasized(label: &str, t: f64) -> AlignedPhoneme {
    AlignedPhoneme::new(phoneme(label), t, true)
}

fn round_robin() -> VisemeSelector {
    VisemeSelector::new(TieBreakStrategy::RoundRobin.build())
}

fn visemes(events: &[VisemeEvent]) -> Vec<Viseme> {
    events.iter().map(|e| e.viseme).collect()
}

#[test]
fn base_mapping_covers_vowels_and_consonant_classes() {
    let cases = [
        ("a", Viseme::Aa),
        ("e", Viseme::Ee),
        ("i", Viseme::Ih),
        ("o", Viseme::Oh),
        ("u", Viseme::Ou),
        ("p", Viseme::Neutral),
        ("m", Viseme::Neutral),
        ("f", Viseme::Ee),
        ("w", Viseme::Ou),
        ("s", Viseme::Ih),
        ("rr", Viseme::Aa),
        ("ll", Viseme::Ih),
        ("k", Viseme::Aa),
        ("ue", Viseme::Ou),
        ("oy", Viseme::Oh),
        ("sil", Viseme::Neutral),
        ("neutral", Viseme::Neutral),
        ("gu", Viseme::Neutral),
        ("ç", Viseme::Neutral),
    ];
    for (label, expected) in cases {
        assert_eq!(base_viseme(phoneme(label)), expected, "{label}");
    }
}

#[test]
fn every_viseme_belongs_to_exactly_one_group() {
    let groups = [VisemeGroup::Open, VisemeGroup::Smile, VisemeGroup::Closed];
    for viseme in Viseme::ALL {
        let owners: Vec<VisemeGroup> = groups
            .iter()
            .copied()
            .filter(|g| g.members().contains(&viseme))
            .collect();
        assert_eq!(owners, [VisemeGroup::of(viseme)], "{viseme}");
    }
}

#[test]
fn widening_never_returns_own_group() {
    for viseme in Viseme::ALL {
        let group = VisemeGroup::of(viseme);
        assert!(!group.widened().is_empty());
        for widened in group.widened() {
            assert_ne!(VisemeGroup::of(*widened), group, "{viseme}");
        }
    }
    assert_eq!(VisemeGroup::Open.widened(), VisemeGroup::Smile.members());
    assert_eq!(VisemeGroup::Smile.widened(), VisemeGroup::Open.members());
}

#[test]
fn distinct_visemes_pass_through() {
    let stream = [entry("a", 0.0), entry("e", 0.1), entry("o", 0.2), entry("m", 0.3)];
    let events = round_robin().select(stream);
    assert_eq!(
        visemes(&events),
        [Viseme::Aa, Viseme::Ee, Viseme::Oh, Viseme::Neutral]
    );
    let times: Vec<f64> = events.iter().map(|e| e.time).collect();
    assert_eq!(times, [0.0, 0.1, 0.2, 0.3]);
}

#[test]
fn repeat_switches_within_group() {
    let events = round_robin().select([entry("a", 0.0), entry("a", 0.1)]);
    // group open minus aa -> [oh, ou]; round robin starts at the first
    assert_eq!(visemes(&events), [Viseme::Aa, Viseme::Oh]);
}

#[test]
fn emphasis_forces_aa_when_legal() {
    let events = round_robin().select([entry("o", 0.0), emphasized("o", 0.1)]);
    assert_eq!(visemes(&events), [Viseme::Oh, Viseme::Aa]);
}

#[test]
fn emphasis_does_not_force_aa_when_recently_used() {
    // history [aa, oh]; repeating oh leaves only ou in the open group
    let events = round_robin().select([entry("a", 0.0), entry("o", 0.1), emphasized("o", 0.2)]);
    assert_eq!(visemes(&events), [Viseme::Aa, Viseme::Oh, Viseme::Ou]);
}

#[test]
fn emphasis_ignored_when_aa_not_a_candidate() {
    let events = round_robin().select([entry("e", 0.0), emphasized("e", 0.1)]);
    assert_eq!(visemes(&events), [Viseme::Ee, Viseme::Ih]);
}

#[test]
fn exhausted_group_widens_to_opposite() {
    // history [ee, ih]; repeating ih has no smile alternative left
    let events = round_robin().select([entry("e", 0.0), entry("i", 0.1), emphasized("i", 0.2)]);
    assert_eq!(visemes(&events), [Viseme::Ee, Viseme::Ih, Viseme::Aa]);

    let events = round_robin().select([entry("e", 0.0), entry("i", 0.1), entry("i", 0.2)]);
    assert_eq!(VisemeGroup::of(events[2].viseme), VisemeGroup::Open);
}

#[test]
fn repeated_closed_escapes_to_aa_or_ee() {
    let events = round_robin().select([entry("m", 0.0), entry("b", 0.1), entry("p", 0.2)]);
    assert_eq!(events[0].viseme, Viseme::Neutral);
    assert!(matches!(events[1].viseme, Viseme::Aa | Viseme::Ee));
    assert_eq!(events[2].viseme, Viseme::Neutral);
}

#[test]
fn pause_resets_history_and_closes_mouth() {
    let mut selector = round_robin();
    let before: Vec<VisemeEvent> = selector
        .events([entry("a", 0.0), entry("e", 0.2), entry("i", 0.4)])
        .collect();
    assert_eq!(before.len(), 3);
    assert_eq!(selector.state().history().len(), 3);

    let pause = selector.step(&AlignedPhoneme::pause(0.8));
    assert_eq!(pause, VisemeEvent::new(Viseme::Neutral, 0.8));
    assert!(selector.state().history().is_empty());
    assert_eq!(selector.state().last(), Some(Viseme::Neutral));

    // a closed phoneme right after a pause must not repeat neutral
    let after = selector.step(&emphasized("m", 1.0));
    assert_eq!(after.viseme, Viseme::Aa);
}

#[test]
fn history_is_bounded() {
    let mut selector = round_robin();
    let stream = [
        entry("a", 0.0),
        entry("e", 0.1),
        entry("o", 0.2),
        entry("i", 0.3),
        entry("u", 0.4),
    ];
    selector.select(stream);
    let history: Vec<Viseme> = selector.state().history().iter().copied().collect();
    assert_eq!(history.len(), HISTORY_LEN);
    assert_eq!(history, [Viseme::Oh, Viseme::Ih, Viseme::Ou]);
}

#[test]
fn substitutions_are_counted() {
    let mut selector = round_robin();
    selector.select([entry("a", 0.0), entry("a", 0.1), entry("e", 0.2)]);
    assert_eq!(selector.substitutions(), 1);
}

#[test]
fn no_immediate_repeats_over_random_streams() {
    let labels = ["a", "e", "i", "o", "u", "m", "p", "s", "r", "sil", "ch", "ue"];
    let mut rng = StdRng::seed_from_u64(11);
    for strategy in [
        TieBreakStrategy::RoundRobin,
        TieBreakStrategy::Seeded(3),
        TieBreakStrategy::Random,
    ] {
        for _ in 0..100 {
            let len = rng.gen_range(1..40);
            let stream: Vec<AlignedPhoneme> = (0..len)
                .map(|i| {
                    let label = labels[rng.gen_range(0..labels.len())];
                    AlignedPhoneme::new(phoneme(label), i as f64 * 0.1, rng.gen_bool(0.3))
                })
                .collect();
            let events = select_visemes(&stream, strategy);
            assert_eq!(events.len(), stream.len());
            for pair in events.windows(2) {
                assert_ne!(pair[0].viseme, pair[1].viseme, "{strategy:?}: {events:?}");
            }
        }
    }
}

#[test]
fn emphasis_override_only_on_duplicates() {
    // emphasis on a fresh viseme keeps the base mapping
    let events = round_robin().select([entry("e", 0.0), emphasized("i", 0.1)]);
    assert_eq!(visemes(&events), [Viseme::Ee, Viseme::Ih]);
}

#[test]
fn seeded_selection_is_reproducible() {
    let stream: Vec<AlignedPhoneme> = ["a", "a", "a", "m", "m", "e", "e", "e"]
        .iter()
        .enumerate()
        .map(|(i, l)| entry(l, i as f64 * 0.1))
        .collect();
    let first = select_visemes(&stream, TieBreakStrategy::Seeded(9));
    let second = select_visemes(&stream, TieBreakStrategy::Seeded(9));
    assert_eq!(first, second);
}
