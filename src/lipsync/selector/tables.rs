use crate::types::{PhonemeToken, Viseme};

/// Resting mouth shape for each phoneme label. Labels not listed map to
/// `neutral`.
const PHONEME_VISEMES: &[(&str, Viseme)] = &[
    ("a", Viseme::Aa),
    ("e", Viseme::Ee),
    ("i", Viseme::Ih),
    ("o", Viseme::Oh),
    ("u", Viseme::Ou),
    // bilabials close the lips
    ("p", Viseme::Neutral),
    ("b", Viseme::Neutral),
    ("m", Viseme::Neutral),
    ("f", Viseme::Ee),
    ("v", Viseme::Ee),
    ("w", Viseme::Ou),
    ("t", Viseme::Ih),
    ("d", Viseme::Ih),
    ("n", Viseme::Ih),
    ("l", Viseme::Ih),
    ("s", Viseme::Ih),
    ("z", Viseme::Ih),
    ("r", Viseme::Aa),
    ("rr", Viseme::Aa),
    ("ch", Viseme::Ih),
    ("y", Viseme::Ih),
    ("ñ", Viseme::Ih),
    ("ll", Viseme::Ih),
    ("k", Viseme::Aa),
    ("g", Viseme::Aa),
    ("j", Viseme::Aa),
    ("c", Viseme::Aa),
    ("q", Viseme::Aa),
    ("x", Viseme::Ih),
    ("h", Viseme::Aa),
    ("ai", Viseme::Aa),
    ("ay", Viseme::Aa),
    ("au", Viseme::Ou),
    ("ei", Viseme::Ee),
    ("ey", Viseme::Ee),
    ("eu", Viseme::Ou),
    ("oi", Viseme::Oh),
    ("oy", Viseme::Oh),
    ("ou", Viseme::Ou),
    ("ia", Viseme::Ih),
    ("ie", Viseme::Ih),
    ("io", Viseme::Ih),
    ("iu", Viseme::Ih),
    ("ua", Viseme::Ou),
    ("ue", Viseme::Ou),
    ("ui", Viseme::Ou),
    ("uo", Viseme::Ou),
    ("sil", Viseme::Neutral),
    ("neutral", Viseme::Neutral),
];

pub fn base_viseme(phoneme: PhonemeToken) -> Viseme {
    PHONEME_VISEMES
        .iter()
        .find(|(label, _)| *label == phoneme.as_str())
        .map(|&(_, viseme)| viseme)
        .unwrap_or(Viseme::Neutral)
}

const OPEN: &[Viseme] = &[Viseme::Aa, Viseme::Oh, Viseme::Ou];
const SMILE: &[Viseme] = &[Viseme::Ee, Viseme::Ih];
const CLOSED: &[Viseme] = &[Viseme::Neutral];
/// A closed mouth has no related shape group; escape to the two most
/// distinct open and smile shapes.
const CLOSED_ESCAPE: &[Viseme] = &[Viseme::Aa, Viseme::Ee];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisemeGroup {
    Open,
    Smile,
    Closed,
}

impl VisemeGroup {
    pub fn of(viseme: Viseme) -> Self {
        match viseme {
            Viseme::Aa | Viseme::Oh | Viseme::Ou => Self::Open,
            Viseme::Ee | Viseme::Ih => Self::Smile,
            Viseme::Neutral => Self::Closed,
        }
    }

    pub fn members(self) -> &'static [Viseme] {
        match self {
            Self::Open => OPEN,
            Self::Smile => SMILE,
            Self::Closed => CLOSED,
        }
    }

    /// Shapes to fall back on once the group itself offers no alternative.
    pub fn widened(self) -> &'static [Viseme] {
        match self {
            Self::Open => SMILE,
            Self::Smile => OPEN,
            Self::Closed => CLOSED_ESCAPE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Smile => "smile",
            Self::Closed => "closed",
        }
    }
}
