use crate::types::PhonemeToken;

const PUNCTUATION: &[char] = &[
    '¿', '¡', '.', ',', '!', '?', ';', ':', '-', '(', ')', '[', ']', '"', '\'', '…',
];

/// `g` + `u` + front vowel: the `u` is silent (or a glide after `ü`), so the
/// cluster splits into a consonant token and the vowel.
const VELAR_TRIGRAPHS: &[([char; 3], &str, &str)] = &[
    (['g', 'u', 'e'], "g", "e"),
    (['g', 'u', 'i'], "g", "i"),
    (['g', 'ü', 'e'], "gu", "e"),
    (['g', 'ü', 'i'], "gu", "i"),
];

const CONSONANT_DIGRAPHS: &[([char; 2], &str)] = &[
    (['c', 'h'], "ch"),
    (['l', 'l'], "ll"),
    (['r', 'r'], "rr"),
    (['q', 'u'], "k"),
    (['g', 'u'], "g"),
    (['g', 'ü'], "gu"),
];

const DIPHTHONGS: &[([char; 2], &str)] = &[
    (['a', 'i'], "ai"),
    (['a', 'y'], "ay"),
    (['a', 'u'], "au"),
    (['e', 'i'], "ei"),
    (['e', 'y'], "ey"),
    (['e', 'u'], "eu"),
    (['o', 'i'], "oi"),
    (['o', 'y'], "oy"),
    (['o', 'u'], "ou"),
    (['i', 'a'], "ia"),
    (['i', 'e'], "ie"),
    (['i', 'o'], "io"),
    (['i', 'u'], "iu"),
    (['u', 'a'], "ua"),
    (['u', 'e'], "ue"),
    (['u', 'i'], "ui"),
    (['u', 'o'], "uo"),
];

const CONSONANT_LETTERS: &str = "bcdfghjklmnñpqrstvwxyzç";

/// Consonants whose clashes get a support vowel. `ç` is a borrowed letter
/// and is left alone.
const CLASH_CONSONANTS: &str = "bcdfghjklmnñpqrstvwxyz";

/// Converts Spanish text into grapheme-derived phoneme tokens.
///
/// Never returns an empty sequence: text without any speakable letters
/// yields `[neutral]`.
pub fn text_to_phonemes(text: &str) -> Vec<PhonemeToken> {
    let cleaned = normalize_text(text);
    if cleaned.is_empty() {
        return vec![PhonemeToken::NEUTRAL];
    }

    let chars: Vec<char> = cleaned.chars().collect();
    let mut tokens: Vec<PhonemeToken> = Vec::with_capacity(chars.len());
    let mut i = 0usize;
    while i < chars.len() {
        let c = chars[i];
        if c == ' ' {
            push_silence(&mut tokens);
            i += 1;
            continue;
        }

        if let Some((consonant, vowel)) = match_trigraph(&chars[i..]) {
            tokens.push(consonant);
            tokens.push(vowel);
            i += 3;
            continue;
        }

        if let Some(token) = match_pair(&chars[i..], CONSONANT_DIGRAPHS)
            .or_else(|| match_pair(&chars[i..], DIPHTHONGS))
        {
            tokens.push(token);
            i += 2;
            continue;
        }

        if let Some(token) = single_letter(c) {
            tokens.push(token);
        }
        i += 1;
    }

    let repaired = insert_support_vowels(&tokens);
    if repaired.is_empty() {
        return vec![PhonemeToken::NEUTRAL];
    }
    repaired
}

fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() || PUNCTUATION.contains(&c) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(strip_acute(c));
    }
    out
}

/// Acute accents only mark stress, so they are dropped before pattern
/// matching. The diaeresis on `ü` changes pronunciation and is kept.
fn strip_acute(c: char) -> char {
    match c {
        'á' => 'a',
        'é' => 'e',
        'í' => 'i',
        'ó' => 'o',
        'ú' => 'u',
        other => other,
    }
}

fn push_silence(tokens: &mut Vec<PhonemeToken>) {
    if tokens.last() != Some(&PhonemeToken::SILENCE) {
        tokens.push(PhonemeToken::SILENCE);
    }
}

fn match_trigraph(rest: &[char]) -> Option<(PhonemeToken, PhonemeToken)> {
    let window = rest.get(..3)?;
    VELAR_TRIGRAPHS
        .iter()
        .find(|(pattern, _, _)| pattern.as_slice() == window)
        .and_then(|&(_, consonant, vowel)| {
            Some((
                PhonemeToken::from_label(consonant)?,
                PhonemeToken::from_label(vowel)?,
            ))
        })
}

fn match_pair(rest: &[char], table: &[([char; 2], &str)]) -> Option<PhonemeToken> {
    let window = rest.get(..2)?;
    table
        .iter()
        .find(|(pattern, _)| pattern.as_slice() == window)
        .and_then(|&(_, label)| PhonemeToken::from_label(label))
}

fn single_letter(c: char) -> Option<PhonemeToken> {
    let vowel = match c {
        'a' => Some("a"),
        'e' => Some("e"),
        'i' => Some("i"),
        'o' => Some("o"),
        'u' | 'ü' => Some("u"),
        _ => None,
    };
    if let Some(label) = vowel {
        return PhonemeToken::from_label(label);
    }
    if CONSONANT_LETTERS.contains(c) {
        let mut buf = [0u8; 4];
        return PhonemeToken::from_label(c.encode_utf8(&mut buf));
    }
    None
}

pub(crate) fn is_consonant_token(token: PhonemeToken) -> bool {
    let mut chars = token.as_str().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => CLASH_CONSONANTS.contains(c),
        _ => false,
    }
}

/// Breaks up clashes between two different consonants with a short `e`, so
/// the mouth does not jump straight between two closed shapes.
fn insert_support_vowels(tokens: &[PhonemeToken]) -> Vec<PhonemeToken> {
    let support = PhonemeToken::from_label("e").unwrap_or(PhonemeToken::NEUTRAL);
    let mut out: Vec<PhonemeToken> = Vec::with_capacity(tokens.len() + tokens.len() / 2);
    for &token in tokens {
        if token.is_silence() {
            push_silence(&mut out);
            continue;
        }
        if let Some(&prev) = out.last() {
            if prev != token && is_consonant_token(prev) && is_consonant_token(token) {
                out.push(support);
            }
        }
        out.push(token);
    }
    out
}
