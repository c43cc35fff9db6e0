//! Particle selection by Hangul final-consonant (jongseong) arithmetic.

use crate::textutil::is_hangul_syllable;

const HANGUL_SYLLABLE_BASE: u32 = 0xAC00;
const JONGSEONG_COUNT: u32 = 28;
const JONGSEONG_RIEUL: u32 = 8;

fn jongseong(syllable: char) -> u32 {
    (syllable as u32 - HANGUL_SYLLABLE_BASE) % JONGSEONG_COUNT
}

/// Whether a precomposed Hangul syllable has a final consonant. Non-syllables return false.
pub fn has_final_consonant(ch: char) -> bool {
    is_hangul_syllable(ch) && jongseong(ch) != 0
}

pub fn has_final_rieul(ch: char) -> bool {
    is_hangul_syllable(ch) && jongseong(ch) == JONGSEONG_RIEUL
}

/// Korean digit readings: 영, 일, 삼, 육, 칠, 팔 end in a consonant; 이, 사, 오, 구 do not.
pub fn digit_has_final_consonant(digit: char) -> bool {
    !matches!(digit, '2' | '4' | '5' | '9')
}

pub fn is_latin_vowel(ch: char) -> bool {
    matches!(ch.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Approximates how a romanized word ends when read aloud in Korean.
pub fn latin_has_final_consonant(noun: &str) -> bool {
    for ch in noun.chars().rev() {
        if ch.is_ascii_digit() {
            return digit_has_final_consonant(ch);
        }
        if ch.is_ascii_alphabetic() {
            return !is_latin_vowel(ch);
        }
    }
    true
}

fn last_syllable(noun: &str) -> Option<char> {
    noun.chars().next_back().filter(|c| is_hangul_syllable(*c))
}

fn pick(noun: &str, with_final: &'static str, without_final: &'static str) -> &'static str {
    match last_syllable(noun) {
        Some(ch) if has_final_consonant(ch) => with_final,
        _ => without_final,
    }
}

pub fn subject(noun: &str) -> &'static str {
    pick(noun, "이", "가")
}

pub fn object(noun: &str) -> &'static str {
    pick(noun, "을", "를")
}

pub fn topic(noun: &str) -> &'static str {
    pick(noun, "은", "는")
}

pub fn conjunction(noun: &str) -> &'static str {
    pick(noun, "과", "와")
}

pub fn directional(noun: &str) -> &'static str {
    match last_syllable(noun) {
        Some(ch) if has_final_consonant(ch) && !has_final_rieul(ch) => "으로",
        _ => "로",
    }
}

pub fn object_latin(noun: &str) -> &'static str {
    if latin_has_final_consonant(noun) {
        "을"
    } else {
        "를"
    }
}

pub fn topic_latin(noun: &str) -> &'static str {
    if latin_has_final_consonant(noun) {
        "은"
    } else {
        "는"
    }
}

/// Object particle for a noun phrase, judged by its last Hangul, digit or Latin character.
pub fn object_for_phrase(phrase: &str) -> &'static str {
    let last = phrase
        .chars()
        .rev()
        .find(|c| is_hangul_syllable(*c) || c.is_ascii_digit() || c.is_ascii_alphabetic());
    match last {
        Some(c) if is_hangul_syllable(c) => {
            if has_final_consonant(c) {
                "을"
            } else {
                "를"
            }
        }
        Some(c) if c.is_ascii_digit() => {
            if digit_has_final_consonant(c) {
                "을"
            } else {
                "를"
            }
        }
        Some(c) if !is_latin_vowel(c) => "을",
        _ => "를",
    }
}

/// Replaces `particle` with the expected one, except where a one-syllable noun plus
/// `unsafe_particle` may really be a word ending in that syllable (가을, 마을).
fn fix_safely(
    noun: &str,
    particle: &str,
    expected: &'static str,
    unsafe_particle: &str,
    unsafe_expected: &str,
) -> String {
    if particle == expected {
        return particle.to_string();
    }
    if noun.chars().count() < 2 && particle == unsafe_particle && expected == unsafe_expected {
        return particle.to_string();
    }
    expected.to_string()
}

pub fn fix_object_safely(noun: &str, particle: &str) -> String {
    fix_safely(noun, particle, object(noun), "을", "를")
}

pub fn fix_object_safely_latin(noun: &str, particle: &str) -> String {
    fix_safely(noun, particle, object_latin(noun), "을", "를")
}

pub fn fix_topic_safely(noun: &str, particle: &str) -> String {
    let expected = topic(noun);
    if particle == expected {
        return particle.to_string();
    }
    // "는" after a verb stem is usually an attributive ending (있는, 없는).
    if particle == "는"
        && expected == "은"
        && (noun.chars().count() < 2 || noun.ends_with('있') || noun.ends_with('없'))
    {
        return particle.to_string();
    }
    fix_safely(noun, particle, expected, "은", "는")
}

pub fn fix_topic_safely_latin(noun: &str, particle: &str) -> String {
    fix_safely(noun, particle, topic_latin(noun), "은", "는")
}
