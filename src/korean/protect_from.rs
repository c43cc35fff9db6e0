//! Role-inversion repair for "protect X from Y's attack" sentences.

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::particle;
use crate::textutil::{group, is_blank, is_korean_language};

const INCOMING: &str =
    r"(?:다가오는|밀려오는|습격해오는|습격해\s+오는|공격해오는|공격해\s+오는|쳐들어오는|몰려오는|들이닥치는)";
const NOUN_PHRASE: &str = r"[\p{L}\p{N} \-'\x{2019}]{1,60}?";

/// Nouns that almost always name the aggressor.
const LIKELY_ATTACKERS: &[&str] = &[
    "산적", "도적", "강도", "무법자", "드래곤", "흡혈귀", "광신도", "거인", "늑대인간",
];
const ATTACK_NOUNS: &[&str] = &["공격", "습격", "공세", "기습"];

static SOURCE_PROTECT_FROM_ATTACK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bprotect(?:ing|ed|s)?\b.+?\bfrom\b.+?\battack\b").expect("protect source regex")
});

static ATTACK_FROM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?P<incoming>{INCOMING}\s+)?(?P<attacker>{NOUN_PHRASE})의\s*(?P<noun>공격|습격|공세|기습)\s*(?P<from>(?:으)?로부터)\s*(?P<protected>{NOUN_PHRASE})(?:을|를)\s*보호"
    ))
    .expect("protect attack regex")
});

static INCOMING_AFTER_FROM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?P<attacker>{NOUN_PHRASE})의\s*(?P<noun>공격|습격|공세|기습)\s*(?P<from>(?:으)?로부터)\s*(?P<incoming>{INCOMING})\s+(?P<protected>{NOUN_PHRASE})(?:을|를)\s*보호"
    ))
    .expect("protect incoming regex")
});

static DIRECT_FROM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?P<incoming>{INCOMING}\s+)?(?P<attacker>{NOUN_PHRASE})(?P<plural>들)?\s*(?:으)?로부터\s*(?P<protected>{NOUN_PHRASE})(?:을|를)\s*보호"
    ))
    .expect("protect direct regex")
});

fn contains_any(text: &str, needles: &[&str]) -> bool {
    !is_blank(text) && needles.iter().any(|n| text.contains(n))
}

/// Swaps attacker and protected noun phrases when the translation protects the bandits
/// from the house instead of the house from the bandits.
pub fn fix(target_lang: &str, source: &str, dest: &str) -> String {
    if !is_korean_language(target_lang) || is_blank(source) || is_blank(dest) {
        return dest.to_string();
    }
    if dest.contains("__XT_") || !SOURCE_PROTECT_FROM_ATTACK_RE.is_match(source) {
        return dest.to_string();
    }

    let normalized = INCOMING_AFTER_FROM_RE
        .replace_all(dest, |caps: &Captures<'_>| {
            let protected = group(caps, "protected").trim();
            format!(
                "{} {}의 {}{} {protected}{} 보호",
                group(caps, "incoming").trim(),
                group(caps, "attacker").trim(),
                group(caps, "noun"),
                group(caps, "from"),
                particle::object_for_phrase(protected),
            )
        })
        .into_owned();

    if let Some(caps) = ATTACK_FROM_RE.captures(&normalized) {
        let attacker = group(&caps, "attacker").trim();
        let protected = group(&caps, "protected").trim();
        if !contains_any(protected, LIKELY_ATTACKERS) || contains_any(attacker, LIKELY_ATTACKERS) {
            return normalized;
        }
        let replacement = format!(
            "{}{protected}의 {}{} {attacker}{} 보호",
            group(&caps, "incoming"),
            group(&caps, "noun"),
            group(&caps, "from"),
            particle::object_for_phrase(attacker),
        );
        return splice(&normalized, &caps, &replacement);
    }

    let Some(caps) = DIRECT_FROM_RE.captures(&normalized) else {
        return normalized;
    };
    let attacker = format!("{}{}", group(&caps, "attacker"), group(&caps, "plural"));
    let attacker = attacker.trim();
    let protected = group(&caps, "protected").trim();
    if !contains_any(protected, LIKELY_ATTACKERS)
        || contains_any(attacker, LIKELY_ATTACKERS)
        || contains_any(attacker, ATTACK_NOUNS)
    {
        return normalized;
    }
    let replacement = format!(
        "{}{protected}의 공격으로부터 {attacker}{} 보호",
        group(&caps, "incoming"),
        particle::object_for_phrase(attacker),
    );
    splice(&normalized, &caps, &replacement)
}

fn splice(text: &str, caps: &Captures<'_>, replacement: &str) -> String {
    let Some(m) = caps.get(0) else {
        return text.to_string();
    };
    debug!("protect-from roles swapped: {:?} -> {replacement:?}", m.as_str());
    format!("{}{replacement}{}", &text[..m.start()], &text[m.end()..])
}

#[cfg(test)]
mod tests {
    use super::fix;

    const SOURCE: &str = "I have been tasked with protecting Temptation House from an incoming bandit attack.";

    #[test]
    fn swaps_inverted_roles() {
        let out = fix(
            "korean",
            SOURCE,
            "습격해오는 템테이션 하우스의 공격으로부터 산적을 보호하라는 임무를 받았다.",
        );
        assert_eq!(out, "습격해오는 산적의 공격으로부터 템테이션 하우스를 보호하라는 임무를 받았다.");
    }

    #[test]
    fn leaves_correct_roles_alone() {
        let dest = "습격해오는 산적의 공격으로부터 템테이션 하우스를 보호하라는 임무를 받았다.";
        assert_eq!(fix("ko", SOURCE, dest), dest);
    }

    #[test]
    fn moves_incoming_phrase_back_before_attacker() {
        let out = fix(
            "ko",
            SOURCE,
            "산적의 공격으로부터 습격해 오는 템테이션 하우스를 보호하라는 임무를 받았다.",
        );
        assert_eq!(out, "습격해 오는 산적의 공격으로부터 템테이션 하우스를 보호하라는 임무를 받았다.");
    }

    #[test]
    fn restores_attack_noun_for_direct_from() {
        let out = fix(
            "ko",
            SOURCE,
            "습격해오는 템테이션 하우스들로부터 산적을 보호하라는 임무를 맡았다.",
        );
        assert_eq!(out, "습격해오는 산적의 공격으로부터 템테이션 하우스들을 보호하라는 임무를 맡았다.");
    }

    #[test]
    fn requires_protect_from_attack_source() {
        let dest = "템테이션 하우스의 공격으로부터 산적을 보호하라.";
        assert_eq!(fix("ko", "Guard the bandits.", dest), dest);
        assert_eq!(fix("en", SOURCE, dest), dest);
    }
}
