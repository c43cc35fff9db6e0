use once_cell::sync::Lazy;
use regex::Regex;

use crate::textutil::{group, is_blank, is_hangul_syllable, next_char, prev_char, replace_guarded, strip_invisible};

static DUPLICATE_PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%(?:\s*%)+").expect("duplicate percent regex"));
static PERCENT_AFTER_PERCENT_PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<ph>[+-]?<\s*[0-9]+(?:\.[0-9]+)?\s*%\s*>)(?:\s*%)+")
        .expect("percent placeholder regex")
});
static PERCENT_POINTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<pct>\b[0-9]+(?:\.[0-9]+)?%)\s*포인트(?P<post>(?:의|가|이|을|를|은|는|도|만|까지|부터)?\b)?")
        .expect("percent points regex")
});
static LONE_PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new("%").expect("percent regex"));

const CLOSERS: &[char] = &[',', '.', '!', '?', '…', ':', ';', '"', '\'', '”', '’', ')', ']', '}'];

/// Cleans percent-sign artifacts: doubled `%`, `%` after a `<N%>` placeholder,
/// `포인트` after a literal percentage, and a stray `%` glued to the end of a word.
pub fn fix_duplicate_percents(text: &str) -> String {
    if is_blank(text) {
        return text.to_string();
    }
    let text = strip_invisible(text);
    if !text.contains('%') {
        return text;
    }

    let working = DUPLICATE_PERCENT_RE.replace_all(&text, "%");
    let working = PERCENT_AFTER_PERCENT_PLACEHOLDER_RE.replace_all(&working, "$ph");
    let working = if working.contains("포인트") {
        PERCENT_POINTS_RE
            .replace_all(&working, |caps: &regex::Captures<'_>| {
                format!("{}{}", group(caps, "pct"), group(caps, "post"))
            })
            .into_owned()
    } else {
        working.into_owned()
    };
    replace_guarded(
        &LONE_PERCENT_RE,
        &working,
        |hay, caps| {
            let Some(m) = caps.get(0) else {
                return false;
            };
            let glued = prev_char(hay, m.start())
                .is_some_and(|c| is_hangul_syllable(c) || c.is_ascii_alphabetic());
            let closes = next_char(hay, m.end()).map_or(true, |c| c.is_whitespace() || CLOSERS.contains(&c));
            glued && closes
        },
        |_| String::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::fix_duplicate_percents;

    #[test]
    fn collapses_doubled_percent() {
        assert_eq!(fix_duplicate_percents("50%% 확률"), "50% 확률");
        assert_eq!(fix_duplicate_percents("<mag>%%"), "<mag>%");
        assert_eq!(fix_duplicate_percents("A% %0f"), "A%0f");
    }

    #[test]
    fn drops_percent_after_percent_placeholder() {
        assert_eq!(fix_duplicate_percents("<25%> %"), "<25%>");
        assert_eq!(fix_duplicate_percents("<25%>\u{200B}%"), "<25%>");
    }

    #[test]
    fn drops_stray_percent_after_words() {
        assert_eq!(fix_duplicate_percents("밀어치기% 증가합니다."), "밀어치기 증가합니다.");
        assert_eq!(fix_duplicate_percents("<mag>% 증가"), "<mag>% 증가");
    }

    #[test]
    fn drops_points_after_percentages() {
        assert_eq!(fix_duplicate_percents("10%포인트의 피해"), "10%의 피해");
        assert_eq!(fix_duplicate_percents("10% 포인트 증가"), "10% 증가");
    }

    #[test]
    fn text_without_percent_is_unchanged() {
        assert_eq!(fix_duplicate_percents("피해를 줍니다."), "피해를 줍니다.");
    }
}
