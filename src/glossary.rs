use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::XtError;
use crate::textutil::{contains_ci, is_word_char, next_char, prev_char, replace_ci};
use crate::tokens::{split_token_pieces, term_token};

/// Compile budget for user-supplied glossary patterns.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

const BUILTIN_NOTE_PREFIX: &str = "Built-in default glossary";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchMode {
    #[default]
    Substring,
    WordBoundary,
    Regex,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ForceMode {
    /// Behaves like `ForceToken`.
    #[default]
    Normal,
    ForceToken,
    PromptOnly,
}

impl FromStr for MatchMode {
    type Err = XtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(MatchMode::Substring),
            "wordboundary" | "word_boundary" => Ok(MatchMode::WordBoundary),
            "regex" => Ok(MatchMode::Regex),
            _ => Err(XtError::UnsupportedMatchMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for MatchMode {
    type Error = XtError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchMode::Substring => "Substring",
            MatchMode::WordBoundary => "WordBoundary",
            MatchMode::Regex => "Regex",
        })
    }
}

impl From<MatchMode> for String {
    fn from(value: MatchMode) -> Self {
        value.to_string()
    }
}

impl FromStr for ForceMode {
    type Err = XtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(ForceMode::Normal),
            "forcetoken" | "force_token" => Ok(ForceMode::ForceToken),
            "promptonly" | "prompt_only" => Ok(ForceMode::PromptOnly),
            _ => Err(XtError::UnsupportedMatchMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for ForceMode {
    type Error = XtError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ForceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ForceMode::Normal => "Normal",
            ForceMode::ForceToken => "ForceToken",
            ForceMode::PromptOnly => "PromptOnly",
        })
    }
}

impl From<ForceMode> for String {
    fn from(value: ForceMode) -> Self {
        value.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub category: Option<String>,
    pub source_term: String,
    pub target_term: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub force_mode: ForceMode,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl GlossaryEntry {
    #[must_use]
    pub fn new(id: i64, source_term: &str, target_term: &str) -> Self {
        Self {
            id,
            category: None,
            source_term: source_term.to_string(),
            target_term: target_term.to_string(),
            enabled: true,
            match_mode: MatchMode::Substring,
            force_mode: ForceMode::Normal,
            priority: 0,
            note: None,
        }
    }

    #[must_use]
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    #[must_use]
    pub fn with_force_mode(mut self, mode: ForceMode) -> Self {
        self.force_mode = mode;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub(crate) fn is_builtin_reach(&self) -> bool {
        self.note
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty() && n.starts_with(BUILTIN_NOTE_PREFIX))
            && self.source_term.eq_ignore_ascii_case("Reach")
    }
}

/// Merges project entries over global ones.
///
/// A project entry overrides every global entry with the same trimmed, case-insensitive
/// source term. Ids are reassigned from 1 in output order.
pub fn merge_glossaries(project: &[GlossaryEntry], global: &[GlossaryEntry]) -> Vec<GlossaryEntry> {
    if global.is_empty() {
        return project.to_vec();
    }
    if project.is_empty() {
        return reassign_ids(global.iter().cloned());
    }

    let overridden: HashSet<String> = project
        .iter()
        .map(|p| p.source_term.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let kept = global.iter().filter(|g| {
        let key = g.source_term.trim().to_lowercase();
        !key.is_empty() && !overridden.contains(&key)
    });
    reassign_ids(kept.chain(project.iter()).cloned())
}

fn reassign_ids(entries: impl Iterator<Item = GlossaryEntry>) -> Vec<GlossaryEntry> {
    entries
        .zip(1i64..)
        .map(|(mut e, id)| {
            e.id = id;
            e
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GlossaryApplication {
    pub text: String,
    pub token_to_replacement: HashMap<String, String>,
    pub prompt_only_pairs: Vec<(String, String)>,
}

#[derive(Debug)]
struct CompiledEntry {
    entry: GlossaryEntry,
    matcher: Option<Regex>,
}

/// A glossary snapshot compiled for substitution.
#[derive(Debug)]
pub struct GlossaryApplier {
    entries: Vec<CompiledEntry>,
}

impl GlossaryApplier {
    pub fn new(entries: &[GlossaryEntry]) -> Self {
        Self::with_regex_size_limit(entries, DEFAULT_REGEX_SIZE_LIMIT)
    }

    pub fn with_regex_size_limit(entries: &[GlossaryEntry], size_limit: usize) -> Self {
        let mut enabled: Vec<&GlossaryEntry> = entries
            .iter()
            .filter(|e| e.enabled)
            .filter(|e| !e.source_term.trim().is_empty() && !e.target_term.trim().is_empty())
            .collect();
        enabled.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.source_term.chars().count().cmp(&a.source_term.chars().count()))
        });

        let mut compiled = Vec::with_capacity(enabled.len());
        for e in enabled {
            match build_matcher(e, size_limit) {
                Ok(matcher) => compiled.push(CompiledEntry {
                    entry: e.clone(),
                    matcher,
                }),
                Err(err) => warn!(
                    "glossary entry {} excluded: invalid pattern {:?}: {err}",
                    e.id, e.source_term
                ),
            }
        }
        Self { entries: compiled }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substitutes glossary terms with `__XT_TERM_G<id>_0000__` tokens outside existing tokens.
    pub fn apply(&self, text: &str) -> GlossaryApplication {
        let mut token_to_replacement: HashMap<String, String> = HashMap::new();
        let mut prompt_only_pairs: Vec<(String, String)> = Vec::new();
        if self.entries.is_empty() {
            return GlossaryApplication {
                text: text.to_string(),
                token_to_replacement,
                prompt_only_pairs,
            };
        }

        let mut working = text.to_string();
        for compiled in &self.entries {
            let entry = &compiled.entry;
            if entry.force_mode == ForceMode::PromptOnly {
                if contains_in_plain_text(&working, &entry.source_term) {
                    prompt_only_pairs.push((entry.source_term.clone(), entry.target_term.clone()));
                }
                continue;
            }
            let mut used = false;
            let token = term_token(entry.id);
            let mut out = String::with_capacity(working.len());
            for piece in split_token_pieces(&working) {
                if piece.is_token {
                    out.push_str(piece.text);
                } else {
                    out.push_str(&replace_in_plain_text(piece.text, compiled, &token, &mut used));
                }
            }
            if used {
                debug!("glossary entry {} substituted as {token}", entry.id);
                token_to_replacement.insert(token, entry.target_term.clone());
            }
            working = out;
        }

        GlossaryApplication {
            text: working,
            token_to_replacement,
            prompt_only_pairs,
        }
    }
}

fn build_matcher(entry: &GlossaryEntry, size_limit: usize) -> Result<Option<Regex>, regex::Error> {
    if entry.force_mode == ForceMode::PromptOnly {
        return Ok(None);
    }
    let pattern = match entry.match_mode {
        MatchMode::Substring => return Ok(None),
        MatchMode::WordBoundary => regex::escape(&entry.source_term),
        MatchMode::Regex => entry.source_term.clone(),
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .size_limit(size_limit)
        .build()
        .map(Some)
}

fn replace_in_plain_text(input: &str, compiled: &CompiledEntry, token: &str, used: &mut bool) -> String {
    let entry = &compiled.entry;
    match entry.match_mode {
        MatchMode::Substring => {
            if !contains_ci(input, &entry.source_term) {
                return input.to_string();
            }
            *used = true;
            replace_ci(input, &entry.source_term, token)
        }
        MatchMode::WordBoundary | MatchMode::Regex => {
            let Some(re) = compiled.matcher.as_ref() else {
                return input.to_string();
            };
            let word_boundary = entry.match_mode == MatchMode::WordBoundary;
            if word_boundary && !contains_ci(input, &entry.source_term) {
                return input.to_string();
            }
            let builtin_reach = entry.is_builtin_reach();
            let mut out = String::with_capacity(input.len());
            let mut last = 0usize;
            let mut pos = 0usize;
            while pos <= input.len() {
                let Some(m) = re.find_at(input, pos) else {
                    break;
                };
                if word_boundary && !is_isolated_word(input, m.start(), m.end()) {
                    pos = m.start() + next_char(input, m.start()).map_or(1, char::len_utf8);
                    continue;
                }
                out.push_str(&input[last..m.start()]);
                if builtin_reach && suppress_reach(input, m.as_str(), m.end()) {
                    out.push_str(m.as_str());
                } else {
                    out.push_str(token);
                    *used = true;
                }
                last = m.end();
                pos = if m.end() == m.start() {
                    if m.end() >= input.len() {
                        break;
                    }
                    m.end() + next_char(input, m.end()).map_or(1, char::len_utf8)
                } else {
                    m.end()
                };
            }
            out.push_str(&input[last..]);
            out
        }
    }
}

fn is_isolated_word(text: &str, start: usize, end: usize) -> bool {
    !prev_char(text, start).is_some_and(is_word_char) && !next_char(text, end).is_some_and(is_word_char)
}

/// The place name "Reach" is replaced only as an exact-case word not used as "reach of"/"Reach level".
pub(crate) fn suppress_reach(text: &str, matched: &str, end: usize) -> bool {
    if matched != "Reach" {
        return true;
    }
    let next = read_next_ascii_word(text, end);
    ["of", "level", "levels"]
        .iter()
        .any(|w| next.eq_ignore_ascii_case(w))
}

fn read_next_ascii_word(text: &str, start: usize) -> &str {
    let rest = &text[start.min(text.len())..];
    let rest = rest.trim_start();
    let len = rest
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    &rest[..len]
}

fn contains_in_plain_text(text: &str, needle: &str) -> bool {
    split_token_pieces(text)
        .iter()
        .any(|p| !p.is_token && contains_ci(p.text, needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wb(id: i64, src: &str, tgt: &str) -> GlossaryEntry {
        GlossaryEntry::new(id, src, tgt).with_match_mode(MatchMode::WordBoundary)
    }

    #[test]
    fn word_boundary_skips_longer_words() {
        let applier = GlossaryApplier::new(&[wb(1, "Fast", "신속")]);
        let app = applier.apply("Rannveig's Fast. Fasten the gate.");
        assert_eq!(app.text, "Rannveig's __XT_TERM_G1_0000__. Fasten the gate.");
        assert_eq!(app.token_to_replacement["__XT_TERM_G1_0000__"], "신속");
    }

    #[test]
    fn word_boundary_matches_terms_ending_in_punctuation() {
        let applier = GlossaryApplier::new(&[wb(1, "A skill beyond the reach of most.", "범인의 경지를 넘어선 기술.")]);
        let app = applier.apply("A skill beyond the reach of most. Dash forward.");
        assert_eq!(app.text, "__XT_TERM_G1_0000__ Dash forward.");
    }

    #[test]
    fn repeated_occurrences_share_one_token() {
        let applier = GlossaryApplier::new(&[wb(7, "Draugr", "드라우그르")]);
        let app = applier.apply("Draugr and draugr");
        assert_eq!(app.text, "__XT_TERM_G7_0000__ and __XT_TERM_G7_0000__");
        assert_eq!(app.token_to_replacement.len(), 1);
    }

    #[test]
    fn substring_mode_handles_non_latin_terms() {
        let applier = GlossaryApplier::new(&[GlossaryEntry::new(123, "龍", "용")]);
        let app = applier.apply("古龍之力");
        assert_eq!(app.text, "古__XT_TERM_G123_0000__之力");
    }

    #[test]
    fn never_rewrites_inside_tokens() {
        let applier = GlossaryApplier::new(&[GlossaryEntry::new(1, "XT", "엑스")]);
        let app = applier.apply("__XT_PH_0000__ XT");
        assert_eq!(app.text, "__XT_PH_0000__ __XT_TERM_G1_0000__");
    }

    #[test]
    fn prompt_only_ignores_token_text() {
        let entry = GlossaryEntry::new(1, "PH", "자리").with_force_mode(ForceMode::PromptOnly);
        let applier = GlossaryApplier::new(&[entry]);
        let app = applier.apply("__XT_PH_0000__");
        assert!(app.prompt_only_pairs.is_empty());
        let app = applier.apply("a PH here");
        assert_eq!(app.text, "a PH here");
        assert_eq!(app.prompt_only_pairs, vec![("PH".to_string(), "자리".to_string())]);
    }

    #[test]
    fn priority_then_length_orders_substitution() {
        let applier = GlossaryApplier::new(&[
            GlossaryEntry::new(1, "Dragon", "용"),
            GlossaryEntry::new(2, "Dragon Priest", "드래곤 사제"),
        ]);
        let app = applier.apply("Dragon Priest");
        assert_eq!(app.text, "__XT_TERM_G2_0000__");
    }

    #[test]
    fn builtin_reach_is_conservative() {
        let entry = wb(1, "Reach", "리치").with_note("Built-in default glossary (Skyrim)");
        let applier = GlossaryApplier::new(&[entry]);
        assert_eq!(applier.apply("beyond the reach of most").text, "beyond the reach of most");
        assert_eq!(applier.apply("Reach level 10.").text, "Reach level 10.");
        assert_eq!(
            applier.apply("Travel in the Reach.").text,
            "Travel in the __XT_TERM_G1_0000__."
        );
    }

    #[test]
    fn invalid_regex_entries_are_excluded() {
        let bad = GlossaryEntry::new(1, "(unclosed", "x").with_match_mode(MatchMode::Regex);
        let good = GlossaryEntry::new(2, r"fire\s?ball", "화염구").with_match_mode(MatchMode::Regex);
        let applier = GlossaryApplier::new(&[bad, good]);
        assert_eq!(applier.len(), 1);
        assert_eq!(applier.apply("A Fire Ball!").text, "A __XT_TERM_G2_0000__!");
    }

    #[test]
    fn second_application_is_inert() {
        let applier = GlossaryApplier::new(&[wb(1, "Whiterun", "화이트런")]);
        let once = applier.apply("Go to Whiterun.");
        let twice = applier.apply(&once.text);
        assert_eq!(twice.text, once.text);
    }

    #[test]
    fn merge_prefers_project_entries() {
        let merged = merge_glossaries(
            &[GlossaryEntry::new(9, "Reach", "리치")],
            &[GlossaryEntry::new(4, " reach ", "도달")],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 1);
        assert_eq!(merged[0].target_term, "리치");
    }

    #[test]
    fn merge_reindexes_globals_then_projects() {
        let merged = merge_glossaries(
            &[GlossaryEntry::new(50, "Dragon", "드래곤")],
            &[GlossaryEntry::new(10, "Mead", "벌꿀술"), GlossaryEntry::new(11, "  ", "빈칸")],
        );
        let ids: Vec<(i64, &str)> = merged.iter().map(|e| (e.id, e.source_term.as_str())).collect();
        assert_eq!(ids, vec![(1, "Mead"), (2, "Dragon")]);

        let project_only = merge_glossaries(&[GlossaryEntry::new(50, "Dragon", "드래곤")], &[]);
        assert_eq!(project_only[0].id, 50);
        let global_only = merge_glossaries(&[], &[GlossaryEntry::new(10, "Mead", "벌꿀술")]);
        assert_eq!(global_only[0].id, 1);
    }

    #[test]
    fn parses_modes_and_rejects_unknown() {
        assert_eq!("WordBoundary".parse::<MatchMode>(), Ok(MatchMode::WordBoundary));
        assert_eq!("force_token".parse::<ForceMode>(), Ok(ForceMode::ForceToken));
        assert!(matches!(
            "fuzzy".parse::<MatchMode>(),
            Err(XtError::UnsupportedMatchMode(_))
        ));
    }
}
