//! Rule-based quality scan over translated entries.
//!
//! Every rule is deterministic. Results are ranked by severity, then entry order, then
//! code, so two scans over the same input always report identically.

pub mod heuristics;
pub mod tone;

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::glossary::GlossaryEntry;
use crate::textutil::{char_len, is_blank, is_korean_language};
use heuristics::{
    find_doubled_particle, find_duplication_artifact, find_hangul_particle_mismatch,
    find_missing_force_token_term, find_percent_artifact, find_roman_particle_mismatch,
    has_bracket_mismatch, has_english_residue, has_token_mismatch, has_unresolved_particle_markers,
    is_likely_untranslated, normalize_edid_stem, rec_base, strip_ui_tokens,
};
use tone::ToneKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    Skipped,
    Error,
    Edited,
}

impl EntryStatus {
    /// Only finished or hand-edited entries are scanned.
    pub fn is_scannable(self) -> bool {
        matches!(self, EntryStatus::Done | EntryStatus::Edited)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LqaEntry {
    pub id: i64,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub edid: Option<String>,
    #[serde(default)]
    pub rec: Option<String>,
    #[serde(default)]
    pub status: EntryStatus,
    #[serde(default)]
    pub source_text: String,
    #[serde(default)]
    pub dest_text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl Severity {
    fn weight(self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warn => 1,
            Severity::Info => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "Error",
            Severity::Warn => "Warn",
            Severity::Info => "Info",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LqaIssue {
    pub id: i64,
    pub order_index: i32,
    pub edid: Option<String>,
    pub rec: Option<String>,
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub source_text: String,
    pub dest_text: String,
}

/// Tunables for the scan. Defaults match the shipped behaviour.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LqaThresholds {
    /// Report progress every N entries.
    pub progress_every: usize,
    pub tone_min_classified: usize,
    pub tone_min_leading: usize,
    pub tone_majority_ratio: f64,
    pub mesg_min_chars: usize,
    pub mesg_min_ratio: f64,
    pub qust_min_chars: usize,
    pub qust_min_ratio: f64,
}

impl Default for LqaThresholds {
    fn default() -> Self {
        Self {
            progress_every: 2000,
            tone_min_classified: 4,
            tone_min_leading: 3,
            tone_majority_ratio: 0.75,
            mesg_min_chars: 160,
            mesg_min_ratio: 2.5,
            qust_min_chars: 300,
            qust_min_ratio: 2.2,
        }
    }
}

/// Scans with default thresholds.
pub fn scan(
    entries: &[LqaEntry],
    target_lang: &str,
    glossary: &[GlossaryEntry],
    tm_notes: Option<&HashMap<i64, String>>,
) -> Vec<LqaIssue> {
    LqaScanner::default().scan(entries, target_lang, glossary, tm_notes, None)
}

#[derive(Clone, Debug, Default)]
pub struct LqaScanner {
    thresholds: LqaThresholds,
}

struct EntryContext<'a> {
    entry: &'a LqaEntry,
    rec: String,
    korean: bool,
    /// Majority tone of the dialogue group this entry belongs to, if it has one.
    group_tone: Option<ToneKind>,
}

impl EntryContext<'_> {
    fn issue(&self, severity: Severity, code: &str, message: String) -> LqaIssue {
        LqaIssue {
            id: self.entry.id,
            order_index: self.entry.order_index,
            edid: self.entry.edid.clone(),
            rec: self.entry.rec.clone(),
            severity,
            code: code.to_string(),
            message,
            source_text: self.entry.source_text.clone(),
            dest_text: self.entry.dest_text.clone(),
        }
    }

    fn warn(&self, code: &str, message: impl Into<String>) -> LqaIssue {
        self.issue(Severity::Warn, code, message.into())
    }
}

impl LqaScanner {
    pub fn new(thresholds: LqaThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &LqaThresholds {
        &self.thresholds
    }

    /// Runs every rule over the scannable entries and returns the ranked issues.
    ///
    /// `progress` receives a rounded percentage every `progress_every` entries.
    pub fn scan(
        &self,
        entries: &[LqaEntry],
        target_lang: &str,
        glossary: &[GlossaryEntry],
        tm_notes: Option<&HashMap<i64, String>>,
        mut progress: Option<&mut dyn FnMut(u32)>,
    ) -> Vec<LqaIssue> {
        let korean = is_korean_language(target_lang);
        let majorities = self.dialogue_majorities(entries);
        let every = self.thresholds.progress_every.max(1);
        let total = entries.len();

        let mut issues = Vec::new();
        for (i, entry) in entries.iter().enumerate() {
            if !entry.status.is_scannable() {
                continue;
            }
            if i % every == 0 {
                if let Some(report) = progress.as_deref_mut() {
                    report(percent(i, total));
                }
            }
            let ctx = EntryContext {
                entry,
                rec: rec_base(entry.rec.as_deref()),
                korean,
                group_tone: majorities.get(&i).copied(),
            };
            issues.extend(isolate_entry(entry.id, || {
                let mut found = Vec::new();
                self.scan_entry(&ctx, glossary, tm_notes, &mut found);
                found
            }));
        }

        sort_issues(&mut issues);
        info!(
            "lqa scan: entries={} issues={} errors={}",
            total,
            issues.len(),
            issues.iter().filter(|i| i.severity == Severity::Error).count()
        );
        issues
    }

    fn scan_entry(
        &self,
        ctx: &EntryContext<'_>,
        glossary: &[GlossaryEntry],
        tm_notes: Option<&HashMap<i64, String>>,
        issues: &mut Vec<LqaIssue>,
    ) {
        let source = ctx.entry.source_text.as_str();
        let dest = ctx.entry.dest_text.as_str();

        if let Some(note) = tm_notes.and_then(|m| m.get(&ctx.entry.id)) {
            if !is_blank(note) {
                issues.push(ctx.warn("tm_fallback", note.trim()));
            }
        }

        if ctx.korean && is_likely_untranslated(source, dest) {
            issues.push(ctx.warn("untranslated", "번역문이 원문과 동일합니다. (미번역 가능성)"));
            return;
        }

        if has_token_mismatch(source, dest) {
            issues.push(ctx.issue(
                Severity::Error,
                "token_mismatch",
                "원문/번역 태그·토큰(<...>, [pagebreak], __XT_*__)이 일치하지 않습니다.".to_string(),
            ));
        }

        if ctx.korean && !glossary.is_empty() && has_english_residue(source) {
            if let Some(missing) = find_missing_force_token_term(source, dest, glossary) {
                issues.push(ctx.warn(
                    "glossary_missing",
                    format!("용어 누락: {} => {}", missing.source_term, missing.target_term),
                ));
            }
        }

        if let Some(issue) = self.length_risk(ctx) {
            issues.push(issue);
        }
        if let Some(issue) = rec_tone(ctx) {
            issues.push(issue);
        }
        if ctx.korean {
            particle_rules(ctx, issues);
        }

        if has_bracket_mismatch(dest) {
            issues.push(ctx.warn("bracket_mismatch", "괄호/대괄호의 짝이 맞지 않을 수 있습니다."));
        }
        if ctx.korean && has_english_residue(dest) {
            issues.push(ctx.warn("english_residue", "번역문에 영문이 남아있을 수 있습니다."));
        }

        if let Some(issue) = dialogue_tone(ctx) {
            issues.push(issue);
        }
    }

    fn length_risk(&self, ctx: &EntryContext<'_>) -> Option<LqaIssue> {
        let (min_chars, min_ratio) = match ctx.rec.as_str() {
            "MESG" => (self.thresholds.mesg_min_chars, self.thresholds.mesg_min_ratio),
            "QUST" => (self.thresholds.qust_min_chars, self.thresholds.qust_min_ratio),
            _ => return None,
        };
        let src = char_len(strip_ui_tokens(&ctx.entry.source_text).trim());
        let dst = char_len(strip_ui_tokens(&ctx.entry.dest_text).trim());
        if src == 0 || dst == 0 {
            return None;
        }
        let ratio = dst as f64 / src as f64;
        if dst < min_chars || ratio < min_ratio {
            return None;
        }
        Some(ctx.warn("length_risk", format!("길이 위험: src={src}, dst={dst}, x{ratio:.2}")))
    }

    /// Majority tone per dialogue entry index, for entries whose group has one.
    ///
    /// Entries group by editor-id stem; entries without one group by contiguous run.
    fn dialogue_majorities(&self, entries: &[LqaEntry]) -> HashMap<usize, ToneKind> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, (Vec<usize>, Vec<ToneKind>)> = HashMap::new();
        let mut seq = 0usize;
        let mut in_seq_run = false;

        for (i, entry) in entries.iter().enumerate() {
            if !entry.status.is_scannable() {
                continue;
            }
            if !is_dialogue(&rec_base(entry.rec.as_deref())) {
                in_seq_run = false;
                continue;
            }
            let stem = normalize_edid_stem(entry.edid.as_deref());
            let key = if stem.trim().is_empty() {
                if !in_seq_run {
                    seq += 1;
                    in_seq_run = true;
                }
                format!("seq:{seq}")
            } else {
                in_seq_run = false;
                format!("edid:{stem}")
            };
            let (members, tones) = groups.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                (Vec::new(), Vec::new())
            });
            members.push(i);
            tones.push(tone::classify(&entry.dest_text));
        }

        let mut out = HashMap::new();
        for key in order {
            let Some((members, tones)) = groups.get(&key) else {
                continue;
            };
            if let Some(majority) = tone::majority(tones, &self.thresholds) {
                debug!("dialogue group {key}: majority={majority} of {}", tones.len());
                out.extend(members.iter().map(|&i| (i, majority)));
            }
        }
        out
    }
}

fn is_dialogue(rec: &str) -> bool {
    matches!(rec, "DIAL" | "INFO")
}

fn percent(i: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (100.0 * i as f64 / total as f64).round() as u32
}

fn rec_tone(ctx: &EntryContext<'_>) -> Option<LqaIssue> {
    let expected = tone::expected_for_rec(&ctx.rec)?;
    let actual = tone::classify(&ctx.entry.dest_text);
    if actual == ToneKind::Unknown || actual == expected {
        return None;
    }
    let message = if ctx.rec == "BOOK" {
        format!("BOOK 톤: 서술체(…다/…한다) 권장 (현재={actual})")
    } else {
        format!("UI/퀘스트 톤: 합니다체 권장 (현재={actual})")
    };
    Some(ctx.warn("rec_tone", message))
}

/// Artifact warnings always run; the particle checks stop at the first hit.
fn particle_rules(ctx: &EntryContext<'_>, issues: &mut Vec<LqaIssue>) {
    let dest = ctx.entry.dest_text.as_str();
    if let Some(example) = find_duplication_artifact(dest) {
        issues.push(ctx.warn("dup_artifact", format!("중복/오타 패턴이 감지되었습니다: '{example}'.")));
    }
    if let Some(example) = find_percent_artifact(dest) {
        issues.push(ctx.warn("percent_artifact", format!("퍼센트 표기 오류 가능성: '{example}'.")));
    }

    if has_unresolved_particle_markers(dest) {
        issues.push(ctx.warn("particle_marker", "조사 표기(괄호/슬래시 형태)가 그대로 남아있습니다."));
    } else if let Some(example) = find_doubled_particle(dest) {
        issues.push(ctx.warn("particle_double", format!("조사 병기/오타가 남아있습니다: '{example}'.")));
    } else if let Some(suggestion) = find_hangul_particle_mismatch(dest) {
        issues.push(ctx.warn("particle_mismatch", format!("조사 오류 가능성: {suggestion}")));
    } else if let Some(suggestion) = find_roman_particle_mismatch(dest) {
        issues.push(ctx.warn("particle_roman_mismatch", format!("조사 오류 가능성(로마자): {suggestion}")));
    }
}

fn dialogue_tone(ctx: &EntryContext<'_>) -> Option<LqaIssue> {
    let majority = ctx.group_tone?;
    let actual = tone::classify(&ctx.entry.dest_text);
    if actual == ToneKind::Unknown || actual == majority {
        return None;
    }
    Some(ctx.warn(
        "tone_inconsistent",
        format!("대사 그룹 내 말투가 섞여있을 수 있습니다. (majority={majority})"),
    ))
}

/// Runs one entry's rules. A panicking rule drops that entry's findings and the scan moves on.
fn isolate_entry(id: i64, rules: impl FnOnce() -> Vec<LqaIssue>) -> Vec<LqaIssue> {
    match panic::catch_unwind(AssertUnwindSafe(rules)) {
        Ok(found) => found,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!("lqa: entry {id} skipped, rule panicked: {msg}");
            Vec::new()
        }
    }
}

/// Severity first, then entry order, then code (case-insensitive). Stable.
pub fn sort_issues(issues: &mut [LqaIssue]) {
    issues.sort_by(|a, b| {
        a.severity
            .weight()
            .cmp(&b.severity.weight())
            .then(a.order_index.cmp(&b.order_index))
            .then_with(|| a.code.to_lowercase().cmp(&b.code.to_lowercase()))
    });
}
