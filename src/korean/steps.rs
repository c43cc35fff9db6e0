use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::particle;
use crate::textutil::{group, replace_with_lookahead};

const PARTICLE_BOUNDARY: &str = r"(?P<la>$|[\s\p{P}])";
const LATIN_NOUN: &str = r"(?P<noun>[A-Z][A-Za-z0-9 \-'\x{2019}]{1,40})";
const HANGUL_NOUN: &str = r"(?P<noun>[가-힣]{1,30})";

const OBJECT_MARKER: &str = r"(?:을\(를\)|를\(을\)|\(\s*을\s*\)\s*를|\(\s*를\s*\)\s*을|을/를|를/을)";
const TOPIC_MARKER: &str = r"(?:은\(는\)|는\(은\)|\(\s*은\s*\)\s*는|\(\s*는\s*\)\s*은|은/는|는/은)";
const SUBJECT_MARKER: &str = r"(?:이\(가\)|가\(이\)|\(\s*이\s*\)\s*가|\(\s*가\s*\)\s*이|이/가|가/이)";
const CONJUNCTION_MARKER: &str = r"(?:과\(와\)|와\(과\)|\(\s*와\s*\)\s*과|\(\s*과\s*\)\s*와|과/와|와/과)";
const DIRECTIONAL_MARKER: &str = r"(?:\(\s*으\s*\)\s*로|으로\(로\)|로\(으로\)|으로/로|로/으로)";

fn compile(pattern: &str, what: &str) -> Regex {
    Regex::new(pattern).expect(what)
}

fn marker_re(noun: &str, marker: &str, what: &str) -> Regex {
    compile(&format!(r"{noun}\s*{marker}"), what)
}

fn attached_re(noun: &str, particles: &str, what: &str) -> Regex {
    compile(&format!(r"{noun}(?P<particle>{particles}){PARTICLE_BOUNDARY}"), what)
}

fn separated_re(noun: &str, particles: &str, what: &str) -> Regex {
    compile(&format!(r"{noun}\s+(?P<particle>{particles}){PARTICLE_BOUNDARY}"), what)
}

// Step 1: 을(를), 은/는 and friends.

static PAREN_OBJECT_RE: Lazy<Regex> = Lazy::new(|| marker_re(HANGUL_NOUN, OBJECT_MARKER, "paren object"));
static PAREN_OBJECT_LATIN_RE: Lazy<Regex> =
    Lazy::new(|| marker_re(LATIN_NOUN, OBJECT_MARKER, "paren object latin"));
static PAREN_TOPIC_RE: Lazy<Regex> = Lazy::new(|| marker_re(HANGUL_NOUN, TOPIC_MARKER, "paren topic"));
static PAREN_TOPIC_LATIN_RE: Lazy<Regex> =
    Lazy::new(|| marker_re(LATIN_NOUN, TOPIC_MARKER, "paren topic latin"));
static PAREN_SUBJECT_RE: Lazy<Regex> =
    Lazy::new(|| marker_re(HANGUL_NOUN, SUBJECT_MARKER, "paren subject"));
static PAREN_CONJUNCTION_RE: Lazy<Regex> =
    Lazy::new(|| marker_re(HANGUL_NOUN, CONJUNCTION_MARKER, "paren conjunction"));
static PAREN_DIRECTIONAL_RE: Lazy<Regex> =
    Lazy::new(|| marker_re(HANGUL_NOUN, DIRECTIONAL_MARKER, "paren directional"));

fn with_particle(re: &Regex, text: &str, choose: fn(&str) -> &'static str) -> String {
    re.replace_all(text, |caps: &Captures<'_>| {
        let noun = group(caps, "noun");
        format!("{noun}{}", choose(noun))
    })
    .into_owned()
}

pub(crate) fn parenthesized_particles(text: &str) -> String {
    if !text.contains(['(', '/']) {
        return text.to_string();
    }
    let working = with_particle(&PAREN_OBJECT_RE, text, particle::object);
    let working = with_particle(&PAREN_OBJECT_LATIN_RE, &working, particle::object_latin);
    let working = with_particle(&PAREN_TOPIC_RE, &working, particle::topic);
    let working = with_particle(&PAREN_TOPIC_LATIN_RE, &working, particle::topic_latin);
    let working = with_particle(&PAREN_SUBJECT_RE, &working, particle::subject);
    let working = with_particle(&PAREN_CONJUNCTION_RE, &working, particle::conjunction);
    with_particle(&PAREN_DIRECTIONAL_RE, &working, particle::directional)
}

// Step 2: particles glued to or split from their noun.

static SEPARATED_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| separated_re(HANGUL_NOUN, "을|를", "separated object"));
static ATTACHED_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| attached_re(HANGUL_NOUN, "을|를", "attached object"));
static SEPARATED_OBJECT_LATIN_RE: Lazy<Regex> =
    Lazy::new(|| separated_re(LATIN_NOUN, "을|를", "separated object latin"));
static ATTACHED_OBJECT_LATIN_RE: Lazy<Regex> =
    Lazy::new(|| attached_re(LATIN_NOUN, "을|를", "attached object latin"));
static SEPARATED_TOPIC_RE: Lazy<Regex> =
    Lazy::new(|| separated_re(HANGUL_NOUN, "은|는", "separated topic"));
static ATTACHED_TOPIC_RE: Lazy<Regex> =
    Lazy::new(|| attached_re(HANGUL_NOUN, "은|는", "attached topic"));
static SEPARATED_TOPIC_LATIN_RE: Lazy<Regex> =
    Lazy::new(|| separated_re(LATIN_NOUN, "은|는", "separated topic latin"));
static ATTACHED_TOPIC_LATIN_RE: Lazy<Regex> =
    Lazy::new(|| attached_re(LATIN_NOUN, "은|는", "attached topic latin"));
static DUPLICATE_PRONOUN_TOPIC_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        &format!(
            r"(?P<pronoun>저는|나는|너는|그는|그녀는|우리는|너희는|여러분은|당신은)(?:은|는){PARTICLE_BOUNDARY}"
        ),
        "duplicate pronoun topic",
    )
});

fn fix_particles(re: &Regex, text: &str, fix: fn(&str, &str) -> String) -> String {
    replace_with_lookahead(re, text, |caps| {
        let noun = group(caps, "noun");
        format!("{noun}{}", fix(noun, group(caps, "particle")))
    })
}

pub(crate) fn attached_separated_particles(text: &str) -> String {
    let mut working = text.to_string();
    if working.contains(['을', '를']) {
        working = fix_particles(&SEPARATED_OBJECT_RE, &working, particle::fix_object_safely);
        working = fix_particles(&ATTACHED_OBJECT_RE, &working, particle::fix_object_safely);
        working = fix_particles(&SEPARATED_OBJECT_LATIN_RE, &working, particle::fix_object_safely_latin);
        working = fix_particles(&ATTACHED_OBJECT_LATIN_RE, &working, particle::fix_object_safely_latin);
    }
    if working.contains(['은', '는']) {
        working = fix_particles(&SEPARATED_TOPIC_RE, &working, particle::fix_topic_safely);
        working = fix_particles(&ATTACHED_TOPIC_RE, &working, particle::fix_topic_safely);
        working = fix_particles(&SEPARATED_TOPIC_LATIN_RE, &working, particle::fix_topic_safely_latin);
        working = fix_particles(&ATTACHED_TOPIC_LATIN_RE, &working, particle::fix_topic_safely_latin);
        working = replace_with_lookahead(&DUPLICATE_PRONOUN_TOPIC_RE, &working, |caps| {
            group(caps, "pronoun").to_string()
        });
    }
    working
}

// Step 3: stat nouns take 에 (not 에게); spaced subject particle before a number.

static STAT_DATIVE_FROM_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?P<stat>체력|매지카|지구력)에게서", "stat dative from"));
static STAT_DATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        &format!(r"(?P<stat>체력|매지카|지구력)에게(?P<suffix>는|도|만|까지|부터)?{PARTICLE_BOUNDARY}"),
        "stat dative",
    )
});
static SEPARATED_SUBJECT_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?P<noun>[가-힣]{2,20})\s+(?P<particle>가|이)\s+(?P<la>[+-]?<|\b[0-9])",
        "separated subject",
    )
});

pub(crate) fn stat_and_subject_particles(text: &str) -> String {
    let mut working = text.to_string();
    if working.contains("에게") {
        working = STAT_DATIVE_FROM_RE.replace_all(&working, "${stat}에서").into_owned();
        working = replace_with_lookahead(&STAT_DATIVE_RE, &working, |caps| {
            format!("{}에{}", group(caps, "stat"), group(caps, "suffix"))
        });
    }
    if working.contains(' ') {
        working = replace_with_lookahead(&SEPARATED_SUBJECT_RE, &working, |caps| {
            let noun = group(caps, "noun");
            format!("{noun}{} ", particle::subject(noun))
        });
    }
    working
}

// Step 4: "X초 동안 <N>초의" -> "<N>초 동안 X의"; "<P%> <N>초 동안 확률로" -> "<P%> 확률로 <N>초 동안".

const DURATION_SUBJECT: &str = r"(?P<subject>[\p{L}][\p{L}\p{N} \-'\x{2019}]{0,40})";
const DURATION_TOKEN: &str = r"(?P<dur>[+-]?<\s*(?:dur|[0-9]+)\s*>)";

static DURATION_WITH_EUI_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        &format!(r"(?i){DURATION_SUBJECT}\s*초\s*동안\s*{DURATION_TOKEN}\s*초?\s*의"),
        "duration with eui",
    )
});
static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        &format!(r"(?i){DURATION_SUBJECT}\s*초\s*동안\s*{DURATION_TOKEN}\s*초?\b"),
        "duration",
    )
});
static PROBABILITY_AFTER_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    let chance = r"(?P<chance>(?:[+-]?<\s*[0-9]+(?:\.[0-9]+)?\s*%\s*>(?:\s*%)*|\b[0-9]+(?:\.[0-9]+)?\s*%))";
    let duration = r"(?P<duration>(?:[+-]?<[^>]+>|\b[0-9]+(?:\.[0-9]+)?\b)\s*초(?:\s*(?:동안|간))?)";
    compile(
        &format!(r"(?i){chance}\s+{duration}\s+확률로{PARTICLE_BOUNDARY}"),
        "probability after duration",
    )
});

pub(crate) fn duration_probability(text: &str) -> String {
    let mut working = text.to_string();
    if working.contains('<') && working.contains("동안") {
        working = DURATION_WITH_EUI_RE
            .replace_all(&working, |caps: &Captures<'_>| {
                format!("{}초 동안 {}의", group(caps, "dur").trim(), group(caps, "subject").trim())
            })
            .into_owned();
        working = DURATION_RE
            .replace_all(&working, |caps: &Captures<'_>| {
                format!("{}초 동안 {}", group(caps, "dur").trim(), group(caps, "subject").trim())
            })
            .into_owned();
    }
    if working.contains('%') && working.contains("확률로") && working.contains('초') {
        working = replace_with_lookahead(&PROBABILITY_AFTER_DURATION_RE, &working, |caps| {
            format!(
                "{} 확률로 {}",
                group(caps, "chance").trim(),
                group(caps, "duration").trim()
            )
        });
    }
    working
}

// Step 5: known model garbling.

static HAGI_BEFORE_STATE_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?P<stem>[가-힣]{2,30})하기(?P<la>\s*상태)", "hagi state"));
static HAGI_BEFORE_HAPNIDA_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?P<stem>[가-힣]{2,30})하기\s*합니다", "hagi hapnida"));
static WEAPON_GOODS_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"무기\s*(?:을|를)?\s*물건\s*전달(?P<ending>합니다|한다|해라|해|하세요|하십시오)?(?P<punct>[.!?…]*)",
        "weapon goods",
    )
});
static STAT_POINTS_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?P<stat>체력|매지카|지구력)\s*포인트를", "stat points object"));
static NUMERIC_BEFORE_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)(?P<points>[+-]?<\s*[0-9]+\s*>)(?:\s*포인트)?\s*(?P<dur>[+-]?<\s*[0-9]+\s*>)\s*초\s*(?P<time>동안|간)\b",
        "numeric before duration",
    )
});
static POINT_SECOND_POINT_RE: Lazy<Regex> =
    Lazy::new(|| compile(r"포인트\s*초\s*포인트", "point second point"));
static DUPLICATE_POINTS_RE: Lazy<Regex> = Lazy::new(|| compile(r"포인트\s*포인트", "duplicate points"));

fn lower_weapon_phrase(ending: &str) -> &'static str {
    match ending {
        "하십시오" | "합니다" => "무기를 내리십시오",
        "하세요" => "무기를 내리세요",
        "한다" | "해라" => "무기를 내려라",
        _ => "무기를 내려",
    }
}

pub(crate) fn artifact_cleanup(text: &str) -> String {
    let mut working = text.to_string();
    if working.contains("하기") && working.contains("상태") {
        working = replace_with_lookahead(&HAGI_BEFORE_STATE_RE, &working, |caps| {
            group(caps, "stem").to_string()
        });
    }
    if working.contains("하기") && working.contains("합니다") {
        working = HAGI_BEFORE_HAPNIDA_RE
            .replace_all(&working, "${stem}합니다")
            .into_owned();
    }
    if working.contains("무기") && working.contains("물건") {
        working = WEAPON_GOODS_RE
            .replace_all(&working, |caps: &Captures<'_>| {
                format!(
                    "{}{}",
                    lower_weapon_phrase(group(caps, "ending")),
                    group(caps, "punct")
                )
            })
            .into_owned();
    }
    if working.contains("포인트를") {
        working = STAT_POINTS_OBJECT_RE
            .replace_all(&working, |caps: &Captures<'_>| {
                let stat = group(caps, "stat");
                format!("{stat}{}", particle::object(stat))
            })
            .into_owned();
    }
    if working.contains('<') && working.contains('초') && working.contains("동안") {
        working = NUMERIC_BEFORE_DURATION_RE
            .replace_all(&working, |caps: &Captures<'_>| {
                format!(
                    "{}초 {} {}포인트",
                    group(caps, "dur").trim(),
                    group(caps, "time"),
                    group(caps, "points").trim()
                )
            })
            .into_owned();
    }
    if working.contains("포인트") && working.contains('초') {
        working = POINT_SECOND_POINT_RE.replace_all(&working, "포인트").into_owned();
        working = DUPLICATE_POINTS_RE.replace_all(&working, "포인트").into_owned();
    }
    working
}
