use once_cell::sync::Lazy;
use regex::Regex;

pub const TOKEN_ID_WIDTH: usize = 4;

/// Highest index usable by a placeholder token; `9999` is reserved for end-of-text markers.
pub const MAX_PLACEHOLDERS: usize = 9999;

/// Any masked placeholder or glossary term token.
pub static XT_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"__XT_(?:PH|TERM)(?:_[A-Z0-9]+)?_[0-9]{4}__").expect("xt token regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderLabel {
    Mag,
    Dur,
    Num,
}

impl PlaceholderLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceholderLabel::Mag => "MAG",
            PlaceholderLabel::Dur => "DUR",
            PlaceholderLabel::Num => "NUM",
        }
    }
}

pub fn placeholder_token(idx: usize, label: Option<PlaceholderLabel>) -> String {
    match label {
        Some(label) => format!("__XT_PH_{}_{idx:0TOKEN_ID_WIDTH$}__", label.as_str()),
        None => format!("__XT_PH_{idx:0TOKEN_ID_WIDTH$}__"),
    }
}

pub fn term_token(entry_id: i64) -> String {
    format!("__XT_TERM_G{entry_id}_0000__")
}

/// A slice of text that is either a whole token or the plain text between tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece<'a> {
    pub text: &'a str,
    pub is_token: bool,
}

/// Splits text into alternating plain/token pieces. Empty plain pieces are omitted.
pub fn split_token_pieces(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut pos = 0usize;
    for m in XT_TOKEN_RE.find_iter(text) {
        if m.start() > pos {
            pieces.push(Piece {
                text: &text[pos..m.start()],
                is_token: false,
            });
        }
        pieces.push(Piece {
            text: m.as_str(),
            is_token: true,
        });
        pos = m.end();
    }
    if pos < text.len() {
        pieces.push(Piece {
            text: &text[pos..],
            is_token: false,
        });
    }
    pieces
}
