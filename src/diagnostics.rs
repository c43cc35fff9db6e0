//! Maps failures to short, stable user-facing codes and Korean messages.

use serde::Serialize;

use crate::error::XtError;
use crate::textutil::contains_ci;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UserFacingError {
    pub code: &'static str,
    pub message: &'static str,
    /// Whether the full error chain is worth attaching to logs.
    pub details_in_logs: bool,
}

impl UserFacingError {
    const fn new(code: &'static str, message: &'static str, details_in_logs: bool) -> Self {
        Self {
            code,
            message,
            details_in_logs,
        }
    }
}

const EMPTY: UserFacingError = UserFacingError::new("E000", "", false);
const TOKEN_RULE: UserFacingError = UserFacingError::new(
    "E330",
    "번역 결과가 토큰/태그 규칙을 위반했습니다. 자동 복구를 켜고 다시 시도하세요.",
    false,
);
const FILE_IO: UserFacingError = UserFacingError::new(
    "E410",
    "파일을 읽거나 쓰지 못했습니다. 파일이 다른 프로그램에서 사용 중인지 확인하세요.",
    false,
);
const UNEXPECTED: UserFacingError =
    UserFacingError::new("E999", "예상치 못한 오류가 발생했습니다. 잠시 후 다시 시도하세요.", false);

// Checked in order; the first rule with a matching needle wins.
const MESSAGE_RULES: &[(&[&str], UserFacingError)] = &[
    (
        &[
            "Missing token in translation",
            "Token sequence mismatch",
            "Unexpected token in translation",
            "Token count mismatch",
            "Missing placeholder token",
            "Missing glossary token",
            "Too many placeholders",
            "xt_token_leak",
        ],
        TOKEN_RULE,
    ),
    (
        &["HTTP 429", "RESOURCE_EXHAUSTED", "rate limit", "too many requests"],
        UserFacingError::new(
            "E202",
            "요청이 너무 많습니다(요청 제한). 잠시 후 다시 시도하거나 Parallel/Batch를 줄여보세요.",
            true,
        ),
    ),
    (
        &["HTTP 401", "HTTP 403", "statuscode=401", "statuscode=403", "unauthorized", "forbidden"],
        UserFacingError::new("E201", "API 키가 유효하지 않거나 권한이 없습니다. 설정에서 API 키를 확인하세요.", true),
    ),
    (
        &["HTTP 500", "HTTP 502", "HTTP 503", "HTTP 504", "HTTP 5"],
        UserFacingError::new("E203", "번역 서버 오류입니다. 잠시 후 다시 시도하세요.", true),
    ),
    (
        &["MAX_TOKENS", "output truncated"],
        UserFacingError::new(
            "E310",
            "응답이 길어 잘렸습니다. Batch/Max chars를 줄이거나 Max out을 늘려보세요.",
            true,
        ),
    ),
    (
        &["timeout", "timed out", "시간이 초과"],
        UserFacingError::new(
            "E210",
            "요청 시간이 초과되었습니다. 잠시 후 다시 시도하거나 Batch/Max chars를 줄여보세요.",
            true,
        ),
    ),
    (
        &["NameResolutionFailure", "DNS", "No route", "connection", "네트워크"],
        UserFacingError::new("E211", "네트워크 오류입니다. 인터넷 연결을 확인하고 잠시 후 다시 시도하세요.", true),
    ),
    (
        &[
            "Model output did not contain",
            "Model JSON missing",
            "missing candidates",
            "Batch size mismatch",
            "Model output missing",
        ],
        UserFacingError::new(
            "E320",
            "모델 출력 형식이 예상과 달라 실패했습니다. Batch를 줄이거나 다른 모델로 다시 시도하세요.",
            true,
        ),
    ),
    (
        &["Unsupported glossary mode", "Invalid chunk arguments"],
        UserFacingError::new("E120", "입력 설정이 올바르지 않습니다. 용어집 모드와 분할 옵션을 확인하세요.", false),
    ),
];

/// Classifies a pipeline error directly.
pub fn classify_xt(err: &XtError) -> UserFacingError {
    match err {
        XtError::MissingPlaceholder { .. } | XtError::PlaceholderBudgetExceeded => TOKEN_RULE,
        XtError::UnsupportedMatchMode(_) | XtError::InvalidChunkArgs(_) => classify_message(&err.to_string()),
    }
}

/// Classifies any error by its typed causes first, then by its message chain.
pub fn classify(err: &anyhow::Error) -> UserFacingError {
    for cause in err.chain() {
        if let Some(xt) = cause.downcast_ref::<XtError>() {
            return classify_xt(xt);
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return FILE_IO;
        }
    }
    let chain = err.chain().map(ToString::to_string).collect::<Vec<_>>().join(" | ");
    classify_message(&chain)
}

/// Classifies a flattened message chain (`outer | inner | ...`).
pub fn classify_message(chain: &str) -> UserFacingError {
    let chain = chain.trim();
    if chain.is_empty() {
        return EMPTY;
    }
    MESSAGE_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| contains_ci(chain, n)))
        .map_or(UNEXPECTED, |(_, classified)| *classified)
}
