use std::fmt;

use crate::element::ElementError;

/// コンテントネゴシエーションエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// 不正な引数 (空のヘッダー、空の優先リスト)
    InvalidArgument(&'static str),
    /// 不正なヘッダー (strict モードで不正な要素を含む)
    InvalidHeader(ElementError),
    /// 不正な優先リスト要素 (strict モード)
    InvalidPriority(ElementError),
    /// 不正なメディアタイプ (strict モードの優先リスト要素)
    InvalidMediaType(String),
    /// 不正な言語タグ (strict モードの優先リスト要素)
    InvalidLanguage(String),
    /// 受け入れ可能な候補がない
    NoAcceptableMatch,
    /// ヘッダーが長すぎる
    HeaderTooLong { size: usize, limit: usize },
    /// 要素数超過
    TooManyElements { count: usize, limit: usize },
}

impl NegotiationError {
    /// 入力は正しいが一致する候補がなかったかどうか
    ///
    /// `true` の場合は 406 Not Acceptable などのフォールバックで扱う。
    /// それ以外は呼び出し側の入力や設定の誤り。
    pub fn is_no_match(&self) -> bool {
        matches!(self, NegotiationError::NoAcceptableMatch)
    }

    pub(crate) fn from_priority(error: ElementError, priority: &str) -> Self {
        match error {
            ElementError::InvalidMediaType => {
                NegotiationError::InvalidMediaType(priority.trim().to_string())
            }
            ElementError::InvalidLanguage => {
                NegotiationError::InvalidLanguage(priority.trim().to_string())
            }
            e => NegotiationError::InvalidPriority(e),
        }
    }
}

impl fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            NegotiationError::InvalidHeader(e) => write!(f, "invalid header: {}", e),
            NegotiationError::InvalidPriority(e) => write!(f, "invalid priority: {}", e),
            NegotiationError::InvalidMediaType(value) => {
                write!(f, "invalid media type: {:?}", value)
            }
            NegotiationError::InvalidLanguage(value) => {
                write!(f, "invalid language tag: {:?}", value)
            }
            NegotiationError::NoAcceptableMatch => write!(f, "no acceptable match"),
            NegotiationError::HeaderTooLong { size, limit } => {
                write!(f, "header too long: {} > {}", size, limit)
            }
            NegotiationError::TooManyElements { count, limit } => {
                write!(f, "too many elements: {} > {}", count, limit)
            }
        }
    }
}

impl std::error::Error for NegotiationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NegotiationError::InvalidHeader(e) | NegotiationError::InvalidPriority(e) => Some(e),
            _ => None,
        }
    }
}
