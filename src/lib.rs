//! # shiguredo_negotiation
//!
//! 依存なしの HTTP コンテントネゴシエーションライブラリ (RFC 9110 Section 12)
//!
//! ## 特徴
//!
//! - **依存なし**: 標準ライブラリのみ使用
//! - **Sans I/O**: ヘッダー文字列を受け取り、結果を返すだけの純粋な処理
//! - **4 種類のヘッダー**: Accept, Accept-Language, Accept-Charset, Accept-Encoding
//!
//! ## 使い方
//!
//! ### メディアタイプ
//!
//! ```rust
//! use shiguredo_negotiation::new_media_negotiator;
//!
//! let negotiator = new_media_negotiator();
//! let best = negotiator
//!     .negotiate("text/html, application/json;q=0.9", &["application/json", "text/html"], false)
//!     .unwrap();
//! assert_eq!(best.element_type(), "text/html");
//! ```
//!
//! ### 言語
//!
//! ```rust
//! use shiguredo_negotiation::new_language_negotiator;
//!
//! let best = new_language_negotiator()
//!     .negotiate("en-US, fr-FR;q=0.9", &["fr-FR", "en-US"], false)
//!     .unwrap();
//! assert_eq!(best.element_type(), "en-us");
//! assert_eq!(best.base_part(), "en");
//! assert_eq!(best.sub_part(), "us");
//! ```
//!
//! ### 一致しない場合
//!
//! ```rust
//! use shiguredo_negotiation::{new_media_negotiator, NegotiationError};
//!
//! let result = new_media_negotiator().negotiate("text/html", &["application/json"], false);
//! assert_eq!(result, Err(NegotiationError::NoAcceptableMatch));
//! // 406 Not Acceptable を返すなどのフォールバックはアプリケーション側で行う
//! ```

pub mod element;
mod error;
mod limits;
pub mod negotiator;

pub use element::{ElementError, HeaderElement, HeaderKind, QValue};
pub use error::NegotiationError;
pub use limits::NegotiationLimits;
pub use negotiator::Negotiator;

/// Accept 用のネゴシエーターを作成
pub fn new_media_negotiator() -> Negotiator {
    Negotiator::media()
}

/// Accept-Language 用のネゴシエーターを作成
pub fn new_language_negotiator() -> Negotiator {
    Negotiator::language()
}

/// Accept-Charset 用のネゴシエーターを作成
pub fn new_charset_negotiator() -> Negotiator {
    Negotiator::charset()
}

/// Accept-Encoding 用のネゴシエーターを作成
pub fn new_encoding_negotiator() -> Negotiator {
    Negotiator::encoding()
}

/// 非 strict モード、制限なしで最適な候補を返す
///
/// 入力の誤りと一致なしを区別する必要がない場合に使う。
///
/// ```rust
/// use shiguredo_negotiation::{negotiate_best, HeaderKind};
///
/// let best = negotiate_best(HeaderKind::Encoding, "gzip, br;q=0.9", &["br", "gzip"]).unwrap();
/// assert_eq!(best.element_type(), "gzip");
/// assert!(negotiate_best(HeaderKind::Encoding, "", &["gzip"]).is_none());
/// ```
pub fn negotiate_best<S: AsRef<str>>(
    kind: HeaderKind,
    header: &str,
    priorities: &[S],
) -> Option<HeaderElement> {
    Negotiator::new(kind).negotiate(header, priorities, false).ok()
}
