//! ヘッダー要素パース (RFC 9110 Section 12.5)
//!
//! ## 概要
//!
//! Accept / Accept-Language / Accept-Charset / Accept-Encoding の値を要素単位に分解し、
//! ヘッダー種別ごとの検証と正規化を行います。
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_negotiation::element::{parse_elements, HeaderElement, HeaderKind};
//!
//! let element = HeaderElement::parse(HeaderKind::Media, "TEXT/html; Level=1; q=0.5").unwrap();
//! assert_eq!(element.element_type(), "text/html");
//! assert_eq!(element.normalized_value(), "text/html; level=1");
//! assert_eq!(element.qvalue().value(), 500);
//!
//! // 非 strict モードでは不正な要素を読み飛ばす
//! let elements = parse_elements(HeaderKind::Language, "en-US, a-b-c-d, ja", false).unwrap();
//! assert_eq!(elements.len(), 2);
//! assert_eq!(elements[1].original_index(), 1);
//! ```

use core::fmt;
use std::collections::BTreeMap;

/// ヘッダー要素パースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    /// 空の入力
    Empty,
    /// 不正な形式
    InvalidFormat,
    /// 不正なメディアタイプ
    InvalidMediaType,
    /// 不正な言語タグ
    InvalidLanguage,
    /// 不正なトークン
    InvalidToken,
    /// 不正なパラメータ
    InvalidParameter,
    /// 不正な q 値
    InvalidQValue,
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementError::Empty => write!(f, "empty header element"),
            ElementError::InvalidFormat => write!(f, "invalid header element format"),
            ElementError::InvalidMediaType => write!(f, "invalid media type"),
            ElementError::InvalidLanguage => write!(f, "invalid language tag"),
            ElementError::InvalidToken => write!(f, "invalid token"),
            ElementError::InvalidParameter => write!(f, "invalid parameter"),
            ElementError::InvalidQValue => write!(f, "invalid qvalue"),
        }
    }
}

impl std::error::Error for ElementError {}

/// ネゴシエーション対象のヘッダー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    /// Accept (メディアタイプ)
    Media,
    /// Accept-Language
    Language,
    /// Accept-Charset
    Charset,
    /// Accept-Encoding
    Encoding,
}

impl HeaderKind {
    /// 対応するリクエストヘッダー名
    pub fn header_name(&self) -> &'static str {
        match self {
            HeaderKind::Media => "Accept",
            HeaderKind::Language => "Accept-Language",
            HeaderKind::Charset => "Accept-Charset",
            HeaderKind::Encoding => "Accept-Encoding",
        }
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderKind::Media => "media",
            HeaderKind::Language => "language",
            HeaderKind::Charset => "charset",
            HeaderKind::Encoding => "encoding",
        };
        write!(f, "{}", name)
    }
}

/// q 値 (0.000 - 1.000)
///
/// 内部ではミリ単位の整数で保持するため、比較は全順序になる。
/// 精度は RFC 9110 の qvalue 文法と同じ小数第 3 位までで、それより細かい差は同値になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QValue(u16);

impl QValue {
    /// q=0 (拒否)
    pub const ZERO: QValue = QValue(0);
    /// q=1 (デフォルト)
    pub const ONE: QValue = QValue(1000);

    /// q 値をパース
    ///
    /// 数値として解釈できれば [0, 1] に丸め込み、小数第 3 位に揃える。
    /// 数値として解釈できない場合はエラー。
    pub fn parse(input: &str) -> Result<Self, ElementError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ElementError::InvalidQValue);
        }

        let value: f64 = input.parse().map_err(|_| ElementError::InvalidQValue)?;
        if !value.is_finite() {
            return Err(ElementError::InvalidQValue);
        }

        let clamped = value.clamp(0.0, 1.0);
        let mut millis = (clamped * 1000.0).round() as u16;
        // 正の値は 0 (拒否) に丸めない
        if millis == 0 && clamped > 0.0 {
            millis = 1;
        }
        Ok(QValue(millis))
    }

    /// ミリ単位の値から作成 (1000 を超える値は 1000 に丸める)
    pub fn from_millis(millis: u16) -> Self {
        QValue(millis.min(1000))
    }

    /// ミリ単位の q 値 (0-1000)
    pub fn value(&self) -> u16 {
        self.0
    }

    /// f32 に変換
    pub fn as_f32(&self) -> f32 {
        self.0 as f32 / 1000.0
    }

    /// q=0 かどうか
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for QValue {
    fn default() -> Self {
        QValue::ONE
    }
}

impl fmt::Display for QValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1000 {
            return write!(f, "1");
        }
        if self.0 == 0 {
            return write!(f, "0");
        }

        let mut frac = format!("{:03}", self.0);
        while frac.ends_with('0') {
            frac.pop();
        }
        write!(f, "0.{}", frac)
    }
}

/// パース済みヘッダー要素
///
/// ヘッダー値をカンマで区切った 1 要素に対応する。
/// 比較には正規化済みの値を使い、`value` は書かれたままの文字列を保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderElement {
    kind: HeaderKind,
    value: String,
    normalized_value: String,
    element_type: String,
    base_part: String,
    sub_part: String,
    q: QValue,
    parameters: BTreeMap<String, String>,
    original_index: usize,
}

impl HeaderElement {
    /// 単一の要素をパース
    ///
    /// # 例
    ///
    /// ```rust
    /// use shiguredo_negotiation::element::{HeaderElement, HeaderKind};
    ///
    /// let lang = HeaderElement::parse(HeaderKind::Language, "zh-Hans-CN;q=0.8").unwrap();
    /// assert_eq!(lang.element_type(), "zh-hans-cn");
    /// assert_eq!(lang.base_part(), "zh");
    /// assert_eq!(lang.sub_part(), "cn");
    /// assert_eq!(lang.quality(), 0.8);
    /// ```
    pub fn parse(kind: HeaderKind, input: &str) -> Result<Self, ElementError> {
        let value = input.trim();
        if value.is_empty() {
            return Err(ElementError::Empty);
        }

        let mut parts = split_unquoted(value, b';').into_iter();
        let primary = parts.next().unwrap_or("").trim();
        if primary.is_empty() {
            return Err(ElementError::InvalidFormat);
        }

        let (element_type, base_part, sub_part) = match kind {
            HeaderKind::Media => (parse_media_type(primary)?, String::new(), String::new()),
            HeaderKind::Language => parse_language_tag(primary)?,
            HeaderKind::Charset | HeaderKind::Encoding => {
                // 単一のトークンであること (空白を含まない)
                if primary.chars().any(char::is_whitespace) {
                    return Err(ElementError::InvalidToken);
                }
                (primary.to_ascii_lowercase(), String::new(), String::new())
            }
        };

        let mut parameters = BTreeMap::new();
        let mut q = QValue::default();
        let mut q_seen = false;

        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let (name, raw) = param
                .split_once('=')
                .ok_or(ElementError::InvalidParameter)?;
            let name = name.trim().to_ascii_lowercase();
            if !is_valid_token(&name) {
                return Err(ElementError::InvalidParameter);
            }
            let param_value = parse_param_value(raw)?;

            if name == "q" {
                if q_seen {
                    return Err(ElementError::InvalidQValue);
                }
                q = QValue::parse(&param_value)?;
                q_seen = true;
            } else if parameters.insert(name, param_value).is_some() {
                return Err(ElementError::InvalidParameter);
            }
        }

        let normalized_value = normalize(&element_type, &parameters);

        Ok(HeaderElement {
            kind,
            value: value.to_string(),
            normalized_value,
            element_type,
            base_part,
            sub_part,
            q,
            parameters,
            original_index: 0,
        })
    }

    /// ヘッダー種別
    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    /// 書かれたままの値 (前後の空白を除く)
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 正規化した値 (型 + キー順のパラメータ、q は含まない)
    pub fn normalized_value(&self) -> &str {
        &self.normalized_value
    }

    /// 小文字化した型 (例: "text/html", "en-us", "utf-8")
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// 言語タグの先頭サブタグ (言語以外は空)
    pub fn base_part(&self) -> &str {
        &self.base_part
    }

    /// 言語タグの末尾サブタグ (サブタグが 1 つのみ、または言語以外は空)
    pub fn sub_part(&self) -> &str {
        &self.sub_part
    }

    /// q 値
    pub fn qvalue(&self) -> QValue {
        self.q
    }

    /// q 値 (f32)
    pub fn quality(&self) -> f32 {
        self.q.as_f32()
    }

    /// パラメータ (q を除く、キーは小文字)
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// パラメータを取得 (名前の大文字小文字は区別しない)
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// 同じ入力からパースできた要素の中での位置
    pub fn original_index(&self) -> usize {
        self.original_index
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.original_index = index;
        self
    }

    pub(crate) fn with_qvalue(mut self, q: QValue) -> Self {
        self.q = q;
        self
    }
}

impl fmt::Display for HeaderElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized_value)?;
        if self.q.value() < 1000 {
            write!(f, "; q={}", self.q)?;
        }
        Ok(())
    }
}

/// カンマ区切りのヘッダー値を要素の列にパース
///
/// strict モードでは最初の不正な要素でエラーを返す。
/// 非 strict モードでは不正な要素を読み飛ばし、`original_index` は残った要素の中で振り直す。
/// 空の入力は strict かどうかに関わらずエラー。
pub fn parse_elements(
    kind: HeaderKind,
    source: &str,
    strict: bool,
) -> Result<Vec<HeaderElement>, ElementError> {
    if source.trim().is_empty() {
        return Err(ElementError::Empty);
    }
    parse_members(kind, &split_list(source), strict)
}

/// 空要素を除いたリストメンバー
pub(crate) fn split_list(source: &str) -> Vec<String> {
    split_unquoted(source.trim(), b',')
        .into_iter()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

pub(crate) fn parse_members(
    kind: HeaderKind,
    members: &[String],
    strict: bool,
) -> Result<Vec<HeaderElement>, ElementError> {
    let mut elements = Vec::with_capacity(members.len());
    for member in members {
        match HeaderElement::parse(kind, member) {
            Ok(element) => {
                let index = elements.len();
                elements.push(element.with_index(index));
            }
            Err(e) if strict => return Err(e),
            Err(_) => {}
        }
    }
    Ok(elements)
}

fn normalize(element_type: &str, parameters: &BTreeMap<String, String>) -> String {
    let mut normalized = element_type.to_string();
    for (name, value) in parameters {
        normalized.push_str("; ");
        normalized.push_str(name);
        normalized.push('=');
        push_param_value(&mut normalized, value);
    }
    normalized
}

fn parse_media_type(input: &str) -> Result<String, ElementError> {
    if input == "*" {
        return Ok("*/*".to_string());
    }

    // "/" がちょうど 1 つで、その両側が空でないこと
    let (media_type, subtype) = input
        .split_once('/')
        .ok_or(ElementError::InvalidMediaType)?;
    let media_type = media_type.trim();
    let subtype = subtype.trim();
    if media_type.is_empty() || subtype.is_empty() || subtype.contains('/') {
        return Err(ElementError::InvalidMediaType);
    }

    Ok(format!(
        "{}/{}",
        media_type.to_ascii_lowercase(),
        subtype.to_ascii_lowercase()
    ))
}

fn parse_language_tag(input: &str) -> Result<(String, String, String), ElementError> {
    if input == "*" {
        return Ok(("*".to_string(), "*".to_string(), String::new()));
    }

    let subtags: Vec<String> = input.split('-').map(|s| s.to_ascii_lowercase()).collect();
    if subtags.len() > 3 || subtags.iter().any(|subtag| subtag.is_empty()) {
        return Err(ElementError::InvalidLanguage);
    }

    let base_part = subtags[0].clone();
    // 3 サブタグ (言語-文字-地域) の場合、文字サブタグは sub_part に含めない
    let sub_part = if subtags.len() >= 2 {
        subtags[subtags.len() - 1].clone()
    } else {
        String::new()
    };

    Ok((subtags.join("-"), base_part, sub_part))
}

/// 引用符の外にある `delimiter` で分割する
///
/// 閉じられていない引用符は残り全体を 1 つの区間として扱う。
fn split_unquoted(input: &str, delimiter: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            // 引用符内のエスケープは次の 1 バイトを読み飛ばす
            b'\\' if quoted => i += 1,
            b'"' => quoted = !quoted,
            b if b == delimiter && !quoted => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&input[start..]);
    parts
}

/// パラメータ値 (token または quoted-string) を取り出す
fn parse_param_value(raw: &str) -> Result<String, ElementError> {
    let raw = raw.trim();
    let Some(body) = raw.strip_prefix('"') else {
        if is_valid_token(raw) {
            return Ok(raw.to_string());
        }
        return Err(ElementError::InvalidParameter);
    };

    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.push(chars.next().ok_or(ElementError::InvalidParameter)?),
            '"' if chars.as_str().trim().is_empty() => return Ok(value),
            '"' => return Err(ElementError::InvalidParameter),
            _ => value.push(c),
        }
    }
    Err(ElementError::InvalidParameter)
}

/// RFC 9110 Section 5.6.2 の token
fn is_valid_token(s: &str) -> bool {
    const DELIMITER_SAFE: &[u8] = b"!#$%&'*+-.^_`|~";
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || DELIMITER_SAFE.contains(&b))
}

/// token として書けない値を quoted-string にして追記する
fn push_param_value(out: &mut String, value: &str) {
    if is_valid_token(value) {
        out.push_str(value);
        return;
    }
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}
