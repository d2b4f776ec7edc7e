//! コンテントネゴシエーション (RFC 9110 Section 12)
//!
//! ## 概要
//!
//! クライアントの Accept 系ヘッダーとサーバーが提供できる候補 (優先リスト) を突き合わせ、
//! q 値と一致の具体性から最適な候補を 1 つ選びます。
//!
//! 候補の順位は以下の順に比較します。
//!
//! 1. 一致したヘッダー要素の q 値 (q=0 の要素は一致しない)
//! 2. 一致の具体性
//! 3. 優先リスト内の位置 (前にあるほど優先)
//! 4. ヘッダー内の位置 (前にあるほど優先)
//!
//! 具体性は種別ごとに以下の通りです (大きいほど具体的)。
//!
//! ```text
//! Accept:           4 型とパラメータが完全一致
//!                   3 型が一致 (パラメータは問わない)
//!                   2 +suffix 一致 (application/json と application/vnd.api+json)
//!                   1 type/* 一致
//!                   0 */* 一致
//! Accept-Language:  3 完全一致
//!                   2 サブタグ境界での前方一致 (en と en-us)
//!                   1 *
//! Accept-Charset /
//! Accept-Encoding:  2 完全一致
//!                   1 *
//! ```
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_negotiation::negotiator::Negotiator;
//!
//! let negotiator = Negotiator::media();
//! let best = negotiator
//!     .negotiate("text/html;q=0.5, application/json;q=0.9", &["application/json", "text/html"], false)
//!     .unwrap();
//! assert_eq!(best.element_type(), "application/json");
//! assert_eq!(best.qvalue().value(), 900);
//! ```

use crate::element::{self, HeaderElement, HeaderKind, QValue};
use crate::error::NegotiationError;
use crate::limits::NegotiationLimits;

/// ネゴシエーター
///
/// ヘッダー種別と制限設定のみを保持する不変な値。制限はデフォルトでは無効。
/// strict モードは呼び出しごとに指定する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiator {
    kind: HeaderKind,
    limits: NegotiationLimits,
}

impl Negotiator {
    /// 指定した種別のネゴシエーターを作成
    ///
    /// 制限はかからない。信頼できない入力を扱う場合は [`Negotiator::with_limits`] で
    /// [`NegotiationLimits::default()`] などを設定する。
    pub fn new(kind: HeaderKind) -> Self {
        Negotiator {
            kind,
            limits: NegotiationLimits::unlimited(),
        }
    }

    /// Accept 用
    pub fn media() -> Self {
        Self::new(HeaderKind::Media)
    }

    /// Accept-Language 用
    pub fn language() -> Self {
        Self::new(HeaderKind::Language)
    }

    /// Accept-Charset 用
    pub fn charset() -> Self {
        Self::new(HeaderKind::Charset)
    }

    /// Accept-Encoding 用
    pub fn encoding() -> Self {
        Self::new(HeaderKind::Encoding)
    }

    /// 制限設定を変更
    pub fn with_limits(mut self, limits: NegotiationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// ヘッダー種別
    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    /// 制限設定
    pub fn limits(&self) -> &NegotiationLimits {
        &self.limits
    }

    /// ヘッダーと優先リストから最適な候補を選ぶ
    ///
    /// 戻り値は優先リスト側の要素で、q 値は一致したヘッダー要素の値に置き換わる。
    ///
    /// # エラー
    ///
    /// - 空のヘッダー、空の優先リスト: [`NegotiationError::InvalidArgument`]
    /// - strict モードで不正なヘッダー要素: [`NegotiationError::InvalidHeader`]
    /// - strict モードで不正な優先リスト要素: [`NegotiationError::InvalidMediaType`] /
    ///   [`NegotiationError::InvalidLanguage`] / [`NegotiationError::InvalidPriority`]
    /// - 一致なし: [`NegotiationError::NoAcceptableMatch`]
    pub fn negotiate<S: AsRef<str>>(
        &self,
        header: &str,
        priorities: &[S],
        strict: bool,
    ) -> Result<HeaderElement, NegotiationError> {
        if priorities.is_empty() {
            return Err(NegotiationError::InvalidArgument("empty priority list"));
        }
        if header.trim().is_empty() {
            return Err(NegotiationError::InvalidArgument("empty header"));
        }
        self.check_header_size(header)?;
        if priorities.len() > self.limits.max_elements {
            return Err(NegotiationError::TooManyElements {
                count: priorities.len(),
                limit: self.limits.max_elements,
            });
        }

        let offers = self.parse_priorities(priorities, strict)?;
        let accepted = self.parse_header(header, strict)?;

        let mut best: Option<Candidate<'_>> = None;
        for (position, offer) in &offers {
            let Some(candidate) = self.best_for_offer(*position, offer, &accepted) else {
                continue;
            };
            if best.as_ref().is_none_or(|b| candidate.rank() > b.rank()) {
                best = Some(candidate);
            }
        }

        best.map(|candidate| candidate.offer.clone().with_qvalue(candidate.quality))
            .ok_or(NegotiationError::NoAcceptableMatch)
    }

    /// ヘッダーを q 値の降順に並べた要素列を返す
    ///
    /// 同じ q 値の要素は元の順序を保つ。不正な要素は読み飛ばすため、
    /// 有効な要素がない場合は空の列になる。空のヘッダーはエラー。
    pub fn ordered_elements(&self, header: &str) -> Result<Vec<HeaderElement>, NegotiationError> {
        if header.trim().is_empty() {
            return Err(NegotiationError::InvalidArgument("empty header"));
        }
        self.check_header_size(header)?;
        self.parse_header(header, false)
    }

    fn check_header_size(&self, header: &str) -> Result<(), NegotiationError> {
        if header.len() > self.limits.max_header_size {
            return Err(NegotiationError::HeaderTooLong {
                size: header.len(),
                limit: self.limits.max_header_size,
            });
        }
        Ok(())
    }

    fn parse_header(
        &self,
        header: &str,
        strict: bool,
    ) -> Result<Vec<HeaderElement>, NegotiationError> {
        let members = element::split_list(header);
        if members.len() > self.limits.max_elements {
            return Err(NegotiationError::TooManyElements {
                count: members.len(),
                limit: self.limits.max_elements,
            });
        }

        let mut elements = element::parse_members(self.kind, &members, strict)
            .map_err(NegotiationError::InvalidHeader)?;
        // sort_by は安定ソート
        elements.sort_by(|a, b| b.qvalue().cmp(&a.qvalue()));
        Ok(elements)
    }

    /// (優先リスト内の位置, 要素) の列を返す
    ///
    /// 非 strict モードで読み飛ばした要素があっても位置は元の優先リストのまま。
    fn parse_priorities<S: AsRef<str>>(
        &self,
        priorities: &[S],
        strict: bool,
    ) -> Result<Vec<(usize, HeaderElement)>, NegotiationError> {
        let mut offers = Vec::with_capacity(priorities.len());
        for (position, priority) in priorities.iter().enumerate() {
            let priority = priority.as_ref();
            match HeaderElement::parse(self.kind, priority) {
                Ok(offer) => {
                    let index = offers.len();
                    offers.push((position, offer.with_index(index)));
                }
                Err(e) if strict => return Err(NegotiationError::from_priority(e, priority)),
                Err(_) => {}
            }
        }
        Ok(offers)
    }

    fn best_for_offer<'a>(
        &self,
        position: usize,
        offer: &'a HeaderElement,
        accepted: &[HeaderElement],
    ) -> Option<Candidate<'a>> {
        let matches: Vec<(&HeaderElement, u8)> = accepted
            .iter()
            .filter_map(|h| specificity(self.kind, h, offer).map(|tier| (h, tier)))
            .collect();

        // 最も具体的に一致したヘッダー要素が q=0 なら、その候補は明示的に拒否されている
        let top_tier = matches.iter().map(|(_, tier)| *tier).max()?;
        if matches
            .iter()
            .any(|(h, tier)| *tier == top_tier && h.qvalue().is_zero())
        {
            return None;
        }

        matches
            .into_iter()
            .filter(|(h, _)| !h.qvalue().is_zero())
            .map(|(h, tier)| Candidate {
                quality: h.qvalue(),
                tier,
                position,
                header_index: h.original_index(),
                offer,
            })
            .max_by_key(|candidate| candidate.rank())
    }
}

impl Default for Negotiator {
    fn default() -> Self {
        Self::media()
    }
}

struct Candidate<'a> {
    quality: QValue,
    tier: u8,
    position: usize,
    header_index: usize,
    offer: &'a HeaderElement,
}

impl Candidate<'_> {
    /// 大きいほど優先される順位キー
    fn rank(&self) -> (QValue, u8, core::cmp::Reverse<usize>, core::cmp::Reverse<usize>) {
        (
            self.quality,
            self.tier,
            core::cmp::Reverse(self.position),
            core::cmp::Reverse(self.header_index),
        )
    }
}

/// ヘッダー要素と優先リスト要素の一致の具体性 (一致しない場合は None)
fn specificity(kind: HeaderKind, accepted: &HeaderElement, offer: &HeaderElement) -> Option<u8> {
    match kind {
        HeaderKind::Media => media_specificity(accepted, offer),
        HeaderKind::Language => language_specificity(accepted.element_type(), offer.element_type()),
        HeaderKind::Charset | HeaderKind::Encoding => {
            token_specificity(accepted.element_type(), offer.element_type())
        }
    }
}

fn media_specificity(accepted: &HeaderElement, offer: &HeaderElement) -> Option<u8> {
    if accepted.element_type() == offer.element_type() {
        // パラメータのキーはパース時に小文字化済み、値は大文字小文字を区別する
        return Some(if accepted.parameters() == offer.parameters() { 4 } else { 3 });
    }

    let (accepted_type, accepted_subtype) = split_media_type(accepted.element_type());
    let (offer_type, offer_subtype) = split_media_type(offer.element_type());

    if accepted_type == offer_type && !accepted_subtype.contains('+') {
        if let Some((_, suffix)) = offer_subtype.rsplit_once('+') {
            if suffix == accepted_subtype {
                return Some(2);
            }
        }
    }

    if accepted_type == "*" && accepted_subtype == "*" {
        return Some(0);
    }

    if accepted_subtype == "*" && accepted_type == offer_type {
        return Some(1);
    }

    None
}

fn split_media_type(media_type: &str) -> (&str, &str) {
    media_type.split_once('/').unwrap_or((media_type, ""))
}

fn language_specificity(accepted: &str, offer: &str) -> Option<u8> {
    if accepted == offer {
        return Some(3);
    }
    if is_subtag_prefix(accepted, offer) || is_subtag_prefix(offer, accepted) {
        return Some(2);
    }
    if accepted == "*" {
        return Some(1);
    }
    None
}

/// RFC 4647 Section 3.3.1 の basic filtering (サブタグ境界での前方一致)
fn is_subtag_prefix(prefix: &str, tag: &str) -> bool {
    tag.len() > prefix.len()
        && tag.starts_with(prefix)
        && tag.as_bytes()[prefix.len()] == b'-'
}

fn token_specificity(accepted: &str, offer: &str) -> Option<u8> {
    if accepted == offer {
        return Some(2);
    }
    if accepted == "*" {
        return Some(1);
    }
    None
}
