/// ネゴシエーションの制限設定
///
/// [`Negotiator`](crate::Negotiator) は制限なしで作成される。`Default` の値は
/// 信頼できない入力向けの目安で、`with_limits` で明示的に設定する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiationLimits {
    /// 最大ヘッダー長 (デフォルト: 8KB)
    pub max_header_size: usize,
    /// 最大要素数 (デフォルト: 100)
    ///
    /// ヘッダーのリストメンバー数と優先リストの要素数の両方に適用する。
    /// ペアごとの一致判定は両者の積に比例するため、両側を制限する。
    pub max_elements: usize,
}

impl Default for NegotiationLimits {
    fn default() -> Self {
        Self {
            max_header_size: 8 * 1024, // 8KB
            max_elements: 100,
        }
    }
}

impl NegotiationLimits {
    /// 制限なしの設定を作成
    pub fn unlimited() -> Self {
        Self {
            max_header_size: usize::MAX,
            max_elements: usize::MAX,
        }
    }
}
