//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// 言語タグ生成 (BCP 47/RFC 5646)
// ========================================

/// 先頭サブタグ: ALPHA のみ (1-8 文字)
pub fn language_primary_subtag() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,8}".prop_map(|s| s)
}

/// 後続サブタグ: ALPHA / DIGIT (1-8 文字)
pub fn language_subsequent_subtag() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,8}".prop_map(|s| s)
}

/// 言語タグ: primary-subtag *2("-" subtag)
pub fn language_tag() -> impl Strategy<Value = String> {
    (
        language_primary_subtag(),
        proptest::collection::vec(language_subsequent_subtag(), 0..=2),
    )
        .prop_map(|(primary, rest)| {
            if rest.is_empty() {
                primary
            } else {
                format!("{}-{}", primary, rest.join("-"))
            }
        })
}

// ========================================
// メディアタイプ生成
// ========================================

/// メディアタイプ (type/subtype、大文字を含む)
pub fn media_type() -> impl Strategy<Value = String> {
    ("[A-Za-z]{1,8}", "[A-Za-z0-9.-]{1,8}")
        .prop_map(|(media_type, subtype)| format!("{}/{}", media_type, subtype))
}

/// メディアレンジ (*/*, type/*, type/subtype)
pub fn media_range() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("*/*".to_string()),
        "[a-z]{1,8}".prop_map(|media_type| format!("{}/*", media_type)),
        media_type(),
    ]
}

/// パラメータ (q 以外の名前)
pub fn parameter() -> impl Strategy<Value = (String, String)> {
    ("[a-pr-z][a-pr-z0-9]{0,7}", "[a-zA-Z0-9]{1,8}")
}

// ========================================
// q 値
// ========================================

/// ミリ単位の q 値を文字列にする
pub fn qvalue_string(value: u16) -> String {
    if value >= 1000 {
        return "1".to_string();
    }
    if value == 0 {
        return "0".to_string();
    }

    let mut frac = format!("{:03}", value);
    while frac.ends_with('0') {
        frac.pop();
    }
    format!("0.{}", frac)
}

/// q パラメータを付けた要素
pub fn with_qvalue(element: &str, value: u16) -> String {
    if value >= 1000 {
        element.to_string()
    } else {
        format!("{};q={}", element, qvalue_string(value))
    }
}
