//! ネゴシエーションのプロパティテスト

use pbt::{language_tag, media_type, parameter, with_qvalue};
use proptest::prelude::*;
use shiguredo_negotiation::{HeaderElement, HeaderKind, NegotiationError, Negotiator};

fn weighted_media(max: usize) -> impl Strategy<Value = Vec<(String, u16)>> {
    proptest::collection::vec((media_type(), 0u16..=1000u16), 1..max)
}

fn header_from(items: &[(String, u16)]) -> String {
    items
        .iter()
        .map(|(element, q)| with_qvalue(element, *q))
        .collect::<Vec<_>>()
        .join(", ")
}

// ========================================
// ordered_elements
// ========================================

// q 値の降順かつ同じ q 値では元の順序を保つ
proptest! {
    #[test]
    fn ordered_elements_sorted_and_stable(items in weighted_media(8)) {
        let header = header_from(&items);
        let elements = Negotiator::media().ordered_elements(&header).unwrap();
        prop_assert_eq!(elements.len(), items.len());

        for pair in elements.windows(2) {
            prop_assert!(pair[0].qvalue() >= pair[1].qvalue());
            if pair[0].qvalue() == pair[1].qvalue() {
                prop_assert!(pair[0].original_index() < pair[1].original_index());
            }
        }

        let mut expected: Vec<usize> = (0..items.len()).collect();
        expected.sort_by(|a, b| items[*b].1.cmp(&items[*a].1));
        let actual: Vec<usize> = elements.iter().map(HeaderElement::original_index).collect();
        prop_assert_eq!(actual, expected);
    }
}

// ========================================
// negotiate
// ========================================

// 結果は必ず優先リストの要素で、q=0 にはならない
proptest! {
    #[test]
    fn negotiate_result_is_offer_with_positive_quality(
        items in weighted_media(6),
        offers in proptest::collection::vec(media_type(), 1..6),
        strict in any::<bool>()
    ) {
        let header = header_from(&items);
        match Negotiator::media().negotiate(&header, &offers, strict) {
            Ok(best) => {
                prop_assert!(!best.qvalue().is_zero());
                prop_assert!((0.0..=1.0).contains(&best.quality()));
                prop_assert!(offers
                    .iter()
                    .any(|offer| offer.to_ascii_lowercase() == best.element_type()));
            }
            Err(e) => prop_assert_eq!(e, NegotiationError::NoAcceptableMatch),
        }
    }
}

// */* は常に最初の優先リスト要素を選ぶ
proptest! {
    #[test]
    fn negotiate_full_wildcard_picks_first_offer(
        offers in proptest::collection::vec(media_type(), 1..6)
    ) {
        let best = Negotiator::media().negotiate("*/*", &offers, true).unwrap();
        prop_assert_eq!(best.element_type(), offers[0].to_ascii_lowercase());
        prop_assert_eq!(best.value(), offers[0].as_str());
    }
}

// 完全一致のパラメータ比較はキーの大文字小文字を区別せず、対称
proptest! {
    #[test]
    fn negotiate_exact_parameters_symmetric(
        media in media_type(),
        params in proptest::collection::btree_map("[a-pr-z]{1,8}", "[a-zA-Z0-9]{1,8}", 1..4)
    ) {
        let lower = params
            .iter()
            .fold(media.clone(), |acc, (k, v)| format!("{};{}={}", acc, k, v));
        let upper = params
            .iter()
            .fold(media.clone(), |acc, (k, v)| format!("{};{}={}", acc, k.to_ascii_uppercase(), v));

        let negotiator = Negotiator::media();
        let forward = negotiator.negotiate(&lower, &[upper.as_str()], true).unwrap();
        let backward = negotiator.negotiate(&upper, &[lower.as_str()], true).unwrap();
        prop_assert_eq!(forward.normalized_value(), backward.normalized_value());
        prop_assert_eq!(forward.parameters(), backward.parameters());
    }
}

// パラメータが異なっても型が同じなら一致し、パラメータまで一致する候補が優先される
proptest! {
    #[test]
    fn negotiate_parameter_mismatch(
        media in media_type(),
        (name, value) in parameter(),
        q in 1u16..=1000u16
    ) {
        let header = with_qvalue(&format!("{};{}={}", media, name, value), q);
        let exact = format!("{};{}={}", media, name, value);
        let other = format!("{};{}={}x", media, name, value);
        let negotiator = Negotiator::media();

        let best = negotiator.negotiate(&header, &[other.as_str()], true).unwrap();
        prop_assert_eq!(best.value(), other.as_str());
        prop_assert_eq!(best.qvalue().value(), q);

        let best = negotiator
            .negotiate(&header, &[other.as_str(), exact.as_str()], true)
            .unwrap();
        prop_assert_eq!(best.value(), exact.as_str());
    }
}

// 言語の前方一致はサブタグ境界でのみ成立する
proptest! {
    #[test]
    fn language_prefix_match(tag in language_tag(), extra in "[a-z]{1,8}") {
        let negotiator = Negotiator::language();
        let longer = format!("{}-{}", tag, extra);

        let best = negotiator.negotiate(&tag, &[longer.as_str()], false);
        if longer.split('-').count() <= 3 {
            let best = best.unwrap();
            prop_assert_eq!(best.element_type(), longer.to_ascii_lowercase());
        } else {
            prop_assert_eq!(best, Err(NegotiationError::NoAcceptableMatch));
        }

        let glued = format!("{}{}", tag, extra);
        prop_assert_eq!(
            negotiator.negotiate(&tag, &[glued], false),
            Err(NegotiationError::NoAcceptableMatch)
        );
    }
}

// 空のヘッダーと空の優先リストは strict に関わらず InvalidArgument
proptest! {
    #[test]
    fn empty_inputs_are_invalid_arguments(
        kind in prop_oneof![
            Just(HeaderKind::Media),
            Just(HeaderKind::Language),
            Just(HeaderKind::Charset),
            Just(HeaderKind::Encoding),
        ],
        strict in any::<bool>(),
        spaces in " {0,4}"
    ) {
        let negotiator = Negotiator::new(kind);
        let no_offers: [&str; 0] = [];
        prop_assert!(matches!(
            negotiator.negotiate("*", &no_offers, strict),
            Err(NegotiationError::InvalidArgument(_))
        ));
        prop_assert!(matches!(
            negotiator.negotiate(&spaces, &["*"], strict),
            Err(NegotiationError::InvalidArgument(_))
        ));
    }
}
