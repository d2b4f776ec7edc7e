#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_negotiation::element::{parse_elements, HeaderElement, HeaderKind, QValue};

const KINDS: [HeaderKind; 4] = [
    HeaderKind::Media,
    HeaderKind::Language,
    HeaderKind::Charset,
    HeaderKind::Encoding,
];

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for kind in KINDS {
            if let Ok(elements) = parse_elements(kind, s, false) {
                for (index, element) in elements.iter().enumerate() {
                    assert_eq!(element.original_index(), index);
                    assert!(element.qvalue().value() <= 1000);
                    let _ = element.value();
                    let _ = element.base_part();
                    let _ = element.sub_part();
                    let _ = element.to_string();

                    let reparsed = HeaderElement::parse(kind, element.normalized_value())
                        .expect("normalized value must parse");
                    assert_eq!(reparsed.normalized_value(), element.normalized_value());
                    assert_eq!(reparsed.qvalue(), QValue::ONE);
                }
            }

            let _ = parse_elements(kind, s, true);
        }
    }
});
