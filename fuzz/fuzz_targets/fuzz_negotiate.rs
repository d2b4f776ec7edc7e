#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shiguredo_negotiation::{HeaderKind, Negotiator};

#[derive(Arbitrary, Debug)]
struct FuzzNegotiation {
    kind: u8,
    header: String,
    priorities: Vec<String>,
    strict: bool,
}

fuzz_target!(|input: FuzzNegotiation| {
    let kind = match input.kind % 4 {
        0 => HeaderKind::Media,
        1 => HeaderKind::Language,
        2 => HeaderKind::Charset,
        _ => HeaderKind::Encoding,
    };
    let negotiator = Negotiator::new(kind);

    if let Ok(best) = negotiator.negotiate(&input.header, &input.priorities, input.strict) {
        assert!(!best.qvalue().is_zero());
        assert!(best.original_index() < input.priorities.len());
    }

    if let Ok(elements) = negotiator.ordered_elements(&input.header) {
        for pair in elements.windows(2) {
            assert!(pair[0].qvalue() >= pair[1].qvalue());
        }
    }
});
