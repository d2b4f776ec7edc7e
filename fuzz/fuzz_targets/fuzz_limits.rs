#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shiguredo_negotiation::{NegotiationError, NegotiationLimits, Negotiator};

#[derive(Arbitrary, Debug)]
struct FuzzLimits {
    max_header_size: u16,
    max_elements: u8,
    header: String,
    priorities: Vec<String>,
}

fn build_limits(input: &FuzzLimits) -> NegotiationLimits {
    NegotiationLimits {
        max_header_size: input.max_header_size as usize,
        max_elements: input.max_elements as usize,
    }
}

fuzz_target!(|input: FuzzLimits| {
    let limits = build_limits(&input);
    let negotiator = Negotiator::media().with_limits(limits);

    match negotiator.negotiate(&input.header, &input.priorities, false) {
        Err(NegotiationError::HeaderTooLong { size, limit }) => assert!(size > limit),
        Err(NegotiationError::TooManyElements { count, limit }) => assert!(count > limit),
        _ => {}
    }
});
