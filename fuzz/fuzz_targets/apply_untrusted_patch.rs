#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::{InstructionDocument, apply, parse_document};

const TARGET: &str = "<root a=\"1\"><x>t<!--c--></x><y/><!--d--></root>";

// Arbitrary instruction documents may fail, but never panic.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(patch) = InstructionDocument::parse(input) else {
        return;
    };
    let Ok(mut target) = parse_document(TARGET) else {
        return;
    };
    let _ = apply(&patch, &mut target);
});
