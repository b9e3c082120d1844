#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::dom_snapshot::{DomSnapshotOptions, assert_dom_eq};
use markup::{
    DiffError, IdentityAttributes, InstructionDocument, apply, diff, parse_document, serialize,
};

// Input is two documents separated by a NUL byte. Any pair the reader accepts must round-trip.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Some((before, after)) = input.split_once('\0') else {
        return;
    };
    let (Ok(before), Ok(after)) = (parse_document(before), parse_document(after)) else {
        return;
    };
    let policy = IdentityAttributes::new(["id"]);
    let tree = match diff(&policy, &before, &after) {
        Ok(tree) => tree,
        Err(DiffError::NestingTooDeep { .. }) => return,
        Err(err) => panic!("readable documents always diff: {err}"),
    };
    let text = serialize(&tree).to_markup();
    let patch = InstructionDocument::parse(&text).expect("serialized patch reads back");
    let mut patched = before.clone();
    apply(&patch, &mut patched).expect("own patch applies");
    assert_dom_eq(&after, &patched, DomSnapshotOptions::default());
});
