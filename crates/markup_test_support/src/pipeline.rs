use crate::{diff_lines, escape_text};
use markup::dom_snapshot::{DomSnapshot, DomSnapshotOptions, compare_dom};
use markup::{Document, InstructionDocument, MatchDecision, apply, diff, parse_document, serialize};

/// Everything produced by one pass through the pipeline.
#[derive(Debug)]
pub struct RoundTrip {
    pub patch_text: String,
    pub instruction_count: usize,
    pub patched: Document,
    pub expected: Document,
}

/// Reads both documents, diffs them, writes the instruction document out as text, reads it
/// back, and applies it to a fresh copy of `before`.
pub fn round_trip<M: MatchDecision + ?Sized>(
    policy: &M,
    before: &str,
    after: &str,
) -> Result<RoundTrip, String> {
    let mut patched = parse_document(before).map_err(|err| format!("before: {err}"))?;
    let expected = parse_document(after).map_err(|err| format!("after: {err}"))?;
    let tree = diff(policy, &patched, &expected).map_err(|err| format!("diff: {err}"))?;
    let patch_text = serialize(&tree).to_markup();
    let reread =
        InstructionDocument::parse(&patch_text).map_err(|err| format!("reread: {err}"))?;
    apply(&reread, &mut patched).map_err(|err| format!("apply: {err}\n{patch_text}"))?;
    Ok(RoundTrip {
        patch_text,
        instruction_count: tree.instruction_count(),
        patched,
        expected,
    })
}

/// Panics with a snapshot diff unless the patched document equals `after`, whitespace-only
/// text and attribute order aside.
pub fn assert_round_trip<M: MatchDecision + ?Sized>(
    name: &str,
    policy: &M,
    before: &str,
    after: &str,
) -> RoundTrip {
    let result = round_trip(policy, before, after)
        .unwrap_or_else(|err| panic!("[{name}] pipeline failed: {err}"));
    let options = DomSnapshotOptions::default();
    if let Err(mismatch) = compare_dom(&result.expected, &result.patched, options) {
        let expected = DomSnapshot::new(&result.expected, options);
        let actual = DomSnapshot::new(&result.patched, options);
        panic!(
            "[{name}] patched document differs from after at {}: {}\n{}\npatch: {}",
            mismatch.path(),
            mismatch.detail(),
            diff_lines(expected.as_lines(), actual.as_lines()),
            escape_text(&result.patch_text)
        );
    }
    result
}
