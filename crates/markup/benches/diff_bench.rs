use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use markup::perf_fixtures::{make_blocks, make_edited_blocks};
use markup::{
    IdentityAttributes, InstructionDocument, TreeBuilderConfig, apply, build_dom, diff,
    parse_document, serialize, tokenize,
};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 5_000;
const EDIT_STRIDE: usize = 10;

fn policy() -> IdentityAttributes {
    IdentityAttributes::new(["id"])
}

fn bench_tokenize_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_tokenize_large", |b| {
        b.iter(|| {
            let stream = tokenize(black_box(&input)).expect("fixture tokenizes");
            black_box(stream.tokens().len());
        });
    });
}

fn bench_tree_build_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    let stream = tokenize(&input).expect("fixture tokenizes");
    c.bench_function("bench_tree_build_large", |b| {
        b.iter(|| {
            let dom = build_dom(black_box(&stream), TreeBuilderConfig::default());
            black_box(dom)
        });
    });
}

fn bench_diff_small(c: &mut Criterion) {
    let before = parse_document(&make_blocks(SMALL_BLOCKS)).expect("before parses");
    let after =
        parse_document(&make_edited_blocks(SMALL_BLOCKS, EDIT_STRIDE)).expect("after parses");
    let policy = policy();
    c.bench_function("bench_diff_small", |b| {
        b.iter(|| {
            let tree = diff(&policy, black_box(&before), black_box(&after)).expect("diff");
            black_box(tree.instruction_count());
        });
    });
}

fn bench_diff_large(c: &mut Criterion) {
    let before = parse_document(&make_blocks(LARGE_BLOCKS)).expect("before parses");
    let after =
        parse_document(&make_edited_blocks(LARGE_BLOCKS, EDIT_STRIDE)).expect("after parses");
    let policy = policy();
    c.bench_function("bench_diff_large", |b| {
        b.iter(|| {
            let tree = diff(&policy, black_box(&before), black_box(&after)).expect("diff");
            black_box(tree.instruction_count());
        });
    });
}

fn bench_serialize_and_reread_large(c: &mut Criterion) {
    let before = parse_document(&make_blocks(LARGE_BLOCKS)).expect("before parses");
    let after =
        parse_document(&make_edited_blocks(LARGE_BLOCKS, EDIT_STRIDE)).expect("after parses");
    let tree = diff(&policy(), &before, &after).expect("diff");
    c.bench_function("bench_serialize_and_reread_large", |b| {
        b.iter(|| {
            let text = serialize(black_box(&tree)).to_markup();
            let reread = InstructionDocument::parse(&text).expect("reread");
            black_box(reread)
        });
    });
}

fn bench_apply_large(c: &mut Criterion) {
    let before = parse_document(&make_blocks(LARGE_BLOCKS)).expect("before parses");
    let after =
        parse_document(&make_edited_blocks(LARGE_BLOCKS, EDIT_STRIDE)).expect("after parses");
    let patch = serialize(&diff(&policy(), &before, &after).expect("diff"));
    c.bench_function("bench_apply_large", |b| {
        b.iter_batched(
            || before.clone(),
            |mut target| {
                apply(black_box(&patch), &mut target).expect("apply");
                black_box(target)
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_tokenize_large,
    bench_tree_build_large,
    bench_diff_small,
    bench_diff_large,
    bench_serialize_and_reread_large,
    bench_apply_large
);
criterion_main!(benches);
