pub const BLOCK_TEMPLATE: &str =
    "<item id=\"{n}\" class=\"box\"><title>hello {n}</title><!--note--><img src=\"x\"/></item>";

/// A `<feed>` document with `blocks` items whose ids are `0..blocks`.
pub fn make_blocks(blocks: usize) -> String {
    let mut out = String::with_capacity(BLOCK_TEMPLATE.len() * blocks + 16);
    out.push_str("<feed>");
    for n in 0..blocks {
        out.push_str(&BLOCK_TEMPLATE.replace("{n}", &n.to_string()));
    }
    out.push_str("</feed>");
    out
}

/// Like [`make_blocks`], with every `stride`-th item retitled and every `stride`-th item
/// (offset by one) dropped.
pub fn make_edited_blocks(blocks: usize, stride: usize) -> String {
    let stride = stride.max(2);
    let mut out = String::with_capacity(BLOCK_TEMPLATE.len() * blocks + 16);
    out.push_str("<feed>");
    for n in 0..blocks {
        if n % stride == 1 {
            continue;
        }
        let block = BLOCK_TEMPLATE.replace("{n}", &n.to_string());
        if n % stride == 0 {
            out.push_str(&block.replace("hello", "edited"));
        } else {
            out.push_str(&block);
        }
    }
    out.push_str("</feed>");
    out
}
