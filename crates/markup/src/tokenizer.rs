//! Tokenizer for the pragmatic XML subset read by the tree builder.
//!
//! Supported: elements with case-preserved names (`[A-Za-z0-9:_.-]`), quoted or bare attribute
//! values, self-closing tags, text, comments, predefined and numeric character references.
//! Skipped: a leading `<?xml …?>` declaration and `<!DOCTYPE name>` without an internal subset.
//!
//! Rejected with a typed `ParseError` (positions are byte offsets into the input):
//! - CDATA sections,
//! - other processing instructions,
//! - document type declarations carrying an internal subset,
//! - unresolved entity references,
//! - duplicate attributes and unterminated constructs.
use crate::entities::decode_entities;
use crate::types::{Token, TokenStream};
use memchr::memchr;
use thiserror::Error;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const CDATA_START: &str = "<![CDATA[";
const PI_END: &str = "?>";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unresolved entity reference `&{name};` at byte {position}")]
    UnresolvedEntity { name: String, position: usize },
    #[error("CDATA sections are not supported (byte {position})")]
    UnsupportedCData { position: usize },
    #[error("processing instructions are not supported (byte {position})")]
    UnsupportedProcessingInstruction { position: usize },
    #[error("document type declarations with an internal subset are not supported (byte {position})")]
    UnsupportedDoctype { position: usize },
    #[error("unterminated {construct} starting at byte {position}")]
    Unterminated {
        construct: &'static str,
        position: usize,
    },
    #[error("invalid tag at byte {position}: {reason}")]
    InvalidTag {
        position: usize,
        reason: &'static str,
    },
    #[error("duplicate attribute `{name}` at byte {position}")]
    DuplicateAttribute { name: String, position: usize },
    #[error("end tag `</{found}>` at byte {position} does not close `<{expected}>`")]
    MismatchedEndTag {
        expected: String,
        found: String,
        position: usize,
    },
    #[error("end tag `</{name}>` at byte {position} has no open element")]
    UnexpectedEndTag { name: String, position: usize },
    #[error("element `<{name}>` is never closed")]
    UnclosedElement { name: String },
    #[error("text outside the root element at byte {position}")]
    TextOutsideRoot { position: usize },
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

/// Tokenizes `input` into a flat token stream. Tag balance is checked by the tree builder.
pub fn tokenize(input: &str) -> Result<TokenStream, ParseError> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    // Invariant: slice endpoints are only ever taken at ASCII structural bytes, so they stay on
    // UTF-8 char boundaries.
    if input.starts_with('\u{FEFF}') {
        i = '\u{FEFF}'.len_utf8();
    }
    let prolog_start = i;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            i = memchr(b'<', &bytes[i..]).map_or(bytes.len(), |rel| i + rel);
            let text = decode_entities(&input[start..i], start)?;
            out.push(Token::Text {
                text,
                position: start,
            });
            continue;
        }

        let rest = &input[i..];
        if rest.starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            let Some(end) = input[body_start..].find(COMMENT_END) else {
                return Err(ParseError::Unterminated {
                    construct: "comment",
                    position: i,
                });
            };
            out.push(Token::Comment {
                text: input[body_start..body_start + end].to_string(),
                position: i,
            });
            i = body_start + end + COMMENT_END.len();
            continue;
        }
        if rest.starts_with(CDATA_START) {
            return Err(ParseError::UnsupportedCData { position: i });
        }
        if rest.starts_with("<?") {
            let is_declaration = i == prolog_start
                && rest.starts_with("<?xml")
                && rest[5..].starts_with(|c: char| c == '?' || c.is_ascii_whitespace());
            if !is_declaration {
                return Err(ParseError::UnsupportedProcessingInstruction { position: i });
            }
            let Some(end) = rest.find(PI_END) else {
                return Err(ParseError::Unterminated {
                    construct: "XML declaration",
                    position: i,
                });
            };
            i += end + PI_END.len();
            continue;
        }
        if starts_with_ignore_ascii_case_at(bytes, i, b"<!doctype") {
            let Some(end) = memchr(b'>', &bytes[i..]) else {
                return Err(ParseError::Unterminated {
                    construct: "doctype",
                    position: i,
                });
            };
            if memchr(b'[', &bytes[i..i + end]).is_some() {
                return Err(ParseError::UnsupportedDoctype { position: i });
            }
            i += end + 1;
            continue;
        }
        if rest.starts_with("<!") {
            return Err(ParseError::InvalidTag {
                position: i,
                reason: "unknown markup declaration",
            });
        }

        if bytes.get(i + 1) == Some(&b'/') {
            i = scan_end_tag(input, i, &mut out)?;
        } else {
            i = scan_start_tag(input, i, &mut out)?;
        }
    }

    log::trace!(target: "markup.tokenizer", "tokenized {} bytes into {} tokens", input.len(), out.len());
    Ok(TokenStream::new(out))
}

fn scan_name(bytes: &[u8], start: usize) -> usize {
    let mut j = start;
    while j < bytes.len() && is_name_char(bytes[j]) {
        j += 1;
    }
    j
}

fn skip_space(bytes: &[u8], mut k: usize) -> usize {
    while k < bytes.len() && is_space(bytes[k]) {
        k += 1;
    }
    k
}

// `start` points at `<` of `</name>`; returns the index after `>`.
fn scan_end_tag(input: &str, start: usize, out: &mut Vec<Token>) -> Result<usize, ParseError> {
    let bytes = input.as_bytes();
    let name_start = start + 2;
    let name_end = scan_name(bytes, name_start);
    if name_end == name_start {
        return Err(ParseError::InvalidTag {
            position: start,
            reason: "end tag without a name",
        });
    }
    let k = skip_space(bytes, name_end);
    match bytes.get(k) {
        Some(b'>') => {}
        Some(_) => {
            return Err(ParseError::InvalidTag {
                position: start,
                reason: "unexpected character in end tag",
            });
        }
        None => {
            return Err(ParseError::Unterminated {
                construct: "end tag",
                position: start,
            });
        }
    }
    out.push(Token::EndTag {
        name: input[name_start..name_end].to_string(),
        position: start,
    });
    Ok(k + 1)
}

// `start` points at `<` of a start tag; returns the index after `>` or `/>`.
fn scan_start_tag(input: &str, start: usize, out: &mut Vec<Token>) -> Result<usize, ParseError> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let name_start = start + 1;
    let name_end = scan_name(bytes, name_start);
    if name_end == name_start {
        return Err(ParseError::InvalidTag {
            position: start,
            reason: "start tag without a name",
        });
    }
    let name = input[name_start..name_end].to_string();
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut k = name_end;

    loop {
        let before_space = k;
        k = skip_space(bytes, k);
        match bytes.get(k) {
            None => {
                return Err(ParseError::Unterminated {
                    construct: "start tag",
                    position: start,
                });
            }
            Some(b'>') => {
                out.push(Token::StartTag {
                    name,
                    attributes,
                    self_closing: false,
                    position: start,
                });
                return Ok(k + 1);
            }
            Some(b'/') => {
                if bytes.get(k + 1) != Some(&b'>') {
                    return Err(ParseError::InvalidTag {
                        position: k,
                        reason: "`/` not followed by `>`",
                    });
                }
                out.push(Token::StartTag {
                    name,
                    attributes,
                    self_closing: true,
                    position: start,
                });
                return Ok(k + 2);
            }
            Some(_) => {}
        }

        if k == before_space {
            return Err(ParseError::InvalidTag {
                position: k,
                reason: "attributes must be separated by whitespace",
            });
        }
        let attr_start = k;
        let attr_end = scan_name(bytes, attr_start);
        if attr_end == attr_start {
            return Err(ParseError::InvalidTag {
                position: k,
                reason: "invalid character in tag",
            });
        }
        let attr_name = &input[attr_start..attr_end];
        if attributes.iter().any(|(existing, _)| existing == attr_name) {
            return Err(ParseError::DuplicateAttribute {
                name: attr_name.to_string(),
                position: attr_start,
            });
        }

        let after_name = skip_space(bytes, attr_end);
        let value = if bytes.get(after_name) == Some(&b'=') {
            k = skip_space(bytes, after_name + 1);
            match bytes.get(k) {
                Some(&quote @ (b'"' | b'\'')) => {
                    let value_start = k + 1;
                    let Some(rel) = memchr(quote, &bytes[value_start..]) else {
                        return Err(ParseError::Unterminated {
                            construct: "attribute value",
                            position: k,
                        });
                    };
                    let value_end = value_start + rel;
                    k = value_end + 1;
                    decode_entities(&input[value_start..value_end], value_start)?
                }
                Some(_) => {
                    let value_start = k;
                    while k < len
                        && !is_space(bytes[k])
                        && bytes[k] != b'>'
                        && !(bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>'))
                    {
                        k += 1;
                    }
                    decode_entities(&input[value_start..k], value_start)?
                }
                None => {
                    return Err(ParseError::Unterminated {
                        construct: "start tag",
                        position: start,
                    });
                }
            }
        } else {
            // Valueless attributes read as empty strings.
            k = attr_end;
            String::new()
        };
        attributes.push((attr_name.to_string(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::token_snapshot;

    fn snapshot(input: &str) -> Vec<String> {
        token_snapshot(&tokenize(input).expect("tokenize failed"))
    }

    #[test]
    fn tokenize_preserves_utf8_text_nodes() {
        assert_eq!(
            snapshot("<p>120×32</p>"),
            vec!["StartTag(p)", "Text(120×32)", "EndTag(p)"]
        );
    }

    #[test]
    fn tokenize_preserves_name_case() {
        assert_eq!(
            snapshot("<DiV Id=\"x\"></DiV>"),
            vec!["StartTag(DiV Id=\"x\")", "EndTag(DiV)"]
        );
    }

    #[test]
    fn tokenize_reads_mixed_attribute_syntax() {
        assert_eq!(
            snapshot("<a x='1' y = \"2\" z=3 flag other/>"),
            vec!["StartTag(a x=\"1\" y=\"2\" z=\"3\" flag=\"\" other=\"\" /)"]
        );
    }

    #[test]
    fn tokenize_decodes_entities_in_attributes_and_text() {
        assert_eq!(
            snapshot("<a t=\"&lt;&amp;&#10;\">&gt;</a>"),
            vec!["StartTag(a t=\"<&\n\")", "Text(>)", "EndTag(a)"]
        );
    }

    #[test]
    fn tokenize_skips_declaration_and_plain_doctype() {
        assert_eq!(
            snapshot("<?xml version=\"1.0\"?><!DOCTYPE note><note/>"),
            vec!["StartTag(note /)"]
        );
    }

    #[test]
    fn tokenize_keeps_comment_bodies_verbatim() {
        assert_eq!(
            snapshot("<!-- a <b> &amp; --><x/>"),
            vec!["Comment( a <b> &amp; )", "StartTag(x /)"]
        );
    }

    #[test]
    fn tokenize_allows_namespaced_and_dotted_names() {
        assert_eq!(
            snapshot("<svg:rect my.attr=\"1\"></svg:rect>"),
            vec!["StartTag(svg:rect my.attr=\"1\")", "EndTag(svg:rect)"]
        );
    }

    #[test]
    fn unresolved_entity_in_attribute_is_rejected() {
        let err = tokenize("<a href=\"&ext;\"/>").unwrap_err();
        assert!(matches!(err, ParseError::UnresolvedEntity { ref name, .. } if name == "ext"));
    }

    #[test]
    fn cdata_is_rejected() {
        let err = tokenize("<a><![CDATA[x]]></a>").unwrap_err();
        assert_eq!(err, ParseError::UnsupportedCData { position: 3 });
    }

    #[test]
    fn processing_instruction_after_prolog_is_rejected() {
        let err = tokenize("<a><?php echo 1; ?></a>").unwrap_err();
        assert_eq!(err, ParseError::UnsupportedProcessingInstruction { position: 3 });
    }

    #[test]
    fn doctype_internal_subset_is_rejected() {
        let err = tokenize("<!DOCTYPE a [<!ENTITY e \"x\">]><a/>").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedDoctype { position: 0 }));
    }

    #[test]
    fn duplicate_attribute_is_rejected() {
        let err = tokenize("<a x=\"1\" x=\"2\"/>").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateAttribute { ref name, .. } if name == "x"));
    }

    #[test]
    fn unterminated_comment_is_rejected() {
        let err = tokenize("<a><!-- open").unwrap_err();
        assert_eq!(
            err,
            ParseError::Unterminated {
                construct: "comment",
                position: 3,
            }
        );
    }

    #[test]
    fn tokenize_handles_many_simple_tags_linearly() {
        let input = "<a></a>".repeat(20_000);
        let stream = tokenize(&input).expect("tokenize failed");
        assert_eq!(stream.tokens().len(), 40_000);
    }
}
