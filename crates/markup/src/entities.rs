use crate::tokenizer::ParseError;
use memchr::memchr;

/// Decode character references in text or attribute content.
///
/// Contract:
/// - Predefined entities decoded: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`.
/// - Numeric references decoded only when well-formed and semicolon-terminated:
///   `&#123;` (decimal) and `&#x1F4A9;` (hex). Invalid scalars pass through unchanged.
/// - Any other well-formed named reference (`&name;`) is an external entity this reader
///   cannot resolve and fails with `ParseError::UnresolvedEntity`.
/// - A bare `&` that does not start a well-formed reference is kept literally.
///
/// `offset` is the byte position of `s` in the source, used for error positions.
pub(crate) fn decode_entities(s: &str, offset: usize) -> Result<String, ParseError> {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Ok(s.to_string());
    };
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;

    while i < bytes.len() {
        if bytes[i] != b'&' {
            let next = memchr(b'&', &bytes[i..]).map_or(bytes.len(), |rel| i + rel);
            out.push_str(&s[i..next]);
            i = next;
            continue;
        }
        match scan_reference(bytes, i) {
            Some(Reference::Named { end }) => {
                let name = &s[i + 1..end];
                let Some(ch) = predefined_entity(name) else {
                    return Err(ParseError::UnresolvedEntity {
                        name: name.to_string(),
                        position: offset + i,
                    });
                };
                out.push(ch);
                i = end + 1;
            }
            Some(Reference::Numeric { value, end }) => {
                match char::from_u32(value) {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&s[i..=end]),
                }
                i = end + 1;
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
    }
    Ok(out)
}

enum Reference {
    Named { end: usize },
    Numeric { value: u32, end: usize },
}

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111
const MAX_NAME_LEN: usize = 64;

// `start` points at `&`; `end` in the result points at the terminating `;`.
fn scan_reference(bytes: &[u8], start: usize) -> Option<Reference> {
    let mut j = start + 1;
    if bytes.get(j) == Some(&b'#') {
        j += 1;
        let is_hex = matches!(bytes.get(j), Some(b'x' | b'X'));
        if is_hex {
            j += 1;
        }
        let max_digits = if is_hex { MAX_HEX_DIGITS } else { MAX_DEC_DIGITS };
        let digits_start = j;
        let mut value: u32 = 0;
        while let Some(&b) = bytes.get(j) {
            if b == b';' {
                return (j > digits_start).then_some(Reference::Numeric { value, end: j });
            }
            if j - digits_start == max_digits {
                return None;
            }
            let digit = if is_hex {
                (b as char).to_digit(16)?
            } else {
                (b as char).to_digit(10)?
            };
            value = value * if is_hex { 16 } else { 10 } + digit;
            j += 1;
        }
        return None;
    }

    let first = *bytes.get(j)?;
    if !(first.is_ascii_alphabetic() || first == b'_' || first == b':') {
        return None;
    }
    while let Some(&b) = bytes.get(j) {
        if b == b';' {
            return Some(Reference::Named { end: j });
        }
        if j - start > MAX_NAME_LEN
            || !(b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'-' | b'.'))
        {
            return None;
        }
        j += 1;
    }
    None
}

fn predefined_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}
