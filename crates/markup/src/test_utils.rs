use crate::{Token, TokenStream};
use std::fmt::Write;

pub(crate) fn token_snapshot(stream: &TokenStream) -> Vec<String> {
    stream
        .tokens()
        .iter()
        .map(|token| match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
                ..
            } => {
                let mut line = String::new();
                let _ = write!(&mut line, "StartTag({name}");
                for (attr, value) in attributes {
                    let _ = write!(&mut line, " {attr}=\"{value}\"");
                }
                if *self_closing {
                    line.push_str(" /");
                }
                line.push(')');
                line
            }
            Token::EndTag { name, .. } => format!("EndTag({name})"),
            Token::Comment { text, .. } => format!("Comment({text})"),
            Token::Text { text, .. } => format!("Text({text})"),
        })
        .collect()
}
