use lazy_static::lazy_static;
use regex::Regex;

use crate::error::SchemaError;
use crate::utils::{error, quote};

lazy_static! {
    pub static ref TOKEN_REGEX: Regex = Regex::new(
        r#"(`[^`]*`|"(?:[^"\\]|\\.)*"|(?:-|\b)\d+\b|[=;:,.@\[\]{}]|\b[A-Za-z_][A-Za-z0-9_]*\b|//[^\n]*|\s+)"#
    )
    .unwrap();
    pub static ref WHITESPACE_RX: Regex = Regex::new(r"^(//[^\n]*|\s+)$").unwrap();
}

#[derive(Debug, PartialEq)]
pub struct Token {
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

/// Splits `.tw` schema text into tokens, dropping whitespace and `//`
/// comments. The last token is always an empty EOF marker.
pub fn tokenize_schema(text: &str) -> Result<Vec<Token>, SchemaError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let part = mat.as_str();

        if start > last_end {
            return Err(error(
                &format!("Syntax error: {}", quote(&text[last_end..start])),
                line,
                column,
            ));
        }

        if !WHITESPACE_RX.is_match(part) {
            tokens.push(Token {
                text: part.to_string(),
                line,
                column,
            });
        }

        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                column = last_line_part.chars().count() + 1;
            }
        } else {
            column += part.chars().count();
        }

        last_end = mat.end();
    }

    if last_end != text.len() {
        return Err(error(
            &format!("Syntax error: {}", quote(&text[last_end..])),
            line,
            column,
        ));
    }

    tokens.push(Token {
        text: "".to_string(),
        line,
        column,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        tokenize_schema(input).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_simple() {
        let input = "P = [x:int32];";
        let expected = vec![
            Token { text: "P".into(),     line: 1, column: 1 },
            Token { text: "=".into(),     line: 1, column: 3 },
            Token { text: "[".into(),     line: 1, column: 5 },
            Token { text: "x".into(),     line: 1, column: 6 },
            Token { text: ":".into(),     line: 1, column: 7 },
            Token { text: "int32".into(), line: 1, column: 8 },
            Token { text: "]".into(),     line: 1, column: 13 },
            Token { text: ";".into(),     line: 1, column: 14 },
            Token { text: "".into(),      line: 1, column: 15 },
        ];
        assert_eq!(tokenize_schema(input).unwrap(), expected);
    }

    #[test]
    fn test_tokenize_lengths_and_attributes() {
        assert_eq!(
            texts("n:uint16[] ids:uint8[.n] .attributes{index: -7, tag: \"a,b\"}"),
            [
                "n", ":", "uint16", "[", "]", "ids", ":", "uint8", "[", ".", "n", "]", ".", "attributes", "{",
                "index", ":", "-7", ",", "tag", ":", "\"a,b\"", "}", ""
            ]
        );
    }

    #[test]
    fn test_tokenize_raw_and_comments() {
        let tokens = tokenize_schema("// header\n@stamp, `let a = 1;\nlet b = 2;` x").unwrap();
        assert_eq!(tokens[0].text, "@");
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[3].text, "`let a = 1;\nlet b = 2;`");
        assert_eq!(tokens[4], Token { text: "x".into(), line: 3, column: 13 });
    }

    #[test]
    fn test_tokenize_rejects_unknown_characters() {
        assert_eq!(
            tokenize_schema("A = [x:int32 # no]"),
            Err(SchemaError::Parse {
                msg:    "Syntax error: \"#\"".into(),
                line:   1,
                column: 14,
            })
        );
    }
}
