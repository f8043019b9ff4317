use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::SchemaError,
    field::parse_field,
    hooks::HookRef,
    tokenizer::Token,
    types::{AttributeValue, Attributes, Definition, Entry, MessageDefinition, Schema},
    utils::{error, quote},
};

lazy_static! {
    static ref IDENTIFIER:    Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref EQUALS:        Regex = Regex::new(r"^=$").unwrap();
    static ref SEMICOLON:     Regex = Regex::new(r"^;$").unwrap();
    static ref COMMA:         Regex = Regex::new(r"^,$").unwrap();
    static ref COLON:         Regex = Regex::new(r"^:$").unwrap();
    static ref DOT:           Regex = Regex::new(r"^\.$").unwrap();
    static ref AT:            Regex = Regex::new(r"^@$").unwrap();
    static ref INTEGER:       Regex = Regex::new(r"^-?\d+$").unwrap();
    static ref STRING:        Regex = Regex::new(r#"^"(?:[^"\\]|\\.)*"$"#).unwrap();
    static ref RAW:           Regex = Regex::new(r"^`[^`]*`$").unwrap();
    static ref LEFT_BRACKET:  Regex = Regex::new(r"^\[$").unwrap();
    static ref RIGHT_BRACKET: Regex = Regex::new(r"^\]$").unwrap();
    static ref LEFT_BRACE:    Regex = Regex::new(r"^\{$").unwrap();
    static ref RIGHT_BRACE:   Regex = Regex::new(r"^\}$").unwrap();
    static ref ATTRIBUTES:    Regex = Regex::new(r"^attributes$").unwrap();
    static ref EOF:           Regex = Regex::new(r"^$").unwrap();
}

fn current_token(tokens: &[Token], index: usize) -> &Token {
    &tokens[index.min(tokens.len() - 1)]
}

fn eat(tokens: &[Token], index: &mut usize, test: &Regex) -> bool {
    if test.is_match(&current_token(tokens, *index).text) {
        *index += 1;
        true
    } else {
        false
    }
}

fn expect(tokens: &[Token], index: &mut usize, test: &Regex, expected: &str) -> Result<(), SchemaError> {
    if !eat(tokens, index, test) {
        let tok = current_token(tokens, *index);
        return Err(error(
            &format!("Expected {} but found {}", expected, quote(&tok.text)),
            tok.line,
            tok.column,
        ));
    }
    Ok(())
}

/// Parses the token stream of a `.tw` file:
///
/// ```text
/// Point = [ .attributes{index: 7}, x:int32, y:int32 ];
/// Path  = [ count:uint16[], points:Point[count], @checksum ];
/// ```
pub fn parse_schema(tokens: &[Token]) -> Result<Schema, SchemaError> {
    let mut schema = Schema::new();
    if tokens.is_empty() {
        return Ok(schema);
    }
    let mut index = 0;

    while !eat(tokens, &mut index, &EOF) {
        let name_tok = current_token(tokens, index);
        expect(tokens, &mut index, &IDENTIFIER, "message name")?;
        expect(tokens, &mut index, &EQUALS, "\"=\"")?;
        expect(tokens, &mut index, &LEFT_BRACKET, "\"[\"")?;

        let mut entries = Vec::new();
        while !eat(tokens, &mut index, &RIGHT_BRACKET) {
            entries.push(parse_entry(tokens, &mut index)?);
            if !eat(tokens, &mut index, &COMMA) {
                expect(tokens, &mut index, &RIGHT_BRACKET, "\",\" or \"]\"")?;
                break;
            }
        }
        eat(tokens, &mut index, &SEMICOLON);

        schema.definitions.push(Definition::Message(MessageDefinition {
            name: name_tok.text.clone(),
            line: name_tok.line,
            column: name_tok.column,
            entries,
        }));
    }

    Ok(schema)
}

fn parse_entry(tokens: &[Token], index: &mut usize) -> Result<Entry, SchemaError> {
    let first = current_token(tokens, *index);

    if eat(tokens, index, &DOT) {
        expect(tokens, index, &ATTRIBUTES, "\"attributes\"")?;
        return parse_attributes(tokens, index).map(Entry::Attributes);
    }

    if eat(tokens, index, &AT) {
        let name_tok = current_token(tokens, *index);
        expect(tokens, index, &IDENTIFIER, "hook name")?;
        return Ok(Entry::Hook(HookRef::Named(name_tok.text.clone())));
    }

    if eat(tokens, index, &RAW) {
        let text = &first.text;
        return Ok(Entry::Raw(text[1..text.len() - 1].trim().to_owned()));
    }

    // A field token runs up to the next top-level "," or "]".
    let mut text = String::new();
    let mut depth = 0usize;
    let mut previous: Option<&Token> = None;
    loop {
        let tok = current_token(tokens, *index);
        if EOF.is_match(&tok.text) {
            return Err(error("Unexpected end of input", tok.line, tok.column));
        }
        if depth == 0 && (COMMA.is_match(&tok.text) || RIGHT_BRACKET.is_match(&tok.text)) {
            break;
        }
        if LEFT_BRACKET.is_match(&tok.text) {
            depth += 1;
        } else if RIGHT_BRACKET.is_match(&tok.text) {
            depth -= 1;
        }
        // Keep the gap between two words so "my field" cannot fuse into "myfield".
        if let Some(prev) = previous {
            if is_word(prev) && is_word(tok) && !adjacent(prev, tok) {
                text.push(' ');
            }
        }
        text.push_str(&tok.text);
        previous = Some(tok);
        *index += 1;
    }

    if parse_field(&text).is_none() {
        return Err(error(
            &format!("Malformed field {}", quote(&text)),
            first.line,
            first.column,
        ));
    }
    Ok(Entry::Field(text))
}

fn is_word(token: &Token) -> bool {
    IDENTIFIER.is_match(&token.text) || INTEGER.is_match(&token.text)
}

fn adjacent(left: &Token, right: &Token) -> bool {
    left.line == right.line && left.column + left.text.chars().count() == right.column
}

fn parse_attributes(tokens: &[Token], index: &mut usize) -> Result<Attributes, SchemaError> {
    let mut attributes = Attributes::new();
    expect(tokens, index, &LEFT_BRACE, "\"{\"")?;

    while !eat(tokens, index, &RIGHT_BRACE) {
        let key_tok = current_token(tokens, *index);
        expect(tokens, index, &IDENTIFIER, "attribute name")?;
        expect(tokens, index, &COLON, "\":\"")?;

        let value_tok = current_token(tokens, *index);
        let value = if eat(tokens, index, &INTEGER) {
            let value = value_tok.text.parse::<i64>().map_err(|_| {
                error(
                    &format!("Invalid integer {}", quote(&value_tok.text)),
                    value_tok.line,
                    value_tok.column,
                )
            })?;
            AttributeValue::Int(value)
        } else if eat(tokens, index, &STRING) {
            let text = serde_json::from_str::<String>(&value_tok.text).map_err(|_| {
                error(
                    &format!("Invalid string {}", value_tok.text),
                    value_tok.line,
                    value_tok.column,
                )
            })?;
            AttributeValue::Text(text)
        } else if eat(tokens, index, &IDENTIFIER) {
            AttributeValue::Text(value_tok.text.clone())
        } else {
            return Err(error(
                &format!("Expected attribute value but found {}", quote(&value_tok.text)),
                value_tok.line,
                value_tok.column,
            ));
        };
        attributes.insert(key_tok.text.clone(), value);

        if !eat(tokens, index, &COMMA) {
            expect(tokens, index, &RIGHT_BRACE, "\",\" or \"}\"")?;
            break;
        }
    }

    Ok(attributes)
}
