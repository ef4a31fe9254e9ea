//! Safe parser for mapping literals found in the `source` column.
//!
//! Accepts JSON objects (`{"id": null, "name": "Reuters"}`) and Python-style
//! dict literals (`{'id': None, 'name': 'Reuters'}`), which is what a raw
//! store row holds after a nested source was flattened to text. JSON goes
//! through `serde_json`; the hand parser below only covers the Python form.
//! Only literal values are recognised; nothing is ever evaluated.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(String),
    Bool(bool),
    Null,
    List(Vec<Literal>),
    Map(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Looks up a string key in a mapping literal.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Literal::Map(entries) => entries.iter().find_map(|(k, v)| match k {
                Literal::Str(s) if s == key => Some(v),
                _ => None,
            }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Parses a complete literal. Trailing non-whitespace input is rejected.
pub fn parse(input: &str) -> Option<Literal> {
    let mut p = Parser {
        chars: input.chars().peekable(),
        depth: 0,
    };
    let value = p.value()?;
    p.skip_ws();
    if p.chars.peek().is_some() {
        return None;
    }
    Some(value)
}

/// Extracts a non-empty `name` from a mapping literal, if `input` is one.
pub fn source_name(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let name = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(json) => json.get("name")?.as_str()?.trim().to_string(),
        Err(_) => parse(trimmed)?.get("name")?.as_str()?.trim().to_string(),
    };
    (!name.is_empty()).then_some(name)
}

const MAX_DEPTH: usize = 32;

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn value(&mut self) -> Option<Literal> {
        self.skip_ws();
        match *self.chars.peek()? {
            '{' => self.nested(|p| p.map()),
            '[' => self.nested(|p| p.list()),
            '\'' | '"' => self.string().map(Literal::Str),
            c if c == '-' || c == '+' || c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() => self.word(),
            _ => None,
        }
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Option<Literal>) -> Option<Literal> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn map(&mut self) -> Option<Literal> {
        self.chars.next(); // '{'
        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            if self.chars.peek() == Some(&'}') {
                self.chars.next();
                return Some(Literal::Map(entries));
            }
            let key = self.value()?;
            self.skip_ws();
            if self.chars.next()? != ':' {
                return None;
            }
            let val = self.value()?;
            entries.push((key, val));
            self.skip_ws();
            match self.chars.next()? {
                ',' => continue,
                '}' => return Some(Literal::Map(entries)),
                _ => return None,
            }
        }
    }

    fn list(&mut self) -> Option<Literal> {
        self.chars.next(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.chars.peek() == Some(&']') {
                self.chars.next();
                return Some(Literal::List(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.chars.next()? {
                ',' => continue,
                ']' => return Some(Literal::List(items)),
                _ => return None,
            }
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'u' => {
                        let hex: String = (0..4).filter_map(|_| self.chars.next()).collect();
                        let code = u32::from_str_radix(&hex, 16).ok()?;
                        out.push(char::from_u32(code)?);
                    }
                    other => out.push(other),
                },
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Option<Literal> {
        let mut raw = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                raw.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        raw.parse::<f64>().ok().map(|_| Literal::Num(raw))
    }

    fn word(&mut self) -> Option<Literal> {
        let mut w = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                w.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        match w.as_str() {
            "None" | "null" => Some(Literal::Null),
            "True" | "true" => Some(Literal::Bool(true)),
            "False" | "false" => Some(Literal::Bool(false)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_dict_literal() {
        assert_eq!(
            source_name("{'id': None, 'name': 'Reuters'}").as_deref(),
            Some("Reuters")
        );
    }

    #[test]
    fn json_object() {
        assert_eq!(
            source_name(r#"{"id":"bloomberg","name":"Bloomberg"}"#).as_deref(),
            Some("Bloomberg")
        );
    }

    #[test]
    fn json_escapes_and_surrogate_pairs() {
        assert_eq!(
            source_name(r#"{"name": "Caf\u00e9 \"Daily\" \ud83d\udcc8"}"#).as_deref(),
            Some("Café \"Daily\" 📈")
        );
        assert_eq!(source_name(r#"{"id": "x", "name": "  "}"#), None);
    }

    #[test]
    fn apostrophe_inside_double_quotes() {
        assert_eq!(
            source_name(r#"{'id': None, 'name': "Investor's Business Daily"}"#).as_deref(),
            Some("Investor's Business Daily")
        );
    }

    #[test]
    fn rejects_expressions_and_plain_names() {
        assert_eq!(source_name("__import__('os').system('ls')"), None);
        assert_eq!(source_name("{'name': open('x')}"), None);
        assert_eq!(source_name("CNBC"), None);
        assert_eq!(source_name("{'id': 1}"), None);
        assert_eq!(source_name("{'name': 'x'} trailing"), None);
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let s = format!("{}{}", "[".repeat(100), "]".repeat(100));
        assert_eq!(parse(&s), None);
    }
}
