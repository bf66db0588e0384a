//! Normalization of Gamma list fields.
//!
//! `outcomes` and `clobTokenIds` arrive as native arrays, as JSON text
//! (`"[\"Yes\", \"No\"]"`) or as single-quoted list literals (`"['Yes', 'No']"`).
//! Everything funnels into an ordered `Vec<Value>`; anything unreadable is an
//! empty list, never an error.

use std::iter::Peekable;
use std::str::Chars;

use serde_json::{Map, Number, Value};

/// What a string field decoded to. A list spreads into the field; any other
/// value (scalar, tuple, dict) becomes its single element.
enum Parsed {
    List(Vec<Value>),
    Single(Value),
}

impl Parsed {
    fn into_value(self) -> Value {
        match self {
            Parsed::List(items) => Value::Array(items),
            Parsed::Single(v) => v,
        }
    }
}

type Parser = fn(&str) -> Option<Parsed>;

/// Tried in order; the first parser that accepts the text wins.
const PARSERS: &[Parser] = &[parse_json, parse_literal];

pub fn coerce_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => coerce_text(s),
        Some(_) => Vec::new(),
    }
}

fn coerce_text(s: &str) -> Vec<Value> {
    let s = s.trim();
    if s.is_empty() {
        return Vec::new();
    }
    match PARSERS.iter().find_map(|parse| parse(s)) {
        Some(Parsed::List(items)) => items,
        Some(Parsed::Single(other)) => vec![other],
        None => Vec::new(),
    }
}

/// Text form of a coerced element, used for labels and token ids.
pub fn item_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn parse_json(s: &str) -> Option<Parsed> {
    match serde_json::from_str(s).ok()? {
        Value::Array(items) => Some(Parsed::List(items)),
        other => Some(Parsed::Single(other)),
    }
}

fn parse_literal(s: &str) -> Option<Parsed> {
    let mut p = Literal {
        chars: s.chars().peekable(),
    };
    let parsed = p.node()?;
    p.skip_ws();
    match p.chars.next() {
        None => Some(parsed),
        Some(_) => None,
    }
}

/// Recursive-descent reader for literal syntax: lists, tuples, dicts, quoted
/// strings, numbers and the keywords `True`, `False`, `None`.
struct Literal<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Literal<'_> {
    fn skip_ws(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn node(&mut self) -> Option<Parsed> {
        self.skip_ws();
        match *self.chars.peek()? {
            '[' => {
                self.chars.next();
                self.items(']').map(Parsed::List)
            }
            '(' => self.tuple(),
            '{' => self.dict().map(Parsed::Single),
            '\'' | '"' => self.string().map(|s| Parsed::Single(Value::String(s))),
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                self.number().map(Parsed::Single)
            }
            c if c.is_ascii_alphabetic() => self.keyword().map(Parsed::Single),
            _ => None,
        }
    }

    fn value(&mut self) -> Option<Value> {
        self.node().map(Parsed::into_value)
    }

    /// Comma-separated values up to `close`, trailing comma allowed.
    fn items(&mut self, close: char) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.chars.next_if_eq(&close).is_some() {
                return Some(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.chars.next()? {
                ',' => {}
                c if c == close => return Some(items),
                _ => return None,
            }
        }
    }

    /// `()` and `(a,)` / `(a, b)` are tuples; `(a)` is just `a` in parentheses.
    fn tuple(&mut self) -> Option<Parsed> {
        self.chars.next();
        self.skip_ws();
        if self.chars.next_if_eq(&')').is_some() {
            return Some(Parsed::Single(Value::Array(Vec::new())));
        }
        let first = self.node()?;
        self.skip_ws();
        match self.chars.next()? {
            ')' => Some(first),
            ',' => {
                let mut items = vec![first.into_value()];
                items.extend(self.items(')')?);
                Some(Parsed::Single(Value::Array(items)))
            }
            _ => None,
        }
    }

    fn dict(&mut self) -> Option<Value> {
        self.chars.next();
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.chars.next_if_eq(&'}').is_some() {
                return Some(Value::Object(map));
            }
            let key = self.value()?;
            if key.is_array() || key.is_object() {
                return None;
            }
            self.skip_ws();
            self.chars.next_if_eq(&':')?;
            let value = self.value()?;
            map.insert(item_text(&key), value);
            self.skip_ws();
            match self.chars.next()? {
                ',' => {}
                '}' => return Some(Value::Object(map)),
                _ => return None,
            }
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                c if c == quote => return Some(out),
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    c @ ('\\' | '\'' | '"') => out.push(c),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                c => out.push(c),
            }
        }
    }

    /// Digits are kept verbatim so long integer ids survive; only forms JSON
    /// rejects (`.5`, `1.`) go through `f64`.
    fn number(&mut self) -> Option<Value> {
        let mut raw = String::new();
        while let Some(c) = self
            .chars
            .next_if(|c| c.is_ascii_digit() || matches!(*c, '-' | '+' | '.' | 'e' | 'E' | '_'))
        {
            if c != '_' {
                raw.push(c);
            }
        }
        let raw = raw.strip_prefix('+').unwrap_or(&raw);
        serde_json::from_str::<Number>(raw)
            .ok()
            .or_else(|| raw.parse::<f64>().ok().and_then(Number::from_f64))
            .map(Value::Number)
    }

    fn keyword(&mut self) -> Option<Value> {
        let mut word = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
            word.push(c);
        }
        match word.as_str() {
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            "None" => Some(Value::Null),
            _ => None,
        }
    }
}
