//! A small CSS selector subset.
//!
//! Supported: compound selectors made of an optional tag name (or `*`),
//! `#id`, `.class`, `[attr]` and `[attr=value]` (value optionally quoted),
//! joined into lists with `,`. Combinators and pseudo-classes are not
//! supported.

use std::collections::BTreeMap;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected '{found}' at offset {offset} in selector \"{selector}\"")]
    Unexpected {
        selector: String,
        found: char,
        offset: usize,
    },

    #[error("unterminated attribute selector in \"{0}\"")]
    Unterminated(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        let mut offset = 0;
        for part in input.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                return Err(SelectorError::Empty);
            }
            let lead = part.len() - part.trim_start().len();
            alternatives.push(parse_compound(input, trimmed, offset + lead)?);
            offset += part.len() + 1;
        }
        Ok(Self { alternatives })
    }

    /// Whether an element with this tag, classes and attributes matches.
    pub fn matches(
        &self,
        tag: &str,
        classes: &[String],
        attributes: &BTreeMap<String, String>,
    ) -> bool {
        self.alternatives
            .iter()
            .any(|compound| compound.matches(tag, classes, attributes))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Compound {
    fn matches(
        &self,
        tag: &str,
        classes: &[String],
        attributes: &BTreeMap<String, String>,
    ) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if attributes.get("id") != Some(id) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| classes.contains(c)) {
            return false;
        }
        self.attributes.iter().all(|attr| match &attr.value {
            Some(value) => attributes.get(&attr.name) == Some(value),
            None => attributes.contains_key(&attr.name),
        })
    }
}

fn parse_compound(full: &str, input: &str, base: usize) -> Result<Compound, SelectorError> {
    let chars: Vec<char> = input.chars().collect();
    let mut compound = Compound::default();
    let mut i = 0;

    let unexpected = |i: usize, found: char| SelectorError::Unexpected {
        selector: full.to_string(),
        found,
        offset: base + i,
    };

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if chars[0] == '*' {
        i = 1;
    } else if is_ident_char(chars[0]) {
        compound.tag = Some(read_ident(&mut i).to_ascii_lowercase());
    }

    while i < chars.len() {
        let c = chars[i];
        match c {
            '#' | '.' => {
                i += 1;
                let name = read_ident(&mut i);
                if name.is_empty() {
                    return Err(unexpected(i.min(chars.len() - 1), chars[i.min(chars.len() - 1)]));
                }
                if c == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| SelectorError::Unterminated(full.to_string()))?;
                let body: String = chars[i + 1..close].iter().collect();
                let (name, value) = match body.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                        (name.trim().to_string(), Some(value.to_string()))
                    }
                    None => (body.trim().to_string(), None),
                };
                if name.is_empty() || !name.chars().all(is_ident_char) {
                    return Err(unexpected(i + 1, chars[i + 1]));
                }
                compound.attributes.push(AttributeMatch { name, value });
                i = close + 1;
            }
            other => return Err(unexpected(i, other)),
        }
    }

    Ok(compound)
}
