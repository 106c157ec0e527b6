//! Bibliographic records handed to the classifier and renderer.
//!
//! Entries are read-only once parsed: classification and sorting only rearrange
//! references to them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single bibliography record (one `@article{...}`, `@book{...}`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BibEntry {
    /// Citation key, e.g. `knuth1984`.
    pub key: String,
    /// Lower-cased type tag as written in the source (`article`, `inproceedings`, ...).
    pub entry_type: String,
    /// Lower-cased field name → cleaned field value.
    pub fields: BTreeMap<String, String>,
    /// Role (`author`, `editor`) → persons in source order.
    pub persons: BTreeMap<String, Vec<PersonName>>,
}

impl BibEntry {
    pub fn new(key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        BibEntry {
            key: key.into(),
            entry_type: entry_type.into().to_lowercase(),
            fields: BTreeMap::new(),
            persons: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn with_person(mut self, role: &str, person: PersonName) -> Self {
        self.persons
            .entry(role.to_lowercase())
            .or_default()
            .push(person);
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    pub fn persons(&self, role: &str) -> &[PersonName] {
        self.persons.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn authors(&self) -> &[PersonName] {
        self.persons("author")
    }
}

/// A person split into the four BibTeX name parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first: Vec<String>,
    pub von: Vec<String>,
    pub last: Vec<String>,
    pub jr: Vec<String>,
}

impl PersonName {
    /// Parses one name in any of the three BibTeX forms:
    /// `First von Last`, `von Last, First` and `von Last, Jr, First`.
    ///
    /// Commas and spaces inside `{...}` do not split, so a braced corporate name
    /// such as `{Barnes and Noble}` stays a single last-name word. Braces are
    /// removed from the finished parts.
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = split_top_level(raw, |c| c == ',')
            .into_iter()
            .map(str::trim)
            .collect();
        let name = match parts.as_slice() {
            [single] => Self::parse_first_von_last(single),
            [von_last, first] => {
                let (von, last) = split_von_last(&words(von_last));
                PersonName {
                    first: words(first),
                    von,
                    last,
                    jr: Vec::new(),
                }
            }
            [von_last, jr, rest @ ..] => {
                let (von, last) = split_von_last(&words(von_last));
                PersonName {
                    first: words(&rest.join(" ")),
                    von,
                    last,
                    jr: words(jr),
                }
            }
            [] => PersonName::default(),
        };
        name.unbraced()
    }

    fn unbraced(self) -> Self {
        let strip = |parts: Vec<String>| -> Vec<String> {
            parts
                .into_iter()
                .map(|w| {
                    w.replace(['{', '}'], "")
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .filter(|w| !w.is_empty())
                .collect()
        };
        PersonName {
            first: strip(self.first),
            von: strip(self.von),
            last: strip(self.last),
            jr: strip(self.jr),
        }
    }

    fn parse_first_von_last(raw: &str) -> Self {
        let tokens = words(raw);
        let Some((last_token, init)) = tokens.split_last() else {
            return PersonName::default();
        };

        // The von part starts at the first lower-case word and runs to the last
        // lower-case word before the final token.
        let von_start = init.iter().position(|w| is_von(w));
        match von_start {
            Some(start) => {
                let von_end = init
                    .iter()
                    .rposition(|w| is_von(w))
                    .map_or(start + 1, |i| i + 1);
                let mut last: Vec<String> = init[von_end..].to_vec();
                last.push(last_token.clone());
                PersonName {
                    first: init[..start].to_vec(),
                    von: init[start..von_end].to_vec(),
                    last,
                    jr: Vec::new(),
                }
            }
            None => PersonName {
                first: init.to_vec(),
                von: Vec::new(),
                last: vec![last_token.clone()],
                jr: Vec::new(),
            },
        }
    }
}

impl fmt::Display for PersonName {
    /// Renders as `von Last, Jr, First`, dropping empty parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut von_last = self.von.clone();
        von_last.extend(self.last.iter().cloned());

        let mut out = von_last.join(" ");
        for part in [&self.jr, &self.first] {
            if part.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(&part.join(" "));
        }
        f.write_str(&out)
    }
}

/// Splits `s` on every `sep` character that is not inside braces.
pub(crate) fn split_top_level(s: &str, sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && sep(c) => {
                pieces.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&s[start..]);
    pieces
}

fn words(s: &str) -> Vec<String> {
    split_top_level(s, char::is_whitespace)
        .into_iter()
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// A word is part of `von` when its first letter outside braces is lower-case.
/// A word that opens with a brace group never is.
fn is_von(word: &str) -> bool {
    let mut depth = 0usize;
    for c in word.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && c.is_alphabetic() => return c.is_lowercase(),
            _ if depth > 0 => return false,
            _ => {}
        }
    }
    false
}

/// Splits `von Last` tokens: the last part always keeps at least one word.
fn split_von_last(tokens: &[String]) -> (Vec<String>, Vec<String>) {
    let Some((last_token, init)) = tokens.split_last() else {
        return (Vec::new(), Vec::new());
    };
    let von_end = init.iter().rposition(|w| is_von(w)).map_or(0, |i| i + 1);
    let mut last = init[von_end..].to_vec();
    last.push(last_token.clone());
    (init[..von_end].to_vec(), last)
}
