//! BibTeX Parser — turns `.bib` source into [`BibEntry`] records.
//!
//! Supported syntax:
//! - `@type{key, name = value, ...}` and `@type(key, ...)`
//! - values as `{braced}`, `"quoted"`, bare numbers or `@string` macro names,
//!   joined with `#`
//! - `@string`, `@preamble` and `@comment` blocks
//!
//! Anything between entries is treated as a comment. A single syntax error rejects
//! the whole file.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::bibliography::entry::{split_top_level, BibEntry, PersonName};

/// Fields that hold name lists rather than plain text.
const PERSON_FIELDS: [&str; 2] = ["author", "editor"];

#[derive(Debug, Error, PartialEq)]
pub enum BibParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: duplicate citation key '{key}'")]
    DuplicateKey { line: usize, key: String },

    #[error("line {line}: undefined string macro '{name}'")]
    UndefinedMacro { line: usize, name: String },
}

/// Parses a complete BibTeX document.
pub fn parse_bibtex(source: &str) -> Result<Vec<BibEntry>, BibParseError> {
    Parser::new(source).parse()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    macros: HashMap<String, String>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser {
            src,
            pos: 0,
            macros: default_macros(),
        }
    }

    fn parse(mut self) -> Result<Vec<BibEntry>, BibParseError> {
        let mut entries = Vec::new();
        let mut seen_keys = HashSet::new();

        while let Some(at) = self.src[self.pos..].find('@') {
            self.pos += at + 1;
            let line = self.line();
            let entry_type = self.identifier()?.to_lowercase();
            self.skip_ws();
            let close = match self.bump() {
                Some('{') => '}',
                Some('(') => ')',
                _ => return Err(self.syntax("expected '{' or '(' after entry type")),
            };

            match entry_type.as_str() {
                "comment" => self.skip_balanced(close)?,
                "preamble" => {
                    self.raw_value()?;
                    self.expect(close)?;
                }
                "string" => {
                    let name = self.identifier()?.to_lowercase();
                    self.expect('=')?;
                    let value = self.raw_value()?;
                    self.expect(close)?;
                    self.macros.insert(name, value);
                }
                _ => {
                    let entry = self.entry_body(entry_type, close)?;
                    if !seen_keys.insert(entry.key.to_lowercase()) {
                        return Err(BibParseError::DuplicateKey {
                            line,
                            key: entry.key,
                        });
                    }
                    entries.push(entry);
                }
            }
        }

        Ok(entries)
    }

    fn entry_body(&mut self, entry_type: String, close: char) -> Result<BibEntry, BibParseError> {
        self.skip_ws();
        let key_start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || c == close || c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
        let key = self.src[key_start..self.pos].to_string();
        if key.is_empty() {
            return Err(self.syntax("missing citation key"));
        }

        let mut entry = BibEntry::new(key, entry_type);
        loop {
            self.skip_ws();
            match self.bump() {
                Some(c) if c == close => break,
                Some(',') => {
                    self.skip_ws();
                    if self.peek() == Some(close) {
                        continue;
                    }
                    let name = self.identifier()?.to_lowercase();
                    self.expect('=')?;
                    let value = self.raw_value()?;
                    if PERSON_FIELDS.contains(&name.as_str()) {
                        let persons = split_names(&value)
                            .iter()
                            .map(|raw| PersonName::parse(raw))
                            .collect();
                        entry.persons.insert(name, persons);
                    } else {
                        entry.fields.insert(name, clean_value(&value));
                    }
                }
                Some(c) => {
                    return Err(self.syntax(&format!("unexpected '{c}' in entry '{}'", entry.key)))
                }
                None => return Err(self.syntax(&format!("unterminated entry '{}'", entry.key))),
            }
        }
        Ok(entry)
    }

    /// Reads `part (# part)*` and returns the concatenated text, braces intact.
    fn raw_value(&mut self) -> Result<String, BibParseError> {
        let mut out = String::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('{') => {
                    self.pos += 1;
                    let start = self.pos;
                    self.skip_balanced('}')?;
                    out.push_str(&self.src[start..self.pos - 1]);
                }
                Some('"') => {
                    self.pos += 1;
                    out.push_str(&self.quoted()?);
                }
                Some(c) if c.is_ascii_digit() => {
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.pos += 1;
                    }
                    out.push_str(&self.src[start..self.pos]);
                }
                Some(_) => {
                    let line = self.line();
                    let name = self.identifier()?.to_lowercase();
                    let text = self
                        .macros
                        .get(&name)
                        .ok_or(BibParseError::UndefinedMacro { line, name })?;
                    out.push_str(text);
                }
                None => return Err(self.syntax("expected a field value")),
            }

            self.skip_ws();
            if self.peek() == Some('#') {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(out)
    }

    /// Reads a `"..."` value; braces inside protect embedded quotes.
    fn quoted(&mut self) -> Result<String, BibParseError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                '"' if depth == 0 => return Ok(self.src[start..self.pos - 1].to_string()),
                _ => {}
            }
        }
        Err(self.syntax("unterminated quoted value"))
    }

    /// Advances past the matching `close`, honouring nested `{}`.
    fn skip_balanced(&mut self, close: char) -> Result<(), BibParseError> {
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                c if c == close && depth == 0 => return Ok(()),
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        Err(self.syntax("unbalanced braces"))
    }

    fn identifier(&mut self) -> Result<&'a str, BibParseError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || "_-:.+/'".contains(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.syntax("expected an identifier"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn expect(&mut self, want: char) -> Result<(), BibParseError> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.syntax(&format!("expected '{want}', found '{c}'"))),
            None => Err(self.syntax(&format!("expected '{want}', found end of input"))),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn line(&self) -> usize {
        self.src[..self.pos].matches('\n').count() + 1
    }

    fn syntax(&self, message: &str) -> BibParseError {
        BibParseError::Syntax {
            line: self.line(),
            message: message.to_string(),
        }
    }
}

/// Month abbreviations every BibTeX style predefines.
fn default_macros() -> HashMap<String, String> {
    [
        ("jan", "January"),
        ("feb", "February"),
        ("mar", "March"),
        ("apr", "April"),
        ("may", "May"),
        ("jun", "June"),
        ("jul", "July"),
        ("aug", "August"),
        ("sep", "September"),
        ("oct", "October"),
        ("nov", "November"),
        ("dec", "December"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Drops grouping braces and collapses whitespace runs (including newlines).
fn clean_value(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '{' && *c != '}')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a raw name list on the word `and` at brace depth 0, case-insensitively.
/// Each name keeps its braces for [`PersonName::parse`].
fn split_names(value: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in split_top_level(value, char::is_whitespace)
        .into_iter()
        .filter(|w| !w.is_empty())
    {
        if word.eq_ignore_ascii_case("and") {
            if !current.is_empty() {
                names.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(word);
        }
    }
    if !current.is_empty() {
        names.push(current.join(" "));
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
This text before the first entry is ignored.

@string{acm = "ACM Press"}

@Article{lamport1978,
  author  = {Leslie Lamport},
  title   = {Time, Clocks, and the {Ordering} of Events
             in a Distributed System},
  journal = {Communications of the ACM},
  year    = 1978,
  month   = jul,
}

@book(knuth1984,
  author    = "Donald E. Knuth and Duane Bibby",
  title     = "The {\TeX}book",
  publisher = acm # " (reprint)"
)

@comment{ anything {nested} goes here }
@preamble{ "\newcommand{\noop}[1]{}" }
"#;

    #[test]
    fn test_parses_entries_in_source_order() {
        let entries = parse_bibtex(SAMPLE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "lamport1978");
        assert_eq!(entries[0].entry_type, "article");
        assert_eq!(entries[1].key, "knuth1984");
        assert_eq!(entries[1].entry_type, "book");
    }

    #[test]
    fn test_field_values_are_cleaned() {
        let entries = parse_bibtex(SAMPLE).unwrap();
        assert_eq!(
            entries[0].title(),
            Some("Time, Clocks, and the Ordering of Events in a Distributed System")
        );
        assert_eq!(entries[0].field("year"), Some("1978"));
        assert_eq!(entries[0].field("month"), Some("July"));
        assert_eq!(entries[1].field("publisher"), Some("ACM Press (reprint)"));
    }

    #[test]
    fn test_authors_are_split_into_persons() {
        let entries = parse_bibtex(SAMPLE).unwrap();
        let names: Vec<String> = entries[1].authors().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["Knuth, Donald E.", "Bibby, Duane"]);
        assert!(entries[1].field("author").is_none());
    }

    #[test]
    fn test_braced_and_does_not_split_names() {
        let entries =
            parse_bibtex("@book{bn, author = {{Barnes and Noble} and Jane Doe}, title = {X}}")
                .unwrap();
        let names: Vec<String> = entries[0].authors().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["Barnes and Noble", "Doe, Jane"]);
    }

    #[test]
    fn test_string_macro_keeps_braced_names_together() {
        let src = "@string{pub = {{Barnes and Noble}}}\n@book{a, author = pub # { and Jane Doe}}";
        let entries = parse_bibtex(src).unwrap();
        assert_eq!(entries[0].authors().len(), 2);
    }

    #[test]
    fn test_empty_source_yields_no_entries() {
        assert!(parse_bibtex("").unwrap().is_empty());
        assert!(parse_bibtex("just a note, no entries").unwrap().is_empty());
    }

    #[test]
    fn test_trailing_comma_is_accepted() {
        let entries = parse_bibtex("@misc{a, title = {X},}").unwrap();
        assert_eq!(entries[0].title(), Some("X"));
    }

    #[test]
    fn test_unterminated_entry_is_an_error() {
        let err = parse_bibtex("@book{a,\n title = {X}").unwrap_err();
        assert!(matches!(err, BibParseError::Syntax { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_unbalanced_braces_is_an_error() {
        let err = parse_bibtex("@book{a, title = {X {Y}").unwrap_err();
        assert!(matches!(err, BibParseError::Syntax { ref message, .. } if message == "unbalanced braces"));
    }

    #[test]
    fn test_duplicate_key_rejects_file() {
        let err = parse_bibtex("@book{a, title={X}}\n@misc{A, title={Y}}").unwrap_err();
        assert_eq!(
            err,
            BibParseError::DuplicateKey {
                line: 2,
                key: "A".to_string()
            }
        );
    }

    #[test]
    fn test_undefined_macro_is_an_error() {
        let err = parse_bibtex("@book{a, publisher = nowhere}").unwrap_err();
        assert!(matches!(err, BibParseError::UndefinedMacro { ref name, .. } if name == "nowhere"));
    }

    #[test]
    fn test_missing_key_is_an_error() {
        assert!(parse_bibtex("@book{, title = {X}}").is_err());
    }
}
