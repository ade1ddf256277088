//! Reading and rewriting the flat `KEY=value` environment files each site
//! carries.
//!
//! [`parse`] is the lenient reader used by the inventory scan. [`EnvDocument`]
//! is the line-preserving form used when templating a new site: untouched
//! lines (comments, blanks, entries nobody edits) render back byte for byte.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

pub const APP_PORT: &str = "APP_PORT";
pub const DB_PORT: &str = "DB_PORT";
pub const PMA_PORT: &str = "PMA_PORT";
pub const SFTP_PORT: &str = "SFTP_PORT";
pub const DB_NAME: &str = "DB_NAME";
pub const DB_USER: &str = "DB_USER";
pub const DB_PASSWORD: &str = "DB_PASSWORD";
pub const DB_ROOT_PASSWORD: &str = "DB_ROOT_PASSWORD";
pub const SFTP_USER: &str = "SFTP_USER";
pub const SFTP_PASSWORD: &str = "SFTP_PASSWORD";

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^=]+)=(.*)$").unwrap());

/// Parse environment file text into a key/value map.
///
/// Lines that are not `key=value` are ignored, as are `#` comments. A key
/// assigned more than once keeps its last value.
pub fn parse(text: &str) -> HashMap<String, String> {
    text.lines().filter_map(parse_entry).collect()
}

fn parse_entry(line: &str) -> Option<(String, String)> {
    if line.trim_start().starts_with('#') {
        return None;
    }
    let caps = ENTRY_RE.captures(line)?;
    let key = caps[1].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), caps[2].trim().to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EnvLine {
    Entry {
        key: String,
        value: String,
        /// Original text, dropped once the entry is edited.
        raw: Option<String>,
    },
    Verbatim(String),
}

/// An environment file kept as an ordered list of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDocument {
    lines: Vec<EnvLine>,
}

impl EnvDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::new();
        }
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = body
            .split('\n')
            .map(|line| match parse_entry(line) {
                Some((key, value)) => EnvLine::Entry {
                    key,
                    value,
                    raw: Some(line.to_string()),
                },
                None => EnvLine::Verbatim(line.to_string()),
            })
            .collect();
        Self { lines }
    }

    /// Value of `key`; the last assignment wins, as in [`parse`].
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| match line {
            EnvLine::Entry { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Replace the first entry for `key` in place and drop any later
    /// duplicates. Appends the entry when the key is absent.
    pub fn set(&mut self, key: &str, value: &str) {
        let mut seen = false;
        self.lines.retain_mut(|line| match line {
            EnvLine::Entry {
                key: k,
                value: v,
                raw,
            } if k == key => {
                if seen {
                    return false;
                }
                seen = true;
                *v = value.to_string();
                *raw = None;
                true
            }
            _ => true,
        });
        if !seen {
            self.lines.push(EnvLine::Entry {
                key: key.to_string(),
                value: value.to_string(),
                raw: None,
            });
        }
    }

    /// Remove every entry for `key`. Returns how many lines were dropped.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.lines.len();
        self.lines
            .retain(|line| !matches!(line, EnvLine::Entry { key: k, .. } if k == key));
        before - self.lines.len()
    }

    /// Append a group of entries, separated from existing content by one
    /// blank line.
    pub fn append_block<'a>(&mut self, entries: impl IntoIterator<Item = (&'a str, String)>) {
        let ends_blank = matches!(self.lines.last(), Some(EnvLine::Verbatim(l)) if l.trim().is_empty());
        if !self.lines.is_empty() && !ends_blank {
            self.lines.push(EnvLine::Verbatim(String::new()));
        }
        for (key, value) in entries {
            self.lines.push(EnvLine::Entry {
                key: key.to_string(),
                value,
                raw: None,
            });
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                EnvLine::Entry { key, .. } => Some(key.as_str()),
                EnvLine::Verbatim(_) => None,
            })
            .collect()
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                EnvLine::Entry { key, value, .. } => Some((key.clone(), value.clone())),
                EnvLine::Verbatim(_) => None,
            })
            .collect()
    }

    /// Serialize back to text, always ending with exactly one newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                EnvLine::Entry {
                    raw: Some(raw), ..
                } => out.push_str(raw),
                EnvLine::Entry { key, value, .. } => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                }
                EnvLine::Verbatim(text) => out.push_str(text),
            }
            out.push('\n');
        }
        out
    }
}
