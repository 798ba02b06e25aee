//! Sectioned key-value config document
//!
//! `ConfigDocument` keeps every line of `dwh.cfg` (comments, blank lines,
//! key order and separators) so that rewriting a single value leaves the rest
//! of the file byte-for-byte unchanged. Section and key lookups are
//! case-insensitive.

use super::error::ConfigError;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Section(String),
    Entry {
        key: String,
        separator: String,
        value: String,
    },
    /// Comment or blank line, kept verbatim
    Verbatim(String),
}

/// Parsed config file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigDocument {
    lines: Vec<Line>,
    trailing_newline: bool,
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';')
}

/// Strip an inline `;`/`#` comment (must be preceded by whitespace) and trim.
fn clean_value(raw: &str) -> &str {
    let mut end = raw.len();
    let bytes = raw.as_bytes();
    for i in 1..bytes.len() {
        if (bytes[i] == b';' || bytes[i] == b'#') && bytes[i - 1].is_ascii_whitespace() {
            end = i;
            break;
        }
    }
    raw[..end].trim()
}

impl ConfigDocument {
    /// Parse a document from text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut lines = Vec::new();
        let mut in_section = false;

        for (idx, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if is_comment(trimmed) {
                lines.push(Line::Verbatim(raw.to_string()));
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                in_section = true;
                lines.push(Line::Section(trimmed[1..trimmed.len() - 1].trim().to_string()));
            } else if let Some(eq) = raw.find('=') {
                let key = raw[..eq].trim().to_string();
                if !in_section {
                    return Err(ConfigError::EntryOutsideSection {
                        line: idx + 1,
                        key,
                    });
                }
                // Keep whitespace around '=' so the line renders as written
                let value_start = eq + 1 + (raw[eq + 1..].len() - raw[eq + 1..].trim_start().len());
                let key_end = raw[..eq].trim_end().len();
                lines.push(Line::Entry {
                    key,
                    separator: raw[key_end..value_start].to_string(),
                    value: raw[value_start..].trim_end().to_string(),
                });
            } else {
                return Err(ConfigError::Malformed {
                    line: idx + 1,
                    content: raw.to_string(),
                });
            }
        }

        Ok(Self {
            lines,
            trailing_newline: text.ends_with('\n'),
        })
    }

    /// Load and parse a document from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        Self::parse(&text)
    }

    /// Render and write the document to disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_string())
            .map_err(|e| ConfigError::io(path.display().to_string(), e))
    }

    /// Index range of the lines belonging to `section` (header excluded)
    fn section_range(&self, section: &str) -> Option<(usize, usize)> {
        let start = self.lines.iter().position(
            |l| matches!(l, Line::Section(name) if name.eq_ignore_ascii_case(section)),
        )? + 1;
        let end = self.lines[start..]
            .iter()
            .position(|l| matches!(l, Line::Section(_)))
            .map_or(self.lines.len(), |offset| start + offset);
        Some((start, end))
    }

    fn entry_index(&self, section: &str, key: &str) -> Option<usize> {
        let (start, end) = self.section_range(section)?;
        (start..end).find(
            |&i| matches!(&self.lines[i], Line::Entry { key: k, .. } if k.eq_ignore_ascii_case(key)),
        )
    }

    /// Check whether a section exists
    pub fn has_section(&self, section: &str) -> bool {
        self.section_range(section).is_some()
    }

    /// Get a raw value (inline comments stripped, trimmed)
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let idx = self.entry_index(section, key)?;
        match &self.lines[idx] {
            Line::Entry { value, .. } => Some(clean_value(value)),
            _ => None,
        }
    }

    /// Set a value, inserting the key (and section) if absent
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        if let Some(idx) = self.entry_index(section, key) {
            if let Line::Entry { value: v, .. } = &mut self.lines[idx] {
                *v = value.to_string();
            }
            return;
        }

        let entry = Line::Entry {
            key: key.to_string(),
            separator: "=".to_string(),
            value: value.to_string(),
        };

        match self.section_range(section) {
            Some((start, end)) => {
                // Insert after the last entry so trailing blank lines stay between sections
                let insert_at = (start..end)
                    .rev()
                    .find(|&i| matches!(self.lines[i], Line::Entry { .. }))
                    .map_or(start, |i| i + 1);
                self.lines.insert(insert_at, entry);
            }
            None => {
                if !self.lines.is_empty() {
                    self.lines.push(Line::Verbatim(String::new()));
                }
                self.lines.push(Line::Section(section.to_string()));
                self.lines.push(entry);
            }
        }
    }

    /// Iterate over `(section, key, raw value)` for every entry
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        let mut current = "";
        self.lines.iter().filter_map(move |line| match line {
            Line::Section(name) => {
                current = name;
                None
            }
            Line::Entry { key, value, .. } => Some((current, key.as_str(), value.as_str())),
            Line::Verbatim(_) => None,
        })
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            match line {
                Line::Section(name) => write!(f, "[{name}]")?,
                Line::Entry {
                    key,
                    separator,
                    value,
                } => write!(f, "{key}{separator}{value}")?,
                Line::Verbatim(raw) => f.write_str(raw)?,
            }
        }
        if self.trailing_newline && !self.lines.is_empty() {
            f.write_str("\n")?;
        }
        Ok(())
    }
}
