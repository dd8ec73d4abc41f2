//! Keyword lines: `*NAME, KEY=VALUE, FLAG`.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One `KEY[=VALUE]` parameter of a keyword line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Param {
    /// Upper-cased key.
    pub key: String,
    /// Value as written, if any.
    pub value: Option<String>,
}

/// A parsed keyword line.
///
/// Names and keys are upper-cased with internal whitespace collapsed.
/// Values keep their original spelling.
///
/// # Example
///
/// ```
/// use aero_fea::Keyword;
///
/// let kw = Keyword::parse("*Element, type=S6, ELSET=ESkin").unwrap();
/// assert!(kw.is("ELEMENT"));
/// assert_eq!(kw.param("TYPE"), Some("S6"));
/// assert_eq!(kw.to_string(), "*ELEMENT, TYPE=S6, ELSET=ESkin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keyword {
    /// Card name without the leading `*`, e.g. `NODE PRINT`.
    pub name: String,
    /// Parameters in written order.
    pub params: Vec<Param>,
}

impl Keyword {
    /// A keyword with no parameters.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: normalize(name.as_ref()),
            params: Vec::new(),
        }
    }

    /// Parse a keyword line. Returns `None` for comments and data lines.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let body = line.strip_prefix('*')?;
        if body.starts_with('*') {
            return None;
        }
        let mut parts = body.split(',');
        let name = normalize(parts.next()?);
        let params = parts
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| match p.split_once('=') {
                Some((key, value)) => Param {
                    key: normalize(key),
                    value: Some(value.trim().to_string()),
                },
                None => Param {
                    key: normalize(p),
                    value: None,
                },
            })
            .collect();
        Some(Self { name, params })
    }

    /// Case-insensitive name test.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Value of parameter `key`, if present with a value.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(key))
            .and_then(|p| p.value.as_deref())
    }

    /// Whether parameter `key` is present, with or without a value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.params.iter().any(|p| p.key.eq_ignore_ascii_case(key))
    }

    /// Set or add `key=value`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self.params.iter_mut().find(|p| p.key.eq_ignore_ascii_case(key)) {
            Some(p) => p.value = value,
            None => self.params.push(Param {
                key: normalize(key),
                value,
            }),
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Remove parameter `key`. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.params.len();
        self.params.retain(|p| !p.key.eq_ignore_ascii_case(key));
        self.params.len() != before
    }

    /// Add a value-less flag such as `GENERATE`.
    #[must_use]
    pub fn with_flag(mut self, key: &str) -> Self {
        if !self.has(key) {
            self.params.push(Param {
                key: normalize(key),
                value: None,
            });
        }
        self
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*{}", self.name)?;
        for p in &self.params {
            match &p.value {
                Some(v) => write!(f, ", {}={v}", p.key)?,
                None => write!(f, ", {}", p.key)?,
            }
        }
        Ok(())
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}
