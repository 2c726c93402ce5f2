//! Comma separated list flag values with double-quote grouping.
//!
//! ```text
//! one,two,4,3          -> [one, two, 4, 3]
//! "one,two","three"    -> [one,two | three]
//! a="one",three        -> [a="one" | three]
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Split `raw` on commas that are not inside double quotes.
///
/// A `"` toggles the quoted state. An element that is exactly one quoted
/// span has its enclosing quotes removed; any other quote stays literal. An
/// unterminated quote keeps the rest of the input in a single element. The
/// empty string yields no elements.
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut elements = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in raw.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => elements.push(unquote(&std::mem::take(&mut current))),
            _ => current.push(c),
        }
    }
    elements.push(unquote(&current));

    elements
}

/// Strip the enclosing quotes of a value that is wholly one quoted span.
pub(crate) fn unquote(s: &str) -> String {
    match s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) if !inner.contains('"') => inner.to_string(),
        _ => s.to_string(),
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty() || s.contains(',')
}

/// An ordered list of strings filled from repeated command-line occurrences.
///
/// [`ListValue::set`] parses one occurrence with [`split_list`]. The first
/// `set` discards whatever was there before (typically a default installed
/// with [`ListValue::replace`]); later calls append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListValue {
    values: Vec<String>,
    changed: bool,
}

impl ListValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list holding `values` as its default.
    pub fn with_default<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        list.replace(values);
        list
    }

    /// Parse one flag occurrence and add its elements.
    pub fn set(&mut self, raw: &str) {
        let parsed = split_list(raw);
        if self.changed {
            self.values.extend(parsed);
        } else {
            self.values = parsed;
        }
        self.changed = true;
    }

    /// Add a single element verbatim, without splitting.
    pub fn append(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    /// Discard the current elements and install `values` verbatim.
    pub fn replace<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
    }

    /// Whether [`ListValue::set`] has been called at least once.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<String> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if needs_quotes(value) {
                write!(f, "\"{value}\"")?;
            } else {
                f.write_str(value)?;
            }
        }
        Ok(())
    }
}

impl FromStr for ListValue {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut list = Self::new();
        list.set(s);
        Ok(list)
    }
}
