//! Filter engine: per-field inclusion sets applied to a [`Table`].
//!
//! Within a field the allowed values are OR-ed, across fields they are AND-ed.
//! A field with no allowed values imposes no constraint.

use crate::record::{Field, Record, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// User-selected allowed values, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    allowed: BTreeMap<Field, BTreeSet<String>>,
}

impl FilterSelection {
    /// Selection that restricts nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `values` for `field` (builder form).
    #[must_use]
    pub fn with<I, S>(mut self, field: Field, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select(field, values);
        self
    }

    /// Add `values` to the allowed set of `field`.
    pub fn select<I, S>(&mut self, field: Field, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = self.allowed.entry(field).or_default();
        set.extend(values.into_iter().map(Into::into));
        if set.is_empty() {
            self.allowed.remove(&field);
        }
    }

    /// Drop any restriction on `field`.
    pub fn clear(&mut self, field: Field) {
        self.allowed.remove(&field);
    }

    /// Allowed values for `field`, if restricted.
    #[must_use]
    pub fn allowed(&self, field: Field) -> Option<&BTreeSet<String>> {
        self.allowed.get(&field).filter(|s| !s.is_empty())
    }

    /// Whether `field` is restricted.
    #[must_use]
    pub fn restricts(&self, field: Field) -> bool {
        self.allowed(field).is_some()
    }

    /// Whether no field is restricted.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.allowed.values().all(BTreeSet::is_empty)
    }

    /// Whether `record` passes every restricted field.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.matches_fields(record, &Field::ALL)
    }

    fn matches_fields(&self, record: &Record, fields: &[Field]) -> bool {
        fields.iter().all(|&field| {
            self.allowed(field)
                .map_or(true, |set| set.contains(record.get(field)))
        })
    }

    /// Selected values joined with `_`, one part per restricted field in
    /// sidebar order. Used to name downloads.
    #[must_use]
    pub fn label_parts(&self) -> Vec<String> {
        Field::SIDEBAR
            .iter()
            .chain(std::iter::once(&Field::Toolchain))
            .filter_map(|&field| self.allowed(field))
            .map(|set| set.iter().map(String::as_str).collect::<Vec<_>>().join("_"))
            .collect()
    }

    /// Parse a URL query string such as `architecture=arm64&architecture=x86`.
    ///
    /// Unknown keys and empty values are ignored, repeated keys accumulate.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut selection = Self::new();
        for (key, value) in parse_query(query) {
            let Ok(field) = key.parse::<Field>() else {
                continue;
            };
            if !value.is_empty() {
                selection.select(field, [value]);
            }
        }
        selection
    }

    /// Render as a URL query string (without leading `?`).
    #[must_use]
    pub fn to_query(&self) -> String {
        self.allowed
            .iter()
            .flat_map(|(field, values)| {
                values
                    .iter()
                    .map(move |v| format!("{}={}", field.key(), encode_component(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Apply `selection` to `table`, keeping the order of surviving records.
#[must_use]
pub fn apply(table: &Table, selection: &FilterSelection) -> Table {
    if selection.is_unrestricted() {
        return table.clone();
    }
    let filtered: Table = table
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();
    log::debug!(
        "filter kept {} of {} records",
        filtered.len(),
        table.len()
    );
    filtered
}

/// Option lists for the sidebar widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    options: Vec<(Field, Vec<String>)>,
}

impl FilterOptions {
    /// All distinct values of every sidebar field, ignoring selections.
    #[must_use]
    pub fn all(table: &Table) -> Self {
        Self::cascade(table, &FilterSelection::new())
    }

    /// Options narrowed by the selections of preceding sidebar widgets.
    ///
    /// The options for the n-th widget are the values reachable from records
    /// matching the selections of widgets `0..n`. Already selected values stay
    /// listed even when they are no longer reachable.
    #[must_use]
    pub fn cascade(table: &Table, selection: &FilterSelection) -> Self {
        let sidebar = Field::SIDEBAR;
        let options = sidebar
            .iter()
            .enumerate()
            .map(|(i, &field)| {
                let preceding = &sidebar[..i];
                let mut values: BTreeSet<&str> = table
                    .iter()
                    .filter(|r| selection.matches_fields(r, preceding))
                    .map(|r| r.get(field))
                    .collect();
                if let Some(selected) = selection.allowed(field) {
                    values.extend(selected.iter().map(String::as_str));
                }
                (field, values.into_iter().map(str::to_string).collect())
            })
            .collect();
        Self { options }
    }

    /// Options for `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> &[String] {
        self.options
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate `(field, options)` in sidebar order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &[String])> {
        self.options.iter().map(|(f, v)| (*f, v.as_slice()))
    }
}

/// Split a query string into decoded key/value pairs.
#[must_use]
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Percent-decode a query component, treating `+` as a space.
#[must_use]
pub fn decode_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Percent-encode everything outside the URL unreserved set.
#[must_use]
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
