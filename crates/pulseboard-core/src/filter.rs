//! Filter evaluation.
//!
//! A [`FilterSet`] maps each field of the fixed filter vocabulary to a single
//! constraint value. An empty value means "no constraint"; a record matches
//! when every active constraint matches (logical AND).
//!
//! Matching is exact and case-sensitive unless the set was built with
//! [`MatchMode::CaseInsensitive`]. The exact mode is the default because
//! filter option lists derived from record values are case-aligned by
//! construction, while free-text input is not; switching modes is an
//! explicit configuration decision.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::Record;

/// The fixed filter vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    EndYear,
    Topic,
    Sector,
    Region,
    Pestle,
    Source,
    Swot,
    Country,
}

impl FilterField {
    pub const ALL: [FilterField; 8] = [
        FilterField::EndYear,
        FilterField::Topic,
        FilterField::Sector,
        FilterField::Region,
        FilterField::Pestle,
        FilterField::Source,
        FilterField::Swot,
        FilterField::Country,
    ];

    /// Query-parameter name.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterField::EndYear => "end_year",
            FilterField::Topic => "topic",
            FilterField::Sector => "sector",
            FilterField::Region => "region",
            FilterField::Pestle => "pestle",
            FilterField::Source => "source",
            FilterField::Swot => "swot",
            FilterField::Country => "country",
        }
    }

    /// Human label used in active-filter chips.
    pub fn label(self) -> &'static str {
        match self {
            FilterField::EndYear => "End Year",
            FilterField::Topic => "Topic",
            FilterField::Sector => "Sector",
            FilterField::Region => "Region",
            FilterField::Pestle => "PESTLE",
            FilterField::Source => "Source",
            FilterField::Swot => "SWOT",
            FilterField::Country => "Country",
        }
    }

    pub fn parse(name: &str) -> Option<FilterField> {
        FilterField::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// The record's value for this field, as the string constraints are
    /// compared against. A missing end year reads as `""`.
    pub fn value_of(self, record: &Record) -> Cow<'_, str> {
        match self {
            FilterField::EndYear => match record.end_year {
                Some(y) => Cow::Owned(y.to_string()),
                None => Cow::Borrowed(""),
            },
            FilterField::Topic => Cow::Borrowed(&record.topic),
            FilterField::Sector => Cow::Borrowed(&record.sector),
            FilterField::Region => Cow::Borrowed(&record.region),
            FilterField::Pestle => Cow::Borrowed(&record.pestle),
            FilterField::Source => Cow::Borrowed(&record.source),
            FilterField::Swot => Cow::Borrowed(&record.swot),
            FilterField::Country => Cow::Borrowed(&record.country),
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How constraint values are compared against record values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Exact,
    CaseInsensitive,
}

/// A set of named field constraints.
///
/// Value semantics: two sets with equal constraints and mode are equal and
/// hash identically. Setting a field to `""` removes its constraint, so
/// every stored constraint is active. Sets are built through
/// [`FilterSet::set`] or [`FilterSet::from_pairs`] only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FilterSet {
    constraints: BTreeMap<FilterField, String>,
    mode: MatchMode,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder form of [`set`](FilterSet::set).
    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set or clear a constraint.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.constraints.remove(&field);
        } else {
            self.constraints.insert(field, value);
        }
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.constraints.get(&field).map(String::as_str)
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// True when no constraint is active.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Remove every constraint, keeping the match mode.
    pub fn clear(&mut self) {
        self.constraints.clear();
    }

    /// Active constraints in vocabulary order.
    pub fn active(&self) -> impl Iterator<Item = (FilterField, &str)> {
        self.constraints.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Build a set from name/value pairs such as URL query parameters.
    ///
    /// Unknown names and empty values are ignored. A later pair for the
    /// same field wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut set = FilterSet::new();
        for (name, value) in pairs {
            if let Some(field) = FilterField::parse(name.as_ref()) {
                set.set(field, value);
            }
        }
        set
    }

    /// Active constraints as query-parameter pairs.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        self.active()
            .map(|(f, v)| (f.as_str(), v.to_string()))
            .collect()
    }

    /// Display chips for the active constraints, e.g. `"Topic: oil"`.
    pub fn active_labels(&self) -> Vec<String> {
        self.active()
            .map(|(f, v)| format!("{}: {}", f.label(), v))
            .collect()
    }

    /// Decide whether a record satisfies every active constraint.
    pub fn matches(&self, record: &Record) -> bool {
        self.constraints.iter().all(|(field, wanted)| {
            let actual = field.value_of(record);
            match self.mode {
                MatchMode::Exact => actual.as_ref() == wanted.as_str(),
                MatchMode::CaseInsensitive => actual.to_lowercase() == wanted.to_lowercase(),
            }
        })
    }

    /// Stable hex SHA-256 of the canonical form, usable as a cache key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(match self.mode {
            MatchMode::Exact => b"exact".as_slice(),
            MatchMode::CaseInsensitive => b"nocase".as_slice(),
        });
        for (field, value) in &self.constraints {
            hasher.update([0u8]);
            hasher.update(field.as_str().as_bytes());
            hasher.update([b'=']);
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
