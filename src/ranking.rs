use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{MentionError, Result};
use crate::fuzzy::{MatchOptions, Matcher};

/// Payload that can be offered in a suggestion menu.
pub trait Candidate {
    /// Named string field used by `Lookup::Field` and the default select template.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Disabled candidates are displayed but never selected.
    fn is_disabled(&self) -> bool {
        false
    }
}

impl Candidate for serde_json::Value {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.get(name)? {
            serde_json::Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            serde_json::Value::Number(n) => Some(Cow::Owned(n.to_string())),
            serde_json::Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    fn is_disabled(&self) -> bool {
        self.get("disabled").and_then(serde_json::Value::as_bool) == Some(true)
    }
}

/// A plain string is its own value for every field name.
impl Candidate for String {
    fn field(&self, _name: &str) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

/// Simple key/value candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionEntry {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
}

impl MentionEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl Candidate for MentionEntry {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "key" => Some(Cow::Borrowed(self.key.as_str())),
            "value" => Some(Cow::Borrowed(self.value.as_str())),
            _ => None,
        }
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Projection from a candidate to the string the query is matched against.
pub enum Lookup<T> {
    Field(String),
    Computed(Rc<dyn Fn(&T, &str) -> String>),
}

impl<T> Lookup<T> {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn computed(f: impl Fn(&T, &str) -> String + 'static) -> Self {
        Self::Computed(Rc::new(f))
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Field(name) if name.trim().is_empty() => Err(MentionError::Configuration(
                "lookup must name a field or be a function".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl<T: Candidate> Lookup<T> {
    /// Missing fields project to the empty string.
    pub fn project<'a>(&self, candidate: &'a T, query: &str) -> Cow<'a, str> {
        match self {
            Self::Field(name) => candidate.field(name).unwrap_or(Cow::Borrowed("")),
            Self::Computed(f) => Cow::Owned(f(candidate, query)),
        }
    }
}

impl<T> Clone for Lookup<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Field(name) => Self::Field(name.clone()),
            Self::Computed(f) => Self::Computed(Rc::clone(f)),
        }
    }
}

impl<T> Default for Lookup<T> {
    fn default() -> Self {
        Self::Field("key".into())
    }
}

impl<T> fmt::Debug for Lookup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A candidate after matching, highlighting and sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem<T> {
    pub original: T,
    pub rendered_label: String,
    pub score: i64,
    pub source_index: usize,
}

impl<T: Candidate> RankedItem<T> {
    pub fn is_disabled(&self) -> bool {
        self.original.is_disabled()
    }
}

/// Score descending, then source index ascending.
pub fn ranked_order<T>(a: &RankedItem<T>, b: &RankedItem<T>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.source_index.cmp(&b.source_index))
}

/// Limits applied around matching. `Some(0)` counts as no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankLimits {
    /// Resolved candidates considered, taken from the front of the list.
    pub max_candidates: Option<usize>,
    /// Ranked items kept.
    pub result_limit: Option<usize>,
}

/// Filters, scores, sorts and truncates candidate lists.
#[derive(Default)]
pub struct RankingPipeline {
    matcher: Matcher,
}

impl RankingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank<T>(
        &self,
        query: &str,
        candidates: &[T],
        lookup: &Lookup<T>,
        opts: &MatchOptions,
        limits: RankLimits,
    ) -> Vec<RankedItem<T>>
    where
        T: Candidate + Clone,
    {
        let considered = match limits.max_candidates.filter(|&max| max > 0) {
            Some(max) => &candidates[..candidates.len().min(max)],
            None => candidates,
        };

        let mut ranked: Vec<RankedItem<T>> = considered
            .iter()
            .enumerate()
            .filter_map(|(source_index, candidate)| {
                let text = lookup.project(candidate, query);
                let m = self.matcher.matches(query, &text, opts)?;
                Some(RankedItem {
                    original: candidate.clone(),
                    rendered_label: m.rendered,
                    score: m.score,
                    source_index,
                })
            })
            .collect();

        ranked.sort_by(ranked_order);
        if let Some(limit) = limits.result_limit.filter(|&limit| limit > 0) {
            ranked.truncate(limit);
        }
        ranked
    }
}
