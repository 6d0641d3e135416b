use std::fmt;
use std::rc::Rc;

use crate::error::{MentionError, Result};
use crate::fuzzy::MatchOptions;
use crate::ranking::{Candidate, Lookup, RankLimits, RankedItem};
use crate::source::CandidateSource;
use crate::trigger::TriggerSpec;

/// Text inserted on commit. The item is `None` when nothing was selectable.
pub type SelectFn<T> = Rc<dyn Fn(Option<&RankedItem<T>>, &MentionContext<'_>) -> String>;
pub type MenuItemFn<T> = Rc<dyn Fn(&RankedItem<T>) -> String>;

/// Borrowed view of the mention being committed.
#[derive(Debug, Clone, Copy)]
pub struct MentionContext<'a> {
    pub trigger: &'a str,
    pub query: &'a str,
    pub fill_attr: &'a str,
}

/// What to show when no candidate matches.
#[derive(Clone, Default)]
pub enum NoMatchTemplate {
    /// Close the session.
    #[default]
    Hide,
    Literal(String),
    /// Empty output behaves like `Hide`.
    Computed(Rc<dyn Fn() -> String>),
}

impl NoMatchTemplate {
    /// Blank literals normalise to `Hide`.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::Hide
        } else {
            Self::Literal(text)
        }
    }

    pub fn computed(f: impl Fn() -> String + 'static) -> Self {
        Self::Computed(Rc::new(f))
    }

    /// Placeholder to render, or `None` to close.
    pub fn resolve(&self) -> Option<String> {
        match self {
            Self::Hide => None,
            Self::Literal(text) => Some(text.clone()),
            Self::Computed(f) => Some(f()).filter(|s| !s.is_empty()),
        }
    }
}

impl fmt::Debug for NoMatchTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hide => f.write_str("Hide"),
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// One trigger and everything needed to serve its menu.
pub struct Collection<T> {
    pub spec: TriggerSpec,
    source: CandidateSource<T>,
    lookup: Lookup<T>,
    fill_attr: String,
    search: MatchOptions,
    select_template: Option<SelectFn<T>>,
    menu_item_template: Option<MenuItemFn<T>>,
    no_match: NoMatchTemplate,
    loading_template: Option<String>,
}

impl<T: Candidate> Collection<T> {
    pub fn new(spec: TriggerSpec, source: impl Into<CandidateSource<T>>) -> Self {
        Self {
            spec,
            source: source.into(),
            lookup: Lookup::default(),
            fill_attr: "value".into(),
            search: MatchOptions {
                pre: "<span>".into(),
                post: "</span>".into(),
                ..MatchOptions::default()
            },
            select_template: None,
            menu_item_template: None,
            no_match: NoMatchTemplate::Hide,
            loading_template: None,
        }
    }

    pub fn with_lookup(mut self, lookup: Lookup<T>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_fill_attr(mut self, fill_attr: impl Into<String>) -> Self {
        self.fill_attr = fill_attr.into();
        self
    }

    pub fn with_search(mut self, search: MatchOptions) -> Self {
        self.search = search;
        self
    }

    pub fn with_select_template(
        mut self,
        f: impl Fn(Option<&RankedItem<T>>, &MentionContext<'_>) -> String + 'static,
    ) -> Self {
        self.select_template = Some(Rc::new(f));
        self
    }

    pub fn with_menu_item_template(mut self, f: impl Fn(&RankedItem<T>) -> String + 'static) -> Self {
        self.menu_item_template = Some(Rc::new(f));
        self
    }

    pub fn with_no_match(mut self, no_match: NoMatchTemplate) -> Self {
        self.no_match = no_match;
        self
    }

    pub fn with_loading_template(mut self, text: impl Into<String>) -> Self {
        self.loading_template = Some(text.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.spec.trigger.is_empty() {
            return Err(MentionError::Configuration(
                "collection trigger must not be empty".into(),
            ));
        }
        self.lookup.validate()
    }

    pub fn source(&self) -> &CandidateSource<T> {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut CandidateSource<T> {
        &mut self.source
    }

    pub fn lookup(&self) -> &Lookup<T> {
        &self.lookup
    }

    pub fn search(&self) -> &MatchOptions {
        &self.search
    }

    pub fn fill_attr(&self) -> &str {
        &self.fill_attr
    }

    pub fn no_match(&self) -> &NoMatchTemplate {
        &self.no_match
    }

    pub fn loading_template(&self) -> Option<&str> {
        self.loading_template.as_deref()
    }

    pub fn limits(&self) -> RankLimits {
        RankLimits {
            max_candidates: self.spec.max_results,
            result_limit: self.spec.result_limit,
        }
    }

    /// Replace or extend a static list. Providers cannot be appended to.
    pub fn append(&mut self, values: Vec<T>, replace: bool) -> Result<()> {
        match &mut self.source {
            CandidateSource::Provider(_) => Err(MentionError::InvalidOperation(format!(
                "cannot append to `{}`: its values come from a provider",
                self.spec.trigger
            ))),
            CandidateSource::Static(existing) => {
                if replace {
                    *existing = values;
                } else {
                    existing.extend(values);
                }
                Ok(())
            }
        }
    }

    /// Text a commit inserts for `item`.
    pub fn select_content(&self, item: Option<&RankedItem<T>>, trigger: &str, query: &str) -> String {
        let ctx = MentionContext {
            trigger,
            query,
            fill_attr: &self.fill_attr,
        };
        match &self.select_template {
            Some(f) => f(item, &ctx),
            None => default_select_template(item, &ctx),
        }
    }

    /// Label for one menu row.
    pub fn menu_item(&self, item: &RankedItem<T>) -> String {
        match &self.menu_item_template {
            Some(f) => f(item),
            None => item.rendered_label.clone(),
        }
    }
}

/// Trigger followed by the fill field, or by the raw query without an item.
pub fn default_select_template<T: Candidate>(item: Option<&RankedItem<T>>, ctx: &MentionContext<'_>) -> String {
    match item {
        Some(item) => {
            let fill = item.original.field(ctx.fill_attr).unwrap_or_default();
            format!("{}{}", ctx.trigger, fill)
        }
        None => format!("{}{}", ctx.trigger, ctx.query),
    }
}

impl<T: fmt::Debug> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("spec", &self.spec)
            .field("source", &self.source)
            .field("lookup", &self.lookup)
            .field("fill_attr", &self.fill_attr)
            .field("no_match", &self.no_match)
            .finish_non_exhaustive()
    }
}
