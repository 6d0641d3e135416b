use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::{Collection, NoMatchTemplate};
use crate::controller::{ControllerOptions, MentionController};
use crate::error::{MentionError, Result};
use crate::fuzzy::{MatchOptions, MatchStrategy};
use crate::ranking::Lookup;
use crate::trigger::TriggerSpec;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the logger is initialised at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional log file. Logs go to stdout when unset.
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub allow_spaces: bool,
    #[serde(default)]
    pub autocomplete_mode: bool,
    /// Regex splitting tokens in autocomplete mode. `null` uses the whole text.
    #[serde(default = "default_separator")]
    pub autocomplete_separator: Option<String>,
    #[serde(default)]
    pub space_selects_match: bool,
    #[serde(default = "default_replace_text_suffix")]
    pub replace_text_suffix: String,
    /// Quiet period before a scroll or resize closes the menu.
    #[serde(default = "default_dismiss_debounce_ms")]
    pub dismiss_debounce_ms: u64,
    #[serde(default)]
    pub collections: Vec<CollectionSettings>,
}

fn default_separator() -> Option<String> {
    Some(r"\s+".into())
}

fn default_replace_text_suffix() -> String {
    " ".into()
}

fn default_dismiss_debounce_ms() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            allow_spaces: false,
            autocomplete_mode: false,
            autocomplete_separator: default_separator(),
            space_selects_match: false,
            replace_text_suffix: default_replace_text_suffix(),
            dismiss_debounce_ms: default_dismiss_debounce_ms(),
            collections: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchSettings {
    #[serde(default = "default_pre")]
    pub pre: String,
    #[serde(default = "default_post")]
    pub post: String,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub strategy: MatchStrategy,
}

fn default_pre() -> String {
    "<span>".into()
}

fn default_post() -> String {
    "</span>".into()
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            pre: default_pre(),
            post: default_post(),
            skip: false,
            case_sensitive: false,
            strategy: MatchStrategy::default(),
        }
    }
}

impl From<&SearchSettings> for MatchOptions {
    fn from(s: &SearchSettings) -> Self {
        Self {
            case_sensitive: s.case_sensitive,
            skip: s.skip,
            pre: s.pre.clone(),
            post: s.post.clone(),
            strategy: s.strategy,
        }
    }
}

/// One collection as written in the settings file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CollectionSettings {
    #[serde(default = "default_trigger")]
    pub trigger: String,
    /// Field of each value the query is matched against.
    #[serde(default = "default_lookup")]
    pub lookup: String,
    /// Field inserted on commit.
    #[serde(default = "default_fill_attr")]
    pub fill_attr: String,
    #[serde(default = "default_true")]
    pub require_leading_space: bool,
    #[serde(default)]
    pub allow_spaces: bool,
    #[serde(default)]
    pub menu_show_min_length: usize,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub menu_item_limit: Option<usize>,
    /// Committed mentions of this trigger allowed in the surface.
    #[serde(default)]
    pub max_display_items: Option<usize>,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub no_match_template: Option<String>,
    #[serde(default)]
    pub loading_item_template: Option<String>,
    #[serde(default)]
    pub values: Option<Vec<Value>>,
}

fn default_trigger() -> String {
    "@".into()
}

fn default_lookup() -> String {
    "key".into()
}

fn default_fill_attr() -> String {
    "value".into()
}

fn default_true() -> bool {
    true
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            trigger: default_trigger(),
            lookup: default_lookup(),
            fill_attr: default_fill_attr(),
            require_leading_space: true,
            allow_spaces: false,
            menu_show_min_length: 0,
            max_results: None,
            menu_item_limit: None,
            max_display_items: None,
            is_blocked: false,
            search: SearchSettings::default(),
            no_match_template: None,
            loading_item_template: None,
            values: Some(Vec::new()),
        }
    }
}

impl CollectionSettings {
    pub fn trigger_spec(&self) -> TriggerSpec {
        TriggerSpec {
            trigger: self.trigger.clone(),
            require_leading_space: self.require_leading_space,
            allow_spaces_in_query: self.allow_spaces,
            min_query_length: self.menu_show_min_length,
            max_results: self.max_results,
            result_limit: self.menu_item_limit,
            blocked: self.is_blocked,
            max_active_mentions: self.max_display_items,
        }
    }

    /// Build a collection over the literal `values`.
    pub fn to_collection(&self) -> Result<Collection<Value>> {
        let values = self.values.clone().ok_or_else(|| {
            MentionError::Configuration(format!(
                "collection `{}` has no values",
                self.trigger
            ))
        })?;

        let mut collection = Collection::new(self.trigger_spec(), values)
            .with_lookup(Lookup::field(self.lookup.clone()))
            .with_fill_attr(self.fill_attr.clone())
            .with_search(MatchOptions::from(&self.search));
        if let Some(text) = &self.no_match_template {
            collection = collection.with_no_match(NoMatchTemplate::literal(text.clone()));
        }
        if let Some(text) = &self.loading_item_template {
            collection = collection.with_loading_template(text.clone());
        }
        collection.validate()?;
        Ok(collection)
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Install the global logger from `debug_logging` and `log_file`.
    pub fn init_logging(&self) {
        crate::logging::init(self.debug_logging, self.log_file.as_ref().map(PathBuf::from));
    }

    pub fn controller_options(&self) -> Result<ControllerOptions> {
        let autocomplete_separator = match &self.autocomplete_separator {
            Some(pattern) => Some(Regex::new(pattern).map_err(|e| {
                MentionError::Configuration(format!(
                    "invalid autocomplete separator '{pattern}': {e}"
                ))
            })?),
            None => None,
        };
        Ok(ControllerOptions {
            allow_spaces: self.allow_spaces,
            autocomplete_mode: self.autocomplete_mode,
            autocomplete_separator,
            space_selects_match: self.space_selects_match,
            replace_text_suffix: self.replace_text_suffix.clone(),
            dismiss_debounce: Duration::from_millis(self.dismiss_debounce_ms),
        })
    }

    pub fn collections(&self) -> Result<Vec<Collection<Value>>> {
        self.collections
            .iter()
            .map(CollectionSettings::to_collection)
            .collect()
    }
}

impl MentionController<Value> {
    /// Controller over the JSON values listed in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.collections()?, settings.controller_options()?)
    }
}
