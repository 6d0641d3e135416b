use once_cell::sync::Lazy;
use regex::Regex;

/// Separator used in autocomplete mode when none is configured.
pub static DEFAULT_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("static separator regex"));

/// Immutable per-collection trigger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSpec {
    /// One or more characters that open a mention.
    pub trigger: String,
    /// The trigger only counts at offset 0 or after whitespace.
    pub require_leading_space: bool,
    pub allow_spaces_in_query: bool,
    /// Minimum query length (in chars) before the menu is shown.
    pub min_query_length: usize,
    /// Cap on resolved candidates considered for ranking.
    pub max_results: Option<usize>,
    /// Cap on ranked items kept for display.
    pub result_limit: Option<usize>,
    pub blocked: bool,
    /// Maximum committed mentions of this trigger the surface may hold; `0`
    /// means unlimited.
    pub max_active_mentions: Option<usize>,
}

impl TriggerSpec {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            require_leading_space: true,
            allow_spaces_in_query: false,
            min_query_length: 0,
            max_results: None,
            result_limit: None,
            blocked: false,
            max_active_mentions: None,
        }
    }
}

impl Default for TriggerSpec {
    fn default() -> Self {
        Self::new("@")
    }
}

/// Ordered set of trigger specs. Index positions identify collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    specs: Vec<TriggerSpec>,
}

impl Registry {
    pub fn new(specs: Vec<TriggerSpec>) -> Self {
        Self { specs }
    }

    pub fn get(&self, index: usize) -> Option<&TriggerSpec> {
        self.specs.get(index)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TriggerSpec> {
        self.specs.iter()
    }
}

impl FromIterator<TriggerSpec> for Registry {
    fn from_iter<I: IntoIterator<Item = TriggerSpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Result of a successful scan: an open trigger and its query.
///
/// Offsets are UTF-8 byte offsets into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerInfo {
    /// Index of the matching spec in the registry.
    pub collection: usize,
    pub trigger_start: usize,
    /// The trigger text as it appears in the input; empty in autocomplete mode.
    pub trigger: String,
    pub query: String,
    pub trailing_space_pending: bool,
}

impl TriggerInfo {
    /// Byte offset just past the query.
    pub fn end(&self) -> usize {
        self.trigger_start + self.trigger.len() + self.query.len()
    }
}

/// Flags that change how text before the cursor is interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanFlags<'a> {
    /// A menu is already showing; whitespace inside the query is tolerated.
    pub menu_already_open: bool,
    /// A trailing space was provisionally accepted; trim the query.
    pub has_trailing_space: bool,
    /// Global override allowing plain spaces inside queries.
    pub allow_spaces: bool,
    /// Ignore triggers and use the last token as the query.
    pub autocomplete: bool,
    /// Token separator for autocomplete mode. `None` uses the whole text.
    pub separator: Option<&'a Regex>,
}

/// Everything a scan reports, including the trailing-space side channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub open: Option<TriggerInfo>,
    /// The query after the chosen trigger contains disallowed whitespace.
    pub trailing_space: bool,
}

/// Decide whether a mention is open in `text`, the text before the cursor.
///
/// The right-most trigger occurrence across all specs wins. When two specs
/// start at the same offset the earlier registered one wins.
pub fn scan(text: &str, registry: &Registry, flags: &ScanFlags<'_>) -> ScanOutcome {
    if flags.autocomplete {
        return ScanOutcome {
            open: scan_autocomplete(text, registry, flags.separator),
            trailing_space: false,
        };
    }

    let mut best: Option<(usize, usize)> = None;
    for (idx, spec) in registry.iter().enumerate() {
        if spec.trigger.is_empty() {
            continue;
        }
        let found = if spec.require_leading_space {
            last_index_with_leading_space(text, &spec.trigger)
        } else {
            text.rfind(spec.trigger.as_str())
        };
        if let Some(pos) = found {
            if best.map_or(true, |(best_pos, _)| pos > best_pos) {
                best = Some((pos, idx));
            }
        }
    }

    let Some((pos, idx)) = best else {
        return ScanOutcome::default();
    };
    let Some(spec) = registry.get(idx) else {
        return ScanOutcome::default();
    };

    let after = &text[pos + spec.trigger.len()..];
    let starts_with_space = after.chars().next().is_some_and(char::is_whitespace);
    let snippet = if flags.has_trailing_space {
        after.trim()
    } else {
        after
    };

    let allow_spaces = flags.allow_spaces || spec.allow_spaces_in_query;
    let disallowed = |c: char| {
        if allow_spaces {
            c.is_whitespace() && c != ' '
        } else {
            c.is_whitespace()
        }
    };
    let trailing_space = snippet.chars().any(disallowed);

    let open = if !starts_with_space && (flags.menu_already_open || !trailing_space) {
        Some(TriggerInfo {
            collection: idx,
            trigger_start: pos,
            trigger: spec.trigger.clone(),
            query: snippet.to_string(),
            trailing_space_pending: trailing_space,
        })
    } else {
        None
    };

    ScanOutcome {
        open,
        trailing_space,
    }
}

fn scan_autocomplete(text: &str, registry: &Registry, separator: Option<&Regex>) -> Option<TriggerInfo> {
    if registry.is_empty() {
        return None;
    }
    let token = last_token(text, separator);
    Some(TriggerInfo {
        collection: 0,
        trigger_start: text.len() - token.len(),
        trigger: String::new(),
        query: token.to_string(),
        trailing_space_pending: false,
    })
}

/// Last separator-delimited token of `text`.
pub fn last_token<'t>(text: &'t str, separator: Option<&Regex>) -> &'t str {
    match separator {
        Some(sep) => sep.split(text).last().unwrap_or(""),
        None => text,
    }
}

/// Right-most start offset of `trigger` in `text` that is at offset 0 or
/// directly preceded by whitespace.
pub fn last_index_with_leading_space(text: &str, trigger: &str) -> Option<usize> {
    if trigger.is_empty() {
        return None;
    }
    text.char_indices().rev().find_map(|(pos, _)| {
        if !text[pos..].starts_with(trigger) {
            return None;
        }
        let preceded_by_space = text[..pos]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        preceded_by_space.then_some(pos)
    })
}
