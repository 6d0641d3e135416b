use crate::ranking::RankedItem;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Escape or an explicit hide.
    Cancelled,
    Committed,
    /// The scanner no longer finds an open trigger.
    NoTrigger,
    BelowMinimum,
    /// Nothing matched and the collection has no placeholder.
    NoMatch,
    /// A space ended the mention.
    TrailingSpace,
    /// Scroll or resize.
    Dismissed,
    /// A different trigger occurrence took over.
    Superseded,
}

/// Lifecycle signals relayed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionEvent {
    Opened { collection: usize, trigger: String },
    Closed { reason: CloseReason },
    NoMatch,
    /// A commit found nothing to insert. `content` is what the select
    /// template produced without an item.
    SelectedNoMatch { content: String },
    Replaced { content: String },
}

/// Replacement of `start..end` (UTF-8 byte offsets) with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextEdit {
    /// Cursor position after the edit is applied.
    pub fn cursor_after(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn apply(&self, input: &mut String) {
        input.replace_range(self.start..self.end, &self.text);
    }
}

/// Everything the host needs to write a committed mention.
#[derive(Debug, Clone)]
pub struct CommitRequest<'a, T> {
    pub item: &'a RankedItem<T>,
    /// Select template output, without the suffix.
    pub content: String,
    pub edit: TextEdit,
}

/// The text surface hosting mentions.
///
/// Methods are called synchronously from controller operations; the host is
/// always passed in explicitly.
pub trait MentionHost<T> {
    /// Text before the caret, recomputed on every call.
    fn text_before_cursor(&self) -> String;

    fn render_ranked(&mut self, items: &[RankedItem<T>], selected: Option<usize>);

    /// Show a literal row instead of items (loading or no-match).
    fn render_placeholder(&mut self, content: &str);

    fn commit_text(&mut self, commit: CommitRequest<'_, T>);

    /// Insert `text` at the caret; used when a menu is opened programmatically.
    fn insert_at_cursor(&mut self, text: &str);

    /// Committed mentions of `trigger` already present in the surface.
    fn active_mention_count(&self, _trigger: &str) -> usize {
        0
    }

    fn emit(&mut self, _event: MentionEvent) {}
}
