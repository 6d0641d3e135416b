use crate::navigator::{self, Direction};
use crate::ranking::{Candidate, RankedItem};
use crate::source::RequestId;
use crate::trigger::TriggerInfo;

/// Phase of an open session. A closed session does not exist at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A request is outstanding. Previously ranked items stay visible.
    Loading,
    Ready,
    /// Nothing matched and a placeholder is shown instead of closing.
    NoMatch { placeholder: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The response belongs to a superseded request and was ignored.
    Stale,
}

/// State of one live mention.
#[derive(Debug, Clone)]
pub struct Session<T> {
    info: TriggerInfo,
    external: bool,
    state: SessionState,
    ranked: Vec<RankedItem<T>>,
    selected: Option<usize>,
    request: Option<RequestId>,
}

impl<T: Candidate> Session<T> {
    pub fn new(info: TriggerInfo) -> Self {
        Self {
            info,
            external: false,
            state: SessionState::Loading,
            ranked: Vec::new(),
            selected: None,
            request: None,
        }
    }

    /// Session opened programmatically rather than by typing the trigger.
    pub fn external(info: TriggerInfo) -> Self {
        Self {
            external: true,
            ..Self::new(info)
        }
    }

    pub fn info(&self) -> &TriggerInfo {
        &self.info
    }

    pub fn collection(&self) -> usize {
        self.info.collection
    }

    pub fn query(&self) -> &str {
        &self.info.query
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn ranked(&self) -> &[RankedItem<T>] {
        &self.ranked
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&RankedItem<T>> {
        self.ranked.get(self.selected?)
    }

    /// Same mention, new scan result (query typed or deleted).
    pub fn update(&mut self, info: TriggerInfo) {
        self.info = info;
    }

    /// Record a freshly issued request. Older requests become stale.
    pub fn begin_request(&mut self, request: RequestId) {
        self.request = Some(request);
        self.state = SessionState::Loading;
    }

    pub fn is_current(&self, request: RequestId) -> bool {
        self.request == Some(request)
    }

    /// Install ranked items if `request` is still current and establish the
    /// selection on the first enabled item.
    pub fn apply_response(&mut self, request: RequestId, ranked: Vec<RankedItem<T>>) -> ApplyOutcome {
        if !self.is_current(request) {
            tracing::debug!(
                "ignoring stale response {request}, current is {:?}",
                self.request
            );
            return ApplyOutcome::Stale;
        }
        self.selected = navigator::first_enabled(ranked.iter().map(RankedItem::is_disabled));
        self.ranked = ranked;
        self.state = SessionState::Ready;
        ApplyOutcome::Applied
    }

    /// Keep the session open showing `placeholder` for an empty result.
    pub fn show_no_match(&mut self, placeholder: String) {
        self.state = SessionState::NoMatch { placeholder };
    }

    pub fn move_selection(&mut self, direction: Direction) -> Option<usize> {
        let ranked = &self.ranked;
        self.selected = navigator::step(self.selected, ranked.len(), direction, |i| {
            ranked[i].is_disabled()
        });
        tracing::debug!("selection moved {direction:?} to {:?}", self.selected);
        self.selected
    }

    /// Select `index` directly. Disabled or out-of-range indices are refused.
    pub fn set_selected(&mut self, index: usize) -> bool {
        match self.ranked.get(index) {
            Some(item) if !item.is_disabled() => {
                self.selected = Some(index);
                true
            }
            _ => false,
        }
    }

    pub fn unselect(&mut self) {
        self.selected = None;
    }

    /// The item a commit at `index` would insert, if any.
    pub fn commit_target(&self, index: Option<usize>) -> Option<&RankedItem<T>> {
        self.ranked.get(index?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::MentionEntry;

    fn info(query: &str) -> TriggerInfo {
        TriggerInfo {
            collection: 0,
            trigger_start: 0,
            trigger: "@".into(),
            query: query.into(),
            trailing_space_pending: false,
        }
    }

    fn ranked(entries: &[MentionEntry]) -> Vec<RankedItem<MentionEntry>> {
        entries
            .iter()
            .enumerate()
            .map(|(i, e)| RankedItem {
                original: e.clone(),
                rendered_label: e.key.clone(),
                score: 0,
                source_index: i,
            })
            .collect()
    }

    #[test]
    fn selection_starts_on_first_enabled() {
        let mut session = Session::new(info(""));
        session.begin_request(RequestId(1));
        let items = ranked(&[
            MentionEntry::new("a", "a").disabled(),
            MentionEntry::new("b", "b"),
        ]);
        assert_eq!(session.apply_response(RequestId(1), items), ApplyOutcome::Applied);
        assert_eq!(session.selected(), Some(1));
        assert_eq!(session.state(), &SessionState::Ready);
    }

    #[test]
    fn all_disabled_means_no_selection() {
        let mut session = Session::new(info(""));
        session.begin_request(RequestId(1));
        let items = ranked(&[MentionEntry::new("a", "a").disabled()]);
        session.apply_response(RequestId(1), items);
        assert_eq!(session.selected(), None);
        assert_eq!(session.move_selection(Direction::Down), None);
        assert!(session.commit_target(session.selected()).is_none());
    }

    #[test]
    fn reloading_keeps_previous_items() {
        let mut session = Session::new(info("a"));
        session.begin_request(RequestId(1));
        session.apply_response(RequestId(1), ranked(&[MentionEntry::new("a", "a")]));
        session.update(info("ab"));
        session.begin_request(RequestId(2));
        assert_eq!(session.state(), &SessionState::Loading);
        assert_eq!(session.ranked().len(), 1);
    }

    #[test]
    fn stale_response_leaves_items_untouched() {
        let mut session = Session::new(info("a"));
        session.begin_request(RequestId(1));
        session.apply_response(RequestId(1), ranked(&[MentionEntry::new("a", "a")]));
        session.begin_request(RequestId(2));
        let outcome = session.apply_response(RequestId(1), ranked(&[]));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert_eq!(session.ranked().len(), 1);
        assert_eq!(session.selected(), Some(0));
        assert_eq!(session.state(), &SessionState::Loading);
    }

    #[test]
    fn set_selected_refuses_disabled() {
        let mut session = Session::new(info(""));
        session.begin_request(RequestId(1));
        session.apply_response(
            RequestId(1),
            ranked(&[MentionEntry::new("a", "a"), MentionEntry::new("b", "b").disabled()]),
        );
        assert!(!session.set_selected(1));
        assert!(!session.set_selected(5));
        assert_eq!(session.selected(), Some(0));
        session.unselect();
        assert_eq!(session.selected(), None);
    }
}
