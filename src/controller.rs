use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use regex::Regex;

use crate::collection::Collection;
use crate::debounce::{Debouncer, DISMISS_DEBOUNCE};
use crate::error::{MentionError, Result};
use crate::host::{CloseReason, CommitRequest, MentionEvent, MentionHost, TextEdit};
use crate::navigator::Direction;
use crate::ranking::{Candidate, RankedItem, RankingPipeline};
use crate::session::{ApplyOutcome, Session};
use crate::source::{CandidateSource, RequestId, Responder, Response};
use crate::trigger::{self, Registry, ScanFlags, ScanOutcome, TriggerInfo, DEFAULT_SEPARATOR};

/// Surface-wide behaviour shared by all collections.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub allow_spaces: bool,
    /// Match the last token without any trigger, using the first collection.
    pub autocomplete_mode: bool,
    pub autocomplete_separator: Option<Regex>,
    /// A space commits the selection instead of closing the menu.
    pub space_selects_match: bool,
    /// Appended to committed text.
    pub replace_text_suffix: String,
    pub dismiss_debounce: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            allow_spaces: false,
            autocomplete_mode: false,
            autocomplete_separator: Some(Regex::clone(&DEFAULT_SEPARATOR)),
            space_selects_match: false,
            replace_text_suffix: " ".into(),
            dismiss_debounce: DISMISS_DEBOUNCE,
        }
    }
}

/// Keys with a meaning while a menu is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKey {
    Enter,
    Tab,
    Escape,
    Space,
    ArrowUp,
    ArrowDown,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// The host should suppress the key's default action.
    Consumed,
    Ignored,
}

/// Owns the collections and the single live mention session of one surface.
pub struct MentionController<T> {
    collections: Vec<Collection<T>>,
    registry: Registry,
    options: ControllerOptions,
    pipeline: RankingPipeline,
    session: Option<Session<T>>,
    has_trailing_space: bool,
    next_request: u64,
    tx: Sender<Response<T>>,
    rx: Receiver<Response<T>>,
    dismiss: Debouncer,
}

impl<T: Candidate + Clone> MentionController<T> {
    pub fn new(collections: Vec<Collection<T>>, options: ControllerOptions) -> Result<Self> {
        if collections.is_empty() {
            return Err(MentionError::Configuration("no collection specified".into()));
        }
        for collection in &collections {
            collection.validate()?;
        }
        if options.autocomplete_mode && collections.len() > 1 {
            tracing::warn!(
                "autocomplete mode only uses the first of {} collections",
                collections.len()
            );
        }

        let registry = collections.iter().map(|c| c.spec.clone()).collect();
        let (tx, rx) = channel();
        let dismiss = Debouncer::new(options.dismiss_debounce);
        Ok(Self {
            collections,
            registry,
            options,
            pipeline: RankingPipeline::new(),
            session: None,
            has_trailing_space: false,
            next_request: 1,
            tx,
            rx,
            dismiss,
        })
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn collections(&self) -> &[Collection<T>] {
        &self.collections
    }

    pub fn collection(&self, index: usize) -> Option<&Collection<T>> {
        self.collections.get(index)
    }

    pub fn session(&self) -> Option<&Session<T>> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Menu labels for the open session, through the collection's item template.
    pub fn menu_labels(&self) -> Vec<String> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let collection = &self.collections[session.collection()];
        session
            .ranked()
            .iter()
            .map(|item| collection.menu_item(item))
            .collect()
    }

    fn scan_flags(&self, menu_already_open: bool, has_trailing_space: bool) -> ScanFlags<'_> {
        ScanFlags {
            menu_already_open,
            has_trailing_space,
            allow_spaces: self.options.allow_spaces,
            autocomplete: self.options.autocomplete_mode,
            separator: self.options.autocomplete_separator.as_ref(),
        }
    }

    /// Scan `text` with this controller's registry and options.
    pub fn scan(&self, text: &str, menu_already_open: bool) -> ScanOutcome {
        let flags = self.scan_flags(menu_already_open, self.has_trailing_space);
        trigger::scan(text, &self.registry, &flags)
    }

    /// Re-evaluate the text before the cursor after it changed.
    pub fn handle_input<H: MentionHost<T>>(&mut self, host: &mut H) {
        let text = host.text_before_cursor();
        let info = match self.external_continuation(&text) {
            Some(info) => info,
            None => {
                let outcome = self.scan(&text, false);
                self.has_trailing_space = outcome.trailing_space;

                if self.has_trailing_space && !self.options.allow_spaces {
                    self.has_trailing_space = false;
                    if self.session.is_some() {
                        self.on_space(host);
                        self.close(CloseReason::TrailingSpace, host);
                    }
                    return;
                }

                let Some(info) = outcome.open else {
                    self.close(CloseReason::NoTrigger, host);
                    return;
                };
                info
            }
        };

        match &mut self.session {
            Some(session)
                if session.collection() == info.collection
                    && session.info().trigger_start == info.trigger_start =>
            {
                if session.query() == info.query {
                    return;
                }
                let below = self.collections[info.collection].spec.min_query_length
                    > info.query.chars().count();
                session.update(info);
                if below && !session.is_external() {
                    self.close(CloseReason::BelowMinimum, host);
                } else {
                    self.request_candidates(host);
                }
            }
            Some(_) => {
                self.close(CloseReason::Superseded, host);
                self.open(info, false, host);
            }
            None => {
                self.open(info, false, host);
            }
        }
    }

    /// Keep an externally opened mention alive where the scanner alone would
    /// not accept it (e.g. no whitespace before the inserted trigger). Tried
    /// before scanning so an earlier trigger cannot take the session over.
    fn external_continuation(&self, text: &str) -> Option<TriggerInfo> {
        let session = self.session.as_ref().filter(|s| s.is_external())?;
        let info = session.info();
        let query = text.get(info.trigger_start..)?.strip_prefix(info.trigger.as_str())?;
        let spec = &self.collections[info.collection].spec;
        let spaces = self.options.allow_spaces || spec.allow_spaces_in_query;
        if query
            .chars()
            .any(|c| c.is_whitespace() && !(spaces && c == ' '))
        {
            return None;
        }
        Some(TriggerInfo {
            query: query.to_string(),
            ..info.clone()
        })
    }

    /// Whether collection `index` may start another mention.
    fn accepts_mention<H: MentionHost<T>>(&self, index: usize, host: &H) -> bool {
        let Some(collection) = self.collections.get(index) else {
            return false;
        };
        let spec = &collection.spec;
        if spec.blocked {
            tracing::debug!("trigger `{}` is blocked", spec.trigger);
            return false;
        }
        match spec.max_active_mentions {
            Some(max) if max > 0 && host.active_mention_count(&spec.trigger) >= max => {
                tracing::debug!("trigger `{}` already has {max} mentions", spec.trigger);
                false
            }
            _ => true,
        }
    }

    fn open<H: MentionHost<T>>(&mut self, info: TriggerInfo, external: bool, host: &mut H) -> bool {
        if !self.accepts_mention(info.collection, host) {
            return false;
        }
        let spec = &self.collections[info.collection].spec;
        if !external && info.query.chars().count() < spec.min_query_length {
            return false;
        }

        tracing::debug!(
            "opening mention `{}` at {} with query {:?}",
            info.trigger,
            info.trigger_start,
            info.query
        );
        let event = MentionEvent::Opened {
            collection: info.collection,
            trigger: spec.trigger.clone(),
        };
        self.session = Some(if external {
            Session::external(info)
        } else {
            Session::new(info)
        });
        self.dismiss.cancel();
        host.emit(event);
        self.request_candidates(host);
        true
    }

    fn close<H: MentionHost<T>>(&mut self, reason: CloseReason, host: &mut H) {
        if let Some(session) = self.session.take() {
            tracing::debug!(
                "closing mention `{}` ({reason:?})",
                session.info().trigger
            );
            self.dismiss.cancel();
            host.emit(MentionEvent::Closed { reason });
        }
    }

    /// Close the open menu, if any.
    pub fn hide_menu<H: MentionHost<T>>(&mut self, host: &mut H) {
        self.close(CloseReason::Cancelled, host);
    }

    fn issue_request(&mut self) -> Option<(RequestId, String, usize)> {
        let session = self.session.as_mut()?;
        let request = RequestId(self.next_request);
        self.next_request += 1;
        session.begin_request(request);
        Some((request, session.query().to_string(), session.collection()))
    }

    fn request_candidates<H: MentionHost<T>>(&mut self, host: &mut H) {
        let Some((request, query, index)) = self.issue_request() else {
            return;
        };
        tracing::debug!("requesting candidates {request} for {query:?}");

        let collection = &self.collections[index];
        let ranked = match collection.source() {
            CandidateSource::Static(values) => Some(self.pipeline.rank(
                &query,
                values,
                collection.lookup(),
                collection.search(),
                collection.limits(),
            )),
            CandidateSource::Provider(_) => None,
        };
        if let Some(ranked) = ranked {
            self.apply_ranked(request, ranked, host);
            return;
        }

        let collection = &mut self.collections[index];
        if let Some(loading) = collection.loading_template() {
            host.render_placeholder(loading);
        }
        if let CandidateSource::Provider(provider) = collection.source_mut() {
            provider.resolve(&query, Responder::new(request, self.tx.clone()));
        }
        self.pump_responses(host);
    }

    /// Apply every provider response that has arrived. Returns how many were
    /// applied; stale responses are dropped.
    pub fn pump_responses<H: MentionHost<T>>(&mut self, host: &mut H) -> usize {
        let mut applied = 0;
        loop {
            match self.rx.try_recv() {
                Ok(response) => {
                    if self.apply_response(response, host) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    fn apply_response<H: MentionHost<T>>(&mut self, response: Response<T>, host: &mut H) -> bool {
        let Some(session) = &self.session else {
            tracing::debug!("dropping response {}: no open mention", response.request);
            return false;
        };
        if !session.is_current(response.request) {
            tracing::debug!("dropping stale response {}", response.request);
            return false;
        }

        let values = match response.outcome {
            Ok(values) => values,
            Err(reason) => {
                tracing::warn!("candidate provider failed: {reason}");
                Vec::new()
            }
        };
        let collection = &self.collections[session.collection()];
        let ranked = self.pipeline.rank(
            session.query(),
            &values,
            collection.lookup(),
            collection.search(),
            collection.limits(),
        );
        self.apply_ranked(response.request, ranked, host)
    }

    fn apply_ranked<H: MentionHost<T>>(
        &mut self,
        request: RequestId,
        ranked: Vec<RankedItem<T>>,
        host: &mut H,
    ) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.apply_response(request, ranked) == ApplyOutcome::Stale {
            return false;
        }

        if session.ranked().is_empty() {
            host.emit(MentionEvent::NoMatch);
            match self.collections[session.collection()].no_match().resolve() {
                Some(placeholder) => {
                    host.render_placeholder(&placeholder);
                    session.show_no_match(placeholder);
                }
                None => self.close(CloseReason::NoMatch, host),
            }
        } else {
            host.render_ranked(session.ranked(), session.selected());
        }
        true
    }

    /// Handle a navigation or command key pressed while typing.
    pub fn handle_key<H: MentionHost<T>>(&mut self, key: MentionKey, host: &mut H) -> KeyResult {
        let Some(session) = &self.session else {
            return KeyResult::Ignored;
        };
        match key {
            MentionKey::Enter | MentionKey::Tab => self.accept(host),
            MentionKey::Escape => {
                self.close(CloseReason::Cancelled, host);
                KeyResult::Consumed
            }
            MentionKey::Space => self.on_space(host),
            MentionKey::ArrowUp | MentionKey::ArrowDown => {
                if session.ranked().is_empty() {
                    return KeyResult::Ignored;
                }
                let direction = if key == MentionKey::ArrowUp {
                    Direction::Up
                } else {
                    Direction::Down
                };
                self.navigate(direction, host);
                KeyResult::Consumed
            }
            MentionKey::Backspace => {
                if session.query().is_empty() {
                    self.close(CloseReason::Cancelled, host);
                }
                KeyResult::Ignored
            }
        }
    }

    fn accept<H: MentionHost<T>>(&mut self, host: &mut H) -> KeyResult {
        let Some(session) = &self.session else {
            return KeyResult::Ignored;
        };
        if session.ranked().is_empty() {
            return KeyResult::Ignored;
        }
        let selected = session.selected();
        if self.select_item_at_index(selected, host).is_err() {
            return KeyResult::Ignored;
        }
        self.close(CloseReason::Cancelled, host);
        KeyResult::Consumed
    }

    fn on_space<H: MentionHost<T>>(&mut self, host: &mut H) -> KeyResult {
        let Some(session) = &self.session else {
            return KeyResult::Ignored;
        };
        if self.options.space_selects_match {
            return self.accept(host);
        }
        let spec = &self.collections[session.collection()].spec;
        if !self.options.allow_spaces && !spec.allow_spaces_in_query {
            self.close(CloseReason::TrailingSpace, host);
        }
        KeyResult::Ignored
    }

    fn navigate<H: MentionHost<T>>(&mut self, direction: Direction, host: &mut H) -> Option<usize> {
        let session = self.session.as_mut()?;
        let selected = session.move_selection(direction);
        host.render_ranked(session.ranked(), selected);
        selected
    }

    /// Move the selection one step, skipping disabled items.
    pub fn move_selection<H: MentionHost<T>>(
        &mut self,
        direction: Direction,
        host: &mut H,
    ) -> Result<Option<usize>> {
        if self.session.is_none() {
            return Err(no_active_mention());
        }
        Ok(self.navigate(direction, host))
    }

    /// Select `index` directly, as a pointer hover would. Returns whether the
    /// selection changed.
    pub fn set_selected<H: MentionHost<T>>(&mut self, index: usize, host: &mut H) -> Result<bool> {
        let session = self.session.as_mut().ok_or_else(no_active_mention)?;
        if session.selected() == Some(index) || !session.set_selected(index) {
            return Ok(false);
        }
        host.render_ranked(session.ranked(), session.selected());
        Ok(true)
    }

    pub fn unselect<H: MentionHost<T>>(&mut self, host: &mut H) -> Result<()> {
        let session = self.session.as_mut().ok_or_else(no_active_mention)?;
        session.unselect();
        host.render_ranked(session.ranked(), None);
        Ok(())
    }

    /// Commit the item at `index`.
    ///
    /// With no item there (`None`, out of range, empty list) nothing is
    /// inserted: `SelectedNoMatch` is emitted and the session stays open.
    /// Otherwise the host receives the edit and the session closes.
    pub fn select_item_at_index<H: MentionHost<T>>(
        &mut self,
        index: Option<usize>,
        host: &mut H,
    ) -> Result<()> {
        let session = self.session.as_ref().ok_or_else(no_active_mention)?;
        let collection = &self.collections[session.collection()];
        let info = session.info();
        let item = session.commit_target(index);
        let content = collection.select_content(item, &info.trigger, &info.query);

        let Some(item) = item else {
            tracing::debug!("nothing to commit at {index:?}");
            host.emit(MentionEvent::SelectedNoMatch { content });
            return Ok(());
        };

        let text = host.text_before_cursor();
        let start = if session.is_external() {
            info.trigger_start
        } else {
            let flags = self.scan_flags(true, true);
            trigger::scan(&text, &self.registry, &flags)
                .open
                .filter(|current| current.collection == info.collection)
                .map_or(info.trigger_start, |current| current.trigger_start)
        };
        let edit = TextEdit {
            start: start.min(text.len()),
            end: text.len(),
            text: format!("{content}{}", self.options.replace_text_suffix),
        };
        host.commit_text(CommitRequest {
            item,
            content: content.clone(),
            edit,
        });
        host.emit(MentionEvent::Replaced { content });
        self.has_trailing_space = false;
        self.close(CloseReason::Committed, host);
        Ok(())
    }

    /// Commit whatever is currently selected.
    pub fn commit_selected<H: MentionHost<T>>(&mut self, host: &mut H) -> Result<()> {
        let selected = self
            .session
            .as_ref()
            .ok_or_else(no_active_mention)?
            .selected();
        self.select_item_at_index(selected, host)
    }

    /// Open a menu for `index` without the user typing the trigger. The
    /// trigger is inserted at the cursor through the host.
    pub fn show_menu_for_collection<H: MentionHost<T>>(&mut self, index: usize, host: &mut H) -> Result<()> {
        let collection = self.collections.get(index).ok_or_else(|| {
            MentionError::Argument(format!("no collection at index {index}"))
        })?;
        let trigger = collection.spec.trigger.clone();
        if !self.accepts_mention(index, host) {
            return Ok(());
        }

        self.close(CloseReason::Superseded, host);
        host.insert_at_cursor(&trigger);
        let text = host.text_before_cursor();
        let info = TriggerInfo {
            collection: index,
            trigger_start: text.len().saturating_sub(trigger.len()),
            trigger,
            query: String::new(),
            trailing_space_pending: false,
        };
        self.open(info, true, host);
        Ok(())
    }

    /// Replace or extend the static values of collection `index`.
    pub fn append(&mut self, index: usize, values: Vec<T>, replace: bool) -> Result<()> {
        let collection = self.collections.get_mut(index).ok_or_else(|| {
            MentionError::Argument(format!("no collection at index {index}"))
        })?;
        collection.append(values, replace)
    }

    /// Like [`append`](Self::append) for the collection of the open mention.
    pub fn append_current(&mut self, values: Vec<T>, replace: bool) -> Result<()> {
        let index = self
            .session
            .as_ref()
            .map(Session::collection)
            .ok_or_else(|| {
                MentionError::State("no active mention; use append with an index".into())
            })?;
        self.collections[index].append(values, replace)
    }

    /// Record a scroll or resize. The menu closes once the burst settles.
    pub fn notify_viewport_change(&mut self, now: Instant) {
        if self.session.is_some() {
            self.dismiss.notify(now);
        }
    }

    /// Drive time-based work. Returns `true` if the open menu was dismissed.
    pub fn tick<H: MentionHost<T>>(&mut self, now: Instant, host: &mut H) -> bool {
        if !self.dismiss.poll(now) || self.session.is_none() {
            return false;
        }
        self.close(CloseReason::Dismissed, host);
        true
    }
}

fn no_active_mention() -> MentionError {
    MentionError::State("no active mention".into())
}
