//! Trigger detection, fuzzy ranking and menu state for `@mention`-style
//! suggestions in a text surface. Rendering and text storage stay with the
//! host, reached through [`host::MentionHost`].

pub mod collection;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod fuzzy;
pub mod host;
pub mod logging;
pub mod navigator;
pub mod ranking;
pub mod session;
pub mod settings;
pub mod source;
pub mod trigger;

pub use collection::{Collection, NoMatchTemplate};
pub use controller::{ControllerOptions, KeyResult, MentionController, MentionKey};
pub use error::MentionError;
pub use host::{CloseReason, CommitRequest, MentionEvent, MentionHost, TextEdit};
pub use ranking::{Candidate, Lookup, MentionEntry, RankedItem};
pub use source::{CandidateProvider, CandidateSource, Responder};
pub use trigger::TriggerSpec;
