// src/controller/mod.rs

pub mod collection;
pub mod debounce;
pub mod detail;
pub mod filters;
pub mod form;
pub mod selection;

pub use collection::{BulkAction, BulkOutcome, Collection, ListEndpoint, Resource};
pub use debounce::Debouncer;
pub use detail::{DetailLoader, DetailSlot};
pub use filters::{FilterChange, ListParams};
pub use form::{Draft, FormController, FormPhase, SubmitOutcome};
pub use selection::SelectionTracker;
