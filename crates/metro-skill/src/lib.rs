//! Voice skill engine for metro-minutes.
//!
//! Routes platform request envelopes through an ordered handler chain,
//! resolves spoken slot values, matches live train predictions, and keeps
//! session attributes in sync with a durable per-user store.

pub mod attributes;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod interceptor;
pub mod matcher;
pub mod response;
pub mod session;
pub mod slot;

pub use attributes::AttributesManager;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use envelope::{Intent, Request, RequestEnvelope, Slot};
pub use error::SkillError;
pub use handler::{ErrorHandler, HandlerInput, RequestHandler};
pub use interceptor::{RequestInterceptor, ResponseInterceptor};
pub use matcher::{ArrivalOutcome, PredictionMatcher, TrainQuery};
pub use response::{Response, ResponseBuilder, ResponseEnvelope};
pub use session::SessionStateManager;
pub use slot::{canonical_value, SlotValue};
