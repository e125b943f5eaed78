//! Suspicious-activity classification and alert dispatch.
//!
//! The classifier decides whether a monitored event is alert-worthy
//! against a fixed rule table; the formatter renders a taxonomy-specific
//! message; the dispatcher forwards it to the notification sink
//! synchronously, with a bounded timeout and no retries.

mod classifier;
mod dispatcher;
mod message;

pub use classifier::{Classifier, Rule};
pub use dispatcher::{AlertDispatcher, DispatchError};
pub use message::AlertMessage;
