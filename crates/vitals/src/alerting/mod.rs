//! Alert records and the transition rules that emit them

pub mod transitions;
pub mod types;

pub use transitions::Transition;
pub use types::{Alert, AlertKind, AlertSeverity, NewAlert};
