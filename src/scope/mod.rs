//! Change classification against the workspace layout
//!
//! Turns raw changed paths into a [`ChangeScope`]: which packages had source or test
//! changes, and whether the change set is lint-only or forces a whole-workspace run.

pub mod classifier;
pub mod rules;

pub use classifier::{ChangeClassifier, ChangeScope};
pub use rules::ClassifierRules;
