//! Domain model: items, identity, environments, categories, reference data,
//! and the error taxonomy.

pub mod category;
pub mod environment;
pub mod error;
pub mod identity;
pub mod item;
pub mod reference;

pub use category::{CategoryClass, ConfigCategory};
pub use environment::ReleaseEnvironment;
pub use error::{ReleaseError, Result};
pub use identity::{identity_key, ActionFamily};
pub use item::{EntityType, ReleaseAction, ReleaseItem};
pub use reference::{JobContextSummary, JobGroupNode, ReferenceData};
