pub mod color;
pub mod config;
pub mod plan;
pub mod reference;
pub mod store;
pub mod sync;
pub mod token;
pub mod transform;
pub mod value;
pub mod variant;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{ConfigError, SyncConfig};
pub use plan::{PlanAction, PlanEntry, plan};
pub use store::{MemoryStore, VariableStore, VariableType};
pub use sync::{FailureKind, SyncError, SyncFailure, SyncReport, SyncSession, synchronize};
pub use token::{Token, TokenNode, TokenTree, TreeError};
pub use transform::{TransformError, TransformRegistry, TransformRule};
pub use value::{Rgba, TokenValue, VariableValue};
pub use variant::{VariantMap, VariantSet};
