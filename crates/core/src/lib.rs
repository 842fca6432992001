pub mod assembly;
pub mod config;
pub mod constraints;
pub mod context;
pub mod error;
pub mod generator;
pub mod graph;
pub mod hallway;
#[doc(hidden)]
pub mod invariants;
pub mod library;
pub mod model;
pub mod rng;
pub mod routing;
pub mod selection;
pub mod types;

pub use config::{GenerationConfig, RoutingCosts};
pub use constraints::{Amount, Cardinality, Constraint, ConstraintTarget, Predicate, TagMode};
pub use error::{ConfigurationError, GenerationError, RoutingFailure, TemplateSelectionError};
pub use generator::generate;
pub use library::{TemplateLibrary, starter_library};
pub use model::{Diagnostics, GeneratedLevel, GridSnapshot};
pub use types::*;
