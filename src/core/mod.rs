//! Core change-analysis stages

pub mod composite;
pub mod baseline;
pub mod change;
pub mod persistence;
pub mod area;
pub mod first_occurrence;

// Re-export main types
pub use composite::{reduce_stack, Reducer, TemporalCompositor};
pub use baseline::BaselineBuilder;
pub use change::ChangeDetector;
pub use persistence::PersistenceFilter;
pub use area::AreaQuantifier;
pub use first_occurrence::FirstOccurrenceResolver;
