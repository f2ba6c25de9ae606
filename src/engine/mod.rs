pub mod functor;
pub mod matcher;
pub mod schema;
pub mod traversal;

pub use functor::{functor, Evaluation};
pub use matcher::matcher;
pub use schema::{Comparator, Criterion, PairCombinator, Structure, DEFAULT_SCHEMA, LEVEL_COUNT};
pub use traversal::Engine;
