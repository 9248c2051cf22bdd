//! Device settings: model and persistence.

mod store;
mod types;

pub use store::*;
pub use types::*;
