pub mod compare;
pub mod reason;
pub mod reorder;
pub mod types;

pub use compare::*;
pub use reason::*;
pub use reorder::*;
pub use types::*;
