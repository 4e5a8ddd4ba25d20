pub mod config;
pub mod error;
pub mod factory;
pub mod providers;
pub mod session;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::ClientError;
pub use factory::*;
pub use session::*;
pub use traits::*;
pub use types::*;
