pub mod http;
pub mod mock;

pub use http::HttpSearchBackend;
pub use mock::{MockCall, MockSearchBackend};
