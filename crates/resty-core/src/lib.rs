pub mod client;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod export;
pub mod pagination;
pub mod query;
pub mod records;
mod util;

pub use client::{Client, Method};
pub use credentials::Credentials;
pub use error::{ConfigError, Error};
pub use pagination::{Continuation, FetchOptions};
pub use util::http_client;
