pub mod api;
pub mod callback;
pub mod core;

pub use api::{AnyPayBuilder, AnyPayClient};
pub use callback::{CallbackConfig, CallbackHandler, CallbackReply, CallbackRequest, CallbackServer};
pub use crate::core::{config::AnyPayConfig, errors::AnyPayError, types::RemoteMethodResult};
