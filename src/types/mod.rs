//! Common value types shared by requests, profiles and the client.

mod format;
mod method;

pub use format::Format;
pub use method::{HttpMethod, Protocol};
