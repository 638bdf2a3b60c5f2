//! Request and response message types.

mod body;
mod collection;
mod headers;
mod response;

pub use body::{Body, FormFile};
pub use headers::Headers;
pub use response::{Redirect, Response, TransferInfo};

pub(crate) use body::compile;
pub(crate) use collection::ResponseCollection;
