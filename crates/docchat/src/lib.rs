//! A document-chat client assembling the session core with the HTTP
//! backend.
//!
//! The crate includes a CLI tool for chatting in the terminal. And you can
//! also use it as a library to bring document chat into your own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod session;

pub use docchat_core::{ChatSession, SessionEvent};
pub use session::SessionBuilder;

/// Re-exports of [`docchat_core`] crate.
pub mod core {
    pub use docchat_core::*;
}

/// Re-exports of [`docchat_http_backend`] crate.
pub mod http {
    pub use docchat_http_backend::*;
}

/// Re-exports of [`docchat_model`] crate.
pub mod model {
    pub use docchat_model::*;
}
