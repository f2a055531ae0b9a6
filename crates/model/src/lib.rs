//! Wire protocol of the document-chat backend.
//!
//! This crate establishes the payloads exchanged with the backend and the
//! [`ChatBackend`] trait that transports implement, so the chat session can
//! run against the HTTP service in production and a scripted backend in
//! tests without modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod backend;
mod document;
mod error;
mod reply;
mod request;

pub use backend::*;
pub use document::*;
pub use error::*;
pub use reply::*;
pub use request::*;
