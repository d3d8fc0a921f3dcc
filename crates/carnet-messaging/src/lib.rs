//! The messaging engine: conversation resolution, access policy, message
//! store, and admin-only conversation mutations.
//!
//! Everything here is synchronous; the HTTP layer wraps calls in
//! `spawn_blocking`.

pub mod admin;
pub mod error;
pub mod policy;
pub mod resolver;
pub mod store;

pub use error::MessagingError;
pub use resolver::ConversationEntry;
pub use store::NewMessage;
