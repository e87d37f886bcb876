//! Entity stores.
//!
//! # Submodules
//!
//! - [`entity`] - Generic collection and mutable store view
//! - [`notice`] - User-facing notifications
//! - [`workspace`] - Application context tying the stores together
//!
//! The `business`, `client` and `project` submodules add the
//! per-entity bookkeeping operations to [`EntityStore`].

mod business;
mod client;
pub mod entity;
pub mod notice;
mod project;
pub mod workspace;

pub use entity::{Collection, EntityStore};
pub use notice::{Notice, NoticeKind, NoticeLevel, Notices};
pub use workspace::Workspace;
