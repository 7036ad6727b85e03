//! Domain models for the publish launcher.
//!
//! # Core Concepts
//!
//! - [`PublishedFile`]: a tracked reference to a produced file, carrying either
//!   a local path or a `file://` URL in its [`PathDescriptor`].
//! - [`Version`]: a review entity linking to one or more published files. The
//!   link field depends on the site's [`PublishedFileType`].
//! - [`LaunchContext`]: project/entity/task coordinates passed on to launcher
//!   apps.
//! - [`Platform`]: the host platform, which decides every shell command shape.
//!
//! [`Project`], [`Entity`] and [`Task`] are the surrounding tracking records
//! the launcher reads to build contexts and folder structures.

mod context;
mod entity;
mod platform;
mod publish;
mod tracking;
mod version;

pub use context::*;
pub use entity::*;
pub use platform::*;
pub use publish::*;
pub use tracking::*;
pub use version::*;
