//! Resolve published files from a production-tracking database and open them
//! in the right application.
//!
//! A launch request names either a published file or a version. The
//! [`select`] module narrows it to one publish, [`resolve`] turns that into a
//! local path, and [`launch`] dispatches the path to the image viewer, a
//! launcher app or the OS default handler. [`pipeline`] strings the three
//! together.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod launch;
pub mod models;
pub mod pipeline;
pub mod registration;
pub mod resolve;
pub mod select;
pub mod tracker;

pub use error::LaunchError;
