//! Effect sinks shipped with the crate.

pub mod collecting;

pub use collecting::CollectingSink;
