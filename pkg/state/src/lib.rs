//! Persistence boundary for the extension kinds.
//!
//! [`client::StateStore`] is the raw key/value layer (SlateDB over a local
//! object store). [`registry::Registry`] sits on top and is what the rest of
//! the system uses: objects keyed by `(namespace, name)` within their kind,
//! write-time validation, uid/timestamp/revision stamping, and
//! list-by-namespace queries returning the `*List` wrappers.

pub mod client;
pub mod registry;

pub use client::StateStore;
pub use registry::Registry;
