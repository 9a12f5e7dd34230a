//! Data model for the extension API: the scale subresource, horizontal pod
//! autoscalers, and dynamically registered third-party kinds.
//!
//! Everything here is inert data exchanged between the API layer, the state
//! store, and control loops. Behavior (resolution, persistence, serving)
//! lives in the collaborating crates.

pub mod error;
pub mod hpa;
pub mod meta;
pub mod quantity;
pub mod scale;
pub mod thirdparty;
pub mod validate;
