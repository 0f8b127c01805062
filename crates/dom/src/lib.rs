//! In-memory host document tree
//!
//! Arena-backed document with the primitive operations a browser exposes:
//! node creation, attribute access, parent/child traversal, insertion,
//! detachment and batch reordering.
//!
//! ## Core Design
//!
//! ```text
//! DomArena (owned Vec<DomNode>) ← DocumentHost (primitive trait)
//!        ↓                              ↑
//!   NodeId (u32)              element wrappers, serializer
//! ```

pub mod arena;
pub mod error;
pub mod host;
pub mod loader;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use host::DocumentHost;
pub use loader::{DomLoader, LoaderConfig};
pub use serializer::{DomSerializer, SerializerConfig};
pub use types::*;
