//! Element handles over a host document tree
//!
//! An [`ElementHandle`] owns one element node and exposes its tag,
//! attributes, parent and children as get/set pairs that mutate the live
//! tree directly. It can also reorder the element among its siblings.
//!
//! ```text
//! ElementHandle ──(DocumentHost primitives)──▶ DomArena
//!      │                                          │
//!   NodeId ◀──────────── sole authority ──────────┘
//! ```
//!
//! Handles hold no copies of node state, so there is nothing to go stale.
//! Setters take typed inputs ([`Child`], [`Parent`], [`Position`]) and
//! report bad values as [`ElementError`].

pub mod content;
pub mod error;
pub mod handle;

pub use content::{Child, Parent, Position};
pub use error::{ElementError, Result};
pub use handle::{ElementHandle, ElementOptions, DEFAULT_TAG};
