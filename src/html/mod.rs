//! Element ids for the rendered panel.
//!
//! Markup itself is produced with `maud::html!`, which escapes every spliced
//! string. [`DomId`] is the one value spliced verbatim; it can only hold
//! `[A-Za-z0-9_-]`.

pub mod dom_id;

pub use dom_id::{is_dom_id, sanitize_key, DomId, DomIdAllocator};
