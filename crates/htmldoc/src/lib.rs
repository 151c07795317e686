//! In-memory HTML document tree with opt-in transactional rollback
//!
//! Three layers, strictly separated:
//!
//! - the node model: an arena-backed tree of tagged elements with ordered
//!   attributes and ordered children ([`Document`] and its mutation
//!   primitives), oblivious to transactions beyond recording inverses
//! - the transaction log: a scoped, stack-based undo mechanism
//!   ([`Transaction`]) that mutation primitives register reified inverse
//!   actions with while a scope is active
//! - the serializer: a recursive writer ([`Serializer`], [`render`]) that
//!   reads the tree and produces HTML text with exact escaping,
//!   self-closing, and pretty-printing rules
//!
//! ```
//! use htmldoc::{render, Document, DocumentConfig, TextMode};
//!
//! let mut doc = Document::with_config(DocumentConfig {
//!     title: Some("hello".to_string()),
//!     dynamic: false,
//! });
//! let p = doc.create_child(doc.body(), "p").unwrap();
//! doc.append_text(p, "hi there", TextMode::Escaped, false).unwrap();
//!
//! let mut tx = doc.transaction();
//! tx.set_attribute(p, "class", "greeting").unwrap();
//! tx.rollback(); // the attribute is gone again
//!
//! let html = render(&doc, false).unwrap();
//! assert!(html.starts_with("<!DOCTYPE html>"));
//! ```

pub mod document;
pub mod error;
pub mod escape;
pub mod serializer;
pub mod transaction;
pub mod types;

pub use document::{Document, DocumentConfig};
pub use error::{DomError, Result};
pub use serializer::{render, Serializer, SerializerConfig};
pub use transaction::Transaction;
pub use types::{Child, Node, NodeId, TextMode};
