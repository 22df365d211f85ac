//! json-cow — copy-on-write transparent proxy over JSON object graphs.
//!
//! A [`CowProxy`] wraps a shared [`SharedValue`] document and defers
//! duplication until the first mutation, while every read behaves as if the
//! proxy already were an independent copy:
//!
//! - **Full-copy mode** duplicates the entire target on the first mutation
//!   and folds every pending nested override into the duplicate.
//! - **Partial-copy mode** tracks writes and deletes per attribute without
//!   ever duplicating the target.
//!
//! Polymorphic operations (arithmetic, comparison, container protocol,
//! iteration, string conversion) are forwarded to the wrapped value through
//! per-kind surfaces cached by a [`ProxyFactory`].
//!
//! ```
//! use json_cow::{Attr, CopyMode, CowProxy, SharedValue};
//! use serde_json::json;
//!
//! let doc = SharedValue::new(json!({"a": {"x": 1}, "b": {"x": 3}}));
//! let proxy = CowProxy::new(doc.clone(), CopyMode::Full);
//!
//! // Reads are free: nothing is duplicated yet.
//! let a = proxy.get("a").unwrap().into_node().unwrap();
//! assert_eq!(a.get("x").unwrap().into_value(), Some(json!(1)));
//!
//! // The first write duplicates; the original is untouched.
//! let b = proxy.get("b").unwrap().into_node().unwrap();
//! b.set("x", json!(99)).unwrap();
//! assert_eq!(doc.snapshot()["b"]["x"], json!(3));
//! assert_eq!(proxy.get("b").unwrap().view().unwrap()["x"], json!(99));
//! ```

pub mod factory;
pub mod forward;
pub mod kind;
pub mod proxy;
pub mod shared;
pub mod step;

pub use factory::{ProxyFactory, ProxyStats, TypeCache};
pub use forward::{ForwardOp, ForwardingSurface, Operand};
pub use kind::ValueKind;
pub use proxy::{Attr, CopyMode, CowProxy, ProxyError, RESERVED_PREFIX};
pub use shared::SharedValue;
pub use step::Step;

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
