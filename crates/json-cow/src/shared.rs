//! Shared document handles.
//!
//! A `SharedValue` is a cloneable single-threaded handle to a JSON document.
//! The original owner and any proxies hold clones of the same handle, so
//! owner-side mutations stay visible through every uncopied proxy. Exactly
//! one proxy node treats a given target as authoritative while uncopied;
//! the handle itself is shared, never exclusively owned, until duplication.

use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct SharedValue {
    inner: Rc<RefCell<Value>>,
}

impl SharedValue {
    pub fn new(value: Value) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Deep snapshot of the current document state.
    pub fn snapshot(&self) -> Value {
        self.inner.borrow().clone()
    }

    /// Owner-side mutation of the live document. Changes made here are
    /// visible through every uncopied proxy that still aliases this handle.
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// `true` when both handles point at the same live document.
    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.borrow())
    }

    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}

impl From<Value> for SharedValue {
    fn from(value: Value) -> Self {
        SharedValue::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_alias_the_same_document() {
        let doc = SharedValue::new(json!({"x": 1}));
        let alias = doc.clone();
        alias.update(|v| v["x"] = json!(2));
        assert_eq!(doc.snapshot(), json!({"x": 2}));
        assert!(doc.ptr_eq(&alias));
    }

    #[test]
    fn new_handles_are_distinct() {
        let a = SharedValue::new(json!(1));
        let b = SharedValue::new(json!(1));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn snapshot_is_independent() {
        let doc = SharedValue::new(json!({"x": [1]}));
        let snap = doc.snapshot();
        doc.update(|v| v["x"] = json!([2]));
        assert_eq!(snap, json!({"x": [1]}));
    }
}
