//! Step addressing into objects and arrays.
//!
//! A `Step` names one attribute of an aggregate: an object key or an array
//! index. Proxies locate their targets inside a shared document by a path
//! of steps.

use serde_json::Value;
use std::fmt;

use crate::kind::ValueKind;
use crate::proxy::ProxyError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) => f.write_str(key),
            Step::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for Step {
    fn from(key: &str) -> Self {
        Step::Key(key.to_owned())
    }
}

impl From<String> for Step {
    fn from(key: String) -> Self {
        Step::Key(key)
    }
}

impl From<usize> for Step {
    fn from(index: usize) -> Self {
        Step::Index(index)
    }
}

pub(crate) fn value_at_path<'a>(root: &'a Value, path: &[Step]) -> Option<&'a Value> {
    let mut cur = root;
    for step in path {
        cur = match (step, cur) {
            (Step::Key(key), Value::Object(map)) => map.get(key)?,
            (Step::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(cur)
}

pub(crate) fn value_at_path_mut<'a>(root: &'a mut Value, path: &[Step]) -> Option<&'a mut Value> {
    let mut cur = root;
    for step in path {
        cur = match (step, cur) {
            (Step::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (Step::Index(index), Value::Array(items)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Immutable read of one attribute of `target`.
pub(crate) fn read_step<'a>(target: &'a Value, step: &Step) -> Result<&'a Value, ProxyError> {
    match (step, target) {
        (Step::Key(key), Value::Object(map)) => map
            .get(key)
            .ok_or_else(|| ProxyError::NoSuchAttribute(step.clone())),
        (Step::Index(index), Value::Array(items)) => items
            .get(*index)
            .ok_or_else(|| ProxyError::NoSuchAttribute(step.clone())),
        _ => Err(ProxyError::NotAContainer(ValueKind::of(target))),
    }
}

/// Writes one attribute of `target`. Object writes insert; array writes to
/// an out-of-range index pad the array with nulls first.
pub(crate) fn write_step(target: &mut Value, step: &Step, value: Value) -> Result<(), ProxyError> {
    match (step, &mut *target) {
        (Step::Key(key), Value::Object(map)) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        (Step::Index(index), Value::Array(items)) => {
            if *index >= items.len() {
                items.resize(*index + 1, Value::Null);
            }
            items[*index] = value;
            Ok(())
        }
        _ => Err(ProxyError::NotAContainer(ValueKind::of(target))),
    }
}

/// Removes one attribute of `target`, returning the removed value.
pub(crate) fn remove_step(target: &mut Value, step: &Step) -> Result<Value, ProxyError> {
    match (step, &mut *target) {
        (Step::Key(key), Value::Object(map)) => map
            .shift_remove(key)
            .ok_or_else(|| ProxyError::NoSuchAttribute(step.clone())),
        (Step::Index(index), Value::Array(items)) => {
            if *index >= items.len() {
                return Err(ProxyError::NoSuchAttribute(step.clone()));
            }
            Ok(items.remove(*index))
        }
        _ => Err(ProxyError::NotAContainer(ValueKind::of(target))),
    }
}
