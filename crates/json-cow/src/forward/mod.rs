//! Polymorphic operation forwarding.
//!
//! A fixed, enumerated set of operations (arithmetic, comparison, container
//! protocol, iteration, string conversion) is delegated to the wrapped
//! value. Proxy-typed operands are unwrapped to their current authoritative
//! value first; results propagate raw and are never wrapped — only attribute
//! access participates in copy-on-write tracking.

use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use json_cow_util::deep_equal;

use crate::proxy::{CowProxy, ProxyError};

mod surface;

pub use surface::ForwardingSurface;

/// The enumerated forwarding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForwardOp {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Abs,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Len,
    Contains,
    Index,
    Iter,
    Str,
}

impl ForwardOp {
    pub fn name(self) -> &'static str {
        match self {
            ForwardOp::Add => "add",
            ForwardOp::Sub => "sub",
            ForwardOp::Mul => "mul",
            ForwardOp::Div => "div",
            ForwardOp::Neg => "neg",
            ForwardOp::Abs => "abs",
            ForwardOp::Eq => "eq",
            ForwardOp::Ne => "ne",
            ForwardOp::Lt => "lt",
            ForwardOp::Le => "le",
            ForwardOp::Gt => "gt",
            ForwardOp::Ge => "ge",
            ForwardOp::Len => "len",
            ForwardOp::Contains => "contains",
            ForwardOp::Index => "index",
            ForwardOp::Iter => "iter",
            ForwardOp::Str => "str",
        }
    }
}

impl fmt::Display for ForwardOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operand of a forwarded operation: a raw value, or another proxy that
/// is unwrapped to its authoritative value before the operation runs.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Value(&'a Value),
    Proxy(&'a CowProxy),
}

impl<'a> Operand<'a> {
    pub(crate) fn resolve(&self) -> Result<Value, ProxyError> {
        match self {
            Operand::Value(value) => Ok((*value).clone()),
            Operand::Proxy(proxy) => proxy.target_view(),
        }
    }
}

impl<'a> From<&'a Value> for Operand<'a> {
    fn from(value: &'a Value) -> Self {
        Operand::Value(value)
    }
}

impl<'a> From<&'a CowProxy> for Operand<'a> {
    fn from(proxy: &'a CowProxy) -> Self {
        Operand::Proxy(proxy)
    }
}

impl CowProxy {
    fn surface(&self) -> Result<Rc<ForwardingSurface>, ProxyError> {
        let kind = self.kind()?;
        Ok(self.flavor().cache.surface(kind))
    }

    /// Forwarded binary arithmetic (`Add`, `Sub`, `Mul`, `Div`).
    pub fn apply_arithmetic<'a>(
        &self,
        op: ForwardOp,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Value, ProxyError> {
        let lhs = self.target_view()?;
        let rhs = rhs.into().resolve()?;
        self.surface()?.arithmetic(op, &lhs, &rhs)
    }

    /// Forwarded unary arithmetic (`Neg`, `Abs`).
    pub fn apply_unary(&self, op: ForwardOp) -> Result<Value, ProxyError> {
        let value = self.target_view()?;
        self.surface()?.unary(op, &value)
    }

    /// Forwarded comparison (`Eq`, `Ne`, `Lt`, `Le`, `Gt`, `Ge`).
    pub fn compare<'a>(
        &self,
        op: ForwardOp,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<bool, ProxyError> {
        let lhs = self.target_view()?;
        let rhs = rhs.into().resolve()?;
        self.surface()?.compare(op, &lhs, &rhs)
    }

    /// Forwarded size: elements, entries, or chars.
    pub fn length(&self) -> Result<usize, ProxyError> {
        let value = self.target_view()?;
        self.surface()?.length(&value)
    }

    /// Forwarded membership test.
    pub fn contains<'a>(&self, needle: impl Into<Operand<'a>>) -> Result<bool, ProxyError> {
        let value = self.target_view()?;
        let needle = needle.into().resolve()?;
        self.surface()?.contains(&value, &needle)
    }

    /// Forwarded indexing. The result is a raw value, never a proxy.
    pub fn index<'a>(&self, key: impl Into<Operand<'a>>) -> Result<Value, ProxyError> {
        let value = self.target_view()?;
        let key = key.into().resolve()?;
        self.surface()?.index(&value, &key)
    }

    /// Forwarded iteration, materialized.
    pub fn items(&self) -> Result<Vec<Value>, ProxyError> {
        let value = self.target_view()?;
        self.surface()?.items(&value)
    }

    /// Forwarded string conversion (compact JSON).
    pub fn render(&self) -> Result<String, ProxyError> {
        let value = self.target_view()?;
        Ok(self.surface()?.render(&value))
    }
}

impl fmt::Display for CowProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(rendered) => f.write_str(&rendered),
            Err(_) => f.write_str("<detached proxy>"),
        }
    }
}

impl PartialEq for CowProxy {
    fn eq(&self, other: &Self) -> bool {
        match (self.target_view(), other.target_view()) {
            (Ok(a), Ok(b)) => deep_equal(&a, &b),
            _ => false,
        }
    }
}

impl PartialEq<Value> for CowProxy {
    fn eq(&self, other: &Value) -> bool {
        self.target_view().map(|v| deep_equal(&v, other)).unwrap_or(false)
    }
}

impl PartialOrd for CowProxy {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let a = self.target_view().ok()?;
        let b = other.target_view().ok()?;
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
            (Value::String(x), Value::String(y)) => Some(x.cmp(&y)),
            _ => None,
        }
    }
}
