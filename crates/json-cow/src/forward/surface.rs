//! Per-kind forwarding surfaces.
//!
//! A surface is the fixed capability table of one runtime kind: which of the
//! enumerated polymorphic operations the kind supports, plus the delegating
//! implementations. Surfaces are built once per kind and cached per flavor
//! (see [`crate::factory::TypeCache`]).

use serde_json::{Number, Value};

use json_cow_util::deep_equal;

use crate::forward::ForwardOp;
use crate::kind::ValueKind;
use crate::proxy::ProxyError;
use crate::step::Step;

use ForwardOp::*;

const NULL_OPS: &[ForwardOp] = &[Eq, Ne, Str];
const BOOL_OPS: &[ForwardOp] = &[Eq, Ne, Str];
const NUMBER_OPS: &[ForwardOp] = &[Add, Sub, Mul, Div, Neg, Abs, Eq, Ne, Lt, Le, Gt, Ge, Str];
const STRING_OPS: &[ForwardOp] = &[Add, Eq, Ne, Lt, Le, Gt, Ge, Len, Contains, Index, Iter, Str];
const ARRAY_OPS: &[ForwardOp] = &[Add, Eq, Ne, Len, Contains, Index, Iter, Str];
const OBJECT_OPS: &[ForwardOp] = &[Eq, Ne, Len, Contains, Index, Iter, Str];

#[derive(Debug)]
pub struct ForwardingSurface {
    kind: ValueKind,
    ops: &'static [ForwardOp],
}

impl ForwardingSurface {
    pub(crate) fn build(kind: ValueKind) -> Self {
        let ops = match kind {
            ValueKind::Null => NULL_OPS,
            ValueKind::Bool => BOOL_OPS,
            ValueKind::Number => NUMBER_OPS,
            ValueKind::String => STRING_OPS,
            ValueKind::Array => ARRAY_OPS,
            ValueKind::Object => OBJECT_OPS,
        };
        Self { kind, ops }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn supports(&self, op: ForwardOp) -> bool {
        self.ops.contains(&op)
    }

    fn ensure(&self, op: ForwardOp) -> Result<(), ProxyError> {
        if self.supports(op) {
            Ok(())
        } else {
            Err(ProxyError::UnsupportedOperation {
                op,
                kind: self.kind,
            })
        }
    }

    /// Binary arithmetic. `Add` also concatenates strings and arrays.
    pub fn arithmetic(&self, op: ForwardOp, lhs: &Value, rhs: &Value) -> Result<Value, ProxyError> {
        self.ensure(op)?;
        match (op, lhs, rhs) {
            (Add | Sub | Mul | Div, Value::Number(a), Value::Number(b)) => numeric(op, a, b),
            (Add, Value::String(a), Value::String(b)) => {
                let mut out = String::with_capacity(a.len() + b.len());
                out.push_str(a);
                out.push_str(b);
                Ok(Value::String(out))
            }
            (Add, Value::Array(a), Value::Array(b)) => {
                let mut out = Vec::with_capacity(a.len() + b.len());
                out.extend(a.iter().cloned());
                out.extend(b.iter().cloned());
                Ok(Value::Array(out))
            }
            _ => Err(ProxyError::UnsupportedOperation {
                op,
                kind: ValueKind::of(rhs),
            }),
        }
    }

    /// Unary arithmetic: `Neg`, `Abs`.
    pub fn unary(&self, op: ForwardOp, value: &Value) -> Result<Value, ProxyError> {
        self.ensure(op)?;
        let n = match value {
            Value::Number(n) => n,
            _ => {
                return Err(ProxyError::UnsupportedOperation {
                    op,
                    kind: ValueKind::of(value),
                })
            }
        };
        match op {
            Neg => {
                if let Some(i) = n.as_i64() {
                    if let Some(neg) = i.checked_neg() {
                        return Ok(Value::Number(Number::from(neg)));
                    }
                }
                float_result(-as_f64(n)?)
            }
            Abs => {
                if let Some(i) = n.as_i64() {
                    if let Some(abs) = i.checked_abs() {
                        return Ok(Value::Number(Number::from(abs)));
                    }
                }
                float_result(as_f64(n)?.abs())
            }
            _ => Err(ProxyError::UnsupportedOperation {
                op,
                kind: self.kind,
            }),
        }
    }

    /// Equality and ordering. `Eq`/`Ne` are deep equality over any kinds;
    /// ordering is defined for numbers and strings.
    pub fn compare(&self, op: ForwardOp, lhs: &Value, rhs: &Value) -> Result<bool, ProxyError> {
        self.ensure(op)?;
        match op {
            Eq => Ok(deep_equal(lhs, rhs)),
            Ne => Ok(!deep_equal(lhs, rhs)),
            Lt | Le | Gt | Ge => {
                let ordering = match (lhs, rhs) {
                    (Value::Number(a), Value::Number(b)) => {
                        as_f64(a)?.partial_cmp(&as_f64(b)?)
                    }
                    (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                    _ => None,
                };
                let ordering = ordering.ok_or(ProxyError::UnsupportedOperation {
                    op,
                    kind: ValueKind::of(rhs),
                })?;
                Ok(match op {
                    Lt => ordering.is_lt(),
                    Le => ordering.is_le(),
                    Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                })
            }
            _ => Err(ProxyError::UnsupportedOperation {
                op,
                kind: self.kind,
            }),
        }
    }

    /// Number of elements, entries, or chars.
    pub fn length(&self, value: &Value) -> Result<usize, ProxyError> {
        self.ensure(Len)?;
        match value {
            Value::String(s) => Ok(s.chars().count()),
            Value::Array(items) => Ok(items.len()),
            Value::Object(map) => Ok(map.len()),
            _ => Err(ProxyError::UnsupportedOperation {
                op: Len,
                kind: ValueKind::of(value),
            }),
        }
    }

    /// Membership: array element (deep equality), object key, substring.
    pub fn contains(&self, value: &Value, needle: &Value) -> Result<bool, ProxyError> {
        self.ensure(Contains)?;
        match (value, needle) {
            (Value::Array(items), _) => Ok(items.iter().any(|item| deep_equal(item, needle))),
            (Value::Object(map), Value::String(key)) => Ok(map.contains_key(key)),
            (Value::String(s), Value::String(sub)) => Ok(s.contains(sub.as_str())),
            _ => Err(ProxyError::UnsupportedOperation {
                op: Contains,
                kind: ValueKind::of(needle),
            }),
        }
    }

    /// Indexing: array by position, object by key, string by char position.
    /// Results propagate raw; they are never wrapped in proxies.
    pub fn index(&self, value: &Value, key: &Value) -> Result<Value, ProxyError> {
        self.ensure(Index)?;
        match (value, key) {
            (Value::Array(items), Value::Number(n)) => {
                let i = index_of(n)?;
                items
                    .get(i)
                    .cloned()
                    .ok_or(ProxyError::NoSuchAttribute(Step::Index(i)))
            }
            (Value::Object(map), Value::String(k)) => map
                .get(k)
                .cloned()
                .ok_or_else(|| ProxyError::NoSuchAttribute(Step::Key(k.clone()))),
            (Value::String(s), Value::Number(n)) => {
                let i = index_of(n)?;
                s.chars()
                    .nth(i)
                    .map(|c| Value::String(c.to_string()))
                    .ok_or(ProxyError::NoSuchAttribute(Step::Index(i)))
            }
            _ => Err(ProxyError::UnsupportedOperation {
                op: Index,
                kind: ValueKind::of(key),
            }),
        }
    }

    /// Materialized iteration order: array elements, object keys, chars.
    pub fn items(&self, value: &Value) -> Result<Vec<Value>, ProxyError> {
        self.ensure(Iter)?;
        match value {
            Value::Array(items) => Ok(items.clone()),
            Value::Object(map) => Ok(map.keys().map(|k| Value::String(k.clone())).collect()),
            Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
            _ => Err(ProxyError::UnsupportedOperation {
                op: Iter,
                kind: ValueKind::of(value),
            }),
        }
    }

    /// Compact JSON rendering.
    pub fn render(&self, value: &Value) -> String {
        value.to_string()
    }
}

fn as_f64(n: &Number) -> Result<f64, ProxyError> {
    n.as_f64().ok_or(ProxyError::NonFiniteNumber)
}

fn float_result(f: f64) -> Result<Value, ProxyError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or(ProxyError::NonFiniteNumber)
}

fn index_of(n: &Number) -> Result<usize, ProxyError> {
    n.as_u64()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or(ProxyError::UnsupportedOperation {
            op: Index,
            kind: ValueKind::Number,
        })
}

fn numeric(op: ForwardOp, a: &Number, b: &Number) -> Result<Value, ProxyError> {
    // Integer arithmetic stays integer when exact; division is always float.
    if op != Div {
        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
            let exact = match op {
                Add => x.checked_add(y),
                Sub => x.checked_sub(y),
                Mul => x.checked_mul(y),
                _ => None,
            };
            if let Some(n) = exact {
                return Ok(Value::Number(Number::from(n)));
            }
        }
    }
    let x = as_f64(a)?;
    let y = as_f64(b)?;
    let out = match op {
        Add => x + y,
        Sub => x - y,
        Mul => x * y,
        _ => x / y,
    };
    float_result(out)
}
