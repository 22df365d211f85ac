//! The copy-on-write proxy core.
//!
//! A `CowProxy` wraps a target inside a shared document and defers
//! duplication until the first mutation, while every read behaves as if the
//! proxy already were an independent copy. Mutation through the proxy never
//! leaks into the original; reads observe live owner-side changes until the
//! proxy diverges.
//!
//! State machine per node: `copied` starts false and transitions to true at
//! most once. In full-copy mode the first mutating event (a write, a delete,
//! or a read that discovers a copied nested override) duplicates the target,
//! applies every pending override onto the duplicate, and commits the copied
//! state. In partial-copy mode writes and deletes are tracked per attribute
//! and the target is never duplicated.

use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

use json_cow_util::duplicate;

use crate::factory::{Flavor, ProxyFactory, ProxyStats};
use crate::forward::ForwardOp;
use crate::kind::ValueKind;
use crate::shared::SharedValue;
use crate::step::{read_step, remove_step, value_at_path, value_at_path_mut, write_step, Step};

mod overrides;

pub(crate) use overrides::{OverrideEntry, OverrideMap};

/// Object keys in this namespace address proxy plumbing on the dynamic
/// string-keyed surface; they cannot be written or deleted through a proxy.
pub const RESERVED_PREFIX: &str = "__proxy";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no such attribute: {0}")]
    NoSuchAttribute(Step),
    #[error("target is not a container: {0}")]
    NotAContainer(ValueKind),
    #[error("target path no longer resolves")]
    DetachedTarget,
    #[error("modification of proxy internals can lead to unexpected behavior")]
    FrozenMutation,
    #[error("operation {op} not supported for {kind}")]
    UnsupportedOperation { op: ForwardOp, kind: ValueKind },
    #[error("arithmetic result is not representable as a json number")]
    NonFiniteNumber,
}

/// Copy discipline of a proxy tree root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Any mutation eagerly duplicates the entire owning target.
    Full,
    /// Mutations are tracked per attribute; the target is never duplicated.
    Partial,
}

/// Result of an attribute read: scalars come back by value, aggregates as
/// nested proxies.
#[derive(Debug, Clone)]
pub enum Attr {
    Value(Value),
    Node(CowProxy),
}

impl Attr {
    pub fn is_node(&self) -> bool {
        matches!(self, Attr::Node(_))
    }

    pub fn as_node(&self) -> Option<&CowProxy> {
        match self {
            Attr::Node(node) => Some(node),
            Attr::Value(_) => None,
        }
    }

    pub fn into_node(self) -> Option<CowProxy> {
        match self {
            Attr::Node(node) => Some(node),
            Attr::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Attr::Value(value) => Some(value),
            Attr::Node(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Attr::Value(value) => Some(value),
            Attr::Node(_) => None,
        }
    }

    /// Materialized logical state of the attribute.
    pub fn view(&self) -> Result<Value, ProxyError> {
        match self {
            Attr::Value(value) => Ok(value.clone()),
            Attr::Node(node) => node.view(),
        }
    }
}

/// Location of a node's target: a shared document plus the path of the
/// target inside it. A copied node's duplicate is a private document with an
/// empty path.
#[derive(Debug, Clone)]
pub(crate) struct TargetRef {
    doc: SharedValue,
    path: Vec<Step>,
}

impl TargetRef {
    pub(crate) fn root(doc: SharedValue) -> Self {
        Self { doc, path: Vec::new() }
    }

    fn child(&self, step: Step) -> Self {
        let mut path = self.path.clone();
        path.push(step);
        Self {
            doc: self.doc.clone(),
            path,
        }
    }

    fn kind(&self) -> Result<ValueKind, ProxyError> {
        self.doc.with(|root| {
            value_at_path(root, &self.path)
                .map(ValueKind::of)
                .ok_or(ProxyError::DetachedTarget)
        })
    }

    fn materialize(&self) -> Result<Value, ProxyError> {
        self.doc.with(|root| {
            value_at_path(root, &self.path)
                .cloned()
                .ok_or(ProxyError::DetachedTarget)
        })
    }

    /// Deep duplication of the target, the one-time cost of diverging.
    fn duplicate_target(&self) -> Result<Value, ProxyError> {
        self.doc.with(|root| {
            value_at_path(root, &self.path)
                .map(duplicate)
                .ok_or(ProxyError::DetachedTarget)
        })
    }

    fn read_step(&self, step: &Step) -> Result<Value, ProxyError> {
        self.doc.with(|root| {
            let target = value_at_path(root, &self.path).ok_or(ProxyError::DetachedTarget)?;
            read_step(target, step).map(|value| value.clone())
        })
    }

    fn write_step(&self, step: &Step, value: Value) -> Result<(), ProxyError> {
        self.doc.with_mut(|root| {
            let target = value_at_path_mut(root, &self.path).ok_or(ProxyError::DetachedTarget)?;
            write_step(target, step, value)
        })
    }

    fn remove_step(&self, step: &Step) -> Result<Value, ProxyError> {
        self.doc.with_mut(|root| {
            let target = value_at_path_mut(root, &self.path).ok_or(ProxyError::DetachedTarget)?;
            remove_step(target, step)
        })
    }
}

#[derive(Debug)]
struct ProxyNode {
    target: TargetRef,
    copied: bool,
    mode: CopyMode,
    overrides: OverrideMap,
    flavor: Flavor,
}

/// Cloneable handle to one proxy node. Clones share the node.
#[derive(Debug, Clone)]
pub struct CowProxy {
    node: Rc<RefCell<ProxyNode>>,
}

enum ReadHit {
    Copied,
    FoldThenRead,
    Node(CowProxy),
    Value(Value),
    Tombstone,
    Miss,
}

impl CowProxy {
    /// Wraps `doc` in a proxy with a fresh single-use flavor. Use
    /// [`ProxyFactory::wrap`] to share a surface cache across proxies.
    pub fn new(doc: SharedValue, mode: CopyMode) -> Self {
        ProxyFactory::new().wrap(doc, mode)
    }

    pub(crate) fn from_parts(
        target: TargetRef,
        mode: CopyMode,
        copied: bool,
        flavor: Flavor,
    ) -> Self {
        Self {
            node: Rc::new(RefCell::new(ProxyNode {
                target,
                copied,
                mode,
                overrides: OverrideMap::new(),
                flavor,
            })),
        }
    }

    /// `true` once this node's first mutation has produced a duplicate.
    /// Never reverts.
    pub fn is_copied(&self) -> bool {
        self.node.borrow().copied
    }

    pub fn mode(&self) -> CopyMode {
        self.node.borrow().mode
    }

    /// Runtime kind of the wrapped target, not of the wrapper.
    pub fn kind(&self) -> Result<ValueKind, ProxyError> {
        self.node.borrow().target.kind()
    }

    /// Duplication statistics shared by every proxy of this flavor.
    pub fn stats(&self) -> Rc<ProxyStats> {
        self.node.borrow().flavor.stats.clone()
    }

    pub(crate) fn flavor(&self) -> Flavor {
        self.node.borrow().flavor.clone()
    }

    /// Reads one attribute.
    ///
    /// Scalars are returned by value. Aggregates come back as nested proxies
    /// that are cached in the override map while this node is uncopied. In
    /// full-copy mode, a read that finds a nested override which has itself
    /// become copied triggers the fold.
    pub fn get(&self, step: impl Into<Step>) -> Result<Attr, ProxyError> {
        let step = step.into();
        let hit = {
            let node = self.node.borrow();
            if node.copied {
                ReadHit::Copied
            } else {
                match node.overrides.get(&step) {
                    Some(OverrideEntry::Node(child)) => {
                        if node.mode == CopyMode::Full && child.is_copied() {
                            ReadHit::FoldThenRead
                        } else {
                            ReadHit::Node(child.clone())
                        }
                    }
                    Some(OverrideEntry::Value(value)) => ReadHit::Value(value.clone()),
                    Some(OverrideEntry::Tombstone) => ReadHit::Tombstone,
                    None => ReadHit::Miss,
                }
            }
        };
        match hit {
            ReadHit::Copied => self.read_copied(&step),
            ReadHit::FoldThenRead => {
                self.fold()?;
                self.read_copied(&step)
            }
            ReadHit::Node(child) => Ok(Attr::Node(child)),
            ReadHit::Value(value) => Ok(Attr::Value(value)),
            ReadHit::Tombstone => Err(ProxyError::NoSuchAttribute(step)),
            ReadHit::Miss => self.read_through(step),
        }
    }

    /// Writes one attribute.
    ///
    /// Partial mode records an override and never touches the target. Full
    /// mode duplicates the target on the first write (folding any pending
    /// overrides) and writes onto the duplicate from then on.
    pub fn set(&self, step: impl Into<Step>, value: Value) -> Result<(), ProxyError> {
        let step = step.into();
        if is_reserved(&step) {
            return Err(ProxyError::FrozenMutation);
        }
        let (mode, copied) = {
            let node = self.node.borrow();
            (node.mode, node.copied)
        };
        match mode {
            CopyMode::Partial => {
                self.node
                    .borrow_mut()
                    .overrides
                    .insert(step, OverrideEntry::Value(value));
                Ok(())
            }
            CopyMode::Full => {
                if !copied {
                    // Validate the target before paying for a duplicate.
                    let kind = self.node.borrow().target.kind()?;
                    if kind.is_scalar() {
                        return Err(ProxyError::NotAContainer(kind));
                    }
                    self.fold()?;
                }
                self.node.borrow().target.write_step(&step, value)
            }
        }
    }

    /// Deletes one attribute under the same copy-on-first-mutation
    /// discipline as [`CowProxy::set`]: full mode folds before deleting,
    /// partial mode records a tombstone.
    pub fn delete(&self, step: impl Into<Step>) -> Result<(), ProxyError> {
        let step = step.into();
        if is_reserved(&step) {
            return Err(ProxyError::FrozenMutation);
        }
        let (mode, copied) = {
            let node = self.node.borrow();
            (node.mode, node.copied)
        };
        match mode {
            CopyMode::Partial => {
                {
                    let node = self.node.borrow();
                    match node.overrides.get(&step) {
                        Some(OverrideEntry::Tombstone) => {
                            return Err(ProxyError::NoSuchAttribute(step))
                        }
                        Some(_) => {}
                        // Not overridden: deletable only if the target has it.
                        None => {
                            node.target.read_step(&step)?;
                        }
                    }
                }
                self.node
                    .borrow_mut()
                    .overrides
                    .insert(step, OverrideEntry::Tombstone);
                Ok(())
            }
            CopyMode::Full => {
                if !copied {
                    // Propagate not-found before duplicating anything.
                    self.node.borrow().target.read_step(&step)?;
                    self.fold()?;
                }
                self.node.borrow().target.remove_step(&step).map(|_| ())
            }
        }
    }

    /// Materialized logical state: the duplicate if copied, else the shared
    /// target with pending overrides overlaid.
    pub fn view(&self) -> Result<Value, ProxyError> {
        let node = self.node.borrow();
        let mut base = node.target.materialize()?;
        if node.copied || node.overrides.is_empty() || ValueKind::of(&base).is_scalar() {
            return Ok(base);
        }
        for (step, entry) in node.overrides.iter() {
            match entry {
                OverrideEntry::Node(child) => {
                    let folded = child.view()?;
                    write_step(&mut base, step, folded)?;
                }
                OverrideEntry::Value(value) => write_step(&mut base, step, value.clone())?,
                OverrideEntry::Tombstone => {
                    let _ = remove_step(&mut base, step);
                }
            }
        }
        Ok(base)
    }

    /// Current authoritative value: the duplicate if copied, else the shared
    /// target as-is, with no override overlay. This is what forwarded
    /// operations delegate to and what proxy-typed operands unwrap to.
    pub fn target_view(&self) -> Result<Value, ProxyError> {
        self.node.borrow().target.materialize()
    }

    pub(crate) fn force_copy(&self) -> Result<(), ProxyError> {
        if self.is_copied() {
            return Ok(());
        }
        self.fold()
    }

    /// Duplicates the target and reconciles every pending override onto the
    /// duplicate: uncopied nested proxies are forced to copy first
    /// (recursively), raw values are written directly, tombstones become
    /// removals. Commits the duplicate and the copied flag together.
    fn fold(&self) -> Result<(), ProxyError> {
        let (mut dup, entries, flavor) = {
            let mut node = self.node.borrow_mut();
            debug_assert!(!node.copied, "fold invoked on a copied node");
            let dup = node.target.duplicate_target()?;
            let entries = node.overrides.drain();
            (dup, entries, node.flavor.clone())
        };
        flavor.stats.record_duplication();
        for (step, entry) in entries {
            match entry {
                OverrideEntry::Node(child) => {
                    child.force_copy()?;
                    let folded = child.target_view()?;
                    write_step(&mut dup, &step, folded)?;
                }
                OverrideEntry::Value(value) => write_step(&mut dup, &step, value)?,
                OverrideEntry::Tombstone => {
                    let _ = remove_step(&mut dup, &step);
                }
            }
        }
        let mut node = self.node.borrow_mut();
        node.target = TargetRef::root(SharedValue::new(dup));
        node.copied = true;
        Ok(())
    }

    fn read_copied(&self, step: &Step) -> Result<Attr, ProxyError> {
        let node = self.node.borrow();
        let value = node.target.read_step(step)?;
        if ValueKind::of(&value).is_scalar() {
            return Ok(Attr::Value(value));
        }
        // Aggregate inside the duplicate: hand out a pass-through node born
        // copied, so nested writes land in this node's private storage.
        Ok(Attr::Node(CowProxy::from_parts(
            node.target.child(step.clone()),
            node.mode,
            true,
            node.flavor.clone(),
        )))
    }

    fn read_through(&self, step: Step) -> Result<Attr, ProxyError> {
        let (value, child_target, flavor) = {
            let node = self.node.borrow();
            let value = node.target.read_step(&step)?;
            (value, node.target.child(step.clone()), node.flavor.clone())
        };
        if ValueKind::of(&value).is_scalar() {
            return Ok(Attr::Value(value));
        }
        // Nested proxies are always full-mode.
        let child = CowProxy::from_parts(child_target, CopyMode::Full, false, flavor);
        self.node
            .borrow_mut()
            .overrides
            .insert(step, OverrideEntry::Node(child.clone()));
        Ok(Attr::Node(child))
    }
}

fn is_reserved(step: &Step) -> bool {
    matches!(step, Step::Key(key) if key.starts_with(RESERVED_PREFIX))
}
