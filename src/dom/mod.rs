// File: ./src/dom/mod.rs
//! A small retained node tree that stands in for the browser DOM.
//!
//! Views are mounted into a [`Container`] as shared [`ElementRef`]s. The container only tracks
//! which nodes are attached and in which order; drawing walks the attached nodes and asks each
//! one for its lines.
pub mod document;

pub use document::{Document, Key, KeyListener};

use ratatui::text::Line;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that can be mounted into a [`Container`].
pub trait Element {
    fn node_id(&self) -> NodeId;

    /// Renders the node. `focused` is true when the list cursor sits on it.
    fn lines(&self, focused: bool) -> Vec<Line<'static>>;
}

pub type ElementRef = Rc<dyn Element>;

/// Where a node is inserted relative to the existing children of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPosition {
    /// Render as the first child.
    Prepend,
    /// Render as the last child.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    NotMounted(NodeId),
    AlreadyMounted(NodeId),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotMounted(id) => write!(f, "Node {} is not attached", id),
            RenderError::AlreadyMounted(id) => write!(f, "Node {} is already attached", id),
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Default)]
struct Children {
    nodes: Vec<ElementRef>,
    mutations: u64,
    #[cfg(test)]
    detached: Vec<NodeId>,
}

impl Children {
    fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.node_id() == id)
    }
}

/// Cloneable handle to a list of mounted nodes. Clones share the same children.
#[derive(Clone, Default)]
pub struct Container {
    inner: Rc<RefCell<Children>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, element: ElementRef, position: RenderPosition) -> Result<(), RenderError> {
        let mut children = self.inner.borrow_mut();
        let id = element.node_id();
        if children.position(id).is_some() {
            return Err(RenderError::AlreadyMounted(id));
        }
        match position {
            RenderPosition::Prepend => children.nodes.insert(0, element),
            RenderPosition::Append => children.nodes.push(element),
        }
        children.mutations += 1;
        Ok(())
    }

    /// Swaps `old` for `new` at the same position.
    pub fn replace(&self, new: ElementRef, old: NodeId) -> Result<(), RenderError> {
        let mut children = self.inner.borrow_mut();
        let new_id = new.node_id();
        if children.position(new_id).is_some() {
            return Err(RenderError::AlreadyMounted(new_id));
        }
        let pos = children
            .position(old)
            .ok_or(RenderError::NotMounted(old))?;
        children.nodes[pos] = new;
        children.mutations += 1;
        #[cfg(test)]
        children.detached.push(old);
        Ok(())
    }

    /// Detaches a node. Removing a node that is not attached does nothing.
    pub fn remove(&self, id: NodeId) -> bool {
        let mut children = self.inner.borrow_mut();
        match children.position(id) {
            Some(pos) => {
                children.nodes.remove(pos);
                children.mutations += 1;
                #[cfg(test)]
                children.detached.push(id);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.borrow().position(id).is_some()
    }

    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.inner.borrow().position(id)
    }

    /// Snapshot of the attached nodes, in order.
    pub fn nodes(&self) -> Vec<ElementRef> {
        self.inner.borrow().nodes.clone()
    }

    pub fn node_at(&self, index: usize) -> Option<NodeId> {
        self.inner.borrow().nodes.get(index).map(|n| n.node_id())
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().nodes.is_empty()
    }

    /// Number of structural changes (insertions, replacements, removals) so far.
    pub fn mutation_count(&self) -> u64 {
        self.inner.borrow().mutations
    }

    /// How many times `id` has been taken out of this container.
    #[cfg(test)]
    pub fn detach_count(&self, id: NodeId) -> usize {
        self.inner
            .borrow()
            .detached
            .iter()
            .filter(|d| **d == id)
            .count()
    }
}
