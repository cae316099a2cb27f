// File: ./src/dom/document.rs
// Process-wide key listeners. Whoever holds a `KeyListener` receives document keys until the
// guard is dropped.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, String)>,
}

#[derive(Clone, Default)]
pub struct Document {
    listeners: Rc<RefCell<Listeners>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `owner` for document-level keys. The registration lives as long as the
    /// returned guard.
    pub fn add_key_listener(&self, owner: &str) -> KeyListener {
        let mut listeners = self.listeners.borrow_mut();
        listeners.next_id += 1;
        let id = listeners.next_id;
        listeners.entries.push((id, owner.to_string()));
        log::debug!("Key listener {} acquired by {}", id, owner);
        KeyListener {
            id,
            owner: owner.to_string(),
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Owners of the live registrations, oldest first.
    pub fn listeners(&self) -> Vec<String> {
        self.listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, owner)| owner.clone())
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

pub struct KeyListener {
    id: u64,
    owner: String,
    listeners: Weak<RefCell<Listeners>>,
}

impl KeyListener {
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .entries
                .retain(|(id, _)| *id != self.id);
            log::debug!("Key listener {} released by {}", self.id, self.owner);
        }
    }
}
