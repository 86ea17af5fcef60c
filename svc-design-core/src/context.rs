use serde::{Deserialize, Serialize};

use crate::error::DesignError;

/// The category of a definable thing. Each kind gets its own scope stack;
/// opening a service never touches the operation stack and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Service,
    Operation,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Service => "service",
            EntityKind::Operation => "operation",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stack of currently open scopes for one entity kind.
///
/// The top entry is the implicit target of attribute setters. Scoping is
/// dynamic: whichever entity was pushed most recently wins, determined by
/// call order at run time rather than lexical nesting in source text.
/// Stacks live inside a session and are never shared across sessions.
#[derive(Debug, Clone)]
pub struct ScopeStack<T> {
    kind: EntityKind,
    entries: Vec<T>,
}

impl<T: Copy> ScopeStack<T> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Make `id` the current scope. Always succeeds; nesting depth is
    /// unbounded.
    pub fn push(&mut self, id: T) {
        self.entries.push(id);
    }

    /// Remove and return the current scope. The previously pushed entry
    /// (if any) becomes current again.
    pub fn pop(&mut self) -> Result<T, DesignError> {
        self.entries
            .pop()
            .ok_or(DesignError::ScopeUnderflow(self.kind))
    }

    /// The current scope, without removing it.
    pub fn current(&self) -> Result<T, DesignError> {
        self.entries
            .last()
            .copied()
            .ok_or(DesignError::NoActiveScope(self.kind))
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_makes_entry_current() {
        let mut stack: ScopeStack<usize> = ScopeStack::new(EntityKind::Service);
        stack.push(7);
        assert_eq!(stack.current().unwrap(), 7);
        stack.push(9);
        assert_eq!(stack.current().unwrap(), 9);
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_pop_restores_previous_scope() {
        let mut stack: ScopeStack<usize> = ScopeStack::new(EntityKind::Operation);
        stack.push(1);
        stack.push(2);
        assert_eq!(stack.pop().unwrap(), 2);
        assert_eq!(stack.current().unwrap(), 1);
    }

    #[test]
    fn test_current_on_empty_is_no_active_scope() {
        let stack: ScopeStack<usize> = ScopeStack::new(EntityKind::Operation);
        assert_eq!(
            stack.current().unwrap_err(),
            DesignError::NoActiveScope(EntityKind::Operation)
        );
    }

    #[test]
    fn test_pop_on_empty_is_underflow() {
        let mut stack: ScopeStack<usize> = ScopeStack::new(EntityKind::Service);
        assert_eq!(
            stack.pop().unwrap_err(),
            DesignError::ScopeUnderflow(EntityKind::Service)
        );
    }
}
