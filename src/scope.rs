//! Lexical scope tree and the parser's path through it (spec §3 `Scope`,
//! §4.4, §9 "Cyclic scope references").

use std::collections::HashSet;

use crate::ast::AccessSpecifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
    Template,
}

/// A single node in the scope tree. Parent links are non-owning indices
/// into the owning [`ScopeTree`]'s arena rather than back-pointers, so the
/// tree has no reference cycles (spec §9).
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: Option<String>,
    pub access: Option<AccessSpecifier>,
    pub parent: Option<usize>,
    pub types_in_scope: HashSet<String>,
    pub children: Vec<usize>,
}

impl Scope {
    fn new(kind: ScopeKind, name: Option<String>, parent: Option<usize>) -> Self {
        let access = match kind {
            ScopeKind::Class => Some(AccessSpecifier::Private),
            _ => None,
        };
        Self {
            kind,
            name,
            access,
            parent,
            types_in_scope: HashSet::new(),
            children: Vec::new(),
        }
    }
}

/// Arena of all scopes created during a parse. Owned exclusively by the
/// active parse (spec §5).
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self { scopes: vec![Scope::new(ScopeKind::Global, None, None)] }
    }

    pub fn global(&self) -> usize {
        0
    }

    pub fn get(&self, idx: usize) -> &Scope {
        &self.scopes[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Scope {
        &mut self.scopes[idx]
    }

    pub fn push_child(&mut self, parent: usize, kind: ScopeKind, name: Option<String>) -> usize {
        let idx = self.scopes.len();
        self.scopes.push(Scope::new(kind, name, Some(parent)));
        self.scopes[parent].children.push(idx);
        idx
    }
}

/// The parser's current path through the scope tree (spec §4.4: "a
/// stack-allocated path through a tree built lazily as declarations
/// nest").
pub struct ScopeStack {
    tree: ScopeTree,
    stack: Vec<usize>,
}

impl ScopeStack {
    pub fn new() -> Self {
        let tree = ScopeTree::new();
        let global = tree.global();
        Self { tree, stack: vec![global] }
    }

    /// Seed the global scope's type table, e.g. from `Options::known_type_names`.
    pub fn seed_known_types(&mut self, names: impl IntoIterator<Item = String>) {
        let global = self.tree.global();
        self.tree.get_mut(global).types_in_scope.extend(names);
    }

    pub fn current(&self) -> usize {
        *self.stack.last().expect("scope stack is never empty")
    }

    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    pub fn enter(&mut self, kind: ScopeKind, name: Option<String>) -> usize {
        let parent = self.current();
        tracing::debug!(?kind, name = name.as_deref().unwrap_or("<anonymous>"), "entering scope");
        let idx = self.tree.push_child(parent, kind, name);
        self.stack.push(idx);
        idx
    }

    /// Re-enter an existing namespace scope (`namespace a { ... } namespace
    /// a { ... }` reopens the same logical namespace; still modeled here as
    /// a fresh child since the spec does not require namespace merging
    /// across reopenings — each `Declaration::Namespace` carries its own
    /// body).
    pub fn exit(&mut self) {
        self.stack.pop();
        tracing::debug!("exiting scope");
        debug_assert!(!self.stack.is_empty(), "popped the global scope");
    }

    /// Declare `name` as a type visible from the current scope onward.
    pub fn declare_type(&mut self, name: impl Into<String>) {
        let cur = self.current();
        self.tree.get_mut(cur).types_in_scope.insert(name.into());
    }

    /// Walk from the current scope up to the global scope looking for
    /// `name` in each scope's type table — the predicate the Type Parser
    /// consults to resolve `T *x;` vs. an expression (spec §4.2, §9).
    pub fn is_type_name(&self, name: &str) -> bool {
        let mut idx = Some(self.current());
        while let Some(i) = idx {
            let scope = self.tree.get(i);
            if scope.types_in_scope.contains(name) {
                return true;
            }
            idx = scope.parent;
        }
        false
    }

    /// The innermost enclosing class's name, if the current scope is a
    /// class body — used to recognize a constructor's declarator-id
    /// against the injected-class-name rather than treating it as a type.
    pub fn enclosing_class_name(&self) -> Option<&str> {
        let scope = self.tree.get(self.current());
        if scope.kind == ScopeKind::Class {
            scope.name.as_deref()
        } else {
            None
        }
    }

    pub fn current_access(&self) -> Option<AccessSpecifier> {
        self.tree.get(self.current()).access
    }

    pub fn set_current_access(&mut self, access: AccessSpecifier) {
        let cur = self.current();
        self.tree.get_mut(cur).access = Some(access);
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_visible_from_nested_scope() {
        let mut stack = ScopeStack::new();
        stack.declare_type("Widget");
        stack.enter(ScopeKind::Namespace, Some("n".into()));
        assert!(stack.is_type_name("Widget"));
        assert!(!stack.is_type_name("Gadget"));
    }

    #[test]
    fn type_declared_in_child_not_visible_in_parent() {
        let mut stack = ScopeStack::new();
        stack.enter(ScopeKind::Namespace, Some("n".into()));
        stack.declare_type("Inner");
        stack.exit();
        assert!(!stack.is_type_name("Inner"));
    }

    #[test]
    fn class_scope_defaults_to_private_access() {
        let mut stack = ScopeStack::new();
        stack.enter(ScopeKind::Class, Some("C".into()));
        assert_eq!(stack.current_access(), Some(AccessSpecifier::Private));
    }
}
