//! Lexical scope stack shared by the checker and the evaluator.

use rustc_hash::FxHashMap;

/// A stack of scopes mapping names to `T`. Lookups search from the
/// innermost scope outward.
#[derive(Debug, Clone)]
pub struct Scopes<T> {
    scopes: Vec<FxHashMap<String, T>>,
}

impl<T> Scopes<T> {
    pub fn new() -> Self {
        Scopes {
            scopes: vec![FxHashMap::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the innermost scope, shadowing outer bindings.
    pub fn insert(&mut self, name: String, value: T) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl<T> Default for Scopes<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scopes_shadow_and_pop() {
        let mut env = Scopes::new();
        env.insert("x".to_string(), 1);
        env.push_scope();
        env.insert("x".to_string(), 2);
        assert_eq!(env.lookup("x"), Some(&2));
        env.pop_scope();
        assert_eq!(env.lookup("x"), Some(&1));
        assert_eq!(env.lookup("y"), None);
    }

    #[test]
    fn global_scope_survives_pop() {
        let mut env: Scopes<i32> = Scopes::new();
        env.pop_scope();
        assert_eq!(env.depth(), 1);
        env.insert("x".to_string(), 1);
        assert_eq!(env.lookup("x"), Some(&1));
    }
}
