use std::collections::HashMap;

use super::value::Value;

/// Named runtime state: scalar variables and lists partition one namespace.
/// The evaluator enforces the language rules (what may shadow what, bounds,
/// redeclaration); the store only holds values.
#[derive(Debug, Default)]
pub struct SymbolStore {
    scalars: HashMap<String, Value>,
    lists: HashMap<String, Vec<Value>>,
}

impl SymbolStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_var_defined(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    pub fn is_list_defined(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.is_var_defined(name) || self.is_list_defined(name)
    }

    /// Inserts or overwrites a scalar; an overwrite may change the tag.
    pub fn set_var(&mut self, name: &str, value: Value) {
        self.scalars.insert(name.to_string(), value);
    }

    pub fn get_var(&self, name: &str) -> Option<Value> {
        self.scalars.get(name).copied()
    }

    /// Creates an empty list; a second declaration of the same name is a
    /// no-op at this level.
    pub fn add_list(&mut self, name: &str) {
        self.lists.entry(name.to_string()).or_default();
    }

    /// Appends to an existing list; `false` if no such list exists.
    pub fn append(&mut self, name: &str, value: Value) -> bool {
        match self.lists.get_mut(name) {
            Some(elements) => {
                elements.push(value);
                true
            }
            None => false,
        }
    }

    pub fn get_elem(&self, name: &str, index: usize) -> Option<Value> {
        self.lists.get(name)?.get(index).copied()
    }

    /// Replaces the element at `index`; `false` if the list or the slot does
    /// not exist.
    pub fn update_elem(&mut self, name: &str, index: usize, value: Value) -> bool {
        match self.lists.get_mut(name).and_then(|list| list.get_mut(index)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn size(&self, name: &str) -> Option<usize> {
        self.lists.get(name).map(Vec::len)
    }

    /// Drops a list, releasing its elements. Used when an assignment reuses a
    /// list name for a scalar.
    pub fn clear(&mut self, name: &str) {
        self.lists.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_assignments_can_change_tag() {
        let mut store = SymbolStore::new();
        store.set_var("x", Value::Bool(true));
        assert_eq!(store.get_var("x"), Some(Value::Bool(true)));

        store.set_var("x", Value::Int(3));
        assert_eq!(store.get_var("x"), Some(Value::Int(3)));
    }

    #[test]
    fn lists_hold_mixed_tags() {
        let mut store = SymbolStore::new();
        store.add_list("xs");
        assert!(store.append("xs", Value::Int(1)));
        assert!(store.append("xs", Value::Bool(false)));

        assert_eq!(store.size("xs"), Some(2));
        assert_eq!(store.get_elem("xs", 0), Some(Value::Int(1)));
        assert_eq!(store.get_elem("xs", 1), Some(Value::Bool(false)));
    }

    #[test]
    fn update_elem_respects_bounds() {
        let mut store = SymbolStore::new();
        store.add_list("xs");
        store.append("xs", Value::Int(1));

        assert!(store.update_elem("xs", 0, Value::Int(9)));
        assert_eq!(store.get_elem("xs", 0), Some(Value::Int(9)));
        assert!(!store.update_elem("xs", 1, Value::Int(9)));
        assert!(!store.update_elem("ys", 0, Value::Int(9)));
    }

    #[test]
    fn redeclaring_a_list_keeps_its_elements() {
        let mut store = SymbolStore::new();
        store.add_list("xs");
        store.append("xs", Value::Int(1));
        store.add_list("xs");
        assert_eq!(store.size("xs"), Some(1));
    }

    #[test]
    fn scalars_and_lists_partition_one_namespace() {
        let mut store = SymbolStore::new();
        store.set_var("x", Value::Int(1));
        assert!(store.is_var_defined("x"));
        assert!(!store.is_list_defined("x"));
        assert!(store.is_defined("x"));

        store.add_list("ys");
        assert!(store.is_list_defined("ys"));
        assert!(!store.is_var_defined("ys"));
    }

    #[test]
    fn clear_drops_the_list() {
        let mut store = SymbolStore::new();
        store.add_list("xs");
        store.append("xs", Value::Int(1));
        store.clear("xs");
        assert!(!store.is_list_defined("xs"));
        assert_eq!(store.size("xs"), None);
    }
}
