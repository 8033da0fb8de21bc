use std::collections::{BTreeMap, BTreeSet};

/// Forward declarations grouped by namespace.
///
/// Nested namespaces and the classes inside each of them print in name order, so the block
/// does not depend on the order classes were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTree {
    classes: BTreeSet<String>,
    nested: BTreeMap<String, NamespaceTree>,
}

impl NamespaceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.nested.is_empty()
    }

    /// Add `class` under the `::`-separated `namespace` path (empty for the global namespace).
    pub fn add(&mut self, namespace: &str, class: &str) {
        let namespace = namespace.trim_start_matches(':');
        if namespace.is_empty() {
            self.classes.insert(class.to_string());
            return;
        }

        let (head, rest) = match namespace.find(':') {
            Some(idx) => (&namespace[..idx], &namespace[idx..]),
            None => (namespace, ""),
        };
        self.nested
            .entry(head.to_string())
            .or_default()
            .add(rest, class);
    }

    /// Append the declarations, two spaces of indentation per nesting level.
    pub fn render(&self, output: &mut String, level: usize) {
        let dx = " ".repeat(level * 2);

        for (name, nested) in &self.nested {
            output.push_str(&format!("{dx}namespace {name} {{\n"));
            nested.render(output, level + 1);
            output.push_str(&format!("{dx}}}\n"));
        }

        for class in &self.classes {
            output.push_str(&format!("{dx}class {class};\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_render() {
        let mut tree = NamespaceTree::new();
        tree.add("hw::infra", "Rack");
        tree.add("", "Local");
        tree.add("hw", "Crate");

        let mut out = String::new();
        tree.render(&mut out, 0);
        assert_eq!(
            out,
            "namespace hw {\n  namespace infra {\n    class Rack;\n  }\n  class Crate;\n}\nclass Local;\n"
        );
    }

    #[test]
    fn test_order_independent() {
        let mut a = NamespaceTree::new();
        a.add("z", "B");
        a.add("a", "C");
        a.add("z", "A");

        let mut b = NamespaceTree::new();
        b.add("z", "A");
        b.add("a", "C");
        b.add("z", "B");

        let (mut out_a, mut out_b) = (String::new(), String::new());
        a.render(&mut out_a, 0);
        b.render(&mut out_b, 0);
        assert_eq!(out_a, out_b);
        assert!(out_a.find("namespace a").unwrap() < out_a.find("namespace z").unwrap());
    }

    #[test]
    fn test_empty() {
        let tree = NamespaceTree::new();
        assert!(tree.is_empty());
        let mut out = String::new();
        tree.render(&mut out, 1);
        assert!(out.is_empty());
    }
}
