/// A keyed unit of hierarchical configuration data.
///
/// A node carries a key (empty for the root), optionally a scalar text value,
/// and an ordered set of child nodes. A node is either scalar-valued or has
/// children; both can be inspected independently. Keys are unique within a
/// node, compared ASCII-case-insensitively — that invariant is the host's to
/// uphold, the binder only reads nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigNode {
    key: String,
    value: Option<String>,
    children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// An empty node with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            children: Vec::new(),
        }
    }

    /// A scalar-valued node.
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// A node with child nodes.
    pub fn with_children(key: impl Into<String>, children: Vec<ConfigNode>) -> Self {
        Self {
            key: key.into(),
            value: None,
            children,
        }
    }

    /// The root of a configuration tree (empty key).
    pub fn root(children: Vec<ConfigNode>) -> Self {
        Self::with_children("", children)
    }

    /// The node's key. Empty for the root.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The node's scalar value, if it carries one.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The node's children, in order.
    pub fn children(&self) -> &[ConfigNode] {
        &self.children
    }

    /// Whether the node has any children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Look up a child by key, ASCII-case-insensitively.
    pub fn child(&self, key: &str) -> Option<&ConfigNode> {
        self.children
            .iter()
            .find(|child| child.key.eq_ignore_ascii_case(key))
    }

    /// Append a child node.
    pub fn push_child(&mut self, child: ConfigNode) {
        self.children.push(child);
    }
}
