//! The template node model
//!
//! A parsed template is an arena-backed tree: nodes live in a `Vec` owned by
//! the [`TemplateTree`], and both the owning parent→child links and the
//! upward parent back-references are stored as indices. The tree is built in
//! a single pass and never mutated afterwards.
//!
//! ```text
//! ROOT(O)
//! |--> Resources(F) --> Resources(O)
//! |                     +--> "S3Bucket"(F) --> S3Bucket(O)
//! |                                            |--> Type(F) --> "AWS::S3::Bucket"(V)
//! |                                            +--> Properties(F) --> Properties(O)
//! +--> Conditions(F) --> Conditions(A)
//!                        |--> 0(I) --> Condition(O)
//!                        +--> 1(I) --> Condition(O)
//! ```
//!
//! (O: object node; F: field node; A: array node; I: index node; V: value node)

use cfn_template_toolkit_common::{Location, PathSegment, TemplatePath};

/// Index of a node within its [`TemplateTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The closed set of node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Ordered field-name → child mapping; names are unique.
    Object { fields: Vec<(String, NodeId)> },
    /// Ordered element sequence.
    Array { items: Vec<NodeId> },
    /// Synthetic wrapper around a value stored under a field name.
    Field { name: String, value: NodeId },
    /// Synthetic wrapper around a value stored at an array position.
    Index { index: usize, value: NodeId },
    /// Terminal scalar; raw literal text.
    Value { text: String },
}

/// One node of the parsed template tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateNode {
    pub parent: Option<NodeId>,
    pub start: Location,
    pub end: Location,
    pub kind: NodeKind,
}

impl TemplateNode {
    pub fn is_object(&self) -> bool {
        matches!(self.kind, NodeKind::Object { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, NodeKind::Array { .. })
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, NodeKind::Value { .. })
    }

    /// Scalar text, if this is a value node.
    pub fn value_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Value { text } => Some(text),
            _ => None,
        }
    }
}

/// Arena-backed template tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateTree {
    nodes: Vec<TemplateNode>,
    root: Option<NodeId>,
}

impl TemplateTree {
    pub fn new() -> Self {
        TemplateTree::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn node(&self, id: NodeId) -> &TemplateNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate all node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    fn alloc(&mut self, kind: NodeKind, start: Location, end: Location) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TemplateNode {
            parent: None,
            start,
            end,
            kind,
        });
        id
    }

    pub(crate) fn new_object(&mut self, start: Location) -> NodeId {
        self.alloc(NodeKind::Object { fields: Vec::new() }, start, start)
    }

    pub(crate) fn new_array(&mut self, start: Location) -> NodeId {
        self.alloc(NodeKind::Array { items: Vec::new() }, start, start)
    }

    pub(crate) fn new_value(&mut self, text: String, start: Location, end: Location) -> NodeId {
        self.alloc(NodeKind::Value { text }, start, end)
    }

    pub(crate) fn set_end(&mut self, id: NodeId, end: Location) {
        self.nodes[id.0].end = end;
    }

    /// Store `child` in `object` under `name`, wrapping it in a field node.
    ///
    /// A duplicate name replaces the existing entry's value in place, keeping
    /// its original position in the field order.
    pub(crate) fn put_field(&mut self, object: NodeId, name: &str, child: NodeId) {
        let child_node = &self.nodes[child.0];
        let (start, end) = (child_node.start, child_node.end);
        let wrapper = self.alloc(
            NodeKind::Field {
                name: name.to_string(),
                value: child,
            },
            start,
            end,
        );
        self.nodes[wrapper.0].parent = Some(object);
        self.nodes[child.0].parent = Some(wrapper);

        let NodeKind::Object { fields } = &mut self.nodes[object.0].kind else {
            unreachable!("put_field target must be an object node");
        };
        if let Some(entry) = fields.iter_mut().find(|(n, _)| n == name) {
            entry.1 = wrapper;
        } else {
            fields.push((name.to_string(), wrapper));
        }
    }

    /// Append `child` to `array`, wrapping it in an index node.
    pub(crate) fn push_item(&mut self, array: NodeId, child: NodeId) {
        let child_node = &self.nodes[child.0];
        let (start, end) = (child_node.start, child_node.end);
        let NodeKind::Array { items } = &self.nodes[array.0].kind else {
            unreachable!("push_item target must be an array node");
        };
        let index = items.len();
        let wrapper = self.alloc(NodeKind::Index { index, value: child }, start, end);
        self.nodes[wrapper.0].parent = Some(array);
        self.nodes[child.0].parent = Some(wrapper);

        let NodeKind::Array { items } = &mut self.nodes[array.0].kind else {
            unreachable!();
        };
        items.push(wrapper);
    }

    /// Look up a field's value node by name on an object node.
    pub fn field(&self, object: NodeId, name: &str) -> Option<NodeId> {
        match &self.node(object).kind {
            NodeKind::Object { fields } => fields.iter().find(|(n, _)| n == name).map(|(_, w)| {
                match &self.node(*w).kind {
                    NodeKind::Field { value, .. } => *value,
                    _ => unreachable!("object children are field wrappers"),
                }
            }),
            _ => None,
        }
    }

    /// The field names of an object node, in insertion order.
    pub fn field_names(&self, object: NodeId) -> Vec<&str> {
        match &self.node(object).kind {
            NodeKind::Object { fields } => fields.iter().map(|(n, _)| n.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// An array node's value nodes, in order.
    pub fn items(&self, array: NodeId) -> Vec<NodeId> {
        match &self.node(array).kind {
            NodeKind::Array { items } => items
                .iter()
                .map(|w| match &self.node(*w).kind {
                    NodeKind::Index { value, .. } => *value,
                    _ => unreachable!("array children are index wrappers"),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The path from the root to `id`, beginning with the root sentinel.
    ///
    /// Field segments for objects carrying a scalar `Type` field include the
    /// type text as a discriminator parameter, matching the path the parser
    /// tracked while building the tree.
    pub fn path_of(&self, id: NodeId) -> TemplatePath {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            match &node.kind {
                NodeKind::Field { name, value } => {
                    segments.push(self.field_segment(name, *value));
                }
                NodeKind::Index { index, .. } => segments.push(PathSegment::Index(*index)),
                _ => {}
            }
            current = node.parent;
        }
        segments.push(PathSegment::Root);
        segments.reverse();
        segments.into()
    }

    fn field_segment(&self, name: &str, value: NodeId) -> PathSegment {
        if let Some(type_value) = self.field(value, "Type") {
            if let Some(text) = self.node(type_value).value_text() {
                return PathSegment::field_with_param(name, text);
            }
        }
        PathSegment::field(name)
    }

    /// Resolve a path back to the node it addresses.
    ///
    /// Segment matching is by field name and index only; discriminator
    /// parameters are ignored. Synthetic wrappers are skipped: the returned
    /// node is the wrapped object, array, or value.
    pub fn lookup(&self, path: &TemplatePath) -> Option<NodeId> {
        let mut current = self.root()?;
        for segment in path.segments() {
            match segment {
                PathSegment::Root => continue,
                PathSegment::Field { name, .. } => {
                    current = self.field(current, name)?;
                }
                PathSegment::Index(i) => {
                    let items = self.items(current);
                    current = *items.get(*i)?;
                }
            }
        }
        Some(current)
    }

    /// Count of scalar leaves (value nodes).
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_value()).count()
    }

    /// Count of object and array container nodes.
    pub fn container_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.is_object() || n.is_array())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(offset: usize) -> Location {
        Location {
            line: 1,
            column: offset + 1,
            offset,
        }
    }

    fn sample_tree() -> (TemplateTree, NodeId, NodeId) {
        // { "Resources": { "B": { "Type": "AWS::S3::Bucket" } }, "Tags": ["a"] }
        let mut tree = TemplateTree::new();
        let root = tree.new_object(loc(0));
        tree.set_root(root);

        let resources = tree.new_object(loc(1));
        let bucket = tree.new_object(loc(2));
        let type_value = tree.new_value("AWS::S3::Bucket".to_string(), loc(3), loc(4));
        tree.put_field(bucket, "Type", type_value);
        tree.put_field(resources, "B", bucket);
        tree.put_field(root, "Resources", resources);

        let tags = tree.new_array(loc(5));
        let tag = tree.new_value("a".to_string(), loc(6), loc(7));
        tree.push_item(tags, tag);
        tree.put_field(root, "Tags", tags);

        (tree, bucket, tag)
    }

    #[test]
    fn test_parent_links_set_on_insertion() {
        let (tree, bucket, _) = sample_tree();
        let wrapper = tree.node(bucket).parent.expect("bucket has a field wrapper parent");
        assert!(matches!(tree.node(wrapper).kind, NodeKind::Field { .. }));
        let resources = tree.node(wrapper).parent.unwrap();
        assert!(tree.node(resources).is_object());
    }

    #[test]
    fn test_path_includes_type_discriminator() {
        let (tree, bucket, _) = sample_tree();
        assert_eq!(
            tree.path_of(bucket).to_string(),
            "ROOT/Resources/B,AWS::S3::Bucket/"
        );
    }

    #[test]
    fn test_array_path_uses_index_segments() {
        let (tree, _, tag) = sample_tree();
        assert_eq!(tree.path_of(tag).to_string(), "ROOT/Tags/0/");
    }

    #[test]
    fn test_path_round_trip() {
        let (tree, bucket, tag) = sample_tree();
        for id in [bucket, tag] {
            let path = tree.path_of(id);
            assert_eq!(tree.lookup(&path), Some(id), "path {} did not round-trip", path);
        }
    }

    #[test]
    fn test_duplicate_field_replaces_in_place() {
        let mut tree = TemplateTree::new();
        let root = tree.new_object(loc(0));
        tree.set_root(root);
        let first = tree.new_value("1".to_string(), loc(1), loc(2));
        let second = tree.new_value("2".to_string(), loc(3), loc(4));
        tree.put_field(root, "A", first);
        tree.put_field(root, "B", second);
        let replacement = tree.new_value("3".to_string(), loc(5), loc(6));
        tree.put_field(root, "A", replacement);

        assert_eq!(tree.field_names(root), vec!["A", "B"]);
        let a = tree.field(root, "A").unwrap();
        assert_eq!(tree.node(a).value_text(), Some("3"));
    }

    #[test]
    fn test_leaf_and_container_counts() {
        let (tree, _, _) = sample_tree();
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.container_count(), 4);
    }
}
