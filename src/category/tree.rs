use std::collections::BTreeMap;

use serde::Serialize;

use super::record::CategoryRecord;

/// A category placed in the tree, in the shape tree widgets expect.
///
/// Serializes as `{key, title, isLeaf, children, origin}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub key: String,
    pub title: String,
    pub is_leaf: bool,
    pub children: Vec<TreeNode>,
    /// The record this node was built from.
    #[serde(rename = "origin")]
    pub payload: CategoryRecord,
}

impl TreeNode {
    fn from_record(record: &CategoryRecord) -> Self {
        Self {
            key: record.url_alias.clone(),
            title: record.title.clone(),
            is_leaf: record.is_leaf,
            children: Vec::new(),
            payload: record.clone(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_len).sum::<usize>()
    }

    fn sort_by_sequence(&mut self) {
        self.children.sort_by_key(|c| c.payload.sequence);
        for child in &mut self.children {
            child.sort_by_sequence();
        }
    }
}

/// Ordered collection of root nodes, plus what was left out while building it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    roots: Vec<TreeNode>,
    orphans: Vec<String>,
    excluded: usize,
}

impl Forest {
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<TreeNode> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes across all trees.
    pub fn len(&self) -> usize {
        self.roots.iter().map(TreeNode::subtree_len).sum()
    }

    /// Keys of records whose declared parent was not found one level up.
    ///
    /// Descendants of an orphan are excluded too but are not listed here;
    /// see [`Forest::excluded_count`].
    pub fn orphans(&self) -> &[String] {
        &self.orphans
    }

    /// Number of input records that did not make it into the forest.
    pub fn excluded_count(&self) -> usize {
        self.excluded
    }

    /// Pre-order walk yielding `(depth, node)`, roots at depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.roots.iter().rev().map(|n| (0, n)).collect(),
        }
    }

    pub fn find(&self, key: &str) -> Option<&TreeNode> {
        self.walk().map(|(_, n)| n).find(|n| n.key == key)
    }

    /// Leaf categories in display order. These are the valid targets for filing an article.
    pub fn leaves(&self) -> impl Iterator<Item = &TreeNode> {
        self.walk().map(|(_, n)| n).filter(|n| n.is_leaf)
    }

    /// Reorder roots and every child list by `sequence`.
    ///
    /// The builder keeps input order; this is the explicit sort the display
    /// layer applies when it wants the configured ordering. Stable, so equal
    /// sequences keep input order.
    pub fn sort_by_sequence(&mut self) {
        self.roots.sort_by_key(|r| r.payload.sequence);
        for root in &mut self.roots {
            root.sort_by_sequence();
        }
    }
}

pub struct Walk<'a> {
    stack: Vec<(usize, &'a TreeNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        Some((depth, node))
    }
}

/// Materialize the category forest from a flat, unordered record list.
///
/// Records are bucketed by their own `node_level`. Buckets are then drained
/// from the deepest level up to level 1: each node is appended to the node in
/// the bucket one level up whose key matches its `parent_url_alias`. By the
/// time a node is moved into its parent, all of its own descendants are
/// already attached. What remains in bucket 0 is the forest.
///
/// Children and roots keep input order. A node with no matching parent one
/// level up is dropped along with its subtree; its key is recorded in
/// [`Forest::orphans`].
///
/// Each attachment scans the parent bucket, so this is quadratic in the worst
/// case. Blog taxonomies are tens to hundreds of nodes.
pub fn build_forest(records: &[CategoryRecord]) -> Forest {
    let mut buckets: BTreeMap<u32, Vec<TreeNode>> = BTreeMap::new();
    for record in records {
        buckets
            .entry(record.node_level)
            .or_default()
            .push(TreeNode::from_record(record));
    }

    let deeper_levels: Vec<u32> = buckets.keys().rev().copied().filter(|&l| l > 0).collect();
    let mut orphans = Vec::new();

    for level in deeper_levels {
        let children = buckets.remove(&level).unwrap_or_default();
        // An empty parent level orphans the whole bucket, same as no match.
        let parents = buckets.entry(level - 1).or_default();

        for child in children {
            let parent_idx = child
                .payload
                .parent_url_alias
                .as_deref()
                .and_then(|alias| parents.iter().position(|p| p.key == alias));

            match parent_idx {
                Some(idx) => parents[idx].children.push(child),
                None => {
                    tracing::debug!(
                        key = %child.key,
                        level = level,
                        parent = ?child.payload.parent_url_alias,
                        dropped = child.subtree_len(),
                        "Category parent not found one level up, dropping subtree"
                    );
                    orphans.push(child.key);
                }
            }
        }
    }

    let roots = buckets.remove(&0).unwrap_or_default();
    let placed: usize = roots.iter().map(TreeNode::subtree_len).sum();

    Forest {
        roots,
        orphans,
        excluded: records.len() - placed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rec(key: &str, level: u32, parent: Option<&str>, leaf: bool) -> CategoryRecord {
        CategoryRecord::new(key, key.to_uppercase(), level, parent, leaf)
    }

    fn child_keys(node: &TreeNode) -> Vec<&str> {
        node.children.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn test_empty_input_yields_empty_forest() {
        let forest = build_forest(&[]);
        assert!(forest.is_empty());
        assert_eq!(forest.len(), 0);
        assert!(forest.orphans().is_empty());
        assert_eq!(forest.excluded_count(), 0);
    }

    #[test]
    fn test_basic_hierarchy() {
        let records = vec![
            rec("root", 0, None, false),
            rec("a", 1, Some("root"), false),
            rec("b", 1, Some("root"), true),
            rec("a1", 2, Some("a"), true),
        ];

        let forest = build_forest(&records);
        assert_eq!(forest.roots().len(), 1);

        let root = &forest.roots()[0];
        assert_eq!(root.key, "root");
        assert_eq!(child_keys(root), vec!["a", "b"]);
        assert_eq!(child_keys(&root.children[0]), vec!["a1"]);
        assert!(root.children[1].children.is_empty());
        assert_eq!(forest.len(), 4);
    }

    #[test]
    fn test_unordered_input() {
        // Deepest first, roots last
        let records = vec![
            rec("a1", 2, Some("a"), true),
            rec("b", 1, Some("root"), true),
            rec("a", 1, Some("root"), false),
            rec("root", 0, None, false),
        ];

        let forest = build_forest(&records);
        let root = &forest.roots()[0];
        // Input order, not level or alphabetical order
        assert_eq!(child_keys(root), vec!["b", "a"]);
        assert_eq!(child_keys(&root.children[1]), vec!["a1"]);
    }

    #[test]
    fn test_roots_keep_input_order() {
        let records = vec![
            rec("zeta", 0, None, true),
            rec("alpha", 0, None, true),
            rec("mid", 0, None, true),
        ];
        let forest = build_forest(&records);
        let keys: Vec<_> = forest.roots().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_orphan_dropped_siblings_kept() {
        let records = vec![
            rec("root", 0, None, false),
            rec("x", 1, Some("missing"), true),
            rec("y", 1, Some("root"), true),
        ];

        let forest = build_forest(&records);
        let root = &forest.roots()[0];
        assert_eq!(child_keys(root), vec!["y"]);
        assert!(forest.find("x").is_none());
        assert_eq!(forest.orphans(), &["x".to_string()]);
        assert_eq!(forest.excluded_count(), 1);
    }

    #[test]
    fn test_orphan_only_child() {
        let records = vec![rec("root", 0, None, false), rec("x", 1, Some("missing"), true)];

        let forest = build_forest(&records);
        assert_eq!(forest.roots().len(), 1);
        assert!(forest.roots()[0].children.is_empty());
        assert!(forest.find("x").is_none());
    }

    #[test]
    fn test_orphan_subtree_excluded() {
        let records = vec![
            rec("root", 0, None, false),
            rec("lost", 1, Some("nowhere"), false),
            rec("lost-child", 2, Some("lost"), true),
        ];

        let forest = build_forest(&records);
        assert_eq!(forest.len(), 1);
        assert!(forest.find("lost-child").is_none());
        // Only the direct orphan is reported; the count covers the subtree
        assert_eq!(forest.orphans(), &["lost".to_string()]);
        assert_eq!(forest.excluded_count(), 2);
    }

    #[test]
    fn test_parent_at_wrong_level_is_orphan() {
        // "deep" claims level 2 but its parent is a root
        let records = vec![rec("root", 0, None, false), rec("deep", 2, Some("root"), true)];

        let forest = build_forest(&records);
        assert!(forest.roots()[0].children.is_empty());
        assert_eq!(forest.orphans(), &["deep".to_string()]);
    }

    #[test]
    fn test_child_without_parent_reference_is_orphan() {
        let records = vec![rec("root", 0, None, false), rec("floating", 1, None, true)];
        let forest = build_forest(&records);
        assert_eq!(forest.orphans(), &["floating".to_string()]);
    }

    #[test]
    fn test_huge_level_does_not_allocate_buckets() {
        let records = vec![rec("root", 0, None, true), rec("far", u32::MAX, Some("x"), true)];
        let forest = build_forest(&records);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.orphans(), &["far".to_string()]);
    }

    #[test]
    fn test_payload_and_leaf_copied() {
        let mut record = rec("news", 0, None, true);
        record.sequence = 7;
        record.article_count = 42;

        let forest = build_forest(std::slice::from_ref(&record));
        let node = &forest.roots()[0];
        assert_eq!(node.title, "NEWS");
        assert!(node.is_leaf);
        assert_eq!(node.payload, record);
    }

    #[test]
    fn test_walk_is_preorder_with_depth() {
        let records = vec![
            rec("r1", 0, None, false),
            rec("r2", 0, None, true),
            rec("c1", 1, Some("r1"), false),
            rec("g1", 2, Some("c1"), true),
            rec("c2", 1, Some("r1"), true),
        ];

        let forest = build_forest(&records);
        let walked: Vec<_> = forest.walk().map(|(d, n)| (d, n.key.as_str())).collect();
        assert_eq!(
            walked,
            vec![(0, "r1"), (1, "c1"), (2, "g1"), (1, "c2"), (0, "r2")]
        );
    }

    #[test]
    fn test_leaves() {
        let records = vec![
            rec("r", 0, None, false),
            rec("a", 1, Some("r"), true),
            rec("b", 1, Some("r"), false),
            rec("b1", 2, Some("b"), true),
        ];
        let forest = build_forest(&records);
        let leaves: Vec<_> = forest.leaves().map(|n| n.key.as_str()).collect();
        assert_eq!(leaves, vec!["a", "b1"]);
    }

    #[test]
    fn test_sort_by_sequence_is_explicit() {
        let mut first = rec("first", 1, Some("r"), true);
        first.sequence = 2;
        let mut second = rec("second", 1, Some("r"), true);
        second.sequence = 1;
        let records = vec![rec("r", 0, None, false), first, second];

        let mut forest = build_forest(&records);
        assert_eq!(child_keys(&forest.roots()[0]), vec!["first", "second"]);

        forest.sort_by_sequence();
        assert_eq!(child_keys(&forest.roots()[0]), vec!["second", "first"]);
    }

    #[test]
    fn test_widget_json_shape() {
        let records = vec![rec("r", 0, None, false), rec("c", 1, Some("r"), true)];
        let forest = build_forest(&records);
        let json = serde_json::to_value(forest.roots()).unwrap();

        assert_eq!(json[0]["key"], "r");
        assert_eq!(json[0]["isLeaf"], false);
        assert_eq!(json[0]["children"][0]["key"], "c");
        assert_eq!(json[0]["children"][0]["origin"]["parentNodeUrlAlias"], "r");
    }
}
