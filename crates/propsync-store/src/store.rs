//! In-memory property tree.
//!
//! # Design
//!
//! The tree is a `BTreeMap<String, Node>` where a node is either a
//! versioned scalar leaf or a nested branch. Keys are sorted, so
//! [`PropertyStore::get_all`] is deterministic.
//!
//! Reads hand out copies only. Mutation goes through the crate-private
//! `write_leaf` / `remove_leaf`, which only the applier calls, so version
//! rules cannot be bypassed from outside.

use std::collections::BTreeMap;

use propsync_core::errors::{ApplyError, SnapshotError};
use propsync_core::{PropertyPath, PropertyValue, Version};
use serde_json::{Map, Value};

use crate::versioned::VersionedValue;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(VersionedValue),
    Branch(BTreeMap<String, Node>),
}

/// The nested property tree of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore {
    root: BTreeMap<String, Node>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scalar at `path`. Interior (branch) paths have no value.
    pub fn get(&self, path: &PropertyPath) -> Option<PropertyValue> {
        self.leaf(path).map(|leaf| leaf.value().clone())
    }

    /// Version marker of the leaf at `path`.
    pub fn version_of(&self, path: &PropertyPath) -> Option<Version> {
        self.leaf(path).and_then(VersionedValue::version)
    }

    /// True if a leaf exists at `path`.
    pub fn contains(&self, path: &PropertyPath) -> bool {
        self.leaf(path).is_some()
    }

    /// A copy of the branch or leaf at `path`, as JSON.
    pub fn get_subtree(&self, path: &PropertyPath) -> Option<Value> {
        self.node(path).map(node_to_json)
    }

    /// A deep copy of the whole tree as nested JSON objects.
    pub fn get_all(&self) -> Map<String, Value> {
        branch_to_json(&self.root)
    }

    /// Every leaf with its full path, in key order.
    pub fn leaves(&self) -> Vec<(PropertyPath, PropertyValue)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, &[], &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        count_leaves(&self.root)
    }

    /// True if the tree holds no nodes at all (not even empty branches).
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Replace the entire contents with `snapshot`.
    ///
    /// Objects become branches (empty ones are kept), scalars become
    /// unversioned leaves. The current contents are untouched if any part of
    /// the snapshot is invalid. Returns the number of leaves loaded.
    pub fn bulk_load(&mut self, snapshot: Map<String, Value>) -> Result<usize, SnapshotError> {
        let root = branch_from_json(snapshot, &[])?;
        self.root = root;
        Ok(self.leaf_count())
    }

    // -------------------------------------------------------------------
    // Crate-internal access used by the applier
    // -------------------------------------------------------------------

    pub(crate) fn leaf(&self, path: &PropertyPath) -> Option<&VersionedValue> {
        match self.node(path)? {
            Node::Leaf(leaf) => Some(leaf),
            Node::Branch(_) => None,
        }
    }

    /// The nearest proper ancestor of `path` that holds a leaf, if any.
    pub(crate) fn blocking_ancestor(&self, path: &PropertyPath) -> Option<PropertyPath> {
        let segments = path.segments();
        let mut map = &self.root;
        for (depth, segment) in segments[..segments.len() - 1].iter().enumerate() {
            match map.get(segment) {
                None => return None,
                Some(Node::Branch(child)) => map = child,
                Some(Node::Leaf(_)) => {
                    return PropertyPath::from_segments(segments[..=depth].iter().cloned()).ok()
                }
            }
        }
        None
    }

    /// Write a leaf at `path`, creating intermediate branches.
    ///
    /// Returns the leaf that was replaced, if any. Fails without modifying
    /// anything when an ancestor holds a leaf or `path` itself is a branch.
    pub(crate) fn write_leaf(
        &mut self,
        path: &PropertyPath,
        leaf: VersionedValue,
    ) -> Result<Option<VersionedValue>, ApplyError> {
        if let Some(blocking) = self.blocking_ancestor(path) {
            return Err(ApplyError::PathConflict {
                path: path.to_dotted(),
                blocking: blocking.to_dotted(),
            });
        }
        if let Some(Node::Branch(children)) = self.node(path) {
            return Err(ApplyError::BranchConflict {
                path: path.to_dotted(),
                leaves: count_leaves(children),
            });
        }

        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(None);
        };
        let mut map = &mut self.root;
        for segment in parents {
            let node = map
                .entry(segment.clone())
                .or_insert_with(|| Node::Branch(BTreeMap::new()));
            map = match node {
                Node::Branch(child) => child,
                // Ruled out by `blocking_ancestor` above.
                Node::Leaf(_) => {
                    return Err(ApplyError::PathConflict {
                        path: path.to_dotted(),
                        blocking: segment.clone(),
                    })
                }
            };
        }

        match map.insert(last.clone(), Node::Leaf(leaf)) {
            Some(Node::Leaf(old)) => Ok(Some(old)),
            // A branch was ruled out by the `node` lookup above.
            Some(Node::Branch(_)) | None => Ok(None),
        }
    }

    /// Remove the leaf at `path` and prune ancestors left empty by it.
    pub(crate) fn remove_leaf(&mut self, path: &PropertyPath) -> Option<VersionedValue> {
        remove_in(&mut self.root, path.segments())
    }

    fn node(&self, path: &PropertyPath) -> Option<&Node> {
        let segments = path.segments();
        let (last, parents) = segments.split_last()?;
        let mut map = &self.root;
        for segment in parents {
            match map.get(segment)? {
                Node::Branch(child) => map = child,
                Node::Leaf(_) => return None,
            }
        }
        map.get(last)
    }
}

fn remove_in(map: &mut BTreeMap<String, Node>, segments: &[String]) -> Option<VersionedValue> {
    let (first, rest) = segments.split_first()?;
    if rest.is_empty() {
        if !matches!(map.get(first), Some(Node::Leaf(_))) {
            return None;
        }
        return match map.remove(first) {
            Some(Node::Leaf(leaf)) => Some(leaf),
            _ => None,
        };
    }

    let removed = match map.get_mut(first) {
        Some(Node::Branch(child)) => remove_in(child, rest)?,
        _ => return None,
    };
    if matches!(map.get(first), Some(Node::Branch(child)) if child.is_empty()) {
        map.remove(first);
    }
    Some(removed)
}

fn node_to_json(node: &Node) -> Value {
    match node {
        Node::Leaf(leaf) => leaf.value().as_json().clone(),
        Node::Branch(children) => Value::Object(branch_to_json(children)),
    }
}

fn branch_to_json(map: &BTreeMap<String, Node>) -> Map<String, Value> {
    map.iter()
        .map(|(key, node)| (key.clone(), node_to_json(node)))
        .collect()
}

fn branch_from_json(
    snapshot: Map<String, Value>,
    parent: &[String],
) -> Result<BTreeMap<String, Node>, SnapshotError> {
    let mut out = BTreeMap::new();
    for (key, value) in snapshot {
        if key.is_empty() || key.contains('.') {
            return Err(SnapshotError::InvalidKey {
                parent: parent.join("."),
                key,
            });
        }
        let mut here = parent.to_vec();
        here.push(key.clone());

        let node = match value {
            Value::Object(children) => Node::Branch(branch_from_json(children, &here)?),
            other => {
                let value = PropertyValue::from_json(other).ok_or_else(|| {
                    SnapshotError::NonScalarLeaf {
                        path: here.join("."),
                    }
                })?;
                Node::Leaf(VersionedValue::unversioned(value))
            }
        };
        out.insert(key, node);
    }
    Ok(out)
}

fn collect_leaves(
    map: &BTreeMap<String, Node>,
    prefix: &[String],
    out: &mut Vec<(PropertyPath, PropertyValue)>,
) {
    for (key, node) in map {
        let mut here = prefix.to_vec();
        here.push(key.clone());
        match node {
            Node::Leaf(leaf) => {
                // Keys were validated on the way in, so this always parses.
                if let Ok(path) = PropertyPath::from_segments(here) {
                    out.push((path, leaf.value().clone()));
                }
            }
            Node::Branch(children) => collect_leaves(children, &here, out),
        }
    }
}

fn count_leaves(map: &BTreeMap<String, Node>) -> usize {
    map.values()
        .map(|node| match node {
            Node::Leaf(_) => 1,
            Node::Branch(children) => count_leaves(children),
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
