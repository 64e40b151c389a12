//! Search-bound cache tree.
//!
//! An unbalanced binary search tree of `(key, position)` pairs seen while
//! probing. It does not cache answers so much as bounds: walking the tree for
//! a key tightens `[left, right)` to the positions of the nearest cached
//! neighbours, so the following binary search starts from a narrower range.
//!
//! Nodes are inserted in probe order, never removed, and never rebalanced.
//! Sequential query patterns can therefore degrade the tree into a list;
//! insertion, lookup and drop are all iterative so depth never touches the
//! call stack.

use std::cmp::Ordering;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    key: String,
    position: u64,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn new(key: &str, position: u64) -> Box<Self> {
        Box::new(Self {
            key: key.to_string(),
            position,
            left: None,
            right: None,
        })
    }
}

/// Result of a tree walk: an exact hit, if any, and the narrowed range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrowed<T> {
    pub found: Option<T>,
    pub range: Range<u64>,
}

/// Key-ordered binary search tree of probe results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTree {
    root: Option<Box<Node>>,
    len: usize,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(&Node, usize)> =
            self.root.as_deref().map(|n| (n, 1)).into_iter().collect();
        while let Some((node, d)) = stack.pop() {
            max = max.max(d);
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                stack.push((child, d + 1));
            }
        }
        max
    }

    /// Insert `(key, position)` and return the updated tree.
    ///
    /// Duplicate keys leave the existing entry untouched.
    #[must_use]
    pub fn insert(mut self, key: &str, position: u64) -> Self {
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = match key.cmp(node.key.as_str()) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return self,
            };
        }
        *slot = Some(Node::new(key, position));
        self.len += 1;
        self
    }

    /// Walk by key, tightening `range` at every step.
    ///
    /// Going left sets `right` to the node's position, going right sets
    /// `left`. An exact match returns the node's position.
    pub fn search_by_key(&self, key: &str, range: Range<u64>) -> Narrowed<u64> {
        self.walk(range, |node| key.cmp(node.key.as_str()))
            .map_found(|node| node.position)
    }

    /// Walk by position instead of key.
    ///
    /// The tree is ordered by key. On a sorted store key order and position
    /// order agree, so this walk is still a proper tree descent; it only ever
    /// sees positions that encode traffic put there.
    pub fn search_by_position(&self, position: u64, range: Range<u64>) -> Narrowed<String> {
        self.walk(range, |node| position.cmp(&node.position))
            .map_found(|node| node.key.clone())
    }

    fn walk<F>(&self, mut range: Range<u64>, mut cmp: F) -> Narrowed<&Node>
    where
        F: FnMut(&Node) -> Ordering,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match cmp(node) {
                Ordering::Less => {
                    range.end = node.position;
                    current = node.left.as_deref();
                }
                Ordering::Greater => {
                    range.start = node.position;
                    current = node.right.as_deref();
                }
                Ordering::Equal => {
                    return Narrowed {
                        found: Some(node),
                        range,
                    };
                }
            }
        }
        Narrowed { found: None, range }
    }
}

impl<T> Narrowed<T> {
    fn map_found<U>(self, f: impl FnOnce(T) -> U) -> Narrowed<U> {
        Narrowed {
            found: self.found.map(f),
            range: self.range,
        }
    }
}

impl Drop for SearchTree {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}
