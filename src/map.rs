//! An ordered map implemented with an AVL tree.

use std::cmp::{self, Ordering};
use std::fmt;
use std::ops::{Index, IndexMut};

/// An ordered map from string keys to unsigned integer values, implemented
/// with an AVL tree.
///
/// Every node exclusively owns its subtrees, so the map owns all of its
/// entries and releases them when dropped. Insertion, removal, lookup and
/// range queries run in O(log n); the tree rebalances itself after every
/// mutation.
///
/// ```
/// use balanced_map::BalancedMap;
/// let mut map = BalancedMap::new();
/// map.insert(String::from("a"), 1);
/// map.insert(String::from("b"), 2);
/// assert_eq!(map.get("b"), Some(&2));
/// map.remove("b");
/// assert!(map.get("b").is_none());
/// ```
#[derive(Clone)]
pub struct BalancedMap {
    root: Link,
    num_nodes: usize,
}

#[derive(Clone)]
struct Node {
    key: String,
    value: u64,
    left: Link,
    right: Link,
    height: usize,
}

type Link = Option<Box<Node>>;

/// An iterator over the entries of a map in ascending key order.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl BalancedMap {
    /// Creates an empty map.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree.
    ///
    /// A map with a single entry has height 0. The empty map also reports
    /// height 0; use [`is_empty`](Self::is_empty) to tell the two apart.
    pub fn height(&self) -> usize {
        match &self.root {
            None => 0,
            Some(root) => root.height,
        }
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns true if the map contains the given key.
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &str) -> Option<&u64> {
        self.find(key).map(|node| &node.value)
    }

    /// Returns the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &u64)> {
        self.find(key).map(|node| (node.key.as_str(), &node.value))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut u64> {
        self.find_mut(key).map(|node| &mut node.value)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns true if the pair was inserted. If the key is already present
    /// the map is left unchanged, the given value is discarded and false is
    /// returned.
    pub fn insert(&mut self, key: String, value: u64) -> bool {
        if Self::insert_in(&mut self.root, key, value) {
            self.num_nodes += 1;
            return true;
        }
        false
    }

    /// Removes a key from the map.
    ///
    /// Returns true if the key was previously in the map.
    pub fn remove(&mut self, key: &str) -> bool {
        if Self::remove_from(&mut self.root, key) {
            debug_assert!(self.num_nodes >= 1);
            self.num_nodes -= 1;
            debug_assert!(self.get(key).is_none());
            return true;
        }
        false
    }

    /// Returns the values for all keys between `low` and `high` inclusive,
    /// in ascending key order.
    ///
    /// An empty or unmatched range yields an empty vector.
    pub fn range(&self, low: &str, high: &str) -> Vec<u64> {
        let mut values = Vec::new();
        Self::collect_range(self.root.as_deref(), low, high, &mut values);
        values
    }

    /// Returns all keys in the map in ascending order.
    /// The result always has length [`len`](Self::len).
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.num_nodes);
        Self::collect_keys(self.root.as_deref(), &mut keys);
        keys
    }

    /// Returns an iterator over the entries of the map in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let num_nodes = Self::check_node(self.root.as_deref(), None, None);
        assert_eq!(num_nodes, self.num_nodes);
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn check_node(link: Option<&Node>, low: Option<&str>, high: Option<&str>) -> usize {
        let node = match link {
            None => return 0,
            Some(node) => node,
        };

        // Check search order against the enclosing key bounds
        if let Some(low) = low {
            assert!(low < node.key.as_str());
        }
        if let Some(high) = high {
            assert!(node.key.as_str() < high);
        }

        // Check cached height
        let left_height = node.left_height();
        let right_height = node.right_height();
        assert_eq!(node.height, cmp::max(left_height, right_height));

        // Check AVL condition (near balance)
        assert!(left_height <= right_height + 1);
        assert!(right_height <= left_height + 1);

        let key = node.key.as_str();
        Self::check_node(node.left.as_deref(), low, Some(key))
            + Self::check_node(node.right.as_deref(), Some(key), high)
            + 1
    }

    fn find(&self, key: &str) -> Option<&Node> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.as_str()) {
                Ordering::Equal => break,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        current
    }

    fn find_mut(&mut self, key: &str) -> Option<&mut Node> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(node.key.as_str()) {
                Ordering::Equal => return Some(node),
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
            }
        }
        None
    }

    fn insert_in(link: &mut Link, key: String, value: u64) -> bool {
        let node = match link {
            None => {
                *link = Some(Box::new(Node::new(key, value)));
                return true;
            }
            Some(node) => node,
        };
        let inserted = match key.cmp(&node.key) {
            Ordering::Less => Self::insert_in(&mut node.left, key, value),
            Ordering::Greater => Self::insert_in(&mut node.right, key, value),
            Ordering::Equal => false,
        };
        if inserted {
            // Heights along the search path are refreshed bottom-up as the
            // recursion unwinds, so children are correct before the parent.
            Self::rebalance(link);
        }
        inserted
    }

    fn remove_from(link: &mut Link, key: &str) -> bool {
        let node = match link {
            None => return false,
            Some(node) => node,
        };
        let removed = match key.cmp(node.key.as_str()) {
            Ordering::Less => Self::remove_from(&mut node.left, key),
            Ordering::Greater => Self::remove_from(&mut node.right, key),
            Ordering::Equal => {
                Self::remove_node(link);
                true
            }
        };
        if removed {
            Self::rebalance(link);
        }
        removed
    }

    /// Removes the node at `link` from the tree.
    /// Rebalancing of the search path is left to the caller.
    fn remove_node(link: &mut Link) {
        let node = match link.as_deref_mut() {
            None => return,
            Some(node) => node,
        };
        if node.left.is_none() {
            // Leaf or single right child, replace node by its child link
            let right = node.right.take();
            *link = right;
        } else if node.right.is_none() {
            // Single left child
            let left = node.left.take();
            *link = left;
        } else {
            // Two children: copy the in-order successor (leftmost node of the
            // right subtree) into this node, then remove the successor's old
            // node. The successor has no left child, so that removal resolves
            // without recursing back here.
            let (succ_key, succ_value) = {
                let mut succ = node.right.as_deref().unwrap();
                while let Some(left) = succ.left.as_deref() {
                    succ = left;
                }
                (succ.key.clone(), succ.value)
            };
            let removed = Self::remove_from(&mut node.right, &succ_key);
            debug_assert!(removed);
            node.key = succ_key;
            node.value = succ_value;
        }
    }

    /// Restores the AVL condition at `link` if necessary and refreshes the
    /// cached height. The subtrees must already be balanced with correct
    /// heights; the height difference at `link` must not exceed 2, which
    /// always holds after a single insert or remove below it.
    fn rebalance(link: &mut Link) {
        let node = match link.as_deref_mut() {
            None => return,
            Some(node) => node,
        };
        let left_height = node.left_height();
        let right_height = node.right_height();
        debug_assert!(left_height <= right_height + 2);
        debug_assert!(right_height <= left_height + 2);
        if left_height > right_height + 1 {
            // Left-heavy. A left child leaning right is the left-right case
            // and takes a double rotation.
            if let Some(left) = node.left.as_deref() {
                if left.right_height() > left.left_height() {
                    Self::rotate_left(&mut node.left);
                }
            }
            Self::rotate_right(link);
        } else if right_height > left_height + 1 {
            // Right-heavy, mirror image
            if let Some(right) = node.right.as_deref() {
                if right.left_height() > right.right_height() {
                    Self::rotate_right(&mut node.right);
                }
            }
            Self::rotate_left(link);
        } else {
            node.adjust_height();
        }
    }

    fn rotate_left(link: &mut Link) {
        if let Some(mut node) = link.take() {
            match node.right.take() {
                // A rotation needs the child it promotes; only the rebalance
                // logic calls in here and it guarantees one exists.
                None => *link = Some(node),
                Some(mut pivot) => {
                    node.right = pivot.left.take();
                    node.adjust_height();
                    pivot.left = Some(node);
                    pivot.adjust_height();
                    *link = Some(pivot);
                }
            }
        }
    }

    fn rotate_right(link: &mut Link) {
        if let Some(mut node) = link.take() {
            match node.left.take() {
                None => *link = Some(node),
                Some(mut pivot) => {
                    node.left = pivot.right.take();
                    node.adjust_height();
                    pivot.right = Some(node);
                    pivot.adjust_height();
                    *link = Some(pivot);
                }
            }
        }
    }

    fn collect_range(link: Option<&Node>, low: &str, high: &str, values: &mut Vec<u64>) {
        let node = match link {
            None => return,
            Some(node) => node,
        };
        let key = node.key.as_str();
        if low < key {
            Self::collect_range(node.left.as_deref(), low, high, values);
        }
        if low <= key && key <= high {
            values.push(node.value);
        }
        if high > key {
            Self::collect_range(node.right.as_deref(), low, high, values);
        }
    }

    fn collect_keys<'a>(link: Option<&'a Node>, keys: &mut Vec<&'a str>) {
        if let Some(node) = link {
            Self::collect_keys(node.left.as_deref(), keys);
            keys.push(node.key.as_str());
            Self::collect_keys(node.right.as_deref(), keys);
        }
    }

    fn fmt_link(link: Option<&Node>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = match link {
            None => return write!(f, "[]"),
            Some(node) => node,
        };
        write!(f, "[{}:{} ({}) ", node.key, node.value, node.height)?;
        Self::fmt_link(node.left.as_deref(), f)?;
        write!(f, ", ")?;
        Self::fmt_link(node.right.as_deref(), f)?;
        write!(f, "]")
    }
}

impl Default for BalancedMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the tree structure as nested brackets, one
/// `[key:value (height) left, right]` group per node with `[]` for an
/// absent link. The empty map renders as `[]`.
impl fmt::Display for BalancedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::fmt_link(self.root.as_deref(), f)
    }
}

impl fmt::Debug for BalancedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Index<&str> for BalancedMap {
    type Output = u64;

    /// Returns a reference to the value for the given key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &str) -> &u64 {
        self.get(key).expect("no entry found for key")
    }
}

impl IndexMut<&str> for BalancedMap {
    /// Returns a mutable reference to the value for the given key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index_mut(&mut self, key: &str) -> &mut u64 {
        self.get_mut(key).expect("no entry found for key")
    }
}

impl FromIterator<(String, u64)> for BalancedMap {
    /// Builds a map from key-value pairs.
    /// For keys occurring more than once the first value wins, matching the
    /// duplicate rejection of [`insert`](BalancedMap::insert).
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl Extend<(String, u64)> for BalancedMap {
    fn extend<I: IntoIterator<Item = (String, u64)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a BalancedMap {
    type Item = (&'a str, &'a u64);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<'a> Iter<'a> {
    fn push_left_spine(&mut self, mut link: Option<&'a Node>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a u64);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some((node.key.as_str(), &node.value))
    }
}

impl Node {
    fn new(key: String, value: u64) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 0,
        }
    }

    // Link heights count the connecting edge: an absent child is 0 and a
    // child node is its height plus one. This keeps the balance arithmetic
    // unsigned while matching the usual -1 convention for missing subtrees.
    fn left_height(&self) -> usize {
        match &self.left {
            None => 0,
            Some(left) => left.height + 1,
        }
    }

    fn right_height(&self) -> usize {
        match &self.right {
            None => 0,
            Some(right) => right.height + 1,
        }
    }

    fn adjust_height(&mut self) {
        self.height = cmp::max(self.left_height(), self.right_height());
    }
}
