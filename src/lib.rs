//! An ordered map from string keys to unsigned integer values, implemented
//! with an AVL tree.
//!
//! [`BalancedMap`] keeps its entries sorted by key and rebalances itself
//! after every insertion and removal, so lookups, mutations and range
//! queries all run in O(log n).
//!
//! ```
//! use balanced_map::BalancedMap;
//! let mut map = BalancedMap::new();
//! map.insert(String::from("apple"), 3);
//! map.insert(String::from("banana"), 5);
//! assert_eq!(map.get("apple"), Some(&3));
//! assert_eq!(map.keys(), ["apple", "banana"]);
//! map.remove("apple");
//! assert!(map.get("apple").is_none());
//! ```

mod map;

pub use map::{BalancedMap, Iter};
