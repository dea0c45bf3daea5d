//! Allowed collision matrix
//!
//! Symmetric table of body pairs whose mutual contact is not a violation,
//! e.g. adjacent links that touch at their shared joint.

use std::collections::BTreeMap;

/// Symmetric relation over body-name pairs, each entry carrying a reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllowedCollisionMatrix {
    entries: BTreeMap<(String, String), String>,
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl AllowedCollisionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow contact between `a` and `b`. Replaces the reason of an existing entry.
    pub fn add_allowed_collision(&mut self, a: &str, b: &str, reason: &str) {
        self.entries.insert(pair_key(a, b), reason.to_string());
    }

    /// Returns true if the pair was listed
    pub fn remove_allowed_collision(&mut self, a: &str, b: &str) -> bool {
        self.entries.remove(&pair_key(a, b)).is_some()
    }

    /// Drop every entry that mentions `link`
    pub fn remove_allowed_collisions_for_link(&mut self, link: &str) {
        self.entries.retain(|(a, b), _| a != link && b != link);
    }

    /// Whether a contact between `a` and `b` is to be ignored. Unknown pairs are not allowed.
    pub fn is_collision_allowed(&self, a: &str, b: &str) -> bool {
        self.entries.contains_key(&pair_key(a, b))
    }

    pub fn reason(&self, a: &str, b: &str) -> Option<&str> {
        self.entries.get(&pair_key(a, b)).map(String::as_str)
    }

    /// Merge all entries of `other`; its reasons win on conflicts
    pub fn insert_all(&mut self, other: &AllowedCollisionMatrix) {
        for (key, reason) in &other.entries {
            self.entries.insert(key.clone(), reason.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.entries
            .iter()
            .map(|((a, b), reason)| (a.as_str(), b.as_str(), reason.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
