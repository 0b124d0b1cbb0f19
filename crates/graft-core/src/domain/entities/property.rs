//! Profiled key/value properties.

use crate::domain::value_objects::{Profile, PropertyKey, PropertyValue};

/// Properties of one profile: first-seen key order, last-written value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBlock {
    entries: Vec<(PropertyKey, PropertyValue)>,
}

impl PropertyBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: PropertyKey, value: PropertyValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merge every entry of `other`; returns how many were written.
    pub fn merge(&mut self, other: &PropertyBlock) -> usize {
        for (key, value) in &other.entries {
            self.set(key.clone(), value.clone());
        }
        other.entries.len()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(PropertyKey, PropertyValue)> for PropertyBlock {
    fn from_iter<T: IntoIterator<Item = (PropertyKey, PropertyValue)>>(iter: T) -> Self {
        let mut block = Self::new();
        for (key, value) in iter {
            block.set(key, value);
        }
        block
    }
}

/// Property blocks keyed by profile.
///
/// The default profile always exists and always comes first; other profiles
/// keep the order in which they were first written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySet {
    profiles: Vec<(Profile, PropertyBlock)>,
}

impl Default for PropertySet {
    fn default() -> Self {
        Self {
            profiles: vec![(Profile::default(), PropertyBlock::new())],
        }
    }
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, profile: Profile, key: PropertyKey, value: PropertyValue) {
        self.block_mut(profile).set(key, value);
    }

    pub fn block_mut(&mut self, profile: Profile) -> &mut PropertyBlock {
        let index = match self.profiles.iter().position(|(p, _)| *p == profile) {
            Some(index) => index,
            None => {
                self.profiles.push((profile, PropertyBlock::new()));
                self.profiles.len() - 1
            }
        };
        &mut self.profiles[index].1
    }

    pub fn block(&self, profile: &Profile) -> Option<&PropertyBlock> {
        self.profiles
            .iter()
            .find(|(p, _)| p == profile)
            .map(|(_, block)| block)
    }

    /// Merge `other` profile by profile.
    pub fn merge(&mut self, other: &PropertySet) -> usize {
        other
            .profiles
            .iter()
            .map(|(profile, block)| self.block_mut(profile.clone()).merge(block))
            .sum()
    }

    pub fn profiles(&self) -> impl Iterator<Item = (&Profile, &PropertyBlock)> {
        self.profiles.iter().map(|(p, b)| (p, b))
    }

    /// Profiles that hold at least one property.
    pub fn non_empty_profiles(&self) -> impl Iterator<Item = (&Profile, &PropertyBlock)> {
        self.profiles().filter(|(_, block)| !block.is_empty())
    }

    /// Total number of properties across profiles.
    pub fn len(&self) -> usize {
        self.profiles.iter().map(|(_, b)| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> PropertyKey {
        PropertyKey::new(k).unwrap()
    }

    fn value(v: &str) -> PropertyValue {
        PropertyValue::new([v]).unwrap()
    }

    fn profile(p: &str) -> Profile {
        Profile::new(p).unwrap()
    }

    #[test]
    fn default_profile_always_exists_first() {
        let mut set = PropertySet::new();
        assert!(set.block(&Profile::default()).is_some());

        set.set(profile("local"), key("a"), value("1"));
        let order: Vec<_> = set.profiles().map(|(p, _)| p.as_str()).collect();
        assert_eq!(order, vec!["default", "local"]);
    }

    #[test]
    fn first_seen_key_order_last_written_value() {
        let block: PropertyBlock = [
            (key("b"), value("1")),
            (key("a"), value("1")),
            (key("b"), value("2")),
        ]
        .into_iter()
        .collect();

        let entries: Vec<_> = block
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.joined()))
            .collect();
        assert_eq!(
            entries,
            vec![("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn profile_creation_order_is_first_write() {
        let mut set = PropertySet::new();
        set.set(profile("prod"), key("a"), value("1"));
        set.set(profile("local"), key("a"), value("1"));
        set.set(profile("prod"), key("b"), value("1"));

        let order: Vec<_> = set.profiles().map(|(p, _)| p.as_str()).collect();
        assert_eq!(order, vec!["default", "prod", "local"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn merge_sets() {
        let mut existing = PropertySet::new();
        existing.set(Profile::default(), key("server.port"), value("8080"));

        let mut incoming = PropertySet::new();
        incoming.set(Profile::default(), key("server.port"), value("9090"));
        incoming.set(profile("local"), key("debug"), value("true"));

        let merged = existing.merge(&incoming);
        assert_eq!(merged, 2);
        assert_eq!(
            existing
                .block(&Profile::default())
                .and_then(|b| b.get(&key("server.port")))
                .map(PropertyValue::joined),
            Some("9090".to_string())
        );
        assert_eq!(existing.non_empty_profiles().count(), 2);
    }
}
