use std::ops::{Index, IndexMut};
use slotmap::{Key, SlotMap};

pub fn map_join<I: IntoIterator, T: ToString, F: FnMut(I::Item) -> T>(it: I, closure: F) -> String {
    it.into_iter().map(closure).map(|t| t.to_string()).collect::<Vec<String>>().join(", ")
}

pub fn pluralize(word: &str, count: u64) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

macro_rules! declare_key_type {
    ($(pub struct $name:ident;)*) => {
        slotmap::new_key_type! {
            $(pub struct $name;)*
        }
    };
}
pub(crate) use declare_key_type;

pub struct KeyMap<K: Key, V> {
    items: SlotMap<K, V>
}

impl<K: Key, V> KeyMap<K, V> {
    pub fn new() -> KeyMap<K, V> {
        KeyMap { items: SlotMap::with_key() }
    }

    pub fn add(&mut self, item: V) -> K {
        self.items.insert(item)
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.items.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K: Key, V> Default for KeyMap<K, V> {
    fn default() -> Self {
        KeyMap::new()
    }
}

impl<K: Key, V> Index<K> for KeyMap<K, V> {
    type Output = V;

    fn index(&self, index: K) -> &V {
        &self.items[index]
    }
}

impl<K: Key, V> IndexMut<K> for KeyMap<K, V> {
    fn index_mut(&mut self, index: K) -> &mut V {
        &mut self.items[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    declare_key_type! {
        pub struct TestKey;
    }

    #[test]
    fn test_key_map_round_trip() {
        let mut map: KeyMap<TestKey, &str> = KeyMap::new();
        let a = map.add("a");
        let b = map.add("b");
        assert_eq!(map[a], "a");
        assert_eq!(map[b], "b");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("argument", 1), "1 argument");
        assert_eq!(pluralize("argument", 3), "3 arguments");
    }

    #[test]
    fn test_map_join() {
        assert_eq!(map_join([1, 2, 3], |n| n * 2), "2, 4, 6");
    }
}
