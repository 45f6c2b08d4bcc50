use crate::hash_table::{HashTable, TableKey};
use log::{debug, trace};
use std::fmt::{Display, Formatter};
use std::mem;

/// Handle to an object in the heap arena. Handles stay valid for the heap's whole lifetime,
/// so comparing two handles is comparing object identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjRef(usize);

impl ObjRef {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub enum Object {
    String(ObjString),
}

impl Object {
    pub fn as_objstring(&self) -> Option<&ObjString> {
        match self {
            Object::String(s) => Some(s),
        }
    }

    fn size(&self) -> usize {
        match self {
            Object::String(s) => mem::size_of::<Object>() + s.len(),
        }
    }
}

#[derive(Debug)]
pub struct ObjString {
    chars: Box<str>,
    hash: u32,
}

impl ObjString {
    fn new(chars: Box<str>) -> Self {
        let hash = make_hash(chars.as_bytes());
        Self { chars, hash }
    }

    pub fn as_str(&self) -> &str {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }
}

impl Display for ObjString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// FNV-1a.
fn make_hash(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

/// An interned string used as a table key: identity plus the cached hash.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StringKey {
    obj: ObjRef,
    hash: u32,
}

impl StringKey {
    pub fn obj(self) -> ObjRef {
        self.obj
    }
}

impl TableKey for StringKey {
    fn table_hash(&self) -> u32 {
        self.hash
    }
}

/// Owns every object allocated while compiling and running. Nothing is collected yet;
/// all objects are released together when the manager is dropped.
#[derive(Debug)]
pub struct HeapManager {
    objects: Vec<Object>,
    strings: HashTable<StringKey, ()>,
    bytes_allocated: usize,
}

impl HeapManager {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            strings: HashTable::new(),
            bytes_allocated: 0,
        }
    }

    pub fn get(&self, obj: ObjRef) -> Option<&Object> {
        self.objects.get(obj.0)
    }

    pub fn as_objstring(&self, obj: ObjRef) -> Option<&ObjString> {
        self.get(obj).and_then(Object::as_objstring)
    }

    pub fn string_key(&self, obj: ObjRef) -> Option<StringKey> {
        self.as_objstring(obj).map(|s| StringKey { obj, hash: s.hash })
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    pub fn create_string_copied(&mut self, s: &str) -> ObjRef {
        let hash = make_hash(s.as_bytes());
        match self.find_interned(s, hash) {
            Some(obj) => obj,
            None => self.intern(ObjString {
                chars: s.into(),
                hash,
            }),
        }
    }

    /// Takes ownership of an already built buffer, dropping it if an equal string exists.
    pub fn take_string(&mut self, s: String) -> ObjRef {
        let hash = make_hash(s.as_bytes());
        match self.find_interned(&s, hash) {
            Some(obj) => obj,
            None => self.intern(ObjString::new(s.into_boxed_str())),
        }
    }

    /// `None` unless both handles are strings.
    pub fn create_string_concat(&mut self, a: ObjRef, b: ObjRef) -> Option<ObjRef> {
        let a = self.as_objstring(a)?;
        let b = self.as_objstring(b)?;
        let mut chars = String::with_capacity(a.len() + b.len());
        chars.push_str(a.as_str());
        chars.push_str(b.as_str());
        Some(self.take_string(chars))
    }

    fn find_interned(&self, s: &str, hash: u32) -> Option<ObjRef> {
        let objects = &self.objects;
        self.strings
            .find_by(hash, |key| match objects.get(key.obj.0) {
                Some(Object::String(existing)) => {
                    existing.len() == s.len()
                        && existing.hash == hash
                        && existing.as_str() == s
                }
                None => false,
            })
            .map(StringKey::obj)
    }

    fn intern(&mut self, string: ObjString) -> ObjRef {
        let hash = string.hash;
        let obj = self.register_object(Object::String(string));
        self.strings.insert(StringKey { obj, hash }, ());
        obj
    }

    fn register_object(&mut self, object: Object) -> ObjRef {
        let size = object.size();
        self.bytes_allocated += size;
        self.objects.push(object);
        trace!(
            "Allocated {} bytes for a new total of {}",
            size,
            self.bytes_allocated
        );
        ObjRef(self.objects.len() - 1)
    }
}

impl Default for HeapManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HeapManager {
    fn drop(&mut self) {
        debug!(
            "Freeing {} objects ({} bytes), {} interned strings",
            self.objects.len(),
            self.bytes_allocated(),
            self.strings.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_interning() {
        let mut heap_manager = HeapManager::new();
        let a = heap_manager.create_string_copied("hi!");
        let b = heap_manager.create_string_copied("hi!");
        let c = heap_manager.create_string_copied("hi!hi!");
        assert_eq!(a, b);
        assert_ne!(a, c);
        let d = heap_manager.create_string_concat(a, b).unwrap();
        assert_eq!(c, d);
        assert_eq!(heap_manager.object_count(), 2);
    }

    #[test]
    fn concat_allocates_new_strings() {
        let mut heap = HeapManager::new();
        let foo = heap.create_string_copied("foo");
        let bar = heap.create_string_copied("bar");
        let foobar = heap.create_string_concat(foo, bar).unwrap();
        assert_eq!(heap.as_objstring(foobar).unwrap().as_str(), "foobar");
        assert_eq!(heap.object_count(), 3);
        assert_eq!(heap.create_string_copied("foobar"), foobar);
    }

    #[test]
    fn empty_strings_intern_too() {
        let mut heap = HeapManager::new();
        let a = heap.create_string_copied("");
        let b = heap.take_string(String::new());
        assert_eq!(a, b);
        assert!(heap.as_objstring(a).unwrap().is_empty());
        assert_eq!(heap.as_objstring(a).unwrap().hash(), 2166136261);
    }

    #[test]
    fn many_strings_stay_unique() {
        let mut heap = HeapManager::new();
        let first: Vec<_> = (0..500)
            .map(|i| heap.create_string_copied(&format!("s{i}")))
            .collect();
        let second: Vec<_> = (0..500)
            .map(|i| heap.take_string(format!("s{i}")))
            .collect();
        assert_eq!(first, second);
        assert_eq!(heap.object_count(), 500);
    }

    #[test]
    fn interned_strings_are_not_counted_twice() {
        let mut heap = HeapManager::new();
        assert_eq!(heap.bytes_allocated(), 0);
        let a = heap.create_string_copied("abc");
        let after_first = heap.bytes_allocated();
        assert!(after_first >= 3);
        heap.create_string_copied("abc");
        heap.take_string(String::from("abc"));
        assert_eq!(heap.bytes_allocated(), after_first);
        heap.create_string_concat(a, a).unwrap();
        assert!(heap.bytes_allocated() >= after_first * 2);
    }

    #[test]
    fn string_keys_carry_the_hash() {
        let mut heap = HeapManager::new();
        let a = heap.create_string_copied("abc");
        let key = heap.string_key(a).unwrap();
        assert_eq!(key.obj(), a);
        assert_eq!(key.table_hash(), heap.as_objstring(a).unwrap().hash());
        assert!(heap.string_key(ObjRef(99)).is_none());
    }
}
