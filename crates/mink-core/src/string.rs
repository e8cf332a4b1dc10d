//! Interned runtime strings
//!
//! Strings are immutable and compared by content. Each interpreter instance
//! interns through its own [`StringTable`], so equal property names share one
//! allocation and repeat comparisons hit the pointer fast path. Instances are
//! isolated, so the table needs no synchronization.

use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An immutable runtime string with a precomputed content hash.
#[derive(Clone)]
pub struct JsString {
    data: Arc<str>,
    hash: u64,
}

impl JsString {
    /// Create a string without interning (for one-off values).
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        let data: Arc<str> = s.into();
        let hash = Self::compute_hash(&data);
        Self { data, hash }
    }

    fn compute_hash(s: &str) -> u64 {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Get the string as a str slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Length in UTF-16 code units, the unit script code observes.
    pub fn len_utf16(&self) -> usize {
        self.data.encode_utf16().count()
    }

    /// Whether the string is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && (Arc::ptr_eq(&self.data, &other.data) || self.data == other.data)
    }
}

impl Eq for JsString {}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialOrd for JsString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JsString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.data.as_ref().cmp(other.data.as_ref())
    }
}

impl std::fmt::Debug for JsString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.data.as_ref())
    }
}

impl std::fmt::Display for JsString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.data)
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Per-instance string intern table.
pub struct StringTable {
    // Buckets by content hash; collisions fall back to a short scan.
    strings: FxHashMap<u64, Vec<JsString>>,
    count: usize,
}

impl StringTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            strings: FxHashMap::default(),
            count: 0,
        }
    }

    /// Intern `s`, returning the shared instance.
    pub fn intern(&mut self, s: &str) -> JsString {
        let hash = JsString::compute_hash(s);
        let bucket = self.strings.entry(hash).or_default();
        if let Some(existing) = bucket.iter().find(|js| js.as_str() == s) {
            return existing.clone();
        }
        let js = JsString {
            data: Arc::from(s),
            hash,
        };
        bucket.push(js.clone());
        self.count += 1;
        js
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
