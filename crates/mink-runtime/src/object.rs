//! Heap objects
//!
//! An [`Object`] is a class tag, an insertion-ordered property map, and an
//! optional prototype reference. The prototype edge is shared, never owning:
//! many objects point at one prototype, which survives as long as any of
//! them (or any other root) can reach it.
//!
//! The class tag is a closed variant set. Capabilities hang off the tag —
//! callable objects carry their [`Callee`], arrays their length, iterators
//! their enumeration snapshot — instead of being rediscovered by tag checks
//! scattered across call sites.

use indexmap::IndexMap;
use mink_core::{ErrorKind, JsString, RtResult, Value};
use mink_gc::{Handle, Trace};
use std::rc::Rc;

use crate::state::Interp;

/// Body of a callable object: a host-registered native or a loader-produced
/// script body.
///
/// A body reads its arguments through the operand-stack window (index 0 is
/// `this`, `1..=argc` the arguments), returns its result value, and signals
/// failure only through the returned result — never via panics or
/// out-of-band codes.
///
/// Bodies must not capture `Handle`s in their closure state: the collector
/// cannot see into closures, so a captured handle can go stale. Objects a
/// body needs across calls belong in globals or properties.
pub type NativeBody = Rc<dyn Fn(&mut Interp, usize) -> RtResult<Value>>;

/// Callable payload of a function object.
#[derive(Clone)]
pub struct Callee {
    /// Function name, surfaced as the `name` property.
    pub name: JsString,
    /// Declared arity, surfaced as the `length` property.
    pub length: u8,
    /// Body run by a plain call.
    pub call: NativeBody,
    /// Distinct body for `new`-invocation; construct calls fall back to
    /// `call` when absent.
    pub construct: Option<NativeBody>,
}

impl Callee {
    /// A callee with a call body only.
    pub fn new(name: impl Into<JsString>, length: u8, call: NativeBody) -> Self {
        Self {
            name: name.into(),
            length,
            call,
            construct: None,
        }
    }
}

impl std::fmt::Debug for Callee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callee")
            .field("name", &self.name)
            .field("length", &self.length)
            .field("construct", &self.construct.is_some())
            .finish()
    }
}

/// Internal class of a heap object.
#[derive(Debug)]
pub enum Class {
    /// Plain object
    Plain,
    /// Array: numeric-indexed, with a maintained `length`
    Array {
        /// Current length; one past the highest set index.
        length: u32,
    },
    /// Callable object
    Function(Callee),
    /// Error object of the given class
    Error(ErrorKind),
    /// Boxed boolean primitive
    Boolean(bool),
    /// Boxed number primitive
    Number(f64),
    /// Boxed string primitive
    String(JsString),
    /// Property-enumeration iterator (internal; created by
    /// [`Interp::push_iterator`])
    Iterator {
        /// Object whose own keys are being walked.
        target: Handle,
        /// Snapshot of own enumerable keys at creation time.
        keys: Vec<JsString>,
        /// Next snapshot position to try.
        cursor: usize,
    },
}

impl Class {
    /// The class tag name, as diagnostics print it.
    pub fn tag(&self) -> &'static str {
        match self {
            Class::Plain => "Object",
            Class::Array { .. } => "Array",
            Class::Function(_) => "Function",
            Class::Error(kind) => kind.name(),
            Class::Boolean(_) => "Boolean",
            Class::Number(_) => "Number",
            Class::String(_) => "String",
            Class::Iterator { .. } => "Iterator",
        }
    }
}

/// Property attribute flags.
///
/// All flags default to off; properties are freely writable, enumerable and
/// deletable unless configured otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropAttr {
    /// Writes are silently ignored.
    pub read_only: bool,
    /// Excluded from enumeration.
    pub dont_enum: bool,
    /// Delete attempts fail.
    pub dont_delete: bool,
}

impl PropAttr {
    /// No restrictions (the default for plain assignment).
    pub const NONE: PropAttr = PropAttr {
        read_only: false,
        dont_enum: false,
        dont_delete: false,
    };

    /// All restrictions, used for engine-installed fields such as a
    /// function's `length`.
    pub const LOCKED: PropAttr = PropAttr {
        read_only: true,
        dont_enum: true,
        dont_delete: true,
    };
}

/// A property slot: a value plus its attribute set.
#[derive(Debug)]
pub struct Property {
    /// The stored value.
    pub value: Value,
    /// Attribute flags.
    pub attr: PropAttr,
}

/// A heap object.
pub struct Object {
    pub(crate) class: Class,
    props: IndexMap<JsString, Property>,
    proto: Option<Handle>,
}

impl Object {
    /// Create an object of the given class and prototype.
    pub(crate) fn new(class: Class, proto: Option<Handle>) -> Self {
        Self {
            class,
            props: IndexMap::new(),
            proto,
        }
    }

    /// The object's class tag.
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// The prototype reference, if any.
    pub fn proto(&self) -> Option<Handle> {
        self.proto
    }

    pub(crate) fn set_proto(&mut self, proto: Option<Handle>) {
        self.proto = proto;
    }

    /// Whether this object can be invoked.
    pub fn is_callable(&self) -> bool {
        matches!(self.class, Class::Function(_))
    }

    /// The callable payload, for function-class objects.
    pub fn callee(&self) -> Option<&Callee> {
        match &self.class {
            Class::Function(callee) => Some(callee),
            _ => None,
        }
    }

    pub(crate) fn own_property(&self, key: &JsString) -> Option<&Property> {
        self.props.get(key)
    }

    pub(crate) fn own_property_mut(&mut self, key: &JsString) -> Option<&mut Property> {
        self.props.get_mut(key)
    }

    pub(crate) fn has_own(&self, key: &JsString) -> bool {
        self.props.contains_key(key)
    }

    pub(crate) fn insert_property(&mut self, key: JsString, value: Value, attr: PropAttr) {
        self.props.insert(key, Property { value, attr });
    }

    /// Remove an own property, preserving the insertion order of the rest.
    pub(crate) fn remove_property(&mut self, key: &JsString) -> Option<Property> {
        self.props.shift_remove(key)
    }

    /// Own enumerable keys, in insertion order.
    pub(crate) fn enumerable_own_keys(&self) -> Vec<JsString> {
        self.props
            .iter()
            .filter(|(_, p)| !p.attr.dont_enum)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// All own keys, in insertion order.
    pub(crate) fn own_keys(&self) -> impl Iterator<Item = &JsString> {
        self.props.keys()
    }
}

impl Trace for Object {
    fn trace(&self, mark: &mut dyn FnMut(Handle)) {
        for property in self.props.values() {
            if let Value::Object(h) = property.value {
                mark(h);
            }
        }
        if let Some(proto) = self.proto {
            mark(proto);
        }
        if let Class::Iterator { target, .. } = self.class {
            mark(target);
        }
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class.tag())
            .field("props", &self.props.len())
            .field("proto", &self.proto)
            .finish()
    }
}

/// Parse a property key as a canonical array index: decimal digits without
/// a leading zero (except `"0"` itself), below 2^32 - 1.
pub(crate) fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || key.len() > 10 {
        return None;
    }
    if key != "0" && key.starts_with('0') {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u64 = key.parse().ok()?;
    if n < u32::MAX as u64 { Some(n as u32) } else { None }
}
