//! Per-instance interpreter state
//!
//! An [`Interp`] encapsulates everything one runtime instance owns: the
//! object heap, the string intern table, the operand stack, the global
//! object, and the prototype registry. Instances share nothing — values
//! must never be carried from one instance to another — and each is
//! confined to a single thread at a time (the callable type is `Rc`-based,
//! so the compiler enforces this).

use mink_core::{ErrorKind, JsString, RtResult, RuntimeError, StringTable, Value};
use mink_gc::{GcConfig, GcStats, Handle, Heap};
use tracing::{debug, info};

use crate::object::{Class, Object, PropAttr};
use crate::runner::Loader;

/// Registry of the prototype objects every instance starts with.
///
/// These are the roots of the default prototype chain: wrappers and arrays
/// hang off their class prototype, which hangs off the base object
/// prototype. The standard library (out of scope here) would populate them
/// with methods; the registry exists so class instances always have a
/// well-defined chain.
pub(crate) struct Prototypes {
    pub object: Handle,
    pub array: Handle,
    pub function: Handle,
    pub boolean: Handle,
    pub number: Handle,
    pub string: Handle,
    pub error: [Handle; 7],
}

impl Prototypes {
    pub(crate) fn roots(&self) -> impl Iterator<Item = Handle> + '_ {
        [
            self.object,
            self.array,
            self.function,
            self.boolean,
            self.number,
            self.string,
        ]
        .into_iter()
        .chain(self.error.iter().copied())
    }
}

/// An isolated interpreter instance.
pub struct Interp {
    pub(crate) heap: Heap<Object>,
    pub(crate) strings: StringTable,
    pub(crate) stack: Vec<Value>,
    /// Base of the current stack frame: positive indices resolve from here.
    pub(crate) bot: usize,
    pub(crate) global: Handle,
    pub(crate) protos: Prototypes,
    pub(crate) loader: Option<Box<dyn Loader>>,
    pub(crate) native_depth: usize,
    /// The in-flight thrown value, kept as a GC root while an error
    /// propagates outside the stack. Replaced by the next throw.
    pending: Option<Value>,
}

impl Interp {
    /// Create an instance with default heap configuration.
    pub fn new() -> Self {
        Self::with_config(GcConfig::default())
    }

    /// Create an instance with a custom collector configuration.
    pub fn with_config(config: GcConfig) -> Self {
        let mut heap = Heap::with_config(config);
        let mut strings = StringTable::new();

        // Bootstrap the prototype registry. Allocation order matters only in
        // that the base object prototype anchors every other chain.
        let object = heap.alloc(Object::new(Class::Plain, None));
        let array = heap.alloc(Object::new(Class::Plain, Some(object)));
        let function = heap.alloc(Object::new(Class::Plain, Some(object)));
        let boolean = heap.alloc(Object::new(Class::Plain, Some(object)));
        let number = heap.alloc(Object::new(Class::Plain, Some(object)));
        let string = heap.alloc(Object::new(Class::Plain, Some(object)));

        let name_key = strings.intern("name");
        let message_key = strings.intern("message");
        let base_error = heap.alloc(Object::new(Class::Error(ErrorKind::Error), Some(object)));
        let mut error = [base_error; 7];
        for kind in ErrorKind::ALL {
            let proto = if kind == ErrorKind::Error {
                base_error
            } else {
                heap.alloc(Object::new(Class::Error(kind), Some(base_error)))
            };
            let obj = heap.get_mut(proto);
            obj.insert_property(
                name_key.clone(),
                Value::String(strings.intern(kind.name())),
                PropAttr::NONE,
            );
            obj.insert_property(
                message_key.clone(),
                Value::String(strings.intern("")),
                PropAttr::NONE,
            );
            error[kind.index()] = proto;
        }

        let global = heap.alloc(Object::new(Class::Plain, Some(object)));

        Self {
            heap,
            strings,
            stack: Vec::with_capacity(64),
            bot: 0,
            global,
            protos: Prototypes {
                object,
                array,
                function,
                boolean,
                number,
                string,
                error,
            },
            loader: None,
            native_depth: 0,
            pending: None,
        }
    }

    pub(crate) fn intern(&mut self, s: &str) -> JsString {
        self.strings.intern(s)
    }

    /// Allocate an object, collecting first if the watermark was crossed.
    ///
    /// Collection runs *before* the allocation, so the returned handle is
    /// never sweepable by the cycle that made room for it. Callers must root
    /// the handle (stack, property, prototype) before the next allocation.
    pub(crate) fn alloc(&mut self, object: Object) -> Handle {
        if self.heap.should_collect() {
            self.gc(false);
        }
        self.heap.alloc(object)
    }

    #[inline]
    pub(crate) fn object(&self, handle: Handle) -> &Object {
        self.heap.get(handle)
    }

    #[inline]
    pub(crate) fn object_mut(&mut self, handle: Handle) -> &mut Object {
        self.heap.get_mut(handle)
    }

    /// Run a collection cycle and return its statistics.
    ///
    /// Roots are the operand stack, the global object, and the prototype
    /// registry; everything else must be reachable from those through
    /// property values, prototype edges, or iterator targets. With
    /// `report`, a human-readable summary goes to the log.
    pub fn gc(&mut self, report: bool) -> GcStats {
        let mut roots: Vec<Handle> = self
            .stack
            .iter()
            .filter_map(|v| v.as_object())
            .collect();
        roots.push(self.global);
        roots.extend(self.protos.roots());
        if let Some(h) = self.pending.as_ref().and_then(|v| v.as_object()) {
            roots.push(h);
        }

        let swept = self.heap.collect(roots);
        let stats = self.heap.stats().clone();
        if report {
            info!(
                collections = stats.collections,
                marked = stats.last_marked,
                swept,
                live = stats.live,
                "garbage collection report"
            );
        }
        stats
    }

    // ----------------------------------------------------------------------
    // Global object
    // ----------------------------------------------------------------------

    /// Push the global object.
    pub fn push_global(&mut self) {
        let global = self.global;
        self.push(Value::Object(global));
    }

    /// Push the value of a global property (undefined when absent).
    pub fn get_global(&mut self, name: &str) {
        let global = self.global;
        let value = self.get_property_value(global, name);
        self.push(value);
    }

    /// Pop the stack top and store it as a global property.
    ///
    /// Assignment to an undeclared name creates it — the original's
    /// non-strict behavior.
    pub fn set_global(&mut self, name: &str) -> RtResult<()> {
        let value = self.pop_value();
        let global = self.global;
        self.set_value(global, name, value)
    }

    /// Pop the stack top and define it as a global property with attributes.
    pub fn def_global(&mut self, name: &str, attr: PropAttr) -> RtResult<()> {
        let value = self.pop_value();
        let global = self.global;
        self.def_value(global, name, value, attr)
    }

    // ----------------------------------------------------------------------
    // Error materialization
    // ----------------------------------------------------------------------

    /// Create an error object of the given class and push it.
    ///
    /// The object carries `message` as an own property; `name` is inherited
    /// from the per-class error prototype.
    pub fn new_error(&mut self, kind: ErrorKind, message: &str) {
        let handle = self.error_object(kind, message);
        self.push(Value::Object(handle));
    }

    pub(crate) fn error_object(&mut self, kind: ErrorKind, message: &str) -> Handle {
        let proto = self.protos.error[kind.index()];
        let handle = self.alloc(Object::new(Class::Error(kind), Some(proto)));
        let key = self.intern("message");
        let value = Value::String(self.intern(message));
        self.object_mut(handle)
            .insert_property(key, value, PropAttr::NONE);
        handle
    }

    /// Materialize a runtime error as a value on the stack.
    ///
    /// A thrown script value is pushed back as-is; classified errors become
    /// fresh error objects.
    pub fn push_error(&mut self, err: &RuntimeError) {
        match err {
            RuntimeError::Thrown(value) => {
                let value = value.clone();
                if self.pending.as_ref() == Some(&value) {
                    self.pending = None; // rooted by the stack again
                }
                self.push(value);
            }
            other => self.new_error(other.kind(), other.message()),
        }
    }

    /// Pop the stack top and turn it into a propagating error.
    ///
    /// The conventional use is `return Err(interp.throw())` from a native
    /// body after pushing (or constructing) the value to throw. The value
    /// also becomes the instance's pending exception — a GC root until it is
    /// materialized again or replaced by the next throw.
    pub fn throw(&mut self) -> RuntimeError {
        let value = self.pop_value();
        debug!(value = ?value, "script throw");
        self.pending = Some(value.clone());
        RuntimeError::Thrown(value)
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}
