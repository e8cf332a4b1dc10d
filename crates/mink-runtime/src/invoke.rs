//! Invocation protocol
//!
//! A plain call expects `… func this arg1..argn` on the stack; a construct
//! call expects `… func arg1..argn` and manufactures the receiver itself.
//! Both replace the callee, receiver and arguments with exactly one result
//! value on success.
//!
//! Outcome contract:
//! - a non-callable callee raises `TypeError` with the stack untouched
//!   (nothing was consumed, so the host can inspect or recover);
//! - a body failure consumes the frame and pushes nothing;
//! - success consumes the frame and pushes the single result.

use mink_core::{RtResult, RuntimeError, Value};
use mink_gc::Handle;

use crate::object::{Callee, Class, NativeBody, Object, PropAttr};
use crate::state::Interp;

/// Cap on nested native frames; recursion past this raises `RangeError`.
const MAX_NATIVE_DEPTH: usize = 256;

impl Interp {
    /// Call the function at `… func this arg1..argn` with `n` arguments,
    /// replacing all of them with the result.
    ///
    /// An undefined or null receiver is rebound to the global object.
    pub fn call(&mut self, n: usize) -> RtResult<()> {
        if self.stack.len() < self.bot + n + 2 {
            panic!("stack underflow: call({n}) needs a function, a receiver and {n} arguments");
        }
        let fpos = self.stack.len() - n - 2;
        let callee = self.callee_at(fpos)?;
        if self.native_depth >= MAX_NATIVE_DEPTH {
            return Err(RuntimeError::range_error("maximum call depth exceeded"));
        }

        let this_pos = fpos + 1;
        if self.stack[this_pos].is_nullish() {
            self.stack[this_pos] = Value::Object(self.global);
        }
        let body = callee.call.clone();
        self.run_frame(fpos, n, body, None)
    }

    /// Construct with the function at `… func arg1..argn`.
    ///
    /// A fresh object is created whose prototype is the callee's
    /// `prototype` property at call time (falling back to the base object
    /// prototype when that is not an object) and bound as the receiver. If
    /// the body returns a primitive, it is discarded and the fresh object
    /// is the result: construct calls always yield an object.
    pub fn construct(&mut self, n: usize) -> RtResult<()> {
        if self.stack.len() < self.bot + n + 1 {
            panic!("stack underflow: construct({n}) needs a function and {n} arguments");
        }
        let fpos = self.stack.len() - n - 1;
        let callee = self.callee_at(fpos)?;
        if self.native_depth >= MAX_NATIVE_DEPTH {
            return Err(RuntimeError::range_error("maximum call depth exceeded"));
        }

        let fh = self.stack[fpos].as_object().expect("callee is an object");
        let proto = self
            .get_property_value(fh, "prototype")
            .as_object()
            .unwrap_or(self.protos.object);
        let fresh = self.alloc(Object::new(Class::Plain, Some(proto)));
        self.stack.insert(fpos + 1, Value::Object(fresh));

        let body = callee.construct.clone().unwrap_or_else(|| callee.call.clone());
        self.run_frame(fpos, n, body, Some(fresh))
    }

    fn callee_at(&self, fpos: usize) -> RtResult<Callee> {
        let callee = match &self.stack[fpos] {
            Value::Object(h) => self.object(*h).callee().cloned(),
            _ => None,
        };
        callee.ok_or_else(|| RuntimeError::type_error("not a function"))
    }

    /// Run a body over the frame starting at `fpos` (the callee slot).
    /// The receiver sits at `fpos + 1` and becomes stack index 0 inside the
    /// body's window.
    fn run_frame(
        &mut self,
        fpos: usize,
        argc: usize,
        body: NativeBody,
        construct_fresh: Option<Handle>,
    ) -> RtResult<()> {
        let save_bot = std::mem::replace(&mut self.bot, fpos + 1);
        self.native_depth += 1;
        let result = body(self, argc);
        self.native_depth -= 1;
        self.bot = save_bot;
        self.stack.truncate(fpos);

        let value = result?;
        match construct_fresh {
            Some(fresh) if !value.is_object() => self.push(Value::Object(fresh)),
            _ => self.push(value),
        }
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Object constructors
    // ----------------------------------------------------------------------

    /// Push a new plain object.
    pub fn new_object(&mut self) {
        let proto = self.protos.object;
        let h = self.alloc(Object::new(Class::Plain, Some(proto)));
        self.push(Value::Object(h));
    }

    /// Push a new empty array.
    pub fn new_array(&mut self) {
        let proto = self.protos.array;
        let h = self.alloc(Object::new(Class::Array { length: 0 }, Some(proto)));
        self.push(Value::Object(h));
    }

    /// Push a new boolean wrapper object.
    pub fn new_boolean(&mut self, v: bool) {
        let proto = self.protos.boolean;
        let h = self.alloc(Object::new(Class::Boolean(v), Some(proto)));
        self.push(Value::Object(h));
    }

    /// Push a new number wrapper object.
    pub fn new_number(&mut self, v: f64) {
        let proto = self.protos.number;
        let h = self.alloc(Object::new(Class::Number(v), Some(proto)));
        self.push(Value::Object(h));
    }

    /// Push a new string wrapper object.
    pub fn new_string(&mut self, v: &str) {
        let s = self.intern(v);
        let proto = self.protos.string;
        let h = self.alloc(Object::new(Class::String(s), Some(proto)));
        self.push(Value::Object(h));
    }

    /// Wrap a native body as a callable object and push it.
    ///
    /// `length` is the declared arity, surfaced (with `name`) as a locked
    /// data property.
    pub fn new_native(&mut self, name: &str, length: u8, body: NativeBody) {
        let callee = Callee {
            name: self.intern(name),
            length,
            call: body,
            construct: None,
        };
        self.push_function(callee);
    }

    /// Wrap a call body and a distinct construct body as a constructor
    /// function and push it.
    ///
    /// The function gets a fresh `prototype` object whose `constructor`
    /// links back, so constructed instances inherit from it.
    pub fn new_constructor(
        &mut self,
        name: &str,
        length: u8,
        call: NativeBody,
        construct: NativeBody,
    ) {
        let callee = Callee {
            name: self.intern(name),
            length,
            call,
            construct: Some(construct),
        };
        self.push_function(callee);
        let fh = self.slot(-1).as_object().expect("function object");

        let object_proto = self.protos.object;
        let proto = self.alloc(Object::new(Class::Plain, Some(object_proto)));
        let key = self.intern("prototype");
        self.object_mut(fh)
            .insert_property(key, Value::Object(proto), PropAttr::LOCKED);
        let key = self.intern("constructor");
        self.object_mut(proto).insert_property(
            key,
            Value::Object(fh),
            PropAttr {
                dont_enum: true,
                ..PropAttr::NONE
            },
        );
    }

    pub(crate) fn push_function(&mut self, callee: Callee) {
        let name = callee.name.clone();
        let length = callee.length;
        let proto = self.protos.function;
        let h = self.alloc(Object::new(Class::Function(callee), Some(proto)));
        self.push(Value::Object(h));
        let key = self.intern("length");
        self.object_mut(h)
            .insert_property(key, Value::Number(length as f64), PropAttr::LOCKED);
        let key = self.intern("name");
        self.object_mut(h)
            .insert_property(key, Value::String(name), PropAttr::LOCKED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn native_call_leaves_one_result() {
        let mut interp = Interp::new();
        interp.new_native("add", 2, Rc::new(|interp, _argc| {
            let a = interp.to_number(1)?;
            let b = interp.to_number(2)?;
            Ok(Value::Number(a + b))
        }));
        interp.push_undefined();
        interp.push_number(2.0);
        interp.push_number(3.0);
        interp.call(2).unwrap();

        assert_eq!(interp.top(), 1);
        assert_eq!(interp.to_number(-1).unwrap(), 5.0);
    }

    #[test]
    fn body_sees_argc_and_window() {
        let mut interp = Interp::new();
        interp.new_native("probe", 0, Rc::new(|interp, argc| {
            assert_eq!(argc, 3);
            assert_eq!(interp.top(), 4); // this + 3 arguments
            assert!(interp.is_object(0)); // rebound receiver
            Ok(interp.value(2))
        }));
        interp.push_null(); // receiver rebinds to the global object
        interp.push_number(1.0);
        interp.push_number(2.0);
        interp.push_number(3.0);
        interp.call(3).unwrap();
        assert_eq!(interp.to_number(-1).unwrap(), 2.0);
    }

    #[test]
    fn explicit_receiver_is_kept() {
        let mut interp = Interp::new();
        interp.new_native("self", 0, Rc::new(|interp, _| Ok(interp.value(0))));
        interp.new_object();
        interp.push_number(1.0);
        interp.set_property(-2, "tag").unwrap();
        // stack: func, receiver
        interp.call(0).unwrap();
        interp.get_property(-1, "tag").unwrap();
        assert_eq!(interp.to_number(-1).unwrap(), 1.0);
    }

    #[test]
    fn non_callable_raises_and_leaves_stack() {
        let mut interp = Interp::new();
        interp.push_number(1.0); // not callable
        interp.push_undefined();
        let depth = interp.top();
        let err = interp.call(0).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError(_)));
        assert_eq!(interp.top(), depth);
    }

    #[test]
    fn failing_body_consumes_the_frame() {
        let mut interp = Interp::new();
        interp.new_native("boom", 0, Rc::new(|_, _| {
            Err(RuntimeError::type_error("boom"))
        }));
        interp.push_undefined();
        let err = interp.call(0).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError(_)));
        assert_eq!(interp.top(), 0);
    }

    #[test]
    fn construct_yields_object_for_primitive_return() {
        let mut interp = Interp::new();
        interp.new_constructor(
            "Point",
            0,
            Rc::new(|_, _| Ok(Value::Number(1.0))),
            Rc::new(|interp, _| {
                interp.push_number(9.0);
                interp.set_property(0, "x")?;
                Ok(Value::Number(42.0)) // discarded: construct yields the fresh object
            }),
        );
        interp.construct(0).unwrap();

        assert!(interp.is_object(-1));
        interp.get_property(-1, "x").unwrap();
        assert_eq!(interp.to_number(-1).unwrap(), 9.0);
        interp.pop(1);

        // The instance inherits from the constructor's prototype object.
        interp.get_property(-1, "constructor").unwrap();
        assert!(interp.is_callable(-1));
    }

    #[test]
    fn construct_falls_back_to_call_body() {
        let mut interp = Interp::new();
        interp.new_native("Maker", 0, Rc::new(|interp, _| {
            interp.push_boolean(true);
            interp.set_property(0, "made")?;
            Ok(Value::Undefined)
        }));
        interp.construct(0).unwrap();
        interp.get_property(-1, "made").unwrap();
        assert!(interp.to_boolean(-1));
    }

    #[test]
    fn runaway_recursion_is_a_range_error() {
        let mut interp = Interp::new();
        interp.new_native("recurse", 0, Rc::new(|interp, _| {
            interp.get_global("recurse");
            interp.push_undefined();
            interp.call(0)?;
            Ok(interp.value(-1))
        }));
        interp.set_global("recurse").unwrap();

        interp.get_global("recurse");
        interp.push_undefined();
        let err = interp.call(0).unwrap_err();
        assert!(matches!(err, RuntimeError::RangeError(_)));
    }
}
