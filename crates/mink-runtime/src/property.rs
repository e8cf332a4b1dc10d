//! Property operations
//!
//! Lookup walks the own map first, then the prototype chain; writes only
//! ever touch the own map. Attribute enforcement is uniformly silent (the
//! original's non-strict mode): writes to `ReadOnly` properties — own or
//! inherited — are no-ops, and deletes of `DontDelete` properties report
//! failure without changing anything.
//!
//! Arrays maintain `length` as a virtual property of the class tag: reading
//! it reports one past the highest set index, writing it validates against
//! the uint32 rule (`RangeError` otherwise) and truncates. String wrappers
//! expose virtual `length` and per-index characters, both read-only.

use mink_core::{JsString, RtResult, RuntimeError, Value};
use mink_gc::Handle;

use crate::object::{Class, Object, PropAttr, array_index};
use crate::state::Interp;

/// Hard cap on prototype-chain walks. Cycles are rejected when a prototype
/// is assigned, so hitting this means an internal invariant broke.
const MAX_PROTO_CHAIN: usize = 10_000;

impl Interp {
    /// Convert the value to an object handle, boxing primitives into their
    /// wrapper class. Undefined and null cannot be converted.
    pub(crate) fn to_object_value(&mut self, v: &Value) -> RtResult<Handle> {
        match v {
            Value::Object(h) => Ok(*h),
            Value::Boolean(b) => {
                let proto = self.protos.boolean;
                Ok(self.alloc(Object::new(Class::Boolean(*b), Some(proto))))
            }
            Value::Number(n) => {
                let proto = self.protos.number;
                Ok(self.alloc(Object::new(Class::Number(*n), Some(proto))))
            }
            Value::String(s) => {
                let proto = self.protos.string;
                let s = s.clone();
                Ok(self.alloc(Object::new(Class::String(s), Some(proto))))
            }
            Value::Undefined | Value::Null => Err(RuntimeError::type_error(format!(
                "cannot convert {} to object",
                v.type_name()
            ))),
        }
    }

    /// Class-level virtual properties: array `length`, string wrapper
    /// `length` and indexed characters. All of them are read-only.
    fn virtual_property(&self, h: Handle, key: &JsString) -> Option<Value> {
        match self.object(h).class() {
            Class::Array { length } if key.as_str() == "length" => {
                Some(Value::Number(*length as f64))
            }
            Class::String(s) => {
                if key.as_str() == "length" {
                    Some(Value::Number(s.len_utf16() as f64))
                } else if let Some(i) = array_index(key.as_str()) {
                    s.as_str()
                        .chars()
                        .nth(i as usize)
                        .map(|c| Value::String(JsString::new(c.to_string())))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Full lookup: own (including virtual) properties, then the prototype
    /// chain. A total miss is undefined, not an error.
    pub(crate) fn get_property_value(&mut self, obj: Handle, name: &str) -> Value {
        let key = self.intern(name);
        let mut current = Some(obj);
        let mut depth = 0;
        while let Some(h) = current {
            if let Some(v) = self.virtual_property(h, &key) {
                return v;
            }
            if let Some(p) = self.object(h).own_property(&key) {
                return p.value.clone();
            }
            current = self.object(h).proto();
            depth += 1;
            if depth > MAX_PROTO_CHAIN {
                panic!("prototype chain exceeds {MAX_PROTO_CHAIN} links");
            }
        }
        Value::Undefined
    }

    /// Write `name = value` on the object, honoring attribute enforcement.
    pub(crate) fn set_value(&mut self, obj: Handle, name: &str, value: Value) -> RtResult<()> {
        let key = self.intern(name);

        // Virtual slots: array length is the one writable virtual; string
        // wrapper length/indices silently refuse.
        if matches!(self.object(obj).class(), Class::Array { .. }) && key.as_str() == "length" {
            return self.set_array_length(obj, value);
        }
        if matches!(self.object(obj).class(), Class::String(_))
            && (key.as_str() == "length" || array_index(key.as_str()).is_some())
        {
            return Ok(());
        }

        // Own property: update in place unless read-only.
        if let Some(p) = self.object_mut(obj).own_property_mut(&key) {
            if !p.attr.read_only {
                p.value = value;
            }
            return Ok(());
        }

        // An inherited read-only property blocks creation of an own one.
        let mut current = self.object(obj).proto();
        let mut depth = 0;
        while let Some(h) = current {
            if let Some(p) = self.object(h).own_property(&key) {
                if p.attr.read_only {
                    return Ok(());
                }
                break;
            }
            current = self.object(h).proto();
            depth += 1;
            if depth > MAX_PROTO_CHAIN {
                panic!("prototype chain exceeds {MAX_PROTO_CHAIN} links");
            }
        }

        // Creating a new index on an array bumps its length.
        self.bump_array_length(obj, &key);

        self.object_mut(obj).insert_property(key, value, PropAttr::NONE);
        Ok(())
    }

    /// Raise an array's length to cover `key` when it is a fresh index at
    /// or past the current end.
    fn bump_array_length(&mut self, obj: Handle, key: &JsString) {
        let grown = match self.object(obj).class() {
            Class::Array { length } => {
                array_index(key.as_str()).filter(|i| *i >= *length).map(|i| i + 1)
            }
            _ => None,
        };
        if let Some(new_length) = grown
            && let Class::Array { length } = &mut self.object_mut(obj).class
        {
            *length = new_length;
        }
    }

    /// Define (upsert) an own property with explicit attributes, bypassing
    /// read-only enforcement the way a define-property primitive does.
    pub(crate) fn def_value(
        &mut self,
        obj: Handle,
        name: &str,
        value: Value,
        attr: PropAttr,
    ) -> RtResult<()> {
        let key = self.intern(name);
        if matches!(self.object(obj).class(), Class::Array { .. }) && key.as_str() == "length" {
            return self.set_array_length(obj, value);
        }
        self.bump_array_length(obj, &key);
        self.object_mut(obj).insert_property(key, value, attr);
        Ok(())
    }

    /// Validate and apply an array length write: the value must survive the
    /// uint32 round trip exactly, and shrinking deletes trailing indices.
    fn set_array_length(&mut self, obj: Handle, value: Value) -> RtResult<()> {
        let n = self.to_number_value(value)?;
        let new_length = mink_core::number::to_uint32(n);
        if new_length as f64 != n {
            return Err(RuntimeError::range_error("invalid array length"));
        }
        let doomed: Vec<JsString> = self
            .object(obj)
            .own_keys()
            .filter(|k| array_index(k.as_str()).is_some_and(|i| i >= new_length))
            .cloned()
            .collect();
        for key in &doomed {
            self.object_mut(obj).remove_property(key);
        }
        if let Class::Array { length } = &mut self.object_mut(obj).class {
            *length = new_length;
        }
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Stack-indexed surface
    // ----------------------------------------------------------------------

    /// Push the value of `name` on the object at `idx`, following the
    /// prototype chain; undefined on a total miss.
    pub fn get_property(&mut self, idx: i32, name: &str) -> RtResult<()> {
        let target = self.slot(idx).clone();
        let obj = self.to_object_value(&target)?;
        let value = self.get_property_value(obj, name);
        self.push(value);
        Ok(())
    }

    /// Push the value of an *own* property of the object at `idx`
    /// (undefined when the object does not own `name`). The prototype chain
    /// is not consulted.
    pub fn get_own_property(&mut self, idx: i32, name: &str) -> RtResult<()> {
        let target = self.slot(idx).clone();
        let obj = self.to_object_value(&target)?;
        let key = self.intern(name);
        let value = self
            .virtual_property(obj, &key)
            .or_else(|| self.object(obj).own_property(&key).map(|p| p.value.clone()))
            .unwrap_or(Value::Undefined);
        self.push(value);
        Ok(())
    }

    /// Pop the top value and store it as `name` on the object at `idx`.
    pub fn set_property(&mut self, idx: i32, name: &str) -> RtResult<()> {
        let pos = self.index(idx); // resolve before the pop shifts the top
        let value = self.pop_value();
        if pos >= self.stack.len() {
            panic!("stack index out of range: {idx} names the popped value");
        }
        let target = self.stack[pos].clone();
        let obj = self.to_object_value(&target)?;
        self.set_value(obj, name, value)
    }

    /// Pop the top value and define it as `name` on the object at `idx`
    /// with the given attributes.
    pub fn def_property(&mut self, idx: i32, name: &str, attr: PropAttr) -> RtResult<()> {
        let pos = self.index(idx);
        let value = self.pop_value();
        if pos >= self.stack.len() {
            panic!("stack index out of range: {idx} names the popped value");
        }
        let target = self.stack[pos].clone();
        let obj = self.to_object_value(&target)?;
        self.def_value(obj, name, value, attr)
    }

    /// Delete `name` from the object at `idx`. Returns false when an own
    /// `DontDelete` property (or a virtual one) refused; deleting an absent
    /// property succeeds.
    pub fn del_property(&mut self, idx: i32, name: &str) -> RtResult<bool> {
        let target = self.slot(idx).clone();
        let obj = self.to_object_value(&target)?;
        let key = self.intern(name);
        if self.virtual_property(obj, &key).is_some() {
            return Ok(false);
        }
        match self.object(obj).own_property(&key) {
            Some(p) if p.attr.dont_delete => Ok(false),
            Some(_) => {
                self.object_mut(obj).remove_property(&key);
                Ok(true)
            }
            None => Ok(true),
        }
    }

    /// Whether the object at `idx` has `name`, own or inherited.
    pub fn has_property(&mut self, idx: i32, name: &str) -> RtResult<bool> {
        let target = self.slot(idx).clone();
        let obj = self.to_object_value(&target)?;
        let key = self.intern(name);
        let mut current = Some(obj);
        let mut depth = 0;
        while let Some(h) = current {
            if self.virtual_property(h, &key).is_some() || self.object(h).has_own(&key) {
                return Ok(true);
            }
            current = self.object(h).proto();
            depth += 1;
            if depth > MAX_PROTO_CHAIN {
                panic!("prototype chain exceeds {MAX_PROTO_CHAIN} links");
            }
        }
        Ok(false)
    }

    /// Whether the object at `idx` owns `name` directly.
    pub fn has_own_property(&mut self, idx: i32, name: &str) -> RtResult<bool> {
        let target = self.slot(idx).clone();
        let obj = self.to_object_value(&target)?;
        let key = self.intern(name);
        Ok(self.virtual_property(obj, &key).is_some() || self.object(obj).has_own(&key))
    }

    // ----------------------------------------------------------------------
    // Prototype edges
    // ----------------------------------------------------------------------

    /// Push the prototype of the object at `idx`, or null when it has none.
    pub fn get_prototype(&mut self, idx: i32) -> RtResult<()> {
        let target = self.slot(idx).clone();
        let obj = self.to_object_value(&target)?;
        let value = match self.object(obj).proto() {
            Some(p) => Value::Object(p),
            None => Value::Null,
        };
        self.push(value);
        Ok(())
    }

    /// Pop the top value (an object, or null to clear) and install it as the
    /// prototype of the object at `idx`.
    ///
    /// An assignment that would make the chain cyclic is rejected with a
    /// `TypeError` and leaves the object unchanged.
    pub fn set_prototype(&mut self, idx: i32) -> RtResult<()> {
        let pos = self.index(idx);
        let proto_value = self.pop_value();
        if pos >= self.stack.len() {
            panic!("stack index out of range: {idx} names the popped value");
        }
        let target = self.stack[pos].clone();
        let Some(obj) = target.as_object() else {
            return Err(RuntimeError::type_error(
                "prototype target is not an object",
            ));
        };
        let proto = match proto_value {
            Value::Null => None,
            Value::Object(h) => Some(h),
            other => {
                return Err(RuntimeError::type_error(format!(
                    "prototype must be an object or null, not {}",
                    other.type_name()
                )));
            }
        };

        let mut current = proto;
        let mut depth = 0;
        while let Some(h) = current {
            if h == obj {
                return Err(RuntimeError::type_error("cyclic prototype chain"));
            }
            current = self.object(h).proto();
            depth += 1;
            if depth > MAX_PROTO_CHAIN {
                panic!("prototype chain exceeds {MAX_PROTO_CHAIN} links");
            }
        }

        self.object_mut(obj).set_proto(proto);
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Enumeration
    // ----------------------------------------------------------------------

    /// Push an iterator over the own enumerable keys of the object at
    /// `idx`, snapshotted in insertion order. Inherited properties are not
    /// included; ancestors enumerate themselves.
    pub fn push_iterator(&mut self, idx: i32) -> RtResult<()> {
        let target = self.slot(idx).clone();
        let obj = self.to_object_value(&target)?;
        let keys = self.object(obj).enumerable_own_keys();
        let iterator = self.alloc(Object::new(
            Class::Iterator {
                target: obj,
                keys,
                cursor: 0,
            },
            None,
        ));
        self.push(Value::Object(iterator));
        Ok(())
    }

    /// Advance the iterator at `idx`: push the next key that still exists
    /// (and is still enumerable) and return true, or return false when the
    /// snapshot is exhausted — the sentinel. Keys deleted since the
    /// snapshot are skipped.
    pub fn next_property(&mut self, idx: i32) -> RtResult<bool> {
        let handle = self
            .slot(idx)
            .as_object()
            .ok_or_else(|| RuntimeError::type_error("not an iterator"))?;
        loop {
            let (target, key) = {
                let Class::Iterator {
                    target,
                    keys,
                    cursor,
                } = self.object(handle).class()
                else {
                    return Err(RuntimeError::type_error("not an iterator"));
                };
                if *cursor >= keys.len() {
                    return Ok(false);
                }
                (*target, keys[*cursor].clone())
            };
            if let Class::Iterator { cursor, .. } = &mut self.object_mut(handle).class {
                *cursor += 1;
            }
            let alive = self
                .object(target)
                .own_property(&key)
                .is_some_and(|p| !p.attr.dont_enum);
            if alive {
                self.push(Value::String(key));
                return Ok(true);
            }
        }
    }
}
