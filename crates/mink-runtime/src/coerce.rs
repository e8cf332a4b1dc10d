//! Type coercion
//!
//! The pure rules (boolean, numeric parsing/formatting, integer reductions)
//! live in `mink-core`; this module adds the object-aware half. Coercing an
//! object to a primitive invokes its user-visible conversion methods
//! (`valueOf` / `toString`, in hint order), which re-enters the invocation
//! protocol — so these operations are fallible and may run script code.
//!
//! Stack-indexed conversions write the coerced primitive back into the
//! slot, so repeated reads do not re-run conversion methods.

use mink_core::number;
use mink_core::{JsString, RtResult, RuntimeError, Value};

use crate::object::Class;
use crate::state::Interp;

/// Preferred result type for object-to-primitive coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// No preference; behaves as [`Hint::Number`].
    None,
    /// Try `valueOf` before `toString`.
    Number,
    /// Try `toString` before `valueOf`.
    String,
}

impl Interp {
    /// Coerce a value to a primitive.
    ///
    /// Objects try their conversion-method pair in hint order and keep the
    /// first primitive result. Wrapper-class objects whose methods are
    /// missing or unusable fall back to their boxed primitive (the standard
    /// library that would normally supply those methods is out of scope);
    /// anything else raises a `TypeError`. Errors thrown by a conversion
    /// method propagate unchanged.
    pub(crate) fn to_primitive_value(&mut self, v: Value, hint: Hint) -> RtResult<Value> {
        let Some(h) = v.as_object() else {
            return Ok(v);
        };
        let order = match hint {
            Hint::String => ["toString", "valueOf"],
            Hint::None | Hint::Number => ["valueOf", "toString"],
        };
        for name in order {
            let method = self.get_property_value(h, name);
            let callable = method
                .as_object()
                .is_some_and(|mh| self.object(mh).is_callable());
            if callable {
                self.push(method);
                self.push(v.clone());
                self.call(0)?;
                let result = self.pop_value();
                if result.is_primitive() {
                    return Ok(result);
                }
            }
        }
        match self.object(h).class() {
            Class::Boolean(b) => Ok(Value::Boolean(*b)),
            Class::Number(n) => Ok(Value::Number(*n)),
            Class::String(s) => Ok(Value::String(s.clone())),
            _ => Err(RuntimeError::type_error(
                "cannot convert object to primitive",
            )),
        }
    }

    pub(crate) fn to_number_value(&mut self, v: Value) -> RtResult<f64> {
        match v {
            Value::Undefined => Ok(f64::NAN),
            Value::Null => Ok(0.0),
            Value::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
            Value::Number(n) => Ok(n),
            Value::String(s) => Ok(number::parse_number(s.as_str())),
            Value::Object(_) => {
                let p = self.to_primitive_value(v, Hint::Number)?;
                self.to_number_value(p)
            }
        }
    }

    pub(crate) fn to_string_value(&mut self, v: Value) -> RtResult<JsString> {
        match v {
            Value::Undefined => Ok(self.intern("undefined")),
            Value::Null => Ok(self.intern("null")),
            Value::Boolean(b) => Ok(self.intern(if b { "true" } else { "false" })),
            Value::Number(n) => Ok(JsString::new(number::number_to_string(n))),
            Value::String(s) => Ok(s),
            Value::Object(_) => {
                let p = self.to_primitive_value(v, Hint::String)?;
                self.to_string_value(p)
            }
        }
    }

    // ----------------------------------------------------------------------
    // Stack-indexed surface
    // ----------------------------------------------------------------------

    /// ToBoolean of the value at `idx`. Pure and total.
    pub fn to_boolean(&self, idx: i32) -> bool {
        self.slot(idx).to_boolean()
    }

    /// Coerce the value at `idx` to a primitive in place.
    pub fn to_primitive(&mut self, idx: i32, hint: Hint) -> RtResult<()> {
        let pos = self.index(idx);
        let v = self.stack[pos].clone();
        let p = self.to_primitive_value(v, hint)?;
        self.stack[pos] = p;
        Ok(())
    }

    /// ToNumber of the value at `idx`; the slot keeps the coerced number.
    pub fn to_number(&mut self, idx: i32) -> RtResult<f64> {
        let pos = self.index(idx);
        let v = self.stack[pos].clone();
        let n = self.to_number_value(v)?;
        self.stack[pos] = Value::Number(n);
        Ok(n)
    }

    /// ToString of the value at `idx`; the slot keeps the coerced string.
    pub fn to_string(&mut self, idx: i32) -> RtResult<JsString> {
        let pos = self.index(idx);
        let v = self.stack[pos].clone();
        let s = self.to_string_value(v)?;
        self.stack[pos] = Value::String(s.clone());
        Ok(s)
    }

    /// ToInteger: truncation toward zero, NaN to zero.
    pub fn to_integer(&mut self, idx: i32) -> RtResult<f64> {
        Ok(number::to_integer(self.to_number(idx)?))
    }

    /// ToInt32: modulo 2^32 into the signed range.
    pub fn to_int32(&mut self, idx: i32) -> RtResult<i32> {
        Ok(number::to_int32(self.to_number(idx)?))
    }

    /// ToUint32: modulo 2^32.
    pub fn to_uint32(&mut self, idx: i32) -> RtResult<u32> {
        Ok(number::to_uint32(self.to_number(idx)?))
    }

    /// ToInt16: modulo 2^16 into the signed range.
    pub fn to_int16(&mut self, idx: i32) -> RtResult<i16> {
        Ok(number::to_int16(self.to_number(idx)?))
    }

    /// ToUint16: modulo 2^16.
    pub fn to_uint16(&mut self, idx: i32) -> RtResult<u16> {
        Ok(number::to_uint16(self.to_number(idx)?))
    }
}
