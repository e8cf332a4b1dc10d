//! Value operators
//!
//! The operators of the embedding surface that need coercion: `concat`
//! (string-wins addition), relational `compare`, and the two equality
//! forms. All four consume the two topmost values; `concat` leaves its
//! result in their place.
//!
//! Coercion happens in place on the stack slots before anything is popped,
//! so operand objects stay rooted while conversion methods run.

use mink_core::number::parse_number;
use mink_core::{JsString, RtResult, Value};
use std::cmp::Ordering;

use crate::coerce::Hint;
use crate::state::Interp;

impl Interp {
    /// Pop the two topmost values and push their concatenation: if either
    /// coerces to a string, string concatenation; otherwise numeric
    /// addition.
    pub fn concat(&mut self) -> RtResult<()> {
        self.to_primitive(-2, Hint::None)?;
        self.to_primitive(-1, Hint::None)?;
        if self.slot(-2).is_string() || self.slot(-1).is_string() {
            let a = self.to_string(-2)?;
            let b = self.to_string(-1)?;
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a.as_str());
            out.push_str(b.as_str());
            self.pop(2);
            self.push(Value::String(JsString::new(out)));
        } else {
            let b = self.to_number(-1)?;
            let a = self.to_number(-2)?;
            self.pop(2);
            self.push_number(a + b);
        }
        Ok(())
    }

    /// Pop the two topmost values and compare them relationally.
    ///
    /// Two strings compare lexicographically; anything else compares
    /// numerically. `None` means the comparison is undefined because an
    /// operand is NaN.
    pub fn compare(&mut self) -> RtResult<Option<Ordering>> {
        self.to_primitive(-2, Hint::Number)?;
        self.to_primitive(-1, Hint::Number)?;
        let b = self.pop_value();
        let a = self.pop_value();
        if let (Value::String(x), Value::String(y)) = (&a, &b) {
            return Ok(Some(x.cmp(y)));
        }
        let x = self.to_number_value(a)?;
        let y = self.to_number_value(b)?;
        Ok(x.partial_cmp(&y))
    }

    /// Pop the two topmost values and compare with coercing (loose)
    /// equality.
    pub fn equal(&mut self) -> RtResult<bool> {
        loop {
            let a = self.slot(-2).clone();
            let b = self.slot(-1).clone();
            match (&a, &b) {
                (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => {
                    self.pop(2);
                    return Ok(true);
                }
                (Value::Number(_), Value::Number(_))
                | (Value::String(_), Value::String(_))
                | (Value::Boolean(_), Value::Boolean(_))
                | (Value::Object(_), Value::Object(_)) => {
                    self.pop(2);
                    return Ok(a == b);
                }
                (Value::Number(_), Value::String(s)) => {
                    let n = parse_number(s.as_str());
                    *self.slot_mut(-1) = Value::Number(n);
                }
                (Value::String(s), Value::Number(_)) => {
                    let n = parse_number(s.as_str());
                    *self.slot_mut(-2) = Value::Number(n);
                }
                (Value::Boolean(x), _) => {
                    *self.slot_mut(-2) = Value::Number(if *x { 1.0 } else { 0.0 });
                }
                (_, Value::Boolean(x)) => {
                    *self.slot_mut(-1) = Value::Number(if *x { 1.0 } else { 0.0 });
                }
                (Value::Object(_), Value::Number(_) | Value::String(_)) => {
                    let p = self.to_primitive_value(a, Hint::None)?;
                    *self.slot_mut(-2) = p;
                }
                (Value::Number(_) | Value::String(_), Value::Object(_)) => {
                    let p = self.to_primitive_value(b, Hint::None)?;
                    *self.slot_mut(-1) = p;
                }
                _ => {
                    // undefined/null against anything remaining
                    self.pop(2);
                    return Ok(false);
                }
            }
        }
    }

    /// Pop the two topmost values and compare with strict equality: no
    /// coercion, NaN unequal to itself, objects by identity.
    pub fn strict_equal(&mut self) -> bool {
        let b = self.pop_value();
        let a = self.pop_value();
        a == b
    }
}
