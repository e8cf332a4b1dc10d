//! Embedding-surface contract tests
//!
//! Each test drives an `Interp` the way a host would: push operands, invoke
//! through the stack, and observe the documented net effects.

use std::rc::Rc;

use mink_runtime::{ErrorKind, Hint, Interp, PropAttr, RuntimeError, Value};

#[test]
fn registered_native_add() {
    let mut interp = Interp::new();
    interp.new_native("add", 2, Rc::new(|interp, _argc| {
        let a = interp.to_number(1)?;
        let b = interp.to_number(2)?;
        Ok(Value::Number(a + b))
    }));
    interp.set_global("add").unwrap();

    interp.get_global("add");
    interp.push_undefined();
    interp.push_number(2.0);
    interp.push_number(3.0);
    interp.call(2).unwrap();

    assert_eq!(interp.top(), 1);
    assert_eq!(interp.to_number(-1).unwrap(), 5.0);
}

#[test]
fn native_function_exposes_arity() {
    let mut interp = Interp::new();
    interp.new_native("f", 3, Rc::new(|_, _| Ok(Value::Undefined)));
    interp.get_property(-1, "length").unwrap();
    assert_eq!(interp.to_number(-1).unwrap(), 3.0);
    interp.pop(1);
    interp.get_property(-1, "name").unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "f");
}

#[test]
fn get_through_prototype_and_own_enumeration() {
    let mut interp = Interp::new();

    // proto owns an enumerable "x" = 7
    interp.new_object();
    interp.push_number(7.0);
    interp.set_property(-2, "x").unwrap();

    // obj inherits from proto and owns "y"
    interp.new_object();
    interp.copy(-2);
    interp.set_prototype(-2).unwrap();
    interp.push_number(1.0);
    interp.set_property(-2, "y").unwrap();

    // get sees the inherited value
    interp.get_property(-1, "x").unwrap();
    assert_eq!(interp.to_number(-1).unwrap(), 7.0);
    interp.pop(1);

    // but obj's own enumeration does not include it
    interp.push_iterator(-1).unwrap();
    let mut own = Vec::new();
    while interp.next_property(-1).unwrap() {
        own.push(interp.to_string(-1).unwrap().as_str().to_string());
        interp.pop(1);
    }
    interp.pop(1);
    assert_eq!(own, ["y"]);

    // while the prototype's own enumeration does
    interp.push_iterator(-2).unwrap();
    let mut proto_own = Vec::new();
    while interp.next_property(-1).unwrap() {
        proto_own.push(interp.to_string(-1).unwrap().as_str().to_string());
        interp.pop(1);
    }
    assert_eq!(proto_own, ["x"]);
}

#[test]
fn dont_delete_property_survives_deletion() {
    let mut interp = Interp::new();
    interp.new_object();
    interp.push_number(1.0);
    interp
        .def_property(
            -2,
            "pinned",
            PropAttr {
                dont_delete: true,
                ..PropAttr::NONE
            },
        )
        .unwrap();

    assert!(interp.has_property(-1, "pinned").unwrap());
    assert!(!interp.del_property(-1, "pinned").unwrap());
    assert!(interp.has_property(-1, "pinned").unwrap());
    interp.get_property(-1, "pinned").unwrap();
    assert_eq!(interp.to_number(-1).unwrap(), 1.0);
    interp.pop(1);

    interp.push_number(2.0);
    interp.set_property(-2, "loose").unwrap();
    assert!(interp.del_property(-1, "loose").unwrap());
    assert!(!interp.has_property(-1, "loose").unwrap());
}

#[test]
fn inherited_readonly_never_creates_own_property() {
    let mut interp = Interp::new();

    interp.new_object(); // proto
    interp.push_string("fixed");
    interp
        .def_property(
            -2,
            "ro",
            PropAttr {
                read_only: true,
                ..PropAttr::NONE
            },
        )
        .unwrap();

    interp.new_object(); // child
    interp.copy(-2);
    interp.set_prototype(-2).unwrap();

    // own-key set before and after the blocked write is identical
    let own_keys = |interp: &mut Interp| {
        interp.push_iterator(-1).unwrap();
        let mut keys = Vec::new();
        while interp.next_property(-1).unwrap() {
            keys.push(interp.to_string(-1).unwrap().as_str().to_string());
            interp.pop(1);
        }
        interp.pop(1);
        keys
    };
    let before = own_keys(&mut interp);

    interp.push_string("overwrite");
    interp.set_property(-2, "ro").unwrap();
    let after = own_keys(&mut interp);

    assert_eq!(before, after);
    assert!(!interp.has_own_property(-1, "ro").unwrap());
    interp.get_property(-1, "ro").unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "fixed");
}

#[test]
fn construct_always_yields_an_object() {
    let mut interp = Interp::new();
    interp.new_constructor(
        "Box",
        1,
        Rc::new(|_, _| Ok(Value::Undefined)),
        Rc::new(|interp, argc| {
            assert_eq!(argc, 1);
            interp.copy(1);
            interp.set_property(0, "contents")?;
            Ok(Value::Number(123.0)) // primitive return must be discarded
        }),
    );

    // Remember the constructor's prototype object for the identity check.
    interp.get_property(-1, "prototype").unwrap();

    // stack: func proto — construct from a copy of func
    interp.copy(-2);
    interp.push_string("payload");
    interp.construct(1).unwrap();

    assert!(interp.is_object(-1));
    interp.get_property(-1, "contents").unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "payload");
    interp.pop(1);

    // The instance's prototype is the function's `prototype` value.
    interp.get_prototype(-1).unwrap();
    interp.copy(-3);
    assert!(interp.strict_equal());
}

#[test]
fn invoking_a_non_callable_is_safe() {
    let mut interp = Interp::new();
    interp.push_string("not callable");
    interp.push_undefined();
    interp.push_number(1.0);

    let depth = interp.top();
    let err = interp.call(1).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeError(_)));
    assert_eq!(interp.top(), depth, "failed call attempt must not disturb the stack");
}

#[test]
fn to_primitive_with_useless_callbacks_is_a_type_error() {
    let mut interp = Interp::new();
    interp.new_object();

    // Both conversion methods return objects, never primitives.
    interp.new_native("valueOf", 0, Rc::new(|interp, _| Ok(interp.value(0))));
    interp.set_property(-2, "valueOf").unwrap();
    interp.new_native("toString", 0, Rc::new(|interp, _| Ok(interp.value(0))));
    interp.set_property(-2, "toString").unwrap();

    let err = interp.to_primitive(-1, Hint::None).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeError(_)));
}

#[test]
fn to_primitive_honors_hint_order() {
    let mut interp = Interp::new();
    interp.new_object();
    interp.new_native("valueOf", 0, Rc::new(|_, _| Ok(Value::Number(42.0))));
    interp.set_property(-2, "valueOf").unwrap();
    interp.new_native("toString", 0, Rc::new(|_, _| {
        Ok(Value::String("forty-two".into()))
    }));
    interp.set_property(-2, "toString").unwrap();

    interp.copy(-1);
    interp.to_primitive(-1, Hint::Number).unwrap();
    assert_eq!(interp.to_number(-1).unwrap(), 42.0);
    interp.pop(1);

    interp.copy(-1);
    interp.to_primitive(-1, Hint::String).unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "forty-two");
}

#[test]
fn conversion_callback_errors_propagate() {
    let mut interp = Interp::new();
    interp.new_object();
    interp.new_native("valueOf", 0, Rc::new(|interp, _| {
        interp.new_error(ErrorKind::RangeError, "no value");
        Err(interp.throw())
    }));
    interp.set_property(-2, "valueOf").unwrap();

    let err = interp.to_number(-1).unwrap_err();
    match err {
        RuntimeError::Thrown(value) => {
            interp.push_error(&RuntimeError::Thrown(value));
            interp.get_property(-1, "name").unwrap();
            assert_eq!(interp.to_string(-1).unwrap().as_str(), "RangeError");
        }
        other => panic!("expected thrown value, got {other:?}"),
    }
}

#[test]
fn thrown_values_round_trip_through_push_error() {
    let mut interp = Interp::new();
    interp.new_error(ErrorKind::URIError, "bad escape");
    let err = interp.throw();
    assert_eq!(interp.top(), 0);

    interp.push_error(&err);
    assert_eq!(interp.top(), 1);
    interp.get_property(-1, "name").unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "URIError");
    interp.pop(1);
    interp.get_property(-1, "message").unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "bad escape");
}

#[test]
fn classified_errors_materialize_as_error_objects() {
    let mut interp = Interp::new();
    let err = RuntimeError::reference_error("x is not defined");
    interp.push_error(&err);
    interp.get_property(-1, "name").unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "ReferenceError");
    interp.pop(1);
    interp.get_property(-1, "message").unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "x is not defined");
}

#[test]
fn natives_can_reenter_the_interpreter() {
    let mut interp = Interp::new();
    interp.new_native("twice", 1, Rc::new(|interp, _argc| {
        // twice(f) = f() + f()
        let mut total = 0.0;
        for _ in 0..2 {
            interp.copy(1);
            interp.push_undefined();
            interp.call(0)?;
            total += interp.to_number(-1)?;
            interp.pop(1);
        }
        Ok(Value::Number(total))
    }));
    interp.set_global("twice").unwrap();

    interp.new_native("five", 0, Rc::new(|_, _| Ok(Value::Number(5.0))));
    interp.set_global("five").unwrap();

    interp.get_global("twice");
    interp.push_undefined();
    interp.get_global("five");
    interp.call(1).unwrap();
    assert_eq!(interp.to_number(-1).unwrap(), 10.0);
}

#[test]
fn instances_are_independent() {
    let mut a = Interp::new();
    let mut b = Interp::new();

    a.push_number(1.0);
    a.set_global("shared").unwrap();

    b.get_global("shared");
    assert!(b.is_undefined(-1));
}
