//! Collector integration tests
//!
//! Exercises the trigger/report contract: requested and automatic cycles
//! reclaim unreachable objects and never touch anything reachable from the
//! operand stack, the global object, or a prototype chain.

use mink_runtime::{GcConfig, Interp};

#[test]
fn requested_collection_reports_stats() {
    let mut interp = Interp::new();
    interp.new_object();
    interp.pop(1); // now garbage

    let stats = interp.gc(true);
    assert!(stats.collections >= 1);
    assert!(stats.last_swept >= 1);
    assert!(stats.live > 0, "bootstrap prototypes stay live");
}

#[test]
fn stack_values_are_roots() {
    let mut interp = Interp::new();
    interp.new_object();
    interp.push_number(11.0);
    interp.set_property(-2, "v").unwrap();

    interp.gc(false);

    interp.get_property(-1, "v").unwrap();
    assert_eq!(interp.to_number(-1).unwrap(), 11.0);
}

#[test]
fn property_graphs_stay_alive_through_the_global() {
    let mut interp = Interp::new();

    // global.outer.inner.deep = true, held only through the global object
    interp.new_object();
    interp.new_object();
    interp.new_object();
    interp.push_boolean(true);
    interp.set_property(-2, "deep").unwrap();
    interp.set_property(-2, "inner").unwrap();
    interp.set_property(-2, "outer").unwrap();
    interp.set_global("outer").unwrap();
    assert_eq!(interp.top(), 0);

    interp.gc(false);

    interp.get_global("outer");
    interp.get_property(-1, "outer").unwrap();
    interp.get_property(-1, "inner").unwrap();
    interp.get_property(-1, "deep").unwrap();
    assert!(interp.to_boolean(-1));
}

#[test]
fn unreachable_objects_are_reclaimed() {
    let mut interp = Interp::new();
    let baseline = interp.gc(false).live;

    for _ in 0..50 {
        interp.new_object();
        interp.pop(1);
    }
    let stats = interp.gc(false);
    assert_eq!(stats.live, baseline);
}

#[test]
fn allocation_pressure_collects_automatically() {
    let mut interp = Interp::with_config(GcConfig { gc_threshold: 8 });
    let baseline = interp.gc(false).live;

    // Keep one object rooted on the stack while churning garbage.
    interp.new_object();
    interp.push_string("kept");
    interp.set_property(-2, "tag").unwrap();

    for _ in 0..200 {
        interp.new_object();
        interp.pop(1);
    }

    // Automatic cycles must have run and bounded the heap.
    let stats = interp.gc(false);
    assert!(stats.collections > 1, "expected automatic collections");
    assert_eq!(stats.live, baseline + 1);

    interp.get_property(-1, "tag").unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "kept");
}

#[test]
fn iterator_keeps_its_target_alive() {
    let mut interp = Interp::new();
    interp.new_object();
    interp.push_number(1.0);
    interp.set_property(-2, "only").unwrap();

    interp.push_iterator(-1).unwrap();
    interp.remove(-2); // drop the direct stack reference to the object

    interp.gc(false);

    assert!(interp.next_property(-1).unwrap());
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "only");
}

#[test]
fn prototype_outlives_its_children() {
    let mut interp = Interp::new();

    interp.new_object(); // shared prototype
    interp.push_string("base");
    interp.set_property(-2, "kind").unwrap();

    // A child reachable only through the global object keeps the prototype
    // alive even after the host drops its own reference.
    interp.new_object();
    interp.copy(-2);
    interp.set_prototype(-2).unwrap();
    interp.set_global("child").unwrap();
    interp.pop(1); // drop the direct prototype reference

    interp.gc(false);

    interp.get_global("child");
    interp.get_property(-1, "kind").unwrap();
    assert_eq!(interp.to_string(-1).unwrap().as_str(), "base");
}
