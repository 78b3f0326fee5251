//! Integration tests for value marshaling
//!
//! Tests cover:
//! - Primitive ingress/egress and numeric narrowing
//! - Strings, boxed primitives and dynamically typed objects
//! - Primitive and object arrays, atomic failure
//! - Native object wrappers

#[macro_use]
mod common;

use common::Harness;
use jvbridge_core::{Backend, Bridge, BridgeError, BridgeOptions, HostType, JValue, JavaTypeId, LocalRef};
use jvbridge_sdk::{HostRuntime, PrimitiveBuffer, RawValue};
use jvbridge_sim::{ScriptValue, SimHost, WRAPPER_CLASS};

fn scalar(id: JavaTypeId) -> HostType {
    HostType::Scalar(id)
}

// ============================================================================
// Primitives
// ============================================================================

fn byte_ingress<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let v = bridge.ingress(scalar(JavaTypeId::Byte), b.put(65.0.into())).unwrap();
    assert!(matches!(v, JValue::Byte(65)));

    let v = bridge.ingress(scalar(JavaTypeId::Byte), b.put((-1.0).into())).unwrap();
    assert!(matches!(v, JValue::Byte(-1)));

    let v = bridge.ingress(scalar(JavaTypeId::Byte), b.put(300.0.into())).unwrap();
    assert!(matches!(v, JValue::Byte(44)));

    let v = bridge.ingress(scalar(JavaTypeId::Byte), b.put(3.9.into())).unwrap();
    assert!(matches!(v, JValue::Byte(3)));

    assert_eq!(b.depth(), 0);
}

fn byte_egress_is_signed<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let slot = bridge.egress(scalar(JavaTypeId::Byte), &JValue::Byte(-1)).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Float(-1.0));
    drop(slot);

    let slot = bridge.egress(scalar(JavaTypeId::Byte), &JValue::Byte(65)).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Float(65.0));
    drop(slot);

    assert_eq!(b.depth(), 0);
}

fn wide_integers<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let v = bridge.ingress(scalar(JavaTypeId::Short), b.put(65_543.0.into())).unwrap();
    assert!(matches!(v, JValue::Short(7)));

    let v = bridge.ingress(scalar(JavaTypeId::Int), b.put((-2_147_483_649.0).into())).unwrap();
    assert!(matches!(v, JValue::Int(2_147_483_647)));

    let v = bridge.ingress(scalar(JavaTypeId::Long), b.put(9_007_199_254_740_992.0.into())).unwrap();
    assert!(matches!(v, JValue::Long(9_007_199_254_740_992)));

    let v = bridge.ingress(scalar(JavaTypeId::Int), b.put(f64::NAN.into())).unwrap();
    assert!(matches!(v, JValue::Int(0)));

    // Long saturates instead of wrapping; narrower widths still wrap
    let v = bridge.ingress(scalar(JavaTypeId::Long), b.put(f64::INFINITY.into())).unwrap();
    assert!(matches!(v, JValue::Long(i64::MAX)));
    let v = bridge.ingress(scalar(JavaTypeId::Long), b.put(f64::NEG_INFINITY.into())).unwrap();
    assert!(matches!(v, JValue::Long(i64::MIN)));
    let v = bridge.ingress(scalar(JavaTypeId::Long), b.put(1e300.into())).unwrap();
    assert!(matches!(v, JValue::Long(i64::MAX)));
    let v = bridge.ingress(scalar(JavaTypeId::Long), b.put(f64::NAN.into())).unwrap();
    assert!(matches!(v, JValue::Long(0)));
    let v = bridge.ingress(scalar(JavaTypeId::Int), b.put(f64::INFINITY.into())).unwrap();
    assert!(matches!(v, JValue::Int(0)));

    let slot = bridge.egress(scalar(JavaTypeId::Long), &JValue::Long(-42)).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Float(-42.0));
    drop(slot);

    assert_eq!(b.depth(), 0);
}

fn char_conversions<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let v = bridge.ingress(scalar(JavaTypeId::Char), b.put("A".into())).unwrap();
    assert!(matches!(v, JValue::Char(65)));

    let v = bridge.ingress(scalar(JavaTypeId::Char), b.put("xyz".into())).unwrap();
    assert!(matches!(v, JValue::Char(0x78)));

    let v = bridge.ingress(scalar(JavaTypeId::Char), b.put(66.0.into())).unwrap();
    assert!(matches!(v, JValue::Char(66)));

    let slot = bridge.egress(scalar(JavaTypeId::Char), &JValue::Char(0x41)).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::string("A"));
    drop(slot);

    assert_eq!(b.depth(), 0);
}

fn floating_point<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let v = bridge.ingress(scalar(JavaTypeId::Float), b.put(1.5.into())).unwrap();
    assert!(matches!(v, JValue::Float(f) if f == 1.5));

    let v = bridge.ingress(scalar(JavaTypeId::Double), b.put(f64::INFINITY.into())).unwrap();
    assert!(matches!(v, JValue::Double(d) if d == f64::INFINITY));

    let slot = bridge.egress(scalar(JavaTypeId::Float), &JValue::Float(0.25)).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Float(0.25));
    drop(slot);

    assert_eq!(b.depth(), 0);
}

/// Boundary values of every primitive width
fn boundary_values() -> Vec<JValue<'static>> {
    vec![
        JValue::Boolean(true),
        JValue::Boolean(false),
        JValue::Byte(0),
        JValue::Byte(-1),
        JValue::Byte(i8::MIN),
        JValue::Byte(i8::MAX),
        JValue::Short(0),
        JValue::Short(-1),
        JValue::Short(i16::MIN),
        JValue::Short(i16::MAX),
        JValue::Int(0),
        JValue::Int(-1),
        JValue::Int(i32::MIN),
        JValue::Int(i32::MAX),
        JValue::Long(0),
        JValue::Long(-1),
        JValue::Long(i64::MIN),
        JValue::Long(i64::MAX),
        JValue::Long(1 << 53),
        JValue::Char(0),
        JValue::Char(0x41),
        JValue::Char(0xFFFF),
        JValue::Float(0.0),
        JValue::Float(-1.0),
        JValue::Float(f32::MIN),
        JValue::Float(f32::MAX),
        JValue::Float(f32::MIN_POSITIVE),
        JValue::Float(f32::INFINITY),
        JValue::Float(f32::NEG_INFINITY),
        JValue::Float(f32::NAN),
        JValue::Double(0.0),
        JValue::Double(-1.0),
        JValue::Double(f64::MIN),
        JValue::Double(f64::MAX),
        JValue::Double(f64::MIN_POSITIVE),
        JValue::Double(f64::INFINITY),
        JValue::Double(f64::NEG_INFINITY),
        JValue::Double(f64::NAN),
    ]
}

fn same_raw(a: RawValue, b: RawValue) -> bool {
    match (a, b) {
        (RawValue::Float(x), RawValue::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
        (RawValue::Double(x), RawValue::Double(y)) => x == y || (x.is_nan() && y.is_nan()),
        (x, y) => x == y,
    }
}

/// Egress `value` as `ty` and ingress the produced script value back
fn round_trip<'h, B: Harness>(bridge: &Bridge<'h, B>, ty: HostType, value: &JValue<'_>) -> JValue<'h> {
    let slot = bridge.egress(ty, value).unwrap();
    bridge.ingress(ty, slot).unwrap()
}

fn primitive_round_trips<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    for value in boundary_values() {
        let expected = value.as_raw();
        let kind = expected.kind().unwrap();
        let id = JavaTypeId::primitive(kind);

        let back = round_trip(&bridge, scalar(id), &value);
        assert!(same_raw(back.as_raw(), expected), "{}: {:?} became {:?}", id, expected, back.as_raw());

        let boxed = bridge.box_value(id, &value).unwrap();
        let back = round_trip(&bridge, scalar(JavaTypeId::boxed(kind)), &boxed);
        assert!(matches!(back, JValue::Boxed(_)));
        let unboxed = bridge.unbox_value(id, &back).unwrap();
        assert!(same_raw(unboxed.as_raw(), expected), "boxed {}: {:?} became {:?}", id, expected, unboxed.as_raw());
    }

    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn mismatch_consumes_slot<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let err = bridge.ingress(scalar(JavaTypeId::Boolean), b.put(1.0.into())).unwrap_err();
    assert_eq!(err, BridgeError::mismatch("1", "boolean"));
    assert_eq!(err.to_string(), "Cannot convert JS value 1 to boolean");

    let err = bridge.ingress(scalar(JavaTypeId::Int), b.put("12".into())).unwrap_err();
    assert!(matches!(err, BridgeError::TypeMismatch { .. }));

    let err = bridge.ingress(scalar(JavaTypeId::Byte), b.put(ScriptValue::Null)).unwrap_err();
    assert_eq!(err.to_string(), "Cannot convert JS value null to byte");

    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn boolean_and_void<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let v = bridge.ingress(scalar(JavaTypeId::Boolean), b.put(true.into())).unwrap();
    assert!(matches!(v, JValue::Boolean(true)));

    let v = bridge.ingress(scalar(JavaTypeId::Void), b.put("ignored".into())).unwrap();
    assert!(v.is_void());

    let slot = bridge.egress(scalar(JavaTypeId::Void), &JValue::Void).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Undefined);
    drop(slot);

    assert_eq!(b.depth(), 0);
}

both_backends! {
    test_byte_ingress => byte_ingress;
    test_byte_egress_is_signed => byte_egress_is_signed;
    test_wide_integers => wide_integers;
    test_char_conversions => char_conversions;
    test_floating_point => floating_point;
    test_primitive_round_trips => primitive_round_trips;
    test_mismatch_consumes_slot => mismatch_consumes_slot;
    test_boolean_and_void => boolean_and_void;
}

// ============================================================================
// Strings, boxed values, objects
// ============================================================================

fn string_round_trip<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let v = bridge.ingress(scalar(JavaTypeId::String), b.put("héllo".into())).unwrap();
    let obj = v.local_ref().unwrap();
    assert_eq!(host.string_chars(obj.raw()).unwrap(), "héllo");
    assert_eq!(host.class_name(obj.raw()).unwrap(), "java/lang/String");

    let slot = bridge.egress(scalar(JavaTypeId::String), &v).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::string("héllo"));
    drop(slot);
    drop(v);

    let v = bridge.ingress(scalar(JavaTypeId::String), b.put(2.0.into())).unwrap();
    assert_eq!(host.string_chars(v.local_ref().unwrap().raw()).unwrap(), "2");
    drop(v);

    let v = bridge.ingress(scalar(JavaTypeId::String), b.put(ScriptValue::Undefined)).unwrap();
    assert!(v.is_void());

    let slot = bridge.egress(scalar(JavaTypeId::String), &JValue::Void).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Null);
    drop(slot);

    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn boxed_values<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let v = bridge.ingress(scalar(JavaTypeId::BoxedInt), b.put(5.0.into())).unwrap();
    assert!(matches!(v, JValue::Boxed(_)));
    assert_eq!(host.class_name(v.local_ref().unwrap().raw()).unwrap(), "java/lang/Integer");

    let unboxed = bridge.unbox_value(JavaTypeId::Int, &v).unwrap();
    assert!(matches!(unboxed, JValue::Int(5)));

    let slot = bridge.egress(scalar(JavaTypeId::BoxedInt), &v).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Float(5.0));
    drop(slot);
    drop(v);

    let v = bridge.ingress(scalar(JavaTypeId::BoxedInt), b.put(ScriptValue::Null)).unwrap();
    assert!(v.is_void());
    let slot = bridge.egress(scalar(JavaTypeId::BoxedLong), &JValue::Void).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Null);
    drop(slot);

    let boxed = bridge.box_value(JavaTypeId::Short, &JValue::Short(-3)).unwrap();
    assert_eq!(
        host.boxed_value(boxed.local_ref().unwrap().raw()),
        Some(RawValue::Short(-3))
    );
    drop(boxed);

    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn object_dispatch<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();
    let object = scalar(JavaTypeId::Object);

    let v = bridge.ingress(object, b.put(2.5.into())).unwrap();
    assert_eq!(host.class_name(v.local_ref().unwrap().raw()).unwrap(), "java/lang/Double");
    drop(v);

    let v = bridge.ingress(object, b.put(false.into())).unwrap();
    assert_eq!(host.class_name(v.local_ref().unwrap().raw()).unwrap(), "java/lang/Boolean");
    drop(v);

    let v = bridge.ingress(object, b.put("s".into())).unwrap();
    assert_eq!(host.class_name(v.local_ref().unwrap().raw()).unwrap(), "java/lang/String");
    drop(v);

    for nullish in [ScriptValue::Null, ScriptValue::Undefined] {
        let v = bridge.ingress(object, b.put(nullish)).unwrap();
        assert!(v.is_void());
    }

    let err = bridge.ingress(object, b.put(ScriptValue::Object)).unwrap_err();
    assert!(matches!(err, BridgeError::TypeMismatch { .. }));

    // Egress picks the converter from the runtime class
    let boxed = JValue::Boxed(LocalRef::from_raw(&host, host.new_boxed(RawValue::Int(7))));
    let slot = bridge.egress(object, &boxed).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Float(7.0));
    drop(slot);
    drop(boxed);

    let text = JValue::Object(LocalRef::from_raw(&host, host.new_string("t").unwrap()));
    let slot = bridge.egress(object, &text).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::string("t"));
    drop(slot);
    drop(text);

    let slot = bridge.egress(object, &JValue::Int(3)).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Float(3.0));
    drop(slot);

    let slot = bridge.egress(object, &JValue::Void).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Null);
    drop(slot);

    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn object_egress_of_array<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let raw = host.new_array_from(PrimitiveBuffer::Double(vec![0.5, -1.0]));
    let array = JValue::Object(LocalRef::from_raw(&host, raw));
    let slot = bridge.egress(scalar(JavaTypeId::Object), &array).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::numbers(&[0.5, -1.0]));
    drop(slot);
    drop(array);

    assert_eq!(b.depth(), 0);
    assert_eq!(host.outstanding_array_elements(), 0);
}

both_backends! {
    test_string_round_trip => string_round_trip;
    test_boxed_values => boxed_values;
    test_object_dispatch => object_dispatch;
    test_object_egress_of_array => object_egress_of_array;
}

// ============================================================================
// Arrays
// ============================================================================

fn byte_array_wraps_elements<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let slot = b.put(ScriptValue::numbers(&[1.0, 2.0, 300.0]));
    let v = bridge.ingress(HostType::Array(JavaTypeId::Byte), slot).unwrap();
    assert!(matches!(v, JValue::Array(_)));
    let array = v.local_ref().unwrap().raw();
    assert_eq!(host.class_name(array).unwrap(), "[B");
    assert_eq!(host.array_contents(array), Some(PrimitiveBuffer::Byte(vec![1, 2, 44])));
    drop(v);

    assert_eq!(b.depth(), 0);
    assert_eq!(host.outstanding_array_elements(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn array_ingress_is_atomic<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let source = ScriptValue::array(vec![1.0.into(), "x".into(), 3.0.into()]);
    let err = bridge.ingress(HostType::Array(JavaTypeId::Int), b.put(source)).unwrap_err();
    assert_eq!(err.to_string(), "Cannot convert JS value x to int");

    let source = ScriptValue::array(vec!["a".into(), ScriptValue::Object]);
    let err = bridge.ingress(HostType::Array(JavaTypeId::String), b.put(source)).unwrap_err();
    assert!(matches!(err, BridgeError::TypeMismatch { .. }));

    // Boxed elements before the failing one are released again
    let source = ScriptValue::array(vec![1.0.into(), "x".into(), 3.0.into()]);
    let err = bridge.ingress(HostType::Array(JavaTypeId::BoxedInt), b.put(source)).unwrap_err();
    assert_eq!(err.to_string(), "Cannot convert JS value x to int");
    assert_eq!(host.local_ref_count(), 0);

    let source = ScriptValue::array(vec!["a".into(), ScriptValue::Object, "c".into()]);
    let err = bridge.ingress(HostType::Array(JavaTypeId::String), b.put(source)).unwrap_err();
    assert!(matches!(err, BridgeError::TypeMismatch { .. }));

    let err = bridge.ingress(HostType::Array(JavaTypeId::Int), b.put("nope".into())).unwrap_err();
    assert_eq!(err.to_string(), "Cannot convert JS value nope to Array<int>");

    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
    assert_eq!(host.outstanding_array_elements(), 0);
}

fn element_buffer_failure<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    host.set_fail_array_elements(true);
    let slot = b.put(ScriptValue::numbers(&[1.0, 2.0]));
    let err = bridge.ingress(HostType::Array(JavaTypeId::Int), slot).unwrap_err();
    assert!(matches!(err, BridgeError::NativeBridge(_)));

    let raw = host.new_array_from(PrimitiveBuffer::Int(vec![1]));
    let array = LocalRef::from_raw(&host, raw);
    let err = bridge.egress_array(JavaTypeId::Int, &array, false).unwrap_err();
    assert!(matches!(err, BridgeError::NativeBridge(_)));
    drop(array);
    host.set_fail_array_elements(false);

    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn nullish_array<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let v = bridge.ingress(HostType::Array(JavaTypeId::Int), b.put(ScriptValue::Null)).unwrap();
    assert!(v.is_void());

    let slot = bridge.egress(HostType::Array(JavaTypeId::Int), &JValue::Void).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::Null);
    drop(slot);

    assert_eq!(b.depth(), 0);
}

fn primitive_array_egress<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let raw = host.new_array_from(PrimitiveBuffer::Int(vec![1, -2, 3]));
    let array = JValue::Array(LocalRef::from_raw(&host, raw));
    let slot = bridge.egress(HostType::Array(JavaTypeId::Int), &array).unwrap();
    assert_eq!(b.read(slot.value()), ScriptValue::numbers(&[1.0, -2.0, 3.0]));
    drop(slot);

    let expanded = bridge
        .egress_array(JavaTypeId::Int, array.local_ref().unwrap(), true)
        .unwrap();
    assert_eq!(expanded.len(), 3);
    let values: Vec<ScriptValue> = expanded.values().iter().map(|v| b.read(v)).collect();
    assert_eq!(
        values,
        vec![ScriptValue::Float(1.0), ScriptValue::Float(-2.0), ScriptValue::Float(3.0)]
    );
    drop(expanded);
    drop(array);

    assert_eq!(b.depth(), 0);
    assert_eq!(host.outstanding_array_elements(), 0);
}

fn object_arrays<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let source = ScriptValue::array(vec!["a".into(), ScriptValue::Null, "c".into()]);
    let v = bridge.ingress(HostType::Array(JavaTypeId::String), b.put(source)).unwrap();
    let array = v.local_ref().unwrap().raw();
    assert_eq!(host.class_name(array).unwrap(), "[Ljava/lang/String;");
    assert_eq!(host.array_length(array).unwrap(), 3);
    assert_eq!(host.object_array_element(array, 1).unwrap(), None);
    let first = LocalRef::from_raw(&host, host.object_array_element(array, 0).unwrap().unwrap());
    assert_eq!(host.string_chars(first.raw()).unwrap(), "a");
    drop(first);

    let slot = bridge.egress(HostType::Array(JavaTypeId::String), &v).unwrap();
    assert_eq!(
        b.read(slot.value()),
        ScriptValue::array(vec!["a".into(), ScriptValue::Null, "c".into()])
    );
    drop(slot);
    drop(v);

    let source = ScriptValue::array(vec![1.0.into(), ScriptValue::Null]);
    let v = bridge.ingress(HostType::Array(JavaTypeId::BoxedInt), b.put(source)).unwrap();
    let array = v.local_ref().unwrap().raw();
    assert_eq!(host.class_name(array).unwrap(), "[Ljava/lang/Integer;");
    drop(v);

    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn array_length_limit<B: Harness>() {
    let host = SimHost::new();
    let options: BridgeOptions =
        serde_json::from_str(r#"{ "check_balance": true, "max_array_length": 2 }"#).unwrap();
    let bridge = Bridge::new(&host, B::make(), options);
    let b = bridge.backend();

    let slot = b.put(ScriptValue::numbers(&[1.0, 2.0, 3.0]));
    let err = bridge.ingress(HostType::Array(JavaTypeId::Double), slot).unwrap_err();
    assert!(matches!(err, BridgeError::NativeBridge(_)));

    let slot = b.put(ScriptValue::numbers(&[1.0, 2.0]));
    assert!(bridge.ingress(HostType::Array(JavaTypeId::Double), slot).is_ok());

    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

both_backends! {
    test_byte_array_wraps_elements => byte_array_wraps_elements;
    test_array_ingress_is_atomic => array_ingress_is_atomic;
    test_element_buffer_failure => element_buffer_failure;
    test_nullish_array => nullish_array;
    test_primitive_array_egress => primitive_array_egress;
    test_object_arrays => object_arrays;
    test_array_length_limit => array_length_limit;
}

// ============================================================================
// Native object wrappers
// ============================================================================

fn native_object_wrapper<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let thing = JValue::Object(LocalRef::from_raw(&host, host.new_object("demo/Thing")));
    let exported = bridge.egress(scalar(JavaTypeId::Object), &thing).unwrap();
    let id = b.read(exported.value()).host_object_id().unwrap();

    let wrapper = bridge.ingress(scalar(JavaTypeId::NativeObjectWrapper), exported).unwrap();
    let raw = wrapper.local_ref().unwrap().raw();
    assert_eq!(host.class_name(raw).unwrap(), WRAPPER_CLASS);
    let inner = LocalRef::from_raw(&host, host.wrapper_inner(raw).unwrap());
    assert!(inner.is_same(thing.local_ref().unwrap()));
    drop(inner);

    let slot = bridge.egress(scalar(JavaTypeId::NativeObjectWrapper), &wrapper).unwrap();
    assert_eq!(b.read(slot.value()).host_object_id(), Some(id));
    drop(slot);

    // Primitive script values carry no wrapper at all
    for value in [ScriptValue::Float(1.0), "text".into(), ScriptValue::Bool(true)] {
        let v = bridge.ingress(scalar(JavaTypeId::NativeObjectWrapper), b.put(value)).unwrap();
        assert!(v.is_void());
    }

    // Nullish values and plain script objects wrap null
    for value in [ScriptValue::Null, ScriptValue::Undefined, ScriptValue::Object] {
        let empty = bridge.ingress(scalar(JavaTypeId::NativeObjectWrapper), b.put(value)).unwrap();
        let raw = empty.local_ref().unwrap().raw();
        assert_eq!(host.class_name(raw).unwrap(), WRAPPER_CLASS);
        assert!(host.wrapper_inner(raw).is_none());
        let slot = bridge.egress(scalar(JavaTypeId::NativeObjectWrapper), &empty).unwrap();
        assert_eq!(b.read(slot.value()), ScriptValue::Null);
    }

    drop(wrapper);
    drop(thing);
    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

both_backends! {
    test_native_object_wrapper => native_object_wrapper;
}
