//! Integration tests for host object identity
//!
//! Tests cover:
//! - Stable wrapper ids for repeated exports
//! - Importing a wrapper yields the original object
//! - Reclaimed objects and cache purging
//! - Many objects sharing identity hash buckets

#[macro_use]
mod common;

use common::Harness;
use jvbridge_core::{Backend, Bridge, BridgeOptions, HostType, JValue, JavaTypeId, LocalRef};
use jvbridge_sdk::{HostRuntime, WrapperId};
use jvbridge_sim::{ScriptValue, SimHost};

const OBJECT: HostType = HostType::Scalar(JavaTypeId::Object);

fn export_id<B: Harness>(bridge: &Bridge<'_, B>, value: &JValue<'_>) -> WrapperId {
    let slot = bridge.egress(OBJECT, value).unwrap();
    bridge.backend().read(slot.value()).host_object_id().unwrap()
}

fn stable_wrapper_ids<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());

    let thing = JValue::Object(LocalRef::from_raw(&host, host.new_object("demo/Thing")));
    let other = JValue::Object(LocalRef::from_raw(&host, host.new_object("demo/Thing")));

    let first = export_id(&bridge, &thing);
    // A second local reference to the same object maps to the same wrapper
    let alias = JValue::Object(thing.local_ref().unwrap().try_clone().unwrap());
    assert_eq!(export_id(&bridge, &alias), first);
    assert_ne!(export_id(&bridge, &other), first);
    assert_eq!(bridge.identity().len(), 2);

    drop(alias);
    drop(other);
    drop(thing);
    assert_eq!(bridge.backend().depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
    assert_eq!(host.weak_ref_count(), 2);
}

fn import_yields_original<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let thing = JValue::Object(LocalRef::from_raw(&host, host.new_object("demo/Thing")));
    let slot = bridge.egress(OBJECT, &thing).unwrap();
    let back = bridge.ingress(OBJECT, slot).unwrap();
    assert!(back.local_ref().unwrap().is_same(thing.local_ref().unwrap()));

    // Ids the bridge never handed out are a bridge bug, not a user error
    let unknown = b.put(ScriptValue::HostObject {
        id: WrapperId(999),
        class_name: "x".into(),
    });
    let err = bridge.ingress(OBJECT, unknown).unwrap_err();
    assert!(err.is_internal());

    drop(back);
    drop(thing);
    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn reclaimed_objects<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());
    let b = bridge.backend();

    let thing = JValue::Object(LocalRef::from_raw(&host, host.new_object("demo/Thing")));
    let id = export_id(&bridge, &thing);
    let keep = JValue::Object(LocalRef::from_raw(&host, host.new_object("demo/Thing")));
    let kept = export_id(&bridge, &keep);

    // The cache holds weak references only
    drop(thing);
    assert_eq!(host.collect(), 1);

    let stale = b.put(ScriptValue::HostObject { id, class_name: "demo".into() });
    assert!(bridge.ingress(OBJECT, stale).unwrap().is_void());

    assert_eq!(bridge.purge_identity_cache(), 1);
    assert_eq!(bridge.identity().len(), 1);
    assert_eq!(host.weak_ref_count(), 1);

    assert!(bridge.host_object_released(kept));
    assert!(!bridge.host_object_released(kept));
    assert!(bridge.identity().is_empty());
    assert_eq!(host.weak_ref_count(), 0);

    drop(keep);
    assert_eq!(b.depth(), 0);
    assert_eq!(host.local_ref_count(), 0);
}

fn shared_hash_buckets<B: Harness>() {
    let host = SimHost::new();
    let bridge = Bridge::new(&host, B::make(), BridgeOptions::checked());

    let objects: Vec<JValue<'_>> = (0..40)
        .map(|_| JValue::Object(LocalRef::from_raw(&host, host.new_object("demo/Thing"))))
        .collect();
    let ids: Vec<WrapperId> = objects.iter().map(|o| export_id(&bridge, o)).collect();
    let again: Vec<WrapperId> = objects.iter().map(|o| export_id(&bridge, o)).collect();

    assert_eq!(ids, again);
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 40);
    assert_eq!(bridge.identity().len(), 40);

    drop(objects);
    assert_eq!(host.collect(), 40);
    assert_eq!(bridge.purge_identity_cache(), 40);
    assert!(bridge.identity().is_empty());
}

both_backends! {
    test_stable_wrapper_ids => stable_wrapper_ids;
    test_import_yields_original => import_yields_original;
    test_reclaimed_objects => reclaimed_objects;
    test_shared_hash_buckets => shared_hash_buckets;
}
