//! Simulated host runtime
//!
//! A small object heap with local, global and weak reference tables, a class
//! and method registry, pending exceptions and a mark-sweep collector.
//! Reference counts are exposed so tests can assert that the bridge releases
//! everything it acquires.
//!
//! Built-in classes: `java/lang/Object`, `java/lang/String`, the eight boxed
//! primitive classes (`valueOf` and the `xxxValue` accessors),
//! `java/lang/RuntimeException`, the native object wrapper class and the
//! script callback interface.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use jvbridge_sdk::{
    ClassId, HostError, HostResult, HostRuntime, MethodId, PinId, PrimitiveBuffer, PrimitiveKind,
    RawRef, RawValue, Receiver, ReleaseMode, ThrowableInfo,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Binary name of the native object wrapper class
pub const WRAPPER_CLASS: &str = "jvbridge/JavaObjectWrapper";

/// Binary name of the script callback interface
pub const CALLBACK_INTERFACE: &str = "jvbridge/ScriptFunction";

/// Exception raised by a simulated method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thrown {
    /// Binary class name of the exception
    pub class: String,
    /// Exception message
    pub message: String,
}

impl Thrown {
    /// Build an exception
    pub fn new(class: &str, message: &str) -> Self {
        Self {
            class: class.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result of a simulated method
pub type MethodResult = Result<RawValue, Thrown>;

/// Implementation of a simulated method. Object results must be new local
/// references.
pub type NativeMethod = Rc<dyn Fn(&SimHost, Receiver, &[RawValue]) -> MethodResult>;

type ObjId = u64;

#[derive(Debug, Clone)]
enum HeapData {
    Plain,
    String(String),
    Boxed(RawValue),
    PrimitiveArray(PrimitiveBuffer),
    ObjectArray(Vec<Option<ObjId>>),
    Throwable(String),
    CallbackProxy(PinId),
    Wrapper(Option<ObjId>),
}

#[derive(Debug, Clone)]
struct HeapObject {
    class_name: String,
    data: HeapData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefKind {
    Local,
    Global,
    Weak,
}

#[derive(Debug, Clone, Copy)]
struct RefEntry {
    kind: RefKind,
    target: Option<ObjId>,
}

struct MethodDef {
    class: ClassId,
    name: String,
    signature: String,
    is_static: bool,
    body: NativeMethod,
}

#[derive(Default)]
struct HostState {
    objects: FxHashMap<ObjId, HeapObject>,
    next_object: ObjId,
    refs: FxHashMap<u64, RefEntry>,
    next_ref: u64,
    classes: Vec<String>,
    class_index: FxHashMap<String, ClassId>,
    methods: Vec<MethodDef>,
    pending: Option<ObjId>,
    outstanding_elements: usize,
    misuse: usize,
}

impl HostState {
    fn alloc(&mut self, class_name: &str, data: HeapData) -> ObjId {
        self.next_object += 1;
        let id = self.next_object;
        self.objects.insert(
            id,
            HeapObject {
                class_name: class_name.to_string(),
                data,
            },
        );
        id
    }

    fn new_ref(&mut self, kind: RefKind, target: ObjId) -> RawRef {
        self.next_ref += 1;
        self.refs.insert(
            self.next_ref,
            RefEntry {
                kind,
                target: Some(target),
            },
        );
        match RawRef::from_bits(self.next_ref) {
            Some(raw) => raw,
            None => unreachable!("reference ids start at 1"),
        }
    }

    fn target(&self, raw: RawRef) -> Option<ObjId> {
        self.refs.get(&raw.to_bits()).and_then(|entry| entry.target)
    }

    fn object(&self, raw: RawRef) -> HostResult<&HeapObject> {
        self.target(raw)
            .and_then(|id| self.objects.get(&id))
            .ok_or_else(|| HostError::InvalidReference(format!("{:?}", raw)))
    }

    fn object_mut(&mut self, raw: RawRef) -> HostResult<&mut HeapObject> {
        let id = self
            .target(raw)
            .ok_or_else(|| HostError::InvalidReference(format!("{:?}", raw)))?;
        self.objects
            .get_mut(&id)
            .ok_or_else(|| HostError::InvalidReference(format!("{:?}", raw)))
    }

    fn delete_ref(&mut self, raw: RawRef, kind: RefKind) {
        let found = self.refs.get(&raw.to_bits()).map(|entry| entry.kind);
        match found {
            Some(actual) if actual == kind => {
                self.refs.remove(&raw.to_bits());
            }
            Some(actual) => {
                tracing::warn!(?raw, expected = ?kind, ?actual, "reference kind mismatch");
                self.misuse += 1;
            }
            None => {
                tracing::warn!(?raw, ?kind, "delete of unknown reference");
                self.misuse += 1;
            }
        }
    }

    fn intern_class(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_index.get(name) {
            return *id;
        }
        let id = ClassId(self.classes.len() as u64);
        self.classes.push(name.to_string());
        self.class_index.insert(name.to_string(), id);
        id
    }

    fn class_name(&self, class: ClassId) -> String {
        self.classes
            .get(class.0 as usize)
            .cloned()
            .unwrap_or_default()
    }
}

/// In-memory [`HostRuntime`]
pub struct SimHost {
    state: RefCell<HostState>,
    fail_array_elements: Cell<bool>,
}

impl SimHost {
    /// Create a host with the built-in classes
    pub fn new() -> Self {
        let host = Self {
            state: RefCell::new(HostState::default()),
            fail_array_elements: Cell::new(false),
        };
        host.install_builtins();
        host
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Register a class (idempotent)
    pub fn define_class(&self, name: &str) -> ClassId {
        self.state.borrow_mut().intern_class(name)
    }

    /// Register a method on `class`, defining the class if needed
    pub fn define_method(
        &self,
        class: &str,
        name: &str,
        signature: &str,
        is_static: bool,
        body: impl Fn(&SimHost, Receiver, &[RawValue]) -> MethodResult + 'static,
    ) -> MethodId {
        let mut state = self.state.borrow_mut();
        let class = state.intern_class(class);
        state.methods.push(MethodDef {
            class,
            name: name.to_string(),
            signature: signature.to_string(),
            is_static,
            body: Rc::new(body),
        });
        MethodId(state.methods.len() as u64 - 1)
    }

    fn install_builtins(&self) {
        self.define_class("java/lang/Object");
        self.define_class("java/lang/String");
        self.define_class("java/lang/Throwable");
        self.define_class("java/lang/RuntimeException");
        self.define_class(CALLBACK_INTERFACE);

        for kind in PrimitiveKind::ALL {
            self.define_method(kind.boxed_class(), "valueOf", &kind.box_signature(), true, move |host, _, args| {
                match args.first() {
                    Some(v) if v.kind() == Some(kind) => Ok(RawValue::Object(Some(host.new_boxed(*v)))),
                    _ => Err(Thrown::new("java/lang/IllegalArgumentException", "valueOf argument")),
                }
            });
            self.define_method(kind.boxed_class(), kind.unbox_method(), &kind.unbox_signature(), false, move |host, receiver, _| {
                match receiver {
                    Receiver::Instance(obj) => host
                        .boxed_value(obj)
                        .filter(|v| v.kind() == Some(kind))
                        .ok_or_else(|| Thrown::new("java/lang/ClassCastException", kind.boxed_class())),
                    Receiver::Static(_) => Err(Thrown::new("java/lang/IllegalStateException", "no receiver")),
                }
            });
        }

        let factory_signature = format!("(Ljava/lang/Object;)L{};", WRAPPER_CLASS);
        self.define_method(WRAPPER_CLASS, "fromJavaObject", &factory_signature, true, |host, _, args| {
            let inner = args.first().and_then(RawValue::as_object).flatten();
            Ok(RawValue::Object(Some(host.new_wrapper(inner))))
        });
        self.define_method(WRAPPER_CLASS, "extractJavaObject", "()Ljava/lang/Object;", false, |host, receiver, _| {
            match receiver {
                Receiver::Instance(obj) => Ok(RawValue::Object(host.wrapper_inner(obj))),
                Receiver::Static(_) => Err(Thrown::new("java/lang/IllegalStateException", "no receiver")),
            }
        });
    }

    /// Make every subsequent element-buffer acquisition fail
    pub fn set_fail_array_elements(&self, fail: bool) {
        self.fail_array_elements.set(fail);
    }

    // ========================================================================
    // Object helpers
    // ========================================================================

    /// Allocate a plain object of `class` (new local reference)
    pub fn new_object(&self, class: &str) -> RawRef {
        let mut state = self.state.borrow_mut();
        state.intern_class(class);
        let id = state.alloc(class, HeapData::Plain);
        state.new_ref(RefKind::Local, id)
    }

    /// Allocate a boxed primitive (new local reference)
    pub fn new_boxed(&self, value: RawValue) -> RawRef {
        let class = value
            .kind()
            .map_or("java/lang/Object", PrimitiveKind::boxed_class);
        let mut state = self.state.borrow_mut();
        let id = state.alloc(class, HeapData::Boxed(value));
        state.new_ref(RefKind::Local, id)
    }

    /// Primitive value of a boxed object
    pub fn boxed_value(&self, obj: RawRef) -> Option<RawValue> {
        match self.state.borrow().object(obj).ok()?.data {
            HeapData::Boxed(v) => Some(v),
            _ => None,
        }
    }

    /// Allocate a native object wrapper (new local reference)
    pub fn new_wrapper(&self, inner: Option<RawRef>) -> RawRef {
        let mut state = self.state.borrow_mut();
        let inner = inner.and_then(|r| state.target(r));
        let id = state.alloc(WRAPPER_CLASS, HeapData::Wrapper(inner));
        state.new_ref(RefKind::Local, id)
    }

    /// Object wrapped by a native object wrapper (new local reference)
    pub fn wrapper_inner(&self, wrapper: RawRef) -> Option<RawRef> {
        let mut state = self.state.borrow_mut();
        let inner = match state.object(wrapper).ok()?.data {
            HeapData::Wrapper(inner) => inner?,
            _ => return None,
        };
        Some(state.new_ref(RefKind::Local, inner))
    }

    /// Allocate a primitive array with the given contents (new local reference)
    pub fn new_array_from(&self, elements: PrimitiveBuffer) -> RawRef {
        let class = elements.kind().array_class();
        let mut state = self.state.borrow_mut();
        let id = state.alloc(&class, HeapData::PrimitiveArray(elements));
        state.new_ref(RefKind::Local, id)
    }

    /// Contents of a primitive array
    pub fn array_contents(&self, array: RawRef) -> Option<PrimitiveBuffer> {
        match &self.state.borrow().object(array).ok()?.data {
            HeapData::PrimitiveArray(buffer) => Some(buffer.clone()),
            _ => None,
        }
    }

    /// Allocate an object array holding `elements` (new local reference)
    pub fn new_object_array_from(&self, element_class: &str, elements: &[Option<RawRef>]) -> RawRef {
        let mut state = self.state.borrow_mut();
        let targets: Vec<Option<ObjId>> = elements
            .iter()
            .map(|e| e.and_then(|r| state.target(r)))
            .collect();
        let class = array_class_of(element_class);
        let id = state.alloc(&class, HeapData::ObjectArray(targets));
        state.new_ref(RefKind::Local, id)
    }

    /// Class of a pending exception, if any
    pub fn pending_exception(&self) -> Option<ThrowableInfo> {
        let state = self.state.borrow();
        let id = state.pending?;
        let obj = state.objects.get(&id)?;
        Some(describe(obj))
    }

    // ========================================================================
    // Accounting
    // ========================================================================

    /// Live local references
    pub fn local_ref_count(&self) -> usize {
        self.ref_count(RefKind::Local)
    }

    /// Live global references
    pub fn global_ref_count(&self) -> usize {
        self.ref_count(RefKind::Global)
    }

    /// Live weak references
    pub fn weak_ref_count(&self) -> usize {
        self.ref_count(RefKind::Weak)
    }

    /// Heap objects
    pub fn object_count(&self) -> usize {
        self.state.borrow().objects.len()
    }

    /// Element buffers acquired but not yet released
    pub fn outstanding_array_elements(&self) -> usize {
        self.state.borrow().outstanding_elements
    }

    /// Deletes of unknown references or with the wrong kind
    pub fn misuse_count(&self) -> usize {
        self.state.borrow().misuse
    }

    fn ref_count(&self, kind: RefKind) -> usize {
        self.state
            .borrow()
            .refs
            .values()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    /// Collect every object unreachable from local and global references and
    /// the pending exception; clears weak references to collected objects.
    /// Returns the number of collected objects.
    pub fn collect(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let mut marked: FxHashSet<ObjId> = FxHashSet::default();
        let mut work: Vec<ObjId> = state
            .refs
            .values()
            .filter(|entry| entry.kind != RefKind::Weak)
            .filter_map(|entry| entry.target)
            .chain(state.pending)
            .collect();

        while let Some(id) = work.pop() {
            if !marked.insert(id) {
                continue;
            }
            match state.objects.get(&id).map(|obj| &obj.data) {
                Some(HeapData::ObjectArray(elements)) => work.extend(elements.iter().flatten()),
                Some(HeapData::Wrapper(Some(inner))) => work.push(*inner),
                _ => {}
            }
        }

        let before = state.objects.len();
        state.objects.retain(|id, _| marked.contains(id));
        for entry in state.refs.values_mut() {
            if entry.target.is_some_and(|id| !marked.contains(&id)) {
                entry.target = None;
            }
        }
        let collected = before - state.objects.len();
        tracing::debug!(collected, "collected host heap");
        collected
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    fn invoke(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> Option<RawValue> {
        let body = {
            let state = self.state.borrow();
            state.methods.get(method.0 as usize).map(|m| m.body.clone())
        };
        let Some(body) = body else {
            self.raise(Thrown::new("java/lang/NoSuchMethodError", &format!("method {}", method.0)));
            return None;
        };
        match body(self, receiver, args) {
            Ok(value) => Some(value),
            Err(thrown) => {
                self.raise(thrown);
                None
            }
        }
    }

    fn raise(&self, thrown: Thrown) {
        let mut state = self.state.borrow_mut();
        state.intern_class(&thrown.class);
        let id = state.alloc(&thrown.class, HeapData::Throwable(thrown.message));
        state.pending = Some(id);
    }

    fn lookup_method(&self, class: ClassId, name: &str, signature: &str, is_static: bool) -> HostResult<MethodId> {
        let state = self.state.borrow();
        state
            .methods
            .iter()
            .position(|m| m.class == class && m.name == name && m.signature == signature && m.is_static == is_static)
            .map(|i| MethodId(i as u64))
            .ok_or_else(|| HostError::NoSuchMethod {
                class: state.class_name(class),
                name: name.to_string(),
                signature: signature.to_string(),
            })
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(obj: &HeapObject) -> ThrowableInfo {
    let message = match &obj.data {
        HeapData::Throwable(message) => message.clone(),
        _ => String::new(),
    };
    ThrowableInfo {
        class_name: obj.class_name.clone(),
        message,
    }
}

fn array_class_of(element_class: &str) -> String {
    if element_class.starts_with('[') {
        format!("[{}", element_class)
    } else {
        format!("[L{};", element_class)
    }
}

impl HostRuntime for SimHost {
    fn new_local_ref(&self, obj: RawRef) -> Option<RawRef> {
        let mut state = self.state.borrow_mut();
        let target = state.target(obj)?;
        Some(state.new_ref(RefKind::Local, target))
    }

    fn delete_local_ref(&self, obj: RawRef) {
        self.state.borrow_mut().delete_ref(obj, RefKind::Local);
    }

    fn new_global_ref(&self, obj: RawRef) -> Option<RawRef> {
        let mut state = self.state.borrow_mut();
        let target = state.target(obj)?;
        Some(state.new_ref(RefKind::Global, target))
    }

    fn delete_global_ref(&self, obj: RawRef) {
        self.state.borrow_mut().delete_ref(obj, RefKind::Global);
    }

    fn new_weak_ref(&self, obj: RawRef) -> Option<RawRef> {
        let mut state = self.state.borrow_mut();
        let target = state.target(obj)?;
        Some(state.new_ref(RefKind::Weak, target))
    }

    fn delete_weak_ref(&self, obj: RawRef) {
        self.state.borrow_mut().delete_ref(obj, RefKind::Weak);
    }

    fn is_same_object(&self, a: Option<RawRef>, b: Option<RawRef>) -> bool {
        let state = self.state.borrow();
        a.and_then(|r| state.target(r)) == b.and_then(|r| state.target(r))
    }

    fn identity_hash(&self, obj: RawRef) -> i32 {
        // Few buckets so that lookups regularly confirm across collisions
        self.state
            .borrow()
            .target(obj)
            .map_or(0, |id| (id % 8) as i32)
    }

    fn find_class(&self, name: &str) -> HostResult<ClassId> {
        self.state
            .borrow()
            .class_index
            .get(name)
            .copied()
            .ok_or_else(|| HostError::ClassNotFound(name.to_string()))
    }

    fn class_name(&self, obj: RawRef) -> HostResult<String> {
        Ok(self.state.borrow().object(obj)?.class_name.clone())
    }

    fn method_id(&self, class: ClassId, name: &str, signature: &str) -> HostResult<MethodId> {
        self.lookup_method(class, name, signature, false)
    }

    fn static_method_id(&self, class: ClassId, name: &str, signature: &str) -> HostResult<MethodId> {
        self.lookup_method(class, name, signature, true)
    }

    fn call_void_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) {
        self.invoke(receiver, method, args);
    }

    fn call_boolean_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> bool {
        self.invoke(receiver, method, args)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn call_byte_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> i8 {
        self.invoke(receiver, method, args)
            .and_then(|v| v.as_i8())
            .unwrap_or(0)
    }

    fn call_char_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> u16 {
        self.invoke(receiver, method, args)
            .and_then(|v| v.as_u16())
            .unwrap_or(0)
    }

    fn call_short_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> i16 {
        self.invoke(receiver, method, args)
            .and_then(|v| v.as_i16())
            .unwrap_or(0)
    }

    fn call_int_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> i32 {
        self.invoke(receiver, method, args)
            .and_then(|v| v.as_i32())
            .unwrap_or(0)
    }

    fn call_long_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> i64 {
        self.invoke(receiver, method, args)
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    fn call_float_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> f32 {
        self.invoke(receiver, method, args)
            .and_then(|v| v.as_f32())
            .unwrap_or(0.0)
    }

    fn call_double_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> f64 {
        self.invoke(receiver, method, args)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn call_object_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> Option<RawRef> {
        self.invoke(receiver, method, args)
            .and_then(|v| v.as_object())
            .flatten()
    }

    fn exception_check(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    fn exception_occurred(&self) -> Option<RawRef> {
        let mut state = self.state.borrow_mut();
        let id = state.pending?;
        Some(state.new_ref(RefKind::Local, id))
    }

    fn exception_clear(&self) {
        self.state.borrow_mut().pending = None;
    }

    fn describe_throwable(&self, throwable: RawRef) -> ThrowableInfo {
        match self.state.borrow().object(throwable) {
            Ok(obj) => describe(obj),
            Err(_) => ThrowableInfo {
                class_name: "java/lang/Throwable".to_string(),
                message: String::new(),
            },
        }
    }

    fn throw_new(&self, class: ClassId, message: &str) -> HostResult<()> {
        let name = self.state.borrow().class_name(class);
        if name.is_empty() {
            return Err(HostError::ClassNotFound(format!("class id {}", class.0)));
        }
        self.raise(Thrown::new(&name, message));
        Ok(())
    }

    fn new_string(&self, s: &str) -> HostResult<RawRef> {
        let mut state = self.state.borrow_mut();
        let id = state.alloc("java/lang/String", HeapData::String(s.to_string()));
        Ok(state.new_ref(RefKind::Local, id))
    }

    fn string_chars(&self, s: RawRef) -> HostResult<String> {
        match &self.state.borrow().object(s)?.data {
            HeapData::String(text) => Ok(text.clone()),
            _ => Err(HostError::InvalidReference("not a string".to_string())),
        }
    }

    fn array_length(&self, array: RawRef) -> HostResult<usize> {
        match &self.state.borrow().object(array)?.data {
            HeapData::PrimitiveArray(buffer) => Ok(buffer.len()),
            HeapData::ObjectArray(elements) => Ok(elements.len()),
            _ => Err(HostError::InvalidReference("not an array".to_string())),
        }
    }

    fn new_primitive_array(&self, kind: PrimitiveKind, len: usize) -> HostResult<RawRef> {
        Ok(self.new_array_from(PrimitiveBuffer::zeroed(kind, len)))
    }

    fn get_array_elements(&self, array: RawRef, kind: PrimitiveKind) -> HostResult<PrimitiveBuffer> {
        if self.fail_array_elements.get() {
            return Err(HostError::OutOfMemory("element buffer".to_string()));
        }
        let mut state = self.state.borrow_mut();
        let buffer = match &state.object(array)?.data {
            HeapData::PrimitiveArray(buffer) if buffer.kind() == kind => buffer.clone(),
            _ => return Err(HostError::InvalidReference(format!("not a {} array", kind))),
        };
        state.outstanding_elements += 1;
        Ok(buffer)
    }

    fn release_array_elements(&self, array: RawRef, elements: PrimitiveBuffer, mode: ReleaseMode) {
        let mut state = self.state.borrow_mut();
        state.outstanding_elements = state.outstanding_elements.saturating_sub(1);
        if mode == ReleaseMode::Commit {
            if let Ok(obj) = state.object_mut(array) {
                obj.data = HeapData::PrimitiveArray(elements);
            }
        }
    }

    fn new_object_array(&self, len: usize, element_class: ClassId) -> HostResult<RawRef> {
        let mut state = self.state.borrow_mut();
        let class = array_class_of(&state.class_name(element_class));
        let id = state.alloc(&class, HeapData::ObjectArray(vec![None; len]));
        Ok(state.new_ref(RefKind::Local, id))
    }

    fn object_array_element(&self, array: RawRef, index: usize) -> HostResult<Option<RawRef>> {
        let mut state = self.state.borrow_mut();
        let element = match &state.object(array)?.data {
            HeapData::ObjectArray(elements) => elements
                .get(index)
                .copied()
                .ok_or_else(|| HostError::Other(format!("index {} out of bounds", index)))?,
            _ => return Err(HostError::InvalidReference("not an object array".to_string())),
        };
        Ok(element.map(|id| state.new_ref(RefKind::Local, id)))
    }

    fn set_object_array_element(&self, array: RawRef, index: usize, value: Option<RawRef>) -> HostResult<()> {
        let mut state = self.state.borrow_mut();
        let target = value.and_then(|r| state.target(r));
        match &mut state.object_mut(array)?.data {
            HeapData::ObjectArray(elements) if index < elements.len() => {
                elements[index] = target;
                Ok(())
            }
            _ => Err(HostError::InvalidReference("not an object array".to_string())),
        }
    }

    fn new_callback_proxy(&self, interface: ClassId, callback: PinId) -> HostResult<RawRef> {
        let mut state = self.state.borrow_mut();
        let class = state.class_name(interface);
        let id = state.alloc(&class, HeapData::CallbackProxy(callback));
        Ok(state.new_ref(RefKind::Local, id))
    }

    fn callback_of(&self, obj: RawRef) -> Option<PinId> {
        match self.state.borrow().object(obj).ok()?.data {
            HeapData::CallbackProxy(pin) => Some(pin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_refs_are_counted() {
        let host = SimHost::new();
        let s = host.new_string("hi").unwrap();
        assert_eq!(host.local_ref_count(), 1);
        let copy = host.new_local_ref(s).unwrap();
        assert!(host.is_same_object(Some(s), Some(copy)));
        host.delete_local_ref(s);
        host.delete_local_ref(copy);
        assert_eq!(host.local_ref_count(), 0);
        assert_eq!(host.misuse_count(), 0);
    }

    #[test]
    fn test_collect_clears_weak_refs() {
        let host = SimHost::new();
        let obj = host.new_object("demo/Thing");
        let weak = host.new_weak_ref(obj).unwrap();
        assert_eq!(host.collect(), 0);
        host.delete_local_ref(obj);
        assert_eq!(host.collect(), 1);
        assert!(host.is_same_object(Some(weak), None));
        assert!(host.new_local_ref(weak).is_none());
    }

    #[test]
    fn test_boxing_builtins() {
        let host = SimHost::new();
        let class = host.find_class("java/lang/Integer").unwrap();
        let value_of = host.static_method_id(class, "valueOf", "(I)Ljava/lang/Integer;").unwrap();
        let boxed = host
            .call_object_method(Receiver::Static(class), value_of, &[RawValue::Int(7)])
            .unwrap();
        let int_value = host.method_id(class, "intValue", "()I").unwrap();
        assert_eq!(host.call_int_method(Receiver::Instance(boxed), int_value, &[]), 7);
        assert_eq!(host.class_name(boxed).unwrap(), "java/lang/Integer");
    }

    #[test]
    fn test_thrown_exception_is_pending() {
        let host = SimHost::new();
        let m = host.define_method("demo/Fail", "boom", "()V", true, |_, _, _| {
            Err(Thrown::new("java/lang/IllegalStateException", "boom"))
        });
        let class = host.find_class("demo/Fail").unwrap();
        host.call_void_method(Receiver::Static(class), m, &[]);
        assert!(host.exception_check());
        let info = host.pending_exception().unwrap();
        assert_eq!(info.class_name, "java/lang/IllegalStateException");
        host.exception_clear();
        assert!(!host.exception_check());
    }
}
