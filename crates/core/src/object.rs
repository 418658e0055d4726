//! Object model for marshalling
//!
//! Anything `Serialize + Debug + Send + Sync + 'static` is [`Marshallable`]
//! through a blanket impl. Objects travel as [`ObjectRef`], a shared handle;
//! identity is the address of the shared allocation ([`ObjectIdentity`]),
//! never value equality.

use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a marshallable object.
pub type ObjectRef = Arc<dyn Marshallable>;

/// An object that marshalling strategies can encode.
///
/// Implemented for every `T: Serialize + Debug + Send + Sync + 'static`.
/// The type name is the fully-qualified Rust path of `T`, which is what a
/// [`TypeResolver`](crate::TypeResolver) binds on the way back in.
pub trait Marshallable: Any + Send + Sync + fmt::Debug {
    /// Fully-qualified type name used as the restore hint.
    fn type_name(&self) -> &'static str;

    /// Borrow as `Any` for downcasting.
    fn as_any(&self) -> &(dyn Any + Send + Sync);

    /// Convert a shared handle into an `Any` handle for downcasting.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Deep-serialize with the native binary codec.
    fn encode_native(&self) -> bincode::Result<Vec<u8>>;

    /// Serialize to JSON text.
    fn encode_json(&self) -> serde_json::Result<String>;
}

impl<T> Marshallable for T
where
    T: Serialize + Any + Send + Sync + fmt::Debug,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn encode_native(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    fn encode_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl dyn Marshallable {
    /// Returns true if the object is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the object as a `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Wrap a value in a fresh shared handle.
///
/// Every call allocates, so two calls with equal values yield two distinct
/// identities.
pub fn object_ref<T: Marshallable>(value: T) -> ObjectRef {
    Arc::new(value)
}

/// Recover the concrete shared handle behind an [`ObjectRef`].
///
/// Returns `None` if the object is not a `T`.
pub fn downcast_object<T>(object: ObjectRef) -> Option<Arc<T>>
where
    T: Any + Send + Sync,
{
    object.into_any_arc().downcast::<T>().ok()
}

/// Reference identity of a shared object.
///
/// Two handles have the same identity iff they point at the same allocation.
/// Only meaningful while some handle keeps the allocation alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectIdentity(usize);

impl ObjectIdentity {
    /// Identity of the allocation behind `object`.
    pub fn of(object: &ObjectRef) -> Self {
        ObjectIdentity(Arc::as_ptr(object) as *const () as usize)
    }

    /// True if both handles point at the same allocation.
    pub fn same(a: &ObjectRef, b: &ObjectRef) -> bool {
        ObjectIdentity::of(a) == ObjectIdentity::of(b)
    }
}
