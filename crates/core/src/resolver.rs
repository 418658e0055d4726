//! Type resolution for restore paths
//!
//! A [`TypeResolver`] maps a type name (the hint written alongside an encoded
//! object) to a [`TypeBinding`] that knows how to decode native bytes or JSON
//! text into a concrete Rust type. Several resolvers can coexist in one
//! process, each describing its own type universe (for example a redeployed
//! rule module that binds an old name to a newer type).
//!
//! ## Ambient resolution
//!
//! Restore paths that take no explicit resolver consult
//! [`TypeResolver::current()`]: the resolver installed on the calling thread
//! with [`TypeResolver::enter()`], or the process-wide
//! [`TypeResolver::global()`] when none is installed.
//!
//! ```ignore
//! let module = Arc::new(TypeResolver::new("rules-v2"));
//! module.register::<Order>();
//!
//! let _scope = TypeResolver::enter(module.clone());
//! // JSON restores on this thread now resolve through `module`.
//! ```

use crate::error::{Cause, Error, Result};
use crate::object::{Marshallable, ObjectRef};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

type NativeDecodeFn = fn(&[u8]) -> Result<ObjectRef>;
type JsonDecodeFn = fn(&str) -> Result<ObjectRef>;

fn decode_native<T>(bytes: &[u8]) -> Result<ObjectRef>
where
    T: DeserializeOwned + Marshallable,
{
    let value: T = bincode::deserialize(bytes).map_err(Error::unmarshalling)?;
    Ok(Arc::new(value))
}

fn decode_json<T>(json: &str) -> Result<ObjectRef>
where
    T: DeserializeOwned + Marshallable,
{
    let value: T = serde_json::from_str(json).map_err(Error::unmarshalling)?;
    Ok(Arc::new(value))
}

/// Decoders for one bound type.
#[derive(Clone, Copy)]
pub struct TypeBinding {
    target: &'static str,
    native: NativeDecodeFn,
    json: JsonDecodeFn,
}

impl TypeBinding {
    /// Binding that decodes into `T`.
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Marshallable,
    {
        TypeBinding {
            target: std::any::type_name::<T>(),
            native: decode_native::<T>,
            json: decode_json::<T>,
        }
    }

    /// Rust type this binding decodes into.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Decode a native (bincode) payload.
    pub fn decode_native(&self, bytes: &[u8]) -> Result<ObjectRef> {
        (self.native)(bytes)
    }

    /// Decode JSON text.
    pub fn decode_json(&self, json: &str) -> Result<ObjectRef> {
        (self.json)(json)
    }
}

impl fmt::Debug for TypeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBinding")
            .field("target", &self.target)
            .finish()
    }
}

/// Name → decoder registry for one type universe.
///
/// # Thread Safety
///
/// Bindings sit behind a `RwLock`, so a resolver can be shared through an
/// `Arc` and extended while other threads resolve through it.
pub struct TypeResolver {
    name: String,
    bindings: RwLock<FxHashMap<String, TypeBinding>>,
    parent: Option<Arc<TypeResolver>>,
}

static GLOBAL_RESOLVER: Lazy<Arc<TypeResolver>> =
    Lazy::new(|| Arc::new(TypeResolver::new("global")));

thread_local! {
    /// Resolver installed on this thread by `TypeResolver::enter`
    static CURRENT_RESOLVER: RefCell<Option<Arc<TypeResolver>>> = const { RefCell::new(None) };
}

impl TypeResolver {
    /// Create an empty resolver.
    pub fn new(name: impl Into<String>) -> Self {
        TypeResolver {
            name: name.into(),
            bindings: RwLock::new(FxHashMap::default()),
            parent: None,
        }
    }

    /// Create an empty resolver that falls back to `parent` for unknown names.
    pub fn with_parent(name: impl Into<String>, parent: Arc<TypeResolver>) -> Self {
        TypeResolver {
            parent: Some(parent),
            ..TypeResolver::new(name)
        }
    }

    /// Resolver name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `T` under its own fully-qualified type name.
    pub fn register<T>(&self) -> &Self
    where
        T: DeserializeOwned + Marshallable,
    {
        self.bind::<T>(std::any::type_name::<T>())
    }

    /// Bind an arbitrary type name to `T`.
    ///
    /// Replaces any existing binding for that name.
    pub fn bind<T>(&self, type_name: impl Into<String>) -> &Self
    where
        T: DeserializeOwned + Marshallable,
    {
        let type_name = type_name.into();
        let binding = TypeBinding::of::<T>();
        let replaced = self
            .bindings
            .write()
            .insert(type_name.clone(), binding)
            .is_some();
        debug!(
            resolver = %self.name,
            type_name = %type_name,
            target = binding.target(),
            replaced,
            "bound type"
        );
        self
    }

    /// Look up the binding for `type_name`, consulting the parent chain.
    ///
    /// # Errors
    ///
    /// Returns an unmarshalling failure if no resolver in the chain knows
    /// the name.
    pub fn resolve(&self, type_name: &str) -> Result<TypeBinding> {
        self.find(type_name).ok_or_else(|| {
            Error::unmarshalling(Cause::UnresolvedType {
                type_name: type_name.to_string(),
                resolver: self.name.clone(),
            })
        })
    }

    fn find(&self, type_name: &str) -> Option<TypeBinding> {
        if let Some(binding) = self.bindings.read().get(type_name) {
            return Some(*binding);
        }
        self.parent.as_ref().and_then(|p| p.find(type_name))
    }

    /// True if `type_name` resolves through this resolver or its parents.
    pub fn contains(&self, type_name: &str) -> bool {
        self.find(type_name).is_some()
    }

    /// Number of names bound directly on this resolver.
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// True if no names are bound directly on this resolver.
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// Names bound directly on this resolver, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// The process-wide default resolver.
    pub fn global() -> Arc<TypeResolver> {
        Arc::clone(&GLOBAL_RESOLVER)
    }

    /// The resolver in effect on the calling thread.
    ///
    /// Returns the innermost resolver installed with [`enter`](Self::enter),
    /// or the global resolver when none is installed.
    pub fn current() -> Arc<TypeResolver> {
        CURRENT_RESOLVER
            .with(|current| current.borrow().clone())
            .unwrap_or_else(TypeResolver::global)
    }

    /// Install `resolver` as the calling thread's current resolver.
    ///
    /// The previous resolver is restored when the returned guard drops.
    /// Guards must be dropped in reverse order of creation; debug builds
    /// panic when they are not.
    #[must_use = "the resolver is uninstalled as soon as the guard drops"]
    pub fn enter(resolver: Arc<TypeResolver>) -> ResolverScope {
        let installed = Arc::clone(&resolver);
        let previous = CURRENT_RESOLVER.with(|current| current.borrow_mut().replace(resolver));
        ResolverScope {
            installed,
            previous,
            _not_send: PhantomData,
        }
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeResolver")
            .field("name", &self.name)
            .field("type_names", &self.type_names())
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .finish()
    }
}

/// Guard returned by [`TypeResolver::enter`].
pub struct ResolverScope {
    installed: Arc<TypeResolver>,
    previous: Option<Arc<TypeResolver>>,
    // Tied to the thread whose thread-local it modified
    _not_send: PhantomData<*const ()>,
}

impl Drop for ResolverScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let replaced = CURRENT_RESOLVER.with(|current| current.replace(previous));
        if !std::thread::panicking() {
            debug_assert!(
                replaced.map_or(false, |r| Arc::ptr_eq(&r, &self.installed)),
                "resolver scope for '{}' dropped out of order",
                self.installed.name()
            );
        }
    }
}

impl fmt::Debug for ResolverScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverScope")
            .field("installed", &self.installed.name())
            .field("previous", &self.previous.as_ref().map(|p| p.name()))
            .finish()
    }
}
