//! Patch handlers

use crate::pipeline::{LoadOptions, ResolvedPath, Resources};
use crate::BoxError;
use async_trait::async_trait;
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

/// Auxiliary value produced by [`Patcher::dependencies`]
pub type Aux = Box<dyn Any + Send + Sync>;

/// Everything a handler gets to know about the load in progress
pub struct PatchContext<'a> {
    pub resources: &'a Resources,
    /// Canonical host-relative path being loaded
    pub logical_path: &'a str,
    pub resolved: &'a ResolvedPath,
    pub options: &'a LoadOptions,
}

/// A patch handler for data of type `D`
///
/// `dependencies` of all handlers for one load run concurrently; `patch` calls
/// run one after the other in registry order.
#[async_trait]
pub trait Patcher<D: Send>: Send + Sync {
    async fn dependencies(&self, _ctx: &PatchContext<'_>) -> Result<Option<Aux>, BoxError> {
        Ok(None)
    }

    /// Patch `data` in place and return `None`, or return a replacement
    async fn patch(
        &self,
        data: &mut D,
        aux: Option<Aux>,
        ctx: &PatchContext<'_>,
    ) -> Result<Option<D>, BoxError>;
}

/// Unwrap the auxiliary value produced by a handler's own `dependencies`
pub fn take_aux<T: Any>(aux: Option<Aux>) -> Result<T, BoxError> {
    let aux = aux.ok_or("auxiliary data is missing")?;
    aux.downcast::<T>()
        .map(|value| *value)
        .map_err(|_| "auxiliary data has an unexpected type".into())
}

/// Handler without dependencies backed by a closure
pub struct FnPatcher<D, F> {
    func: F,
    _data: PhantomData<fn(&mut D)>,
}

impl<D, F> FnPatcher<D, F>
where
    F: Fn(&mut D) -> Result<Option<D>, BoxError>,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            _data: PhantomData,
        }
    }
}

#[async_trait]
impl<D, F> Patcher<D> for FnPatcher<D, F>
where
    D: Send + 'static,
    F: Fn(&mut D) -> Result<Option<D>, BoxError> + Send + Sync,
{
    async fn patch(
        &self,
        data: &mut D,
        _aux: Option<Aux>,
        _ctx: &PatchContext<'_>,
    ) -> Result<Option<D>, BoxError> {
        (self.func)(data)
    }
}

/// Shorthand for a shared closure handler
pub fn patch_fn<D, F>(func: F) -> Arc<dyn Patcher<D>>
where
    D: Send + 'static,
    F: Fn(&mut D) -> Result<Option<D>, BoxError> + Send + Sync + 'static,
{
    Arc::new(FnPatcher::new(func))
}
