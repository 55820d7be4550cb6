//! Typed hook declarations.
//!
//! A subsystem that wants to be extensible declares a [`HookInfo<C>`] for
//! the concrete callback type `C` it accepts, and hands it to the plugin
//! manager. The manager stores it type-erased as a [`Hook`] and checks
//! every incoming [`Callback`] against `C` before calling the subsystem's
//! register functions.

use std::any::{Any, type_name};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::callbacks::Callback;
use crate::error::PluginError;

/// Async registration capability invoked during the dynamic pass.
///
/// Arguments are `(callback, hook_name, plugin_name)`; the return value
/// reports whether the consumer accepted the callback.
pub type RegisterFn<C> = Arc<dyn Fn(C, &str, &str) -> BoxFuture<'static, bool> + Send + Sync>;

/// Synchronous registration capability invoked during the static pass.
pub type StaticRegisterFn<C> = Arc<dyn Fn(C, &str, &str) -> bool + Send + Sync>;

/// Declaration of a named extension point accepting callbacks of type `C`.
pub struct HookInfo<C> {
    /// Unique hook name.
    hook_name: String,
    /// Dynamic-pass registration.
    register: RegisterFn<C>,
    /// Static-pass registration, if the hook distinguishes the two.
    static_register: Option<StaticRegisterFn<C>>,
}

impl<C> HookInfo<C>
where
    C: Any + Send + Sync,
{
    /// Declares a hook with its dynamic-pass register function.
    pub fn new<F, Fut>(hook_name: impl Into<String>, register: F) -> Self
    where
        F: Fn(C, &str, &str) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self {
            hook_name: hook_name.into(),
            register: Arc::new(
                move |callback: C, hook: &str, plugin: &str| -> BoxFuture<'static, bool> {
                    Box::pin(register(callback, hook, plugin))
                },
            ),
            static_register: None,
        }
    }

    /// Adds a static-pass register function.
    ///
    /// Without one, the static pass falls back to the dynamic register
    /// function.
    pub fn with_static_register<F>(mut self, static_register: F) -> Self
    where
        F: Fn(C, &str, &str) -> bool + Send + Sync + 'static,
    {
        self.static_register = Some(Arc::new(static_register));
        self
    }

    /// Returns the hook name.
    pub fn hook_name(&self) -> &str {
        &self.hook_name
    }

    pub(crate) fn into_hook(self) -> Hook {
        Hook {
            inner: Box::new(self),
        }
    }
}

impl<C> fmt::Debug for HookInfo<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookInfo")
            .field("hook_name", &self.hook_name)
            .field("callback_type", &type_name::<C>())
            .field("static_register", &self.static_register.is_some())
            .finish()
    }
}

/// Registration outcome for a callback that reached its hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Accepted,
    Rejected,
}

impl From<bool> for Delivery {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }
}

#[async_trait]
trait ErasedHook: Send + Sync {
    fn name(&self) -> &str;

    fn callback_type(&self) -> &'static str;

    fn has_static_register(&self) -> bool;

    async fn register(&self, callback: Callback, plugin_name: &str) -> Result<bool, Callback>;

    async fn static_register(&self, callback: Callback, plugin_name: &str)
    -> Result<bool, Callback>;
}

#[async_trait]
impl<C> ErasedHook for HookInfo<C>
where
    C: Any + Send + Sync,
{
    fn name(&self) -> &str {
        &self.hook_name
    }

    fn callback_type(&self) -> &'static str {
        type_name::<C>()
    }

    fn has_static_register(&self) -> bool {
        self.static_register.is_some()
    }

    async fn register(&self, callback: Callback, plugin_name: &str) -> Result<bool, Callback> {
        let callback = callback.downcast::<C>()?;
        Ok((self.register)(callback, &self.hook_name, plugin_name).await)
    }

    async fn static_register(
        &self,
        callback: Callback,
        plugin_name: &str,
    ) -> Result<bool, Callback> {
        let callback = callback.downcast::<C>()?;
        match &self.static_register {
            Some(static_register) => Ok(static_register(callback, &self.hook_name, plugin_name)),
            None => Ok((self.register)(callback, &self.hook_name, plugin_name).await),
        }
    }
}

/// A declared hook, type-erased so hooks of different callback types can
/// share one table.
pub struct Hook {
    inner: Box<dyn ErasedHook>,
}

impl Hook {
    /// Returns the hook name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Returns the name of the callback type this hook accepts.
    pub fn callback_type(&self) -> &'static str {
        self.inner.callback_type()
    }

    /// Returns `true` if the hook has a dedicated static-pass register.
    pub fn has_static_register(&self) -> bool {
        self.inner.has_static_register()
    }

    /// Delivers a callback through the dynamic-pass register function.
    pub(crate) async fn register(
        &self,
        label: &str,
        callback: Callback,
        plugin_name: &str,
    ) -> Result<Delivery, PluginError> {
        self.inner
            .register(callback, plugin_name)
            .await
            .map(Delivery::from)
            .map_err(|callback| self.mismatch(label, &callback, plugin_name))
    }

    /// Delivers a callback through the static-pass register function,
    /// falling back to the dynamic one.
    pub(crate) async fn static_register(
        &self,
        label: &str,
        callback: Callback,
        plugin_name: &str,
    ) -> Result<Delivery, PluginError> {
        self.inner
            .static_register(callback, plugin_name)
            .await
            .map(Delivery::from)
            .map_err(|callback| self.mismatch(label, &callback, plugin_name))
    }

    fn mismatch(&self, label: &str, callback: &Callback, plugin_name: &str) -> PluginError {
        PluginError::CallbackTypeMismatch {
            hook: self.name().to_string(),
            plugin: plugin_name.to_string(),
            label: label.to_string(),
            expected: self.callback_type(),
            found: callback.type_name(),
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name())
            .field("callback_type", &self.callback_type())
            .field("static_register", &self.has_static_register())
            .finish()
    }
}
