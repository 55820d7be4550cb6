//! Callback values contributed by plugins.
//!
//! A plugin describes what it wants to hook into as a [`Callbacks`] set: an
//! ordered mapping from a local label to a [`CallbackEntry`] carrying a
//! type-erased [`Callback`] and the name of its target hook. The label is
//! only used for disambiguation and logging.
//!
//! Callback sets are built fresh every time a plugin is asked for them, so
//! two sets never share callback instances.

use std::any::{Any, type_name};
use std::fmt;

/// A type-erased callback destined for a hook.
///
/// The concrete type must match the callback type the target hook was
/// declared with; the registry checks this when wiring.
pub struct Callback {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Callback {
    /// Wraps a concrete callback value.
    pub fn new<C>(callback: C) -> Self
    where
        C: Any + Send + Sync,
    {
        Self {
            value: Box::new(callback),
            type_name: type_name::<C>(),
        }
    }

    /// Returns the name of the wrapped concrete type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped value is a `C`.
    pub fn is<C: Any>(&self) -> bool {
        self.value.is::<C>()
    }

    /// Recovers the concrete callback, or returns `self` unchanged when the
    /// type does not match.
    pub fn downcast<C: Any>(self) -> Result<C, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<C>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, type_name }),
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A callback paired with the hook it targets.
#[derive(Debug)]
pub struct CallbackEntry {
    /// The callback value.
    pub callback: Callback,
    /// Name of the hook this callback is registered into.
    pub hook_name: String,
}

/// Ordered set of labelled callback entries produced by a plugin.
#[derive(Debug, Default)]
pub struct Callbacks {
    entries: Vec<(String, CallbackEntry)>,
}

impl Callbacks {
    /// Creates an empty callback set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, builder style. See [`Callbacks::insert`].
    pub fn with(mut self, label: impl Into<String>, hook_name: impl Into<String>, callback: Callback) -> Self {
        self.insert(label, hook_name, callback);
        self
    }

    /// Adds an entry under `label`.
    ///
    /// Re-using a label replaces the earlier entry in place, keeping its
    /// position.
    pub fn insert(
        &mut self,
        label: impl Into<String>,
        hook_name: impl Into<String>,
        callback: Callback,
    ) {
        let label = label.into();
        let entry = CallbackEntry {
            callback,
            hook_name: hook_name.into(),
        };

        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((label, entry)),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Looks up an entry by label.
    pub fn get(&self, label: &str) -> Option<&CallbackEntry> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, entry)| entry)
    }
}

impl IntoIterator for Callbacks {
    type Item = (String, CallbackEntry);
    type IntoIter = std::vec::IntoIter<(String, CallbackEntry)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
