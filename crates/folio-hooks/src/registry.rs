//! Handler storage and dispatch.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::channel::{MutateChannel, ReplaceChannel};
use crate::error::{BoxError, HookError};

type ReplaceFn<T> = Box<dyn Fn(&T) -> Result<Option<T>, BoxError>>;
type MutateFn<T> = Box<dyn Fn(&mut T) -> Result<(), BoxError>>;

struct Registered<F> {
    origin: String,
    handler: F,
}

/// Handlers per channel, in registration order.
///
/// Channels are keyed by name and by handler type, so a replace channel and a
/// mutate channel never share a handler list even if their names collide.
#[derive(Default)]
pub struct HookRegistry {
    channels: HashMap<(&'static str, TypeId), Box<dyn HandlerSlot>>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to a replace channel.
    pub fn on_replace<T, F>(
        &mut self,
        channel: ReplaceChannel<T>,
        origin: impl Into<String>,
        handler: F,
    ) where
        T: 'static,
        F: Fn(&T) -> Result<Option<T>, BoxError> + 'static,
    {
        self.list_mut::<ReplaceFn<T>>(channel.name()).push(Registered {
            origin: origin.into(),
            handler: Box::new(handler),
        });
    }

    /// Append a handler to a mutate channel.
    pub fn on_mutate<T, F>(
        &mut self,
        channel: MutateChannel<T>,
        origin: impl Into<String>,
        handler: F,
    ) where
        T: 'static,
        F: Fn(&mut T) -> Result<(), BoxError> + 'static,
    {
        self.list_mut::<MutateFn<T>>(channel.name()).push(Registered {
            origin: origin.into(),
            handler: Box::new(handler),
        });
    }

    /// Thread `value` through every handler on the channel.
    ///
    /// A handler returning `None` leaves the current value in place. The
    /// first failing handler stops the dispatch.
    pub fn replace<T: 'static>(
        &self,
        channel: ReplaceChannel<T>,
        value: T,
    ) -> Result<T, HookError> {
        let Some(handlers) = self.list::<ReplaceFn<T>>(channel.name()) else {
            return Ok(value);
        };

        let mut current = value;
        for entry in handlers {
            let result = (entry.handler)(&current).map_err(|source| HookError {
                channel: channel.name(),
                origin: entry.origin.clone(),
                source,
            })?;
            if let Some(next) = result {
                current = next;
            }
        }
        Ok(current)
    }

    /// Run every handler on the channel against `value`.
    pub fn mutate<T: 'static>(
        &self,
        channel: MutateChannel<T>,
        value: &mut T,
    ) -> Result<(), HookError> {
        let Some(handlers) = self.list::<MutateFn<T>>(channel.name()) else {
            return Ok(());
        };

        for entry in handlers {
            (entry.handler)(value).map_err(|source| HookError {
                channel: channel.name(),
                origin: entry.origin.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Number of handlers registered under `name`, across channel kinds.
    #[must_use]
    pub fn handler_count(&self, name: &str) -> usize {
        self.channels
            .iter()
            .filter(|((channel, _), _)| *channel == name)
            .map(|(_, slot)| slot.len())
            .sum()
    }

    /// Whether no handlers are registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    fn list<F: 'static>(&self, name: &'static str) -> Option<&Vec<Registered<F>>> {
        self.channels
            .get(&(name, TypeId::of::<F>()))
            .and_then(|slot| slot.as_any().downcast_ref::<HandlerList<F>>())
            .map(|list| &list.entries)
    }

    fn list_mut<F: 'static>(&mut self, name: &'static str) -> &mut Vec<Registered<F>> {
        let slot = self
            .channels
            .entry((name, TypeId::of::<F>()))
            .or_insert_with(|| -> Box<dyn HandlerSlot> {
                Box::new(HandlerList::<F> {
                    entries: Vec::new(),
                })
            });
        &mut slot
            .as_any_mut()
            .downcast_mut::<HandlerList<F>>()
            .expect("handler list type matches its TypeId key")
            .entries
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.channels.keys().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names.dedup();
        f.debug_struct("HookRegistry").field("channels", &names).finish()
    }
}

struct HandlerList<F> {
    entries: Vec<Registered<F>>,
}

/// Type-erased handler list.
trait HandlerSlot {
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<F: 'static> HandlerSlot for HandlerList<F> {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TITLE: ReplaceChannel<String> = ReplaceChannel::new("title");
    const HEAD: MutateChannel<Vec<String>> = MutateChannel::new("head");

    #[test]
    fn test_empty_channel_is_identity() {
        let registry = HookRegistry::new();

        assert_eq!(registry.replace(TITLE, "Intro".to_owned()).unwrap(), "Intro");

        let mut head = vec!["<meta>".to_owned()];
        registry.mutate(HEAD, &mut head).unwrap();
        assert_eq!(head, vec!["<meta>"]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_replace_runs_in_registration_order() {
        let mut registry = HookRegistry::new();
        registry.on_replace(TITLE, "a", |t: &String| Ok(Some(format!("{t}-a"))));
        registry.on_replace(TITLE, "b", |t: &String| Ok(Some(format!("{t}-b"))));

        assert_eq!(registry.replace(TITLE, "x".to_owned()).unwrap(), "x-a-b");
        assert_eq!(registry.handler_count("title"), 2);
    }

    #[test]
    fn test_none_keeps_previous_value() {
        let mut registry = HookRegistry::new();
        registry.on_replace(TITLE, "upper", |t: &String| Ok(Some(t.to_uppercase())));
        registry.on_replace(TITLE, "observer", |_: &String| Ok(None));
        registry.on_replace(TITLE, "suffix", |t: &String| Ok(Some(format!("{t}!"))));

        assert_eq!(registry.replace(TITLE, "hi".to_owned()).unwrap(), "HI!");
    }

    #[test]
    fn test_mutate_accumulates() {
        let mut registry = HookRegistry::new();
        registry.on_mutate(HEAD, "one", |head: &mut Vec<String>| {
            head.push("<link a>".to_owned());
            Ok(())
        });
        registry.on_mutate(HEAD, "two", |head: &mut Vec<String>| {
            head.push("<link b>".to_owned());
            Ok(())
        });

        let mut head = Vec::new();
        registry.mutate(HEAD, &mut head).unwrap();

        assert_eq!(head, vec!["<link a>", "<link b>"]);
    }

    #[test]
    fn test_failing_handler_stops_dispatch() {
        let mut registry = HookRegistry::new();
        registry.on_replace(TITLE, "plugins/bad.lua", |_: &String| Err("boom".into()));
        registry.on_replace(TITLE, "never", |_: &String| Ok(Some("unreachable".to_owned())));

        let err = registry.replace(TITLE, "x".to_owned()).unwrap_err();

        assert_eq!(err.channel, "title");
        assert_eq!(err.origin, "plugins/bad.lua");
        assert_eq!(err.to_string(), "title hook from plugins/bad.lua failed: boom");
    }

    #[test]
    fn test_same_name_different_kinds_are_separate() {
        const TITLE_LIST: MutateChannel<Vec<String>> = MutateChannel::new("title");
        let mut registry = HookRegistry::new();
        registry.on_replace(TITLE, "a", |_: &String| Ok(None));
        registry.on_mutate(TITLE_LIST, "b", |list: &mut Vec<String>| {
            list.clear();
            Ok(())
        });

        assert_eq!(registry.handler_count("title"), 2);
        assert_eq!(registry.replace(TITLE, "kept".to_owned()).unwrap(), "kept");
    }
}
