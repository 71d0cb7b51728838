//! Hook channels for the folio build pipeline.
//!
//! A [`HookRegistry`] holds handlers per named channel. Channels come in two
//! kinds:
//!
//! - [`ReplaceChannel`]: handlers receive the current value and may return a
//!   replacement. Returning `None` keeps the value.
//! - [`MutateChannel`]: handlers edit the value in place, for example by
//!   pushing fragments onto a list.
//!
//! Handlers run in registration order, and dispatch stops at the first
//! handler that fails.
//!
//! Handlers are either Rust closures or functions from a [`LuaPlugin`].
//!
//! # Example
//!
//! ```
//! use folio_hooks::{HookRegistry, ReplaceChannel};
//!
//! const TITLE: ReplaceChannel<String> = ReplaceChannel::new("title");
//!
//! let mut registry = HookRegistry::new();
//! registry.on_replace(TITLE, "shout", |title: &String| Ok(Some(title.to_uppercase())));
//!
//! assert_eq!(registry.replace(TITLE, "intro".to_owned()).unwrap(), "INTRO");
//! ```

mod channel;
mod error;
mod lua;
mod registry;

pub use channel::{MutateChannel, ReplaceChannel};
pub use error::{BoxError, HookError, PluginError};
pub use lua::LuaPlugin;
pub use registry::HookRegistry;
