//! Lua (Luau) plugins.
//!
//! A plugin is a script that registers handlers through the `folio` global:
//!
//! ```lua
//! folio.hook("page", function(page)
//!   page.title = page.title .. " | Docs"
//!   return page
//! end)
//!
//! folio.hook("head", function(tags)
//!   table.insert(tags, '<meta name="generator" content="folio">')
//! end)
//! ```
//!
//! Each plugin runs in its own Lua state. Values cross into Lua through
//! `mlua`'s serde support and are deserialized back after each call.

use std::path::Path;
use std::rc::Rc;

use mlua::{Function, Lua, LuaSerdeExt, SerializeOptions, Table, Value};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::channel::{MutateChannel, ReplaceChannel};
use crate::error::{BoxError, PluginError};
use crate::registry::HookRegistry;

const PRELUDE: &str = r#"
folio = { _hooks = {}, _channels = {} }

function folio.hook(name, handler)
    if type(name) ~= "string" then
        error("hook name must be a string", 2)
    end
    if type(handler) ~= "function" then
        error("hook handler for '" .. name .. "' must be a function", 2)
    end
    if not folio._channels[name] then
        error("unknown hook channel '" .. name .. "'", 2)
    end
    local list = folio._hooks[name]
    if list == nil then
        list = {}
        folio._hooks[name] = list
    end
    table.insert(list, handler)
end
"#;

/// A loaded plugin script.
pub struct LuaPlugin {
    name: String,
    lua: Rc<Lua>,
}

impl LuaPlugin {
    /// Read and run the script at `path`.
    ///
    /// `channels` lists the hook names the script may register against;
    /// registering any other name fails the load.
    pub fn load(path: &Path, channels: &[&str]) -> Result<Self, PluginError> {
        let source = std::fs::read_to_string(path).map_err(|source| PluginError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&path.display().to_string(), &source, channels)
    }

    /// Run a script from memory, naming it `name` in errors and logs.
    pub fn from_source(name: &str, source: &str, channels: &[&str]) -> Result<Self, PluginError> {
        let lua = Lua::new();
        init(&lua, name, source, channels).map_err(|source| PluginError::Script {
            name: name.to_owned(),
            source,
        })?;
        Ok(Self {
            name: name.to_owned(),
            lua: Rc::new(lua),
        })
    }

    /// Plugin name (its path when loaded from disk).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of functions registered on `channel`.
    #[must_use]
    pub fn hook_count(&self, channel: &str) -> usize {
        handlers(&self.lua, channel).as_ref().map_or(0, Vec::len)
    }

    /// Register this plugin's `channel` functions on `registry`.
    ///
    /// The argument is passed to each function in turn. A `nil` return keeps
    /// the current value; anything else replaces it.
    pub fn attach_replace<T>(&self, registry: &mut HookRegistry, channel: ReplaceChannel<T>)
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        if self.hook_count(channel.name()) == 0 {
            return;
        }
        let lua = Rc::clone(&self.lua);
        registry.on_replace(channel, self.name.clone(), move |value: &T| {
            call_replace(&lua, channel.name(), value).map_err(boxed)
        });
    }

    /// Register this plugin's `channel` functions on `registry`.
    ///
    /// Each function receives the value as a table; the table is read back
    /// after the call, so in-place edits are kept.
    pub fn attach_mutate<T>(&self, registry: &mut HookRegistry, channel: MutateChannel<T>)
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        if self.hook_count(channel.name()) == 0 {
            return;
        }
        let lua = Rc::clone(&self.lua);
        registry.on_mutate(channel, self.name.clone(), move |value: &mut T| {
            call_mutate(&lua, channel.name(), value).map_err(boxed)
        });
    }
}

impl std::fmt::Debug for LuaPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LuaPlugin").field("name", &self.name).finish()
    }
}

/// Install the `folio` API and run the plugin body.
fn init(lua: &Lua, name: &str, source: &str, channels: &[&str]) -> mlua::Result<()> {
    lua.load(PRELUDE).set_name("=folio").exec()?;

    let api: Table = lua.globals().get("folio")?;
    let known: Table = api.get("_channels")?;
    for channel in channels {
        known.set(*channel, true)?;
    }

    let origin = name.to_owned();
    let log = lua.create_function(move |_, message: String| {
        tracing::info!(plugin = %origin, "{message}");
        Ok(())
    })?;
    api.set("log", log)?;

    lua.load(source).set_name(format!("@{name}")).exec()
}

fn handlers<'lua>(lua: &'lua Lua, channel: &str) -> mlua::Result<Vec<Function<'lua>>> {
    let api: Table = lua.globals().get("folio")?;
    let hooks: Table = api.get("_hooks")?;
    let Some(list) = hooks.get::<_, Option<Table>>(channel)? else {
        return Ok(Vec::new());
    };
    list.sequence_values::<Function>().collect()
}

fn call_replace<T>(lua: &Lua, channel: &str, value: &T) -> mlua::Result<Option<T>>
where
    T: Serialize + DeserializeOwned,
{
    let mut replaced: Option<T> = None;
    for handler in handlers(lua, channel)? {
        let current = replaced.as_ref().unwrap_or(value);
        let result: Value = handler.call(to_lua(lua, current)?)?;
        if !matches!(result, Value::Nil) {
            replaced = Some(lua.from_value(result)?);
        }
    }
    Ok(replaced)
}

fn call_mutate<T>(lua: &Lua, channel: &str, value: &mut T) -> mlua::Result<()>
where
    T: Serialize + DeserializeOwned,
{
    for handler in handlers(lua, channel)? {
        let arg = to_lua(lua, &*value)?;
        handler.call::<_, ()>(arg.clone())?;
        *value = lua.from_value(arg)?;
    }
    Ok(())
}

/// Convert a value for Lua. `None` becomes `nil` so that absent fields test
/// false in scripts.
fn to_lua<'lua, T: Serialize>(lua: &'lua Lua, value: &T) -> mlua::Result<Value<'lua>> {
    let options = SerializeOptions::new()
        .serialize_none_to_null(false)
        .serialize_unit_to_null(false);
    lua.to_value_with(value, options)
}

fn boxed(err: mlua::Error) -> BoxError {
    err.to_string().into()
}
