//! Tag evaluation.
//! A tag invocation is a list of tokens: the tag name followed by its
//! positional arguments. The registry maps names to handlers and is built
//! once before any template is rendered.

use crate::config::{resolve_dotted, ConfigSource};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde_yaml::Value;

/// A named tag implementation.
pub trait TagHandler {
    /// Identifier the handler is registered under, before normalization.
    fn name(&self) -> &str;

    /// Evaluates the tag with its positional arguments.
    fn call(&self, args: &[String]) -> Result<Value>;
}

/// Adapts a closure into a [`TagHandler`].
pub struct FnTag<F> {
    name: String,
    func: F,
}

impl<F> FnTag<F>
where
    F: Fn(&[String]) -> Result<Value>,
{
    pub fn new<S: Into<String>>(name: S, func: F) -> Self {
        Self { name: name.into(), func }
    }
}

impl<F> TagHandler for FnTag<F>
where
    F: Fn(&[String]) -> Result<Value>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &[String]) -> Result<Value> {
        (self.func)(args)
    }
}

/// `{% root %}`: the project root as a POSIX path.
pub struct RootTag {
    root: String,
}

impl RootTag {
    pub fn new<S: Into<String>>(root: S) -> Self {
        Self { root: root.into() }
    }
}

impl TagHandler for RootTag {
    fn name(&self) -> &str {
        "_root"
    }

    fn call(&self, _args: &[String]) -> Result<Value> {
        Ok(Value::String(self.root.clone()))
    }
}

/// `{% config a.b.2 %}`: a value from the configuration, read fresh on
/// every evaluation.
pub struct ConfigTag<C> {
    source: C,
}

impl<C: ConfigSource> ConfigTag<C> {
    pub fn new(source: C) -> Self {
        Self { source }
    }
}

impl<C: ConfigSource> TagHandler for ConfigTag<C> {
    fn name(&self) -> &str {
        "_config"
    }

    fn call(&self, args: &[String]) -> Result<Value> {
        let [key] = args else {
            return Err(Error::TagArguments {
                tag: "config".to_string(),
                expected: 1,
                found: args.len(),
            });
        };
        let config = Value::Mapping(self.source.load()?);
        resolve_dotted(&config, key)
    }
}

/// Strips leading non-alphanumeric characters and lowercases.
pub fn normalize_tag_name(name: &str) -> String {
    name.trim_start_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

/// Renders a tag value the way it appears in a deployed file.
///
/// Strings are inserted verbatim; containers become compact JSON-style text.
/// Mapping keys of any YAML type are written as strings.
pub fn value_to_string(value: &Value) -> Result<String> {
    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Tagged(tagged) => value_to_string(&tagged.value)?,
        Value::Sequence(_) | Value::Mapping(_) => {
            let mut out = String::new();
            write_compact(value, &mut out)?;
            out
        }
    })
}

fn write_compact(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::String(s) => out.push_str(&serde_json::to_string(s)?),
        Value::Tagged(tagged) => write_compact(&tagged.value, out)?,
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_compact(item, out)?;
            }
            out.push(']');
        }
        Value::Mapping(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(&value_to_string(key)?)?);
                out.push(':');
                write_compact(item, out)?;
            }
            out.push('}');
        }
        scalar => out.push_str(&value_to_string(scalar)?),
    }
    Ok(())
}

/// Registered tag handlers, keyed by normalized name.
#[derive(Default)]
pub struct TagRegistry {
    handlers: IndexMap<String, Box<dyn TagHandler>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handler` under its normalized name, replacing any handler
    /// previously registered under the same name.
    pub fn register<H: TagHandler + 'static>(&mut self, handler: H) -> &mut Self {
        let name = normalize_tag_name(handler.name());
        debug!("Registering tag '{}'", name);
        self.handlers.insert(name, Box::new(handler));
        self
    }

    pub fn register_fn<S, F>(&mut self, name: S, func: F) -> &mut Self
    where
        S: Into<String>,
        F: Fn(&[String]) -> Result<Value> + 'static,
    {
        self.register(FnTag::new(name, func))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Dispatches `tokens` to the handler named by the first token.
    ///
    /// # Errors
    /// * `Error::TagNotSupported` if the name is not registered
    /// * Whatever the handler itself fails with
    pub fn parse(&self, tokens: &[String]) -> Result<Value> {
        let Some((tag, args)) = tokens.split_first() else {
            return Err(Error::TagNotSupported { tag: String::new() });
        };
        let handler = self
            .handlers
            .get(tag.as_str())
            .ok_or_else(|| Error::TagNotSupported { tag: tag.clone() })?;
        debug!("Evaluating tag '{}' with {:?}", tag, args);
        handler.call(args)
    }

    /// [`parse`](Self::parse), then [`value_to_string`].
    pub fn parse_to_string(&self, tokens: &[String]) -> Result<String> {
        value_to_string(&self.parse(tokens)?)
    }
}

/// Builds the registry with the `root` and `config` tags.
pub fn builtin_registry<S, C>(root: S, config: C) -> TagRegistry
where
    S: Into<String>,
    C: ConfigSource + 'static,
{
    let mut registry = TagRegistry::new();
    registry.register(RootTag::new(root)).register(ConfigTag::new(config));
    registry
}
