//! Turning the final leaf values of a successful match into a result.
//!
//! An [`Accumulator`] receives every leaf once, tagged by kind. The default
//! [`BindingsAccumulator`] builds a name-keyed [`Bindings`] map; the
//! [`TypedAccumulator`] stores values into a user struct through an explicit
//! [`FieldTable`].

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::value::Value;

/// Receives the final value of each leaf after a successful match.
pub trait Accumulator {
    type Output;

    fn new_state(&self) -> Self::Output;

    fn command(&self, state: &mut Self::Output, name: &str, value: Value) -> Result<()>;

    fn argument(&self, state: &mut Self::Output, name: &str, value: Value) -> Result<()>;

    fn option(&self, state: &mut Self::Output, name: &str, value: Value) -> Result<()>;
}

/// Name-keyed map of every leaf's final value, ordered by name.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{ApplyConfig, apply};
///
/// let doc = "Usage: prog [-v] <file>...";
/// let bindings = apply(doc, ["-v", "a", "b"], &ApplyConfig::default())
///     .matched()
///     .unwrap();
/// assert_eq!(bindings.flag("-v"), Some(true));
/// assert_eq!(bindings.items("<file>"), Some(&["a".to_string(), "b".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Bindings(BTreeMap<String, Value>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_flag)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn items(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(Value::as_items)
    }

    pub fn count(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_count)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Collects leaves into [`Bindings`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingsAccumulator;

impl Accumulator for BindingsAccumulator {
    type Output = Bindings;

    fn new_state(&self) -> Bindings {
        Bindings::new()
    }

    fn command(&self, state: &mut Bindings, name: &str, value: Value) -> Result<()> {
        state.insert(name, value);
        Ok(())
    }

    fn argument(&self, state: &mut Bindings, name: &str, value: Value) -> Result<()> {
        state.insert(name, value);
        Ok(())
    }

    fn option(&self, state: &mut Bindings, name: &str, value: Value) -> Result<()> {
        state.insert(name, value);
        Ok(())
    }
}

/// Maps a leaf name to the property name a typed target uses for it.
///
/// `--dry-run` becomes `FlagDryRun`, `-x` becomes `FlagX`, `<out-dir>`
/// becomes `ArgOutDir` and a command such as `set-speed` becomes `SetSpeed`.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::property_name;
///
/// assert_eq!(property_name("--foo-bar"), "FlagFooBar");
/// assert_eq!(property_name("<foo>"), "ArgFoo");
/// assert_eq!(property_name("ship"), "Ship");
/// ```
pub fn property_name(name: &str) -> String {
    if let Some(long) = name.strip_prefix("--") {
        format!("Flag{}", pascalise(long))
    } else if let Some(short) = name.strip_prefix('-') {
        format!("Flag{}", pascalise(short))
    } else if let Some(inner) = name.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
        format!("Arg{}", pascalise(inner))
    } else {
        pascalise(name)
    }
}

fn pascalise(kebab: &str) -> String {
    let mut out = String::with_capacity(kebab.len());
    let mut boundary = true;
    for c in kebab.chars() {
        if c == '-' {
            boundary = true;
        } else if boundary {
            out.extend(c.to_uppercase());
            boundary = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Stores a leaf value into one field of `T`.
pub type Setter<T> = fn(&mut T, Value) -> Result<()>;

/// Property-name to setter registrations for a target type.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{FieldTable, Value};
///
/// #[derive(Default)]
/// struct Args {
///     verbose: bool,
/// }
///
/// let table = FieldTable::<Args>::new().field("FlagVerbose", |args: &mut Args, value: Value| {
///     args.verbose = value.is_set();
///     Ok(())
/// });
/// let mut args = Args::default();
/// table.set(&mut args, "--verbose", Value::Flag(true)).unwrap();
/// assert!(args.verbose);
/// assert!(table.set(&mut args, "--quiet", Value::Flag(true)).is_err());
/// ```
pub struct FieldTable<T> {
    setters: BTreeMap<String, Setter<T>>,
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self {
            setters: BTreeMap::new(),
        }
    }
}

impl<T> FieldTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `setter` under a property name as produced by
    /// [`property_name`].
    pub fn field(mut self, property: impl Into<String>, setter: Setter<T>) -> Self {
        self.setters.insert(property.into(), setter);
        self
    }

    pub fn contains(&self, property: &str) -> bool {
        self.setters.contains_key(property)
    }

    /// Stores `value` for the leaf called `name`.
    pub fn set(&self, target: &mut T, name: &str, value: Value) -> Result<()> {
        let property = property_name(name);
        let Some(setter) = self.setters.get(&property) else {
            return Err(Error::Binding {
                property,
                name: name.to_string(),
            });
        };
        setter(target, value)
    }
}

/// Builds a `T` from its default and a [`FieldTable`].
pub struct TypedAccumulator<T> {
    table: FieldTable<T>,
}

impl<T> TypedAccumulator<T> {
    pub fn new(table: FieldTable<T>) -> Self {
        Self { table }
    }
}

impl<T: Default> Accumulator for TypedAccumulator<T> {
    type Output = T;

    fn new_state(&self) -> T {
        T::default()
    }

    fn command(&self, state: &mut T, name: &str, value: Value) -> Result<()> {
        self.table.set(state, name, value)
    }

    fn argument(&self, state: &mut T, name: &str, value: Value) -> Result<()> {
        self.table.set(state, name, value)
    }

    fn option(&self, state: &mut T, name: &str, value: Value) -> Result<()> {
        self.table.set(state, name, value)
    }
}
