//! Capability registrar.
//!
//! Native functions are described by a static table of [`FunctionSpec`] rows
//! and published into a [`Namespace`] by [`register_all`]. Dispatch goes
//! through the table entries; nothing is looked up by reflection.
//!
//! ## Duplicate names
//!
//! What happens when a name is already bound is decided by [`DuplicatePolicy`]:
//!
//! - `Reject` (default): registration fails with [`RegistryError::AlreadyBound`]
//!   and the namespace is left as it was.
//! - `Overwrite`: the new entry replaces the old one and the old one is
//!   returned to the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashSet;
use thiserror::Error;

use crate::ident::is_identifier;
use crate::value::Value;

/// Signature shared by every registered function.
pub type NativeFn = fn(&[Value]) -> Result<Value, CallError>;

/// One row of a registration table.
#[derive(Debug, Clone, Copy)]
pub struct FunctionSpec {
    /// Name the function is bound under.
    pub name: &'static str,
    /// Human-readable description shown to callers.
    pub description: &'static str,
    /// Number of positional arguments.
    pub arity: usize,
    pub call: NativeFn,
}

/// Policy applied when a name is registered twice in one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    Overwrite,
}

/// Errors raised while mutating a namespace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid name '{0}': expected an identifier")]
    InvalidName(String),

    #[error("Name '{name}' is already bound in namespace '{namespace}'")]
    AlreadyBound { namespace: String, name: String },
}

/// Errors raised while calling a registered function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function}() takes {expected} argument(s) but {given} were given")]
    Arity {
        function: String,
        expected: usize,
        given: usize,
    },

    #[error("{function}() argument {index}: expected {expected}, found {found}")]
    ArgumentType {
        function: String,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// A listing row produced by [`Namespace::catalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Fully qualified name, e.g. `proj.hello.foo`.
    pub path: String,
    pub description: String,
    pub arity: usize,
}

/// A named tree of functions and child namespaces.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    name: String,
    doc: String,
    functions: BTreeMap<String, FunctionSpec>,
    children: BTreeMap<String, Namespace>,
}

impl Namespace {
    /// Create an empty namespace.
    pub fn new(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: doc.into(),
            functions: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn set_doc(&mut self, doc: impl Into<String>) {
        self.doc = doc.into();
    }

    /// Get or create the child namespace `name`.
    ///
    /// An existing child is returned as is; its doc string is not replaced.
    pub fn def_submodule(
        &mut self,
        name: &str,
        doc: impl Into<String>,
    ) -> Result<&mut Namespace, RegistryError> {
        if !is_identifier(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        Ok(self
            .children
            .entry(name.to_string())
            .or_insert_with(|| Namespace::new(name, doc)))
    }

    /// Bind `spec` under `spec.name`.
    ///
    /// Returns the entry that was replaced, which is only ever `Some` under
    /// [`DuplicatePolicy::Overwrite`].
    pub fn register(
        &mut self,
        spec: FunctionSpec,
        policy: DuplicatePolicy,
    ) -> Result<Option<FunctionSpec>, RegistryError> {
        self.check(spec.name, policy)?;
        let previous = self.functions.insert(spec.name.to_string(), spec);
        tracing::debug!(
            namespace = %self.name,
            function = spec.name,
            replaced = previous.is_some(),
            "Registered function"
        );
        Ok(previous)
    }

    fn check(&self, name: &str, policy: DuplicatePolicy) -> Result<(), RegistryError> {
        if !is_identifier(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if policy == DuplicatePolicy::Reject && self.functions.contains_key(name) {
            return Err(RegistryError::AlreadyBound {
                namespace: self.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name)
    }

    pub fn submodule(&self, name: &str) -> Option<&Namespace> {
        self.children.get(name)
    }

    /// Functions bound directly in this namespace, in name order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.functions.values()
    }

    /// Child namespaces, in name order.
    pub fn submodules(&self) -> impl Iterator<Item = &Namespace> {
        self.children.values()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.children.is_empty()
    }

    /// Resolve a dotted path relative to this namespace (`hello.foo`).
    pub fn resolve(&self, path: &str) -> Option<&FunctionSpec> {
        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };
        let mut ns = self;
        if let Some(parents) = parents {
            for segment in parents.split('.') {
                ns = ns.children.get(segment)?;
            }
        }
        ns.functions.get(leaf)
    }

    /// Call the function at `path` with positional `args`.
    pub fn call(&self, path: &str, args: &[Value]) -> Result<Value, CallError> {
        let spec = self
            .resolve(path)
            .ok_or_else(|| CallError::UnknownFunction(path.to_string()))?;
        if args.len() != spec.arity {
            return Err(CallError::Arity {
                function: spec.name.to_string(),
                expected: spec.arity,
                given: args.len(),
            });
        }
        (spec.call)(args)
    }

    /// Every function in the tree with its qualified name, depth-first in
    /// name order.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        let mut entries = Vec::new();
        self.collect_catalog(&self.name, &mut entries);
        entries
    }

    fn collect_catalog(&self, prefix: &str, out: &mut Vec<CatalogEntry>) {
        for spec in self.functions.values() {
            out.push(CatalogEntry {
                path: format!("{}.{}", prefix, spec.name),
                description: spec.description.to_string(),
                arity: spec.arity,
            });
        }
        for (name, child) in &self.children {
            child.collect_catalog(&format!("{}.{}", prefix, name), out);
        }
    }
}

/// Register every row of `table` into `namespace`.
///
/// All rows are checked before anything is bound, so a rejected table leaves
/// the namespace unchanged. Returns the number of rows bound.
pub fn register_all(
    namespace: &mut Namespace,
    table: &[FunctionSpec],
    policy: DuplicatePolicy,
) -> Result<usize, RegistryError> {
    let mut seen = HashSet::new();
    for spec in table {
        namespace.check(spec.name, policy)?;
        if policy == DuplicatePolicy::Reject && !seen.insert(spec.name) {
            return Err(RegistryError::AlreadyBound {
                namespace: namespace.name.clone(),
                name: spec.name.to_string(),
            });
        }
    }
    for spec in table {
        namespace.register(*spec, policy)?;
    }
    Ok(table.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(_: &[Value]) -> Result<Value, CallError> {
        Ok(Value::Int(1))
    }

    fn two(_: &[Value]) -> Result<Value, CallError> {
        Ok(Value::Int(2))
    }

    fn echo(args: &[Value]) -> Result<Value, CallError> {
        Ok(args[0])
    }

    const ONE: FunctionSpec = FunctionSpec {
        name: "value",
        description: "Returns one",
        arity: 0,
        call: one,
    };

    const TWO: FunctionSpec = FunctionSpec {
        name: "value",
        description: "Returns two",
        arity: 0,
        call: two,
    };

    const ECHO: FunctionSpec = FunctionSpec {
        name: "echo",
        description: "Returns its argument",
        arity: 1,
        call: echo,
    };

    #[test]
    fn test_register_and_call() {
        let mut ns = Namespace::new("root", "");
        assert!(ns.register(ONE, DuplicatePolicy::Reject).unwrap().is_none());
        assert_eq!(ns.call("value", &[]).unwrap(), Value::Int(1));
        assert_eq!(ns.function("value").unwrap().description, "Returns one");
    }

    #[test]
    fn test_duplicate_rejected_keeps_original() {
        let mut ns = Namespace::new("root", "");
        ns.register(ONE, DuplicatePolicy::Reject).unwrap();

        let err = ns.register(TWO, DuplicatePolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            RegistryError::AlreadyBound {
                namespace: "root".to_string(),
                name: "value".to_string(),
            }
        );
        assert_eq!(ns.call("value", &[]).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_duplicate_overwrite_replaces() {
        let mut ns = Namespace::new("root", "");
        ns.register(ONE, DuplicatePolicy::Overwrite).unwrap();

        let previous = ns.register(TWO, DuplicatePolicy::Overwrite).unwrap();
        assert_eq!(previous.map(|p| p.description), Some("Returns one"));
        assert_eq!(ns.call("value", &[]).unwrap(), Value::Int(2));
        assert_eq!(ns.functions().count(), 1);
    }

    #[test]
    fn test_invalid_name() {
        let mut ns = Namespace::new("root", "");
        let bad = FunctionSpec {
            name: "not valid",
            ..ONE
        };
        assert!(matches!(
            ns.register(bad, DuplicatePolicy::Overwrite),
            Err(RegistryError::InvalidName(name)) if name == "not valid"
        ));
        assert!(ns.def_submodule("a.b", "").is_err());
        assert!(ns.is_empty());
    }

    #[test]
    fn test_register_all_is_atomic() {
        let mut ns = Namespace::new("root", "");
        ns.register(ONE, DuplicatePolicy::Reject).unwrap();

        let err = register_all(&mut ns, &[ECHO, TWO], DuplicatePolicy::Reject);
        assert!(matches!(err, Err(RegistryError::AlreadyBound { .. })));
        assert!(ns.function("echo").is_none());
    }

    #[test]
    fn test_register_all_rejects_duplicates_within_table() {
        let mut ns = Namespace::new("root", "");
        let err = register_all(&mut ns, &[ONE, TWO], DuplicatePolicy::Reject);
        assert!(matches!(err, Err(RegistryError::AlreadyBound { .. })));
        assert!(ns.is_empty());

        // Under overwrite the last row wins
        assert_eq!(register_all(&mut ns, &[ONE, TWO], DuplicatePolicy::Overwrite), Ok(2));
        assert_eq!(ns.call("value", &[]).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_submodule_resolution() {
        let mut root = Namespace::new("proj", "top");
        let sub = root.def_submodule("hello", "sub").unwrap();
        sub.register(ECHO, DuplicatePolicy::Reject).unwrap();

        // Get-or-create keeps existing contents
        let again = root.def_submodule("hello", "ignored").unwrap();
        assert_eq!(again.doc(), "sub");
        assert!(again.function("echo").is_some());

        assert!(root.resolve("hello.echo").is_some());
        assert!(root.resolve("echo").is_none());
        assert!(root.resolve("missing.echo").is_none());
        assert_eq!(
            root.call("hello.echo", &[Value::Float(2.5)]).unwrap(),
            Value::Float(2.5)
        );
    }

    #[test]
    fn test_call_errors() {
        let mut ns = Namespace::new("root", "");
        ns.register(ECHO, DuplicatePolicy::Reject).unwrap();

        assert_eq!(
            ns.call("nope", &[]),
            Err(CallError::UnknownFunction("nope".to_string()))
        );
        assert_eq!(
            ns.call("echo", &[]),
            Err(CallError::Arity {
                function: "echo".to_string(),
                expected: 1,
                given: 0,
            })
        );
    }

    #[test]
    fn test_catalog_order_and_paths() {
        let mut root = Namespace::new("proj", "");
        root.register(ECHO, DuplicatePolicy::Reject).unwrap();
        let sub = root.def_submodule("hello", "").unwrap();
        sub.register(ONE, DuplicatePolicy::Reject).unwrap();

        let paths: Vec<String> = root.catalog().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["proj.echo", "proj.hello.value"]);
    }
}
