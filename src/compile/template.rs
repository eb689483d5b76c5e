use crate::compile::{
    tree::{Expression, Link},
    Scope,
};
use std::{collections::HashMap, path::PathBuf, sync::Arc, time::SystemTime};

/// A compiled [`Template`] that can be rendered with a `Store`.
///
/// A `Template` is never changed once an `Engine` hands it out. When the
/// source file changes, a new `Template` is compiled and replaces the old one
/// in the cache.
#[derive(Debug, Clone, Default)]
pub struct Template {
    /// The name of the [`Template`], when loaded by an `Engine`.
    pub(crate) name: Option<String>,
    /// The file this [`Template`] was compiled from.
    pub(crate) path: Option<PathBuf>,
    /// Modification time of the file when it was read.
    pub(crate) modified: Option<SystemTime>,
    /// The Abstract Syntax Tree generated during compilation.
    pub(crate) scope: Scope,
    /// Bodies of every block declared in the template, by name.
    pub(crate) blocks: HashMap<String, Scope>,
    /// Parameters declared with `with`.
    pub(crate) parameters: Vec<Parameter>,
    /// The template named by `extends`, if any.
    pub(crate) extends: Option<Link>,
    /// Every template named by an `include`, in the order they appear.
    pub(crate) includes: Vec<Link>,
    /// The compiled template named by `extends`.
    pub(crate) base: Option<Arc<Template>>,
    /// The compiled templates named by `include`.
    pub(crate) included: HashMap<String, Arc<Template>>,
}

impl Template {
    /// Return the name of the [`Template`], if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the path of the file this [`Template`] was compiled from.
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Return the modification time of the source file at compile time.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Return the parameters declared with `with`.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Return the name of the template this [`Template`] extends.
    pub fn extends(&self) -> Option<&str> {
        self.extends.as_ref().map(|link| link.name.as_str())
    }

    /// Return the names of every template this [`Template`] includes.
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.includes.iter().map(|link| link.name.as_str())
    }

    /// Return the resolved base [`Template`].
    pub fn base(&self) -> Option<&Arc<Template>> {
        self.base.as_ref()
    }

    /// Return the body of the named block, if this [`Template`] declares it.
    pub fn block(&self, name: &str) -> Option<&Scope> {
        self.blocks.get(name)
    }

    /// Return an iterator over this [`Template`] and every base it extends,
    /// ending with the base-most template.
    pub fn chain(&self) -> impl Iterator<Item = &Template> {
        std::iter::successors(Some(self), |template| template.base.as_deref())
    }
}

/// A parameter declared with `with` at the top of a template.
///
/// Positional arguments pushed into the `Store` are bound to parameters in
/// order, and any parameter left over falls back to its default.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) default: Option<Expression>,
}

impl Parameter {
    /// Return the name of the [`Parameter`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return true if the [`Parameter`] has a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::compile::{compile, Template};
    use std::sync::Arc;

    #[test]
    fn test_chain() {
        let root = compile("(* block a *)root(* end *)").unwrap();
        let mut child = compile("(* extends \"root\" *)(* block a *)child(* end *)").unwrap();
        child.base = Some(Arc::new(root));

        let names = child
            .chain()
            .map(|template: &Template| template.extends().unwrap_or("-"))
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["root", "-"]);
    }

    #[test]
    fn test_block_lookup() {
        let template = compile("(* block title *)hi(* end *)").unwrap();

        assert!(template.block("title").is_some());
        assert!(template.block("content").is_none());
    }
}
