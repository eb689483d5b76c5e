use crate::{
    compile::{Parser, Template},
    function::{builtins, Function},
    load::Loader,
    log::{Error, INVALID_FUNCTION},
    render::Renderer,
    Config, Store,
};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};

/// Facilitates loading and rendering templates, and provides storage
/// for functions and globals.
///
/// An `Engine` may be shared between threads. Templates loaded by name are
/// compiled once and cached until their file changes on disk.
pub struct Engine {
    /// Where templates are found and how they are compiled.
    config: Config,
    /// Finds, compiles and caches templates.
    loader: Loader,
    /// Functions that this engine is aware of.
    functions: HashMap<String, Box<dyn Function>>,
    /// Values visible to every template, below the names in the [`Store`].
    globals: Store,
}

impl Engine {
    /// Create a new instance of [`Engine`] with the given [`Config`].
    ///
    /// The `Engine` starts out with the built in functions.
    pub fn new(config: Config) -> Self {
        Self {
            loader: Loader::new(&config),
            config,
            functions: builtins(),
            globals: Store::new(),
        }
    }

    /// Return the [`Config`] the engine was created with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the named [`Template`] from the template directory.
    ///
    /// The `Template` is compiled the first time it is requested, and then
    /// reused until its file, or the file of any template it extends or
    /// includes, is modified.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the template cannot be found, read or
    /// compiled.
    #[inline]
    pub fn template(&self, name: &str) -> Result<Arc<Template>, Error> {
        self.loader.load(name)
    }

    /// Render the named [`Template`] with the given [`Store`].
    ///
    /// When the [`Config`] names a default base, a template without `extends`
    /// is rendered into it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the template cannot be loaded, or rendering fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use brim::{Config, Engine, Store};
    ///
    /// let directory = tempfile::tempdir().unwrap();
    /// std::fs::write(directory.path().join("hello.html"), "hello, (( name ))!").unwrap();
    ///
    /// let engine = Engine::new(Config::new(directory.path()).with_suffix("html"));
    /// let result = engine.render("hello", &Store::new().with_must("name", "taylor"));
    ///
    /// assert_eq!(result.unwrap(), "hello, taylor!");
    /// ```
    pub fn render(&self, name: &str, store: &Store) -> Result<String, Error> {
        let template = self.template(name)?;
        let layout = self.layout(&template)?;

        let mut renderer = Renderer::new(self, &template, store);
        if let Some(layout) = &layout {
            renderer = renderer.with_layout(layout);
        }

        renderer.render().map_err(|e| e.in_template(name))
    }

    /// Return the default base to render the [`Template`] into, if it needs one.
    fn layout(&self, template: &Template) -> Result<Option<Arc<Template>>, Error> {
        let Some(base) = self.config.base() else {
            return Ok(None);
        };
        if template.extends.is_some() {
            return Ok(None);
        }
        if template.path().is_some() && template.path() == self.loader.resolve(base).as_ref() {
            return Ok(None);
        }

        self.template(base).map(Some)
    }

    /// Compile a new [`Template`] from text, using the configured markers.
    ///
    /// Any template it extends or includes is loaded from the template directory.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when compilation fails, which most likely means the source
    /// contains invalid syntax, or a linked template cannot be loaded.
    ///
    /// # Examples
    ///
    /// ```
    /// use brim::Engine;
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile("hello, (( name ))!");
    /// assert!(template.is_ok());
    /// ```
    pub fn compile(&self, text: &str) -> Result<Template, Error> {
        let template = Parser::new(text, self.loader.finder()).compile(None)?;

        self.loader.link(template)
    }

    /// Render a [`Template`] with the given [`Store`].
    ///
    /// No default base is applied.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if rendering fails, which may happen when a [`Function`] returns
    /// an `Error` itself, or the template cannot be rendered for a reason that will
    /// be described by the `Error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use brim::{Store, Engine};
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile("hello, (( name ))!").unwrap();
    /// let result = engine.render_template(&template, &Store::new().with_must("name", "taylor"));
    ///
    /// assert_eq!(result.unwrap(), "hello, taylor!")
    /// ```
    #[inline]
    pub fn render_template(&self, template: &Template, store: &Store) -> Result<String, Error> {
        Renderer::new(self, template, store).render()
    }

    /// Add a global value, visible to every template unless a local or the
    /// [`Store`] uses the same name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the value cannot be serialized.
    pub fn add_global<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.globals.insert(key, value)
    }

    /// Add a global value.
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the value cannot be serialized.
    pub fn with_global<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.add_global(key, value)?;
        Ok(self)
    }

    /// Add a global value.
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Panics if the value cannot be serialized.
    pub fn with_global_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.globals.insert_must(key, value);
        self
    }

    pub(crate) fn globals(&self) -> &Store {
        &self.globals
    }

    /// Add a [`Function`].
    ///
    /// # Errors
    ///
    /// If a `Function` with the given name already exists in the engine, an [`Error`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use brim::{
    ///     function::{
    ///         serde::{json, Value},
    ///         Error,
    ///     },
    ///     Engine,
    /// };
    ///
    /// fn shout(arguments: &[Value]) -> Result<Value, Error> {
    ///     match arguments {
    ///         [Value::String(string)] => Ok(json!(format!("{string}!"))),
    ///         _ => Err(Error::build("function `shout` requires string input")),
    ///     }
    /// }
    ///
    /// let mut engine = Engine::default();
    /// assert!(engine.add_function("shout", shout).is_ok());
    /// assert!(engine.add_function("shout", shout).is_err());
    /// ```
    pub fn add_function<T>(&mut self, name: &str, function: T) -> Result<(), Error>
    where
        T: Function + 'static,
    {
        if self.functions.contains_key(name) {
            return Err(Error::build(INVALID_FUNCTION).with_help(format!(
                "function with name `{name}` already exists in engine, \
                overwrite it with `.add_function_must`"
            )));
        }

        self.functions.insert(name.to_owned(), Box::new(function));
        Ok(())
    }

    /// Add a [`Function`].
    ///
    /// If a `Function` with the given name already exists in the [`Engine`], it is overwritten.
    #[inline]
    pub fn add_function_must<T>(&mut self, name: &str, function: T)
    where
        T: Function + 'static,
    {
        self.functions.insert(name.to_owned(), Box::new(function));
    }

    /// Add a [`Function`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// If a `Function` with the given name already exists in the engine, an [`Error`] is returned.
    #[inline]
    pub fn with_function<T>(mut self, name: &str, function: T) -> Result<Self, Error>
    where
        T: Function + 'static,
    {
        self.add_function(name, function)?;
        Ok(self)
    }

    /// Add a [`Function`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// If a `Function` with the given name already exists in the engine, it is overwritten.
    #[inline]
    pub fn with_function_must<T>(mut self, name: &str, function: T) -> Self
    where
        T: Function + 'static,
    {
        self.add_function_must(name, function);
        self
    }

    /// Return the function with the given name, if it exists in Engine.
    #[inline]
    pub fn get_function(&self, name: &str) -> Option<&dyn Function> {
        self.functions.get(name).map(Box::as_ref)
    }
}

impl Default for Engine {
    /// Create an [`Engine`] with the default [`Config`].
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use crate::{engine::Engine, log::Error, Builder, Config, Store};
    use serde_json::{json, Value};

    #[test]
    fn test_add() {
        let mut engine = Engine::default();
        engine.add_function_must("faux", faux_function_a);

        assert!(engine.get_function("faux").is_some());
        assert!(engine.get_function("len").is_some());
        assert!(engine.get_function("ghost").is_none())
    }

    #[test]
    fn test_add_fluent() {
        assert!(Engine::default()
            .with_function("faux", faux_function_a)
            .unwrap()
            .get_function("faux")
            .is_some());
        assert!(Engine::default().get_function("ghost").is_none());
    }

    #[test]
    fn test_add_duplicate() {
        assert!(Engine::default()
            .with_function_must("faux", faux_function_a)
            .with_function("faux", faux_function_a)
            .is_err())
    }

    #[test]
    fn test_add_overwrite() {
        let mut engine = Engine::default().with_function_must("faux", faux_function_a);
        assert!(engine
            .get_function("faux")
            .is_some_and(|f| f.call(&[]).is_ok_and(|v| v == json!("a"))));

        engine.add_function_must("faux", faux_function_b);
        assert!(engine
            .get_function("faux")
            .is_some_and(|f| f.call(&[]).is_ok_and(|v| v == json!("b"))));
    }

    #[test]
    fn test_compile_syntax() {
        let engine = Engine::new(
            Config::default().with_syntax(Builder::new().with_expression("{{", "}}")),
        );
        let template = engine.compile("{{ 1 + 1 }} (( raw ))").unwrap();

        assert_eq!(
            engine.render_template(&template, &Store::new()).unwrap(),
            "2 (( raw ))"
        );
    }

    #[test]
    fn test_engine_is_shareable() {
        fn shareable<T: Send + Sync>() {}

        shareable::<Engine>();
    }

    /// A Function used to test Engine.
    fn faux_function_a(_: &[Value]) -> Result<Value, Error> {
        Ok(Value::String("a".into()))
    }

    /// A Function used to test Engine.
    fn faux_function_b(_: &[Value]) -> Result<Value, Error> {
        Ok(Value::String("b".into()))
    }
}
