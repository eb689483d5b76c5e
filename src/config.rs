use crate::compile::Builder;
use std::path::{Path, PathBuf};

/// Settings used by an [`Engine`][`crate::Engine`] to find and compile templates.
///
/// # Examples
///
/// ```
/// use brim::{Builder, Config};
///
/// let config = Config::new("templates")
///     .with_suffix("html")
///     .with_base("base")
///     .with_syntax(Builder::new().with_expression("{{", "}}"));
///
/// assert_eq!(config.suffix(), Some("html"));
/// assert_eq!(config.base(), Some("base"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory that template names are resolved against.
    directory: PathBuf,
    /// Extension tried when a name does not match a file as given.
    suffix: Option<String>,
    /// Template that every template without `extends` implicitly extends.
    base: Option<String>,
    /// Markers used to compile templates.
    syntax: Builder,
}

impl Config {
    /// Create a new [`Config`] that finds templates in the given directory.
    pub fn new<T>(directory: T) -> Self
    where
        T: Into<PathBuf>,
    {
        Self {
            directory: directory.into(),
            suffix: None,
            base: None,
            syntax: Builder::new(),
        }
    }

    /// Set the suffix tried when a template name does not match a file.
    ///
    /// A leading `.` is ignored, so `html` and `.html` are the same.
    pub fn set_suffix(&mut self, suffix: &str) {
        self.suffix = Some(suffix.trim_start_matches('.').to_owned());
    }

    /// Set the suffix tried when a template name does not match a file.
    ///
    /// Returns the [`Config`], so additional methods may be chained.
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.set_suffix(suffix);

        self
    }

    /// Set the default base template.
    ///
    /// A template without `extends` is rendered into the default base,
    /// filling its `content` block.
    pub fn set_base(&mut self, base: &str) {
        self.base = Some(base.to_owned());
    }

    /// Set the default base template.
    ///
    /// Returns the [`Config`], so additional methods may be chained.
    pub fn with_base(mut self, base: &str) -> Self {
        self.set_base(base);

        self
    }

    /// Set the markers used to compile templates.
    pub fn set_syntax(&mut self, syntax: Builder) {
        self.syntax = syntax;
    }

    /// Set the markers used to compile templates.
    ///
    /// Returns the [`Config`], so additional methods may be chained.
    pub fn with_syntax(mut self, syntax: Builder) -> Self {
        self.set_syntax(syntax);

        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn syntax(&self) -> &Builder {
        &self.syntax
    }
}

impl Default for Config {
    /// Find templates in the current directory, with no suffix and no default base.
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::path::Path;

    #[test]
    fn test_default() {
        let config = Config::default();

        assert_eq!(config.directory(), Path::new("."));
        assert_eq!(config.suffix(), None);
        assert_eq!(config.base(), None);
    }

    #[test]
    fn test_suffix_dot() {
        assert_eq!(Config::default().with_suffix(".html").suffix(), Some("html"));
        assert_eq!(Config::default().with_suffix("html").suffix(), Some("html"));
    }
}
