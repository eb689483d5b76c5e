mod cache;
mod source;

use crate::{
    compile::{Parser, Template},
    log::{error_circular, Error},
    region::Position,
    Config,
};
use morel::Finder;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, PoisonError},
};
use tracing::{debug, warn};

use self::cache::Cache;

/// Finds, compiles and caches the templates in a directory.
///
/// A cached template is reused for as long as its file, and the files of every
/// template it extends or includes, are unchanged since they were read.
pub struct Loader {
    directory: PathBuf,
    suffix: Option<String>,
    finder: Finder,
    cache: Cache,
}

impl Loader {
    /// Create a new [`Loader`] with the directory, suffix and syntax of the [`Config`].
    pub fn new(config: &Config) -> Self {
        Self {
            directory: config.directory().to_owned(),
            suffix: config.suffix().map(str::to_owned),
            finder: Finder::new(config.syntax().to_syntax()),
            cache: Cache::new(),
        }
    }

    /// Return the [`Finder`] built from the configured markers.
    pub fn finder(&self) -> &Finder {
        &self.finder
    }

    /// Return the path of the named template, if it exists.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        source::resolve(&self.directory, name, self.suffix.as_deref()).ok()
    }

    /// Return the named [`Template`], with every template it extends or includes linked.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the template or one it depends on cannot be
    /// found, read or compiled, or the templates form a cycle.
    pub fn load(&self, name: &str) -> Result<Arc<Template>, Error> {
        self.load_chain(name, &mut vec![])
    }

    /// Link the templates named by `extends` and `include` into the [`Template`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if any linked template fails to load.
    pub fn link(&self, template: Template) -> Result<Template, Error> {
        self.link_chain(template, &mut vec![])
    }

    /// Load the named template, where `chain` holds the name and path of every
    /// template currently being loaded above it.
    fn load_chain(
        &self,
        name: &str,
        chain: &mut Vec<(String, PathBuf)>,
    ) -> Result<Arc<Template>, Error> {
        let path = source::resolve(&self.directory, name, self.suffix.as_deref())
            .map_err(|e| e.into_error(name))?;

        if chain.iter().any(|(_, visited)| *visited == path) {
            let names = chain.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>();
            return Err(error_circular(&names, name));
        }

        match self.cache.get(&path) {
            Some(cached) if is_fresh(&cached) => {
                debug!(template = name, "cache hit");
                return Ok(cached);
            }
            Some(_) => debug!(template = name, "cache stale"),
            None => debug!(template = name, "cache miss"),
        }

        let lock = self.cache.lock(&path);
        let compiled = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

            // Another thread may have compiled the file while this one waited.
            match self.cache.get(&path) {
                Some(cached) if is_fresh(&cached) => return Ok(cached),
                _ => self.compile(name, &path),
            }
        };

        let linked = compiled.and_then(|template| {
            chain.push((name.to_owned(), path.clone()));
            let linked = self.link_chain(template, chain);
            chain.pop();

            linked
        });

        match linked {
            Ok(template) => {
                let template = Arc::new(template);
                self.cache.insert(path, Arc::clone(&template));
                debug!(template = name, "cached");

                Ok(template)
            }
            Err(error) => {
                if self.cache.remove(&path).is_some() {
                    warn!(template = name, %error, "evicted template that failed to recompile");
                }

                Err(error.in_template(name))
            }
        }
    }

    /// Read and compile the template file.
    fn compile(&self, name: &str, path: &Path) -> Result<Template, Error> {
        let source = source::read(path).map_err(|e| e.into_error(name))?;
        debug!(template = name, path = %path.display(), "compiling");

        let mut template = Parser::new(&source.text, &self.finder)
            .compile(Some(name))
            .map_err(|e| e.in_template(name))?;
        template.path = Some(source.path);
        template.modified = Some(source.modified);

        Ok(template)
    }

    fn link_chain(
        &self,
        mut template: Template,
        chain: &mut Vec<(String, PathBuf)>,
    ) -> Result<Template, Error> {
        if let Some(extends) = &template.extends {
            let base = self
                .load_chain(&extends.name, chain)
                .map_err(|e| at(e, extends.position))?;
            template.base = Some(base);
        }

        for include in &template.includes {
            if template.included.contains_key(&include.name) {
                continue;
            }

            let included = self
                .load_chain(&include.name, chain)
                .map_err(|e| at(e, include.position))?;
            template.included.insert(include.name.clone(), included);
        }

        Ok(template)
    }
}

/// Point an [`Error`] raised by a linked template at the `extends` or `include`
/// that named it, unless it already belongs to another template.
fn at(error: Error, position: Position) -> Error {
    if error.get_name().is_some() {
        error
    } else {
        error.with_position(position)
    }
}

/// Return true if the files of the [`Template`] and every template it links are
/// unchanged since they were read.
///
/// A template that was not read from a file is always fresh.
fn is_fresh(template: &Template) -> bool {
    let unchanged = match (template.path(), template.modified()) {
        (Some(path), Some(recorded)) => source::modified(path).is_ok_and(|current| recorded >= current),
        (None, _) => true,
        (Some(_), None) => false,
    };

    unchanged
        && template.base().map_or(true, |base| is_fresh(base))
        && template.included.values().all(|included| is_fresh(included))
}

#[cfg(test)]
mod tests {
    use super::Loader;
    use crate::{log::ErrorKind, Config};
    use std::{fs, sync::Arc};

    #[test]
    fn test_load_cached() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("a.txt"), "(( name ))").unwrap();

        let loader = Loader::new(&Config::new(directory.path()).with_suffix("txt"));
        let first = loader.load("a").unwrap();
        let second = loader.load("a").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), Some("a"));
        assert_eq!(loader.cache.len(), 1);
    }

    #[test]
    fn test_load_links_base() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("base"), "(* block a *)(* end *)").unwrap();
        fs::write(directory.path().join("child"), "(* extends \"base\" *)").unwrap();

        let loader = Loader::new(&Config::new(directory.path()));
        let child = loader.load("child").unwrap();

        assert_eq!(child.base().and_then(|b| b.name()), Some("base"));
        assert!(Arc::ptr_eq(child.base().unwrap(), &loader.load("base").unwrap()));
    }

    #[test]
    fn test_load_circular() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("a"), "(* extends \"b\" *)").unwrap();
        fs::write(directory.path().join("b"), "(* include \"a\" *)").unwrap();

        let loader = Loader::new(&Config::new(directory.path()));
        let error = loader.load("a").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::CircularExtends);
        assert_eq!(error.get_name(), Some("b"));
        assert_eq!(loader.cache.len(), 0);
    }

    #[test]
    fn test_load_circular_through_suffix() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("a.html"), "(* extends \"a.html\" *)").unwrap();

        let loader = Loader::new(&Config::new(directory.path()).with_suffix("html"));

        assert_eq!(
            loader.load("a").unwrap_err().kind(),
            ErrorKind::CircularExtends
        );
    }

    #[test]
    fn test_load_missing_base() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("child"), "\n(* extends \"ghost\" *)").unwrap();

        let loader = Loader::new(&Config::new(directory.path()));
        let error = loader.load("child").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.get_name(), Some("child"));
        assert_eq!(error.position().map(|p| p.line), Some(2));
    }
}
