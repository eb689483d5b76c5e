use crate::log::{error_missing_template, Error, ErrorKind};
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
    time::SystemTime,
};
use thiserror::Error;

/// Failures that can occur while finding or reading a template file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("template name `{0}` points outside of the template directory")]
    OutsideDirectory(String),
    #[error("no template file at `{}`", .0.display())]
    Missing(PathBuf),
    #[error("failed to read the modification time of `{}`", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    /// Convert into an [`Error`] about the named template.
    pub fn into_error(self, name: &str) -> Error {
        let not_found = match &self {
            SourceError::OutsideDirectory(_) | SourceError::Missing(_) => true,
            SourceError::Metadata { source, .. } | SourceError::Read { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
        };

        if not_found {
            error_missing_template(name).with_source(self)
        } else {
            Error::new(ErrorKind::Io, format!("failed to read template `{name}`")).with_source(self)
        }
    }
}

/// The text of a template file, and when the file was last modified.
#[derive(Debug)]
pub struct TemplateSource {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub text: String,
}

/// Return the path of the named template within the directory.
///
/// The name is tried as given, and then with the suffix appended.
///
/// # Errors
///
/// Returns a [`SourceError`] if the name leaves the directory, or no file exists.
pub fn resolve(directory: &Path, name: &str, suffix: Option<&str>) -> Result<PathBuf, SourceError> {
    let relative = Path::new(name);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if name.is_empty() || !contained {
        return Err(SourceError::OutsideDirectory(name.to_owned()));
    }

    let direct = directory.join(relative);
    if direct.is_file() {
        return Ok(direct);
    }
    if let Some(suffix) = suffix {
        let suffixed = directory.join(format!("{name}.{suffix}"));
        if suffixed.is_file() {
            return Ok(suffixed);
        }
    }

    Err(SourceError::Missing(direct))
}

/// Return the modification time of the file.
pub fn modified(path: &Path) -> Result<SystemTime, SourceError> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|source| SourceError::Metadata {
            path: path.to_owned(),
            source,
        })
}

/// Read the template file.
///
/// The modification time is read before the text, so a write racing with
/// the read leaves the template looking stale rather than fresh.
pub fn read(path: &Path) -> Result<TemplateSource, SourceError> {
    let modified = modified(path)?;
    let text = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_owned(),
        source,
    })?;

    Ok(TemplateSource {
        path: path.to_owned(),
        modified,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::{read, resolve, SourceError};
    use crate::log::ErrorKind;
    use rstest::rstest;
    use std::fs;

    #[test]
    fn test_resolve_suffix() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("page.html"), "page").unwrap();
        fs::write(directory.path().join("plain"), "plain").unwrap();

        let path = resolve(directory.path(), "page", Some("html")).unwrap();
        assert_eq!(path, directory.path().join("page.html"));

        let path = resolve(directory.path(), "page.html", Some("html")).unwrap();
        assert_eq!(path, directory.path().join("page.html"));

        let path = resolve(directory.path(), "plain", None).unwrap();
        assert_eq!(read(&path).unwrap().text, "plain");

        assert!(matches!(
            resolve(directory.path(), "page", None),
            Err(SourceError::Missing(_))
        ));
    }

    #[rstest]
    #[case("../secret")]
    #[case("/etc/passwd")]
    #[case("a/../../b")]
    #[case("")]
    fn test_resolve_outside(#[case] name: &str) {
        let directory = tempfile::tempdir().unwrap();
        let error = resolve(directory.path(), name, None).unwrap_err();

        assert!(matches!(error, SourceError::OutsideDirectory(_)));
        assert_eq!(error.into_error(name).kind(), ErrorKind::NotFound);
    }
}
