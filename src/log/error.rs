use super::{Pointer, RED, RESET};
use crate::{
    log::Visual,
    region::{Position, Region},
};
use std::fmt::{Debug, Display, Formatter, Result};

/// Describes which stage of the engine produced an [`Error`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// Malformed markers, such as an expression that is never closed.
    Lex,
    /// Malformed statement or expression structure.
    Parse,
    /// A name that is not defined in the locals, the `Store` or the globals.
    Name,
    /// No template file matches the requested name.
    NotFound,
    /// An inheritance or include chain that revisits one of its own templates.
    CircularExtends,
    /// A failure while evaluating a template, such as comparing incompatible types.
    Render,
    /// Reading a template file failed for a reason other than it being missing.
    Io,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ErrorKind::Lex => write!(f, "lex error"),
            ErrorKind::Parse => write!(f, "parse error"),
            ErrorKind::Name => write!(f, "name error"),
            ErrorKind::NotFound => write!(f, "template not found"),
            ErrorKind::CircularExtends => write!(f, "circular extends"),
            ErrorKind::Render => write!(f, "render error"),
            ErrorKind::Io => write!(f, "io error"),
        }
    }
}

/// Describes an error, and allows adding a contextual help text and visualization.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use brim::{Error, ErrorKind, Region};
///
/// let error = Error::new(ErrorKind::Parse, "unexpected keyword")
///     .with_pointer("(* update name *)", Region::new(3..9))
///     .with_name("template.txt")
///     .with_help(r#"expected one of "if", "set", "for""#);
///
/// assert_eq!(error.position().map(|p| (p.line, p.column)), Some((1, 4)));
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// parse error: unexpected keyword
///   --> template.txt:1:4
///    |
///  1 | (* update name *)
///    |    ^^^^^^
///    |
///   = help: expected one of "if", "set", "for"
/// ```
pub struct Error {
    /// The stage that produced the [`Error`].
    kind: ErrorKind,
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the Template that the [`Error`] comes from.
    name: Option<String>,
    /// Location of the [`Error`] within the template source.
    position: Option<Position>,
    /// The lower level error that caused this one, if any.
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new [`Error`] of the given kind with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    pub fn new<T>(kind: ErrorKind, reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            kind,
            reason: reason.into(),
            visual: None,
            help: None,
            name: None,
            position: None,
            source: None,
        }
    }

    /// Create a new [`Error`] with the given reason text and [`ErrorKind::Render`].
    ///
    /// This is the constructor a [`Function`][`crate::Function`] should reach for.
    ///
    /// # Examples
    ///
    /// ```
    /// use brim::{Error, ErrorKind};
    ///
    /// let error = Error::build("function `upper` requires string input")
    ///     .with_help("use quotes to coerce data to string");
    ///
    /// assert_eq!(error.kind(), ErrorKind::Render);
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::new(ErrorKind::Render, reason)
    }

    /// Set the reason text, which is a short summary of the [`Error`].
    pub fn with_reason<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.reason = text.into();

        self
    }

    /// Set the name text, which is the name of the [`Template`][`crate::Template`]
    /// that the [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the name text, unless a name has already been set.
    ///
    /// Errors bubbling out of a base or included template keep the name of
    /// the template they were raised in.
    pub fn in_template<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        if self.name.is_none() {
            self.name = Some(text.into());
        }

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source text and
    /// [`Region`].
    ///
    /// The [`Position`] of the `Error` is set to the beginning of the `Region`.
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        let pointer = Pointer::new(source, region.into());
        self.position = Some(pointer.position());
        self.visual = Some(Box::new(pointer));

        self
    }

    /// Set the [`Position`], used when no source text is available to
    /// build a [`Pointer`].
    ///
    /// A position that was already set is left alone, the innermost
    /// position is the most precise.
    pub fn with_position(mut self, position: Position) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Set the lower level error that caused this [`Error`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));

        self
    }

    /// Return the [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the reason text.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the `Template` that the error is related to.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the [`Position`] of the error within the template source, if known.
    pub fn position(&self) -> Option<Position> {
        self.position
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("position", &self.position)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .field("source", &self.source)
            .finish()?;

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            write!(f, "{}: {}", self.kind, self.reason)?;
            return match (&self.name, self.position) {
                (Some(name), Some(position)) => write!(f, " ({name}:{position})"),
                (Some(name), None) => write!(f, " ({name})"),
                (None, Some(position)) => write!(f, " (?:{position})"),
                (None, None) => Ok(()),
            };
        }

        write!(f, "{RED}{}{RESET}: {}", self.kind, self.reason)?;

        if let Some(visual) = &self.visual {
            return visual.display(f, self.name.as_deref(), self.help.as_deref());
        }

        if let Some(position) = self.position {
            let name = self.name.as_deref().unwrap_or("?");
            write!(f, "\n  --> {name}:{position}\n")?;
        }
        if let Some(help) = &self.help {
            writeln!(f, "  = help: {help}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.reason == other.reason
            && self.help == other.help
            && self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};
    use crate::region::Position;

    #[test]
    fn test_display_plain() {
        let error = Error::new(ErrorKind::Name, "undefined name `user`")
            .with_name("page.html")
            .with_position(Position::new(3, 7));

        assert_eq!(
            error.to_string(),
            "name error: undefined name `user` (page.html:3:7)"
        );
    }

    #[test]
    fn test_in_template_keeps_inner_name() {
        let error = Error::build("boom").with_name("base.html").in_template("child.html");

        assert_eq!(error.get_name(), Some("base.html"));
    }

    #[test]
    fn test_with_position_keeps_innermost() {
        let error = Error::build("boom")
            .with_position(Position::new(1, 2))
            .with_position(Position::new(5, 5));

        assert_eq!(error.position(), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_pointer_sets_position() {
        let error = Error::new(ErrorKind::Lex, "unexpected token")
            .with_pointer("one\ntwo (( three", 8..10);

        assert_eq!(error.position(), Some(Position::new(2, 5)));
        assert!(format!("{error:#}").contains("two (( three"));
    }
}
