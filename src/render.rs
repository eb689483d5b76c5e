mod compare;
mod frame;

pub(crate) use compare::type_name;

use crate::{
    compile::{
        tree::{Access, Expression, For, If, Link, LogicalOperator, LoopVariables, Tree, UnaryOperator},
        Scope, Template,
    },
    log::{error_missing_template, error_undefined, error_write, Error, ErrorKind, INCOMPATIBLE_TYPES, INVALID_FUNCTION},
    pipe::Pipe,
    Engine, Store,
};
use serde_json::{json, Value};
use std::{borrow::Cow, fmt::Write, ptr};
use tracing::trace;

use self::{
    compare::{apply_operator, contains, is_truthy, negate},
    frame::Frames,
};

/// Name of the block a template fills when it implicitly extends the default base.
pub(crate) const CONTENT: &str = "content";

/// Render a [`Template`].
///
/// Provides a shortcut to quickly render a `Template` when no advanced features
/// are needed.
///
/// You may also prefer to create an [`Engine`][`crate::Engine`] if you intend to
/// use custom functions or globals in your templates, or load templates that
/// extend or include other templates.
///
/// # Examples
///
/// ```
/// use brim::{compile, render, Store};
///
/// let template = compile("hello, (( name ))!");
/// assert!(template.is_ok());
///
/// let output = render(&template.unwrap(), &Store::new().with_must("name", "taylor"));
/// assert_eq!(output.unwrap(), "hello, taylor!");
/// ```
pub fn render(template: &Template, store: &Store) -> Result<String, Error> {
    Renderer::new(&Engine::default(), template, store).render()
}

pub struct Renderer<'render> {
    /// An engine containing any registered functions and globals.
    engine: &'render Engine,
    /// The template being rendered.
    template: &'render Template,
    /// The default base, when the template implicitly extends it.
    layout: Option<&'render Template>,
    /// The Store that the Template is rendered with.
    store: &'render Store,
    /// Values bound to the parameters of the template.
    arguments: &'render [Value],
    /// Local names.
    frames: Frames,
}

impl<'render> Renderer<'render> {
    /// Create a new Renderer.
    ///
    /// The positional arguments of the [`Store`] are bound to the parameters
    /// of the [`Template`].
    pub fn new(engine: &'render Engine, template: &'render Template, store: &'render Store) -> Self {
        Renderer {
            engine,
            template,
            layout: None,
            store,
            arguments: store.positional(),
            frames: Frames::new(),
        }
    }

    /// Render the [`Template`] into the given layout, which fills the
    /// [`CONTENT`] block with the output of the `Template` unless it
    /// declares that block itself.
    pub fn with_layout(mut self, layout: &'render Template) -> Self {
        self.layout = Some(layout);

        self
    }

    /// Start rendering with the given local names, and no positional arguments.
    fn with_frames(mut self, frames: Frames) -> Self {
        self.frames = frames;
        self.arguments = &[];

        self
    }

    /// Render the [`Template`] stored inside the [`Renderer`].
    ///
    /// The base-most template in the inheritance chain is rendered, with each
    /// block taken from the template nearest to the one requested.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if rendering any of the [`Tree`] instances within the `Template`
    /// fails, or writing the rendered `Tree` to the buffer fails. No output is
    /// returned when an error occurs.
    pub fn render(&mut self) -> Result<String, Error> {
        let name = self.template.name().unwrap_or("?");
        trace!(template = name, "render started");

        for template in self.chain() {
            if let (Some(extends), None) = (&template.extends, &template.base) {
                return Err(named(
                    error_missing_template(&extends.name)
                        .with_position(extends.position)
                        .with_help("templates that extend another must be loaded by an `Engine`"),
                    template,
                ));
            }
        }

        self.bind_parameters().map_err(|e| named(e, self.template))?;

        let root = self.root();
        let mut buffer = String::new();
        let mut pipe = Pipe::new(&mut buffer);
        self.render_scope(&root.scope, root, &mut pipe)
            .map_err(|e| named(e, root))?;

        trace!(template = name, bytes = buffer.len(), "render finished");

        Ok(buffer)
    }

    /// Return the requested [`Template`], followed by every template it extends.
    fn chain(&self) -> impl Iterator<Item = &'render Template> {
        self.template
            .chain()
            .chain(self.layout.into_iter().flat_map(|layout| layout.chain()))
    }

    /// Return the base-most [`Template`], whose tree is rendered.
    fn root(&self) -> &'render Template {
        self.chain().last().unwrap_or(self.template)
    }

    /// Bind the positional arguments and defaults to the parameters the
    /// [`Template`] declares with `with`.
    ///
    /// A parameter with no argument may also be satisfied by a named value
    /// of the same name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when there are more arguments than parameters, or
    /// a parameter receives no value at all.
    fn bind_parameters(&mut self) -> Result<(), Error> {
        let template = self.template;
        let parameters = &template.parameters;
        if self.arguments.len() > parameters.len() {
            return Err(Error::build("too many arguments").with_help(format!(
                "the template declares `{}` parameters with `with`, but received `{}` arguments",
                parameters.len(),
                self.arguments.len()
            )));
        }

        for (index, parameter) in parameters.iter().enumerate() {
            let value = match (self.arguments.get(index), &parameter.default) {
                (Some(argument), _) => argument.clone(),
                (None, _) if self.lookup(&parameter.name).is_some() => continue,
                (None, Some(default)) => self.evaluate(default)?.into_owned(),
                (None, None) => {
                    return Err(Error::build("missing argument").with_help(format!(
                        "parameter `{}` has no default, pass it as a positional \
                        argument or a named value",
                        parameter.name
                    )))
                }
            };

            self.frames.bind(&parameter.name, value);
        }

        Ok(())
    }

    /// Render the given [`Scope`].
    ///
    /// The `owner` is the [`Template`] the `Scope` was compiled from, which
    /// is where includes are found.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if any of the [`Tree`] instances in the `Scope` cannot be rendered.
    fn render_scope(
        &mut self,
        scope: &'render Scope,
        owner: &'render Template,
        pipe: &mut Pipe,
    ) -> Result<(), Error> {
        for tree in &scope.data {
            match tree {
                Tree::Raw(text) => pipe.write_str(text).map_err(|_| error_write())?,
                Tree::Output(output) => {
                    let value = self.evaluate(&output.expression)?;
                    pipe.write_value(&value, !output.raw)
                        .map_err(|_| error_write())?
                }
                Tree::If(tree) => self.render_if(tree, owner, pipe)?,
                Tree::For(tree) => self.render_for(tree, owner, pipe)?,
                Tree::While(tree) => loop {
                    let truthy = is_truthy(&*self.evaluate(&tree.condition)?);
                    if !truthy {
                        break;
                    }

                    self.render_body(&tree.body, owner, pipe)?;
                },
                Tree::Set(set) => {
                    let value = self.evaluate(&set.value)?.into_owned();
                    self.frames.set(&set.name, value);
                }
                Tree::Block(link) => self.render_block(link, pipe)?,
                Tree::Include(link) => self.render_include(link, owner, pipe)?,
            }
        }

        Ok(())
    }

    /// Render a nested [`Scope`] within its own frame.
    fn render_body(
        &mut self,
        scope: &'render Scope,
        owner: &'render Template,
        pipe: &mut Pipe,
    ) -> Result<(), Error> {
        self.frames.push();
        let result = self.render_scope(scope, owner, pipe);
        self.frames.pop();

        result
    }

    /// Render the first branch of the [`If`] with a truthy condition.
    fn render_if(
        &mut self,
        tree: &'render If,
        owner: &'render Template,
        pipe: &mut Pipe,
    ) -> Result<(), Error> {
        for (condition, body) in &tree.branches {
            let truthy = is_truthy(&*self.evaluate(condition)?);
            if truthy {
                return self.render_body(body, owner, pipe);
            }
        }

        match &tree.else_branch {
            Some(body) => self.render_body(body, owner, pipe),
            None => Ok(()),
        }
    }

    /// Render the body of the [`For`] once for each item.
    ///
    /// Lists and strings yield their items and characters, objects yield their
    /// keys. With two loop variables, the first is bound to the index or key.
    fn render_for(
        &mut self,
        tree: &'render For,
        owner: &'render Template,
        pipe: &mut Pipe,
    ) -> Result<(), Error> {
        let iterable = self.evaluate(&tree.iterable)?.into_owned();
        let keyed = iterable.is_object();
        let items: Vec<(Value, Value)> = match iterable {
            Value::Array(array) => array
                .into_iter()
                .enumerate()
                .map(|(index, item)| (json!(index), item))
                .collect(),
            Value::Object(object) => object
                .into_iter()
                .map(|(key, item)| (Value::String(key), item))
                .collect(),
            Value::String(string) => string
                .chars()
                .enumerate()
                .map(|(index, char)| (json!(index), Value::String(char.to_string())))
                .collect(),
            other => {
                return Err(Error::build(INCOMPATIBLE_TYPES)
                    .with_help(format!(
                        "a `for` loop can iterate over a list, object or string, found `{}`",
                        type_name(&other)
                    ))
                    .with_position(tree.position))
            }
        };

        let length = items.len();
        for (index, (key, item)) in items.into_iter().enumerate() {
            self.frames.push();
            match &tree.variables {
                LoopVariables::Item(name) => {
                    self.frames.bind(name, if keyed { key } else { item });
                }
                LoopVariables::KeyValue(key_name, item_name) => {
                    self.frames.bind(key_name, key);
                    self.frames.bind(item_name, item);
                }
            }
            self.frames.bind(
                "loop",
                json!({
                    "index": index + 1,
                    "index0": index,
                    "first": index == 0,
                    "last": index + 1 == length,
                    "length": length,
                }),
            );

            let result = self.render_scope(&tree.body, owner, pipe);
            self.frames.pop();
            result?;
        }

        Ok(())
    }

    /// Render the nearest definition of the named block.
    fn render_block(&mut self, link: &'render Link, pipe: &mut Pipe) -> Result<(), Error> {
        let Some((owner, body)) = self.find_block(&link.name) else {
            return Err(Error::build(format!("block `{}` is not defined", link.name))
                .with_position(link.position));
        };

        self.render_body(body, owner, pipe)
            .map_err(|e| named(e, owner))
    }

    /// Return the first definition of the named block, walking from the
    /// requested [`Template`] toward the base-most one.
    fn find_block(&self, name: &str) -> Option<(&'render Template, &'render Scope)> {
        for template in self.chain() {
            if let Some(body) = template.block(name) {
                return Some((template, body));
            }
            if self.layout.is_some() && name == CONTENT && ptr::eq(template, self.template) {
                return Some((template, &template.scope));
            }
        }

        None
    }

    /// Render an included [`Template`] with a snapshot of the local names.
    fn render_include(
        &mut self,
        link: &'render Link,
        owner: &'render Template,
        pipe: &mut Pipe,
    ) -> Result<(), Error> {
        let Some(included) = owner.included.get(&link.name) else {
            return Err(error_missing_template(&link.name)
                .with_position(link.position)
                .with_help("templates that include another must be loaded by an `Engine`"));
        };

        let output = Renderer::new(self.engine, included, self.store)
            .with_frames(self.frames.snapshot())
            .render()?;

        pipe.write_str(&output).map_err(|_| error_write())
    }

    /// Return the value of the name from the locals, the [`Store`] or the globals,
    /// in that order.
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames
            .get(name)
            .or_else(|| self.store.get(name))
            .or_else(|| self.engine.globals().get(name))
    }

    /// Evaluate an [`Expression`] to return a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a name is undefined, a function fails, or an
    /// operator is applied to the wrong types.
    fn evaluate<'a>(&'a self, expression: &'a Expression) -> Result<Cow<'a, Value>, Error> {
        match expression {
            Expression::Literal(literal) => Ok(Cow::Borrowed(&literal.value)),
            Expression::Variable(variable) => self
                .lookup(&variable.name)
                .map(Cow::Borrowed)
                .ok_or_else(|| error_undefined(&variable.name).with_position(variable.position)),
            Expression::Access(access) => self.evaluate_access(access),
            Expression::Call(call) => {
                let function = self.engine.get_function(&call.name).ok_or_else(|| {
                    Error::new(ErrorKind::Name, INVALID_FUNCTION)
                        .with_help(format!(
                            "template wants to use the `{}` function, but a function with that \
                            name was not found in this engine, did you add the function to the \
                            engine with `.add_function`?",
                            call.name
                        ))
                        .with_position(call.position)
                })?;
                let arguments = call
                    .arguments
                    .iter()
                    .map(|argument| self.evaluate(argument).map(Cow::into_owned))
                    .collect::<Result<Vec<Value>, Error>>()?;

                function
                    .call(&arguments)
                    .map(Cow::Owned)
                    .map_err(|e| e.with_position(call.position))
            }
            Expression::Unary(unary) => {
                let operand = self.evaluate(&unary.operand)?;
                let value = match unary.operator {
                    UnaryOperator::Not => Value::Bool(!is_truthy(&operand)),
                    UnaryOperator::Negative => {
                        negate(&operand).map_err(|e| e.with_position(unary.position))?
                    }
                };

                Ok(Cow::Owned(value))
            }
            Expression::Binary(binary) => {
                let left = self.evaluate(&binary.left)?;
                let right = self.evaluate(&binary.right)?;

                apply_operator(&left, binary.operator, &right)
                    .map(Cow::Owned)
                    .map_err(|e| e.with_position(binary.position))
            }
            Expression::Logical(logical) => {
                let left = self.evaluate(&logical.left)?;
                let decided = match logical.operator {
                    LogicalOperator::And => !is_truthy(&left),
                    LogicalOperator::Or => is_truthy(&left),
                };

                if decided {
                    Ok(left)
                } else {
                    self.evaluate(&logical.right)
                }
            }
            Expression::Membership(membership) => {
                let needle = self.evaluate(&membership.needle)?;
                let haystack = self.evaluate(&membership.haystack)?;

                contains(&needle, &haystack)
                    .map(|found| Cow::Owned(Value::Bool(found)))
                    .map_err(|e| e.with_position(membership.position))
            }
            Expression::Conditional(conditional) => {
                let truthy = is_truthy(&*self.evaluate(&conditional.condition)?);
                if truthy {
                    self.evaluate(&conditional.then)
                } else {
                    self.evaluate(&conditional.otherwise)
                }
            }
            Expression::List(list) => list
                .items
                .iter()
                .map(|item| self.evaluate(item).map(Cow::into_owned))
                .collect::<Result<Vec<Value>, Error>>()
                .map(|items| Cow::Owned(Value::Array(items))),
        }
    }

    /// Evaluate an [`Access`], borrowing from the target when possible.
    ///
    /// Objects are indexed by string, lists by number and strings by number
    /// to return a single character.
    fn evaluate_access<'a>(&'a self, access: &'a Access) -> Result<Cow<'a, Value>, Error> {
        let target = self.evaluate(&access.target)?;
        let key = self.evaluate(&access.key)?;

        let found = match target {
            Cow::Borrowed(Value::String(string)) => char_at(string, &key).map(Cow::Owned),
            Cow::Owned(Value::String(string)) => char_at(&string, &key).map(Cow::Owned),
            Cow::Borrowed(target) => get_key(target, &key).map(Cow::Borrowed),
            Cow::Owned(target) => get_key(&target, &key).cloned().map(Cow::Owned),
        };

        found.ok_or_else(|| error_missing_key(&key).with_position(access.position))
    }
}

/// Return the value found at the key of an object or list.
fn get_key<'v>(target: &'v Value, key: &Value) -> Option<&'v Value> {
    match (target, key) {
        (Value::Object(object), Value::String(key)) => object.get(key),
        (Value::Array(array), key) => index_of(array.len(), key).and_then(|i| array.get(i)),
        _ => None,
    }
}

/// Return the character found at the index of a string.
fn char_at(string: &str, key: &Value) -> Option<Value> {
    let chars = string.chars().collect::<Vec<char>>();

    index_of(chars.len(), key)
        .and_then(|i| chars.get(i))
        .map(|char| Value::String(char.to_string()))
}

/// Resolve a numeric key, or a string holding one, to an index of a list.
///
/// Negative numbers count from the end of the list.
fn index_of(length: usize, key: &Value) -> Option<usize> {
    let index = match key {
        Value::Number(number) => number.as_i64()?,
        Value::String(string) => string.parse::<i64>().ok()?,
        _ => return None,
    };
    let resolved = if index < 0 {
        (length as i64).checked_add(index)?
    } else {
        index
    };

    usize::try_from(resolved).ok().filter(|i| *i < length)
}

/// Return an [`Error`] describing a key that is not found.
fn error_missing_key(key: &Value) -> Error {
    let shown = match key {
        Value::String(string) => string.clone(),
        other => other.to_string(),
    };

    Error::build("missing attribute").with_help(format!(
        "the value has no attribute or index `{shown}`"
    ))
}

/// Attach the name of the [`Template`] to the [`Error`], if it has one and the
/// `Error` is not already named.
fn named(error: Error, template: &Template) -> Error {
    match template.name() {
        Some(name) => error.in_template(name),
        None => error,
    }
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::{compile, log::ErrorKind, region::Position, Engine, Store};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn render_text(text: &str, store: &Store) -> String {
        render(&compile(text).unwrap(), store).unwrap()
    }

    #[test]
    fn test_render_raw() {
        let text = "hello there\n  )) not a tag *)\n";
        let result = render(&compile("hello there").unwrap(), &Store::new());

        assert_eq!(result.unwrap(), "hello there");
        assert_eq!(render_text(text, &Store::new()), text);
    }

    #[test]
    fn test_render_output() {
        let store = Store::new().with_must("name", "taylor");

        assert_eq!(render_text("hello there, (( name ))!", &store), "hello there, taylor!");
    }

    #[test]
    fn test_render_escape() {
        let store = Store::new().with_must("html", "<a href=\"x\">Tom & 'Jerry'</a>");

        assert_eq!(
            render_text("(( html ))", &store),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(
            render_text("((: html ))", &store),
            "<a href=\"x\">Tom & 'Jerry'</a>"
        );
    }

    #[test]
    fn test_render_trim() {
        let store = Store::new().with_must("name", "taylor");

        assert_eq!(render_text("a   ((- name -))   b", &store), "ataylorb");
        assert_eq!(
            render_text("<ul>\n  (*- if true -*)\n  <li>\n  (*- end -*)\n</ul>", &store),
            "<ul><li></ul>"
        );
    }

    #[test]
    fn test_render_if() {
        let template = "(* if left > 300 *)a\
            (* elif name == \"taylor\" *)b\
            (* else if not false *)c\
            (* else *)d\
            (* end *)";
        let store = Store::new().with_must("left", 101).with_must("name", "");

        assert_eq!(render_text(template, &store), "c");
    }

    #[test]
    fn test_render_for() {
        let store = Store::new().with_must("items", ["a", "b", "c"]);

        assert_eq!(
            render_text("(* for item in items *)<(( item ))>(* end *)", &store),
            "<a><b><c>"
        );
        assert_eq!(
            render_text(
                "(* for item in items *)(( loop.index ))/(( loop.length ))\
                (* if not loop.last *), (* end *)(* end *)",
                &store
            ),
            "1/3, 2/3, 3/3"
        );
    }

    #[test]
    fn test_render_for_object() {
        let store = Store::new().with_must("person", json!({"age": 33, "name": "taylor"}));

        assert_eq!(
            render_text("(* for key in person *)(( key ));(* end *)", &store),
            "age;name;"
        );
        assert_eq!(
            render_text("(* for k, v in person *)(( k ))=(( v ));(* end *)", &store),
            "age=33;name=taylor;"
        );
        assert_eq!(
            render_text("(* for i, c in \"ab\" *)(( i ))(( c ))(* end *)", &store),
            "0a1b"
        );
    }

    #[test]
    fn test_render_loop_variable_is_scoped() {
        let result = render(
            &compile("(* for item in [1] *)(* end *)(( item ))").unwrap(),
            &Store::new(),
        );

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Name);
    }

    #[test]
    fn test_render_while_and_set() {
        assert_eq!(
            render_text(
                "(* set n = 0 *)(* while n < 3 *)(( n ))(* set n = n + 1 *)(* end *)",
                &Store::new()
            ),
            "012"
        );
    }

    #[test]
    fn test_render_set_scope() {
        let text = "(* set total = 0 *)\
            (* for n in [1, 2, 3] *)(* set total = total + n *)(* set last = n *)(* end *)\
            (( total ))";

        assert_eq!(render_text(text, &Store::new()), "6");
        assert!(render(
            &compile("(* if true *)(* set inner = 1 *)(* end *)(( inner ))").unwrap(),
            &Store::new()
        )
        .is_err());
    }

    #[test]
    fn test_render_set_shadows_store() {
        let store = Store::new().with_must("name", "store");

        assert_eq!(
            render_text("(( name ))(* set name = \"local\" *)(( name ))", &store),
            "storelocal"
        );
    }

    #[rstest]
    #[case("(( 1 + 2 * 3 ))", "7")]
    #[case("(( (1 + 2) * 3 ))", "9")]
    #[case("(( 7 / 2 ))", "3.5")]
    #[case("(( -n ))", "-4")]
    #[case("(( \"a\" + 'b' ))", "ab")]
    #[case("(( [1] + [2] ))", "[1, 2]")]
    #[case("(( 2 in [1, 2] ))", "true")]
    #[case("(( \"y\" if n > 3 else \"n\" ))", "y")]
    #[case("(( none or \"fallback\" ))", "fallback")]
    #[case("(( 0 and explode ))", "0")]
    #[case("(( none ))", "")]
    #[case("(( person.name ))", "taylor")]
    #[case("(( person[\"name\"] ))", "taylor")]
    #[case("(( items[1] ))", "b")]
    #[case("(( items[-1] ))", "c")]
    #[case("(( items.0 ))", "a")]
    #[case("(( \"taylor\"[-1] ))", "r")]
    #[case("(( len(items) ))", "3")]
    #[case("(( items | join(\"-\") | upper ))", "A-B-C")]
    #[case("(( person ))", "{name: taylor}")]
    #[case("(( range(3) ))", "[0, 1, 2]")]
    #[case("(( str(n) + \"!\" ))", "4!")]
    #[case("(( nothing == none ))", "true")]
    fn test_render_expression(#[case] text: &str, #[case] expect: &str) {
        let store = Store::new()
            .with_must("n", 4)
            .with_must("nothing", json!(null))
            .with_must("items", ["a", "b", "c"])
            .with_must("person", json!({"name": "taylor"}));

        assert_eq!(render_text(text, &store), expect);
    }

    #[test]
    fn test_render_undefined_name() {
        let error = render(&compile("line one\n  (( missing ))").unwrap(), &Store::new())
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Name);
        assert!(error.reason().contains("missing"));
        assert_eq!(error.position(), Some(Position::new(2, 6)));
    }

    #[rstest]
    #[case("(( person.age ))")]
    #[case("(( items[5] ))")]
    #[case("(( 1 / 0 ))")]
    #[case("(( \"a\" + 1 ))")]
    #[case("(( \"a\" > 1 ))")]
    #[case("(* for x in 5 *)(* end *)")]
    #[case("(( unknown_function(1) ))")]
    #[case("(( upper(1) ))")]
    fn test_render_error(#[case] text: &str) {
        let store = Store::new()
            .with_must("items", ["a"])
            .with_must("person", json!({"name": "taylor"}));

        assert!(render(&compile(text).unwrap(), &store).is_err(), "{text}");
    }

    #[test]
    fn test_render_globals() {
        let engine = Engine::default().with_global_must("site", "brim");
        let template = engine.compile("(( site ))/(( page ))").unwrap();

        assert_eq!(
            engine
                .render_template(&template, &Store::new().with_must("page", "home"))
                .unwrap(),
            "brim/home"
        );
        assert_eq!(
            engine
                .render_template(&template, &Store::new().with_must("page", "x").with_must("site", "ctx"))
                .unwrap(),
            "ctx/x"
        );
    }

    #[test]
    fn test_render_parameters() {
        let template = compile("(* with title, count = 1 *)(( title )):(( count ))").unwrap();

        let store = Store::new().with_arg_must("a").with_arg_must(2);
        assert_eq!(render(&template, &store).unwrap(), "a:2");

        let store = Store::new().with_arg_must("a");
        assert_eq!(render(&template, &store).unwrap(), "a:1");

        let store = Store::new().with_must("title", "named");
        assert_eq!(render(&template, &store).unwrap(), "named:1");

        assert!(render(&template, &Store::new()).is_err());
        assert!(render(&template, &Store::new().with_arg_must(1).with_arg_must(2).with_arg_must(3)).is_err());
    }

    #[test]
    fn test_render_blocks_in_place() {
        assert_eq!(
            render_text("a(* block b *)b(* block c *)c(* end *)(* end *)d", &Store::new()),
            "abcd"
        );
    }

    #[test]
    fn test_render_extends_requires_engine() {
        let error = render(
            &compile("(* extends \"base\" *)").unwrap(),
            &Store::new(),
        )
        .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotFound);
    }
}
