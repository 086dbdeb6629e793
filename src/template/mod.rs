//! Template engine module for CARLOT.
//!
//! Provides a small Handlebars-style engine for rendering the HTML views.
//!
//! # Features
//!
//! - Variable expansion with HTML escaping: `{{variable}}`
//! - Raw (unescaped) expansion: `{{{variable}}}` (used for the layout's
//!   content slot)
//! - Conditionals: `{{#if condition}}...{{else}}...{{/if}}`
//! - Loops: `{{#each items}}...{{/each}}`
//!
//! # Example
//!
//! ```
//! use carlot::template::{TemplateContext, TemplateEngine, Value};
//!
//! let mut engine = TemplateEngine::new();
//! engine.load("greeting", "Hello, {{name}}!").unwrap();
//!
//! let mut context = TemplateContext::new();
//! context.set("name", Value::from("World"));
//!
//! let result = engine.render("greeting", &context).unwrap();
//! assert_eq!(result, "Hello, World!");
//! ```

mod parser;
mod renderer;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub use parser::{Node, Parser};
pub use renderer::Renderer;

/// Template-related errors.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Template parse error.
    #[error("template parse error in '{name}': {message}")]
    Parse {
        /// Template name.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// I/O error while loading templates from disk.
    #[error("template I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A value usable in a template context.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// List of values (for `{{#each}}`).
    List(Vec<Value>),
    /// Named sub-values (each-loop items).
    Map(HashMap<String, Value>),
}

impl Value {
    /// Truthiness used by `{{#if}}`: false, empty strings, empty lists,
    /// empty maps and zero are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Int(i) => *i != 0,
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }

    /// Text rendering of a scalar value. Lists and maps render empty.
    pub fn as_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::List(_) | Value::Map(_) => String::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

/// Named values made available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: HashMap<String, Value>,
}

impl TemplateContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Look up a named value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// The built-in templates, compiled into the binary.
///
/// A templates directory on disk (config `templates.path`) can override
/// any of these; anything it does not provide falls back to these.
const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("layout", include_str!("../../templates/layout.html")),
    ("auth/login", include_str!("../../templates/auth/login.html")),
    (
        "auth/register",
        include_str!("../../templates/auth/register.html"),
    ),
    ("home/index", include_str!("../../templates/home/index.html")),
    ("error", include_str!("../../templates/error.html")),
];

/// Template engine holding parsed templates by name.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    templates: HashMap<String, Vec<Node>>,
}

impl TemplateEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine preloaded with the built-in templates.
    pub fn with_defaults() -> Result<Self, TemplateError> {
        let mut engine = Self::new();
        for (name, source) in DEFAULT_TEMPLATES {
            engine.load(*name, source)?;
        }
        Ok(engine)
    }

    /// Parse and register a template under a name.
    pub fn load(&mut self, name: impl Into<String>, source: &str) -> Result<(), TemplateError> {
        let name = name.into();
        let nodes = Parser::new(source).parse().map_err(|message| {
            TemplateError::Parse {
                name: name.clone(),
                message,
            }
        })?;
        self.templates.insert(name, nodes);
        Ok(())
    }

    /// Load `.html` files from a directory as template overrides.
    ///
    /// `<dir>/auth/login.html` registers as `auth/login`. A missing
    /// directory is not an error; the built-ins simply stay in effect.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, TemplateError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Ok(0);
        }
        let mut loaded = 0;
        self.load_dir_inner(dir, dir, &mut loaded)?;
        Ok(loaded)
    }

    fn load_dir_inner(
        &mut self,
        root: &Path,
        dir: &Path,
        loaded: &mut usize,
    ) -> Result<(), TemplateError> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.load_dir_inner(root, &path, loaded)?;
            } else if path.extension().is_some_and(|e| e == "html") {
                let name = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .with_extension("")
                    .to_string_lossy()
                    .replace('\\', "/");
                let source = std::fs::read_to_string(&path)?;
                self.load(name, &source)?;
                *loaded += 1;
            }
        }
        Ok(())
    }

    /// Check whether a template is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Render a template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String, TemplateError> {
        let nodes = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        Ok(Renderer::new(context).render(nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_variable() {
        let mut engine = TemplateEngine::new();
        engine.load("t", "Hello, {{name}}!").unwrap();

        let mut ctx = TemplateContext::new();
        ctx.set("name", Value::from("World"));

        assert_eq!(engine.render("t", &ctx).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_render_missing_template() {
        let engine = TemplateEngine::new();
        let result = engine.render("nope", &TemplateContext::new());
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_with_defaults_registers_views() {
        let engine = TemplateEngine::with_defaults().unwrap();
        assert!(engine.contains("layout"));
        assert!(engine.contains("auth/login"));
        assert!(engine.contains("auth/register"));
        assert!(engine.contains("home/index"));
        assert!(engine.contains("error"));
    }

    #[test]
    fn test_value_truthiness() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::Int(1).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::List(vec![Value::Int(1)]).is_truthy());
    }

    #[test]
    fn test_value_as_text() {
        assert_eq!(Value::from("abc").as_text(), "abc");
        assert_eq!(Value::Int(42).as_text(), "42");
        assert_eq!(Value::Bool(true).as_text(), "true");
        assert_eq!(Value::List(vec![]).as_text(), "");
    }

    #[test]
    fn test_load_dir_overrides() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("auth")).unwrap();
        let mut f = std::fs::File::create(dir.path().join("auth").join("login.html")).unwrap();
        write!(f, "override {{{{title}}}}").unwrap();

        let mut engine = TemplateEngine::with_defaults().unwrap();
        let loaded = engine.load_dir(dir.path()).unwrap();
        assert_eq!(loaded, 1);

        let mut ctx = TemplateContext::new();
        ctx.set("title", Value::from("X"));
        assert_eq!(engine.render("auth/login", &ctx).unwrap(), "override X");
    }

    #[test]
    fn test_load_dir_missing_is_noop() {
        let mut engine = TemplateEngine::new();
        assert_eq!(engine.load_dir("no/such/dir").unwrap(), 0);
    }
}
