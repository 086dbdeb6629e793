//! Template renderer.
//!
//! Walks a parsed node tree against a [`TemplateContext`]. Inside an
//! `{{#each}}` body, map items bring their keys into scope, shadowing
//! outer names; scalar items are addressable as `this`.

use super::parser::Node;
use super::{TemplateContext, Value};

/// Renders parsed templates against a context.
pub struct Renderer<'a> {
    context: &'a TemplateContext,
}

impl<'a> Renderer<'a> {
    /// Create a renderer over a context.
    pub fn new(context: &'a TemplateContext) -> Self {
        Self { context }
    }

    /// Render a node list to a string.
    pub fn render(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        self.render_nodes(nodes, &[], &mut out);
        out
    }

    fn render_nodes(&self, nodes: &[Node], scopes: &[&Value], out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Variable { name, raw } => {
                    if let Some(value) = self.lookup(name, scopes) {
                        let text = value.as_text();
                        if *raw {
                            out.push_str(&text);
                        } else {
                            out.push_str(&html_escape(&text));
                        }
                    }
                }
                Node::If {
                    name,
                    then_branch,
                    else_branch,
                } => {
                    let truthy = self
                        .lookup(name, scopes)
                        .map(Value::is_truthy)
                        .unwrap_or(false);
                    let branch = if truthy { then_branch } else { else_branch };
                    self.render_nodes(branch, scopes, out);
                }
                Node::Each { name, body } => {
                    let items = match self.lookup(name, scopes) {
                        Some(Value::List(items)) => items.clone(),
                        _ => continue,
                    };
                    for item in &items {
                        let mut inner: Vec<&Value> = scopes.to_vec();
                        inner.push(item);
                        self.render_nodes(body, &inner, out);
                    }
                }
            }
        }
    }

    /// Resolve a name: innermost each-scope first, then the root context.
    fn lookup<'v>(&'v self, name: &str, scopes: &[&'v Value]) -> Option<&'v Value> {
        for scope in scopes.iter().rev() {
            match scope {
                Value::Map(map) => {
                    if let Some(value) = map.get(name) {
                        return Some(value);
                    }
                }
                value if name == "this" => return Some(value),
                _ => {}
            }
        }
        self.context.get(name)
    }
}

/// Escape the characters HTML treats specially.
fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateEngine;
    use std::collections::HashMap;

    fn render(source: &str, ctx: &TemplateContext) -> String {
        let mut engine = TemplateEngine::new();
        engine.load("t", source).unwrap();
        engine.render("t", ctx).unwrap()
    }

    #[test]
    fn test_variable_is_escaped() {
        let mut ctx = TemplateContext::new();
        ctx.set("v", Value::from("<b>&\"'"));
        assert_eq!(render("{{v}}", &ctx), "&lt;b&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_raw_variable_is_not_escaped() {
        let mut ctx = TemplateContext::new();
        ctx.set("v", Value::from("<b>bold</b>"));
        assert_eq!(render("{{{v}}}", &ctx), "<b>bold</b>");
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        assert_eq!(render("[{{missing}}]", &TemplateContext::new()), "[]");
    }

    #[test]
    fn test_if_branches() {
        let mut ctx = TemplateContext::new();
        ctx.set("ok", Value::Bool(true));
        assert_eq!(render("{{#if ok}}yes{{else}}no{{/if}}", &ctx), "yes");

        ctx.set("ok", Value::Bool(false));
        assert_eq!(render("{{#if ok}}yes{{else}}no{{/if}}", &ctx), "no");
    }

    #[test]
    fn test_if_missing_name_takes_else() {
        assert_eq!(
            render("{{#if nope}}yes{{else}}no{{/if}}", &TemplateContext::new()),
            "no"
        );
    }

    #[test]
    fn test_each_over_maps() {
        let mut ctx = TemplateContext::new();
        let items = vec![
            Value::Map(HashMap::from([("name".to_string(), Value::from("a"))])),
            Value::Map(HashMap::from([("name".to_string(), Value::from("b"))])),
        ];
        ctx.set("items", Value::List(items));
        assert_eq!(
            render("{{#each items}}<{{name}}>{{/each}}", &ctx),
            "<a><b>"
        );
    }

    #[test]
    fn test_each_over_scalars_with_this() {
        let mut ctx = TemplateContext::new();
        ctx.set(
            "items",
            Value::List(vec![Value::from("x"), Value::from("y")]),
        );
        assert_eq!(render("{{#each items}}{{this}};{{/each}}", &ctx), "x;y;");
    }

    #[test]
    fn test_each_scope_shadows_outer() {
        let mut ctx = TemplateContext::new();
        ctx.set("name", Value::from("outer"));
        ctx.set(
            "items",
            Value::List(vec![Value::Map(HashMap::from([(
                "name".to_string(),
                Value::from("inner"),
            )]))]),
        );
        assert_eq!(
            render("{{name}}|{{#each items}}{{name}}{{/each}}", &ctx),
            "outer|inner"
        );
    }

    #[test]
    fn test_each_missing_list_renders_nothing() {
        assert_eq!(
            render("a{{#each nope}}x{{/each}}b", &TemplateContext::new()),
            "ab"
        );
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("plain"), "plain");
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }
}
