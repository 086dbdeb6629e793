//! Template parser.
//!
//! Turns template source into a node tree. Tags are `{{name}}`,
//! `{{{name}}}`, `{{#if name}}`, `{{else}}`, `{{/if}}`, `{{#each name}}`
//! and `{{/each}}`; everything else is literal text.

/// A parsed template node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text, emitted as-is.
    Text(String),
    /// Variable expansion. `raw` skips HTML escaping.
    Variable {
        /// Context key to look up.
        name: String,
        /// True for `{{{name}}}`.
        raw: bool,
    },
    /// Conditional block.
    If {
        /// Context key whose truthiness decides the branch.
        name: String,
        /// Nodes rendered when truthy.
        then_branch: Vec<Node>,
        /// Nodes rendered when falsy.
        else_branch: Vec<Node>,
    },
    /// Loop block over a list value.
    Each {
        /// Context key holding the list.
        name: String,
        /// Nodes rendered once per item.
        body: Vec<Node>,
    },
}

/// What ends the block currently being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockEnd {
    Eof,
    EndIf,
    EndEach,
}

/// Tokens a block parse can stop on.
#[derive(Debug, PartialEq)]
enum Stop {
    Eof,
    Else,
    EndIf,
    EndEach,
}

/// Parser over template source.
pub struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser for the given source.
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Parse the source into a node list.
    pub fn parse(mut self) -> Result<Vec<Node>, String> {
        let (nodes, stop) = self.parse_block(BlockEnd::Eof)?;
        match stop {
            Stop::Eof => Ok(nodes),
            Stop::Else => Err("unexpected {{else}} outside {{#if}}".to_string()),
            Stop::EndIf => Err("unexpected {{/if}} without {{#if}}".to_string()),
            Stop::EndEach => Err("unexpected {{/each}} without {{#each}}".to_string()),
        }
    }

    /// Parse nodes until the expected block terminator (or a stray one,
    /// which the caller turns into an error).
    fn parse_block(&mut self, end: BlockEnd) -> Result<(Vec<Node>, Stop), String> {
        let mut nodes = Vec::new();

        loop {
            let rest = &self.source[self.pos..];
            if rest.is_empty() {
                if end == BlockEnd::Eof {
                    return Ok((nodes, Stop::Eof));
                }
                return Err(match end {
                    BlockEnd::EndIf => "unclosed {{#if}}".to_string(),
                    BlockEnd::EndEach => "unclosed {{#each}}".to_string(),
                    BlockEnd::Eof => unreachable!(),
                });
            }

            match rest.find("{{") {
                None => {
                    nodes.push(Node::Text(rest.to_string()));
                    self.pos = self.source.len();
                }
                Some(0) => {
                    let stop = self.parse_tag(&mut nodes)?;
                    if let Some(stop) = stop {
                        return Ok((nodes, stop));
                    }
                }
                Some(offset) => {
                    nodes.push(Node::Text(rest[..offset].to_string()));
                    self.pos += offset;
                }
            }
        }
    }

    /// Parse one tag starting at `self.pos` (which points at `{{`).
    ///
    /// Returns `Some(stop)` when the tag terminates the enclosing block.
    fn parse_tag(&mut self, nodes: &mut Vec<Node>) -> Result<Option<Stop>, String> {
        let rest = &self.source[self.pos..];

        // Triple braces: raw variable
        if let Some(inner) = rest.strip_prefix("{{{") {
            let close = inner
                .find("}}}")
                .ok_or_else(|| "unclosed {{{ tag".to_string())?;
            let name = inner[..close].trim();
            if name.is_empty() {
                return Err("empty {{{ }}} tag".to_string());
            }
            nodes.push(Node::Variable {
                name: name.to_string(),
                raw: true,
            });
            self.pos += 3 + close + 3;
            return Ok(None);
        }

        let inner = &rest[2..];
        let close = inner
            .find("}}")
            .ok_or_else(|| "unclosed {{ tag".to_string())?;
        let content = inner[..close].trim();
        self.pos += 2 + close + 2;

        if let Some(name) = content.strip_prefix("#if ") {
            let name = name.trim();
            if name.is_empty() {
                return Err("{{#if}} requires a name".to_string());
            }
            let (then_branch, stop) = self.parse_block(BlockEnd::EndIf)?;
            let (then_branch, else_branch) = match stop {
                Stop::EndIf => (then_branch, Vec::new()),
                Stop::Else => {
                    let (else_branch, stop) = self.parse_block(BlockEnd::EndIf)?;
                    if stop != Stop::EndIf {
                        return Err("{{else}} block not closed by {{/if}}".to_string());
                    }
                    (then_branch, else_branch)
                }
                Stop::EndEach => return Err("{{/each}} closing an {{#if}}".to_string()),
                Stop::Eof => return Err("unclosed {{#if}}".to_string()),
            };
            nodes.push(Node::If {
                name: name.to_string(),
                then_branch,
                else_branch,
            });
            return Ok(None);
        }

        if let Some(name) = content.strip_prefix("#each ") {
            let name = name.trim();
            if name.is_empty() {
                return Err("{{#each}} requires a name".to_string());
            }
            let (body, stop) = self.parse_block(BlockEnd::EndEach)?;
            match stop {
                Stop::EndEach => {}
                Stop::EndIf => return Err("{{/if}} closing an {{#each}}".to_string()),
                Stop::Else => return Err("{{else}} inside {{#each}} is not supported".to_string()),
                Stop::Eof => return Err("unclosed {{#each}}".to_string()),
            }
            nodes.push(Node::Each {
                name: name.to_string(),
                body,
            });
            return Ok(None);
        }

        match content {
            "else" => Ok(Some(Stop::Else)),
            "/if" => Ok(Some(Stop::EndIf)),
            "/each" => Ok(Some(Stop::EndEach)),
            "" => Err("empty {{ }} tag".to_string()),
            name if name.starts_with('#') || name.starts_with('/') => {
                Err(format!("unknown tag: {{{{{name}}}}}"))
            }
            name => {
                nodes.push(Node::Variable {
                    name: name.to_string(),
                    raw: false,
                });
                Ok(None)
            }
        }
    }
}
