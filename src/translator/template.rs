//! Raw SQL templates with conditional sections and bind directives.
//!
//! ```text
//! SELECT * FROM ARTIST #if(name) WHERE ARTIST_NAME = #bind($name 'VARCHAR') #end
//! ```
//!
//! Every top-level `#if` owns a marker buffer named after its position. The
//! marker placeholder is written where the section starts and the chosen
//! branch is written into the buffer, so a false condition with no `#else`
//! links to an empty fragment. Conditionals nested inside a section are
//! resolved in place.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::errors::{TranslationError, TranslationStateError, UnsupportedConstructError};
use super::qualifier_translator::bind_value;
use super::query::QueryParameters;
use super::translation_ctx::TranslationContext;
use crate::entity_catalog::EntityCatalog;
use crate::sql_ast::builder::text;
use crate::sql_ast::{JdbcType, Node, Value};

/// Matches `#if(..)`, `#else`, `#end` and `#bind(..)`
/// Captures: (1) directive, (2) argument list if present
static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(if|else|end|bind)\b(?:\(\s*([^)]*?)\s*\))?").unwrap()
});

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    Text(String),
    Bind {
        name: String,
        jdbc_type: Option<JdbcType>,
    },
    If {
        condition: String,
        then: Vec<TemplateNode>,
        otherwise: Vec<TemplateNode>,
    },
}

/// A parsed SQL template.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlTemplate {
    nodes: Vec<TemplateNode>,
}

struct OpenSection {
    condition: String,
    then: Vec<TemplateNode>,
    otherwise: Option<Vec<TemplateNode>>,
}

impl OpenSection {
    fn current(&mut self) -> &mut Vec<TemplateNode> {
        match &mut self.otherwise {
            Some(otherwise) => otherwise,
            None => &mut self.then,
        }
    }
}

impl SqlTemplate {
    pub fn parse(source: &str) -> Result<Self, TranslationError> {
        let mut root: Vec<TemplateNode> = Vec::new();
        let mut open: Vec<OpenSection> = Vec::new();
        let mut last = 0;

        fn target<'s>(
            root: &'s mut Vec<TemplateNode>,
            open: &'s mut [OpenSection],
        ) -> &'s mut Vec<TemplateNode> {
            match open.last_mut() {
                Some(section) => section.current(),
                None => root,
            }
        }

        for captures in DIRECTIVE_PATTERN.captures_iter(source) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if whole.start() > last {
                target(&mut root, &mut open).push(TemplateNode::Text(source[last..whole.start()].to_string()));
            }
            last = whole.end();

            let args = captures.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            let context = format!("at offset {}", whole.start());
            match &captures[1] {
                "if" => {
                    let condition = args.trim_start_matches('$');
                    if condition.is_empty() {
                        return Err(TranslationStateError::template_with_context(
                            "#if needs a parameter name",
                            context,
                        )
                        .into());
                    }
                    open.push(OpenSection {
                        condition: condition.to_string(),
                        then: Vec::new(),
                        otherwise: None,
                    });
                }
                "else" => match open.last_mut() {
                    Some(section) if section.otherwise.is_none() => section.otherwise = Some(Vec::new()),
                    Some(_) => {
                        return Err(TranslationStateError::template_with_context("second #else in one #if", context).into())
                    }
                    None => {
                        return Err(TranslationStateError::template_with_context("#else without #if", context).into())
                    }
                },
                "end" => {
                    let Some(section) = open.pop() else {
                        return Err(TranslationStateError::template_with_context("#end without #if", context).into());
                    };
                    let node = TemplateNode::If {
                        condition: section.condition,
                        then: section.then,
                        otherwise: section.otherwise.unwrap_or_default(),
                    };
                    target(&mut root, &mut open).push(node);
                }
                _ => {
                    let node = parse_bind(args, &context)?;
                    target(&mut root, &mut open).push(node);
                }
            }
        }

        if let Some(section) = open.last() {
            return Err(TranslationStateError::template_with_context(
                format!("#if({}) is never closed", section.condition),
                "at end of template",
            )
            .into());
        }
        if last < source.len() {
            root.push(TemplateNode::Text(source[last..].to_string()));
        }
        Ok(SqlTemplate { nodes: root })
    }

    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }
}

impl FromStr for SqlTemplate {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SqlTemplate::parse(s)
    }
}

/// `$name` optionally followed by a quoted JDBC type name.
fn parse_bind(args: &str, context: &str) -> Result<TemplateNode, TranslationError> {
    let mut parts = args.split_whitespace();
    let name = parts
        .next()
        .map(|n| n.trim_start_matches('$'))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| TranslationStateError::template_with_context("#bind needs a parameter", context))?;

    let jdbc_type = match parts.next() {
        Some(raw) => {
            let raw = raw.trim_matches(|c| c == '\'' || c == '"');
            Some(JdbcType::from_str(raw).map_err(|_| {
                TranslationStateError::template_with_context(format!("unknown JDBC type '{}'", raw), context)
            })?)
        }
        None => None,
    };
    if parts.next().is_some() {
        return Err(TranslationStateError::template_with_context("too many #bind arguments", context).into());
    }

    Ok(TemplateNode::Bind {
        name: name.to_string(),
        jdbc_type,
    })
}

/// Expands `template` against `parameters` into a linked fragment.
pub fn translate_template(
    catalog: &EntityCatalog,
    template: &SqlTemplate,
    parameters: &QueryParameters,
) -> Result<Node, TranslationError> {
    let mut ctx = TranslationContext::new(catalog, parameters, "t");
    let mut sections = 0;

    for node in template.nodes() {
        match node {
            TemplateNode::If {
                condition,
                then,
                otherwise,
            } => {
                let marker = format!("if_{}", sections);
                sections += 1;
                ctx.mark_current_position(&marker);
                ctx.switch_to_marker(&marker, true);
                let branch = if condition_holds(&ctx, condition) { then } else { otherwise };
                emit(&mut ctx, branch)?;
                ctx.switch_to_main_buffer();
            }
            other => emit(&mut ctx, std::slice::from_ref(other))?,
        }
    }

    let main = Node::Fragment(ctx.take_main_buffer());
    ctx.link(main)
}

fn condition_holds(ctx: &TranslationContext<'_>, name: &str) -> bool {
    ctx.named_parameter(name).map(Value::is_truthy).unwrap_or(false)
}

/// Writes `nodes` into the active buffer, resolving conditionals in place.
fn emit(ctx: &mut TranslationContext<'_>, nodes: &[TemplateNode]) -> Result<(), TranslationError> {
    for node in nodes {
        match node {
            TemplateNode::Text(sql) => ctx.append(text(sql.as_str())),
            TemplateNode::Bind { name, jdbc_type } => {
                let bound = ctx.named_parameter(name)?.clone();
                ctx.append(bind_node(name, bound, *jdbc_type)?);
            }
            TemplateNode::If {
                condition,
                then,
                otherwise,
            } => {
                let branch = if condition_holds(ctx, condition) { then } else { otherwise };
                emit(ctx, branch)?;
            }
        }
    }
    Ok(())
}

/// A list binds one placeholder per element: `?, ?, ?`.
fn bind_node(name: &str, bound: Value, jdbc_type: Option<JdbcType>) -> Result<Node, TranslationError> {
    match bound {
        Value::List(items) => {
            if items.is_empty() {
                return Err(UnsupportedConstructError::value_shape_with_context(
                    "empty list",
                    "nothing to bind",
                    format!("#bind(${})", name),
                )
                .into());
            }
            let mut parts = Vec::with_capacity(items.len() * 2);
            for (i, item) in items.into_iter().enumerate() {
                if i > 0 {
                    parts.push(text(", "));
                }
                parts.push(match bind_value(item, jdbc_type)? {
                    Node::Value(mut v) => {
                        v.is_array = true;
                        Node::Value(v)
                    }
                    other => other,
                });
            }
            Ok(Node::Fragment(parts))
        }
        other => bind_value(other, jdbc_type),
    }
}
