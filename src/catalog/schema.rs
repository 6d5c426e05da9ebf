use indexmap::IndexMap;

use crate::{
    catalog::model::ProductsInfo,
    foundation::error::{CollageError, CollageResult},
    textproto::{node::Node, parse::RepeatedFields},
};

/// Field declaration inside a schema message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub type_name: String,
    pub repeated: bool,
    pub number: Option<u32>,
}

/// Message declaration from a schema source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl MessageDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Message definitions read from proto-style schema text.
///
/// Only the declarations needed for binding are read (messages, their fields and `repeated`
/// labels); enums, services and options are skipped.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    messages: IndexMap<String, MessageDef>,
}

enum Scope {
    Message(String),
    Oneof,
    Other,
}

impl Schema {
    pub fn parse(text: &str) -> CollageResult<Self> {
        let clean = strip_comments(text);
        let mut messages = IndexMap::<String, MessageDef>::new();
        let mut stack = Vec::<Scope>::new();
        let mut stmt = Vec::<&str>::new();

        for tok in tokenize(&clean) {
            match tok {
                "{" => {
                    let scope = match stmt.as_slice() {
                        ["message", name] => {
                            messages
                                .entry((*name).to_owned())
                                .or_insert_with(|| MessageDef {
                                    name: (*name).to_owned(),
                                    fields: Vec::new(),
                                });
                            Scope::Message((*name).to_owned())
                        }
                        ["oneof", _] => Scope::Oneof,
                        _ => Scope::Other,
                    };
                    stack.push(scope);
                    stmt.clear();
                }
                "}" => {
                    if stack.pop().is_none() {
                        return Err(CollageError::schema("unbalanced '}' in schema"));
                    }
                    stmt.clear();
                }
                ";" => {
                    if let Some(owner) = field_owner(&stack)
                        && let Some(field) = parse_field(&stmt)
                        && let Some(msg) = messages.get_mut(owner)
                    {
                        msg.fields.push(field);
                    }
                    stmt.clear();
                }
                t => stmt.push(t),
            }
        }

        if !stack.is_empty() {
            return Err(CollageError::schema("unterminated block in schema"));
        }
        if messages.is_empty() {
            return Err(CollageError::schema("schema declares no messages"));
        }
        Ok(Self { messages })
    }

    pub fn message(&self, name: &str) -> Option<&MessageDef> {
        self.messages.get(name)
    }

    pub fn require_message(&self, name: &str) -> CollageResult<&MessageDef> {
        self.message(name)
            .ok_or_else(|| CollageError::schema(format!("could not find '{name}' message")))
    }

    pub fn messages(&self) -> impl Iterator<Item = &MessageDef> {
        self.messages.values()
    }

    /// Names of every field declared `repeated` in any message.
    pub fn repeated_field_names(&self) -> RepeatedFields {
        RepeatedFields::new(
            self.messages
                .values()
                .flat_map(|m| m.fields.iter())
                .filter(|f| f.repeated)
                .map(|f| f.name.clone()),
        )
    }
}

/// Binds normalized record trees to typed catalog records.
#[derive(Clone, Debug)]
pub struct SchemaBinder {
    schema: Schema,
    root_message: String,
}

impl SchemaBinder {
    /// Fails if `schema` does not declare `root_message`.
    pub fn new(schema: Schema, root_message: impl Into<String>) -> CollageResult<Self> {
        let root_message = root_message.into();
        schema.require_message(&root_message)?;
        Ok(Self {
            schema,
            root_message,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn root_message(&self) -> &str {
        &self.root_message
    }

    /// Bind a camelCase tree. Either every record binds or the whole call fails.
    #[tracing::instrument(skip_all, fields(root = %self.root_message))]
    pub fn bind(&self, tree: Node) -> CollageResult<ProductsInfo> {
        if tree.as_mapping().is_none() {
            return Err(CollageError::binding(format!(
                "'{}' must bind from a message node",
                self.root_message
            )));
        }
        let info: ProductsInfo = serde_json::from_value(tree.into_json())
            .map_err(|e| CollageError::binding(format!("{}: {e}", self.root_message)))?;
        tracing::debug!(products = info.products.len(), "bound catalog records");
        Ok(info)
    }
}

fn field_owner(stack: &[Scope]) -> Option<&str> {
    match stack.last()? {
        Scope::Message(name) => Some(name),
        Scope::Oneof => stack.iter().rev().find_map(|s| match s {
            Scope::Message(name) => Some(name.as_str()),
            _ => None,
        }),
        Scope::Other => None,
    }
}

fn parse_field(stmt: &[&str]) -> Option<FieldDef> {
    let (repeated, rest) = match stmt.first()? {
        &"repeated" => (true, &stmt[1..]),
        &"optional" | &"required" => (false, &stmt[1..]),
        _ => (false, stmt),
    };
    if matches!(
        rest.first(),
        Some(&"option" | &"reserved" | &"extensions" | &"message" | &"enum")
    ) {
        return None;
    }
    let eq = rest.iter().position(|t| *t == "=")?;
    if eq < 2 {
        return None;
    }
    Some(FieldDef {
        name: rest[eq - 1].to_owned(),
        type_name: rest[..eq - 1].concat(),
        repeated,
        number: rest.get(eq + 1).and_then(|n| n.parse().ok()),
    })
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.find('\n').map(|i| &after[i..]).unwrap_or("");
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.find("*/").map(|i| &after[i + 2..]).unwrap_or("");
            out.push(' ');
        } else if rest.starts_with('"') {
            let end = rest[1..].find('"').map(|i| i + 2).unwrap_or(rest.len());
            out.push_str(&rest[..end]);
            rest = &rest[end..];
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out
}

fn tokenize(text: &str) -> Vec<&str> {
    const PUNCT: &[char] = &['{', '}', ';', '=', '<', '>', ','];

    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quotes = false;
    for (i, c) in text.char_indices() {
        if in_quotes {
            if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        if c == '"' {
            in_quotes = true;
            start.get_or_insert(i);
            continue;
        }
        if c.is_whitespace() || PUNCT.contains(&c) {
            if let Some(s) = start.take() {
                out.push(&text[s..i]);
            }
            if !c.is_whitespace() {
                out.push(&text[i..i + c.len_utf8()]);
            }
            continue;
        }
        start.get_or_insert(i);
    }
    if let Some(s) = start {
        out.push(&text[s..]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/schema.rs"]
mod tests;
