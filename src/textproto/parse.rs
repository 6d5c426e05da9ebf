use std::collections::BTreeSet;

use crate::textproto::node::{Mapping, Node};

/// Field names that always materialize as sequences, even with zero or one occurrence.
///
/// The set is configuration: it is never inferred from the data being parsed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RepeatedFields(BTreeSet<String>);

impl Default for RepeatedFields {
    fn default() -> Self {
        Self::new(["products", "tags", "images", "image_urls"])
    }
}

impl RepeatedFields {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> Extend<S> for RepeatedFields {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// Counters describing how lenient the parser had to be.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Physical input lines.
    pub lines: usize,
    /// Statements applied to the tree (message starts, ends and fields).
    pub statements: usize,
    /// Non-blank, non-comment lines that matched no shape.
    pub skipped: usize,
    /// `}` lines seen while already at root depth.
    pub unbalanced_closes: usize,
    /// Messages still open at end of input.
    pub implicitly_closed: usize,
}

/// Line-oriented textproto parser producing a [`Node`] tree.
///
/// Parsing never fails. Unrecognized lines and stray closing braces are skipped, and messages
/// left open at end of input are attached to their parents.
#[derive(Clone, Debug, Default)]
pub struct RecordParser {
    repeated: RepeatedFields,
}

impl RecordParser {
    pub fn new(repeated: RepeatedFields) -> Self {
        Self { repeated }
    }

    pub fn repeated_fields(&self) -> &RepeatedFields {
        &self.repeated
    }

    /// Parse `text` into a root mapping node.
    pub fn parse(&self, text: &str) -> Node {
        self.parse_with_stats(text).0
    }

    #[tracing::instrument(skip_all, fields(bytes = text.len()))]
    pub fn parse_with_stats(&self, text: &str) -> (Node, ParseStats) {
        let mut state = ParseState {
            repeated: &self.repeated,
            stack: vec![Frame {
                name: String::new(),
                body: Mapping::new(),
            }],
            stats: ParseStats::default(),
        };

        for line in text.lines() {
            state.stats.lines += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(stmt) = classify(line) {
                state.apply(stmt);
                continue;
            }

            let parts = split_statements(line);
            let mut applied = false;
            if parts.len() > 1 {
                for part in &parts {
                    if let Some(stmt) = classify(part) {
                        state.apply(stmt);
                        applied = true;
                    }
                }
            }
            if !applied {
                state.stats.skipped += 1;
            }
        }

        let (root, stats) = state.finish();
        tracing::debug!(
            lines = stats.lines,
            statements = stats.statements,
            skipped = stats.skipped,
            unbalanced_closes = stats.unbalanced_closes,
            implicitly_closed = stats.implicitly_closed,
            "parsed textproto"
        );
        (root, stats)
    }
}

/// Parse with an explicit repeated-field set.
pub fn parse_textproto(text: &str, repeated: &RepeatedFields) -> Node {
    RecordParser::new(repeated.clone()).parse(text)
}

#[derive(Debug, PartialEq, Eq)]
enum Statement<'a> {
    Open(&'a str),
    Close,
    Field(&'a str, &'a str),
}

struct Frame {
    name: String,
    body: Mapping,
}

struct ParseState<'a> {
    repeated: &'a RepeatedFields,
    stack: Vec<Frame>,
    stats: ParseStats,
}

impl ParseState<'_> {
    fn apply(&mut self, stmt: Statement<'_>) {
        self.stats.statements += 1;
        match stmt {
            Statement::Open(name) => self.stack.push(Frame {
                name: name.to_owned(),
                body: Mapping::new(),
            }),
            Statement::Close => {
                if self.stack.len() <= 1 {
                    self.stats.unbalanced_closes += 1;
                    return;
                }
                self.close_top();
            }
            Statement::Field(name, raw) => {
                let value = decode_value(raw);
                self.attach(name.to_owned(), value);
            }
        }
    }

    fn close_top(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.attach(frame.name, Node::Mapping(frame.body));
        }
    }

    fn attach(&mut self, name: String, value: Node) {
        let repeated = self.repeated.contains(&name);
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        if !repeated {
            top.body.insert(name, value);
            return;
        }
        match top.body.get_mut(&name) {
            Some(Node::Sequence(items)) => items.push(value),
            _ => {
                top.body.insert(name, Node::Sequence(vec![value]));
            }
        }
    }

    fn finish(mut self) -> (Node, ParseStats) {
        while self.stack.len() > 1 {
            self.stats.implicitly_closed += 1;
            self.close_top();
        }
        let root = self
            .stack
            .pop()
            .map(|frame| Node::Mapping(frame.body))
            .unwrap_or_else(Node::mapping);
        (root, self.stats)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if is_ident_start(c)) && chars.all(is_ident_char)
}

fn classify(line: &str) -> Option<Statement<'_>> {
    if line == "}" {
        return Some(Statement::Close);
    }

    if let Some(head) = line.strip_suffix('{') {
        let head = head.trim_end();
        if is_ident(head) {
            return Some(Statement::Open(head));
        }
    }

    let first = line.chars().next()?;
    if !is_ident_start(first) {
        return None;
    }
    let name_end = line
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(name_end);
    let value = rest.trim_start().strip_prefix(':')?;
    Some(Statement::Field(name, value.trim()))
}

/// Split a line holding several brace-delimited statements, e.g. a whole message on one line.
fn split_statements(line: &str) -> Vec<String> {
    fn push_nonblank(out: &mut Vec<String>, s: &str) {
        let s = s.trim();
        if !s.is_empty() {
            out.push(s.to_owned());
        }
    }

    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                buf.push(ch);
            }
            '{' if !in_quotes => {
                let head = buf.trim_end();
                let split_at = head
                    .char_indices()
                    .rev()
                    .find(|&(_, c)| !is_ident_char(c))
                    .map(|(i, c)| i + c.len_utf8())
                    .unwrap_or(0);
                let (before, name) = head.split_at(split_at);
                push_nonblank(&mut out, before);
                out.push(format!("{name} {{"));
                buf.clear();
            }
            '}' if !in_quotes => {
                push_nonblank(&mut out, &buf);
                buf.clear();
                out.push("}".to_owned());
            }
            _ => buf.push(ch),
        }
    }
    push_nonblank(&mut out, &buf);
    out
}

/// Decode a field value: quoted string, then boolean, then number, then raw string.
fn decode_value(raw: &str) -> Node {
    let v = raw.trim();
    if v.starts_with('"') && v.ends_with('"') {
        let inner = if v.len() >= 2 { &v[1..v.len() - 1] } else { "" };
        return Node::String(inner.to_owned());
    }
    if v.eq_ignore_ascii_case("true") {
        return Node::Bool(true);
    }
    if v.eq_ignore_ascii_case("false") {
        return Node::Bool(false);
    }
    if !v.is_empty()
        && let Ok(n) = v.parse::<f64>()
        && n.is_finite()
    {
        return Node::Number(n);
    }
    Node::String(v.to_owned())
}

#[cfg(test)]
#[path = "../../tests/unit/textproto/parse.rs"]
mod tests;
