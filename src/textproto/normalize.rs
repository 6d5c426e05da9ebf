use crate::textproto::node::{Mapping, Node};

/// Rename every mapping key from snake_case to camelCase, recursively.
///
/// `_` followed by an ASCII lowercase letter is dropped and the letter uppercased. Leaves are
/// returned unchanged. Colliding keys keep the first key's position with the later value.
pub fn normalize_keys(node: Node) -> Node {
    match node {
        Node::Sequence(items) => Node::Sequence(items.into_iter().map(normalize_keys).collect()),
        Node::Mapping(m) => {
            let mut out = Mapping::with_capacity(m.len());
            for (key, value) in m {
                out.insert(camel_case_key(&key), normalize_keys(value));
            }
            Node::Mapping(out)
        }
        leaf => leaf,
    }
}

/// Convert a single key, e.g. `title_jp` to `titleJp`.
pub fn camel_case_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_'
            && let Some(&next) = chars.peek()
            && next.is_ascii_lowercase()
        {
            out.push(next.to_ascii_uppercase());
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/textproto/normalize.rs"]
mod tests;
