use indexmap::IndexMap;

/// Ordered mapping used for message nodes. Keys are unique and keep first-insertion order.
pub type Mapping = IndexMap<String, Node>;

/// Dynamically shaped record tree produced by the textproto parser.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Node {
    /// Absent value.
    #[default]
    Null,
    /// Boolean literal (`true` / `false`, any case).
    Bool(bool),
    /// Finite numeric literal.
    Number(f64),
    /// Quoted or raw string value.
    String(String),
    /// Repeated field values in source order.
    Sequence(Vec<Node>),
    /// Message body.
    Mapping(Mapping),
}

impl Node {
    /// Empty message node.
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    /// Lookup a field on a mapping node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Self::Mapping(m) => m.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Convert into a JSON value for serde-based binding.
    ///
    /// Whole numbers become JSON integers so that integer-typed fields bind cleanly.
    pub fn into_json(self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                    Value::from(n as i64)
                } else {
                    serde_json::Number::from_f64(n)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            Self::String(s) => Value::String(s),
            Self::Sequence(items) => Value::Array(items.into_iter().map(Self::into_json).collect()),
            Self::Mapping(m) => Value::Object(
                m.into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect::<serde_json::Map<_, _>>(),
            ),
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
