use serde::{Deserialize, Serialize};

/// A tagged value, one entry in the encoding domain every codec speaks.
///
/// `Map` keeps its pairs in a `Vec` rather than a `HashMap` so decode stays
/// order-preserving and so values don't need `Hash`/`Eq` (floats don't).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Dead-region filler. Carries the number of zero-padding bytes that
    /// follow the tag+length header, i.e. the on-disk record (including the
    /// 5-byte header) is `5 + n` bytes long.
    Null(u32),
    Str(String),
    Int(i64),
    Float(f64),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Build a filler record spanning exactly `total_len` on-disk bytes
    /// (tag + 4-byte length + zero padding). Returns `None` when
    /// `total_len < 5`, since a filler record can't be smaller than its own
    /// header — callers must not shrink a record into a hole that small.
    pub fn filler(total_len: u32) -> Option<Value> {
        total_len.checked_sub(5).map(Value::Null)
    }

    /// Total on-disk length of this value once encoded in the binary codec.
    pub fn encoded_len(&self) -> u32 {
        match self {
            Value::Null(n) => 5 + n,
            Value::Str(s) => 5 + s.len() as u32,
            Value::Int(_) => 9,
            Value::Float(_) => 9,
            Value::List(items) | Value::Tuple(items) => {
                5 + items.iter().map(Value::encoded_len).sum::<u32>()
            }
            Value::Map(pairs) => {
                5 + pairs
                    .iter()
                    .map(|(k, v)| Value::Str(k.clone()).encoded_len() + v.encoded_len())
                    .sum::<u32>()
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn map_get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::List(v.into_iter().map(Value::Float).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filler_rejects_sub_five_byte_spans() {
        assert!(Value::filler(4).is_none());
        assert!(Value::filler(0).is_none());
        assert_eq!(Value::filler(5), Some(Value::Null(0)));
        assert_eq!(Value::filler(7), Some(Value::Null(2)));
    }

    #[test]
    fn encoded_len_matches_wire_layout() {
        assert_eq!(Value::Int(5).encoded_len(), 9);
        assert_eq!(Value::Float(1.0).encoded_len(), 9);
        assert_eq!(Value::Str("hi".into()).encoded_len(), 5 + 2);
        assert_eq!(Value::Null(3).encoded_len(), 8);
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list.encoded_len(), 5 + 9 + 9);
    }
}
