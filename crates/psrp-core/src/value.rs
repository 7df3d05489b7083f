use std::collections::BTreeMap;

/// A loosely-typed value carried across the PSRP event/host-call boundary.
///
/// The wire encoding (CLIXML) is out of scope for this crate; application
/// code and transport implementations exchange values through this shape
/// instead of raw bytes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PsValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<PsValue>),
    Map(BTreeMap<String, PsValue>),
}

impl PsValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[PsValue]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, PsValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&PsValue> {
        self.as_map().and_then(|m| m.get(name))
    }
}

impl From<&str> for PsValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PsValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for PsValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PsValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for PsValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
