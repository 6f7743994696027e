use std::fmt;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    String,
    Bool,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::String => write!(f, "string"),
            Self::Bool => write!(f, "bool"),
        }
    }
}

/// A runtime value. The variant is the value's type tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    String(String),
    Bool(bool),
}

impl Value {
    pub fn typ(&self) -> Type {
        match self {
            Self::Int(_) => Type::Int,
            Self::String(_) => Type::String,
            Self::Bool(_) => Type::Bool,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A named, typed binding. If a value is present its tag always equals `typ`.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    name: String,
    line: usize,
    typ: Type,
    value: Option<Value>,
}

impl Variable {
    /// Panics if `value` disagrees with `typ`: callers check user-facing type
    /// errors before building a variable.
    pub fn new(name: &str, line: usize, typ: Type, value: Option<Value>) -> Self {
        if let Some(value) = &value {
            assert_eq!(
                value.typ(),
                typ,
                "variable '{name}' of type {typ} constructed with {value:?}"
            );
        }
        Self {
            name: name.to_string(),
            line,
            typ,
            value,
        }
    }
    pub fn declared(name: &str, line: usize, typ: Type) -> Self {
        Self::new(name, line, typ, None)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Line of the declaration.
    pub fn line(&self) -> usize {
        self.line
    }
    pub fn typ(&self) -> Type {
        self.typ
    }
    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
    /// The bound value; reading a declared but unassigned variable on `line`
    /// is an error.
    pub fn value(&self, line: usize) -> Result<&Value> {
        self.value.as_ref().ok_or_else(|| Error::UninitializedVariable {
            line,
            name: self.name.clone(),
        })
    }
    /// Same binding with a new value, keeping name, declaration line and type.
    pub fn with_value(&self, value: Value) -> Self {
        Self::new(&self.name, self.line, self.typ, Some(value))
    }
}
