//!
//! Statement parameters.
//!
use indexmap::IndexMap;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    None,
    Positional(Vec<Value>),
    Named(IndexMap<String, Value>),
}

impl Params {
    pub fn is_empty(&self) -> bool {
        match self {
            Params::None => true,
            Params::Positional(v) => v.is_empty(),
            Params::Named(v) => v.is_empty(),
        }
    }

    /// Parameter values in positional order. Named parameters keep their
    /// insertion order.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Params::None => vec![],
            Params::Positional(v) => v,
            Params::Named(v) => v.into_iter().map(|(_, v)| v).collect(),
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(v: Vec<Value>) -> Self {
        if v.is_empty() {
            Params::None
        } else {
            Params::Positional(v)
        }
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Params::None
    }
}
