//! Dynamic values passed to and returned from dynamically invoked operations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{Instance, Module};
use crate::types::{PrimitiveKind, Type};

/// A typed callback value (the dynamic counterpart of `Action<T..>`).
#[derive(Clone)]
pub struct Action {
    params: Vec<Type>,
    body: Arc<dyn Fn(&[Value]) + Send + Sync>,
}

impl Action {
    pub fn new(params: Vec<Type>, body: impl Fn(&[Value]) + Send + Sync + 'static) -> Self {
        Self {
            params,
            body: Arc::new(body),
        }
    }

    /// An `Action<string>` receiving progress notices.
    pub fn progress(notify: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self::new(vec![Type::String], move |args| {
            if let Some(text) = args.first().and_then(Value::as_str) {
                notify(text);
            }
        })
    }

    pub fn params(&self) -> &[Type] {
        &self.params
    }

    /// The callback's type descriptor.
    pub fn signature(&self) -> Type {
        Type::Action(self.params.clone())
    }

    pub fn invoke(&self, args: &[Value]) {
        (self.body)(args)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.signature())
    }
}

/// A dynamically typed value.
///
/// `Null` doubles as the result of operations returning `Void`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    String(Arc<str>),
    Map(Arc<BTreeMap<String, Value>>),
    Action(Action),
    Module(Arc<Module>),
    Object(Arc<Instance>),
}

impl Value {
    /// The runtime type of this value; `Null` reports the null marker.
    pub fn runtime_type(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Primitive(PrimitiveKind::Boolean),
            Value::Char(_) => Type::Primitive(PrimitiveKind::Char),
            Value::SByte(_) => Type::Primitive(PrimitiveKind::SByte),
            Value::Byte(_) => Type::Primitive(PrimitiveKind::Byte),
            Value::Int16(_) => Type::Primitive(PrimitiveKind::Int16),
            Value::UInt16(_) => Type::Primitive(PrimitiveKind::UInt16),
            Value::Int32(_) => Type::Primitive(PrimitiveKind::Int32),
            Value::UInt32(_) => Type::Primitive(PrimitiveKind::UInt32),
            Value::Int64(_) => Type::Primitive(PrimitiveKind::Int64),
            Value::UInt64(_) => Type::Primitive(PrimitiveKind::UInt64),
            Value::Single(_) => Type::Primitive(PrimitiveKind::Single),
            Value::Double(_) => Type::Primitive(PrimitiveKind::Double),
            Value::String(_) => Type::String,
            Value::Map(_) => Type::Map,
            Value::Action(action) => action.signature(),
            Value::Module(_) => Type::Module,
            Value::Object(instance) => Type::Class(instance.type_info().descriptor().clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as an `i64` if it is an integral kind that fits.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::SByte(v) => Some(i64::from(*v)),
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::UInt16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::UInt32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            Value::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&Arc<Module>> {
        match self {
            Value::Module(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Value::Action(a) => Some(a),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::Map(Arc::new(m))
    }
}

impl From<Action> for Value {
    fn from(a: Action) -> Self {
        Value::Action(a)
    }
}

impl From<Arc<Module>> for Value {
    fn from(m: Arc<Module>) -> Self {
        Value::Module(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn null_reports_the_null_marker() {
        assert_eq!(Value::Null.runtime_type(), Type::Null);
        assert_eq!(Value::from(None::<&str>).runtime_type(), Type::Null);
    }

    #[test]
    fn integers_of_every_width_read_as_i64() {
        assert_eq!(Value::Byte(7).as_integer(), Some(7));
        assert_eq!(Value::Int16(-3).as_integer(), Some(-3));
        assert_eq!(Value::UInt64(u64::MAX).as_integer(), None);
        assert_eq!(Value::from("7").as_integer(), None);
        assert_eq!(Value::Double(7.0).as_integer(), None);
    }

    #[test]
    fn progress_action_forwards_text() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let action = Action::progress(move |text| sink.lock().unwrap().push(text.to_string()));

        assert_eq!(action.signature(), Type::string_action());
        action.invoke(&[Value::from("<start-run />")]);
        action.invoke(&[Value::Int32(1)]);

        assert_eq!(*seen.lock().unwrap(), vec!["<start-run />".to_string()]);
    }
}
