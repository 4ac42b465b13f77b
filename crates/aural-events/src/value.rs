//! Property values crossing the accessibility boundary.

use std::fmt;
use std::sync::Arc;

use crate::element::AccessibleElement;

/// A dynamically typed property value, copied by value into the event
/// record that carries it.
///
/// The OS reports property changes with a loosely typed payload; this
/// covers the shapes the screen reader consumes. The value travels with the
/// buffered record and is released when the record is emitted or
/// superseded.
#[derive(Clone)]
pub enum PropertyValue {
    /// No value supplied.
    Empty,
    /// A boolean state, e.g. a toggle or expand/collapse flag.
    Bool(bool),
    /// An integer value or OS-defined enumeration member.
    Int(i32),
    /// A floating-point value, e.g. a slider position.
    Double(f64),
    /// A text value, e.g. a name or value string.
    String(String),
    /// A reference to another accessible element, e.g. a controller-for
    /// target.
    Element(Arc<dyn AccessibleElement>),
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            // Element references compare by handle identity.
            (Self::Element(a), Self::Element(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Element(_) => write!(f, "Element(..)"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::RuntimeId;

    struct Stub;

    impl AccessibleElement for Stub {
        fn runtime_id(&self) -> Option<RuntimeId> {
            None
        }
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(PropertyValue::Int(7), PropertyValue::from(7));
        assert_ne!(PropertyValue::Int(7), PropertyValue::Double(7.0));
        assert_eq!(PropertyValue::from("on"), PropertyValue::String("on".to_string()));
    }

    #[test]
    fn test_element_values_compare_by_identity() {
        let a: Arc<dyn AccessibleElement> = Arc::new(Stub);
        let b: Arc<dyn AccessibleElement> = Arc::new(Stub);

        assert_eq!(
            PropertyValue::Element(a.clone()),
            PropertyValue::Element(a.clone())
        );
        assert_ne!(PropertyValue::Element(a), PropertyValue::Element(b));
    }
}
