use crate::heap::{HeapManager, ObjRef, Object};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Nil,
    /// Objects compare by identity; interning makes that content equality for strings.
    Obj(ObjRef),
}

impl Value {
    pub fn is_falsey(&self) -> bool {
        matches!(self, Value::Boolean(false) | Value::Nil)
    }

    pub fn display<'h>(&self, heap: &'h HeapManager) -> DisplayValue<'h> {
        DisplayValue { value: *self, heap }
    }
}

pub struct DisplayValue<'h> {
    value: Value,
    heap: &'h HeapManager,
}

impl Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.value {
            Value::Number(num) => write!(f, "{num}"),
            Value::Boolean(bool) => write!(f, "{bool}"),
            Value::Nil => write!(f, "nil"),
            Value::Obj(obj) => match self.heap.get(obj) {
                Some(Object::String(s)) => write!(f, "{}", s.as_str()),
                None => write!(f, "<dangling object {}>", obj.index()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(Value::Nil.is_falsey());
        assert!(Value::Boolean(false).is_falsey());
        assert!(!Value::Boolean(true).is_falsey());
        assert!(!Value::Number(0.0).is_falsey());
    }

    #[test]
    fn equality() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_ne!(Value::Nil, Value::Boolean(false));
        assert_ne!(Value::Number(0.0), Value::Boolean(false));
        assert_eq!(Value::Number(2.5), Value::Number(2.5));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn rendering() {
        let mut heap = HeapManager::new();
        let s = heap.create_string_copied("hi!");
        assert_eq!(Value::Number(1.0).display(&heap).to_string(), "1");
        assert_eq!(Value::Number(-2.5).display(&heap).to_string(), "-2.5");
        assert_eq!(Value::Boolean(true).display(&heap).to_string(), "true");
        assert_eq!(Value::Nil.display(&heap).to_string(), "nil");
        assert_eq!(Value::Obj(s).display(&heap).to_string(), "hi!");
    }
}
