// File: src/interpreter/value.rs
//
// Runtime value types for the yy interpreter.
//
// Values are cheap to clone: scalars are copied, while arrays, maps, strings
// and functions are reference-counted handles. Arrays and maps share mutable
// storage through RefCell, so two bindings to the same array observe each
// other's mutations, matching the language's aliasing semantics.

use crate::ast::Expr;
use crate::builtins::Builtin;
use crate::interpreter::environment::EnvRef;
use ahash::AHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// A user-defined function: parameter names, a shared body, and the
/// environment captured at the definition site
#[derive(Debug)]
pub struct FunctionDef {
    pub params: Vec<String>,
    pub body: Rc<Vec<Expr>>,
    pub env: EnvRef,
}

/// An insertion-ordered string-keyed map. Iteration and rendering follow
/// insertion order; lookups go through a hash index.
#[derive(Debug, Default)]
pub struct MapValue {
    entries: Vec<(String, Value)>,
    index: AHashMap<String, usize>,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.index.get(key).map(|&i| self.entries[i].1.clone())
    }

    /// Inserting an existing key replaces the value in place, keeping the
    /// key's original position
    pub fn insert(&mut self, key: String, value: Value) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = &(String, Value)> {
        self.entries.iter()
    }
}

/// A yy runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(Rc<String>),
    Null,
    Array(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<MapValue>>),
    /// Inclusive integer range; may descend (`5..1`)
    Range(i64, i64),
    Function(Rc<FunctionDef>),
    Native(Builtin),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(Rc::new(s.into()))
    }

    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn map(map: MapValue) -> Value {
        Value::Map(Rc::new(RefCell::new(map)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Bool(_) => "Bool",
            Value::Str(_) => "Str",
            Value::Null => "Null",
            Value::Array(_) => "Array",
            Value::Map(_) => "Map",
            Value::Range(_, _) => "Range",
            Value::Function(_) => "Function",
            Value::Native(_) => "Builtin",
        }
    }

    /// Null, false, the empty string, the empty array and the empty map are
    /// falsy; every other value, including the number 0, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::Array(a) => !a.borrow().is_empty(),
            Value::Map(m) => !m.borrow().is_empty(),
            _ => true,
        }
    }

    /// The display form used by `yap`, string interpolation and map keys
    pub fn render(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => s.as_str().to_string(),
            Value::Null => "null".to_string(),
            Value::Array(a) => {
                let inner: Vec<String> = a.borrow().iter().map(|v| v.render()).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Map(m) => {
                let inner: Vec<String> = m
                    .borrow()
                    .entries()
                    .map(|(k, v)| format!("{}: {}", k, v.render()))
                    .collect();
                format!("%{{{}}}", inner.join(", "))
            }
            Value::Range(start, end) => format!("{}..{}", start, end),
            Value::Function(f) => format!("\\{} {{ ... }}", f.params.join(", ")),
            Value::Native(b) => format!("<builtin {}>", b.name()),
        }
    }
}

/// Whole numbers print without a fractional part
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl PartialEq for Value {
    /// Structural equality for data; identity for functions. Values of
    /// different types never compare equal.
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Range(a1, b1), Value::Range(a2, b2)) => a1 == a2 && b1 == b2,
            (Value::Array(a), Value::Array(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Map(a), Value::Map(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.entries().all(|(k, v)| b.get(k).as_ref() == Some(v))
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a == b,
            _ => false,
        }
    }
}
