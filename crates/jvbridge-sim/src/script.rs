//! Script value model shared by both simulated engines

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use jvbridge_sdk::{ScriptError, ScriptType, WrapperId};

/// Native script function: returns the result or the thrown value
pub type NativeFn = Rc<dyn Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptValue>>;

/// A script value
#[derive(Clone)]
pub enum ScriptValue {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Integer-tagged number
    Int(i32),
    /// Floating-point number
    Float(f64),
    /// String
    String(Rc<str>),
    /// Array (shared, mutable)
    Array(Rc<RefCell<Vec<ScriptValue>>>),
    /// Plain object
    Object,
    /// Wrapper around a host object
    HostObject {
        /// Identity-cache id
        id: WrapperId,
        /// Class name given at creation
        class_name: Rc<str>,
    },
    /// Function
    Function(NativeFn),
    /// Error value
    Error {
        /// Error name
        name: Rc<str>,
        /// Error message
        message: Rc<str>,
    },
}

impl ScriptValue {
    /// String value
    pub fn string(s: &str) -> Self {
        ScriptValue::String(Rc::from(s))
    }

    /// Array value
    pub fn array(elements: Vec<ScriptValue>) -> Self {
        ScriptValue::Array(Rc::new(RefCell::new(elements)))
    }

    /// Array of numbers
    pub fn numbers(values: &[f64]) -> Self {
        Self::array(values.iter().map(|&n| ScriptValue::Float(n)).collect())
    }

    /// Function value
    pub fn function(f: impl Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptValue> + 'static) -> Self {
        ScriptValue::Function(Rc::new(f))
    }

    /// Error value
    pub fn error(name: &str, message: &str) -> Self {
        ScriptValue::Error {
            name: Rc::from(name),
            message: Rc::from(message),
        }
    }

    /// Runtime type
    pub fn type_of(&self) -> ScriptType {
        match self {
            ScriptValue::Undefined => ScriptType::Undefined,
            ScriptValue::Null => ScriptType::Null,
            ScriptValue::Bool(_) => ScriptType::Boolean,
            ScriptValue::Int(_) | ScriptValue::Float(_) => ScriptType::Number,
            ScriptValue::String(_) => ScriptType::String,
            ScriptValue::Array(_) => ScriptType::Array,
            ScriptValue::Object | ScriptValue::HostObject { .. } => ScriptType::Object,
            ScriptValue::Function(_) => ScriptType::Function,
            ScriptValue::Error { .. } => ScriptType::Error,
        }
    }

    /// Numeric value, NaN for non-numbers
    pub fn number(&self) -> f64 {
        match self {
            ScriptValue::Int(i) => f64::from(*i),
            ScriptValue::Float(f) => *f,
            _ => f64::NAN,
        }
    }

    /// Boolean value, false for non-booleans
    pub fn boolean(&self) -> bool {
        matches!(self, ScriptValue::Bool(true))
    }

    /// String contents, `None` for non-strings
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Snapshot of the elements of an array
    pub fn elements(&self) -> Option<Vec<ScriptValue>> {
        match self {
            ScriptValue::Array(a) => Some(a.borrow().clone()),
            _ => None,
        }
    }

    /// Array length, 0 for non-arrays
    pub fn length(&self) -> usize {
        match self {
            ScriptValue::Array(a) => a.borrow().len(),
            _ => 0,
        }
    }

    /// Element of an array, `undefined` when out of range
    pub fn element(&self, index: usize) -> ScriptValue {
        match self {
            ScriptValue::Array(a) => a.borrow().get(index).cloned().unwrap_or(ScriptValue::Undefined),
            _ => ScriptValue::Undefined,
        }
    }

    /// Store an array element, growing the array with `undefined`
    pub fn set_element(&self, index: usize, value: ScriptValue) {
        if let ScriptValue::Array(a) = self {
            let mut a = a.borrow_mut();
            if a.len() <= index {
                a.resize(index + 1, ScriptValue::Undefined);
            }
            a[index] = value;
        }
    }

    /// Host wrapper id
    pub fn host_object_id(&self) -> Option<WrapperId> {
        match self {
            ScriptValue::HostObject { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Error name and message
    pub fn error_info(&self) -> Option<ScriptError> {
        match self {
            ScriptValue::Error { name, message } => Some(ScriptError {
                name: name.to_string(),
                message: message.to_string(),
            }),
            _ => None,
        }
    }

    /// Call a function value
    pub fn call(&self, args: &[ScriptValue]) -> Result<ScriptValue, ScriptValue> {
        match self {
            ScriptValue::Function(f) => f(args),
            other => Err(ScriptValue::error(
                "TypeError",
                &format!("{} is not a function", other),
            )),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Undefined => f.write_str("undefined"),
            ScriptValue::Null => f.write_str("null"),
            ScriptValue::Bool(b) => write!(f, "{}", b),
            ScriptValue::Int(i) => write!(f, "{}", i),
            ScriptValue::Float(n) => f.write_str(&format_number(*n)),
            ScriptValue::String(s) => f.write_str(s),
            ScriptValue::Array(a) => {
                let parts: Vec<String> = a
                    .borrow()
                    .iter()
                    .map(|v| match v {
                        ScriptValue::Undefined | ScriptValue::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect();
                f.write_str(&parts.join(","))
            }
            ScriptValue::Object => f.write_str("[object Object]"),
            ScriptValue::HostObject { class_name, .. } => write!(f, "[object {}]", class_name),
            ScriptValue::Function(_) => f.write_str("function () { [native code] }"),
            ScriptValue::Error { name, message } => write!(f, "{}: {}", name, message),
        }
    }
}

impl fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::String(s) => write!(f, "{:?}", s),
            ScriptValue::Array(a) => f.debug_list().entries(a.borrow().iter()).finish(),
            other => write!(f, "{}", other),
        }
    }
}

impl PartialEq for ScriptValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScriptValue::Undefined, ScriptValue::Undefined) => true,
            (ScriptValue::Null, ScriptValue::Null) => true,
            (ScriptValue::Bool(a), ScriptValue::Bool(b)) => a == b,
            (a, b) if a.type_of() == ScriptType::Number && b.type_of() == ScriptType::Number => {
                a.number() == b.number()
            }
            (ScriptValue::String(a), ScriptValue::String(b)) => a == b,
            (ScriptValue::Array(a), ScriptValue::Array(b)) => *a.borrow() == *b.borrow(),
            (ScriptValue::Object, ScriptValue::Object) => true,
            (ScriptValue::HostObject { id: a, .. }, ScriptValue::HostObject { id: b, .. }) => a == b,
            (ScriptValue::Function(a), ScriptValue::Function(b)) => Rc::ptr_eq(a, b),
            (
                ScriptValue::Error { name: n1, message: m1 },
                ScriptValue::Error { name: n2, message: m2 },
            ) => n1 == n2 && m1 == m2,
            _ => false,
        }
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        ScriptValue::Float(n)
    }
}

impl From<i32> for ScriptValue {
    fn from(i: i32) -> Self {
        ScriptValue::Int(i)
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        ScriptValue::Bool(b)
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::string(s)
    }
}
