use std::{cell::RefCell, collections::HashMap, fmt::Display, rc::Rc};

use crate::builtin::Builtin;
use crate::environment::Environment;
use crate::error::RuntimeError;

use monkey_parser::ast::{BlockStatement, IdentifierLiteral};

// Canonical instances for the values equality treats as identities. Every
// boolean or null the evaluator produces must be one of these, so `==`
// reduces to pointer comparison. Rc is not Sync, hence thread-local.
thread_local! {
    static TRUE: Rc<Object> = Rc::new(Object::Boolean(true));
    static FALSE: Rc<Object> = Rc::new(Object::Boolean(false));
    static NULL: Rc<Object> = Rc::new(Object::Null);
}

#[derive(Debug, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Array),
    Hash(MonkeyHash),
    Function(Function),
    Builtin(Builtin),
    /// Special object to encapsulate a return-ed value while it goes up scopes.
    /// This is never seen by the user.
    ReturnValue(Rc<Object>),
    Error(RuntimeError),
}

impl Object {
    /// The canonical boolean instance for the given value.
    pub fn boolean(value: bool) -> Rc<Object> {
        if value {
            TRUE.with(Rc::clone)
        } else {
            FALSE.with(Rc::clone)
        }
    }

    /// The canonical null instance.
    pub fn null() -> Rc<Object> {
        NULL.with(Rc::clone)
    }

    /// The type tag used in runtime error messages.
    pub fn type_name(&self) -> &'static str {
        use Object::*;

        match self {
            Integer(_) => "INTEGER",
            Boolean(_) => "BOOLEAN",
            String(_) => "STRING",
            Null => "NULL",
            Array(_) => "ARRAY",
            Hash(_) => "HASH",
            Function(_) => "FUNCTION",
            Builtin(_) => "BUILTIN",
            ReturnValue(_) => "RETURN_VALUE",
            Error(_) => "ERROR",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The hash key for this value, if its type is hashable.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => Some(HashKey::Integer(*value)),
            Object::Boolean(value) => Some(HashKey::Boolean(*value)),
            Object::String(value) => Some(HashKey::String(value.clone())),
            _ => None,
        }
    }

    /// Converts the given value to a string in the format of a code object.
    ///
    /// Use this anywhere a programmer expects to see the code-version of an
    /// object (e.g. in the REPL).
    pub fn to_code_string(&self) -> String {
        use Object::*;

        match self {
            String(value) => format!("\"{}\"", value),
            value => value.to_string(),
        }
    }
}

impl Display for Object {
    /// toString() form at runtime
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Object::*;

        match self {
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            String(value) => write!(f, "{}", value),
            Null => write!(f, "null"),
            Array(array) => write!(f, "{}", array),
            Hash(hash) => write!(f, "{}", hash),
            Function(func) => write!(f, "{}", func),
            Builtin(builtin) => write!(f, "{}", builtin),
            ReturnValue(obj) => write!(f, "{}", obj),
            Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// The key a hashable value reduces to: equal type and contents always
/// produce an equal key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

#[derive(Debug, PartialEq)]
pub struct Array {
    pub elements: Vec<Rc<Object>>,
}

impl Display for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let elements: Vec<String> = self.elements.iter().map(|e| e.to_code_string()).collect();
        write!(f, "[{}]", elements.join(", "))
    }
}

/// A pair keeps the original key object alongside the value so hashes can be
/// displayed and iterated.
#[derive(Debug, PartialEq)]
pub struct HashPair {
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

#[derive(Debug, PartialEq)]
pub struct MonkeyHash {
    pub pairs: HashMap<HashKey, HashPair>,
}

impl Display for MonkeyHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs: Vec<String> = self
            .pairs
            .values()
            .map(|pair| format!("{}: {}", pair.key.to_code_string(), pair.value.to_code_string()))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockStatement>,
    pub env: Rc<RefCell<Environment>>,
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();

        write!(f, "fn({}) {{\n{}\n}}", params.join(", "), self.body)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Function) -> bool {
        // Two function values are the same only if they are the same closure
        Rc::ptr_eq(&self.body, &other.body) && Rc::ptr_eq(&self.env, &other.env)
    }
}
