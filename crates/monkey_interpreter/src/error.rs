use std::{fmt::Display, rc::Rc};

use crate::{builtin::Builtin, object::Object};
use monkey_parser::token::Token;

#[derive(Debug, PartialEq)]
pub enum RuntimeError {
    /// When an infix operation receives operands of two different types
    TypeMismatch(Token, Rc<Object>, Rc<Object>),
    /// When an infix operation is not defined for its operand types
    UnknownInfixOperator(Token, Rc<Object>, Rc<Object>),
    /// When a prefix operation is not defined for its operand type
    UnknownPrefixOperator(Token, Rc<Object>),
    /// When referencing an identifier that has not been defined
    IdentifierNotFound(String),
    /// When an object that is not a function is used with call syntax
    NotAFunction(Rc<Object>),
    /// When a call's argument count does not match the parameter count
    WrongNumberOfArguments { want: usize, got: usize },
    /// When a builtin function receives an argument of an unsupported type
    UnsupportedArgument(Builtin, Rc<Object>),
    /// When attempting to index an object that does not support it
    IndexNotSupported(Rc<Object>),
    /// When a hash key expression evaluates to an unhashable type
    UnusableHashKey(Rc<Object>),
    /// When the right operand of an integer division is zero
    DivisionByZero,
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use RuntimeError::*;

        match self {
            TypeMismatch(operator, left, right) => write!(
                f,
                "type mismatch: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            ),
            UnknownInfixOperator(operator, left, right) => write!(
                f,
                "unknown operator: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            ),
            UnknownPrefixOperator(operator, right) => {
                write!(f, "unknown operator: {}{}", operator, right.type_name())
            }
            IdentifierNotFound(name) => write!(f, "identifier not found: {}", name),
            NotAFunction(obj) => write!(f, "not a function: {}", obj.type_name()),
            WrongNumberOfArguments { want, got } => {
                write!(f, "wrong number of arguments. got={}, want={}", got, want)
            }
            UnsupportedArgument(builtin, obj) => write!(
                f,
                "argument to `{}` not supported, got {}",
                builtin.name(),
                obj.type_name()
            ),
            IndexNotSupported(left) => {
                write!(f, "index operator not supported: {}", left.type_name())
            }
            UnusableHashKey(key) => {
                write!(f, "unusable as hash key: {}", key.type_name())
            }
            DivisionByZero => write!(f, "division by zero"),
        }
    }
}
