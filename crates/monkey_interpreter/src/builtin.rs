use std::{fmt::Display, rc::Rc};

use crate::error::RuntimeError;
use crate::object::{Array, Object};

#[derive(Debug, PartialEq)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
    Puts,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            "first" => Some(Builtin::First),
            "last" => Some(Builtin::Last),
            "rest" => Some(Builtin::Rest),
            "push" => Some(Builtin::Push),
            "puts" => Some(Builtin::Puts),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
            Builtin::Puts => "puts",
        }
    }

    pub fn apply(&self, args: Vec<Rc<Object>>) -> Result<Rc<Object>, RuntimeError> {
        match self {
            Builtin::Len => {
                check_argument_count(&args, 1)?;

                let arg = Rc::clone(&args[0]);
                match arg.as_ref() {
                    Object::String(value) => Ok(Rc::new(Object::Integer(value.len() as i64))),
                    Object::Array(array) => {
                        Ok(Rc::new(Object::Integer(array.elements.len() as i64)))
                    }
                    _ => Err(RuntimeError::UnsupportedArgument(Builtin::Len, arg)),
                }
            }
            Builtin::First => {
                check_argument_count(&args, 1)?;

                let arg = Rc::clone(&args[0]);
                match arg.as_ref() {
                    Object::Array(array) => Ok(array
                        .elements
                        .first()
                        .map(Rc::clone)
                        .unwrap_or_else(Object::null)),
                    _ => Err(RuntimeError::UnsupportedArgument(Builtin::First, arg)),
                }
            }
            Builtin::Last => {
                check_argument_count(&args, 1)?;

                let arg = Rc::clone(&args[0]);
                match arg.as_ref() {
                    Object::Array(array) => Ok(array
                        .elements
                        .last()
                        .map(Rc::clone)
                        .unwrap_or_else(Object::null)),
                    _ => Err(RuntimeError::UnsupportedArgument(Builtin::Last, arg)),
                }
            }
            Builtin::Rest => {
                check_argument_count(&args, 1)?;

                let arg = Rc::clone(&args[0]);
                match arg.as_ref() {
                    Object::Array(array) => {
                        if array.elements.is_empty() {
                            return Ok(Object::null());
                        }

                        let elements = array.elements[1..].to_vec();
                        Ok(Rc::new(Object::Array(Array { elements })))
                    }
                    _ => Err(RuntimeError::UnsupportedArgument(Builtin::Rest, arg)),
                }
            }
            Builtin::Push => {
                check_argument_count(&args, 2)?;

                let arg = Rc::clone(&args[0]);
                match arg.as_ref() {
                    Object::Array(array) => {
                        // A fresh array; the original is left untouched
                        let mut elements = array.elements.clone();
                        elements.push(Rc::clone(&args[1]));
                        Ok(Rc::new(Object::Array(Array { elements })))
                    }
                    _ => Err(RuntimeError::UnsupportedArgument(Builtin::Push, arg)),
                }
            }
            Builtin::Puts => {
                for arg in &args {
                    println!("{}", arg);
                }
                Ok(Object::null())
            }
        }
    }
}

fn check_argument_count(args: &[Rc<Object>], want: usize) -> Result<(), RuntimeError> {
    if args.len() != want {
        return Err(RuntimeError::WrongNumberOfArguments {
            want,
            got: args.len(),
        });
    }
    Ok(())
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "builtin function {}", self.name())
    }
}
