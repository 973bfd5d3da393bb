use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    builtin::Builtin,
    environment::Environment,
    error::RuntimeError,
    object::{Array, Function, HashPair, MonkeyHash, Object},
};

use monkey_parser::{
    ast::{BlockStatement, Expression, HashLiteral, Program, Statement},
    token::Token,
};

pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())))
    }

    pub fn new_with_env(env: Rc<RefCell<Environment>>) -> Self {
        Evaluator { env }
    }

    pub fn eval(&mut self, prog: &Program) -> Rc<Object> {
        let mut result = Object::null();

        for stmt in &prog.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                // A return value stops evaluation; the program boundary is the
                // one place the wrapper is unwrapped
                Object::ReturnValue(inner_value) => return Rc::clone(inner_value),
                Object::Error(_) => return val,
                _ => result = val,
            }
        }

        result
    }

    // Similar to eval (for programs) but doesn't unwrap return values, so an
    // enclosing block or call site can keep short-circuiting
    fn eval_block_statement(&mut self, block: &BlockStatement) -> Rc<Object> {
        let mut result = Object::null();

        for stmt in &block.statements {
            let val = self.eval_statement(stmt);

            match val.as_ref() {
                Object::ReturnValue(_) => return val,
                Object::Error(_) => return val,
                _ => result = val,
            }
        }

        result
    }

    fn eval_statement(&mut self, stmt: &Statement) -> Rc<Object> {
        match stmt {
            Statement::Expression { expression } => self.eval_expression(expression),
            Statement::Return { value } => {
                let obj = self.eval_expression(value);

                // No need to wrap an Error in a ReturnValue since they both
                // bubble up the same way
                if obj.is_error() {
                    return obj;
                }

                Rc::new(Object::ReturnValue(obj))
            }
            Statement::Let { name, value } => {
                let obj = self.eval_expression(value);
                if obj.is_error() {
                    return obj;
                }

                // Bind in the current environment; blocks share the enclosing
                // scope, so a let inside an if body is visible after it
                self.env.borrow_mut().set(name.name.clone(), obj);

                Object::null()
            }
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> Rc<Object> {
        match expr {
            Expression::Integer(value) => Rc::new(Object::Integer(*value)),
            Expression::Boolean(value) => Object::boolean(*value),
            Expression::String(value) => Rc::new(Object::String(value.clone())),
            Expression::Identifier(identifier) => self.eval_identifier_expression(&identifier.name),

            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right);
                if right.is_error() {
                    return right;
                }
                self.eval_prefix_expression(&prefix.operator, right)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(&infix.right);
                if right.is_error() {
                    return right;
                }
                self.eval_infix_expression(&infix.operator, left, right)
            }

            Expression::If(if_expr) => {
                let condition = self.eval_expression(&if_expr.condition);
                if condition.is_error() {
                    return condition;
                }

                if is_truthy(&condition) {
                    self.eval_block_statement(&if_expr.consequence)
                } else if let Some(alternative) = &if_expr.alternative {
                    self.eval_block_statement(alternative)
                } else {
                    Object::null()
                }
            }

            Expression::Array(arr) => {
                let elements = self.eval_expressions(&arr.elements);
                if elements.len() == 1 && elements[0].is_error() {
                    return Rc::clone(&elements[0]);
                }
                Rc::new(Object::Array(Array { elements }))
            }
            Expression::Hash(hash) => self.eval_hash_literal(hash),
            Expression::Index(expr) => {
                let left = self.eval_expression(&expr.left);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expression(&expr.index);
                if index.is_error() {
                    return index;
                }
                self.eval_index_expression(left, index)
            }

            Expression::Function(func) => Rc::new(Object::Function(Function {
                parameters: func.parameters.clone(),
                body: Rc::clone(&func.body),
                env: Rc::clone(&self.env),
            })),
            Expression::Call(call) => {
                let func = self.eval_expression(&call.function);
                if func.is_error() {
                    return func;
                }
                let args = self.eval_expressions(&call.arguments);
                if args.len() == 1 && args[0].is_error() {
                    return Rc::clone(&args[0]);
                }

                self.apply_function(func, args)
            }
        }
    }

    /// Evaluate expressions left to right; on the first error the result is a
    /// single-element list holding only that error.
    fn eval_expressions(&mut self, exprs: &[Expression]) -> Vec<Rc<Object>> {
        let mut result = Vec::new();
        for expr in exprs {
            let evaluated = self.eval_expression(expr);
            if evaluated.is_error() {
                return vec![evaluated];
            }
            result.push(evaluated);
        }
        result
    }

    fn eval_identifier_expression(&self, name: &str) -> Rc<Object> {
        let result = self.env.borrow().get(name);

        match result {
            Some(obj) => obj,
            // Builtins live outside the environment and are consulted only
            // after the lookup fails, so user bindings can shadow them
            None => match Builtin::lookup(name) {
                Some(builtin) => Rc::new(Object::Builtin(builtin)),
                None => Rc::new(Object::Error(RuntimeError::IdentifierNotFound(
                    name.to_owned(),
                ))),
            },
        }
    }

    fn eval_prefix_expression(&self, operator: &Token, right: Rc<Object>) -> Rc<Object> {
        match operator {
            Token::Bang => self.eval_bang_operator_expression(right),
            Token::Minus => self.eval_minus_prefix_operator_expression(right),
            _ => Rc::new(Object::Error(RuntimeError::UnknownPrefixOperator(
                operator.clone(),
                right,
            ))),
        }
    }

    fn eval_bang_operator_expression(&self, right: Rc<Object>) -> Rc<Object> {
        match *right {
            Object::Boolean(value) => Object::boolean(!value),
            Object::Null => Object::boolean(true),
            // Everything else is truthy, so its negation is false
            _ => Object::boolean(false),
        }
    }

    fn eval_minus_prefix_operator_expression(&self, right: Rc<Object>) -> Rc<Object> {
        match *right {
            Object::Integer(value) => Rc::new(Object::Integer(-value)),
            _ => Rc::new(Object::Error(RuntimeError::UnknownPrefixOperator(
                Token::Minus,
                right,
            ))),
        }
    }

    fn eval_infix_expression(
        &self,
        operator: &Token,
        left: Rc<Object>,
        right: Rc<Object>,
    ) -> Rc<Object> {
        match (left.as_ref(), right.as_ref()) {
            (Object::Integer(left_value), Object::Integer(right_value)) => {
                self.eval_integer_infix_expression(operator, *left_value, *right_value)
            }

            (Object::String(_), Object::String(_)) => {
                self.eval_string_infix_expression(operator, left, right)
            }

            // Any other type combination compares by identity; booleans and
            // null are singletons, so this is exact for them
            _ => match operator {
                Token::Equal => Object::boolean(Rc::ptr_eq(&left, &right)),
                Token::NotEqual => Object::boolean(!Rc::ptr_eq(&left, &right)),
                _ if left.type_name() != right.type_name() => Rc::new(Object::Error(
                    RuntimeError::TypeMismatch(operator.clone(), left, right),
                )),
                _ => Rc::new(Object::Error(RuntimeError::UnknownInfixOperator(
                    operator.clone(),
                    left,
                    right,
                ))),
            },
        }
    }

    fn eval_integer_infix_expression(
        &self,
        operator: &Token,
        left_value: i64,
        right_value: i64,
    ) -> Rc<Object> {
        match operator {
            Token::Plus => Rc::new(Object::Integer(left_value + right_value)),
            Token::Minus => Rc::new(Object::Integer(left_value - right_value)),
            Token::Asterisk => Rc::new(Object::Integer(left_value * right_value)),
            Token::Slash => {
                if right_value == 0 {
                    return Rc::new(Object::Error(RuntimeError::DivisionByZero));
                }
                Rc::new(Object::Integer(left_value / right_value))
            }

            Token::LessThan => Object::boolean(left_value < right_value),
            Token::GreaterThan => Object::boolean(left_value > right_value),
            Token::Equal => Object::boolean(left_value == right_value),
            Token::NotEqual => Object::boolean(left_value != right_value),

            operator => Rc::new(Object::Error(RuntimeError::UnknownInfixOperator(
                operator.clone(),
                Rc::new(Object::Integer(left_value)),
                Rc::new(Object::Integer(right_value)),
            ))),
        }
    }

    fn eval_string_infix_expression(
        &self,
        operator: &Token,
        left: Rc<Object>,
        right: Rc<Object>,
    ) -> Rc<Object> {
        match (operator, left.as_ref(), right.as_ref()) {
            (Token::Plus, Object::String(left_value), Object::String(right_value)) => {
                Rc::new(Object::String(format!("{}{}", left_value, right_value)))
            }
            _ => Rc::new(Object::Error(RuntimeError::UnknownInfixOperator(
                operator.clone(),
                left,
                right,
            ))),
        }
    }

    fn eval_hash_literal(&mut self, hash: &HashLiteral) -> Rc<Object> {
        let mut pairs = HashMap::new();

        for (key_expr, value_expr) in &hash.pairs {
            let key = self.eval_expression(key_expr);
            if key.is_error() {
                return key;
            }

            let hash_key = match key.hash_key() {
                Some(hash_key) => hash_key,
                None => return Rc::new(Object::Error(RuntimeError::UnusableHashKey(key))),
            };

            let value = self.eval_expression(value_expr);
            if value.is_error() {
                return value;
            }

            // Later duplicate keys overwrite earlier ones
            pairs.insert(hash_key, HashPair { key, value });
        }

        Rc::new(Object::Hash(MonkeyHash { pairs }))
    }

    fn eval_index_expression(&mut self, left: Rc<Object>, index: Rc<Object>) -> Rc<Object> {
        match (left.as_ref(), index.as_ref()) {
            (Object::Array(array), Object::Integer(index_value)) => {
                // Out of range (negative included) yields null, not an error
                if *index_value < 0 || *index_value >= array.elements.len() as i64 {
                    return Object::null();
                }

                Rc::clone(&array.elements[*index_value as usize])
            }
            (Object::Hash(hash), _) => match index.hash_key() {
                Some(key) => match hash.pairs.get(&key) {
                    Some(pair) => Rc::clone(&pair.value),
                    None => Object::null(),
                },
                None => Rc::new(Object::Error(RuntimeError::UnusableHashKey(index))),
            },
            _ => Rc::new(Object::Error(RuntimeError::IndexNotSupported(left))),
        }
    }

    fn apply_function(&mut self, func: Rc<Object>, args: Vec<Rc<Object>>) -> Rc<Object> {
        match func.as_ref() {
            Object::Function(func) => {
                if args.len() != func.parameters.len() {
                    return Rc::new(Object::Error(RuntimeError::WrongNumberOfArguments {
                        want: func.parameters.len(),
                        got: args.len(),
                    }));
                }

                // Remember current environment (when exiting from call)
                let current_env = Rc::clone(&self.env);
                // Create a new scoped environment whose outer is the
                // function's captured environment
                let mut scoped_env = Environment::new_enclosed(Rc::clone(&func.env));

                for (ident, obj) in func.parameters.iter().zip(args.iter()) {
                    scoped_env.set(ident.name.clone(), Rc::clone(obj));
                }

                self.env = Rc::new(RefCell::new(scoped_env));

                let result = self.eval_block_statement(&func.body);

                self.env = current_env;

                // The call site is the other place besides the program
                // boundary where a return wrapper is unwrapped
                match result.as_ref() {
                    Object::ReturnValue(inner_value) => Rc::clone(inner_value),
                    _ => result,
                }
            }
            // Builtins handle themselves
            Object::Builtin(builtin) => match builtin.apply(args) {
                Ok(obj) => obj,
                Err(err) => Rc::new(Object::Error(err)),
            },
            _ => Rc::new(Object::Error(RuntimeError::NotAFunction(func))),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

/// Only false and null are falsy; everything else (including 0, "" and empty
/// arrays) is truthy.
fn is_truthy(obj: &Object) -> bool {
    match obj {
        Object::Null => false,
        Object::Boolean(value) => *value,
        _ => true,
    }
}
