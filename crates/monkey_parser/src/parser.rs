use std::fmt::Display;
use std::rc::Rc;

use crate::ast::{
    ArrayLiteral, BlockStatement, CallExpression, Expression, FunctionLiteral, HashLiteral,
    IdentifierLiteral, IfExpression, IndexExpression, InfixExpression, PrefixExpression, Program,
    Statement,
};
use crate::lexer::LexError;
use crate::{lexer::Lexer, token::Token};

#[derive(Debug)]
pub enum ParseError {
    /// A token other than the expected one came up next
    Expected(String, Token),
    /// No prefix parse function is registered for the current token
    InvalidPrefixFn(Token),
    /// An integer lexeme that does not fit a signed 64-bit value
    InvalidInteger(String),
    /// Wrapper for LexErrors to bubble up
    SyntaxError(LexError),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Expected(expected, got) => {
                write!(
                    f,
                    "expected next token to be {}, got {} instead",
                    expected, got
                )
            }
            ParseError::InvalidPrefixFn(token) => {
                write!(f, "no prefix parse function for {} found", token)
            }
            ParseError::InvalidInteger(literal) => {
                write!(f, "could not parse {} as integer", literal)
            }
            ParseError::SyntaxError(err) => {
                write!(f, "syntax error: {}", err)
            }
        }
    }
}

impl LexError {
    fn to_parse_error(self) -> ParseError {
        ParseError::SyntaxError(self)
    }
}

type ParseResult<T> = Result<T, ParseError>;

type PrefixFn = fn(parser: &mut Parser<'_>) -> ParseResult<Expression>;
type InfixFn = fn(parser: &mut Parser<'_>, left: Expression) -> ParseResult<Expression>;

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    fn token_precedence(tok: &Token) -> Precedence {
        match tok {
            Token::Equal => Precedence::Equals,
            Token::NotEqual => Precedence::Equals,
            Token::LessThan => Precedence::LessGreater,
            Token::GreaterThan => Precedence::LessGreater,
            Token::Plus => Precedence::Sum,
            Token::Minus => Precedence::Sum,
            Token::Slash => Precedence::Product,
            Token::Asterisk => Precedence::Product,
            Token::LeftParen => Precedence::Call,
            Token::LeftBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current_token: Token,
    peek_token: Token,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Parser<'a> {
        Parser {
            lexer,
            current_token: Token::Eof,
            peek_token: Token::Eof,
        }
    }

    /// Parse the entire input as a program.
    ///
    /// Statement-level errors are collected and parsing resumes at the next
    /// statement boundary; a lexing error aborts immediately.
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let mut program = Program::new();
        let mut errors: Vec<ParseError> = Vec::new();

        // Prepare parser by fetching the first two tokens
        match self.lexer.next_token() {
            Ok(tok) => self.current_token = tok,
            Err(err) => return Err(vec![ParseError::SyntaxError(err)]),
        };
        match self.lexer.next_token() {
            Ok(tok) => self.peek_token = tok,
            Err(err) => return Err(vec![ParseError::SyntaxError(err)]),
        };

        while self.current_token != Token::Eof {
            match self.parse_statement() {
                Ok(statement) => program.statements.push(statement),
                // Encountering a SyntaxError should exit out immediately
                Err(ParseError::SyntaxError(err)) => return Err(vec![err.to_parse_error()]),
                Err(error) => {
                    errors.push(error);
                    self.synchronize().map_err(|err| vec![err])?;
                }
            }

            // Consume the next token, exiting out if there was a LexError
            self.next_token().map_err(|err| vec![err])?;
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(program)
    }

    /// Skip tokens until the next statement boundary so one bad statement
    /// yields one error instead of a cascade.
    fn synchronize(&mut self) -> ParseResult<()> {
        while self.current_token != Token::Semicolon && self.current_token != Token::Eof {
            self.next_token()?;
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        let name = self.expect_peek_identifier()?;

        self.expect_peek(Token::Assign)?;

        // Consume the `=` sign
        self.next_token()?;

        let value = self.parse_expression(Precedence::Lowest)?;

        // A trailing semicolon is optional
        if self.peek_token_is(&Token::Semicolon) {
            self.next_token()?;
        }

        Ok(Statement::Let {
            name: IdentifierLiteral::from(name),
            value,
        })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        // Consume the `return` token
        self.next_token()?;

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(&Token::Semicolon) {
            self.next_token()?;
        }

        Ok(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(&Token::Semicolon) {
            self.next_token()?;
        }

        Ok(Statement::Expression { expression: expr })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        // Parse the current token (either as a prefix or as a literal)
        let mut left_expr = match self.get_prefix_fn(&self.current_token) {
            Some(prefix_fn) => prefix_fn(self)?,
            None => return Err(ParseError::InvalidPrefixFn(self.current_token.clone())),
        };

        // At this point the last token of left_expr is still current_token.
        // The strict `<` keeps equal precedences left-associative.
        while !self.peek_token_is(&Token::Semicolon) && precedence < self.peek_precedence() {
            let infix_fn = match self.get_infix_fn(&self.peek_token) {
                Some(infix_fn) => infix_fn,
                // No infix function means this is the end of the expression
                None => return Ok(left_expr),
            };

            // Move the infix operator to be current_token
            self.next_token()?;
            left_expr = infix_fn(self, left_expr)?;
        }

        Ok(left_expr)
    }

    /// Get the matching prefix parsing function for the given token.
    fn get_prefix_fn(&self, token: &Token) -> Option<PrefixFn> {
        match token {
            Token::If => Some(Parser::parse_if_expression),
            Token::Function => Some(Parser::parse_function_literal),

            Token::Identifier(_) => Some(Parser::parse_identifier_expression),
            Token::Integer(_) => Some(Parser::parse_integer_expression),
            Token::String(_) => Some(Parser::parse_string_expression),
            Token::True | Token::False => Some(Parser::parse_boolean_expression),

            Token::LeftParen => Some(Parser::parse_grouped_expression),
            Token::LeftBracket => Some(Parser::parse_array_literal),
            Token::LeftBrace => Some(Parser::parse_hash_literal),

            Token::Bang | Token::Minus => Some(Parser::parse_prefix_expression),
            _ => None,
        }
    }

    /// Get the matching infix parsing function for the given token.
    fn get_infix_fn(&self, token: &Token) -> Option<InfixFn> {
        match token {
            Token::LeftParen => Some(Parser::parse_call_expression),
            Token::LeftBracket => Some(Parser::parse_index_expression),

            Token::Plus
            | Token::Minus
            | Token::Slash
            | Token::Asterisk
            | Token::Equal
            | Token::NotEqual
            | Token::LessThan
            | Token::GreaterThan => Some(Parser::parse_infix_expression),
            _ => None,
        }
    }

    fn parse_if_expression(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        parser.expect_peek(Token::LeftParen)?;

        // Consume the opening parenthesis
        parser.next_token()?;

        let condition = parser.parse_expression(Precedence::Lowest)?;

        parser.expect_peek(Token::RightParen)?;
        parser.expect_peek(Token::LeftBrace)?;

        let consequence = parser.parse_block_statement()?;

        let alternative = if parser.peek_token_is(&Token::Else) {
            // Consume the `else` token
            parser.next_token()?;
            parser.expect_peek(Token::LeftBrace)?;

            Some(parser.parse_block_statement()?)
        } else {
            None
        };

        Ok(Expression::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        })))
    }

    fn parse_block_statement(&mut self) -> ParseResult<BlockStatement> {
        let mut statements = Vec::new();

        // Consume the left brace
        self.next_token()?;

        while !self.current_token_is(&Token::RightBrace) && !self.current_token_is(&Token::Eof) {
            let stmt = self.parse_statement()?;
            statements.push(stmt);
            self.next_token()?;
        }

        // Reaching EOF instead of the closing brace is a parse error
        if !self.current_token_is(&Token::RightBrace) {
            return Err(ParseError::Expected(
                Token::RightBrace.to_string(),
                self.current_token.clone(),
            ));
        }

        Ok(BlockStatement { statements })
    }

    fn parse_function_literal(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        parser.expect_peek(Token::LeftParen)?;

        let parameters = parser.parse_function_parameters()?;

        parser.expect_peek(Token::LeftBrace)?;

        let body = parser.parse_block_statement()?;

        Ok(Expression::Function(Box::new(FunctionLiteral {
            parameters,
            body: Rc::new(body),
        })))
    }

    fn parse_function_parameters(&mut self) -> ParseResult<Vec<IdentifierLiteral>> {
        let mut identifiers = Vec::new();

        // No parameters, parentheses close immediately
        if self.peek_token_is(&Token::RightParen) {
            self.next_token()?;
            return Ok(identifiers);
        }

        // Consume the left parenthesis
        self.next_token()?;

        identifiers.push(self.parse_identifier_as_literal()?);

        while self.peek_token_is(&Token::Comma) {
            // Consume previous identifier, then the comma
            self.next_token()?;
            self.next_token()?;
            identifiers.push(self.parse_identifier_as_literal()?);
        }

        self.expect_peek(Token::RightParen)?;

        Ok(identifiers)
    }

    fn parse_identifier_as_literal(&mut self) -> ParseResult<IdentifierLiteral> {
        if let Token::Identifier(ref name) = self.current_token {
            Ok(IdentifierLiteral::from(name.clone()))
        } else {
            Err(ParseError::Expected(
                "identifier".to_string(),
                self.current_token.clone(),
            ))
        }
    }

    fn parse_identifier_expression(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        let identifier_literal = parser.parse_identifier_as_literal()?;
        Ok(Expression::Identifier(identifier_literal))
    }

    fn parse_integer_expression(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        if let Token::Integer(ref literal) = parser.current_token {
            match literal.parse::<i64>() {
                Ok(value) => Ok(Expression::Integer(value)),
                Err(_) => Err(ParseError::InvalidInteger(literal.clone())),
            }
        } else {
            Err(ParseError::Expected(
                "integer".to_string(),
                parser.current_token.clone(),
            ))
        }
    }

    fn parse_string_expression(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        if let Token::String(ref value) = parser.current_token {
            Ok(Expression::String(value.clone()))
        } else {
            Err(ParseError::Expected(
                "string".to_string(),
                parser.current_token.clone(),
            ))
        }
    }

    fn parse_boolean_expression(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        match parser.current_token {
            Token::True => Ok(Expression::Boolean(true)),
            Token::False => Ok(Expression::Boolean(false)),
            _ => Err(ParseError::Expected(
                "boolean".to_string(),
                parser.current_token.clone(),
            )),
        }
    }

    fn parse_grouped_expression(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        // Consume left parenthesis
        parser.next_token()?;

        let exp = parser.parse_expression(Precedence::Lowest);

        parser.expect_peek(Token::RightParen)?;

        exp
    }

    fn parse_prefix_expression(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        let operator = parser.current_token.clone();
        // Consume the operator token; the operand binds at Prefix precedence,
        // tighter than any binary operator
        parser.next_token()?;
        let right = parser.parse_expression(Precedence::Prefix)?;
        Ok(Expression::Prefix(Box::new(PrefixExpression {
            operator,
            right,
        })))
    }

    fn parse_array_literal(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        let elements = parser.parse_expression_list(Token::RightBracket)?;
        Ok(Expression::Array(Box::new(ArrayLiteral { elements })))
    }

    fn parse_hash_literal(parser: &mut Parser<'_>) -> ParseResult<Expression> {
        let mut pairs = Vec::new();

        while !parser.peek_token_is(&Token::RightBrace) {
            parser.next_token()?;
            let key = parser.parse_expression(Precedence::Lowest)?;

            parser.expect_peek(Token::Colon)?;
            parser.next_token()?;
            let value = parser.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !parser.peek_token_is(&Token::RightBrace) {
                parser.expect_peek(Token::Comma)?;
            }
        }

        parser.expect_peek(Token::RightBrace)?;

        Ok(Expression::Hash(Box::new(HashLiteral { pairs })))
    }

    fn parse_call_expression(parser: &mut Parser<'_>, left: Expression) -> ParseResult<Expression> {
        let arguments = parser.parse_expression_list(Token::RightParen)?;
        Ok(Expression::Call(Box::new(CallExpression {
            function: left,
            arguments,
        })))
    }

    fn parse_index_expression(
        parser: &mut Parser<'_>,
        left: Expression,
    ) -> ParseResult<Expression> {
        // Consume the opening bracket
        parser.next_token()?;

        let index = parser.parse_expression(Precedence::Lowest)?;

        parser.expect_peek(Token::RightBracket)?;

        Ok(Expression::Index(Box::new(IndexExpression { left, index })))
    }

    /// Comma-separated expressions up to the closing `end` token; shared by
    /// array literals and call arguments.
    fn parse_expression_list(&mut self, end: Token) -> ParseResult<Vec<Expression>> {
        let mut items = Vec::new();

        // Empty list, delimiters close immediately
        if self.peek_token_is(&end) {
            self.next_token()?;
            return Ok(items);
        }

        // Consume the opening delimiter
        self.next_token()?;
        items.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(&Token::Comma) {
            // Consume previous item, then the comma
            self.next_token()?;
            self.next_token()?;
            items.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;

        Ok(items)
    }

    fn parse_infix_expression(
        parser: &mut Parser<'_>,
        left: Expression,
    ) -> ParseResult<Expression> {
        let operator = parser.current_token.clone();
        let precedence = parser.current_precedence();
        parser.next_token()?;

        let right = parser.parse_expression(precedence)?;

        Ok(Expression::Infix(Box::new(InfixExpression {
            left,
            operator,
            right,
        })))
    }

    fn next_token(&mut self) -> Result<(), ParseError> {
        self.current_token = std::mem::replace(&mut self.peek_token, Token::Eof);
        match self.lexer.next_token() {
            Ok(tok) => {
                self.peek_token = tok;
                Ok(())
            }
            Err(err) => Err(err.to_parse_error()),
        }
    }

    fn current_token_is(&self, token: &Token) -> bool {
        token_kind_matches(token, &self.current_token)
    }

    fn peek_token_is(&self, token: &Token) -> bool {
        token_kind_matches(token, &self.peek_token)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::token_precedence(&self.current_token)
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::token_precedence(&self.peek_token)
    }

    fn expect_peek(&mut self, token: Token) -> ParseResult<()> {
        if self.peek_token_is(&token) {
            self.next_token()?;
            Ok(())
        } else {
            Err(ParseError::Expected(
                token.to_string(),
                self.peek_token.clone(),
            ))
        }
    }

    fn expect_peek_identifier(&mut self) -> ParseResult<String> {
        let name = match &self.peek_token {
            Token::Identifier(name) => name.to_owned(),
            _ => {
                return Err(ParseError::Expected(
                    String::from("identifier"),
                    self.peek_token.clone(),
                ))
            }
        };

        self.next_token()?;
        Ok(name)
    }
}

/// Compare tokens by kind, ignoring any payload.
fn token_kind_matches(expected: &Token, actual: &Token) -> bool {
    match (expected, actual) {
        (Token::Identifier(_), Token::Identifier(_)) => true,
        (Token::Integer(_), Token::Integer(_)) => true,
        (Token::String(_), Token::String(_)) => true,
        _ => expected == actual,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expression, IdentifierLiteral, Program, Statement};
    use crate::lexer::Lexer;
    use crate::parser::{ParseError, Parser};
    use crate::token::Token;

    #[test]
    fn let_statement() {
        let tests = vec![
            ("let x = 5;", "x", Expression::Integer(5)),
            ("let y = true;", "y", Expression::Boolean(true)),
            (
                "let foobar = y;",
                "foobar",
                Expression::Identifier(IdentifierLiteral::from("y")),
            ),
        ];

        for (input, expected_ident, expected_value) in tests {
            let prog = setup(input, 1);

            match &prog.statements[0] {
                Statement::Let { name, value } => {
                    assert_eq!(
                        expected_ident, name.name,
                        "expected identifier {} but got {}",
                        expected_ident, name
                    );

                    assert_eq!(
                        expected_value, *value,
                        "expected value {} but got {}",
                        expected_value, value
                    );
                }
                stmt => panic!("expected let statement but got {}", stmt),
            }
        }
    }

    #[test]
    fn return_statement() {
        let tests = vec![
            ("return 5;", Expression::Integer(5)),
            ("return true;", Expression::Boolean(true)),
            (
                "return y;",
                Expression::Identifier(IdentifierLiteral::from("y")),
            ),
        ];

        for (input, expected_value) in tests {
            let prog = setup(input, 1);

            match &prog.statements[0] {
                Statement::Return { value } => {
                    assert_eq!(
                        expected_value, *value,
                        "expected value {} but got {}",
                        expected_value, value
                    );
                }
                stmt => panic!("expected return statement but got {}", stmt),
            }
        }
    }

    #[test]
    fn identifier_expression() {
        let input = "foobar;";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        test_identifier(expr, "foobar");
    }

    #[test]
    fn integer_expression() {
        let input = "5;";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        test_integer_literal(expr, 5);
    }

    #[test]
    fn string_expression() {
        let input = "\"hello world\";";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::String(value) => assert_eq!(value, "hello world"),
            expr => panic!("expected string literal but got {}", expr),
        }
    }

    #[test]
    fn boolean_expression() {
        // Tests: (input, value)
        let tests = vec![("true;", true), ("false;", false)];

        for (input, value) in tests {
            let prog = setup(input, 1);
            let expr = unwrap_expression(&prog);

            test_boolean_literal(expr, value);
        }
    }

    #[test]
    fn prefix_expressions() {
        // Tests: (input, operator, value)
        let tests: Vec<(&str, Token, i64)> =
            vec![("!5;", Token::Bang, 5), ("-15", Token::Minus, 15)];

        for (input, op, right) in tests {
            let prog = setup(input, 1);

            let expr = unwrap_expression(&prog);

            match expr {
                Expression::Prefix(expr) => {
                    assert_eq!(
                        op, expr.operator,
                        "expected operator {} but got {}",
                        op, expr.operator,
                    );
                    test_integer_literal(&expr.right, right);
                }
                expr => panic!("expected prefix expression but got {}", expr),
            }
        }
    }

    #[test]
    fn infix_integer_expressions() {
        // Tests: (input, left_value, operator, right_value)
        let tests: Vec<(&str, i64, Token, i64)> = vec![
            ("2 + 5;", 2, Token::Plus, 5),
            ("2 - 5;", 2, Token::Minus, 5),
            ("2 * 5;", 2, Token::Asterisk, 5),
            ("2 / 5;", 2, Token::Slash, 5),
            ("2 > 5;", 2, Token::GreaterThan, 5),
            ("2 < 5;", 2, Token::LessThan, 5),
            ("2 == 5;", 2, Token::Equal, 5),
            ("2 != 5;", 2, Token::NotEqual, 5),
        ];

        for (input, left, op, right) in tests {
            let prog = setup(input, 1);

            let expr = unwrap_expression(&prog);

            match expr {
                Expression::Infix(expr) => {
                    test_integer_literal(&expr.left, left);
                    assert_eq!(
                        op, expr.operator,
                        "expected operator {} but got {}",
                        op, expr.operator,
                    );
                    test_integer_literal(&expr.right, right);
                }
                expr => panic!("expected infix expression but got {}", expr),
            }
        }
    }

    #[test]
    fn infix_boolean_expressions() {
        // Tests: (input, left_value, operator, right_value)
        let tests: Vec<(&str, bool, Token, bool)> = vec![
            ("true == true", true, Token::Equal, true),
            ("true != false", true, Token::NotEqual, false),
            ("false == false", false, Token::Equal, false),
        ];

        for (input, left, op, right) in tests {
            let prog = setup(input, 1);

            let expr = unwrap_expression(&prog);

            match expr {
                Expression::Infix(expr) => {
                    test_boolean_literal(&expr.left, left);
                    assert_eq!(
                        op, expr.operator,
                        "expected operator {} but got {}",
                        op, expr.operator,
                    );
                    test_boolean_literal(&expr.right, right);
                }
                expr => panic!("expected infix expression but got {}", expr),
            }
        }
    }

    #[test]
    fn operator_precedence() {
        // Tests: (input, expected display form)
        #[rustfmt::skip]
        let tests = vec![
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a * b / c", "((a * b) / c)"),
            ("a + b / c", "(a + (b / c))"),
            ("1 - 2 - 3", "((1 - 2) - 3)"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("3 + 4; -5 * 5", "(3 + 4); ((-5) * 5)"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
            ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
            ("true", "true"),
            ("false", "false"),
            ("3 > 5 == false", "((3 > 5) == false)"),
            ("3 < 5 == true", "((3 < 5) == true)"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("2 / (5 + 5)", "(2 / (5 + 5))"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            ("add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))", "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))"),
            ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
            ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
            ("add(a * b[2], b[1], 2 * [1, 2][1])", "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))"),
        ];

        for (input, expected) in tests {
            let prog = setup(input, 0).to_string();
            assert_eq!(expected, prog, "expected '{}' but got '{}'", expected, prog)
        }
    }

    #[test]
    fn display_round_trips() {
        // The display form of a parsed expression parses back to the same tree
        let tests = vec![
            "a + b * c + d / e - f",
            "!-a",
            "add(a, b, 1, 2 * 3)",
            "a * [1, 2, 3, 4][b * c] * d",
            "{\"one\": 1, \"two\": 2}[\"one\"]",
        ];

        for input in tests {
            let first = setup(input, 1);
            let reparsed = setup(&first.to_string(), 1);
            assert_eq!(
                first.statements, reparsed.statements,
                "'{}' did not round-trip through '{}'",
                input, first
            );
        }
    }

    #[test]
    fn if_expression() {
        let input = "if (x < y) { x }";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::If(if_expr) => {
                test_if_condition(&if_expr.condition, "x", Token::LessThan, "y");

                assert_eq!(if_expr.consequence.statements.len(), 1);

                match &if_expr.consequence.statements[0] {
                    Statement::Expression { expression } => test_identifier(expression, "x"),
                    stmt => panic!("expected expression statement but got {:?}", stmt),
                }

                assert_eq!(if_expr.alternative, None);
            }
            expr => panic!("expected if expression but got {}", expr),
        }
    }

    #[test]
    fn if_else_expression() {
        let input = "if (x < y) { x } else { y }";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::If(if_expr) => {
                test_if_condition(&if_expr.condition, "x", Token::LessThan, "y");

                assert_eq!(if_expr.consequence.statements.len(), 1);

                match &if_expr.consequence.statements[0] {
                    Statement::Expression { expression } => test_identifier(expression, "x"),
                    stmt => panic!("expected expression statement (in if) but got {:?}", stmt),
                }

                if let Some(alternative) = &if_expr.alternative {
                    assert_eq!(alternative.statements.len(), 1);

                    match &alternative.statements[0] {
                        Statement::Expression { expression } => test_identifier(expression, "y"),
                        stmt => {
                            panic!("expected expression statement (in else) but got {:?}", stmt)
                        }
                    }
                } else {
                    panic!("expected alternative (else) block")
                }
            }
            expr => panic!("expected if expression but got {}", expr),
        }
    }

    #[test]
    fn function_literal() {
        let input = "fn(x, y) { x + y; }";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::Function(func) => {
                assert_eq!(
                    func.parameters.len(),
                    2,
                    "expected 2 parameters but got {:?}",
                    func.parameters
                );
                test_identifier_literal(&func.parameters[0], "x");
                test_identifier_literal(&func.parameters[1], "y");
                assert_eq!(
                    func.body.statements.len(),
                    1,
                    "expected 1 body statement but got {:?}",
                    func.body
                );

                match &func.body.statements[0] {
                    Statement::Expression { expression } => match expression {
                        Expression::Infix(infix) => {
                            assert_eq!(
                                infix.operator,
                                Token::Plus,
                                "expected + but got {}",
                                infix.operator
                            );
                            test_identifier(&infix.left, "x");
                            test_identifier(&infix.right, "y");
                        }
                        stmt => panic!("expected infix expression but got {:?}", stmt),
                    },
                    stmt => panic!("expected expression statement but got {:?}", stmt),
                }
            }
            expr => panic!("expected function literal expression but got {}", expr),
        }
    }

    #[test]
    fn function_parameters() {
        // Tests: (input, expected parameters)
        #[rustfmt::skip]
        let tests = vec![
            ("fn() {}", vec![]),
            ("fn(x) {}", vec!["x"]),
            ("fn(x, y, z) {}", vec!["x", "y", "z"])
        ];

        for (input, expected) in tests {
            let prog = setup(input, 0);
            let expr = unwrap_expression(&prog);

            match expr {
                Expression::Function(func) => {
                    assert_eq!(
                        expected.len(),
                        func.parameters.len(),
                        "expected {} parameters but got {:?}",
                        expected.len(),
                        func.parameters
                    );

                    for (ident, &expected_value) in func.parameters.iter().zip(expected.iter()) {
                        test_identifier_literal(ident, expected_value);
                    }
                }
                expr => panic!("expected function literal expression but got {}", expr),
            }
        }
    }

    #[test]
    fn call_expression() {
        let input = "add(1, 2 * 3)";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::Call(call) => {
                test_identifier(&call.function, "add");
                assert_eq!(
                    call.arguments.len(),
                    2,
                    "expected 2 call arguments but got {:?}",
                    call.arguments
                );

                test_integer_literal(&call.arguments[0], 1);

                match &call.arguments[1] {
                    Expression::Infix(expr) => {
                        test_integer_literal(&expr.left, 2);
                        assert_eq!(
                            Token::Asterisk,
                            expr.operator,
                            "expected operator * but got {}",
                            expr.operator,
                        );
                        test_integer_literal(&expr.right, 3);
                    }
                    expr => panic!(
                        "expected infix expression for second argument but got {}",
                        expr
                    ),
                }
            }
            expr => panic!("expected call expression but got {}", expr),
        }
    }

    #[test]
    fn empty_call_arguments() {
        let input = "noArgs()";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::Call(call) => assert!(call.arguments.is_empty()),
            expr => panic!("expected call expression but got {}", expr),
        }
    }

    #[test]
    fn array_literal() {
        let input = "[1, 2 * 2, 3 + 3]";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::Array(arr) => {
                assert_eq!(
                    arr.elements.len(),
                    3,
                    "expected 3 elements but got {:?}",
                    arr.elements
                );
                test_integer_literal(&arr.elements[0], 1);
                assert_eq!(arr.elements[1].to_string(), "(2 * 2)");
                assert_eq!(arr.elements[2].to_string(), "(3 + 3)");
            }
            expr => panic!("expected array literal but got {}", expr),
        }
    }

    #[test]
    fn empty_array_literal() {
        let input = "[]";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::Array(arr) => assert!(arr.elements.is_empty()),
            expr => panic!("expected array literal but got {}", expr),
        }
    }

    #[test]
    fn index_expression() {
        let input = "myArray[1 + 1]";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::Index(index) => {
                test_identifier(&index.left, "myArray");
                assert_eq!(index.index.to_string(), "(1 + 1)");
            }
            expr => panic!("expected index expression but got {}", expr),
        }
    }

    #[test]
    fn hash_literal_with_string_keys() {
        let input = "{\"one\": 1, \"two\": 2, \"three\": 3}";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::Hash(hash) => {
                let expected = vec![("one", 1), ("two", 2), ("three", 3)];

                assert_eq!(hash.pairs.len(), expected.len());
                for ((key, value), (expected_key, expected_value)) in
                    hash.pairs.iter().zip(expected)
                {
                    match key {
                        Expression::String(key) => assert_eq!(key, expected_key),
                        expr => panic!("expected string key but got {}", expr),
                    }
                    test_integer_literal(value, expected_value);
                }
            }
            expr => panic!("expected hash literal but got {}", expr),
        }
    }

    #[test]
    fn hash_literal_with_expressions() {
        let input = "{\"one\": 0 + 1, \"two\": 10 - 8, \"three\": 15 / 5}";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::Hash(hash) => {
                let expected = vec![("one", "(0 + 1)"), ("two", "(10 - 8)"), ("three", "(15 / 5)")];

                assert_eq!(hash.pairs.len(), expected.len());
                for ((key, value), (expected_key, expected_value)) in
                    hash.pairs.iter().zip(expected)
                {
                    assert_eq!(key.to_string(), format!("\"{}\"", expected_key));
                    assert_eq!(value.to_string(), expected_value);
                }
            }
            expr => panic!("expected hash literal but got {}", expr),
        }
    }

    #[test]
    fn empty_hash_literal() {
        let input = "{}";

        let prog = setup(input, 1);
        let expr = unwrap_expression(&prog);

        match expr {
            Expression::Hash(hash) => assert!(hash.pairs.is_empty()),
            expr => panic!("expected hash literal but got {}", expr),
        }
    }

    #[test]
    fn expect_peek_error_message() {
        let input = "let x 5;";
        let errors = setup_errors(input);

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be =, got 5 instead"
        );
    }

    #[test]
    fn missing_prefix_fn_error_message() {
        let input = "let x = < 5;";
        let errors = setup_errors(input);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "no prefix parse function for < found");
    }

    #[test]
    fn integer_out_of_range_error_message() {
        let input = "92233720368547758089";
        let errors = setup_errors(input);

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "could not parse 92233720368547758089 as integer"
        );
    }

    #[test]
    fn recovers_after_bad_statement() {
        let input = "let x 5; let y = 10;";
        let l = Lexer::new(input);
        let mut p = Parser::new(l);

        match p.parse_program() {
            Err(errors) => {
                assert_eq!(errors.len(), 1, "expected 1 error but got {:?}", errors);
            }
            Ok(prog) => panic!("expected errors but got {}", prog),
        }
    }

    #[test]
    fn block_eof_handling() {
        let input = "if (x) { 5 ";
        let errors = setup_errors(input);

        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ParseError::Expected(expected, got) => {
                assert_eq!(expected, "}");
                assert_eq!(*got, Token::Eof);
            }
            err => panic!("expected \"expected }}\" parser error but got {:?}", err),
        }
    }

    fn setup(input: &str, stmt_count: usize) -> Program {
        let l = Lexer::new(input);
        let mut p = Parser::new(l);
        let prog = p.parse_program();

        match prog {
            Ok(prog) => {
                if stmt_count != 0 && prog.statements.len() != stmt_count {
                    panic!(
                        "expected {} statement(s) for '{}' but got {:?}",
                        stmt_count, input, prog.statements
                    )
                }

                prog
            }
            Err(errors) => {
                println!("parser had {} errors", errors.len());
                for error in errors {
                    println!("parser error: {}", error);
                }
                panic!("parser errors")
            }
        }
    }

    fn setup_errors(input: &str) -> Vec<ParseError> {
        let l = Lexer::new(input);
        let mut p = Parser::new(l);

        match p.parse_program() {
            Err(errors) => errors,
            Ok(prog) => panic!("expected parse errors for '{}' but got {}", input, prog),
        }
    }

    fn unwrap_expression(prog: &Program) -> &Expression {
        match prog.statements.first().unwrap() {
            Statement::Expression { expression } => expression,
            stmt => panic!("{:?} isn't an expression statement", stmt),
        }
    }

    fn test_identifier(expr: &Expression, expected_value: &str) {
        match expr {
            Expression::Identifier(ident) => {
                test_identifier_literal(ident, expected_value);
            }
            _ => panic!("expected identifier {} but got {}", expected_value, expr),
        }
    }

    fn test_identifier_literal(ident: &IdentifierLiteral, expected_value: &str) {
        assert_eq!(
            expected_value, ident.name,
            "expected identifier with name {} but got {}",
            expected_value, ident.name
        );
    }

    fn test_integer_literal(expr: &Expression, expected_value: i64) {
        match expr {
            Expression::Integer(num) => {
                assert_eq!(
                    expected_value, *num,
                    "expected {} but got {}",
                    expected_value, num
                )
            }
            _ => panic!(
                "expected integer literal {} but got {}",
                expected_value, expr
            ),
        }
    }

    fn test_boolean_literal(expr: &Expression, expected_value: bool) {
        match expr {
            Expression::Boolean(value) => {
                assert_eq!(
                    expected_value, *value,
                    "expected {} but got {}",
                    expected_value, value
                )
            }
            _ => panic!(
                "expected boolean literal {} but got {}",
                expected_value, expr
            ),
        }
    }

    fn test_if_condition(
        expr: &Expression,
        expected_left_ident: &str,
        expected_operator: Token,
        expected_right_ident: &str,
    ) {
        match expr {
            Expression::Infix(infix) => {
                test_identifier(&infix.left, expected_left_ident);

                if infix.operator != expected_operator {
                    panic!(
                        "expected {} operator but got {}",
                        expected_operator, infix.operator
                    );
                }

                test_identifier(&infix.right, expected_right_ident);
            }
            expr => panic!("expected infix expression (condition) but got {}", expr),
        }
    }
}
