// expression/parser.rs
// Precedence-climbing parser producing an unvalidated syntax tree

use super::lexer::{Token, TokenKind};
use super::ExpressionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Plus,
    Minus,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Syntax tree straight out of the parser; names are not resolved yet.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Number(f64),
    Ident { name: String, pos: usize },
    Call { name: String, args: Vec<Node>, pos: usize },
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Conditional(Box<Node>, Box<Node>, Box<Node>),
}

const UNARY_PRECEDENCE: u8 = 7;

/// Deepest syntax tree (and parser recursion) accepted from a source.
pub(crate) const MAX_DEPTH: usize = 256;

/// A node together with the height of the tree under it.
struct Parsed {
    node: Node,
    depth: usize,
}

impl Parsed {
    fn leaf(node: Node) -> Self {
        Self { node, depth: 1 }
    }
}

fn binary_op(op: &str) -> Option<(BinaryOp, u8)> {
    let entry = match op {
        "||" => (BinaryOp::Or, 1),
        "&&" => (BinaryOp::And, 2),
        "==" => (BinaryOp::Eq, 3),
        "!=" => (BinaryOp::Ne, 3),
        "<" => (BinaryOp::Lt, 4),
        "<=" => (BinaryOp::Le, 4),
        ">" => (BinaryOp::Gt, 4),
        ">=" => (BinaryOp::Ge, 4),
        "+" => (BinaryOp::Add, 5),
        "-" => (BinaryOp::Sub, 5),
        "*" => (BinaryOp::Mul, 6),
        "/" => (BinaryOp::Div, 6),
        "%" => (BinaryOp::Rem, 6),
        "**" => (BinaryOp::Pow, 8),
        _ => return None,
    };
    Some(entry)
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    index: usize,
    nesting: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0, nesting: 0 }
    }

    /// Parse the whole token stream as one expression.
    pub fn parse(mut self) -> Result<Node, ExpressionError> {
        let parsed = self.parse_expression(0)?;
        let tail = self.peek();
        if tail.kind != TokenKind::Eof {
            return Err(unexpected(tail));
        }
        Ok(parsed.node)
    }

    fn too_deep(&self) -> ExpressionError {
        ExpressionError::new("Expression is nested too deeply", self.peek().pos)
    }

    /// Wrap children into a parent node, enforcing the depth limit.
    fn branch(&self, node: Node, children: &[usize]) -> Result<Parsed, ExpressionError> {
        let depth = children.iter().copied().max().unwrap_or(0) + 1;
        if depth > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok(Parsed { node, depth })
    }

    fn peek(&self) -> &Token {
        // tokenize always terminates the stream with Eof
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn peek_op(&self) -> Option<&'static str> {
        match self.peek().kind {
            TokenKind::Op(op) => Some(op),
            _ => None,
        }
    }

    fn expect_op(&mut self, op: &'static str) -> Result<(), ExpressionError> {
        if self.peek_op() == Some(op) {
            self.advance();
            Ok(())
        } else {
            Err(ExpressionError::new(format!("Expected \"{}\"", op), self.peek().pos))
        }
    }

    fn parse_expression(&mut self, min_precedence: u8) -> Result<Parsed, ExpressionError> {
        if self.nesting >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.nesting += 1;
        let parsed = self.parse_operators(min_precedence);
        self.nesting -= 1;
        parsed
    }

    fn parse_operators(&mut self, min_precedence: u8) -> Result<Parsed, ExpressionError> {
        let mut left = self.parse_unary()?;

        loop {
            let Some(op) = self.peek_op() else { break };

            if op == "?" {
                if min_precedence > 0 {
                    break;
                }
                self.advance();
                let consequent = self.parse_expression(0)?;
                self.expect_op(":")?;
                let alternate = self.parse_expression(0)?;
                let depths = [left.depth, consequent.depth, alternate.depth];
                let node = Node::Conditional(
                    Box::new(left.node),
                    Box::new(consequent.node),
                    Box::new(alternate.node),
                );
                left = self.branch(node, &depths)?;
                continue;
            }

            let Some((binary, precedence)) = binary_op(op) else { break };
            if precedence < min_precedence {
                break;
            }
            self.advance();
            // `**` is right-associative
            let next_min = if binary == BinaryOp::Pow { precedence } else { precedence + 1 };
            let right = self.parse_expression(next_min)?;
            let depths = [left.depth, right.depth];
            left = self.branch(Node::Binary(binary, Box::new(left.node), Box::new(right.node)), &depths)?;
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Parsed, ExpressionError> {
        let unary = match self.peek_op() {
            Some("+") => Some(UnaryOp::Plus),
            Some("-") => Some(UnaryOp::Minus),
            Some("!") => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = unary {
            self.advance();
            let operand = self.parse_expression(UNARY_PRECEDENCE)?;
            return self.branch(Node::Unary(op, Box::new(operand.node)), &[operand.depth]);
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Parsed, ExpressionError> {
        let primary = self.parse_primary()?;
        if self.peek_op() != Some("(") {
            return Ok(primary);
        }
        let Node::Ident { name, pos } = primary.node else {
            return Err(ExpressionError::new(
                "Only simple function calls are allowed",
                self.peek().pos,
            ));
        };

        self.advance();
        let mut args = Vec::new();
        let mut depths = Vec::new();
        if self.peek_op() != Some(")") {
            loop {
                let arg = self.parse_expression(0)?;
                depths.push(arg.depth);
                args.push(arg.node);
                if self.peek_op() == Some(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect_op(")")?;

        if self.peek_op() == Some("(") {
            return Err(ExpressionError::new(
                "Only simple function calls are allowed",
                self.peek().pos,
            ));
        }
        self.branch(Node::Call { name, args, pos }, &depths)
    }

    fn parse_primary(&mut self) -> Result<Parsed, ExpressionError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(value) => Ok(Parsed::leaf(Node::Number(value))),
            TokenKind::Ident(name) => Ok(Parsed::leaf(Node::Ident { name, pos: token.pos })),
            TokenKind::Op("(") => {
                let inner = self.parse_expression(0)?;
                self.expect_op(")")?;
                Ok(inner)
            }
            _ => Err(unexpected(&token)),
        }
    }
}

fn unexpected(token: &Token) -> ExpressionError {
    ExpressionError::new(format!("Unexpected token \"{}\"", token.describe()), token.pos)
}
