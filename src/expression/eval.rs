// expression/eval.rs
// Name resolution against the allow-list and the tree-walking evaluator

use std::collections::{BTreeMap, HashMap, HashSet};

use super::parser::{BinaryOp, Node, UnaryOp};
use super::ExpressionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Function {
    Abs,
    Acos,
    Asin,
    Atan,
    Atan2,
    Ceil,
    Cos,
    Exp,
    Floor,
    Log,
    Max,
    Min,
    Pow,
    Round,
    Sign,
    Sin,
    Sqrt,
    Tan,
    Clamp,
}

enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Function {
    fn lookup(name: &str) -> Option<Function> {
        let bare = name.strip_prefix("Math.").unwrap_or(name);
        let f = match bare {
            "abs" => Function::Abs,
            "acos" => Function::Acos,
            "asin" => Function::Asin,
            "atan" => Function::Atan,
            "atan2" => Function::Atan2,
            "ceil" => Function::Ceil,
            "cos" => Function::Cos,
            "exp" => Function::Exp,
            "floor" => Function::Floor,
            "log" => Function::Log,
            "max" => Function::Max,
            "min" => Function::Min,
            "pow" => Function::Pow,
            "round" => Function::Round,
            "sign" => Function::Sign,
            "sin" => Function::Sin,
            "sqrt" => Function::Sqrt,
            "tan" => Function::Tan,
            "clamp" => Function::Clamp,
            _ => return None,
        };
        Some(f)
    }

    fn arity(self) -> Arity {
        match self {
            Function::Atan2 | Function::Pow => Arity::Exactly(2),
            Function::Clamp => Arity::Exactly(3),
            Function::Max | Function::Min => Arity::AtLeast(1),
            _ => Arity::Exactly(1),
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        let a = args.first().copied().unwrap_or(0.0);
        let b = args.get(1).copied().unwrap_or(0.0);
        match self {
            Function::Abs => a.abs(),
            Function::Acos => a.acos(),
            Function::Asin => a.asin(),
            Function::Atan => a.atan(),
            Function::Atan2 => a.atan2(b),
            Function::Ceil => a.ceil(),
            Function::Cos => a.cos(),
            Function::Exp => a.exp(),
            Function::Floor => a.floor(),
            Function::Log => a.ln(),
            Function::Max => args.iter().copied().fold(f64::NEG_INFINITY, js_max),
            Function::Min => args.iter().copied().fold(f64::INFINITY, js_min),
            Function::Pow => a.powf(b),
            // Half-way values round towards +infinity.
            Function::Round => (a + 0.5).floor(),
            Function::Sign => {
                if a > 0.0 {
                    1.0
                } else if a < 0.0 {
                    -1.0
                } else {
                    a
                }
            }
            Function::Sin => a.sin(),
            Function::Sqrt => a.sqrt(),
            Function::Tan => a.tan(),
            Function::Clamp => {
                let hi = args.get(2).copied().unwrap_or(0.0);
                js_min(js_max(a, b), hi)
            }
        }
    }
}

// NaN-propagating min/max.
fn js_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn js_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" | "PI" | "Math.pi" | "Math.PI" => Some(std::f64::consts::PI),
        "e" | "E" | "Math.e" | "Math.E" => Some(std::f64::consts::E),
        "tau" | "TAU" | "Math.tau" | "Math.TAU" => Some(std::f64::consts::TAU),
        _ => None,
    }
}

/// Resolved expression tree. Every name in it is known to be allowed.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Expr {
    Const(f64),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `&&` (`true`) or `||` (`false`), short-circuiting.
    Logical(bool, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

/// Resolve identifiers and calls; rejects anything outside the allow-list.
pub(crate) fn resolve(node: Node, allowed: &HashSet<String>) -> Result<Expr, ExpressionError> {
    let expr = match node {
        Node::Number(value) => Expr::Const(value),
        Node::Ident { name, pos } => {
            if allowed.contains(&name) {
                Expr::Var(name)
            } else if let Some(value) = constant(&name) {
                Expr::Const(value)
            } else if Function::lookup(&name).is_some() {
                return Err(ExpressionError::new(
                    format!("Function \"{}\" must be called with ()", name),
                    pos,
                ));
            } else {
                return Err(ExpressionError::new(format!("Unknown identifier \"{}\"", name), pos));
            }
        }
        Node::Call { name, args, pos } => {
            let Some(function) = Function::lookup(&name) else {
                return Err(ExpressionError::new(format!("Unknown function \"{}\"", name), pos));
            };
            let arity_ok = match function.arity() {
                Arity::Exactly(n) => args.len() == n,
                Arity::AtLeast(n) => args.len() >= n,
            };
            if !arity_ok {
                let expected = match function.arity() {
                    Arity::Exactly(n) => n.to_string(),
                    Arity::AtLeast(n) => format!("at least {}", n),
                };
                return Err(ExpressionError::new(
                    format!("Function \"{}\" expects {} argument(s)", name, expected),
                    pos,
                ));
            }
            let args = args
                .into_iter()
                .map(|arg| resolve(arg, allowed))
                .collect::<Result<Vec<_>, _>>()?;
            Expr::Call(function, args)
        }
        Node::Unary(op, operand) => Expr::Unary(op, Box::new(resolve(*operand, allowed)?)),
        Node::Binary(op, left, right) => {
            let left = Box::new(resolve(*left, allowed)?);
            let right = Box::new(resolve(*right, allowed)?);
            match op {
                BinaryOp::And => Expr::Logical(true, left, right),
                BinaryOp::Or => Expr::Logical(false, left, right),
                _ => Expr::Binary(op, left, right),
            }
        }
        Node::Conditional(test, consequent, alternate) => Expr::Conditional(
            Box::new(resolve(*test, allowed)?),
            Box::new(resolve(*consequent, allowed)?),
            Box::new(resolve(*alternate, allowed)?),
        ),
    };
    Ok(expr)
}

/// Source of variable values during evaluation.
pub trait Bindings {
    fn value(&self, name: &str) -> Option<f64>;
}

impl Bindings for HashMap<String, f64> {
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Bindings for BTreeMap<String, f64> {
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Bindings for [(&str, f64)] {
    fn value(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

/// Scene variables plus the simulation time `t`.
pub struct TimeBindings<'a> {
    pub t: f64,
    pub variables: &'a BTreeMap<String, f64>,
}

impl Bindings for TimeBindings<'_> {
    fn value(&self, name: &str) -> Option<f64> {
        if name == "t" {
            Some(self.t)
        } else {
            self.variables.get(name).copied()
        }
    }
}

// NaN counts as true: only an exact zero is false.
fn truthy(v: f64) -> bool {
    v != 0.0
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl Expr {
    pub(crate) fn eval<B: Bindings + ?Sized>(&self, bindings: &B) -> f64 {
        match self {
            Expr::Const(v) => *v,
            Expr::Var(name) => bindings.value(name).unwrap_or(0.0),
            Expr::Unary(op, operand) => {
                let v = operand.eval(bindings);
                match op {
                    UnaryOp::Plus => v,
                    UnaryOp::Minus => -v,
                    UnaryOp::Not => flag(!truthy(v)),
                }
            }
            Expr::Logical(is_and, left, right) => {
                let l = left.eval(bindings);
                if truthy(l) == *is_and {
                    right.eval(bindings)
                } else {
                    l
                }
            }
            Expr::Binary(op, left, right) => {
                let l = left.eval(bindings);
                let r = right.eval(bindings);
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Rem => l % r,
                    BinaryOp::Pow => l.powf(r),
                    BinaryOp::Lt => flag(l < r),
                    BinaryOp::Le => flag(l <= r),
                    BinaryOp::Gt => flag(l > r),
                    BinaryOp::Ge => flag(l >= r),
                    BinaryOp::Eq => flag(l == r),
                    BinaryOp::Ne => flag(l != r),
                    // resolve() lowers these to Expr::Logical
                    BinaryOp::And => flag(truthy(l) && truthy(r)),
                    BinaryOp::Or => flag(truthy(l) || truthy(r)),
                }
            }
            Expr::Conditional(test, consequent, alternate) => {
                if truthy(test.eval(bindings)) {
                    consequent.eval(bindings)
                } else {
                    alternate.eval(bindings)
                }
            }
            Expr::Call(function, args) => {
                let values: smallvec::SmallVec<[f64; 4]> =
                    args.iter().map(|arg| arg.eval(bindings)).collect();
                function.apply(&values)
            }
        }
    }
}
