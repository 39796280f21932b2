//! Safe expression engine.
//!
//! Formulas in imported scenes (capacitor sources, particle velocity
//! overrides) are compiled here. Compilation tokenizes, parses, then resolves
//! every identifier and call against an explicit allow-list, so a
//! [`CompiledExpression`] can only ever do arithmetic over known names.
//!
//! ```text
//! compile("t > 0 ? 1 : -1", &[])?.evaluate_at(1.0, &vars) == 1.0
//! ```

mod eval;
mod lexer;
mod parser;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub use eval::{Bindings, TimeBindings};

use eval::Expr;
use parser::Parser;

/// Compile failure with the character position of the offending token.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct ExpressionError {
    pub message: String,
    pub position: usize,
}

impl ExpressionError {
    pub(crate) fn new(message: impl Into<String>, position: usize) -> Self {
        Self { message: message.into(), position }
    }
}

/// Name every expression may use without declaring it.
pub const TIME_VARIABLE: &str = "t";

/// A validated expression ready for evaluation.
#[derive(Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    expr: Expr,
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledExpression").field(&self.source).finish()
    }
}

impl CompiledExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate with the given bindings. Unbound variables read as 0 and a
    /// non-finite result is reported as 0.
    pub fn evaluate<B: Bindings + ?Sized>(&self, bindings: &B) -> f64 {
        let value = self.expr.eval(bindings);
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    /// Evaluate at simulation time `t` with scene variables in scope.
    pub fn evaluate_at(&self, t: f64, variables: &BTreeMap<String, f64>) -> f64 {
        self.evaluate(&TimeBindings { t, variables })
    }
}

/// Compile `source`, allowing `t` plus the given variable names.
///
/// Names that are not plain identifiers are ignored. An empty source compiles
/// to the constant 0.
pub fn compile<S: AsRef<str>>(
    source: &str,
    allowed_variables: &[S],
) -> Result<CompiledExpression, ExpressionError> {
    let mut allowed: HashSet<String> = allowed_variables
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| lexer::is_plain_identifier(name))
        .map(str::to_string)
        .collect();
    allowed.insert(TIME_VARIABLE.to_string());

    if source.trim().is_empty() {
        return Ok(CompiledExpression { source: source.to_string(), expr: Expr::Const(0.0) });
    }

    let tokens = lexer::tokenize(source)?;
    let tree = Parser::new(tokens).parse()?;
    let expr = eval::resolve(tree, &allowed)?;
    Ok(CompiledExpression { source: source.to_string(), expr })
}

/// True when `name` can be used as a scene variable.
pub fn is_valid_variable_name(name: &str) -> bool {
    lexer::is_plain_identifier(name)
        && !matches!(name, "__proto__" | "prototype" | "constructor")
}
