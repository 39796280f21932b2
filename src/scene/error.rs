// scene/error.rs

use thiserror::Error;

use crate::expression::ExpressionError;
use crate::objects::ObjectId;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scene data: {0}")]
    Validation(String),
    #[error("object #{index} ({kind}) is invalid: {reason}")]
    InvalidObject { index: usize, kind: String, reason: String },
    #[error("unknown object type \"{0}\"")]
    UnknownObjectType(String),
    #[error("invalid variable \"{name}\": {reason}")]
    InvalidVariable { name: String, reason: String },
    #[error("no object with id {0:?}")]
    NotFound(ObjectId),
    #[error(transparent)]
    Expression(#[from] ExpressionError),
}
