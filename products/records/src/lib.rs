//! Records vertical slice.
//!
//! Every screen of the desk is a [`TableSpec`]: a declarative field list from
//! which the insert/update/delete/select statements are generated and rows
//! are decoded. [`CrudApi`] is the seam the generic view binds to.

pub mod api;
pub mod cell;
pub mod draft;
pub mod fixtures;
pub mod repo;
pub mod spec;
pub mod sql;
pub mod tables;

use platform_api::ApiError;
use sea_orm::DbErr;
use thiserror::Error;

pub use api::{CrudApi, PersonnelQuery, RewardQuery, TableApi};
pub use cell::{Cell, Row};
pub use draft::Draft;
pub use spec::{FieldKind, FieldSpec, TableSpec};
pub use sql::Filter;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("field {0} is required")]
    MissingField(&'static str),
    #[error("field {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("could not build statement: {0}")]
    Statement(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type RecordResult<T> = Result<T, RecordError>;

impl From<RecordError> for ApiError {
    fn from(value: RecordError) -> Self {
        match value {
            RecordError::MissingField(_) | RecordError::InvalidValue { .. } => {
                ApiError::invalid(value.to_string())
            }
            RecordError::Statement(_) | RecordError::Db(_) => ApiError::operation(value),
        }
    }
}
