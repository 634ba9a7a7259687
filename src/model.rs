use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::store::{DataService, StoreError};

/// A customer of the store, as persisted and as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Customer {
    pub id:   i32,
    pub name: String,
}

/// The request body accepted by create and update, before validation.
///
/// Fields are optional so that a missing name can be reported as an invalid
/// model rather than a parse failure.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CustomerPayload {
    #[serde(default, alias = "Id")]
    pub id:   i32,
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
}

impl CustomerPayload {
    /// Check the field constraints and produce the customer to store.
    pub fn validate(self) -> Result<Customer, Error> {
        match self.name {
            Some(name) if !name.trim().is_empty() => Ok(Customer { id: self.id, name }),
            Some(_) => Err(Error::InvalidModel("the name must not be empty".into())),
            None => Err(Error::InvalidModel("the name is required".into())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unable to parse request: {0}")]
    InvalidRequest(#[from] JsonRejection),
    #[error("Unable to parse path: {0}")]
    InvalidPath(#[from] PathRejection),
    #[error("Customer object is null.")]
    NullPayload,
    #[error("Invalid model object: {0}.")]
    InvalidModel(String),
    #[error("Customer not found.")]
    NotFound,
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::InvalidRequest(e) => {
                tracing::warn!("Invalid request. Failed to parse customer: {e}");
                // 400 for bad json, 415 when the content type is not json.
                (e.status(), axum::Json(format!("Invalid customer format: {e}"))).into_response()
            }
            Error::InvalidPath(e) => {
                tracing::warn!("Invalid request. Failed to parse path: {e}");
                (
                    StatusCode::BAD_REQUEST,
                    axum::Json(format!("Invalid path: {e}")),
                )
                    .into_response()
            }
            Error::NullPayload => {
                tracing::warn!("Invalid request. Customer object is null.");
                (
                    StatusCode::BAD_REQUEST,
                    axum::Json("Customer object is null".to_string()),
                )
                    .into_response()
            }
            Error::InvalidModel(reason) => {
                tracing::warn!("Invalid request. Invalid model object: {reason}");
                (
                    StatusCode::BAD_REQUEST,
                    axum::Json(format!("Invalid model object: {reason}")),
                )
                    .into_response()
            }
            Error::NotFound => StatusCode::NOT_FOUND.into_response(),
            Error::Storage(e) => {
                tracing::error!("Customer store failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json("Internal error.".to_string()),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Clone)]
pub struct State {
    pub store: Arc<dyn DataService>,
}
