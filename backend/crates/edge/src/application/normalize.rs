//! Error Normalizer
//!
//! Classifies the outcome of one downstream call:
//! 1. recognized client error → passed through with its status and message
//! 2. recognized infrastructure error → logged, generic 500
//! 3. unclassified failure → logged, generic 500
//! 4. success → passed through
//!
//! The text of classes 2 and 3 only ever reaches the log.

use axum::response::Response;
use kernel::error::report::{FailureClass, FailureReport};

use crate::error::{EdgeError, EdgeResult};

/// Normalize a downstream result
pub fn normalize<T, E>(outcome: Result<T, E>) -> EdgeResult<T>
where
    E: Into<EdgeError>,
{
    outcome.map_err(|err| {
        let err = err.into();
        err.log();
        err
    })
}

/// Classify a response produced by a downstream HTTP handler
///
/// Server-fault responses become failures carrying their out-of-band
/// [`FailureReport`]; everything else (success and client errors) passes
/// through untouched. A 5xx without a report is unclassified: its body may
/// have been built by hand and is never forwarded.
pub fn classify_response(response: Response) -> EdgeResult<Response> {
    let status = response.status();
    if !status.is_server_error() {
        return Ok(response);
    }

    Err(match response.extensions().get::<FailureReport>() {
        Some(FailureReport {
            class: FailureClass::Infrastructure,
            detail,
        }) => EdgeError::InfrastructureFailure(detail.clone()),
        Some(FailureReport {
            class: FailureClass::Unclassified,
            detail,
        }) => EdgeError::UnclassifiedFailure(detail.clone()),
        None => EdgeError::UnclassifiedFailure(format!(
            "downstream responded {status} without a failure report"
        )),
    })
}
