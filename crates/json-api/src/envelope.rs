//! Response envelope

use salvo::{
    http::StatusCode,
    prelude::{Json, Response},
};
use serde::{Deserialize, Serialize};

/// Uniform body of every cart response.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Failure code and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: u16,
    pub message: String,
}

impl<T> Envelope<T> {
    pub(crate) fn success(data: T) -> Self {
        Self {
            status: true,
            data: Some(data),
            error: None,
        }
    }

    pub(crate) fn failure(error: ErrorBody) -> Self {
        Self {
            status: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Render `data` as a successful envelope.
pub(crate) fn render_success<T>(res: &mut Response, data: T)
where
    T: Serialize + Send,
{
    res.status_code(StatusCode::OK);
    res.render(Json(Envelope::success(data)));
}

/// Render a failure envelope with the given HTTP status.
pub(crate) fn render_failure(res: &mut Response, status: StatusCode, error: ErrorBody) {
    res.status_code(status);
    res.render(Json(Envelope::<()>::failure(error)));
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn success_omits_the_error() -> TestResult {
        let body = serde_json::to_value(Envelope::success(json!({ "cart_items_count": 1 })))?;

        assert_eq!(body, json!({ "status": true, "data": { "cart_items_count": 1 } }));

        Ok(())
    }

    #[test]
    fn failure_omits_the_data() -> TestResult {
        let body = serde_json::to_value(Envelope::<()>::failure(ErrorBody {
            code: 1002,
            message: "cart is empty".to_string(),
        }))?;

        assert_eq!(
            body,
            json!({ "status": false, "error": { "code": 1002, "message": "cart is empty" } })
        );

        Ok(())
    }
}
