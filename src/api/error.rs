use crate::application::lending::{LendingError, StatusClass};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
/// ステータスの分類はアプリケーション層が決め、ここではHTTPステータスに写すだけ。
#[derive(Debug)]
pub struct ApiError(LendingError);

impl From<LendingError> for ApiError {
    fn from(err: LendingError) -> Self {
        ApiError(err)
    }
}

fn status_code(class: StatusClass) -> StatusCode {
    match class {
        StatusClass::BadRequest => StatusCode::BAD_REQUEST,
        StatusClass::NotFound => StatusCode::NOT_FOUND,
        StatusClass::Conflict => StatusCode::CONFLICT,
        StatusClass::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_code(err.status_class());

        match &err {
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LendingError::Internal { operation, source } => {
                tracing::error!(operation, error = %source, "store failure");
            }
            _ => {
                tracing::warn!(kind = err.kind().code(), "{}", err);
            }
        }

        let body = Json(ErrorResponse::new(err.kind().code(), err.message()));
        (status, body).into_response()
    }
}
