//! # Application Error Handling System
//!
//! 주문 서비스 부트스트랩 전 과정에서 사용하는 통합 에러 타입입니다.
//! 설정 로딩, 리스너 바인딩, 서비스 레지스트리 통신, 라이프사이클 전이에서
//! 발생하는 실패를 하나의 열거형으로 모아 `main`까지 `?`로 전파합니다.
//!
//! ## 에러 분류
//!
//! | AppError | 발생 지점 | HTTP Status |
//! |----------|-----------|-------------|
//! | `ConfigurationError` | 설정 키 누락/파싱 실패 | 500 |
//! | `BindError` | 포트 사용 중, 주소 바인딩 실패 | 500 |
//! | `DiscoveryError` | 레지스트리 연결 불가, 등록 거부 | 503 |
//! | `LifecycleError` | 허용되지 않은 상태 전이 | 500 |
//! | `InternalError` | 예상치 못한 내부 오류 | 500 |
//!
//! 시작 단계의 에러는 모두 `main`에서 로그로 남긴 뒤 0이 아닌 종료 코드로
//! 프로세스를 끝냅니다.
//!
//! ## 사용 패턴
//!
//! ```rust,ignore
//! use crate::core::errors::{AppError, AppResult};
//!
//! fn parse_port(raw: &str) -> AppResult<u16> {
//!     raw.parse::<u16>().map_err(|e| AppError::ConfigurationError(
//!         format!("server.port 값이 올바르지 않습니다 ({}): {}", raw, e)
//!     ))
//! }
//! ```

use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// `thiserror`로 `Error` trait을 구현하고, 액추에이터 핸들러에서 그대로 반환할 수
/// 있도록 `actix_web::ResponseError`도 구현합니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 설정 에러
    ///
    /// 필수 설정 누락, 숫자/불리언/URL 파싱 실패, 값 범위 위반 시 발생합니다.
    /// 메시지에는 항상 문제가 된 설정 키가 포함됩니다.
    ///
    /// # 예제
    /// ```rust,ignore
    /// return Err(AppError::ConfigurationError(
    ///     "server.workers 값은 1 이상이어야 합니다".to_string()
    /// ));
    /// ```
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// 리스너 바인딩 에러
    ///
    /// 포트가 이미 사용 중이거나 주소에 바인딩할 수 없을 때 발생합니다.
    #[error("Bind error: {0}")]
    BindError(String),

    /// 서비스 디스커버리 에러
    ///
    /// 레지스트리에 연결할 수 없거나 등록/갱신/해제 요청이 거부되었을 때 발생합니다.
    ///
    /// # 발생 시나리오
    /// - 모든 `defaultZone` URL이 응답하지 않음
    /// - 레지스트리가 4xx/5xx로 등록을 거부함
    /// - 재시도 횟수 소진
    #[error("Discovery error: {0}")]
    DiscoveryError(String),

    /// 라이프사이클 에러
    ///
    /// `Stopped`에서 `Running`으로 가는 것처럼 허용되지 않은 상태 전이를 시도했을 때 발생합니다.
    #[error("Lifecycle error: {0}")]
    LifecycleError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl actix_web::ResponseError for AppError {
    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 모든 에러 응답은 `{"error": "..."}` 형식을 따릅니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AppError::DiscoveryError(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        actix_web::HttpResponse::build(status)
            .json(serde_json::json!({
                "error": self.to_string()
            }))
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
///
/// # 예제
///
/// ```rust,ignore
/// use crate::core::errors::ErrorContext;
///
/// let result = join_handle.await.context("HTTP 서버 태스크 실패")?;
/// ```
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_discovery_error_response() {
        let error = AppError::DiscoveryError("registry unreachable".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_configuration_error_response() {
        let error = AppError::ConfigurationError("server.port".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_display_includes_category() {
        let error = AppError::BindError("0.0.0.0:8080 already in use".to_string());
        assert_eq!(error.to_string(), "Bind error: 0.0.0.0:8080 already in use");
    }

    #[test]
    fn test_error_context_trait() {
        let result: Result<(), &str> = Err("disk quota exceeded");
        let app_result = result.context("Additional context");

        assert!(app_result.is_err());
        if let Err(AppError::InternalError(msg)) = app_result {
            assert!(msg.contains("Additional context"));
            assert!(msg.contains("disk quota exceeded"));
        } else {
            panic!("Expected InternalError");
        }
    }
}
