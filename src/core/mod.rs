//! # Core Module
//!
//! 서비스 전역에서 쓰이는 핵심 타입을 제공합니다.
//!
//! ## 모듈 구성
//!
//! ### [`errors`] - 통합 에러 처리
//! - **AppError**: 설정, 바인딩, 디스커버리, 라이프사이클 에러
//! - **HTTP 통합**: Actix-Web `ResponseError` 구현
//! - **ErrorContext**: 외부 에러에 컨텍스트를 붙여 `AppError`로 변환
//!
//! ### [`lifecycle`] - 라이프사이클 상태
//! - **LifecycleState**: `Starting` / `Running` / `Stopped` / `Failed`
//! - **ApplicationState**: 워커 스레드 간 공유되는 상태 홀더
//!
//! ## Spring Boot와의 비교
//!
//! | Spring Boot | 이 모듈 |
//! |-------------|---------|
//! | `ApplicationFailedEvent` | `AppError` + `LifecycleState::Failed` |
//! | `ApplicationReadyEvent` | `LifecycleState::Running` |
//! | `ContextClosedEvent` | `LifecycleState::Stopped` |
//! | `@ExceptionHandler` | `AppError::error_response()` |

pub mod errors;
pub mod lifecycle;

pub use errors::{AppError, AppResult, ErrorContext};
pub use lifecycle::{ApplicationState, LifecycleState, StateSnapshot};
