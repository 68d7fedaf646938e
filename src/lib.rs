//! 주문 서비스(commande-service) 부트스트랩
//!
//! 주문 서비스 프로세스를 시작하고, 서비스 레지스트리(Eureka)에 등록하고,
//! 종료 신호가 올 때까지 실행하는 진입 계층입니다.
//! 주문 도메인 로직은 이 크레이트의 범위가 아닙니다.
//!
//! # Features
//!
//! - **설정**: 시작 인자, 환경 변수, 프로파일별 `.env` 파일 (relaxed binding)
//! - **HTTP 런타임**: actix-web 서버, Rate Limiting, CORS, 요청 로깅
//! - **서비스 디스커버리**: 등록, lease 갱신(하트비트), 종료 시 등록 해제
//! - **운영 엔드포인트**: `/actuator/health`, `/actuator/info`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │      main       │ ← .env 로드, 로깅, 종료 코드
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   Application   │ ← Starting → Running → Stopped / Failed
//! └─────────────────┘
//!     │         │
//!     ▼         ▼
//! ┌────────┐ ┌───────────┐
//! │ Routes │ │ Discovery │ ← Eureka REST API
//! └────────┘ └───────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use commande_service::application::CommandeServiceApplication;
//!
//! // --server.port=9090 --eureka.client.service-url.default-zone=http://eureka:8761/eureka/
//! CommandeServiceApplication::run(std::env::args().skip(1)).await?;
//! ```

pub mod application;
pub mod config;
pub mod core;
pub mod discovery;
pub mod handlers;
pub mod routes;
pub mod utils;
