//! # HTTP Request Handlers Module
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 정의하는 모듈입니다.
//! 이 서비스는 부트스트랩 단계만 담당하므로 운영 엔드포인트만 제공합니다.
//!
//! ## 모듈 구성
//!
//! - **`actuator`**: 레지스트리와 로드밸런서가 호출하는 엔드포인트
//!   - 헬스 체크 (`GET /actuator/health`, `GET /health`)
//!   - 서비스 정보 (`GET /actuator/info`)
//!
//! ## Spring Boot Actuator와의 비교
//!
//! | Spring Boot | 이 모듈 |
//! |-------------|---------|
//! | `HealthEndpoint` | `actuator::health` |
//! | `InfoEndpoint` | `actuator::info` |
//! | `DiscoveryClientHealthIndicator` | `components.discoveryClient` |

pub mod actuator;
