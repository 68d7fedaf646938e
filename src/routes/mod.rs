//! API 라우트 설정 모듈
//!
//! 운영 엔드포인트를 애플리케이션에 등록합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use actix_web::{web, App};
//!
//! let app = App::new()
//!     .app_data(web::Data::new(state))
//!     .app_data(web::Data::new(descriptor))
//!     .configure(configure_all_routes);
//! ```

use actix_web::web;

use crate::handlers;

/// 모든 라우트를 설정합니다
///
/// 핸들러는 `web::Data<ApplicationState>`와 `web::Data<ServiceDescriptor>`를
/// 사용하므로 호출 측에서 `app_data`로 등록해 두어야 합니다.
///
/// # Available Routes
///
/// - `GET /actuator/health` - 헬스 체크 (레지스트리 `healthCheckUrl`)
/// - `GET /health` - 헬스 체크 별칭
/// - `GET /actuator/info` - 서비스 정보 (레지스트리 `statusPageUrl`)
///
/// # Examples
///
/// ```bash
/// curl http://localhost:8080/actuator/health
/// curl http://localhost:8080/actuator/info
/// ```
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(["/actuator/health", "/health"]).route(web::get().to(handlers::actuator::health)),
    );
    cfg.service(handlers::actuator::info);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApplicationConfig, PropertySource};
    use crate::core::lifecycle::{ApplicationState, LifecycleState};
    use crate::handlers::actuator::ServiceDescriptor;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use std::collections::HashMap;

    fn descriptor(discovery_enabled: bool) -> ServiceDescriptor {
        let flag = format!("--eureka.client.enabled={}", discovery_enabled);
        let props = PropertySource::new(PropertySource::parse_args([flag]).unwrap(), HashMap::new());
        ServiceDescriptor::from_config(&ApplicationConfig::from_properties(&props).unwrap())
    }

    #[actix_web::test]
    async fn test_health_is_down_while_starting() {
        let state = ApplicationState::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(web::Data::new(descriptor(true)))
                .configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/actuator/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "DOWN");
        assert_eq!(body["state"], "STARTING");
        assert_eq!(body["components"]["discoveryClient"]["status"], "DOWN");
    }

    #[actix_web::test]
    async fn test_health_is_up_when_running_and_registered() {
        let state = ApplicationState::new();
        state.set_registration(Some("h:commande-service:8080".to_string()), true).unwrap();
        state.transition(LifecycleState::Running).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(web::Data::new(descriptor(true)))
                .configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "UP");
        assert_eq!(body["service"], "commande-service");
        assert_eq!(body["components"]["discoveryClient"]["instanceId"], "h:commande-service:8080");
    }

    #[actix_web::test]
    async fn test_health_reports_unknown_discovery_when_disabled() {
        let state = ApplicationState::new();
        state.transition(LifecycleState::Running).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(descriptor(false)))
                .configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/actuator/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "UP");
        assert_eq!(body["components"]["discoveryClient"]["status"], "UNKNOWN");
    }

    #[actix_web::test]
    async fn test_info_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ApplicationState::new()))
                .app_data(web::Data::new(descriptor(true)))
                .configure(configure_all_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/actuator/info").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["app"]["name"], "commande-service");
        assert_eq!(body["app"]["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["profile"], "dev");
    }
}
