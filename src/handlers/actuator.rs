//! 운영 엔드포인트 핸들러
//!
//! 레지스트리의 `healthCheckUrl` / `statusPageUrl`이 가리키는 엔드포인트입니다.

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use serde_json::json;

use crate::config::ApplicationConfig;
use crate::core::errors::AppError;
use crate::core::lifecycle::{ApplicationState, LifecycleState};

/// 핸들러가 공유하는 서비스 식별 정보
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub version: String,
    pub profile: String,
    pub discovery_enabled: bool,
}

impl ServiceDescriptor {
    pub fn from_config(config: &ApplicationConfig) -> Self {
        Self {
            name: config.application_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            profile: config.profile.clone(),
            discovery_enabled: config.discovery.enabled,
        }
    }
}

/// 서비스 상태 확인
///
/// `Running` 상태일 때만 `200 UP`, 그 외에는 `503 DOWN`을 반환합니다.
///
/// # Examples
///
/// ```bash
/// curl http://localhost:8080/actuator/health
/// ```
///
/// Response:
/// ```json
/// {
///   "status": "UP",
///   "service": "commande-service",
///   "version": "0.1.0",
///   "state": "RUNNING",
///   "timestamp": "2026-01-01T00:00:00Z",
///   "components": {
///     "discoveryClient": {
///       "status": "UP",
///       "registered": true,
///       "instanceId": "host:commande-service:8080"
///     }
///   }
/// }
/// ```
pub async fn health(
    state: web::Data<ApplicationState>,
    service: web::Data<ServiceDescriptor>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.snapshot()?;
    let up = snapshot.state == LifecycleState::Running;

    let discovery_status = match (service.discovery_enabled, snapshot.registered) {
        (false, _) => "UNKNOWN",
        (true, true) => "UP",
        (true, false) => "DOWN",
    };

    let body = json!({
        "status": if up { "UP" } else { "DOWN" },
        "service": service.name,
        "version": service.version,
        "state": snapshot.state,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "components": {
            "discoveryClient": {
                "status": discovery_status,
                "registered": snapshot.registered,
                "instanceId": snapshot.instance_id,
            }
        }
    });

    if up {
        Ok(HttpResponse::Ok().json(body))
    } else {
        Ok(HttpResponse::ServiceUnavailable().json(body))
    }
}

/// 서비스 정보 조회
#[get("/actuator/info")]
pub async fn info(
    state: web::Data<ApplicationState>,
    service: web::Data<ServiceDescriptor>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.snapshot()?;

    Ok(HttpResponse::Ok().json(json!({
        "app": {
            "name": service.name,
            "version": service.version,
        },
        "profile": service.profile,
        "instanceId": snapshot.instance_id,
        "startedAt": snapshot.started_at.to_rfc3339(),
    })))
}
