//! # Eureka REST 클라이언트
//!
//! Netflix Eureka 서버의 REST API(v2)로 인스턴스를 등록, 갱신, 해제하고
//! 다른 서비스의 인스턴스를 조회합니다.
//!
//! ## 사용하는 엔드포인트
//!
//! | 용도 | 메서드 | 경로 | 성공 응답 |
//! |------|--------|------|-----------|
//! | **등록** | POST | `apps/{APP}` | 204 |
//! | **하트비트** | PUT | `apps/{APP}/{instanceId}?status=UP&lastDirtyTimestamp=..` | 200 (404 = 재등록 필요) |
//! | **해제** | DELETE | `apps/{APP}/{instanceId}` | 200 |
//! | **조회** | GET | `apps/{APP}` | 200 |
//!
//! ## 다중 레지스트리
//!
//! `defaultZone`에 여러 URL을 지정하면 앞에서부터 차례로 시도하고,
//! HTTP 응답을 돌려준 첫 번째 레지스트리의 결과를 사용합니다.
//! 모든 레지스트리가 연결에 실패하면 `AppError::DiscoveryError`를 반환합니다.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Response, StatusCode, Url};

use crate::config::DiscoveryConfig;
use crate::core::errors::{AppError, AppResult};
use crate::discovery::instance::{ApplicationEnvelope, InstanceEnvelope, InstanceInfo};
use crate::discovery::{DiscoveryClient, RenewOutcome};

/// Eureka 레지스트리 HTTP 클라이언트
pub struct EurekaClient {
    http: reqwest::Client,
    service_urls: Vec<Url>,
}

impl EurekaClient {
    /// 디스커버리 설정으로 클라이언트를 생성합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigurationError` - 레지스트리 URL이 없는 경우
    /// * `AppError::InternalError` - HTTP 클라이언트 생성 실패
    pub fn new(config: &DiscoveryConfig) -> AppResult<Self> {
        if config.service_urls.is_empty() {
            return Err(AppError::ConfigurationError(
                "레지스트리 URL이 하나 이상 필요합니다".to_string(),
            ));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::InternalError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            http,
            service_urls: config.service_urls.clone(),
        })
    }

    /// `{zone}apps/{APP}[/{instanceId}]` URL을 만듭니다.
    fn apps_url(base: &Url, app: &str, instance_id: Option<&str>) -> AppResult<Url> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::ConfigurationError(format!("레지스트리 URL이 올바르지 않습니다: {}", base)))?;
            segments.pop_if_empty().push("apps").push(&app.to_uppercase());
            if let Some(id) = instance_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// 레지스트리 목록을 순서대로 시도해 첫 번째 HTTP 응답을 반환합니다.
    async fn send_to_zones<F>(&self, operation: &str, build: F) -> AppResult<Response>
    where
        F: Fn(&Url) -> AppResult<reqwest::RequestBuilder>,
    {
        let mut last_error = String::new();

        for zone in &self.service_urls {
            match build(zone)?.send().await {
                Ok(response) => {
                    debug!("{} → {} ({})", operation, zone, response.status());
                    return Ok(response);
                }
                Err(e) => {
                    warn!("⚠️ 레지스트리 {} 연결 실패 ({}): {}", zone, operation, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(AppError::DiscoveryError(format!(
            "{} 실패: 모든 레지스트리에 연결할 수 없습니다 ({})",
            operation, last_error
        )))
    }

    async fn rejection(operation: &str, response: Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        AppError::DiscoveryError(format!("{} 거부됨 ({}): {}", operation, status, body))
    }
}

#[async_trait]
impl DiscoveryClient for EurekaClient {
    fn description(&self) -> String {
        let zones: Vec<&str> = self.service_urls.iter().map(Url::as_str).collect();
        format!("eureka[{}]", zones.join(", "))
    }

    async fn register(&self, instance: &InstanceInfo) -> AppResult<()> {
        let body = InstanceEnvelope { instance };
        let response = self
            .send_to_zones("인스턴스 등록", |zone| {
                Ok(self.http.post(Self::apps_url(zone, &instance.app, None)?).json(&body))
            })
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection("인스턴스 등록", response).await)
        }
    }

    async fn renew(&self, instance: &InstanceInfo) -> AppResult<RenewOutcome> {
        let last_dirty = instance.last_dirty_timestamp.unwrap_or_default().to_string();
        let response = self
            .send_to_zones("lease 갱신", |zone| {
                Ok(self
                    .http
                    .put(Self::apps_url(zone, &instance.app, Some(&instance.instance_id))?)
                    .query(&[("status", instance.status.as_str()), ("lastDirtyTimestamp", last_dirty.as_str())]))
            })
            .await?;

        match response.status() {
            status if status.is_success() => Ok(RenewOutcome::Renewed),
            StatusCode::NOT_FOUND => Ok(RenewOutcome::NotFound),
            _ => Err(Self::rejection("lease 갱신", response).await),
        }
    }

    async fn deregister(&self, instance: &InstanceInfo) -> AppResult<()> {
        let response = self
            .send_to_zones("인스턴스 해제", |zone| {
                Ok(self
                    .http
                    .delete(Self::apps_url(zone, &instance.app, Some(&instance.instance_id))?))
            })
            .await?;

        // 이미 만료된 lease는 해제된 것으로 봅니다.
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(Self::rejection("인스턴스 해제", response).await)
        }
    }

    async fn instances(&self, service_id: &str) -> AppResult<Vec<InstanceInfo>> {
        let response = self
            .send_to_zones("인스턴스 조회", |zone| Ok(self.http.get(Self::apps_url(zone, service_id, None)?)))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => {
                let envelope = response
                    .json::<ApplicationEnvelope>()
                    .await
                    .map_err(|e| AppError::DiscoveryError(format!("인스턴스 조회 응답 파싱 실패: {}", e)))?;
                Ok(envelope.application.instance.into_vec())
            }
            _ => Err(Self::rejection("인스턴스 조회", response).await),
        }
    }
}
