//! # Service Discovery Module
//!
//! 실행 중인 인스턴스를 서비스 레지스트리에 등록하고, lease를 유지하고,
//! 종료 시 등록을 해제합니다. Spring Cloud의 `@EnableDiscoveryClient`가
//! 해 주던 일을 명시적인 코드로 옮긴 모듈입니다.
//!
//! ## 모듈 구성
//!
//! - [`instance`] - 레지스트리 인스턴스 레코드 (Eureka JSON 형식)
//! - [`eureka_client`] - Eureka REST API 클라이언트
//! - [`heartbeat`] - lease 갱신 백그라운드 태스크
//!
//! ## 인스턴스 생명주기
//!
//! ```text
//! register (시작, 재시도 포함)
//!    │
//!    ▼
//! renew ─── 매 renewalIntervalInSecs ───┐
//!    │        404 → register            │
//!    │◄─────────────────────────────────┘
//!    ▼
//! deregister (종료)
//! ```

pub mod instance;
pub mod eureka_client;
pub mod heartbeat;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};

use crate::config::DiscoveryConfig;
use crate::core::errors::{AppError, AppResult};

pub use eureka_client::EurekaClient;
pub use heartbeat::Heartbeat;
pub use instance::{InstanceInfo, InstanceStatus};

/// lease 갱신 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewOutcome {
    /// 갱신 성공
    Renewed,
    /// 레지스트리가 인스턴스를 모름. 다시 등록해야 합니다.
    NotFound,
}

/// 서비스 레지스트리 클라이언트 추상화
///
/// 애플리케이션과 하트비트 태스크는 이 trait만 사용하므로
/// 다른 레지스트리 구현으로 교체하거나 테스트용 구현을 넣을 수 있습니다.
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    /// 로그에 남길 레지스트리 설명
    fn description(&self) -> String;

    /// 인스턴스를 등록합니다.
    async fn register(&self, instance: &InstanceInfo) -> AppResult<()>;

    /// lease를 갱신합니다.
    async fn renew(&self, instance: &InstanceInfo) -> AppResult<RenewOutcome>;

    /// 등록을 해제합니다. 이미 없는 인스턴스는 성공으로 봅니다.
    async fn deregister(&self, instance: &InstanceInfo) -> AppResult<()>;

    /// 논리 서비스 이름으로 등록된 인스턴스를 조회합니다.
    ///
    /// 부트스트랩 경로는 호출하지 않습니다. 이 서비스가 다른 서비스를 이름으로
    /// 찾을 때 쓰는 조회 API이며, 등록 결과를 레지스트리 쪽에서 확인할 때도 씁니다.
    async fn instances(&self, service_id: &str) -> AppResult<Vec<InstanceInfo>>;
}

/// 설정에 맞는 디스커버리 클라이언트를 생성합니다.
///
/// `eureka.client.enabled=false`이면 `None`을 반환하며 등록 단계를 건너뜁니다.
pub fn client_from_config(config: &DiscoveryConfig) -> AppResult<Option<Arc<dyn DiscoveryClient>>> {
    if !config.enabled {
        return Ok(None);
    }

    let client: Arc<dyn DiscoveryClient> = Arc::new(EurekaClient::new(config)?);
    Ok(Some(client))
}

/// 등록을 최대 `attempts`번 시도합니다.
///
/// # Errors
///
/// * `AppError::DiscoveryError` - 모든 시도가 실패한 경우 마지막 에러
pub async fn register_with_retry(
    client: &dyn DiscoveryClient,
    instance: &InstanceInfo,
    attempts: u32,
    retry_interval: Duration,
) -> AppResult<()> {
    let attempts = attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match client.register(instance).await {
            Ok(()) => {
                info!(
                    "✅ {} 에 {} 등록 완료 (시도 {}/{})",
                    client.description(),
                    instance.instance_id,
                    attempt,
                    attempts
                );
                return Ok(());
            }
            Err(e) => {
                warn!("⚠️ 레지스트리 등록 실패 (시도 {}/{}): {}", attempt, attempts, e);
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(retry_interval).await;
                }
            }
        }
    }

    Err(match last_error {
        Some(AppError::DiscoveryError(msg)) => AppError::DiscoveryError(format!(
            "{}회 시도 후 레지스트리 등록 실패: {}",
            attempts, msg
        )),
        Some(other) => other,
        None => AppError::DiscoveryError("레지스트리 등록 실패".to_string()),
    })
}
