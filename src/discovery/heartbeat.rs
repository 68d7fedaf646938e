//! lease 갱신(하트비트) 백그라운드 태스크
//!
//! 레지스트리는 `durationInSecs` 안에 갱신이 오지 않은 인스턴스를 제거합니다.
//! 이 태스크는 `renewalIntervalInSecs`마다 갱신 요청을 보내고,
//! 레지스트리가 인스턴스를 모른다고 응답(404)하면 다시 등록합니다.
//!
//! 갱신 실패는 프로세스를 멈추지 않습니다. 경고 로그를 남기고 다음 주기에 재시도합니다.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::core::lifecycle::ApplicationState;
use crate::discovery::instance::InstanceInfo;
use crate::discovery::{DiscoveryClient, RenewOutcome};

/// 실행 중인 하트비트 태스크 핸들
pub struct Heartbeat {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Heartbeat {
    /// 하트비트 태스크를 현재 actix 런타임에 띄웁니다.
    ///
    /// 첫 갱신은 등록 직후가 아니라 `interval`이 지난 뒤에 보냅니다.
    pub fn spawn(
        client: Arc<dyn DiscoveryClient>,
        instance: InstanceInfo,
        interval: Duration,
        state: ApplicationState,
    ) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = actix_web::rt::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        renew_once(client.as_ref(), &instance, &state).await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("하트비트 태스크 종료: {}", instance.instance_id);
        });

        Self { stop_tx, handle }
    }

    /// 태스크에 종료를 알리고 끝날 때까지 기다립니다.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!("하트비트 태스크가 비정상 종료되었습니다: {}", e);
        }
    }
}

/// 갱신 한 번을 수행합니다.
pub async fn renew_once(client: &dyn DiscoveryClient, instance: &InstanceInfo, state: &ApplicationState) {
    match client.renew(instance).await {
        Ok(RenewOutcome::Renewed) => {
            debug!("💓 lease 갱신: {}", instance.instance_id);
        }
        Ok(RenewOutcome::NotFound) => {
            warn!("레지스트리에 {} 인스턴스가 없습니다. 다시 등록합니다", instance.instance_id);
            if let Err(e) = state.set_registration(None, false) {
                warn!("등록 상태를 갱신할 수 없습니다: {}", e);
            }

            match client.register(instance).await {
                Ok(()) => {
                    info!("✅ 재등록 완료: {}", instance.instance_id);
                    if let Err(e) = state.set_registration(Some(instance.instance_id.clone()), true) {
                        warn!("등록 상태를 갱신할 수 없습니다: {}", e);
                    }
                }
                Err(e) => warn!("⚠️ 재등록 실패, 다음 주기에 다시 시도합니다: {}", e),
            }
        }
        Err(e) => warn!("⚠️ lease 갱신 실패, 다음 주기에 다시 시도합니다: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApplicationConfig, PropertySource};
    use crate::discovery::eureka_client::EurekaClient;
    use crate::discovery::test_support::FakeRegistry;
    use std::collections::HashMap;

    fn config(zone: &str) -> ApplicationConfig {
        let props = PropertySource::new(
            PropertySource::parse_args([
                format!("--eureka.client.service-url.default-zone={}", zone),
                "--eureka.instance.hostname=hb-host".to_string(),
            ])
            .unwrap(),
            HashMap::new(),
        );
        ApplicationConfig::from_properties(&props).unwrap()
    }

    #[actix_web::test]
    async fn test_renew_once_reregisters_after_eviction() {
        let registry = FakeRegistry::start().await;
        let config = config(&registry.base_url());
        let client = EurekaClient::new(&config.discovery).unwrap();
        let instance = InstanceInfo::for_application(&config, 8080);
        let state = ApplicationState::new();

        client.register(&instance).await.unwrap();
        registry.evict_all();

        renew_once(&client, &instance, &state).await;

        assert!(registry.contains("COMMANDE-SERVICE", &instance.instance_id));
        let snapshot = state.snapshot().unwrap();
        assert!(snapshot.registered);
        assert_eq!(snapshot.instance_id, Some(instance.instance_id.clone()));
    }

    #[actix_web::test]
    async fn test_renew_failure_keeps_registration_flag() {
        let config = config(&FakeRegistry::unreachable_url());
        let client = EurekaClient::new(&config.discovery).unwrap();
        let instance = InstanceInfo::for_application(&config, 8080);
        let state = ApplicationState::new();
        state.set_registration(Some(instance.instance_id.clone()), true).unwrap();

        renew_once(&client, &instance, &state).await;

        assert!(state.snapshot().unwrap().registered);
    }

    #[actix_web::test]
    async fn test_reregistration_survives_unwritable_state() {
        let registry = FakeRegistry::start().await;
        let config = config(&registry.base_url());
        let client = EurekaClient::new(&config.discovery).unwrap();
        let instance = InstanceInfo::for_application(&config, 8080);
        let state = ApplicationState::new();
        state.poison();

        client.register(&instance).await.unwrap();
        registry.evict_all();

        renew_once(&client, &instance, &state).await;

        assert!(registry.contains("COMMANDE-SERVICE", &instance.instance_id));
    }

    #[actix_web::test]
    async fn test_heartbeat_renews_periodically_and_stops() {
        let registry = FakeRegistry::start().await;
        let config = config(&registry.base_url());
        let client: Arc<dyn DiscoveryClient> = Arc::new(EurekaClient::new(&config.discovery).unwrap());
        let instance = InstanceInfo::for_application(&config, 8080);
        client.register(&instance).await.unwrap();

        let heartbeat = Heartbeat::spawn(
            client.clone(),
            instance.clone(),
            Duration::from_millis(50),
            ApplicationState::new(),
        );

        tokio::time::sleep(Duration::from_millis(300)).await;
        heartbeat.stop().await;

        let renewals = registry.renewals();
        assert!(renewals >= 2, "expected at least two renewals, got {}", renewals);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(registry.renewals(), renewals);
    }
}
