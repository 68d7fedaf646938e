//! 애플리케이션 부트스트랩
//!
//! HTTP 리스너를 띄우고, 서비스 레지스트리에 등록하고, 종료될 때까지 실행합니다.
//!
//! ```text
//! start()
//!   ├─ Step 1: HTTP 리스너 바인딩 ── 실패 → BindError, Failed
//!   ├─ Step 2: 레지스트리 등록 ───── 실패 → 서버 중지, DiscoveryError, Failed
//!   ├─ Step 3: 하트비트 시작
//!   └─ Running
//! wait()
//!   ├─ 서버 종료 대기 (SIGINT/SIGTERM 또는 stop())
//!   ├─ 하트비트 중지, 등록 해제
//!   └─ Stopped
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpServer, middleware, web};
use log::{error, info, warn};
use tokio::task::JoinHandle;

use crate::config::{self, ApplicationConfig, CorsConfig};
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::core::lifecycle::{ApplicationState, LifecycleState};
use crate::discovery::{self, DiscoveryClient, Heartbeat, InstanceInfo};
use crate::handlers::actuator::ServiceDescriptor;
use crate::routes::configure_all_routes;
use crate::utils::display_terminal::{
    print_boxed_title, print_startup_summary, print_step_complete, print_step_start, print_sub_task,
};

/// 시작 전 애플리케이션
pub struct CommandeServiceApplication {
    config: ApplicationConfig,
    discovery: Option<Arc<dyn DiscoveryClient>>,
    state: ApplicationState,
}

impl CommandeServiceApplication {
    /// `discovery`가 `None`이면 레지스트리 등록 없이 실행합니다.
    pub fn new(config: ApplicationConfig, discovery: Option<Arc<dyn DiscoveryClient>>) -> Self {
        Self {
            config,
            discovery,
            state: ApplicationState::new(),
        }
    }

    /// 시작 인자로 설정을 로드하고 종료될 때까지 실행합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigurationError` - 설정 누락/오류
    /// * `AppError::BindError` - 포트 사용 중
    /// * `AppError::DiscoveryError` - 레지스트리 연결/등록 실패
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// CommandeServiceApplication::run(std::env::args().skip(1)).await?;
    /// ```
    pub async fn run<I, S>(args: I) -> AppResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let config = ApplicationConfig::load(args)?;
        config::log_summary(&config);

        let discovery = discovery::client_from_config(&config.discovery)?;
        Self::new(config, discovery).start().await?.wait().await
    }

    /// 외부에서 상태를 관찰하기 위한 핸들
    pub fn state(&self) -> ApplicationState {
        self.state.clone()
    }

    /// 리스너를 바인딩하고 레지스트리에 등록한 뒤 `Running` 상태로 전환합니다.
    pub async fn start(self) -> AppResult<RunningApplication> {
        let state = self.state.clone();
        let result = self.start_inner().await;
        if let Err(e) = &result {
            error!("❌ 애플리케이션 시작 실패: {}", e);
            state.mark_failed();
        }
        result
    }

    async fn start_inner(self) -> AppResult<RunningApplication> {
        let Self { config, discovery, state } = self;

        print_boxed_title("🚀 COMMANDE SERVICE STARTING");

        print_step_start(1, "HTTP 리스너 바인딩");
        let (local_addr, handle, join) = start_http_server(&config, &state)?;
        print_step_complete(1, "HTTP 리스너 바인딩", &local_addr.to_string());

        let registration = match discovery {
            Some(client) => match register(&config, client, local_addr, &state).await {
                Ok(registration) => Some(registration),
                Err(e) => {
                    warn!("레지스트리 등록 실패로 HTTP 서버를 중지합니다");
                    stop_http_server(&handle, join).await;
                    return Err(e);
                }
            },
            None => {
                info!("서비스 디스커버리가 비활성화되어 등록 단계를 건너뜁니다");
                None
            }
        };

        if let Err(e) = state.transition(LifecycleState::Running) {
            warn!("Running 상태로 전환하지 못해 등록을 해제하고 HTTP 서버를 중지합니다");
            if let Some(registration) = registration {
                registration.release(&state).await;
            }
            stop_http_server(&handle, join).await;
            return Err(e);
        }

        print_startup_summary(
            &config.application_name,
            local_addr,
            registration.as_ref().map(|r| r.instance.instance_id.as_str()),
        );
        info!("✅ {} 실행 중: http://{}", config.application_name, local_addr);

        Ok(RunningApplication {
            application_name: config.application_name,
            local_addr,
            state,
            registration,
            handle,
            join,
        })
    }
}

/// 레지스트리에 등록된 인스턴스와 그 하트비트
struct Registration {
    client: Arc<dyn DiscoveryClient>,
    instance: InstanceInfo,
    heartbeat: Heartbeat,
}

impl Registration {
    /// 하트비트를 멈추고 등록을 해제합니다. 해제 실패는 로그만 남깁니다.
    async fn release(self, state: &ApplicationState) {
        self.heartbeat.stop().await;
        match self.client.deregister(&self.instance).await {
            Ok(()) => info!("👋 레지스트리 등록 해제: {}", self.instance.instance_id),
            Err(e) => warn!("⚠️ 레지스트리 등록 해제 실패: {}", e),
        }
        if let Err(e) = state.set_registration(None, false) {
            warn!("등록 상태를 갱신할 수 없습니다: {}", e);
        }
    }
}

/// 인스턴스를 등록하고 하트비트를 시작합니다.
///
/// 등록 후 단계가 실패하면 등록을 해제한 뒤 에러를 반환합니다.
async fn register(
    config: &ApplicationConfig,
    client: Arc<dyn DiscoveryClient>,
    local_addr: SocketAddr,
    state: &ApplicationState,
) -> AppResult<Registration> {
    print_step_start(2, "레지스트리 등록");
    let instance = InstanceInfo::for_application(config, local_addr.port());
    print_sub_task("Registry", &client.description());
    print_sub_task("Instance", &instance.instance_id);

    discovery::register_with_retry(
        client.as_ref(),
        &instance,
        config.discovery.registration_retries,
        config.discovery.retry_interval,
    )
    .await?;

    if let Err(e) = state.set_registration(Some(instance.instance_id.clone()), true) {
        if let Err(dereg) = client.deregister(&instance).await {
            warn!("⚠️ 레지스트리 등록 해제 실패: {}", dereg);
        }
        return Err(e);
    }
    print_step_complete(2, "레지스트리 등록", &instance.instance_id);

    print_step_start(3, "하트비트 시작");
    let interval = config.discovery.instance.lease_renewal_interval();
    let heartbeat = Heartbeat::spawn(client.clone(), instance.clone(), interval, state.clone());
    print_step_complete(3, "하트비트 시작", &format!("{}초 주기", interval.as_secs()));

    Ok(Registration {
        client,
        instance,
        heartbeat,
    })
}

/// 시작 도중 실패했을 때 이미 띄운 서버를 즉시 중지합니다.
async fn stop_http_server(handle: &ServerHandle, join: JoinHandle<std::io::Result<()>>) {
    handle.stop(false).await;
    if let Err(e) = join.await {
        warn!("HTTP 서버 태스크가 비정상 종료되었습니다: {}", e);
    }
}

/// 실행 중인 애플리케이션
pub struct RunningApplication {
    application_name: String,
    local_addr: SocketAddr,
    state: ApplicationState,
    registration: Option<Registration>,
    handle: ServerHandle,
    join: JoinHandle<std::io::Result<()>>,
}

impl RunningApplication {
    /// 실제로 바인딩된 주소 (`server.port=0`이면 OS가 고른 포트)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ApplicationState {
        self.state.clone()
    }

    /// 등록된 인스턴스 ID. 디스커버리가 비활성화되어 있으면 `None`입니다.
    pub fn instance_id(&self) -> Option<&str> {
        self.registration
            .as_ref()
            .map(|r| r.instance.instance_id.as_str())
    }

    /// 서버에 종료를 요청합니다. 정리 작업은 [`wait`](Self::wait)에서 수행됩니다.
    pub async fn stop(&self, graceful: bool) {
        info!("🛑 {} 종료 요청 (graceful={})", self.application_name, graceful);
        self.handle.stop(graceful).await;
    }

    /// 서버가 종료될 때까지 기다린 뒤 등록을 해제합니다.
    ///
    /// 등록 해제 실패는 로그만 남기고 종료를 계속합니다.
    pub async fn wait(self) -> AppResult<()> {
        let server_result = self
            .join
            .await
            .context("HTTP 서버 태스크 실패")
            .and_then(|result| result.context("HTTP 서버 실행 실패"));

        if let Some(registration) = self.registration {
            registration.release(&self.state).await;
        }

        match server_result {
            Ok(()) => {
                self.state.transition(LifecycleState::Stopped)?;
                info!("{} 종료 완료", self.application_name);
                Ok(())
            }
            Err(e) => {
                self.state.mark_failed();
                Err(e)
            }
        }
    }
}

/// HTTP 서버를 구성하고 현재 런타임에 띄웁니다
///
/// Rate Limiting, CORS, 요청 로깅, 경로 정규화 미들웨어를 포함합니다.
///
/// # Errors
///
/// * `AppError::ConfigurationError` - Rate Limiting 설정을 만들 수 없는 경우
/// * `AppError::BindError` - 포트 사용 중 또는 주소 바인딩 실패
fn start_http_server(
    config: &ApplicationConfig,
    state: &ApplicationState,
) -> AppResult<(SocketAddr, ServerHandle, JoinHandle<std::io::Result<()>>)> {
    let bind_address = config.server.bind_address();

    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(config.rate_limit.per_second)
        .burst_size(config.rate_limit.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| AppError::ConfigurationError("Rate Limiting 설정을 만들 수 없습니다".to_string()))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        config.rate_limit.per_second, config.rate_limit.burst_size
    );

    let cors_config = config.cors.clone();
    let state_data = web::Data::new(state.clone());
    let descriptor = web::Data::new(ServiceDescriptor::from_config(config));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .app_data(descriptor.clone())
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors(&cors_config))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
    .workers(config.server.workers)
    .shutdown_timeout(config.server.shutdown_timeout_secs)
    .bind(bind_address)
    .map_err(|e| AppError::BindError(format!("{} 바인딩 실패: {}", bind_address, e)))?;

    let local_addr = server
        .addrs()
        .first()
        .copied()
        .ok_or_else(|| AppError::BindError(format!("{} 에 바인딩된 소켓이 없습니다", bind_address)))?;

    let server = server.run();
    let handle = server.handle();
    let join = actix_web::rt::spawn(server);

    info!("🌐 서버가 http://{} 에서 실행중입니다", local_addr);
    info!("📍 Health check: http://{}/actuator/health", local_addr);

    Ok((local_addr, handle, join))
}

/// CORS 설정을 구성합니다
///
/// 운영 엔드포인트는 조회 전용이므로 `GET`과 preflight만 허용합니다.
fn configure_cors(config: &CorsConfig) -> Cors {
    let cors = if config.allows_any_origin() {
        Cors::default().allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropertySource;
    use crate::discovery::test_support::FakeRegistry;
    use std::collections::HashMap;
    use std::time::Duration;

    const SHUTDOWN_LIMIT: Duration = Duration::from_secs(10);

    fn config(extra: &[String]) -> ApplicationConfig {
        let mut args = vec![
            "--server.address=127.0.0.1".to_string(),
            "--server.port=0".to_string(),
            "--server.workers=1".to_string(),
            "--server.shutdown-timeout=1".to_string(),
            "--eureka.instance.hostname=test-host".to_string(),
            "--eureka.client.registration-retries=1".to_string(),
            "--eureka.client.retry-interval=0".to_string(),
            "--eureka.client.request-timeout=2".to_string(),
        ];
        args.extend_from_slice(extra);

        let props = PropertySource::new(PropertySource::parse_args(args).unwrap(), HashMap::new());
        ApplicationConfig::from_properties(&props).unwrap()
    }

    fn config_with_registry(zone: &str) -> ApplicationConfig {
        config(&[format!("--eureka.client.service-url.default-zone={}", zone)])
    }

    fn application(config: ApplicationConfig) -> CommandeServiceApplication {
        let discovery = discovery::client_from_config(&config.discovery).unwrap();
        CommandeServiceApplication::new(config, discovery)
    }

    async fn shutdown(running: RunningApplication) -> AppResult<()> {
        running.stop(true).await;
        tokio::time::timeout(SHUTDOWN_LIMIT, running.wait())
            .await
            .expect("shutdown timed out")
    }

    #[actix_web::test]
    async fn test_start_registers_and_runs() {
        let registry = FakeRegistry::start().await;
        let app = application(config_with_registry(&registry.base_url()));
        let state = app.state();

        let running = app.start().await.unwrap();

        assert_eq!(state.current().unwrap(), LifecycleState::Running);
        let instance_id = running.instance_id().unwrap().to_string();
        assert!(instance_id.starts_with("test-host:commande-service:"));
        assert!(registry.contains("COMMANDE-SERVICE", &instance_id));
        assert_ne!(running.local_addr().port(), 0);

        let snapshot = state.snapshot().unwrap();
        assert!(snapshot.registered);
        assert_eq!(snapshot.instance_id.as_deref(), Some(instance_id.as_str()));

        shutdown(running).await.unwrap();
    }

    #[actix_web::test]
    async fn test_unreachable_registry_fails_startup() {
        let app = application(config_with_registry(&FakeRegistry::unreachable_url()));
        let state = app.state();

        let result = app.start().await;

        assert!(matches!(result, Err(AppError::DiscoveryError(_))));
        assert_eq!(state.current().unwrap(), LifecycleState::Failed);
        assert!(!state.snapshot().unwrap().registered);
    }

    #[actix_web::test]
    async fn test_rejected_registration_fails_startup() {
        let registry = FakeRegistry::start().await;
        registry.reject_registrations(true);
        let app = application(config_with_registry(&registry.base_url()));
        let state = app.state();

        let result = app.start().await;

        assert!(matches!(result, Err(AppError::DiscoveryError(_))));
        assert_eq!(state.current().unwrap(), LifecycleState::Failed);
        assert_eq!(registry.registered_count(), 0);
    }

    #[actix_web::test]
    async fn test_failure_after_registration_deregisters() {
        let registry = FakeRegistry::start().await;
        let app = application(config_with_registry(&registry.base_url()));
        let state = app.state();
        // 시작 전에 종료 상태가 되면 Running 전이가 거부됩니다
        state.mark_failed();

        let result = app.start().await;

        assert!(matches!(result, Err(AppError::LifecycleError(_))));
        assert_eq!(state.current().unwrap(), LifecycleState::Failed);
        assert_eq!(registry.registered_count(), 0);
        assert_eq!(registry.deregistrations(), 1);
        assert!(!state.snapshot().unwrap().registered);
    }

    #[actix_web::test]
    async fn test_busy_port_fails_with_bind_error() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let app = application(config(&[
            format!("--server.port={}", port),
            "--eureka.client.enabled=false".to_string(),
        ]));
        let state = app.state();

        let result = app.start().await;

        assert!(matches!(result, Err(AppError::BindError(_))));
        assert_eq!(state.current().unwrap(), LifecycleState::Failed);
        drop(occupied);
    }

    #[actix_web::test]
    async fn test_stop_deregisters_and_ends_stopped() {
        let registry = FakeRegistry::start().await;
        let app = application(config_with_registry(&registry.base_url()));
        let state = app.state();

        let running = app.start().await.unwrap();
        let instance_id = running.instance_id().unwrap().to_string();

        shutdown(running).await.unwrap();

        assert_eq!(state.current().unwrap(), LifecycleState::Stopped);
        assert!(!registry.contains("COMMANDE-SERVICE", &instance_id));
        assert_eq!(registry.deregistrations(), 1);
        assert!(!state.snapshot().unwrap().registered);
    }

    #[actix_web::test]
    async fn test_runs_without_discovery() {
        let app = application(config(&["--eureka.client.enabled=false".to_string()]));

        let running = app.start().await.unwrap();
        assert!(running.instance_id().is_none());
        assert_eq!(running.state().current().unwrap(), LifecycleState::Running);

        shutdown(running).await.unwrap();
    }

    #[actix_web::test]
    async fn test_health_endpoint_over_http() {
        let registry = FakeRegistry::start().await;
        let app = application(config_with_registry(&registry.base_url()));
        let running = app.start().await.unwrap();

        let url = format!("http://{}/actuator/health", running.local_addr());
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "UP");
        assert_eq!(body["components"]["discoveryClient"]["registered"], true);

        shutdown(running).await.unwrap();
    }
}
