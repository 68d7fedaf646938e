//! # Configuration Module
//!
//! 주문 서비스의 설정 관리를 담당하는 모듈입니다.
//! Spring Boot의 `application.yml` + `@ConfigurationProperties` 조합과 유사하게,
//! 프로파일별 `.env` 파일, 환경 변수, 시작 인자를 하나의 타입 안전한
//! [`ApplicationConfig`]로 묶습니다.
//!
//! ## 모듈 구성
//!
//! - [`properties`] - 시작 인자/환경 변수 조회 (relaxed binding)
//! - [`server_config`] - 실행 환경, HTTP 리스너, CORS, Rate Limiting 설정
//! - [`discovery_config`] - Eureka 레지스트리 클라이언트 및 인스턴스 설정
//!
//! ## 설정 우선순위
//!
//! 1. 시작 인자: `commande_service --server.port=9090`
//! 2. 환경 변수: `SERVER_PORT=9090`
//! 3. `.env.<profile>` 파일 (이미 설정된 환경 변수는 덮어쓰지 않음)
//! 4. 기본값
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use commande_service::config::ApplicationConfig;
//!
//! let config = ApplicationConfig::load(std::env::args().skip(1))?;
//! println!("{} → {}", config.application_name, config.server.bind_address());
//! ```
//!
//! ## Spring과의 비교
//!
//! | Spring | Rust (이 프로젝트) |
//! |--------|-------------------|
//! | `spring.application.name` | `ApplicationConfig::application_name` |
//! | `spring.profiles.active` | `ApplicationConfig::profile` |
//! | `application-dev.yml` | `.env.dev` 파일 |
//! | `--server.port=9090` | `--server.port=9090` |

pub mod properties;
pub mod server_config;
pub mod discovery_config;

pub use properties::PropertySource;
pub use server_config::*;
pub use discovery_config::*;

use log::info;

use crate::core::errors::{AppError, AppResult};

pub const DEFAULT_APPLICATION_NAME: &str = "commande-service";
pub const DEFAULT_PROFILE: &str = "dev";

/// 애플리케이션 전체 설정
#[derive(Debug, Clone)]
pub struct ApplicationConfig {
    /// 레지스트리에 광고하는 논리 서비스 이름 (`spring.application.name`)
    pub application_name: String,
    /// 활성 프로파일 (`spring.profiles.active` 또는 `PROFILE`)
    pub profile: String,
    pub environment: Environment,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub discovery: DiscoveryConfig,
}

impl ApplicationConfig {
    /// 시작 인자와 현재 프로세스 환경 변수로 설정을 로드합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigurationError` - 잘못된 시작 인자, 파싱 실패, 필수 설정 누락
    pub fn load<I, S>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let props = PropertySource::from_args_and_env(args)?;
        Self::from_properties(&props)
    }

    pub fn from_properties(props: &PropertySource) -> AppResult<Self> {
        if props.is_blank("spring.application.name") {
            return Err(AppError::ConfigurationError(
                "spring.application.name 값이 비어 있습니다".to_string(),
            ));
        }

        let application_name = props.get_or("spring.application.name", DEFAULT_APPLICATION_NAME);
        if application_name.contains(char::is_whitespace) || application_name.contains('/') {
            return Err(AppError::ConfigurationError(format!(
                "spring.application.name 에 공백이나 '/'를 쓸 수 없습니다: {}",
                application_name
            )));
        }

        let profile = active_profile(props);
        let environment = Environment::from_profile(&profile);
        let server = ServerConfig::from_properties(props)?;
        let discovery = DiscoveryConfig::from_properties(props, &environment, &server)?;

        Ok(Self {
            application_name,
            profile,
            environment,
            cors: CorsConfig::from_properties(props)?,
            rate_limit: RateLimitConfig::from_properties(props)?,
            server,
            discovery,
        })
    }
}

/// 활성 프로파일을 결정합니다.
///
/// `spring.profiles.active` → `PROFILE` 환경 변수 → `dev` 순서로 확인합니다.
pub fn active_profile(props: &PropertySource) -> String {
    props
        .get("spring.profiles.active")
        .or_else(|| props.get_env("PROFILE"))
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// 프로파일에 맞는 `.env` 파일을 로드합니다
///
/// `.env.<profile>` 파일이 있으면 그것을, 없으면 기본 `.env` 파일을 로드합니다.
/// 이미 설정된 환경 변수는 덮어쓰지 않습니다.
///
/// # Returns
///
/// 로드된 파일 이름. 두 파일 모두 없으면 `None`을 반환합니다.
///
/// # Examples
///
/// ```bash
/// # 개발 환경
/// PROFILE=dev cargo run
///
/// # 운영 환경
/// cargo run -- --spring.profiles.active=prod
/// ```
pub fn load_profile_env(profile: &str) -> Option<String> {
    let profile_file = format!(".env.{}", profile);

    match dotenv::from_filename(&profile_file) {
        Ok(_) => Some(profile_file),
        Err(_) => dotenv::dotenv().ok().map(|path| path.display().to_string()),
    }
}

/// 로드된 설정 요약을 로그로 남깁니다.
pub fn log_summary(config: &ApplicationConfig) {
    info!(
        "설정 로드됨: name={}, profile={}, environment={:?}, bind={}",
        config.application_name,
        config.profile,
        config.environment,
        config.server.bind_address()
    );
    if config.discovery.enabled {
        let zones: Vec<&str> = config.discovery.service_urls.iter().map(|u| u.as_str()).collect();
        info!("서비스 디스커버리 활성화: {}", zones.join(", "));
    } else {
        info!("서비스 디스커버리 비활성화 (eureka.client.enabled=false)");
    }
}
