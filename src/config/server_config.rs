//! 서버 및 실행 환경 설정 관리 모듈
//!
//! 실행 프로파일, HTTP 리스너 바인딩, CORS, Rate Limiting 설정을 관리합니다.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::config::properties::PropertySource;
use crate::core::errors::{AppError, AppResult};

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 개발 환경 - 빠른 개발을 위한 설정
    Development,
    /// 테스트 환경 - 자동화된 테스트용 설정
    Test,
    /// 스테이징 환경 - 프로덕션 유사 환경
    Staging,
    /// 프로덕션 환경 - 필수 설정 누락 시 시작 실패
    Production,
}

impl Environment {
    /// 프로파일 이름에서 Environment를 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `profile` - 프로파일 이름 (대소문자 무관)
    ///
    /// # Returns
    ///
    /// 해당하는 Environment 값. 알 수 없는 값인 경우 `Production`을 반환합니다.
    pub fn from_profile(profile: &str) -> Self {
        match profile.to_lowercase().as_str() {
            "development" | "dev" | "local" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

/// HTTP 리스너 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 바인딩 주소 (`server.address`, 기본값: 0.0.0.0)
    pub address: IpAddr,
    /// 바인딩 포트 (`server.port`, 기본값: 8080, 0이면 임의 포트)
    pub port: u16,
    /// 워커 스레드 수 (`server.workers`, 기본값: 4)
    pub workers: usize,
    /// 그레이스풀 셧다운 대기 시간(초) (`server.shutdown-timeout`, 기본값: 30)
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_WORKERS: usize = 4;
    pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

    /// 프로퍼티 소스에서 서버 설정을 읽습니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigurationError` - 주소/포트 파싱 실패, 워커 수 0
    pub fn from_properties(props: &PropertySource) -> AppResult<Self> {
        let address = props.get_parsed::<IpAddr>("server.address", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = props.get_parsed::<u16>("server.port", Self::DEFAULT_PORT)?;
        let workers = props.get_parsed::<usize>("server.workers", Self::DEFAULT_WORKERS)?;
        let shutdown_timeout_secs =
            props.get_parsed::<u64>("server.shutdown-timeout", Self::DEFAULT_SHUTDOWN_TIMEOUT_SECS)?;

        if workers == 0 {
            return Err(AppError::ConfigurationError(
                "server.workers 값은 1 이상이어야 합니다".to_string(),
            ));
        }

        Ok(Self {
            address,
            port,
            workers,
            shutdown_timeout_secs,
        })
    }

    /// 리스너가 바인딩할 소켓 주소를 반환합니다.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

/// CORS 설정
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// 허용할 Origin 목록 (`cors.allowed-origins`, 쉼표 구분)
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub const DEFAULT_ALLOWED_ORIGINS: &'static str = "http://localhost:3000,http://127.0.0.1:3000";

    /// `*` 또는 `http://`, `https://`로 시작하는 Origin만 허용합니다.
    pub fn from_properties(props: &PropertySource) -> AppResult<Self> {
        let allowed_origins = props.get_list("cors.allowed-origins", Self::DEFAULT_ALLOWED_ORIGINS);

        if let Some(bad) = allowed_origins
            .iter()
            .find(|o| o.as_str() != "*" && !o.starts_with("http://") && !o.starts_with("https://"))
        {
            return Err(AppError::ConfigurationError(format!(
                "cors.allowed-origins 에 잘못된 Origin 이 있습니다: {}",
                bad
            )));
        }

        Ok(Self { allowed_origins })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Rate Limiting 설정
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 초당 허용 요청 수 (`rate-limit.per-second`, 기본값: 100)
    pub per_second: u64,
    /// 버스트 허용량 (`rate-limit.burst-size`, 기본값: 200)
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// 환경 변수 예시
    ///
    /// ```bash
    /// # .env.dev (개발 환경)
    /// RATE_LIMIT_PER_SECOND=20
    /// RATE_LIMIT_BURST_SIZE=40
    ///
    /// # .env.prod (운영 환경)
    /// RATE_LIMIT_PER_SECOND=500
    /// RATE_LIMIT_BURST_SIZE=1000
    /// ```
    pub fn from_properties(props: &PropertySource) -> AppResult<Self> {
        let per_second = props.get_parsed::<u64>("rate-limit.per-second", 100)?;
        let burst_size = props.get_parsed::<u32>("rate-limit.burst-size", 200)?;

        if per_second == 0 || burst_size == 0 {
            return Err(AppError::ConfigurationError(
                "rate-limit.per-second 와 rate-limit.burst-size 값은 1 이상이어야 합니다".to_string(),
            ));
        }

        Ok(Self {
            per_second,
            burst_size,
        })
    }
}
