//! # Service Discovery Configuration Module
//!
//! Eureka 서비스 레지스트리 클라이언트와 인스턴스 설정을 관리합니다.
//! Spring Cloud Netflix의 `eureka.client.*` / `eureka.instance.*` 프로퍼티와
//! 같은 키 이름을 사용합니다.
//!
//! ## 환경 변수 설정
//!
//! ```bash
//! # 레지스트리 주소 (쉼표로 여러 개 지정 가능, 앞에서부터 시도)
//! export EUREKA_CLIENT_SERVICE_URL_DEFAULT_ZONE="http://eureka-1:8761/eureka/,http://eureka-2:8761/eureka/"
//!
//! # 디스커버리 비활성화
//! export EUREKA_CLIENT_ENABLED="false"
//!
//! # 인스턴스 정보
//! export EUREKA_INSTANCE_HOSTNAME="commande-1.internal"
//! export EUREKA_INSTANCE_PREFER_IP_ADDRESS="true"
//! ```
//!
//! ## Spring Cloud와의 비교
//!
//! | Spring Cloud | 이 모듈 |
//! |--------------|---------|
//! | `@EnableDiscoveryClient` | `DiscoveryConfig::enabled` |
//! | `eureka.client.serviceUrl.defaultZone` | `DiscoveryConfig::service_urls` |
//! | `eureka.instance.leaseRenewalIntervalInSeconds` | `InstanceConfig::lease_renewal_interval_secs` |
//! | `eureka.instance.preferIpAddress` | `InstanceConfig::prefer_ip_address` |

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use reqwest::Url;

use crate::config::properties::PropertySource;
use crate::config::server_config::{Environment, ServerConfig};
use crate::core::errors::{AppError, AppResult};

pub const DEFAULT_ZONE_KEY: &str = "eureka.client.service-url.default-zone";
pub const DEFAULT_ZONE: &str = "http://localhost:8761/eureka/";

/// 레지스트리 클라이언트 설정
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// 레지스트리 등록 여부 (`eureka.client.enabled`)
    pub enabled: bool,
    /// 레지스트리 기본 URL 목록. 항상 `/`로 끝납니다.
    pub service_urls: Vec<Url>,
    /// 시작 시 등록 시도 횟수 (`eureka.client.registration-retries`)
    pub registration_retries: u32,
    /// 등록 재시도 간격 (`eureka.client.retry-interval`, 초)
    pub retry_interval: Duration,
    /// 레지스트리 HTTP 요청 타임아웃 (`eureka.client.request-timeout`, 초)
    pub request_timeout: Duration,
    pub instance: InstanceConfig,
}

/// 레지스트리에 광고할 인스턴스 정보
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    pub hostname: String,
    pub ip_address: IpAddr,
    pub prefer_ip_address: bool,
    /// 명시하지 않으면 `<hostname>:<app-name>:<port>` 형식으로 생성됩니다.
    pub instance_id: Option<String>,
    pub lease_renewal_interval_secs: u32,
    pub lease_expiration_duration_secs: u32,
}

impl DiscoveryConfig {
    /// 프로퍼티 소스에서 디스커버리 설정을 읽습니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigurationError`
    ///   - URL 파싱 실패 또는 http/https 이외의 스킴
    ///   - 재시도 횟수, 갱신 주기가 0인 경우
    ///   - 갱신 주기가 만료 시간보다 길거나 같은 경우
    ///   - 프로덕션 환경에서 `defaultZone`을 명시하지 않은 경우
    pub fn from_properties(
        props: &PropertySource,
        environment: &Environment,
        server: &ServerConfig,
    ) -> AppResult<Self> {
        let enabled = props.get_bool("eureka.client.enabled", true)?;

        if enabled && environment.is_production() && !props.contains(DEFAULT_ZONE_KEY) {
            return Err(AppError::ConfigurationError(format!(
                "프로덕션 환경에서는 {} 설정이 필수입니다",
                DEFAULT_ZONE_KEY
            )));
        }

        let service_urls = props
            .get_list(DEFAULT_ZONE_KEY, DEFAULT_ZONE)
            .iter()
            .map(|raw| parse_service_url(raw))
            .collect::<AppResult<Vec<_>>>()?;

        if enabled && service_urls.is_empty() {
            return Err(AppError::ConfigurationError(format!(
                "{} 에 레지스트리 주소가 없습니다",
                DEFAULT_ZONE_KEY
            )));
        }

        let registration_retries = props.get_parsed::<u32>("eureka.client.registration-retries", 3)?;
        if registration_retries == 0 {
            return Err(AppError::ConfigurationError(
                "eureka.client.registration-retries 값은 1 이상이어야 합니다".to_string(),
            ));
        }

        let retry_interval = Duration::from_secs(props.get_parsed::<u64>("eureka.client.retry-interval", 2)?);
        let request_timeout_secs = props.get_parsed::<u64>("eureka.client.request-timeout", 5)?;
        if request_timeout_secs == 0 {
            return Err(AppError::ConfigurationError(
                "eureka.client.request-timeout 값은 1 이상이어야 합니다".to_string(),
            ));
        }

        Ok(Self {
            enabled,
            service_urls,
            registration_retries,
            retry_interval,
            request_timeout: Duration::from_secs(request_timeout_secs),
            instance: InstanceConfig::from_properties(props, server)?,
        })
    }
}

impl InstanceConfig {
    pub fn from_properties(props: &PropertySource, server: &ServerConfig) -> AppResult<Self> {
        let hostname = props
            .get("eureka.instance.hostname")
            .or_else(|| props.get_env("HOSTNAME"))
            .unwrap_or_else(|| "localhost".to_string());

        let default_ip = if server.address.is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            server.address
        };
        let ip_address = props.get_parsed::<IpAddr>("eureka.instance.ip-address", default_ip)?;

        let lease_renewal_interval_secs =
            props.get_parsed::<u32>("eureka.instance.lease-renewal-interval-in-seconds", 30)?;
        let lease_expiration_duration_secs =
            props.get_parsed::<u32>("eureka.instance.lease-expiration-duration-in-seconds", 90)?;

        if lease_renewal_interval_secs == 0 {
            return Err(AppError::ConfigurationError(
                "eureka.instance.lease-renewal-interval-in-seconds 값은 1 이상이어야 합니다".to_string(),
            ));
        }
        if lease_renewal_interval_secs >= lease_expiration_duration_secs {
            return Err(AppError::ConfigurationError(format!(
                "lease 갱신 주기({}초)는 만료 시간({}초)보다 짧아야 합니다",
                lease_renewal_interval_secs, lease_expiration_duration_secs
            )));
        }

        Ok(Self {
            hostname,
            ip_address,
            prefer_ip_address: props.get_bool("eureka.instance.prefer-ip-address", false)?,
            instance_id: props.get("eureka.instance.instance-id"),
            lease_renewal_interval_secs,
            lease_expiration_duration_secs,
        })
    }

    /// 레지스트리에 광고할 호스트 이름을 반환합니다.
    pub fn advertised_host(&self) -> String {
        if self.prefer_ip_address {
            self.ip_address.to_string()
        } else {
            self.hostname.clone()
        }
    }

    pub fn lease_renewal_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.lease_renewal_interval_secs))
    }
}

/// 레지스트리 URL을 파싱하고 상대 경로 결합이 가능하도록 `/`로 끝나게 맞춥니다.
fn parse_service_url(raw: &str) -> AppResult<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    let url = Url::parse(&normalized).map_err(|e| {
        AppError::ConfigurationError(format!("{} 값이 올바르지 않습니다 ({}): {}", DEFAULT_ZONE_KEY, raw, e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::ConfigurationError(format!(
            "{} 는 http 또는 https 여야 합니다 ({})",
            DEFAULT_ZONE_KEY, other
        ))),
    }
}
