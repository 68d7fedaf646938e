//! 레지스트리 인스턴스 레코드
//!
//! Eureka REST API(v2)의 JSON 표현과 1:1로 대응하는 타입들입니다.
//!
//! ```json
//! {
//!   "instance": {
//!     "instanceId": "host:commande-service:8080",
//!     "hostName": "host",
//!     "app": "COMMANDE-SERVICE",
//!     "ipAddr": "10.0.0.7",
//!     "vipAddress": "commande-service",
//!     "status": "UP",
//!     "port": { "$": 8080, "@enabled": "true" },
//!     "healthCheckUrl": "http://host:8080/actuator/health",
//!     "dataCenterInfo": {
//!       "@class": "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo",
//!       "name": "MyOwn"
//!     },
//!     "leaseInfo": { "renewalIntervalInSecs": 30, "durationInSecs": 90 }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::config::ApplicationConfig;

pub const DEFAULT_DATA_CENTER_CLASS: &str = "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo";
pub const HEALTH_CHECK_PATH: &str = "/actuator/health";
pub const STATUS_PAGE_PATH: &str = "/actuator/info";

/// 레지스트리에 보고하는 인스턴스 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Up,
    Down,
    Starting,
    OutOfService,
    #[default]
    Unknown,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Up => "UP",
            InstanceStatus::Down => "DOWN",
            InstanceStatus::Starting => "STARTING",
            InstanceStatus::OutOfService => "OUT_OF_SERVICE",
            InstanceStatus::Unknown => "UNKNOWN",
        }
    }
}

// 알 수 없는 상태 문자열은 `Unknown`으로 받습니다.
impl<'de> Deserialize<'de> for InstanceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_uppercase().as_str() {
            "UP" => InstanceStatus::Up,
            "DOWN" => InstanceStatus::Down,
            "STARTING" => InstanceStatus::Starting,
            "OUT_OF_SERVICE" => InstanceStatus::OutOfService,
            _ => InstanceStatus::Unknown,
        })
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortInfo {
    #[serde(rename = "$")]
    pub port: u16,
    #[serde(rename = "@enabled")]
    pub enabled: String,
}

impl PortInfo {
    pub fn new(port: u16, enabled: bool) -> Self {
        Self {
            port,
            enabled: enabled.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataCenterInfo {
    #[serde(rename = "@class")]
    pub class: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseInfo {
    pub renewal_interval_in_secs: u32,
    pub duration_in_secs: u32,
}

/// 레지스트리 인스턴스 레코드
///
/// 레지스트리 응답에는 빠진 필드가 있을 수 있으므로 모든 필드에 기본값을 둡니다.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceInfo {
    pub instance_id: String,
    pub host_name: String,
    pub app: String,
    pub ip_addr: String,
    pub vip_address: String,
    pub secure_vip_address: String,
    pub status: InstanceStatus,
    pub port: PortInfo,
    pub secure_port: PortInfo,
    pub home_page_url: String,
    pub status_page_url: String,
    pub health_check_url: String,
    pub data_center_info: DataCenterInfo,
    pub lease_info: LeaseInfo,
    pub metadata: HashMap<String, String>,
    #[serde(serialize_with = "timestamp_as_string", deserialize_with = "timestamp_from_any")]
    pub last_updated_timestamp: Option<i64>,
    #[serde(serialize_with = "timestamp_as_string", deserialize_with = "timestamp_from_any")]
    pub last_dirty_timestamp: Option<i64>,
}

impl InstanceInfo {
    /// 설정과 실제 바인딩된 포트로 이 프로세스의 인스턴스 레코드를 만듭니다.
    ///
    /// 인스턴스 ID를 명시하지 않은 경우
    /// - 고정 포트: `<hostname>:<app-name>:<port>`
    /// - 임의 포트(`server.port=0`): `<hostname>:<app-name>:<uuid 8자리>`
    pub fn for_application(config: &ApplicationConfig, bound_port: u16) -> Self {
        let instance = &config.discovery.instance;
        let app_name = &config.application_name;

        let instance_id = instance.instance_id.clone().unwrap_or_else(|| {
            if config.server.port == 0 {
                format!("{}:{}:{}", instance.hostname, app_name, &Uuid::new_v4().simple().to_string()[..8])
            } else {
                format!("{}:{}:{}", instance.hostname, app_name, bound_port)
            }
        });

        let host = instance.advertised_host();
        let base_url = format!("http://{}:{}", host, bound_port);
        let now = Utc::now().timestamp_millis();

        let mut metadata = HashMap::new();
        metadata.insert("profile".to_string(), config.profile.clone());
        metadata.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

        Self {
            instance_id,
            host_name: host,
            app: app_name.to_uppercase(),
            ip_addr: instance.ip_address.to_string(),
            vip_address: app_name.clone(),
            secure_vip_address: app_name.clone(),
            status: InstanceStatus::Up,
            port: PortInfo::new(bound_port, true),
            secure_port: PortInfo::new(443, false),
            home_page_url: format!("{}/", base_url),
            status_page_url: format!("{}{}", base_url, STATUS_PAGE_PATH),
            health_check_url: format!("{}{}", base_url, HEALTH_CHECK_PATH),
            data_center_info: DataCenterInfo {
                class: DEFAULT_DATA_CENTER_CLASS.to_string(),
                name: "MyOwn".to_string(),
            },
            lease_info: LeaseInfo {
                renewal_interval_in_secs: instance.lease_renewal_interval_secs,
                duration_in_secs: instance.lease_expiration_duration_secs,
            },
            metadata,
            last_updated_timestamp: Some(now),
            last_dirty_timestamp: Some(now),
        }
    }
}

/// 등록 요청 본문 `{"instance": {...}}`
#[derive(Debug, Serialize)]
pub struct InstanceEnvelope<'a> {
    pub instance: &'a InstanceInfo,
}

/// 애플리케이션 조회 응답 `{"application": {"name": ..., "instance": [...]}}`
#[derive(Debug, Deserialize)]
pub struct ApplicationEnvelope {
    pub application: Application,
}

#[derive(Debug, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instance: OneOrMany<InstanceInfo>,
}

/// 구형 레지스트리는 인스턴스가 하나일 때 배열 대신 객체를 돌려줍니다.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn timestamp_as_string<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.serialize_str(&ts.to_string()),
        None => serializer.serialize_none(),
    }
}

fn timestamp_from_any<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(ts)) => Some(ts),
        Some(Raw::Text(text)) => text.parse().ok(),
        None => None,
    })
}
