//! 설정 프로퍼티 소스
//!
//! Spring Boot의 `Environment`/`PropertySource` 체인을 단순화한 구현입니다.
//! 하나의 설정 키는 아래 순서로 조회됩니다.
//!
//! 1. 시작 인자 `--key=value` (예: `--server.port=9090`)
//! 2. 환경 변수 (relaxed binding: `server.port` → `SERVER_PORT`)
//! 3. 호출 측이 넘기는 기본값
//!
//! `.env.<profile>` 파일은 `main`에서 `dotenv`로 환경 변수에 먼저 적재되므로
//! 2번 단계에서 함께 조회됩니다.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::core::errors::{AppError, AppResult};

/// 시작 인자와 환경 변수 스냅샷으로 구성된 프로퍼티 조회기
#[derive(Debug, Clone, Default)]
pub struct PropertySource {
    overrides: HashMap<String, String>,
    env: HashMap<String, String>,
}

impl PropertySource {
    /// 명시적인 오버라이드와 환경 변수 맵으로 생성합니다.
    ///
    /// 테스트에서는 프로세스 환경 변수 대신 이 생성자를 사용합니다.
    pub fn new(overrides: HashMap<String, String>, env: HashMap<String, String>) -> Self {
        Self { overrides, env }
    }

    /// 시작 인자와 현재 프로세스 환경 변수로 생성합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigurationError` - `--key=value` 형식이 아닌 인자가 있는 경우
    pub fn from_args_and_env<I, S>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let overrides = Self::parse_args(args)?;
        Ok(Self::new(overrides, std::env::vars().collect()))
    }

    /// 시작 인자를 프로퍼티 오버라이드 맵으로 변환합니다.
    ///
    /// - `--server.port=9090` → `server.port = 9090`
    /// - `--eureka.client.enabled` → `eureka.client.enabled = true`
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let overrides = PropertySource::parse_args(["--server.port=9090"])?;
    /// assert_eq!(overrides["server.port"], "9090");
    /// ```
    pub fn parse_args<I, S>(args: I) -> AppResult<HashMap<String, String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = HashMap::new();

        for arg in args {
            let arg = arg.as_ref();
            let body = arg.strip_prefix("--").ok_or_else(|| {
                AppError::ConfigurationError(format!(
                    "알 수 없는 시작 인자입니다 ({}). --key=value 형식을 사용하세요",
                    arg
                ))
            })?;

            let (key, value) = match body.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (body.trim(), "true"),
            };

            if key.is_empty() {
                return Err(AppError::ConfigurationError(format!(
                    "시작 인자에 키가 없습니다: {}",
                    arg
                )));
            }

            overrides.insert(key.to_string(), value.to_string());
        }

        Ok(overrides)
    }

    /// 프로퍼티 키를 환경 변수 이름으로 변환합니다.
    ///
    /// `.`과 `-`를 `_`로 바꾸고 대문자로 변환합니다.
    pub fn relaxed_env_name(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }

    /// 프로퍼티 값을 조회합니다. 공백만 있는 값은 없는 것으로 취급합니다.
    pub fn get(&self, key: &str) -> Option<String> {
        self.overrides
            .get(key)
            .or_else(|| self.env.get(&Self::relaxed_env_name(key)))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// 환경 변수 이름 그대로 조회합니다. (`PROFILE`, `HOSTNAME` 등)
    pub fn get_env(&self, name: &str) -> Option<String> {
        self.env
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 키가 명시되어 있지만 값이 비어 있는지 확인합니다. (`--key=`, `KEY=`)
    pub fn is_blank(&self, key: &str) -> bool {
        self.overrides
            .get(key)
            .or_else(|| self.env.get(&Self::relaxed_env_name(key)))
            .is_some_and(|value| value.trim().is_empty())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// 값을 `T`로 파싱합니다. 값이 없으면 기본값을 사용합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ConfigurationError` - 값이 있지만 파싱할 수 없는 경우
    pub fn get_parsed<T>(&self, key: &str, default: T) -> AppResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => raw.parse::<T>().map_err(|e| {
                AppError::ConfigurationError(format!("{} 값이 올바르지 않습니다 ({}): {}", key, raw, e))
            }),
            None => Ok(default),
        }
    }

    /// 불리언 값을 조회합니다. `true`/`false`만 허용합니다. (대소문자 무관)
    pub fn get_bool(&self, key: &str, default: bool) -> AppResult<bool> {
        match self.get(key) {
            Some(raw) => match raw.to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(AppError::ConfigurationError(format!(
                    "{} 값은 true 또는 false여야 합니다 ({})",
                    key, raw
                ))),
            },
            None => Ok(default),
        }
    }

    /// 쉼표로 구분된 목록을 조회합니다. 빈 항목은 버립니다.
    pub fn get_list(&self, key: &str, default: &str) -> Vec<String> {
        self.get_or(key, default)
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}
