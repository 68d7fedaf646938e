//! 애플리케이션 라이프사이클 상태 관리
//!
//! 프로세스는 `Starting` → `Running` → `Stopped` 순서로 진행하며,
//! 시작 중 또는 실행 중 실패하면 `Failed`로 끝납니다.
//!
//! ```text
//!   Starting ──► Running ──► Stopped
//!      │            │
//!      └────► Failed ◄┘
//! ```
//!
//! `Stopped`와 `Failed`는 종료 상태이며 더 이상 전이할 수 없습니다.

use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::errors::{AppError, AppResult};

/// 관찰 가능한 프로세스 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// 설정 로딩, 바인딩, 레지스트리 등록 진행 중
    Starting,
    /// 요청 수신 및 레지스트리 등록 완료
    Running,
    /// 외부 종료 신호로 정상 종료됨
    Stopped,
    /// 시작 또는 실행 중 실패
    Failed,
}

impl LifecycleState {
    /// `self`에서 `next`로 전이할 수 있는지 확인합니다.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Starting, Running) | (Starting, Failed) | (Running, Stopped) | (Running, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Stopped | LifecycleState::Failed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Starting => "STARTING",
            LifecycleState::Running => "RUNNING",
            LifecycleState::Stopped => "STOPPED",
            LifecycleState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// 헬스 체크와 info 엔드포인트가 읽는 상태 스냅샷
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub state: LifecycleState,
    pub registered: bool,
    pub instance_id: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug)]
struct StateInner {
    state: LifecycleState,
    registered: bool,
    instance_id: Option<String>,
    started_at: DateTime<Utc>,
}

/// 스레드 간 공유되는 애플리케이션 상태
///
/// 쓰기는 애플리케이션 라이프사이클(시작/종료 경로)에서만 일어나고,
/// HTTP 워커 스레드의 액추에이터 핸들러가 읽습니다.
///
/// # Examples
///
/// ```rust,ignore
/// let state = ApplicationState::new();
/// state.transition(LifecycleState::Running)?;
/// assert_eq!(state.current()?, LifecycleState::Running);
/// ```
#[derive(Debug, Clone)]
pub struct ApplicationState {
    inner: Arc<RwLock<StateInner>>,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationState {
    /// `Starting` 상태로 새 상태 홀더를 생성합니다.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StateInner {
                state: LifecycleState::Starting,
                registered: false,
                instance_id: None,
                started_at: Utc::now(),
            })),
        }
    }

    /// 현재 라이프사이클 상태를 반환합니다.
    pub fn current(&self) -> AppResult<LifecycleState> {
        Ok(self.read()?.state)
    }

    /// 상태를 전이합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::LifecycleError` - 허용되지 않은 전이
    /// * `AppError::InternalError` - 락이 오염된 경우
    pub fn transition(&self, next: LifecycleState) -> AppResult<()> {
        let mut inner = self.write()?;
        if !inner.state.can_transition_to(next) {
            return Err(AppError::LifecycleError(format!(
                "{} 상태에서 {} 상태로 전이할 수 없습니다",
                inner.state, next
            )));
        }
        log::debug!("라이프사이클 전이: {} → {}", inner.state, next);
        inner.state = next;
        Ok(())
    }

    /// 실패 상태로 표시합니다. 이미 종료 상태라면 아무 것도 하지 않습니다.
    pub fn mark_failed(&self) {
        if let Ok(mut inner) = self.inner.write() {
            if !inner.state.is_terminal() {
                inner.state = LifecycleState::Failed;
            }
        }
    }

    /// 레지스트리 등록 여부와 인스턴스 ID를 기록합니다.
    pub fn set_registration(&self, instance_id: Option<String>, registered: bool) -> AppResult<()> {
        let mut inner = self.write()?;
        inner.registered = registered;
        if instance_id.is_some() {
            inner.instance_id = instance_id;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> AppResult<StateSnapshot> {
        let inner = self.read()?;
        Ok(StateSnapshot {
            state: inner.state,
            registered: inner.registered,
            instance_id: inner.instance_id.clone(),
            started_at: inner.started_at,
        })
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, StateInner>> {
        self.inner
            .read()
            .map_err(|e| AppError::InternalError(format!("상태 락 획득 실패: {}", e)))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, StateInner>> {
        self.inner
            .write()
            .map_err(|e| AppError::InternalError(format!("상태 락 획득 실패: {}", e)))
    }

    /// 락을 오염시킵니다. 락 실패 경로를 검증하는 테스트에서만 씁니다.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let inner = self.inner.clone();
        let _ = std::thread::spawn(move || {
            let _guard = inner.write();
            panic!("poisoning state lock");
        })
        .join();
    }
}
