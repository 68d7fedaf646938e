//! 주문 서비스(commande-service) 메인 진입점
//!
//! 프로파일별 `.env` 파일과 로깅을 초기화한 뒤 애플리케이션을 실행합니다.
//! 시작에 실패하면 원인을 로그로 남기고 0이 아닌 종료 코드로 끝납니다.

use std::process::ExitCode;

use env_logger::Env;
use log::{error, info, warn};

use commande_service::application::CommandeServiceApplication;
use commande_service::config::{self, PropertySource};

#[actix_web::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // 로깅 초기화 전이라 결과는 아래에서 기록합니다
    let profile = startup_profile(&args);
    let env_file = config::load_profile_env(&profile);
    init_logging();

    info!("🚀 주문 서비스 시작중... (profile: {})", profile);
    match env_file {
        Some(file) => info!("{} 파일 로드 됨", file),
        None => warn!(".env.{} 또는 .env 파일이 없어 환경 변수와 기본값만 사용합니다", profile),
    }

    match CommandeServiceApplication::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ 주문 서비스를 시작할 수 없습니다: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// `.env` 파일을 고르기 위한 프로파일을 결정합니다.
///
/// 인자 파싱 오류는 여기서 무시하고, 설정 로드 단계에서 보고됩니다.
fn startup_profile(args: &[String]) -> String {
    let overrides = PropertySource::parse_args(args).unwrap_or_default();
    let props = PropertySource::new(overrides, std::env::vars().collect());
    config::active_profile(&props)
}

/// 로깅 시스템을 초기화합니다
///
/// # Environment Variables
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info,actix_web=info")
///
/// # Examples
///
/// ```bash
/// # 전체 debug 모드
/// RUST_LOG=debug cargo run
///
/// # 디스커버리만 debug
/// RUST_LOG=commande_service::discovery=debug cargo run
/// ```
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=info"));
}
