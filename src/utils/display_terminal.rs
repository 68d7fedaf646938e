//! 터미널 출력 포맷팅 유틸리티
//!
//! 애플리케이션 시작 과정에서 사용되는 터미널 출력 함수들을 제공합니다.
//! 박스 형태의 제목, 진행 단계 표시, 시작 완료 요약을 시각적으로 표현합니다.

use std::net::SocketAddr;

const BOX_WIDTH: usize = 50;

/// 박스 안에 가운데 정렬된 제목 문자열을 만듭니다.
pub fn boxed_title(title: &str) -> String {
    let border = "═".repeat(BOX_WIDTH);
    format!("╔{}╗\n║{:^width$}║\n╚{}╝", border, title, border, width = BOX_WIDTH - 1)
}

/// 박스 형태로 둘러싸인 제목을 출력합니다
///
/// # Examples
///
/// ```rust,ignore
/// use crate::utils::display_terminal::print_boxed_title;
///
/// print_boxed_title("🚀 COMMANDE SERVICE STARTING");
/// ```
///
/// Output:
/// ```text
/// ╔══════════════════════════════════════════════════╗
/// ║           🚀 COMMANDE SERVICE STARTING           ║
/// ╚══════════════════════════════════════════════════╝
/// ```
pub fn print_boxed_title(title: &str) {
    println!("{}", boxed_title(title));
}

/// 진행 단계 시작을 표시합니다
///
/// Output:
/// ```text
/// → Step 1: Binding HTTP listener
/// ```
pub fn print_step_start(step: u8, description: &str) {
    println!("→ Step {}: {}", step, description);
}

/// 진행 단계 완료를 표시합니다
///
/// Output:
/// ```text
/// ✓ Step 1: HTTP listener bound (0.0.0.0:8080)
/// ```
pub fn print_step_complete(step: u8, description: &str, detail: &str) {
    println!("✓ Step {}: {} ({})", step, description, detail);
}

/// 서브 작업의 상태를 표시합니다
pub fn print_sub_task(name: &str, status: &str) {
    println!("   ├─ {}: {}", name, status);
}

/// 시작 완료 요약을 만듭니다.
pub fn startup_summary(service: &str, addr: SocketAddr, instance_id: Option<&str>) -> String {
    let mut lines = vec![
        String::new(),
        boxed_title("🎉 COMMANDE SERVICE RUNNING"),
        format!("   📦 Service: {}", service),
        format!("   🌐 Listening: http://{}", addr),
        format!("   📍 Health check: http://{}/actuator/health", addr),
    ];
    match instance_id {
        Some(id) => lines.push(format!("   🔗 Registered as: {}", id)),
        None => lines.push("   🔗 Discovery: disabled".to_string()),
    }
    lines.push(String::new());
    lines.join("\n")
}

/// 시작 완료 요약을 출력합니다
///
/// Output:
/// ```text
/// ╔══════════════════════════════════════════════════╗
/// ║           🎉 COMMANDE SERVICE RUNNING            ║
/// ╚══════════════════════════════════════════════════╝
///    📦 Service: commande-service
///    🌐 Listening: http://0.0.0.0:8080
///    📍 Health check: http://0.0.0.0:8080/actuator/health
///    🔗 Registered as: host:commande-service:8080
/// ```
pub fn print_startup_summary(service: &str, addr: SocketAddr, instance_id: Option<&str>) {
    println!("{}", startup_summary(service, addr, instance_id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_title_has_three_lines() {
        let boxed = boxed_title("Hello");
        let lines: Vec<&str> = boxed.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("Hello"));
        assert!(lines[0].starts_with('╔'));
    }

    #[test]
    fn test_startup_summary_mentions_registration() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();

        let registered = startup_summary("commande-service", addr, Some("h:commande-service:8080"));
        assert!(registered.contains("Registered as: h:commande-service:8080"));

        let standalone = startup_summary("commande-service", addr, None);
        assert!(standalone.contains("Discovery: disabled"));
    }
}
