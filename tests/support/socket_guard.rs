use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "HARVESTER_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_ENV)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a mock API server, or returns `None` when localhost cannot be bound
/// (sandboxed runners). With `HARVESTER_REQUIRE_SOCKET_TESTS=1` that case
/// panics instead of skipping.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl std::future::Future<Output = Option<MockServer>> {
    let can_bind = TcpListener::bind("127.0.0.1:0").is_ok();
    if !can_bind {
        let caller = std::panic::Location::caller();
        assert!(
            !sockets_required(),
            "[mock-server] {}:{}: cannot bind localhost and {REQUIRE_ENV} is set",
            caller.file(),
            caller.line()
        );
        eprintln!(
            "[mock-server] {}:{}: cannot bind localhost, skipping",
            caller.file(),
            caller.line()
        );
    }
    async move {
        if can_bind {
            Some(MockServer::start().await)
        } else {
            None
        }
    }
}
