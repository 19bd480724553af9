//! Test server harnesses for E2E testing
//!
//! Provides `TestCourseServer`, `TestForumServer` and `TestQuizServer` for
//! spawning real service instances in tests. All servers bind random
//! loopback ports, use [`TEST_JWT_SECRET`](crate::tokens::TEST_JWT_SECRET)
//! and stop when dropped.

use crate::tokens::{test_decoder, TEST_JWT_SECRET};
use common::course_client::CourseCheck;
use common::gate::AuthorizationGate;
use common::observability::detached_metrics_handle;
use sqlx::PgPool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

fn base_vars() -> HashMap<String, String> {
    HashMap::from([
        (
            "DATABASE_URL".to_string(),
            "postgresql://test/test".to_string(),
        ),
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
    ])
}

async fn bind_loopback() -> Result<(TcpListener, SocketAddr), anyhow::Error> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;
    let addr = listener
        .local_addr()
        .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;
    Ok((listener, addr))
}

fn serve_http(listener: TcpListener, app: axum::Router) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("Test server error: {}", e);
        }
    })
}

/// Test harness for the course service: HTTP API plus the gRPC check server.
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations/course")]
/// async fn test_health(pool: PgPool) -> Result<()> {
///     let server = TestCourseServer::spawn(pool).await?;
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestCourseServer {
    addr: SocketAddr,
    grpc_addr: SocketAddr,
    pool: PgPool,
    config: course_service::config::Config,
    cancel: CancellationToken,
    _handle: JoinHandle<()>,
}

impl TestCourseServer {
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        let mut vars = base_vars();
        vars.insert(
            "COURSE_GRPC_BIND_ADDRESS".to_string(),
            "127.0.0.1:0".to_string(),
        );
        let config = course_service::config::Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(course_service::routes::AppState {
            pool: pool.clone(),
            config: config.clone(),
        });
        let app = course_service::routes::build_routes(state, detached_metrics_handle());

        let (listener, addr) = bind_loopback().await?;
        let (grpc_listener, grpc_addr) = bind_loopback().await?;

        let cancel = CancellationToken::new();
        let grpc_pool = Arc::new(pool.clone());
        let grpc_cancel = cancel.clone();
        let max_concurrent = config.grpc_max_concurrent_requests;
        tokio::spawn(async move {
            if let Err(e) =
                course_service::grpc::serve(grpc_listener, grpc_pool, max_concurrent, grpc_cancel)
                    .await
            {
                eprintln!("Test gRPC server error: {}", e);
            }
        });

        let handle = serve_http(listener, app);

        Ok(Self {
            addr,
            grpc_addr,
            pool,
            config,
            cancel,
            _handle: handle,
        })
    }

    /// Get the base URL of the HTTP API.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `host:port` of the gRPC check server.
    pub fn grpc_endpoint(&self) -> String {
        self.grpc_addr.to_string()
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &course_service::config::Config {
        &self.config
    }
}

impl Drop for TestCourseServer {
    fn drop(&mut self) {
        self.cancel.cancel();
        self._handle.abort();
    }
}

/// Test harness for the forum service.
///
/// `courses` answers the gate's lookups; pass a `MockCourseCheck` for
/// handler tests or a `CourseClient` pointed at a running authority for
/// cross-service tests.
pub struct TestForumServer {
    addr: SocketAddr,
    pool: PgPool,
    _handle: JoinHandle<()>,
}

impl TestForumServer {
    pub async fn spawn(pool: PgPool, courses: Arc<dyn CourseCheck>) -> Result<Self, anyhow::Error> {
        let config = forum_service::config::from_vars(&base_vars())
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(forum_service::routes::AppState {
            pool: pool.clone(),
            config,
            gate: AuthorizationGate::new(courses, Arc::new(test_decoder())),
        });
        let app = forum_service::routes::build_routes(state, detached_metrics_handle());

        let (listener, addr) = bind_loopback().await?;
        let handle = serve_http(listener, app);

        Ok(Self {
            addr,
            pool,
            _handle: handle,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL of one course's discussion board.
    pub fn discussions_url(&self, course_id: i32) -> String {
        format!("{}/v1/courses/{}/discussions", self.url(), course_id)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Drop for TestForumServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

/// Test harness for the quiz service.
pub struct TestQuizServer {
    addr: SocketAddr,
    pool: PgPool,
    _handle: JoinHandle<()>,
}

impl TestQuizServer {
    pub async fn spawn(pool: PgPool, courses: Arc<dyn CourseCheck>) -> Result<Self, anyhow::Error> {
        let config = quiz_service::config::from_vars(&base_vars())
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(quiz_service::routes::AppState {
            pool: pool.clone(),
            config,
            gate: AuthorizationGate::new(courses, Arc::new(test_decoder())),
        });
        let app = quiz_service::routes::build_routes(state, detached_metrics_handle());

        let (listener, addr) = bind_loopback().await?;
        let handle = serve_http(listener, app);

        Ok(Self {
            addr,
            pool,
            _handle: handle,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL of one course's quizzes.
    pub fn quizzes_url(&self, course_id: i32) -> String {
        format!("{}/v1/courses/{}/quizzes", self.url(), course_id)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Drop for TestQuizServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
