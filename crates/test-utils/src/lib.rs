pub mod builders;
pub mod fake_step;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for any single async test body.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-captured subscriber once per test binary.
///
/// Reads the same `STEPGRAPH_LOG` directives as the binary; quiet (`warn`)
/// when unset.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(stepgraph::logging::LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test after [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test timed out after {TEST_TIMEOUT:?}"))
}
