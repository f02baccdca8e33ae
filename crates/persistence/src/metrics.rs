//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Histogram of repository query latency, labelled by query name.
pub const QUERY_DURATION_METRIC: &str = "tools_db_query_duration_seconds";

/// Record database query duration.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(QUERY_DURATION_METRIC, "query" => query_name.to_string()).record(duration_secs);
}

/// Record database connection pool gauges.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("tools_db_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("tools_db_connections_idle").set(idle as f64);
}

/// Times a single repository call.
///
/// ```ignore
/// let timer = QueryTimer::new("find_component_by_id");
/// let result = sqlx::query_as::<_, ComponentEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}
