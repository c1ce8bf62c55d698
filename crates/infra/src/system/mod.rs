use chrono::Utc;

/// Source of the current time for every reminder run, so that runs
/// can be replayed at fixed instants in tests.
pub trait ISys: Send + Sync {
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64;
}

/// Wall clock, used everywhere outside of tests
pub struct RealSys {}

impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock frozen at the given timestamp in millis
#[derive(Debug, Clone, Copy)]
pub struct StaticSys(pub i64);

impl ISys for StaticSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0
    }
}
