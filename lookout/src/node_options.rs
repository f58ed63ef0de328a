use std::time::Duration;

/// Configuration values for a [LocalNode](crate::LocalNode).
#[derive(Debug, Clone, Copy)]
pub struct NodeOptions {
    pub(crate) call_timeout: Duration,
    pub(crate) noconnection_downs: bool,
}

impl NodeOptions {
    /// Constructs a new instance of [NodeOptions] with default values.
    pub const fn new() -> Self {
        Self {
            call_timeout: Duration::from_millis(5000),
            noconnection_downs: true,
        }
    }

    /// Configure the maximum amount of time a cross-node monitor request waits for its reply.
    ///
    /// The default timeout is 5000ms.
    pub const fn call_timeout(mut self, duration: Duration) -> Self {
        self.call_timeout = duration;
        self
    }

    /// Configure whether local watchers of processes on a node that goes down
    /// receive a `noconnection` process down message.
    ///
    /// When disabled, those monitors are discarded without a notification.
    pub const fn noconnection_downs(mut self, value: bool) -> Self {
        self.noconnection_downs = value;
        self
    }
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self::new()
    }
}
