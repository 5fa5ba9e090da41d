//! Clock port - abstraction for time and suspension
//!
//! This trait gives the runtime a monotonic millisecond clock and its
//! suspension primitive. The runtime is cooperatively scheduled: a sleep
//! suspends only the calling execution context, never the whole device.

/// Port for reading time and suspending the calling context
///
/// `now_ms` is milliseconds since boot and must be monotonic; schedule
/// boundaries are computed from it.
pub trait ClockPort {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Suspend the calling context for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64) -> impl core::future::Future<Output = ()>;

    /// Suspend the calling context until `deadline_ms` (milliseconds since
    /// boot). Returns immediately when the deadline has already passed.
    fn sleep_until_ms(&mut self, deadline_ms: u64) -> impl core::future::Future<Output = ()> {
        async move {
            let now = self.now_ms();
            if deadline_ms > now {
                self.sleep_ms(deadline_ms - now).await;
            }
        }
    }
}
