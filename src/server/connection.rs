// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use std::cell::Cell;
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::config::{AppState, PerformanceConfig};
use crate::handler;
use crate::http;
use crate::logger;

/// Accept a connection, enforcing the connection limit.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.access_log_enabled() {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Connection timeouts taken from the performance settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timeouts {
    /// Wait for the first request
    first_request: Duration,
    /// Idle time between keep-alive requests; zero disables keep-alive
    keep_alive: Duration,
    /// Time allowed to produce a single response
    response: Duration,
}

impl Timeouts {
    const fn from_config(performance: &PerformanceConfig) -> Self {
        Self {
            first_request: Duration::from_secs(performance.read_timeout),
            keep_alive: Duration::from_secs(performance.keep_alive_timeout),
            response: Duration::from_secs(performance.write_timeout),
        }
    }

    /// How long the connection may stay idle given what it has served
    const fn idle_limit(&self, served: u64) -> Duration {
        if served == 0 {
            self.first_request
        } else {
            self.keep_alive
        }
    }
}

/// Request bookkeeping for one connection
struct Activity {
    in_flight: Cell<usize>,
    served: Cell<u64>,
    last_seen: Cell<Instant>,
    /// Signalled when a request starts or finishes
    changed: Notify,
}

impl Activity {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            in_flight: Cell::new(0),
            served: Cell::new(0),
            last_seen: Cell::new(Instant::now()),
            changed: Notify::new(),
        })
    }

    fn begin(self: &Rc<Self>) -> InFlight {
        self.in_flight.set(self.in_flight.get() + 1);
        self.changed.notify_one();
        InFlight(Rc::clone(self))
    }

    /// When the connection becomes idle for too long, or `None` while a
    /// request is being served
    fn idle_deadline(&self, timeouts: &Timeouts) -> Option<Instant> {
        (self.in_flight.get() == 0)
            .then(|| self.last_seen.get() + timeouts.idle_limit(self.served.get()))
    }
}

/// Marks a request as in progress until dropped
struct InFlight(Rc<Activity>);

impl Drop for InFlight {
    fn drop(&mut self) {
        let activity = &self.0;
        activity.in_flight.set(activity.in_flight.get() - 1);
        activity.served.set(activity.served.get() + 1);
        activity.last_seen.set(Instant::now());
        activity.changed.notify_one();
    }
}

/// Serve one connection in a local task.
///
/// A connection that sends no request within the read timeout is dropped.
/// After that it is closed gracefully once idle past the keep-alive timeout.
/// The counter is decremented when it ends.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);
        let timeouts = Timeouts::from_config(&state.config.performance);
        let activity = Activity::new();

        let mut builder = http1::Builder::new();
        builder.keep_alive(!timeouts.keep_alive.is_zero());

        let service_state = Arc::clone(&state);
        let service_activity = Rc::clone(&activity);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                let in_flight = service_activity.begin();
                async move {
                    let response = tokio::time::timeout(
                        timeouts.response,
                        handler::handle_request(req, state, Some(peer_addr)),
                    )
                    .await
                    .unwrap_or_else(|_| {
                        logger::log_warning(&format!(
                            "Response for {peer_addr} not ready after {} seconds",
                            timeouts.response.as_secs()
                        ));
                        Ok(http::build_500_response())
                    });
                    drop(in_flight);
                    response
                }
            }),
        );
        tokio::pin!(conn);

        let mut closing = false;
        loop {
            let deadline = activity
                .idle_deadline(&timeouts)
                .filter(|_| !closing);

            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(err) = result {
                        logger::log_connection_error(&err);
                    }
                    break;
                }
                // Recompute the deadline
                () = activity.changed.notified() => {}
                () = sleep_until(deadline) => {
                    if activity.idle_deadline(&timeouts).is_some_and(|d| d <= Instant::now()) {
                        if activity.served.get() == 0 {
                            logger::log_debug(&format!("No request from {peer_addr}, dropping connection"));
                            break;
                        }
                        logger::log_debug(&format!("Closing idle connection from {peer_addr}"));
                        conn.as_mut().graceful_shutdown();
                        closing = true;
                    }
                }
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Sleep until `deadline`, or forever without one
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeouts() -> Timeouts {
        Timeouts {
            first_request: Duration::from_secs(30),
            keep_alive: Duration::from_secs(75),
            response: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_timeouts_from_config() {
        let performance = PerformanceConfig {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        };
        assert_eq!(Timeouts::from_config(&performance), timeouts());
    }

    #[test]
    fn test_idle_limit_switches_after_first_request() {
        let t = timeouts();
        assert_eq!(t.idle_limit(0), Duration::from_secs(30));
        assert_eq!(t.idle_limit(1), Duration::from_secs(75));
    }

    #[tokio::test]
    async fn test_no_idle_deadline_while_serving() {
        let t = timeouts();
        let activity = Activity::new();
        let started = activity.last_seen.get();
        assert_eq!(activity.idle_deadline(&t), Some(started + t.first_request));

        let in_flight = activity.begin();
        assert_eq!(activity.idle_deadline(&t), None);

        drop(in_flight);
        assert_eq!(activity.served.get(), 1);
        let deadline = activity.idle_deadline(&t).unwrap();
        assert!(deadline >= started + t.keep_alive);
    }
}
