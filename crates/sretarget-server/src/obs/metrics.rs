//! Metrics registry for the service.
//!
//! Counter and histogram types with dynamic labels backed by `DashMap`. Labels
//! are flattened into sorted key vectors and series are sorted again at render
//! time so the exposition is deterministic. Durations are accumulated as
//! integer microseconds and rendered in seconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use sretarget_core::ProbeState;

/// Metric name prefix.
pub const NAMESPACE: &str = "app";

/// Latency bucket upper bounds in microseconds:
/// 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s.
pub const DURATION_BUCKETS_MICROS: [u64; 11] = [
    5_000, 10_000, 25_000, 50_000, 100_000, 250_000, 500_000, 1_000_000, 2_500_000, 5_000_000,
    10_000_000,
];

/// Status recorded when a request unwinds out of the handler chain.
const PANIC_STATUS: u16 = 500;
/// Status recorded when the client goes away before a response exists.
const CANCELLED_STATUS: u16 = 499;

type LabelKey = Vec<(String, String)>;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn micros_as_secs(micros: u64) -> f64 {
    micros as f64 / 1_000_000.0
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for one label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum across every label set.
    pub fn total(&self) -> u64 {
        self.map.iter().map(|r| r.value().load(Ordering::Relaxed)).sum()
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "counter");
        let mut series: Vec<(LabelKey, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        series.sort();
        for (key, val) in series {
            if key.is_empty() {
                let _ = writeln!(out, "{} {}", name, val);
            } else {
                let _ = writeln!(out, "{}{{{}}} {}", name, label_str(&key), val);
            }
        }
    }
}

struct AtomicHistogram {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: [AtomicU64; DURATION_BUCKETS_MICROS.len()],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicHistogram::default);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_micros.fetch_add(micros, Ordering::Relaxed);

        // Cumulative: every bucket whose bound is >= the value.
        for (i, &b) in DURATION_BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Observation count for one label set.
    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "histogram");
        let mut keys: Vec<LabelKey> = self.map.iter().map(|r| r.key().clone()).collect();
        keys.sort();

        for key in keys {
            let Some(hist) = self.map.get(&key) else { continue };
            let labels = label_str(&key);
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{},", labels)
            };

            for (i, &le) in DURATION_BUCKETS_MICROS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(
                    out,
                    "{}_bucket{{{}le=\"{}\"}} {}",
                    name,
                    prefix,
                    micros_as_secs(le),
                    count
                );
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = micros_as_secs(hist.sum_micros.load(Ordering::Relaxed));
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

/// All metric families exposed by the service.
pub struct ServiceMetrics {
    requests: CounterVec,
    duration: HistogramVec,
    in_flight: AtomicI64,
    chaos_errors: CounterVec,
    chaos_delay_micros: AtomicU64,
    version: String,
    commit: String,
    started_at_secs: f64,
}

impl ServiceMetrics {
    pub fn new(version: &str, commit: &str) -> Self {
        let started_at_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        Self {
            requests: CounterVec::default(),
            duration: HistogramVec::default(),
            in_flight: AtomicI64::new(0),
            chaos_errors: CounterVec::default(),
            chaos_delay_micros: AtomicU64::new(0),
            version: version.to_owned(),
            commit: commit.to_owned(),
            started_at_secs,
        }
    }

    /// Record one served request against its matched route pattern.
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        let status = status.to_string();
        self.duration
            .observe(&[("method", method), ("path", route)], duration);
        self.requests.inc(&[
            ("method", method),
            ("path", route),
            ("status", status.as_str()),
        ]);
    }

    pub fn inc_in_flight(&self) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
    }

    pub fn dec_in_flight(&self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn in_flight(&self) -> i64 {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start tracking a request: bumps in-flight now, records on drop.
    pub fn begin(self: &Arc<Self>, method: &str, route: &str) -> RequestObservation {
        self.inc_in_flight();
        RequestObservation {
            metrics: Arc::clone(self),
            method: method.to_owned(),
            route: route.to_owned(),
            start: Instant::now(),
            status: None,
        }
    }

    pub fn record_chaos_error(&self) {
        self.chaos_errors.inc(&[]);
    }

    pub fn record_chaos_delay(&self, delay: Duration) {
        let micros = u64::try_from(delay.as_micros()).unwrap_or(u64::MAX);
        self.chaos_delay_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Served-request count for `(method, route, status)`.
    pub fn request_count(&self, method: &str, route: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.requests.get(&[
            ("method", method),
            ("path", route),
            ("status", status.as_str()),
        ])
    }

    /// Latency observations for `(method, route)`, across all statuses.
    pub fn latency_samples(&self, method: &str, route: &str) -> u64 {
        self.duration.count(&[("method", method), ("path", route)])
    }

    pub fn total_requests(&self) -> u64 {
        self.requests.total()
    }

    pub fn chaos_errors(&self) -> u64 {
        self.chaos_errors.total()
    }

    /// Total delay slept by the chaos stage.
    pub fn chaos_delay_total(&self) -> Duration {
        Duration::from_micros(self.chaos_delay_micros.load(Ordering::Relaxed))
    }

    /// Render every family in Prometheus text exposition format.
    pub fn render(&self, probes: &ProbeState) -> String {
        let mut out = String::new();

        self.requests.render(
            &format!("{NAMESPACE}_http_requests_total"),
            "Total number of HTTP requests",
            &mut out,
        );
        self.duration.render(
            &format!("{NAMESPACE}_http_request_duration_seconds"),
            "Duration of HTTP requests in seconds",
            &mut out,
        );

        let name = format!("{NAMESPACE}_http_in_flight_requests");
        write_header(&mut out, &name, "Current number of in-flight requests", "gauge");
        let _ = writeln!(out, "{} {}", name, self.in_flight());

        let name = format!("{NAMESPACE}_chaos_injected_errors_total");
        write_header(&mut out, &name, "Requests rejected by the chaos stage", "counter");
        let _ = writeln!(out, "{} {}", name, self.chaos_errors());

        let name = format!("{NAMESPACE}_chaos_injected_delay_seconds_total");
        write_header(&mut out, &name, "Total delay injected by the chaos stage", "counter");
        let delay = micros_as_secs(self.chaos_delay_micros.load(Ordering::Relaxed));
        let _ = writeln!(out, "{} {}", name, delay);

        let name = format!("{NAMESPACE}_probe_status");
        write_header(&mut out, &name, "Probe flag state (1 = passing)", "gauge");
        let _ = writeln!(out, "{}{{probe=\"live\"}} {}", name, u8::from(probes.is_live()));
        let _ = writeln!(out, "{}{{probe=\"ready\"}} {}", name, u8::from(probes.is_ready()));

        let name = format!("{NAMESPACE}_build_info");
        write_header(&mut out, &name, "Build metadata", "gauge");
        let _ = writeln!(
            out,
            "{}{{commit=\"{}\",version=\"{}\"}} 1",
            name,
            escape_label(&self.commit),
            escape_label(&self.version)
        );

        let name = format!("{NAMESPACE}_process_start_time_seconds");
        write_header(&mut out, &name, "Start time of the process since unix epoch", "gauge");
        let _ = writeln!(out, "{} {}", name, self.started_at_secs);

        out
    }
}

/// In-flight guard for one request.
///
/// Created by [`ServiceMetrics::begin`]. Dropping it records the outcome and
/// decrements the in-flight gauge, whichever way the request ends.
pub struct RequestObservation {
    metrics: Arc<ServiceMetrics>,
    method: String,
    route: String,
    start: Instant,
    status: Option<u16>,
}

impl RequestObservation {
    /// Record the final status and release the in-flight slot.
    pub fn finish(mut self, status: u16) {
        self.status = Some(status);
    }
}

impl Drop for RequestObservation {
    fn drop(&mut self) {
        let status = self.status.unwrap_or(if std::thread::panicking() {
            PANIC_STATUS
        } else {
            CANCELLED_STATUS
        });
        self.metrics
            .record_request(&self.method, &self.route, status, self.start.elapsed());
        self.metrics.dec_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Arc<ServiceMetrics> {
        Arc::new(ServiceMetrics::new("1.2.3", "deadbeef"))
    }

    #[test]
    fn counts_by_route_pattern_and_status() {
        let m = metrics();
        m.record_request("GET", "/status/{code}", 418, Duration::from_millis(1));
        m.record_request("GET", "/status/{code}", 418, Duration::from_millis(1));
        m.record_request("GET", "/status/{code}", 200, Duration::from_millis(1));

        assert_eq!(m.request_count("GET", "/status/{code}", 418), 2);
        assert_eq!(m.request_count("GET", "/status/{code}", 200), 1);
        assert_eq!(m.total_requests(), 3);
        assert_eq!(m.latency_samples("GET", "/status/{code}"), 3);
        assert_eq!(m.latency_samples("POST", "/status/{code}"), 0);
    }

    #[test]
    fn chaos_delay_accumulates() {
        let m = metrics();
        m.record_chaos_delay(Duration::from_millis(3));
        m.record_chaos_delay(Duration::from_millis(4));
        assert_eq!(m.chaos_delay_total(), Duration::from_millis(7));
        assert!(m
            .render(&ProbeState::new())
            .contains("app_chaos_injected_delay_seconds_total 0.007"));
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let m = metrics();
        m.record_request("GET", "/", 200, Duration::from_millis(30));
        let text = m.render(&ProbeState::new());

        assert!(text.contains(
            "app_http_request_duration_seconds_bucket{method=\"GET\",path=\"/\",le=\"0.025\"} 0"
        ));
        assert!(text.contains(
            "app_http_request_duration_seconds_bucket{method=\"GET\",path=\"/\",le=\"0.05\"} 1"
        ));
        assert!(text.contains(
            "app_http_request_duration_seconds_bucket{method=\"GET\",path=\"/\",le=\"10\"} 1"
        ));
        assert!(text.contains(
            "app_http_request_duration_seconds_bucket{method=\"GET\",path=\"/\",le=\"+Inf\"} 1"
        ));
        assert!(text.contains("app_http_request_duration_seconds_count{method=\"GET\",path=\"/\"} 1"));
    }

    #[test]
    fn guard_releases_in_flight_and_records() {
        let m = metrics();
        let obs = m.begin("GET", "/healthz");
        assert_eq!(m.in_flight(), 1);
        obs.finish(200);
        assert_eq!(m.in_flight(), 0);
        assert_eq!(m.request_count("GET", "/healthz", 200), 1);
    }

    #[test]
    fn dropped_guard_counts_as_cancelled() {
        let m = metrics();
        drop(m.begin("GET", "/delay/{seconds}"));
        assert_eq!(m.in_flight(), 0);
        assert_eq!(m.request_count("GET", "/delay/{seconds}", CANCELLED_STATUS), 1);
    }

    #[test]
    fn unwinding_guard_counts_as_500() {
        let m = metrics();
        let m2 = Arc::clone(&m);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _obs = m2.begin("GET", "/boom");
            panic!("handler blew up");
        }));
        assert!(res.is_err());
        assert_eq!(m.in_flight(), 0);
        assert_eq!(m.request_count("GET", "/boom", 500), 1);
    }

    #[test]
    fn render_includes_probe_and_build_families() {
        let m = metrics();
        let probes = ProbeState::new();
        probes.set_ready(false);
        let text = m.render(&probes);

        assert!(text.contains("# TYPE app_http_requests_total counter"));
        assert!(text.contains("# TYPE app_http_in_flight_requests gauge"));
        assert!(text.contains("app_http_in_flight_requests 0"));
        assert!(text.contains("app_probe_status{probe=\"live\"} 1"));
        assert!(text.contains("app_probe_status{probe=\"ready\"} 0"));
        assert!(text.contains("app_build_info{commit=\"deadbeef\",version=\"1.2.3\"} 1"));
    }

    #[test]
    fn label_values_are_escaped() {
        assert_eq!(escape_label("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }
}
