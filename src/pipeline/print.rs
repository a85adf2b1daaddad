//! PDF printing: load the assembled HTML into headless Chrome and print it.
//!
//! ## Why a trait?
//!
//! The browser is a heavyweight external process. [`PdfRenderer`] is the only
//! thing the orchestration knows about it, so tests swap in an in-memory fake
//! and library users can plug in another engine without touching the rest of
//! the pipeline.
//!
//! ## Readiness
//!
//! `wait_until_navigated` only covers the load event. Web fonts, late images
//! and script-issued requests can still be in flight, so a [`NetworkMonitor`]
//! follows the tab's `Network.requestWillBeSent` / `loadingFinished` /
//! `loadingFailed` events from before navigation. After navigation the page
//! is polled until [`IdleTracker`] reports a quiet window: document complete,
//! every image complete, fonts loaded, zero requests in flight and none
//! started for `idle_window`. Navigation and settling share one deadline of
//! `timeout`; a page that never settles fails with [`RenderError::Timeout`]
//! instead of hanging.
//!
//! ## Lifetime
//!
//! The browser lives inside a [`BrowserSession`]. Dropping the session shuts
//! the browser down, so every exit path (success, `?` error, panic unwind)
//! releases the child process.

use crate::config::MAX_RENDER_TIMEOUT_SECS;
use crate::error::{Md2PdfError, RenderError};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Network;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// CSS pixels per inch, the unit conversion Chrome applies to print margins.
const CSS_PX_PER_INCH: f64 = 96.0;

/// How often the page is probed while waiting for it to settle.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Extra lifetime for the DevTools connection beyond the page deadline.
const BROWSER_IDLE_GRACE: Duration = Duration::from_secs(5);

// ── Print options ────────────────────────────────────────────────────────

/// Paper sizes understood by the printer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    /// 210 × 297 mm (default).
    #[default]
    A4,
    /// 8.5 × 11 in.
    Letter,
    /// 8.5 × 14 in.
    Legal,
    /// Arbitrary width × height in inches.
    Custom { width_in: f64, height_in: f64 },
}

impl PaperSize {
    /// Portrait (width, height) in inches.
    pub fn dimensions_in(self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (210.0 / 25.4, 297.0 / 25.4),
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::Legal => (8.5, 14.0),
            PaperSize::Custom {
                width_in,
                height_in,
            } => (width_in, height_in),
        }
    }
}

/// Page margins in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    /// The same margin on all four sides.
    pub fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(40.0)
    }
}

/// Page geometry and paint options for a print.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintOptions {
    /// Default: A4.
    pub paper: PaperSize,
    /// Default: 40px on every side.
    pub margins: Margins,
    /// Print background colours and images. Default: true.
    ///
    /// Browsers drop backgrounds when printing unless told otherwise, which
    /// would lose the code-block and table-header shading.
    pub print_background: bool,
    /// Default: false.
    pub landscape: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            paper: PaperSize::default(),
            margins: Margins::default(),
            print_background: true,
            landscape: false,
        }
    }
}

impl PrintOptions {
    /// Reject geometry that leaves no printable area.
    pub fn validate(&self) -> Result<(), Md2PdfError> {
        let (w, h) = self.paper.dimensions_in();
        if !(w > 0.0 && h > 0.0) {
            return Err(Md2PdfError::InvalidConfig(format!(
                "Paper size must be positive, got {w}×{h} in"
            )));
        }
        let m = &self.margins;
        if [m.top, m.right, m.bottom, m.left].iter().any(|v| *v < 0.0) {
            return Err(Md2PdfError::InvalidConfig("Margins must be ≥ 0".into()));
        }
        let (w, h) = if self.landscape { (h, w) } else { (w, h) };
        if (m.left + m.right) / CSS_PX_PER_INCH >= w || (m.top + m.bottom) / CSS_PX_PER_INCH >= h {
            return Err(Md2PdfError::InvalidConfig(
                "Margins leave no printable area on the page".into(),
            ));
        }
        Ok(())
    }

    /// Translate into the DevTools `Page.printToPDF` parameters.
    ///
    /// Chrome takes paper size and margins in inches and applies `landscape`
    /// itself, so the portrait dimensions are always passed.
    pub fn to_cdp(&self) -> PrintToPdfOptions {
        let (width, height) = self.paper.dimensions_in();
        PrintToPdfOptions {
            landscape: Some(self.landscape),
            print_background: Some(self.print_background),
            paper_width: Some(width),
            paper_height: Some(height),
            margin_top: Some(self.margins.top / CSS_PX_PER_INCH),
            margin_bottom: Some(self.margins.bottom / CSS_PX_PER_INCH),
            margin_left: Some(self.margins.left / CSS_PX_PER_INCH),
            margin_right: Some(self.margins.right / CSS_PX_PER_INCH),
            prefer_css_page_size: Some(false),
            ..Default::default()
        }
    }
}

// ── Renderer seam ────────────────────────────────────────────────────────

/// Anything that can turn a complete HTML document into a PDF file.
///
/// Implementations are called from a blocking thread and must write the PDF
/// to `destination` only when the whole render succeeded.
pub trait PdfRenderer: Send + Sync {
    fn render(&self, html: &str, destination: &Path, options: &PrintOptions)
        -> Result<(), RenderError>;
}

/// Headless Chrome/Chromium renderer over the DevTools protocol.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    chrome_path: Option<PathBuf>,
    sandbox: bool,
    timeout: Duration,
    idle_window: Duration,
}

impl Default for ChromeRenderer {
    fn default() -> Self {
        Self {
            chrome_path: None,
            sandbox: true,
            timeout: Duration::from_secs(30),
            idle_window: Duration::from_millis(500),
        }
    }
}

impl ChromeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chrome_path(mut self, path: Option<PathBuf>) -> Self {
        self.chrome_path = path;
        self
    }

    pub fn sandbox(mut self, v: bool) -> Self {
        self.sandbox = v;
        self
    }

    /// Deadline for navigation plus settling, capped at one day.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(Duration::from_secs(MAX_RENDER_TIMEOUT_SECS));
        self
    }

    pub fn idle_window(mut self, window: Duration) -> Self {
        self.idle_window = window;
        self
    }

    fn launch(&self) -> Result<BrowserSession, RenderError> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.sandbox)
            .path(self.chrome_path.clone())
            // Keep the DevTools connection alive for the whole render.
            .idle_browser_timeout(self.timeout.saturating_add(BROWSER_IDLE_GRACE))
            .build()
            .map_err(|e| RenderError::Launch(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(launch_options).map_err(|e| RenderError::Launch(e.to_string()))?;
        debug!("Headless browser launched");
        Ok(BrowserSession { browser: Some(browser) })
    }

    fn render_in_session(
        &self,
        session: &BrowserSession,
        html: &str,
        options: &PrintOptions,
    ) -> Result<Vec<u8>, RenderError> {
        let deadline = deadline_after(Instant::now(), self.timeout);

        // Chrome loads the document from disk; the temp file is removed on drop.
        let mut page_file = tempfile::Builder::new()
            .prefix("md2pdf-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| RenderError::Load(format!("temp file: {e}")))?;
        page_file
            .write_all(html.as_bytes())
            .and_then(|_| page_file.flush())
            .map_err(|e| RenderError::Load(format!("temp file write: {e}")))?;
        let page_url = Url::from_file_path(page_file.path())
            .map_err(|_| RenderError::Load(format!("not an absolute path: {:?}", page_file.path())))?;

        let tab = session.new_tab()?;
        let network = NetworkMonitor::attach(&tab)?;

        tab.set_default_timeout(self.remaining(deadline)?);
        tab.navigate_to(page_url.as_str())
            .map_err(|e| RenderError::Load(format!("navigation failed: {e}")))?;
        tab.wait_until_navigated().map_err(|e| {
            if Instant::now() >= deadline {
                self.timed_out()
            } else {
                RenderError::Load(format!("wait for navigation failed: {e}"))
            }
        })?;

        self.wait_for_idle(&tab, &network, deadline)?;

        let pdf = tab
            .print_to_pdf(Some(options.to_cdp()))
            .map_err(|e| RenderError::Print(e.to_string()))?;

        if let Err(e) = tab.close(false) {
            warn!("Failed to close tab: {}", e);
        }
        Ok(pdf)
    }

    /// Poll the page until it has been quiet for `idle_window`.
    fn wait_for_idle(
        &self,
        tab: &Tab,
        network: &NetworkMonitor,
        deadline: Instant,
    ) -> Result<(), RenderError> {
        let start = Instant::now();
        let mut tracker = IdleTracker::new(self.idle_window, deadline);

        loop {
            let now = Instant::now();
            let activity = network.annotate(probe_activity(tab)?);
            match tracker.observe(&activity, now) {
                IdleState::Idle => {
                    debug!(
                        "Page idle after {}ms ({} requests)",
                        start.elapsed().as_millis(),
                        activity.requests_started
                    );
                    return Ok(());
                }
                IdleState::TimedOut => {
                    debug!(
                        "Page still busy at deadline: {} requests in flight",
                        activity.in_flight
                    );
                    return Err(self.timed_out());
                }
                IdleState::Busy => std::thread::sleep(IDLE_POLL_INTERVAL),
            }
        }
    }

    /// Time left before `deadline`, or a timeout error if none is left.
    fn remaining(&self, deadline: Instant) -> Result<Duration, RenderError> {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            Err(self.timed_out())
        } else {
            Ok(left)
        }
    }

    fn timed_out(&self) -> RenderError {
        RenderError::Timeout {
            secs: self.timeout.as_secs(),
        }
    }
}

/// `now + timeout`, saturating at one day out instead of overflowing.
fn deadline_after(now: Instant, timeout: Duration) -> Instant {
    let cap = Duration::from_secs(MAX_RENDER_TIMEOUT_SECS);
    now.checked_add(timeout.min(cap)).unwrap_or(now)
}

impl PdfRenderer for ChromeRenderer {
    fn render(
        &self,
        html: &str,
        destination: &Path,
        options: &PrintOptions,
    ) -> Result<(), RenderError> {
        let session = self.launch()?;
        let pdf = self.render_in_session(&session, html, options)?;
        drop(session);

        info!("Printed {} bytes of PDF", pdf.len());
        write_atomic(destination, &pdf)
    }
}

// ── Browser lifetime ─────────────────────────────────────────────────────

/// Owns the browser process; shuts it down when dropped.
pub struct BrowserSession {
    browser: Option<Browser>,
}

impl BrowserSession {
    fn new_tab(&self) -> Result<Arc<Tab>, RenderError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| RenderError::Load("browser already closed".into()))?;
        browser
            .new_tab()
            .map_err(|e| RenderError::Load(format!("failed to create tab: {e}")))
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(browser) = self.browser.take() {
            // Dropping `Browser` kills the child process and reaps it.
            drop(browser);
            debug!("Headless browser shut down");
        }
    }
}

// ── Readiness tracking ───────────────────────────────────────────────────

/// Snapshot of page loading activity.
///
/// The document fields come from the in-page probe; the request counters come
/// from the tab's [`NetworkMonitor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageActivity {
    /// `document.readyState === "complete"`.
    pub document_complete: bool,
    /// `<img>` elements that have not finished loading.
    pub pending_images: u32,
    /// `document.fonts.status === "loaded"`.
    pub fonts_loaded: bool,
    /// Requests sent but not yet finished or failed.
    #[serde(default)]
    pub in_flight: u32,
    /// Requests sent since the monitor was attached. Never decreases.
    #[serde(default)]
    pub requests_started: u64,
}

impl PageActivity {
    fn settled(&self) -> bool {
        self.document_complete
            && self.pending_images == 0
            && self.fonts_loaded
            && self.in_flight == 0
    }
}

/// Tracks network requests of one tab from DevTools `Network.*` events.
///
/// Counts every request the page issues (images, fonts, stylesheets, `fetch`,
/// XHR), from the moment it is sent until it finishes or fails. `data:` URLs
/// never touch the network and are skipped.
#[derive(Debug, Default)]
pub struct NetworkMonitor {
    state: Mutex<NetworkState>,
}

#[derive(Debug, Default)]
struct NetworkState {
    in_flight: HashSet<String>,
    started: u64,
}

impl NetworkMonitor {
    /// Enable the Network domain on `tab` and start following its events.
    fn attach(tab: &Tab) -> Result<Arc<Self>, RenderError> {
        let monitor = Arc::new(Self::default());
        let listener = Arc::clone(&monitor);
        tab.add_event_listener(Arc::new(move |event: &Event| listener.on_event(event)))
            .map_err(|e| RenderError::Load(format!("network listener: {e}")))?;
        tab.call_method(Network::Enable {
            max_total_buffer_size: None,
            max_resource_buffer_size: None,
            max_post_data_size: None,
            report_direct_socket_traffic: None,
            enable_durable_messages: None,
        })
        .map_err(|e| RenderError::Load(format!("enable network events: {e}")))?;
        Ok(monitor)
    }

    fn on_event(&self, event: &Event) {
        match event {
            Event::NetworkRequestWillBeSent(ev) if !ev.params.request.url.starts_with("data:") => {
                self.request_sent(&ev.params.request_id)
            }
            Event::NetworkLoadingFinished(ev) => self.request_done(&ev.params.request_id),
            Event::NetworkLoadingFailed(ev) => self.request_done(&ev.params.request_id),
            _ => {}
        }
    }

    /// A request (or a redirect of one) went out.
    pub fn request_sent(&self, request_id: &str) {
        let mut state = self.lock();
        state.in_flight.insert(request_id.to_string());
        state.started += 1;
    }

    /// A request finished or failed. Unknown ids are ignored.
    pub fn request_done(&self, request_id: &str) {
        self.lock().in_flight.remove(request_id);
    }

    /// Fill the request counters of a probe result.
    pub fn annotate(&self, mut activity: PageActivity) -> PageActivity {
        let state = self.lock();
        activity.in_flight = u32::try_from(state.in_flight.len()).unwrap_or(u32::MAX);
        activity.requests_started = state.started;
        activity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NetworkState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Outcome of one [`IdleTracker::observe`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Busy,
    Idle,
    TimedOut,
}

/// Network-idle detector: idle once the page has been settled, with no
/// request in flight and none started, for a full quiet window.
#[derive(Debug)]
pub struct IdleTracker {
    window: Duration,
    deadline: Instant,
    quiet_since: Option<Instant>,
    last_started: Option<u64>,
}

impl IdleTracker {
    pub fn new(window: Duration, deadline: Instant) -> Self {
        Self {
            window,
            deadline,
            quiet_since: None,
            last_started: None,
        }
    }

    pub fn observe(&mut self, activity: &PageActivity, now: Instant) -> IdleState {
        let changed = self.last_started != Some(activity.requests_started);
        self.last_started = Some(activity.requests_started);

        if !activity.settled() || changed {
            self.quiet_since = None;
        }

        if activity.settled() {
            let since = *self.quiet_since.get_or_insert(now);
            if now.duration_since(since) >= self.window {
                return IdleState::Idle;
            }
        }

        if now >= self.deadline {
            IdleState::TimedOut
        } else {
            IdleState::Busy
        }
    }
}

/// In-page probe; stringified because `evaluate` does not return objects by value.
const ACTIVITY_PROBE: &str = r#"JSON.stringify({
  documentComplete: document.readyState === "complete",
  pendingImages: Array.from(document.images).filter(function (img) { return !img.complete; }).length,
  fontsLoaded: !document.fonts || document.fonts.status === "loaded"
})"#;

fn probe_activity(tab: &Tab) -> Result<PageActivity, RenderError> {
    let remote = tab
        .evaluate(ACTIVITY_PROBE, false)
        .map_err(|e| RenderError::Load(format!("readiness probe failed: {e}")))?;
    let raw = remote
        .value
        .as_ref()
        .and_then(|v| v.as_str())
        .ok_or_else(|| RenderError::Load("readiness probe returned no value".into()))?;
    parse_activity(raw)
}

fn parse_activity(raw: &str) -> Result<PageActivity, RenderError> {
    serde_json::from_str(raw)
        .map_err(|e| RenderError::Load(format!("unexpected readiness probe result {raw:?}: {e}")))
}

// ── Output ───────────────────────────────────────────────────────────────

/// Write `bytes` to `path` via a sibling temp file and rename, so a failed
/// write never leaves a truncated PDF behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let write_err = |source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled(requests_started: u64) -> PageActivity {
        PageActivity {
            document_complete: true,
            pending_images: 0,
            fonts_loaded: true,
            in_flight: 0,
            requests_started,
        }
    }

    #[test]
    fn default_options_are_a4_with_40px_margins() {
        let opts = PrintOptions::default();
        assert_eq!(opts.paper, PaperSize::A4);
        assert_eq!(opts.margins, Margins::uniform(40.0));
        assert!(opts.print_background);
        assert!(!opts.landscape);
    }

    #[test]
    fn cdp_options_use_inches() {
        let cdp = PrintOptions::default().to_cdp();
        let w = cdp.paper_width.unwrap();
        let h = cdp.paper_height.unwrap();
        assert!((w - 8.27).abs() < 0.01, "width {w}");
        assert!((h - 11.69).abs() < 0.01, "height {h}");
        for m in [cdp.margin_top, cdp.margin_right, cdp.margin_bottom, cdp.margin_left] {
            assert!((m.unwrap() - 40.0 / 96.0).abs() < 1e-9);
        }
        assert_eq!(cdp.print_background, Some(true));
    }

    #[test]
    fn margins_larger_than_page_rejected() {
        let opts = PrintOptions {
            margins: Margins::uniform(500.0),
            ..Default::default()
        };
        assert!(opts.validate().is_err());
        assert!(PrintOptions::default().validate().is_ok());
    }

    #[test]
    fn negative_margin_rejected() {
        let opts = PrintOptions {
            margins: Margins {
                top: -1.0,
                ..Margins::default()
            },
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn tracker_waits_for_full_window() {
        let t0 = Instant::now();
        let mut tr = IdleTracker::new(Duration::from_millis(500), t0 + Duration::from_secs(30));
        assert_eq!(tr.observe(&settled(3), t0), IdleState::Busy);
        assert_eq!(
            tr.observe(&settled(3), t0 + Duration::from_millis(300)),
            IdleState::Busy
        );
        assert_eq!(
            tr.observe(&settled(3), t0 + Duration::from_millis(500)),
            IdleState::Idle
        );
    }

    #[test]
    fn new_resource_restarts_window() {
        let t0 = Instant::now();
        let mut tr = IdleTracker::new(Duration::from_millis(500), t0 + Duration::from_secs(30));
        tr.observe(&settled(1), t0);
        // A font request started at 400ms.
        assert_eq!(
            tr.observe(&settled(2), t0 + Duration::from_millis(400)),
            IdleState::Busy
        );
        assert_eq!(
            tr.observe(&settled(2), t0 + Duration::from_millis(800)),
            IdleState::Busy
        );
        assert_eq!(
            tr.observe(&settled(2), t0 + Duration::from_millis(900)),
            IdleState::Idle
        );
    }

    #[test]
    fn pending_image_blocks_idle() {
        let t0 = Instant::now();
        let mut tr = IdleTracker::new(Duration::from_millis(100), t0 + Duration::from_secs(30));
        let loading = PageActivity {
            pending_images: 1,
            ..settled(1)
        };
        for ms in [0, 200, 400] {
            assert_eq!(
                tr.observe(&loading, t0 + Duration::from_millis(ms)),
                IdleState::Busy
            );
        }
        assert_eq!(tr.observe(&settled(1), t0 + Duration::from_millis(500)), IdleState::Busy);
        assert_eq!(tr.observe(&settled(1), t0 + Duration::from_millis(600)), IdleState::Idle);
    }

    #[test]
    fn never_settling_page_times_out() {
        let t0 = Instant::now();
        let deadline = t0 + Duration::from_secs(2);
        let mut tr = IdleTracker::new(Duration::from_millis(500), deadline);
        // A polling script adds a resource every 200ms forever.
        let mut state = IdleState::Busy;
        for i in 0..20u64 {
            state = tr.observe(&settled(i), t0 + Duration::from_millis(200 * i));
            if state != IdleState::Busy {
                break;
            }
        }
        assert_eq!(state, IdleState::TimedOut);
    }

    #[test]
    fn slow_request_in_flight_blocks_idle() {
        let t0 = Instant::now();
        let mut tr = IdleTracker::new(Duration::from_millis(500), t0 + Duration::from_secs(30));
        // A background-image fetch started before the window and is still running.
        let waiting = PageActivity {
            in_flight: 1,
            ..settled(4)
        };
        for ms in [0, 600, 1200, 1800] {
            assert_eq!(
                tr.observe(&waiting, t0 + Duration::from_millis(ms)),
                IdleState::Busy
            );
        }
        assert_eq!(tr.observe(&settled(4), t0 + Duration::from_millis(1900)), IdleState::Busy);
        assert_eq!(tr.observe(&settled(4), t0 + Duration::from_millis(2400)), IdleState::Idle);
    }

    #[test]
    fn endless_polling_never_goes_idle() {
        // Far more requests than Chrome's 250-entry resource-timing buffer.
        let monitor = NetworkMonitor::default();
        let t0 = Instant::now();
        let deadline = t0 + Duration::from_secs(60);
        let mut tr = IdleTracker::new(Duration::from_millis(500), deadline);

        let mut state = IdleState::Busy;
        for i in 0..700u64 {
            let id = format!("poll-{i}");
            monitor.request_sent(&id);
            monitor.request_done(&id);
            let activity = monitor.annotate(settled(0));
            state = tr.observe(&activity, t0 + Duration::from_millis(100 * i));
            if state != IdleState::Busy {
                break;
            }
        }
        assert_eq!(state, IdleState::TimedOut);
        assert_eq!(monitor.annotate(settled(0)).requests_started, 601);
    }

    #[test]
    fn monitor_counts_in_flight_requests() {
        let monitor = NetworkMonitor::default();
        monitor.request_sent("1");
        monitor.request_sent("2");
        // Redirect: same id sent again.
        monitor.request_sent("2");
        let a = monitor.annotate(settled(0));
        assert_eq!((a.in_flight, a.requests_started), (2, 3));

        monitor.request_done("2");
        monitor.request_done("unknown");
        let a = monitor.annotate(settled(0));
        assert_eq!((a.in_flight, a.requests_started), (1, 3));
        assert!(!a.settled());

        monitor.request_done("1");
        assert!(monitor.annotate(settled(0)).settled());
    }

    #[test]
    fn probe_result_parses() {
        let a = parse_activity(
            r#"{"documentComplete":true,"pendingImages":2,"fontsLoaded":false}"#,
        )
        .unwrap();
        assert!(a.document_complete);
        assert_eq!(a.pending_images, 2);
        assert!(!a.fonts_loaded);
        assert_eq!((a.in_flight, a.requests_started), (0, 0));
        assert!(parse_activity("not json").is_err());
    }

    #[test]
    fn huge_timeout_is_capped() {
        let r = ChromeRenderer::new().timeout(Duration::from_secs(u64::MAX));
        assert_eq!(r.timeout, Duration::from_secs(MAX_RENDER_TIMEOUT_SECS));

        let now = Instant::now();
        let deadline = deadline_after(now, Duration::from_secs(u64::MAX));
        assert!(deadline > now);
        assert_eq!(deadline - now, Duration::from_secs(MAX_RENDER_TIMEOUT_SECS));
    }

    #[test]
    fn remaining_time_runs_out() {
        let r = ChromeRenderer::new().timeout(Duration::from_secs(3));
        let past = Instant::now();
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(r.remaining(past), Err(RenderError::Timeout { secs: 3 })));
        let left = r.remaining(Instant::now() + Duration::from_secs(2)).unwrap();
        assert!(left <= Duration::from_secs(2) && left > Duration::ZERO);
    }

    #[test]
    fn write_atomic_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("nested/deeper/out.pdf");
        write_atomic(&dest, b"%PDF-1.4 test").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4 test");
        // No temp files left behind.
        let entries: Vec<_> = std::fs::read_dir(dest.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_atomic_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("out.pdf");
        std::fs::write(&dest, b"old").unwrap();
        write_atomic(&dest, b"new").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }
}
