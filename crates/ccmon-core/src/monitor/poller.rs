use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::health::{HealthSnapshot, NetworkProbe, ProbeResult, SystemProbe};
use crate::notify::{DesktopNotifier, Notifier};
use crate::usage::{
    aggregate_costs, extract_session, CcusageRunner, ReportError, ReportKind, ReportOutput,
    ReportRunner, ReportTexts,
};

use super::state::MonitorState;

/// Runs the probe → blocks → daily cycle and publishes snapshots
pub struct Poller<P, R, N> {
    probe: P,
    runner: R,
    notifier: N,
    poll_interval: Duration,
    usage_enabled: bool,
    max_failures: u32,
    state: MonitorState,
}

impl Poller<SystemProbe, CcusageRunner, DesktopNotifier> {
    /// Poller backed by `ping`, HTTP, `npx ccusage` and desktop notifications
    pub fn with_system(settings: &Settings) -> Self {
        let probe = SystemProbe::new(
            settings.network.host.clone(),
            settings.network.url.clone(),
            settings.network.timeout_secs,
        );
        let runner = CcusageRunner::new(
            settings.usage.package.clone(),
            settings.usage.npx_path.clone(),
            settings.usage.timeout_secs,
        );
        let notifier = DesktopNotifier::new(
            settings.notifications.title.clone(),
            settings.notifications.enabled,
        );
        Self::new(probe, runner, notifier, settings)
    }
}

impl<P, R, N> Poller<P, R, N>
where
    P: NetworkProbe,
    R: ReportRunner,
    N: Notifier,
{
    /// Create a new poller
    pub fn new(probe: P, runner: R, notifier: N, settings: &Settings) -> Self {
        Self {
            probe,
            runner,
            notifier,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            usage_enabled: settings.usage.enabled,
            max_failures: settings.usage.max_failures.max(1),
            state: MonitorState::new(),
        }
    }

    /// State carried between cycles
    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Run one cycle at the current local time
    pub async fn poll_once(&mut self) -> HealthSnapshot {
        self.poll_at(Local::now()).await
    }

    /// Run one cycle as of `now`
    pub async fn poll_at(&mut self, now: DateTime<Local>) -> HealthSnapshot {
        self.state.last_error = None;

        self.poll_network().await;
        if self.usage_enabled {
            self.poll_usage(now.naive_local()).await;
        }

        self.state.polls = self.state.polls.wrapping_add(1);
        self.state.snapshot(self.usage_enabled, now)
    }

    /// Start polling in a background task.
    ///
    /// The receiver always holds the most recent snapshot; the task stops
    /// once every receiver is dropped.
    pub fn start(self) -> watch::Receiver<HealthSnapshot>
    where
        P: 'static,
        R: 'static,
        N: 'static,
    {
        let initial = self.state.snapshot(self.usage_enabled, Local::now());
        let (tx, rx) = watch::channel(initial);

        tokio::spawn(async move {
            self.run(tx).await;
        });

        rx
    }

    /// Run the polling loop
    async fn run(mut self, tx: watch::Sender<HealthSnapshot>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        // A slow cycle pushes the next one back instead of bursting
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let snapshot = self.poll_once().await;
            if tx.send(snapshot).is_err() {
                debug!("Snapshot receiver dropped, stopping poller");
                break;
            }
        }
    }

    async fn poll_network(&mut self) {
        let ping = self.probe.ping().await;
        let http = self.probe.http_check().await;
        let probe = ProbeResult::combine(ping, http);
        self.state.last_probe = probe;

        if !probe.reachable {
            debug!(
                ping = ping.reachable,
                http = http.ok,
                streak = self.state.health.fail_streak() + 1,
                "Network unreachable"
            );
        }

        if let Some(intent) = self.state.health.observe(probe.reachable) {
            info!("Connectivity changed: {}", intent.title());
            self.notifier.notify(intent.title(), intent.body());
        }
    }

    async fn poll_usage(&mut self, now: NaiveDateTime) {
        let blocks = match self.fetch(ReportKind::Blocks).await {
            Ok(text) => {
                self.state.tool_failures = 0;
                Some(text)
            }
            Err(e) => {
                self.record_tool_failure(e).await;
                None
            }
        };

        match blocks.as_deref().and_then(|text| extract_session(text, now)) {
            Some(record) => {
                if record.raw_start_text != self.state.session.raw_start_text {
                    info!(
                        start = %record.raw_start_text,
                        state = record.lifecycle_state.label(),
                        "Session changed"
                    );
                }
                self.state.session = record;
            }
            None => self.state.session.refresh(now),
        }

        let daily = match self.fetch(ReportKind::Daily).await {
            Ok(text) => text,
            Err(e) => {
                warn!("ccusage daily failed: {}", e);
                self.state.last_error = Some(e.to_string());
                return;
            }
        };

        let reports = ReportTexts {
            daily: Some(&daily),
            blocks: blocks.as_deref(),
        };
        match aggregate_costs(reports) {
            Some(summary) => self.state.costs.apply(summary),
            None => debug!("No cost rows this cycle"),
        }
    }

    async fn fetch(&self, kind: ReportKind) -> Result<String, ReportError> {
        self.runner
            .run_report(kind)
            .await
            .and_then(ReportOutput::into_stdout)
    }

    /// Count a failed `blocks` run; reinstall the tool at the threshold
    async fn record_tool_failure(&mut self, error: ReportError) {
        self.state.tool_failures += 1;
        warn!(
            failures = self.state.tool_failures,
            "ccusage blocks failed: {}", error
        );
        self.state.last_error = Some(error.to_string());

        if self.state.tool_failures < self.max_failures {
            return;
        }

        info!(
            "ccusage failed {} times in a row, updating",
            self.state.tool_failures
        );
        match self.runner.self_update().await {
            Ok(version) => info!("ccusage updated to {}", version),
            Err(e) => warn!("ccusage update failed: {}", e),
        }
        self.state.tool_failures = 0;
    }
}
