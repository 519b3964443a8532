//! Reachability probes: ICMP ping and an HTTP GET.

use std::future::Future;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tracing::debug;

use super::types::{HttpOutcome, PingOutcome};

/// Network reachability checks. Each call applies its own timeout.
pub trait NetworkProbe: Send + Sync {
    /// Ping the configured host once
    fn ping(&self) -> impl Future<Output = PingOutcome> + Send;

    /// Fetch the configured URL once
    fn http_check(&self) -> impl Future<Output = HttpOutcome> + Send;
}

/// Probe backed by the system `ping` binary and `ureq`
pub struct SystemProbe {
    host: String,
    url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl SystemProbe {
    /// Create a probe for `host` (ping) and `url` (HTTP)
    pub fn new(host: String, url: String, timeout_secs: u64) -> Self {
        let timeout = Duration::from_secs(timeout_secs);
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            host,
            url,
            timeout,
            agent,
        }
    }

    fn ping_args(&self) -> Vec<&str> {
        if cfg!(windows) {
            vec!["-n", "1", self.host.as_str()]
        } else {
            vec!["-c", "1", self.host.as_str()]
        }
    }
}

impl NetworkProbe for SystemProbe {
    async fn ping(&self) -> PingOutcome {
        let child = tokio::process::Command::new("ping")
            .args(self.ping_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(e) => {
                debug!("ping: failed to start: {}", e);
                return PingOutcome::default();
            }
        };

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                PingOutcome {
                    reachable: true,
                    latency_ms: parse_ping_latency(&stdout),
                }
            }
            Ok(Ok(output)) => {
                debug!("ping: exited with {}", output.status);
                PingOutcome::default()
            }
            Ok(Err(e)) => {
                debug!("ping: process error: {}", e);
                PingOutcome::default()
            }
            Err(_) => {
                debug!("ping: timed out after {}s", self.timeout.as_secs());
                PingOutcome::default()
            }
        }
    }

    async fn http_check(&self) -> HttpOutcome {
        let agent = self.agent.clone();
        let url = self.url.clone();

        let result = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let response = agent.get(&url).call();
            (response.map(|_| ()), start.elapsed())
        })
        .await;

        match result {
            Ok((Ok(()), elapsed)) => HttpOutcome {
                ok: true,
                elapsed_ms: Some(elapsed.as_secs_f64() * 1000.0),
            },
            Ok((Err(e), elapsed)) => {
                debug!("http check failed after {:?}: {}", elapsed, e);
                HttpOutcome {
                    ok: false,
                    elapsed_ms: None,
                }
            }
            Err(e) => {
                debug!("http check task failed: {}", e);
                HttpOutcome::default()
            }
        }
    }
}

/// Extract the round-trip time from `ping` output.
///
/// Prefers the per-reply `time=` field and falls back to the `avg` value of
/// the `min/avg/max` summary line.
pub fn parse_ping_latency(output: &str) -> Option<f64> {
    let from_reply = output.lines().find_map(|line| {
        let (_, rest) = line.split_once("time=")?;
        let number: String = rest
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        number.parse().ok()
    });

    from_reply.or_else(|| {
        output
            .lines()
            .filter(|line| line.to_lowercase().contains("avg"))
            .find_map(|line| line.split('/').nth(4)?.trim().parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_linux_reply() {
        let output = "\
PING google.com (142.250.196.110) 56(84) bytes of data.
64 bytes from nrt12s36-in-f14.1e100.net (142.250.196.110): icmp_seq=1 ttl=115 time=14.2 ms

--- google.com ping statistics ---
1 packets transmitted, 1 received, 0% packet loss, time 0ms
rtt min/avg/max/mdev = 14.213/14.213/14.213/0.000 ms
";
        assert_eq!(parse_ping_latency(output), Some(14.2));
    }

    #[test]
    fn test_parse_summary_only() {
        let output = "round-trip min/avg/max/stddev = 20.1/22.5/25.0/1.2 ms\n";
        assert_eq!(parse_ping_latency(output), Some(22.5));
    }

    #[test]
    fn test_parse_no_latency() {
        assert_eq!(parse_ping_latency("Request timeout for icmp_seq 0\n"), None);
        assert_eq!(parse_ping_latency(""), None);
    }
}
