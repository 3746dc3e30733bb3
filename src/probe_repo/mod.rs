// ICMP echo via the system ping binary (one echo per call)

mod parse;

use crate::config::ProbeConfig;
use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

/// Result of one probe attempt. A failed or timed-out probe is a valid
/// outcome (dead target), never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub alive: bool,
    pub latency_ms: Option<f64>,
    /// 0-100; 100 when the echo went unanswered.
    pub packet_loss: f64,
}

impl ProbeOutcome {
    fn dead() -> Self {
        Self {
            alive: false,
            latency_ms: None,
            packet_loss: 100.0,
        }
    }
}

pub struct ProbeRepo {
    target_addr: String,
    use_ipv6: bool,
    timeout_secs: u64,
}

impl ProbeRepo {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            target_addr: config.target_addr.clone(),
            use_ipv6: config.use_ipv6,
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn target_addr(&self) -> &str {
        &self.target_addr
    }

    /// Sends one echo with a short reply timeout. Total: spawn failure,
    /// timeout, and unparseable output all yield a dead outcome.
    pub async fn probe(&self) -> ProbeOutcome {
        let mut cmd = Command::new("ping");
        cmd.arg("-c").arg("1");
        cmd.arg("-W").arg(self.timeout_secs.to_string());
        if self.use_ipv6 {
            cmd.arg("-6");
        }
        cmd.arg(&self.target_addr);
        cmd.kill_on_drop(true);

        // The -W deadline bounds the echo; the outer timeout bounds a ping
        // binary that hangs before its own deadline applies.
        let output = tokio::time::timeout(Duration::from_secs(self.timeout_secs + 2), async {
            cmd.output().await
        })
        .await;

        match output {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                parse::parse_ping_output(&stdout)
            }
            Ok(Err(e)) => {
                warn!(error = %e, target = %self.target_addr, "ping spawn failed");
                ProbeOutcome::dead()
            }
            Err(_) => {
                warn!(target = %self.target_addr, "ping timed out");
                ProbeOutcome::dead()
            }
        }
    }
}
