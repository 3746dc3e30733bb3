// Pure parsing of ping(8) output

use super::ProbeOutcome;

/// Extracts round-trip time and packet loss from one-echo ping output.
/// Handles both Linux ("time=12.3 ms", "0% packet loss") and BSD/macOS
/// ("time=12.345 ms", "0.0% packet loss") formats. Anything unparseable is
/// treated as a dead probe.
pub(super) fn parse_ping_output(out: &str) -> ProbeOutcome {
    let latency_ms = out
        .lines()
        .find_map(|line| line.split("time=").nth(1))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|v| v.parse::<f64>().ok());

    let packet_loss = out
        .lines()
        .find(|line| line.contains("packet loss"))
        .and_then(|line| {
            line.split_whitespace()
                .find_map(|token| token.strip_suffix('%'))
                .and_then(|v| v.parse::<f64>().ok())
        })
        .unwrap_or(100.0);

    ProbeOutcome {
        alive: latency_ms.is_some(),
        latency_ms,
        packet_loss,
    }
}
