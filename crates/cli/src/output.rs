//! Console output for scan progress and results

use chrono::Local;
use portlens_common::{Observation, ScanObserver, ScanRequest, ScanResult};
use std::time::Duration;

/// Banner characters shown on a live result line.
const LIVE_BANNER_CHARS: usize = 30;

/// Prints each observation the moment it is collected.
pub struct ConsoleObserver;

impl ScanObserver for ConsoleObserver {
    fn on_observation(&self, observation: &Observation) {
        println!("{}", live_line(observation));
    }
}

fn live_line(obs: &Observation) -> String {
    let banner: String = obs.banner.chars().take(LIVE_BANNER_CHARS).collect();
    format!(
        "[+] {:5}/{}  {:12}  {:15}  {}",
        obs.port,
        obs.strategy.transport(),
        obs.state,
        obs.service,
        banner
    )
}

pub fn print_header(request: &ScanRequest, port_count: usize) {
    println!(
        "[*] Starting {} scan of {}",
        request.strategy.as_str().to_uppercase(),
        request.target.trim()
    );
    println!(
        "[*] Scanning {} ports with {} threads",
        port_count,
        request.threads.min(port_count).max(1)
    );
    println!("[*] Scan started at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{}", "-".repeat(60));
}

pub fn print_summary(result: &ScanResult) {
    println!("{}", "-".repeat(60));
    println!("[*] Scan completed in {}", format_duration(result.duration));
    println!("[*] Found {} open ports", result.observations.len());

    for line in summary_lines(result) {
        println!("{}", line);
    }
}

fn summary_lines(result: &ScanResult) -> Vec<String> {
    let host = if result.target == result.address.to_string() {
        result.target.clone()
    } else {
        format!("{} ({})", result.target, result.address)
    };

    if result.observations.is_empty() {
        return vec![String::new(), format!("[*] No open ports found on {}", host)];
    }

    let mut lines = vec![
        String::new(),
        format!(
            "[*] Summary: {} open ports found on {}",
            result.observations.len(),
            host
        ),
    ];
    lines.extend(
        result
            .sorted_by_port()
            .into_iter()
            .map(|o| format!("    Port {}: {} ({})", o.port, o.service, o.state)),
    );
    lines
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{}.{:03}s", total_secs, millis)
        } else {
            format!("{}s", total_secs)
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    }
}
