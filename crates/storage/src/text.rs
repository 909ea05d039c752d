//! Plain-text report

use chrono::Local;
use portlens_common::{PortlensResult, ResultSink, ScanResult};
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::naming::OutputLocation;
use crate::persist;

pub struct TextExporter {
    location: OutputLocation,
}

impl TextExporter {
    pub fn new(location: OutputLocation) -> Self {
        Self { location }
    }

    /// Render the report, one line per observation in arrival order.
    pub fn render(&self, result: &ScanResult, completed_at: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Port Scan Results for {}", result.target);
        let _ = writeln!(out, "Scan completed at: {}", completed_at);
        let _ = writeln!(out, "{}", "-".repeat(60));
        for obs in &result.observations {
            let _ = writeln!(
                out,
                "{:5}/{}  {:12}  {:15}  {}",
                obs.port,
                obs.strategy.transport(),
                obs.state,
                obs.service,
                obs.banner
            );
        }
        out
    }
}

impl ResultSink for TextExporter {
    fn write(&self, result: &ScanResult) -> PortlensResult<PathBuf> {
        let now = Local::now();
        let path = self.location.path_for(&result.target, "txt", now);
        let body = self.render(result, &now.format("%Y-%m-%d %H:%M:%S").to_string());
        persist(&path, body.as_bytes())
    }

    fn format(&self) -> &'static str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_result, scratch_dir};

    #[test]
    fn report_layout() {
        let exporter = TextExporter::new(OutputLocation::current_dir());
        let text = exporter.render(&sample_result(), "2024-03-09 14:05:07");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Port Scan Results for localhost");
        assert_eq!(lines[1], "Scan completed at: 2024-03-09 14:05:07");
        assert_eq!(lines[2], "-".repeat(60));
        assert_eq!(
            lines[3],
            "   80/tcp  open          HTTP             HTTP/1.1 200 OK, \"quoted\""
        );
        assert!(lines[4].starts_with("   22/tcp  open"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn writes_named_file() {
        let dir = scratch_dir("text");
        let exporter = TextExporter::new(OutputLocation::new(&dir).with_stem("scan"));
        let path = exporter.write(&sample_result()).unwrap();

        assert_eq!(path, dir.join("scan.txt"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Port Scan Results for localhost\n"));
        let _ = std::fs::remove_dir_all(dir);
    }
}
