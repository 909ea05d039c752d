//! Output file naming

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Where an exporter puts its file: a directory plus an optional fixed stem.
#[derive(Debug, Clone)]
pub struct OutputLocation {
    dir: PathBuf,
    stem: Option<String>,
}

impl OutputLocation {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stem: None,
        }
    }

    /// Current working directory, default stem.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    /// Use `stem` instead of the generated name. A trailing extension is kept
    /// only if it already matches the format.
    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        let stem = stem.into();
        self.stem = (!stem.trim().is_empty()).then_some(stem);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path for a file of `extension` describing a scan of `target`.
    pub fn path_for(&self, target: &str, extension: &str, now: DateTime<Local>) -> PathBuf {
        let stem = match &self.stem {
            Some(stem) => stem
                .strip_suffix(&format!(".{}", extension))
                .unwrap_or(stem.as_str())
                .to_string(),
            None => default_stem(target, now),
        };
        self.dir.join(format!("{}.{}", stem, extension))
    }
}

/// `port_scan_<target>_<YYYYmmdd_HHMMSS>`
pub fn default_stem(target: &str, now: DateTime<Local>) -> String {
    format!(
        "port_scan_{}_{}",
        sanitize_target(target),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Make a target token safe to embed in a file name.
pub fn sanitize_target(target: &str) -> String {
    target
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn default_name_embeds_target_and_time() {
        assert_eq!(
            default_stem("scanme.nmap.org", fixed_time()),
            "port_scan_scanme.nmap.org_20240309_140507"
        );
        let path = OutputLocation::new("out").path_for("10.0.0.1", "json", fixed_time());
        assert_eq!(path, PathBuf::from("out/port_scan_10.0.0.1_20240309_140507.json"));
    }

    #[test]
    fn ipv6_targets_are_sanitized() {
        assert_eq!(sanitize_target("[::1]"), "___1_");
        assert_eq!(sanitize_target("fe80::1%eth0"), "fe80__1_eth0");
    }

    #[test]
    fn explicit_stem_overrides_default() {
        let location = OutputLocation::new("out").with_stem("report");
        assert_eq!(
            location.path_for("localhost", "csv", fixed_time()),
            PathBuf::from("out/report.csv")
        );

        let location = OutputLocation::new("out").with_stem("report.csv");
        assert_eq!(
            location.path_for("localhost", "csv", fixed_time()),
            PathBuf::from("out/report.csv")
        );

        let blank = OutputLocation::new("out").with_stem("  ");
        assert!(blank
            .path_for("localhost", "txt", fixed_time())
            .ends_with("port_scan_localhost_20240309_140507.txt"));
    }
}
