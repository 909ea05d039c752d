//! JSON export

use chrono::Local;
use portlens_common::{Observation, PortlensError, PortlensResult, ResultSink, ScanResult, ScanStrategy};
use serde::Serialize;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::naming::OutputLocation;
use crate::persist;

#[derive(Serialize)]
struct JsonReport<'a> {
    target: &'a str,
    address: IpAddr,
    strategy: ScanStrategy,
    duration_seconds: f64,
    port_count: usize,
    observations: &'a [Observation],
}

impl<'a> From<&'a ScanResult> for JsonReport<'a> {
    fn from(result: &'a ScanResult) -> Self {
        Self {
            target: &result.target,
            address: result.address,
            strategy: result.strategy,
            duration_seconds: result.duration_seconds(),
            port_count: result.port_count,
            observations: &result.observations,
        }
    }
}

pub struct JsonExporter {
    location: OutputLocation,
}

impl JsonExporter {
    pub fn new(location: OutputLocation) -> Self {
        Self { location }
    }

    pub fn render(&self, result: &ScanResult) -> PortlensResult<String> {
        serde_json::to_string_pretty(&JsonReport::from(result))
            .map_err(|e| PortlensError::Export(e.to_string()))
    }
}

impl ResultSink for JsonExporter {
    fn write(&self, result: &ScanResult) -> PortlensResult<PathBuf> {
        let path = self.location.path_for(&result.target, "json", Local::now());
        let body = self.render(result)?;
        persist(&path, body.as_bytes())
    }

    fn format(&self) -> &'static str {
        "json"
    }
}
