//! CSV export

use chrono::Local;
use portlens_common::{PortlensError, PortlensResult, ResultSink, ScanResult};
use std::path::PathBuf;

use crate::naming::OutputLocation;
use crate::persist;

const HEADER: [&str; 5] = ["port", "state", "service", "banner", "strategy"];

pub struct CsvExporter {
    location: OutputLocation,
}

impl CsvExporter {
    pub fn new(location: OutputLocation) -> Self {
        Self { location }
    }

    pub fn render(&self, result: &ScanResult) -> PortlensResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADER).map_err(export_error)?;

        for obs in &result.observations {
            writer
                .write_record([
                    obs.port.to_string().as_str(),
                    obs.state.as_str(),
                    obs.service.as_str(),
                    obs.banner.as_str(),
                    obs.strategy.as_str(),
                ])
                .map_err(export_error)?;
        }

        writer
            .into_inner()
            .map_err(|e| PortlensError::Export(e.to_string()))
    }
}

fn export_error(e: csv::Error) -> PortlensError {
    PortlensError::Export(e.to_string())
}

impl ResultSink for CsvExporter {
    fn write(&self, result: &ScanResult) -> PortlensResult<PathBuf> {
        let path = self.location.path_for(&result.target, "csv", Local::now());
        let body = self.render(result)?;
        persist(&path, &body)
    }

    fn format(&self) -> &'static str {
        "csv"
    }
}
