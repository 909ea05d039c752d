use clap::{Args, Parser, Subcommand};
use portlens_common::{ScanRequest, ScanStrategy};
use portlens_storage::ExportFormat;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "portlens")]
#[command(version)]
#[command(about = "A concurrent TCP/UDP port scanner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan one host
    Scan(ScanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Target IP address or hostname
    pub target: String,

    /// Ports to scan. Examples: 80,443 or 1-1024 or 22,80-90
    #[arg(short, long, default_value = "1-1000")]
    pub ports: String,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = ScanRequest::DEFAULT_THREADS)]
    pub threads: usize,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = 3)]
    pub timeout: u64,

    /// Scan type: connect, syn (needs root) or udp
    #[arg(short = 's', long = "scan-type", default_value = "connect", value_parser = parse_strategy)]
    pub scan_type: ScanStrategy,

    /// Maximum probes per second
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Export results to a file: text, json or csv
    #[arg(long, value_parser = parse_export)]
    pub export: Option<ExportFormat>,

    /// Output filename (without extension)
    #[arg(long, requires = "export")]
    pub output: Option<String>,
}

impl ScanArgs {
    pub fn to_request(&self) -> ScanRequest {
        ScanRequest::new(self.target.clone(), self.ports.clone())
            .with_threads(self.threads)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_strategy(self.scan_type)
            .with_rate_limit(self.rate_limit)
    }
}

fn parse_strategy(s: &str) -> Result<ScanStrategy, String> {
    s.parse().map_err(|e: portlens_common::PortlensError| e.to_string())
}

fn parse_export(s: &str) -> Result<ExportFormat, String> {
    s.parse().map_err(|e: portlens_common::PortlensError| e.to_string())
}
