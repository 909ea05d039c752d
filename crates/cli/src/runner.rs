// runner.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::args::ScanArgs;
use crate::output::{print_header, print_summary, ConsoleObserver};
use portlens_common::{PortSpec, PortlensError, Prober, ScanResult, ScanStrategy};
use portlens_orchestrator::Orchestrator;
use portlens_scanner_tcp::ConnectProber;
use portlens_scanner_udp::UdpProber;
use portlens_storage::OutputLocation;

/// Build the prober for the requested strategy.
///
/// SYN checks raw-socket privilege here so the scan never starts without it.
fn build_prober(strategy: ScanStrategy) -> Result<Arc<dyn Prober>> {
    let prober: Arc<dyn Prober> = match strategy {
        ScanStrategy::Connect => Arc::new(ConnectProber::new()),
        ScanStrategy::Udp => Arc::new(UdpProber::new()),
        ScanStrategy::Syn => {
            let syn = portlens_scanner_syn::init()
                .map_err(PortlensError::from)
                .context("SYN scan needs root or CAP_NET_RAW")?;
            Arc::new(syn)
        }
    };
    Ok(prober)
}

pub async fn run_scan(args: ScanArgs) -> Result<ScanResult> {
    let request = args.to_request();
    request.validate()?;
    let ports = PortSpec::parse(&request.ports)?;

    let mut orchestrator = Orchestrator::new().with_observer(Arc::new(ConsoleObserver));
    orchestrator.add_prober(build_prober(request.strategy)?);

    // Ctrl-C stops the workers; the orchestrator then reports Cancelled.
    let cancel = orchestrator.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n[!] Scan interrupted by user");
            cancel.cancel();
        }
    });

    print_header(&request, ports.len());
    let outcome = orchestrator.run(&request).await;
    interrupt.abort();

    let result = outcome.with_context(|| format!("scan of {} failed", request.target.trim()))?;
    info!(
        "{} observations from {} ports in {:.2}s",
        result.observations.len(),
        result.probed,
        result.duration_seconds()
    );
    print_summary(&result);

    if let Some(format) = args.export {
        let location = match &args.output {
            Some(stem) => OutputLocation::current_dir().with_stem(stem.clone()),
            None => OutputLocation::current_dir(),
        };
        let sink = format.exporter(location);
        match sink.write(&result) {
            Ok(path) => println!("[*] Results exported to {}", path.display()),
            Err(e) => {
                warn!("{} export failed: {}", sink.format(), e);
                return Err(e).context("could not export results");
            }
        }
    }

    Ok(result)
}
