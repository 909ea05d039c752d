// crates/orchestrator/src/orchestrator.rs
//! Orchestrator - resolution, worker pool and result aggregation

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::collector::ResultCollector;
use crate::progress::ProgressTracker;
use crate::rate_limiter::RateLimiter;
use portlens_common::{
    PortSpec, PortlensError, PortlensResult, Prober, ScanConfig, ScanObserver, ScanPhase,
    ScanRequest, ScanResult, ScanStrategy,
};
use portlens_target_resolver::TargetResolver;

/// Orchestrator resolves the target, fans ports out to a fixed pool of
/// workers and collects what they observe.
pub struct Orchestrator {
    probers: HashMap<ScanStrategy, Arc<dyn Prober>>,
    resolver: TargetResolver,
    observer: Option<Arc<dyn ScanObserver>>,
    progress: Arc<ProgressTracker>,
    phase: Mutex<ScanPhase>,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            probers: HashMap::new(),
            resolver: TargetResolver::new(),
            observer: None,
            progress: Arc::new(ProgressTracker::new()),
            phase: Mutex::new(ScanPhase::Idle),
            cancel: CancellationToken::new(),
        }
    }

    /// Register a prober under the strategy it implements.
    pub fn add_prober(&mut self, prober: Arc<dyn Prober>) {
        self.probers.insert(prober.strategy(), prober);
    }

    pub fn with_resolver(mut self, resolver: TargetResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Receive each observation as soon as it is collected.
    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Token that stops the scan when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> ScanPhase {
        match *self.phase.lock().await {
            ScanPhase::Scanning { .. } => ScanPhase::Scanning {
                pending: self.progress.pending(),
            },
            other => other,
        }
    }

    /// Run one scan to completion.
    ///
    /// Validation and resolution errors abort before any probe is sent.
    /// Individual probe failures never surface here.
    #[instrument(skip(self, request), fields(target = %request.target, strategy = %request.strategy))]
    pub async fn run(&self, request: &ScanRequest) -> PortlensResult<ScanResult> {
        let outcome = self.execute(request).await;
        let phase = if outcome.is_ok() { ScanPhase::Done } else { ScanPhase::Aborted };
        self.set_phase(phase).await;
        outcome
    }

    async fn execute(&self, request: &ScanRequest) -> PortlensResult<ScanResult> {
        self.set_phase(ScanPhase::Resolving).await;
        request.validate()?;
        let prober = self.select_prober(request.strategy)?;
        let ports = PortSpec::parse(&request.ports)?;
        let address = self.resolver.resolve(&request.target).await?;

        let config = Arc::new(ScanConfig::new(request, address, ports));
        prober.prepare(&config)?;

        let workers = config.worker_count();
        info!(
            "Scanning {} ({}) ports={} workers={} with {}",
            config.target,
            config.address,
            config.ports,
            workers,
            prober.name()
        );

        self.progress.reset(config.ports.len());
        self.set_phase(ScanPhase::Scanning { pending: config.ports.len() }).await;

        let started = Instant::now();
        let collector = ResultCollector::new(self.observer.clone());
        let rate_limiter = request.rate_limit.map(|r| Arc::new(RateLimiter::new(r)));
        let queue = Arc::new(Mutex::new(config.ports.iter().collect::<VecDeque<u16>>()));

        // Fixed worker pool; each worker pops ports until the queue is empty.
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let queue = queue.clone();
            let config = config.clone();
            let prober = prober.clone();
            let collector = collector.clone();
            let progress = self.progress.clone();
            let rate_limiter = rate_limiter.clone();
            let cancel = self.cancel.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let next = queue.lock().await.pop_front();
                    let Some(port) = next else { break };

                    let attempt = async {
                        if let Some(limiter) = &rate_limiter {
                            limiter.acquire().await;
                        }
                        prober.probe(&config, port).await
                    };
                    let outcome = tokio::select! {
                        _ = cancel.cancelled() => break,
                        outcome = attempt => outcome,
                    };

                    progress.record(outcome.is_some());
                    match outcome {
                        Some(observation) => collector.append(observation).await,
                        None => debug!("port {} produced no observation", port),
                    }
                }
            }));
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| PortlensError::Worker(e.to_string()))?;
        }

        if self.cancel.is_cancelled() {
            info!("Scan cancelled after {} of {} ports", self.progress.probed(), config.ports.len());
            return Err(PortlensError::Cancelled);
        }

        let duration = started.elapsed();
        self.progress.print_summary(duration);

        Ok(ScanResult {
            target: config.target.clone(),
            address: config.address,
            strategy: config.strategy,
            observations: collector.into_observations().await,
            duration,
            port_count: config.ports.len(),
            probed: self.progress.probed(),
        })
    }

    async fn set_phase(&self, phase: ScanPhase) {
        debug!("phase -> {}", phase);
        *self.phase.lock().await = phase;
    }

    /// Select the prober registered for a strategy.
    fn select_prober(&self, strategy: ScanStrategy) -> PortlensResult<Arc<dyn Prober>> {
        self.probers.get(&strategy).cloned().ok_or_else(|| {
            PortlensError::Config(format!("no prober registered for '{}' scans", strategy))
        })
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
