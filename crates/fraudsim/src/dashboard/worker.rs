//! Background worker for running simulations without blocking the UI.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use fraudsim_core::{SimConfig, SimError, SimulationProgress};

use crate::pipeline::{RunArtifacts, Stage, run_pipeline_with_progress};

/// Request sent to the background worker
#[derive(Debug)]
pub enum SimulationRequest {
    /// Run baseline, stress, sensitivity and (with a model) the threshold curve
    Analysis { config: SimConfig },
    /// Graceful shutdown
    Shutdown,
}

/// Response from the background worker
#[derive(Debug)]
pub enum SimulationResponse {
    /// A new analysis stage started
    Stage(Stage),
    /// Analysis completed (boxed to reduce enum size)
    Complete(Box<RunArtifacts>),
    /// Analysis was cancelled
    Cancelled,
    /// Error occurred
    Error(String),
}

/// Background worker that runs simulations on a separate thread
pub struct SimulationWorker {
    request_tx: Sender<SimulationRequest>,
    response_rx: Receiver<SimulationResponse>,
    cancel_flag: Arc<AtomicBool>,
    progress: Arc<AtomicUsize>,
    thread: Option<JoinHandle<()>>,
}

impl SimulationWorker {
    /// Create a new simulation worker with a background thread
    pub fn new() -> Self {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(AtomicUsize::new(0));

        let ctx = WorkerContext {
            response_tx,
            progress: SimulationProgress::from_atomics(progress.clone(), cancel_flag.clone()),
        };

        let thread = thread::spawn(move || {
            ctx.run(request_rx);
        });

        Self {
            request_tx,
            response_rx,
            cancel_flag,
            progress,
            thread: Some(thread),
        }
    }

    /// Send a simulation request to the worker
    pub fn send(&self, request: SimulationRequest) -> bool {
        // Clear cancel flag for new work
        self.cancel_flag.store(false, Ordering::SeqCst);
        self.progress.store(0, Ordering::SeqCst);
        self.request_tx.send(request).is_ok()
    }

    /// Try to receive a response (non-blocking)
    pub fn try_recv(&self) -> Option<SimulationResponse> {
        self.response_rx.try_recv().ok()
    }

    /// Paths simulated so far across all analysis stages
    pub fn get_progress(&self) -> usize {
        self.progress.load(Ordering::SeqCst)
    }

    /// Request cancellation of the current operation
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    /// Shutdown the worker thread
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(SimulationRequest::Shutdown);
    }
}

impl Default for SimulationWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.cancel();
        self.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Shared state for the background worker thread.
struct WorkerContext {
    response_tx: Sender<SimulationResponse>,
    progress: SimulationProgress,
}

impl WorkerContext {
    fn run(&self, request_rx: Receiver<SimulationRequest>) {
        while let Ok(request) = request_rx.recv() {
            match request {
                SimulationRequest::Shutdown => break,

                SimulationRequest::Analysis { config } => {
                    tracing::info!(
                        n_paths = config.n_paths,
                        seed = config.seed,
                        "Starting dashboard analysis"
                    );

                    let response = match run_pipeline_with_progress(
                        &config,
                        0,
                        &self.progress,
                        |stage| {
                            let _ = self.response_tx.send(SimulationResponse::Stage(stage));
                        },
                    ) {
                        Ok(artifacts) => SimulationResponse::Complete(Box::new(artifacts)),
                        Err(SimError::Cancelled) => {
                            tracing::info!("Dashboard analysis cancelled");
                            SimulationResponse::Cancelled
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Dashboard analysis failed");
                            SimulationResponse::Error(e.to_string())
                        }
                    };
                    let _ = self.response_tx.send(response);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::total_paths;
    use std::time::{Duration, Instant};

    fn wait_for_final(worker: &SimulationWorker) -> (Vec<Stage>, SimulationResponse) {
        let deadline = Instant::now() + Duration::from_secs(60);
        let mut stages = Vec::new();
        while Instant::now() < deadline {
            match worker.try_recv() {
                Some(SimulationResponse::Stage(stage)) => stages.push(stage),
                Some(other) => return (stages, other),
                None => thread::sleep(Duration::from_millis(10)),
            }
        }
        panic!("worker did not finish in time");
    }

    #[test]
    fn test_worker_completes_analysis() {
        let worker = SimulationWorker::new();
        let config = SimConfig {
            n_paths: 300,
            sensitivity_paths: 100,
            ..Default::default()
        };
        let total = total_paths(&config, 0);
        assert!(worker.send(SimulationRequest::Analysis { config }));

        let (stages, last) = wait_for_final(&worker);
        assert_eq!(stages.first(), Some(&Stage::Baseline));
        match last {
            SimulationResponse::Complete(artifacts) => {
                assert_eq!(artifacts.baseline_result.n_paths(), 300);
            }
            other => panic!("unexpected response {other:?}"),
        }
        assert_eq!(worker.get_progress(), total);
    }

    #[test]
    fn test_worker_reports_invalid_config() {
        let worker = SimulationWorker::new();
        let config = SimConfig {
            horizon_months: 0,
            ..Default::default()
        };
        worker.send(SimulationRequest::Analysis { config });

        let (_, last) = wait_for_final(&worker);
        assert!(matches!(last, SimulationResponse::Error(msg) if msg.contains("horizon_months")));
    }
}
