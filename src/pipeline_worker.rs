// Pipeline worker for converting Windows cursors in a separate thread

use anyhow::Result;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::pipeline::batch::convert_roles_with;
use crate::pipeline::cursor_types::ConvertedCursor;

#[derive(Debug)]
pub enum WorkerMsg {
    LogMessage(String),
    /// Roles finished so far, total roles
    Progress(usize, usize),
    Converted { role: String, cursor: ConvertedCursor },
    Failed { role: String, error: String },
    /// Number of roles converted successfully
    Completed(usize),
    PipelineFailed(String),
}

pub struct PipelineWorker {
    tx: Sender<WorkerMsg>,
}

impl PipelineWorker {
    pub fn new(tx: Sender<WorkerMsg>) -> Self {
        Self { tx }
    }

    pub fn start_conversion(&self, config: Config) -> JoinHandle<()> {
        let tx = self.tx.clone();

        thread::spawn(move || {
            if let Err(e) = Self::run_conversion(&config, &tx) {
                let _ = tx.send(WorkerMsg::PipelineFailed(format!("{:#}", e)));
            }
        })
    }

    fn run_conversion(config: &Config, tx: &Sender<WorkerMsg>) -> Result<()> {
        let total = config.mapping.len();
        if total == 0 {
            let _ = tx.send(WorkerMsg::PipelineFailed(
                "No cursor roles mapped in config".to_string(),
            ));
            return Ok(());
        }

        let _ = tx.send(WorkerMsg::LogMessage(format!(
            "Converting {} cursor roles from {}",
            total,
            config.input_dir.display()
        )));

        let done = AtomicUsize::new(0);
        let outcomes = convert_roles_with(config, |outcome| {
            for warning in &outcome.warnings {
                let _ = tx.send(WorkerMsg::LogMessage(format!("{}: {}", outcome.role, warning)));
            }
            let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = tx.send(WorkerMsg::Progress(finished, total));
        })?;

        let mut converted = 0;
        let mut failed = 0;

        for outcome in outcomes {
            match outcome.result {
                Ok(cursor) => {
                    let _ = tx.send(WorkerMsg::LogMessage(format!(
                        "  ✓ {}: {}",
                        outcome.role,
                        cursor.summary_lines().join(", ")
                    )));
                    let _ = tx.send(WorkerMsg::Converted {
                        role: outcome.role,
                        cursor,
                    });
                    converted += 1;
                }
                Err(e) => {
                    let _ = tx.send(WorkerMsg::LogMessage(format!(
                        "  ✗ Failed to convert {}: {:#}",
                        outcome.role, e
                    )));
                    let _ = tx.send(WorkerMsg::Failed {
                        role: outcome.role,
                        error: format!("{:#}", e),
                    });
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            let _ = tx.send(WorkerMsg::LogMessage(format!(
                "Completed with {} successes and {} failures",
                converted, failed
            )));
        }

        let _ = tx.send(WorkerMsg::Completed(converted));
        Ok(())
    }
}
