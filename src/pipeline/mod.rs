//! The delivery pipeline: checkout, build, login, push.
//!
//! Stages run strictly in order with no parallelism and no retries; the
//! first failure aborts the remainder and names the stage that failed.

mod exec;
mod stages;

use stages::{Credentials, Stage, StageAction, plan};

use crate::config::Config;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("stage `{stage}` failed to start: {source}")]
    Spawn {
        stage: &'static str,
        source: std::io::Error,
    },

    #[error("stage `{stage}` failed with {status}")]
    StageFailed {
        stage: &'static str,
        status: std::process::ExitStatus,
    },

    #[error("credential environment variable `{var}` is not set")]
    MissingCredential { var: String },

    #[error("build context `{path}` does not exist or is not a directory")]
    MissingContext { path: std::path::PathBuf },
}

/// Outcome of one completed stage.
#[derive(Clone, Debug)]
pub struct StageReport {
    pub name: &'static str,
    pub duration: Duration,
}

/// Run the full pipeline, or print the plan when `dry_run` is set.
pub fn run(config: &Config, dry_run: bool) -> Result<Vec<StageReport>, PipelineError> {
    if dry_run {
        // Use real credentials for the printed plan when they happen to be
        // set; the password stays on stdin either way.
        let creds = Credentials::from_env(&config.pipeline).ok();
        for stage in plan(&config.pipeline, creds.as_ref()) {
            match &stage.action {
                StageAction::Run(spec) => info!(stage = stage.name, "would run: {spec}"),
                StageAction::EnsureDir(path) => {
                    info!(stage = stage.name, "would verify directory: {}", path.display());
                }
            }
        }
        return Ok(Vec::new());
    }

    let creds = Credentials::from_env(&config.pipeline)?;
    let stages = plan(&config.pipeline, Some(&creds));
    let reports = run_stages(&stages)?;

    let total: Duration = reports.iter().map(|r| r.duration).sum();
    info!(
        image = %config.image_ref(),
        stages = reports.len(),
        "pipeline finished in {:.1}s",
        total.as_secs_f64()
    );
    Ok(reports)
}

/// Execute stages sequentially, failing fast on the first error.
fn run_stages(stages: &[Stage]) -> Result<Vec<StageReport>, PipelineError> {
    let mut reports = Vec::with_capacity(stages.len());

    for stage in stages {
        let started = Instant::now();
        info!(stage = stage.name, "starting");

        match &stage.action {
            StageAction::Run(spec) => {
                info!(stage = stage.name, "{spec}");
                let status = exec::run(spec).map_err(|source| PipelineError::Spawn {
                    stage: stage.name,
                    source,
                })?;
                if !status.success() {
                    error!(stage = stage.name, %status, "stage failed, aborting pipeline");
                    return Err(PipelineError::StageFailed {
                        stage: stage.name,
                        status,
                    });
                }
            }
            StageAction::EnsureDir(path) => {
                if !path.is_dir() {
                    error!(stage = stage.name, path = %path.display(), "missing build context");
                    return Err(PipelineError::MissingContext { path: path.clone() });
                }
            }
        }

        let duration = started.elapsed();
        info!(stage = stage.name, "done in {:.1}s", duration.as_secs_f64());
        reports.push(StageReport {
            name: stage.name,
            duration,
        });
    }

    Ok(reports)
}
