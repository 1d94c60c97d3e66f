// SPDX-License-Identifier: MIT

//! xb - expbench CLI
//!
//! Thin surface over the trigger service: start runs, poll status, and
//! browse history. All state lives in `.xb/state.log` inside the
//! project folder.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use xb_core::{SystemClock, UuidIdGen};
use xb_engine::{LlmClassifier, ProcessRunnerLoader, RunService};
use xb_storage::Store;

const STATE_FILE: &str = "state.log";

#[derive(Parser)]
#[command(name = "xb", version, about = "expbench - experiment orchestration")]
struct Cli {
    /// Project folder containing .xb/config.toml
    #[arg(long, global = true, default_value = ".")]
    folder: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the project's full task list as a new job
    Run,
    /// Show one job's status
    Status { job_id: String },
    /// List recent runs
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Show full details for one run
    Details { job_id: String },
    /// Show historical runs of one challenge
    History {
        challenge_id: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}

type Service = RunService<SystemClock, UuidIdGen>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = build_service(&cli.folder)?;

    match cli.command {
        Commands::Run => run(&service, &cli.folder).await,
        Commands::Status { job_id } => status(&service, &cli.folder, &job_id),
        Commands::Recent { limit, offset } => recent(&service, &cli.folder, limit, offset),
        Commands::Details { job_id } => details(&service, &job_id),
        Commands::History {
            challenge_id,
            limit,
            offset,
        } => history(&service, &cli.folder, &challenge_id, limit, offset),
    }
}

fn build_service(folder: &Path) -> Result<Service> {
    let store = Store::open(&folder.join(xb_config::CONFIG_DIR).join(STATE_FILE))?;
    let classifier = LlmClassifier::new(
        env_or("XB_LLM_ENDPOINT", "https://api.openai.com/v1/chat/completions"),
        env_or("XB_LLM_API_KEY", ""),
        env_or("XB_LLM_MODEL", "gpt-4o-mini"),
    );
    Ok(RunService::new(
        store,
        Arc::new(ProcessRunnerLoader),
        Arc::new(classifier),
    ))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Project id from the folder's config document
fn project_id(folder: &Path) -> Result<String> {
    let config = xb_config::load_project_config(folder)?;
    Ok(config.project.id)
}

async fn run(service: &Service, folder: &Path) -> Result<()> {
    let project = service.register_project(folder)?;
    let job_id = service.create_job(&project.id)?;
    println!("Started job {}", job_id);

    let mut last_reported = 0;
    let snapshot = loop {
        let Some(snapshot) = service.get_job_status(&project.id, &job_id) else {
            anyhow::bail!("job disappeared: {}", job_id);
        };
        if let Some(current) = snapshot.current_task {
            if current > last_reported && !snapshot.status.is_terminal() {
                println!("  task {}/{}", current, snapshot.total_tasks);
                last_reported = current;
            }
        }
        if snapshot.status.is_terminal() {
            break snapshot;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    };

    println!("Job {} {}", job_id, snapshot.status);
    if let Some(error) = snapshot.details.get("error").and_then(|v| v.as_str()) {
        println!("  error: {}", error);
    }
    for (task_id, task_status) in &snapshot.task_status_map {
        println!("  {:<36} {}", task_id, task_status);
    }
    Ok(())
}

fn status(service: &Service, folder: &Path, job_id: &str) -> Result<()> {
    let project_id = project_id(folder)?;
    let Some(snapshot) = service.get_job_status(&project_id, job_id) else {
        anyhow::bail!("job not found: {}", job_id);
    };

    println!("Job: {}", snapshot.job_id);
    println!("  Project: {}", snapshot.project_id);
    println!("  Status: {}", snapshot.status);
    match snapshot.current_task {
        Some(current) => println!("  Progress: {}/{}", current, snapshot.total_tasks),
        None => println!("  Progress: -/{}", snapshot.total_tasks),
    }
    for (task_id, task_status) in &snapshot.task_status_map {
        println!("  {:<36} {}", task_id, task_status);
    }
    Ok(())
}

fn recent(service: &Service, folder: &Path, limit: usize, offset: usize) -> Result<()> {
    let project_id = project_id(folder)?;
    let runs = service.list_recent_runs(&project_id, limit, offset);

    if runs.is_empty() {
        println!("No runs");
        return Ok(());
    }
    println!(
        "{:<36} {:<10} {:<6} {:>5} {:>5} {:>5} {:>6} MODEL",
        "ID", "CREATED", "SCORE", "TOTAL", "PASS", "FAIL", "REGR"
    );
    for run in runs {
        println!(
            "{:<36} {:<10} {:<6.2} {:>5} {:>5} {:>5} {:>6} {}",
            run.id,
            run.created_at.format("%Y-%m-%d"),
            run.score,
            run.total,
            run.passed,
            run.failed,
            run.regression,
            run.model
        );
    }
    Ok(())
}

fn details(service: &Service, job_id: &str) -> Result<()> {
    let Some(details) = service.get_run_details(job_id) else {
        anyhow::bail!("job not found: {}", job_id);
    };

    println!("Job: {}", details.job_id);
    println!("  Project: {} ({})", details.project.name, details.project.id);
    println!("  Status: {}", details.status);
    println!("  Created: {}", details.created_at);
    if let Some(finished) = details.finished_at {
        println!("  Finished: {}", finished);
    }
    for task in &details.tasks {
        println!("  Task {} ({})", task.ordinal, task.challenge_id);
        println!("    Status: {}", task.status);
        if let Some(score) = task.eval_score {
            println!("    Score: {:.2}", score);
        }
        if let Some(passed) = task.eval_passed {
            println!("    Passed: {}", passed);
        }
        if let Some(error) = &task.error {
            println!("    Error: {}", error);
        }
    }
    Ok(())
}

fn history(
    service: &Service,
    folder: &Path,
    challenge_id: &str,
    limit: usize,
    offset: usize,
) -> Result<()> {
    let project_id = project_id(folder)?;
    let tasks = service.find_same_tasks(&project_id, challenge_id, limit, offset);

    if tasks.is_empty() {
        println!("No tasks for challenge {}", challenge_id);
        return Ok(());
    }
    println!("{:<36} {:<10} {:<6} PASSED", "JOB", "STATUS", "SCORE");
    for task in tasks {
        let score = task
            .eval_score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".to_string());
        let passed = task
            .eval_passed
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<36} {:<10} {:<6} {}",
            task.job_id, task.status, score, passed
        );
    }
    Ok(())
}
