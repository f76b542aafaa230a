//! `agentdir run`: organize one directory, once.

use agentdir_agent::{AgentLoop, CancellationToken, ProviderReasoner, RunReport};
use agentdir_config::AppConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_TASK: &str = "organize all file in the directory";

pub struct RunArgs {
    pub dir: PathBuf,
    pub task: String,
    pub max_iterations: Option<u32>,
    pub show_trace: bool,
}

/// Returns whether the run completed.
pub async fn run(args: RunArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let task = args.task.trim();
    if task.is_empty() {
        return Err("Please enter a task.".into());
    }

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GEMINI_API_KEY=...       (default provider)");
        eprintln!("    OPENROUTER_API_KEY=...");
        eprintln!("    OPENAI_API_KEY=...");
        eprintln!("    AGENTDIR_API_KEY=...     (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    std::fs::create_dir_all(&args.dir)
        .map_err(|e| format!("Cannot create '{}': {e}", args.dir.display()))?;
    let dir = std::fs::canonicalize(&args.dir)?;

    let router = agentdir_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;

    let mut reasoner = ProviderReasoner::new(provider, config.effective_model())
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens);
    if let Some(instruction) = &config.agent.instruction {
        reasoner = reasoner.with_instruction(instruction.clone());
    }

    let agent = AgentLoop::for_directory(Arc::new(reasoner), dir.clone())?
        .with_max_iterations(args.max_iterations.unwrap_or(config.agent.max_iterations))
        .with_timeout(Duration::from_secs(config.agent.backend_timeout_secs));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            on_interrupt.cancel();
        }
    });

    info!(
        provider = %config.default_provider,
        model = %config.effective_model(),
        dir = %dir.display(),
        "Running agent"
    );

    let report = agent.run(task, &cancel).await;
    println!("{}", format_report(&dir, task, &report, args.show_trace));

    if !report.result.is_success() {
        eprintln!("Run did not complete successfully.");
    }
    Ok(report.result.is_success())
}

fn format_report(dir: &Path, task: &str, report: &RunReport, show_trace: bool) -> String {
    let mut out = String::new();
    if show_trace && !report.transcript.is_empty() {
        out.push_str("Trace:\n");
        out.push_str(&report.transcript.render());
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "Working directory: {}\n\nTask: {task}\n\nResult:\n{}",
        dir.display(),
        report.result.message()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentdir_core::{RunResult, Transcript};

    fn report(result: RunResult, transcript: Transcript) -> RunReport {
        RunReport {
            result,
            transcript,
            iterations: 1,
            tool_calls: 1,
        }
    }

    #[test]
    fn result_layout() {
        let out = format_report(
            Path::new("/data/inbox"),
            "make reports",
            &report(
                RunResult::Completed("Created reports folder".into()),
                Transcript::new(),
            ),
            false,
        );
        assert_eq!(
            out,
            "Working directory: /data/inbox\n\nTask: make reports\n\nResult:\nCreated reports folder"
        );
    }

    #[test]
    fn trace_is_printed_before_result_when_asked() {
        let mut transcript = Transcript::new();
        transcript.add_thought("need a folder");
        let out = format_report(
            Path::new("/data/inbox"),
            "make reports",
            &report(RunResult::Exhausted { iterations: 20 }, transcript),
            true,
        );
        assert!(out.starts_with("Trace:\n"));
        assert!(out.contains("need a folder"));
        assert!(out.ends_with("Iteration limit reached after 20 iterations without a final answer"));
    }
}
