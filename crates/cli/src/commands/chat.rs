//! `neuroqueue chat` — Single-message or interactive pipeline runs.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use neuroqueue_agent::{Controller, ExecutionMode, WorkflowResult, default_agents};
use neuroqueue_config::AppConfig;
use neuroqueue_core::retrieval::Retriever;
use neuroqueue_memory::{DocumentStore, SalienceMemory};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

pub struct ChatOptions {
    pub message: Option<String>,
    pub parallel: bool,
    pub no_rag: bool,
    pub docs: Option<PathBuf>,
}

pub async fn run(options: ChatOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let docs = match &options.docs {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        None => String::new(),
    };

    let mut controller = build_controller(&config, options.parallel, options.no_rag);

    if let Some(message) = options.message {
        eprint!("  Thinking...");
        let result = controller.run_workflow(&message, &docs).await?;
        eprint!("\r              \r");
        print_result(&result);
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║       NeuroQueue — Interactive Mode          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Mode:      {}", controller.mode());
    println!(
        "  Memory:    {} entries (salience {})",
        config.memory.capacity,
        if config.memory.salience_enabled { "on" } else { "off" }
    );
    println!();
    println!("  Type your message and press Enter. /help lists commands.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        if let Some(parsed) = SlashCommand::parse(line) {
            match parsed {
                Ok(command) => match command.execute(&mut controller).await {
                    Ok(reply) => println!("{reply}"),
                    Err(e) => eprintln!("  [Error] {e}"),
                },
                Err(e) => eprintln!("  [Error] {e}"),
            }
            println!();
            continue;
        }

        eprint!("  ...");
        match controller.run_workflow(line, &docs).await {
            Ok(result) => {
                eprint!("\r     \r");
                print_result(&result);
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
            }
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

/// Open the configured document store, or `None` when retrieval is off or
/// the store cannot be read.
pub fn open_retriever(config: &AppConfig, no_rag: bool) -> Option<Arc<dyn Retriever>> {
    if !config.retrieval.enabled || no_rag {
        return None;
    }
    let path = config.retrieval.resolved_path();
    match DocumentStore::open(&path) {
        Ok(store) => {
            info!(path = %path.display(), "Document retrieval enabled");
            Some(Arc::new(store))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Document store unavailable; continuing without retrieval");
            None
        }
    }
}

/// Assemble the pipeline described by `config`.
///
/// A document store that cannot be opened is reported once and the
/// pipeline runs without retrieval.
pub fn build_controller(config: &AppConfig, parallel: bool, no_rag: bool) -> Controller {
    let memory = Arc::new(SalienceMemory::new(
        config.memory.capacity,
        config.memory.salience_enabled,
    ));
    let generator = neuroqueue_providers::build_from_config(config);

    let agents = default_agents(
        memory.clone(),
        generator.clone(),
        open_retriever(config, no_rag),
        config.retrieval.top_k,
    );
    let mode = if parallel || config.workflow.parallel {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    };

    Controller::new(memory, generator, agents).with_mode(mode)
}

fn print_result(result: &WorkflowResult) {
    for out in &result.agent_outputs {
        println!();
        println!("  ── {} ──", out.agent);
        for line in out.output.lines() {
            println!("  {line}");
        }
    }
    if let Some(consensus) = &result.consensus {
        println!();
        println!("  ── Consensus ──");
        for line in consensus.lines() {
            println!("  {line}");
        }
    }
    println!();
    println!("  ── Memory ──");
    println!("{}", result.memory);
}

const HELP: &str = "\
  /size N                     Resize working memory
  /clear                      Forget everything in working memory
  /memory                     Show working memory entries
  /export FILE                Write working memory to FILE as JSON
  /mode sequential|parallel   Switch execution mode
  /help                       Show this help
  exit | quit                 Leave";

/// An interactive slash command.
#[derive(Debug, PartialEq)]
enum SlashCommand {
    Size(usize),
    Clear,
    Memory,
    Export(PathBuf),
    Mode(ExecutionMode),
    Help,
}

impl SlashCommand {
    /// `None` if `line` is not a slash command at all.
    fn parse(line: &str) -> Option<Result<Self, String>> {
        let rest = line.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        Some(match (name, arg) {
            ("size", Some(n)) => n
                .parse::<usize>()
                .map(Self::Size)
                .map_err(|_| format!("'{n}' is not a valid size")),
            ("size", None) => Err("usage: /size N".into()),
            ("clear", _) => Ok(Self::Clear),
            ("memory", _) => Ok(Self::Memory),
            ("export", Some(path)) => Ok(Self::Export(PathBuf::from(path))),
            ("export", None) => Err("usage: /export FILE".into()),
            ("mode", Some(mode)) => mode.parse().map(Self::Mode),
            ("mode", None) => Err("usage: /mode sequential|parallel".into()),
            ("help", _) => Ok(Self::Help),
            (other, _) => Err(format!("unknown command '/{other}' (try /help)")),
        })
    }

    async fn execute(self, controller: &mut Controller) -> Result<String, Box<dyn std::error::Error>> {
        let memory = controller.memory().clone();
        match self {
            Self::Size(n) => {
                memory.resize(n).await?;
                Ok(format!("  Memory capacity set to {n}"))
            }
            Self::Clear => {
                memory.clear().await;
                Ok("  Memory cleared".into())
            }
            Self::Memory => {
                let items = memory.items().await;
                if items.is_empty() {
                    return Ok("  (memory is empty)".into());
                }
                Ok(items
                    .iter()
                    .map(|e| {
                        format!(
                            "  [{}] {} ({:.2}): {}",
                            e.timestamp.format("%H:%M:%S"),
                            e.role,
                            e.salience,
                            e.text
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Self::Export(path) => {
                let json = memory.export().await?;
                std::fs::write(&path, json)
                    .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
                Ok(format!("  Memory exported to {}", path.display()))
            }
            Self::Mode(mode) => {
                controller.set_mode(mode);
                Ok(format!("  Execution mode: {mode}"))
            }
            Self::Help => Ok(HELP.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn controller() -> Controller {
        let mut config = AppConfig::default();
        config.retrieval.enabled = false;
        build_controller(&config, false, false)
    }

    #[test]
    fn parses_slash_commands() {
        assert_eq!(SlashCommand::parse("hello"), None);
        assert_eq!(SlashCommand::parse("/size 8"), Some(Ok(SlashCommand::Size(8))));
        assert_eq!(SlashCommand::parse("/clear"), Some(Ok(SlashCommand::Clear)));
        assert_eq!(
            SlashCommand::parse("/mode parallel"),
            Some(Ok(SlashCommand::Mode(ExecutionMode::Parallel)))
        );
        assert_eq!(
            SlashCommand::parse("/export out.json"),
            Some(Ok(SlashCommand::Export(PathBuf::from("out.json"))))
        );
        assert!(matches!(SlashCommand::parse("/size big"), Some(Err(_))));
        assert!(matches!(SlashCommand::parse("/mode"), Some(Err(_))));
        assert!(matches!(SlashCommand::parse("/teleport"), Some(Err(_))));
    }

    #[test]
    fn config_flags_select_mode() {
        let mut config = AppConfig::default();
        config.retrieval.enabled = false;
        assert_eq!(
            build_controller(&config, false, false).mode(),
            ExecutionMode::Sequential
        );
        assert_eq!(
            build_controller(&config, true, false).mode(),
            ExecutionMode::Parallel
        );

        config.workflow.parallel = true;
        assert_eq!(
            build_controller(&config, false, true).mode(),
            ExecutionMode::Parallel
        );
    }

    fn retrieval_config(path: PathBuf) -> AppConfig {
        let mut config = AppConfig::default();
        config.retrieval.persist_path = Some(path);
        config
    }

    #[test]
    fn opens_store_at_configured_path() {
        let dir = TempDir::new().unwrap();
        let config = retrieval_config(dir.path().join("documents.jsonl"));

        assert!(open_retriever(&config, false).is_some());
        assert!(open_retriever(&config, true).is_none());
    }

    #[test]
    fn disabled_retrieval_opens_nothing() {
        let dir = TempDir::new().unwrap();
        let mut config = retrieval_config(dir.path().join("documents.jsonl"));
        config.retrieval.enabled = false;

        assert!(open_retriever(&config, false).is_none());
    }

    #[test]
    fn unreadable_store_degrades_to_no_retrieval() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be read as a document file.
        let config = retrieval_config(dir.path().to_path_buf());

        assert!(open_retriever(&config, false).is_none());
        assert_eq!(build_controller(&config, false, false).agents().len(), 4);
    }

    #[tokio::test]
    async fn size_clear_and_mode_act_on_controller() {
        let mut controller = controller();
        let memory = controller.memory().clone();
        for i in 0..4 {
            memory.add_item("User", &format!("turn {i}"), None).await;
        }

        SlashCommand::Size(2).execute(&mut controller).await.unwrap();
        assert_eq!(memory.len().await, 2);
        assert_eq!(memory.capacity().await, 2);

        assert!(SlashCommand::Size(0).execute(&mut controller).await.is_err());

        SlashCommand::Mode(ExecutionMode::Parallel)
            .execute(&mut controller)
            .await
            .unwrap();
        assert_eq!(controller.mode(), ExecutionMode::Parallel);

        SlashCommand::Clear.execute(&mut controller).await.unwrap();
        assert!(memory.is_empty().await);
        let listing = SlashCommand::Memory.execute(&mut controller).await.unwrap();
        assert!(listing.contains("empty"));
    }

    #[tokio::test]
    async fn export_writes_memory_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.json");
        let mut controller = controller();
        controller.memory().add_item("User", "remember me", None).await;

        SlashCommand::Export(path.clone())
            .execute(&mut controller)
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["text"], "remember me");
    }
}
