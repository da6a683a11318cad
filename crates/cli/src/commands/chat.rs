//! `infoagent chat` — Interactive or single-message chat mode.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use infoagent_agent::AgentLoop;
use infoagent_config::AppConfig;
use infoagent_core::message::{Conversation, Message};
use infoagent_core::provider::Provider;
use infoagent_providers::{OpenAiCompatProvider, RetryProvider};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export OPENROUTER_API_KEY='sk-or-v1-...'   (recommended)");
        eprintln!("    export INFOAGENT_API_KEY='sk-or-v1-...'    (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!(
            "    {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
        eprintln!("  Get an OpenRouter key at: https://openrouter.ai/keys");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    let provider = Arc::new(OpenAiCompatProvider::openrouter(&api_key));
    let provider: Arc<dyn Provider> = Arc::new(RetryProvider::new(provider));

    let tools = Arc::new(infoagent_tools::default_registry(
        config.search_api_key.clone(),
    ));

    let mut agent = AgentLoop::new(provider, &config.model, config.temperature, tools)
        .with_max_iterations(config.max_iterations)
        .with_dispatch(config.tool_dispatch);
    if let Some(max_tokens) = config.max_tokens {
        agent = agent.with_max_tokens(max_tokens);
    }

    match message {
        Some(text) => run_single(&agent, &text).await,
        None => run_interactive(&agent, &config).await,
    }
}

/// One-shot mode: send the message, print the answer, exit.
async fn run_single(agent: &AgentLoop, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut conversation = Conversation::new();
    conversation.push(Message::user(text));

    eprint!("  Thinking...");
    let response = agent.process(&mut conversation).await?;
    eprint!("\r              \r");

    println!("{response}");
    Ok(())
}

/// Interactive REPL over stdin. Each line is its own conversation,
/// matching single-message mode.
async fn run_interactive(
    agent: &AgentLoop,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let search_note = if config.search_api_key.is_none() {
        " (no search key)"
    } else {
        ""
    };

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         InfoAgent — Interactive Mode         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.provider);
    println!("  Model:     {}", config.model);
    println!("  Tools:     calculator, weather_lookup, web_search{search_note}");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or 'quit' to leave.");
    println!();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let mut conversation = Conversation::new();
        conversation.push(Message::user(line));

        eprint!("  Thinking...");
        match agent.process(&mut conversation).await {
            Ok(response) => {
                eprint!("\r              \r");
                println!();
                for answer_line in response.lines() {
                    println!("  Assistant > {answer_line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r              \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}
