//! Interactive tutor chat on the terminal.
//!
//! History is kept across turns; `exit`, `quit` or end of input stops it.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, Conversation, LlmProvider, Message, ToolRegistry};
use agent_runtime::OllamaProvider;
use english_tutor::{
    TutorConfig,
    prompts::CHAT_SYSTEM_PROMPT,
    scoring,
    tools::{ArithmeticTool, ScoreFeedbackTool, WebSearchTool},
};

fn is_exit_command(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "exit" | "quit")
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "You: ")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let config = TutorConfig::from_env()?;

    let provider: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::from_env());
    if !provider.health_check().await.unwrap_or(false) {
        tracing::warn!("Ollama not available - answers will fail until it is running");
    }

    let scorer = scoring::from_config(&config.scoring)?;
    let mut tools = ToolRegistry::new();
    tools.register(ArithmeticTool);
    tools.register(ScoreFeedbackTool::new(scorer));
    if let Some(key) = &config.tavily_api_key {
        tools.register(WebSearchTool::new(key.clone())?);
    }

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(Arc::new(tools))
        .system_prompt(CHAT_SYSTEM_PROMPT)
        .model(config.models.chat.clone())
        .build()?;

    println!("English tutor ({}) - type 'exit' or 'quit' to leave.", config.models.chat);

    let mut conversation = Conversation::with_system_prompt(agent.system_prompt());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        if is_exit_command(&line) {
            break;
        }
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        conversation.push(Message::user(line.trim()));
        conversation.truncate_to_fit();

        match agent.run(&mut conversation).await {
            Ok(answer) => println!("Tutor: {answer}\n"),
            Err(e) => {
                tracing::error!(error = %e, "Chat turn failed");
                println!("Tutor: {}\n", e.user_message());
            }
        }
        prompt()?;
    }

    println!("Goodbye!");
    Ok(())
}
