use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use chat_proxy::client::{
    endpoint_url, friendly_message, sanitize_input, BackoffClient, ChatSession, ChatTurn,
    ClientError, Role, DEFAULT_API_BASE,
};
use chat_proxy::client::session::DEFAULT_SYSTEM_PROMPT;
use chat_proxy::http::Endpoint;
use chat_proxy::resilience::{BackoffConfig, RetryPolicy, DEFAULT_MAX_RETRIES};
use chat_proxy::upstream::ChatPayload;

#[derive(Parser)]
#[command(name = "chat-cli")]
#[command(about = "Talk to the chat proxy from a terminal", long_about = None)]
struct Cli {
    /// Proxy base URL
    #[arg(short, long, default_value = DEFAULT_API_BASE)]
    url: String,

    /// Retries after the first attempt
    #[arg(short, long, default_value_t = DEFAULT_MAX_RETRIES)]
    retries: u32,

    /// Delay before the first retry, in milliseconds
    #[arg(long, default_value_t = 500)]
    initial_delay_ms: u64,

    /// Per-attempt timeout, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// System prompt override
    #[arg(short, long)]
    system: Option<String>,

    /// Print raw JSON instead of the reply text
    #[arg(long)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Chat,
    Planner,
    CourseOutline,
}

impl From<Target> for Endpoint {
    fn from(t: Target) -> Self {
        match t {
            Target::Chat => Endpoint::Chat,
            Target::Planner => Endpoint::Planner,
            Target::CourseOutline => Endpoint::CourseOutline,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation over /api/chat (empty line or Ctrl+D exits)
    Chat,
    /// Send a single prompt to one endpoint
    Send {
        #[arg(short, long, value_enum, default_value = "chat")]
        endpoint: Target,
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let policy = RetryPolicy {
        max_retries: cli.retries,
        backoff: BackoffConfig::default().with_initial_delay(Duration::from_millis(cli.initial_delay_ms)),
    };
    let client = BackoffClient::with_policy(policy, Duration::from_secs(cli.timeout_secs))?;
    let system = cli.system.clone().unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    match cli.command {
        Commands::Chat => {
            let url = endpoint_url(&cli.url, Endpoint::Chat.path());
            let mut session = ChatSession::new(system);
            let stdin = io::stdin();
            loop {
                print!("> ");
                io::stdout().flush()?;

                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
                    break;
                }

                match session.submit(&client, &url, &line).await {
                    Ok(Some(reply)) => println!("{}\n", reply),
                    Ok(None) => {}
                    Err(e) => report(&e),
                }
            }
        }
        Commands::Send { endpoint, prompt } => {
            let url = endpoint_url(&cli.url, Endpoint::from(endpoint).path());
            let mut session = ChatSession::new(system);

            if cli.raw {
                let turn = ChatTurn::new(Role::User, sanitize_input(&prompt));
                let payload = ChatPayload::new(json!([turn]), session.payload().system_instruction);
                match client.send(&url, &payload).await {
                    Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                    Err(e) => report(&e),
                }
            } else {
                match session.submit(&client, &url, &prompt).await {
                    Ok(Some(reply)) => println!("{}", reply),
                    Ok(None) => eprintln!("Nothing to send after sanitizing the prompt"),
                    Err(e) => report(&e),
                }
            }
        }
    }

    Ok(())
}

fn report(err: &ClientError) {
    eprintln!("{}", friendly_message(err));
    eprintln!("Error: {}", err);
}
