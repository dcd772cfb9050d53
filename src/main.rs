use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use mainframe_bot::application::errors::error_chain;
use mainframe_bot::domain::entities::{ChannelId, Event, GuildId, Message, MessageId, User};
use mainframe_bot::domain::traits::{Platform, Store};
use mainframe_bot::infrastructure::adapters::ConsoleAdapter;
use mainframe_bot::infrastructure::config::Config;
use mainframe_bot::infrastructure::database::SqliteStore;
use mainframe_bot::Bot;

const CONSOLE_GUILD: GuildId = GuildId(1);
const CONSOLE_CHANNEL: ChannelId = ChannelId(1);

#[derive(Parser)]
#[command(name = "mainframe-bot")]
#[command(about = "Event-driven chat bot with plugins and timed restrictions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("mainframe-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config(&cli.config);
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if !Path::new(config_path).exists() {
        return Config::load_env();
    }
    match Config::load(config_path) {
        Ok(config) => config.with_env(),
        Err(e) => {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        }
    }
}

fn run_bot(config_path: &str) -> Result<(), String> {
    let config = load_config(config_path);
    tracing::info!("Starting {}", config.bot.name);

    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&config.database.path).map_err(|e| format!("Failed to open database: {}", error_chain(&e)))?,
    );
    tracing::info!("Database initialized at {}", config.database.path.display());

    if config.bot.token.is_some() {
        tracing::warn!("No gateway client is built in, ignoring token and using the console adapter");
    }
    let console = Arc::new(ConsoleAdapter::new().with_echo());
    console.add_guild(CONSOLE_GUILD, "console");
    let you = User::new(2).with_username("you");
    console.add_member(CONSOLE_GUILD, you.clone(), Vec::new());
    let platform: Arc<dyn Platform> = console;

    let rt = tokio::runtime::Runtime::new().map_err(|e| format!("Failed to start runtime: {}", e))?;
    rt.block_on(async move {
        let bot = Bot::new(config, store, Arc::clone(&platform));
        let (tx, rx) = mpsc::channel(64);

        let _ = tx.send(Event::Ready { user: platform.self_user() }).await;
        let _ = tx.send(Event::GuildJoined { guild: CONSOLE_GUILD }).await;
        tokio::spawn(read_console(tx, you));

        tokio::select! {
            _ = bot.run(rx) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
        bot.shutdown();
    });
    Ok(())
}

/// Turn stdin lines into messages from the console user
async fn read_console(tx: mpsc::Sender<Event>, author: User) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut next_id = 1u64;

    while let Ok(Some(line)) = lines.next_line().await {
        let message = Message::from_text(MessageId(next_id), CONSOLE_GUILD, CONSOLE_CHANNEL, author.clone(), line);
        next_id += 1;
        if tx.send(Event::MessageReceived(message)).await.is_err() {
            break;
        }
    }
}

fn init_config(config_path: &str) {
    let yaml = match Config::default().to_yaml() {
        Ok(yaml) => yaml,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if Path::new(config_path).exists() {
        eprintln!("{} already exists, not overwriting", config_path);
        std::process::exit(1);
    }

    match std::fs::write(config_path, yaml) {
        Ok(()) => println!("Wrote default config to {}", config_path),
        Err(e) => {
            eprintln!("Failed to write {}: {}", config_path, e);
            std::process::exit(1);
        }
    }
}
