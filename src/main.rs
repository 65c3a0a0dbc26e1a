// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use tokio::sync::broadcast::error::RecvError;

use chatwatch::app_config::{self, CONFIG_ENV_VAR, Config};
use chatwatch::app_controller::Controller;
use chatwatch::discovery::{self, ChannelDirectory};
use chatwatch::events::EventBus;
use chatwatch::language_utils::TargetLanguage;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the configured channels (default command)
    Run(RunArgs),

    /// Translate one text through the provider cascade and print the result
    Translate(TranslateArgs),

    /// List the teams and channels visible to the configured user
    Channels(ChannelsArgs),

    /// Generate shell completions for chatwatch
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that loads a configuration
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Target language code (vi, en, ja, id)
    #[arg(short, long)]
    target_language: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Channel id to watch; repeat to watch several (replaces the configured list)
    #[arg(short, long = "watch", value_name = "CHANNEL_ID")]
    watch: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct TranslateArgs {
    /// Text to translate
    #[arg(value_name = "TEXT")]
    text: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
struct ChannelsArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Write the listed channels to the configuration as the watch list
    #[arg(long)]
    save: bool,

    /// Numbers from the listing to keep when saving, e.g. "1,3,5" (default: all)
    #[arg(long, value_name = "LIST", requires = "save")]
    select: Option<String>,
}

/// chatwatch - chat channel monitor with translated alerts
#[derive(Parser, Debug)]
#[command(name = "chatwatch")]
#[command(version)]
#[command(about = "Watch chat channels, translate new messages, alert on mentions")]
#[command(long_about = "chatwatch follows a Mattermost-style websocket stream, translates every new post in the
watched channels through a cascade of providers, and raises an alert when you or the channel
are mentioned.

EXAMPLES:
    chatwatch                                   # Watch the channels listed in conf.json
    chatwatch run -w abc123 -w def456           # Watch specific channel ids
    chatwatch -t ja --log-level debug           # Translate into Japanese with debug logging
    chatwatch translate \"- one\\n- two\"          # Try the translation cascade once
    chatwatch channels --save --select 1,3      # Pick the channels to watch
    chatwatch completions bash > chatwatch.bash # Generate bash completions

CONFIGURATION:
    Configuration is read from --config, $CHATWATCH_CONFIG, ./conf.json or the user config
    directory. If no file exists, a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with the most verbose level; the effective
    // level is narrowed through set_max_level once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "chatwatch", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        Some(Commands::Channels(args)) => run_channels(args).await,
        Some(Commands::Run(args)) => run_monitor(args).await,
        None => run_monitor(cli.run).await,
    }
}

/// Load the configuration and apply CLI overrides shared by all commands
fn load_config(options: &CommonArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = Config::resolve_path(options.config.as_deref());
    let mut config = Config::load_or_create(&config_path)?;
    info!("Using configuration at {}", config_path.display());

    if let Some(target) = &options.target_language {
        config.target_language = target
            .parse::<TargetLanguage>()
            .with_context(|| format!("Invalid --target-language '{}'", target))?;
    }

    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

async fn run_monitor(options: RunArgs) -> Result<()> {
    let mut config = load_config(&options.common)?;

    if !options.watch.is_empty() {
        config.watch_channels = options.watch.clone();
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    let sink = tokio::spawn(console_sink(controller.events().clone()));

    tokio::select! {
        _ = controller.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Shutting down");
        }
    }

    sink.abort();
    Ok(())
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let config = load_config(&options.common)?;
    let target = config.target_language;
    let controller = Controller::with_config(config)?;

    let result = controller.translate_text(&options.text).await;
    if !result.success {
        return Err(anyhow!("No provider could translate the text into {}", target));
    }

    println!("{}", result.display_text());
    Ok(())
}

async fn run_channels(options: ChannelsArgs) -> Result<()> {
    let config = load_config(&options.common)?;
    let directory = ChannelDirectory::from_config(&config.server);

    let channels = directory
        .discover()
        .await
        .with_context(|| format!("Failed to list channels from {}", config.server.base_url))?;

    if channels.is_empty() {
        warn!("No channels found for this user");
        return Ok(());
    }

    for (i, channel) in channels.iter().enumerate() {
        println!("{:>3}. {} (ID: {})", i + 1, channel.label(), channel.id);
    }

    if !options.save {
        return Ok(());
    }

    let chosen: Vec<_> = match &options.select {
        Some(selection) => discovery::parse_selection(selection, channels.len())
            .into_iter()
            .map(|i| channels[i].clone())
            .collect(),
        None => channels,
    };
    if chosen.is_empty() {
        return Err(anyhow!("Selection matched none of the listed channels"));
    }

    // Reload so CLI overrides are not persisted
    let config_path = Config::resolve_path(options.common.config.as_deref());
    let mut stored = Config::load_or_create(&config_path)?;
    discovery::apply_to_config(&mut stored, &chosen);
    stored.save(&config_path)?;

    info!("Saved {} channel(s) to {}", chosen.len(), config_path.display());
    Ok(())
}

/// Log every event published by the worker
async fn console_sink(events: EventBus) {
    let mut messages = events.subscribe_messages();
    let mut connection = events.subscribe_connection();
    let mut counter = events.subscribe_counter();
    let mut alerts = events.subscribe_alerts();

    loop {
        tokio::select! {
            message = messages.recv() => match message {
                Ok(message) => {
                    info!("[#{}] {}: {}", message.channel, message.sender, message.original_text);
                    if !message.translated_text.is_empty() {
                        info!("    {}", message.translated_text);
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("Console fell behind, {} message(s) skipped", skipped),
                Err(RecvError::Closed) => break,
            },
            state = connection.recv() => match state {
                Ok(true) => info!("Connected"),
                Ok(false) => warn!("Disconnected"),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            count = counter.recv() => match count {
                Ok(count) => log::debug!("Messages processed: {}", count),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            alert = alerts.recv() => match alert {
                Ok(alert) => info!("🔔 {}: {}", alert.title, alert.body),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }
}
