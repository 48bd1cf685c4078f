// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use crate::app_config::{Config, GenerationProvider};
use crate::app_controller::{Controller, ExportOptions};
use crate::generation::LessonRequest;
use crate::payment::gateway::{self, MomoProvider};

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod generation;
mod payment;
mod providers;
mod render;
mod storage;

/// CLI Wrapper for GenerationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliGenerationProvider {
    Ollama,
    OpenAI,
    Anthropic,
}

impl From<CliGenerationProvider> for GenerationProvider {
    fn from(cli_provider: CliGenerationProvider) -> Self {
        match cli_provider {
            CliGenerationProvider::Ollama => GenerationProvider::Ollama,
            CliGenerationProvider::OpenAI => GenerationProvider::OpenAI,
            CliGenerationProvider::Anthropic => GenerationProvider::Anthropic,
        }
    }
}

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

/// CLI wrapper for the mobile-money operators
#[derive(Debug, Clone, ValueEnum)]
enum CliMomoProvider {
    Mtn,
    Vodafone,
    AirtelTigo,
}

impl From<CliMomoProvider> for MomoProvider {
    fn from(cli_provider: CliMomoProvider) -> Self {
        match cli_provider {
            CliMomoProvider::Mtn => MomoProvider::Mtn,
            CliMomoProvider::Vodafone => MomoProvider::Vodafone,
            CliMomoProvider::AirtelTigo => MomoProvider::AirtelTigo,
        }
    }
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Subject name (e.g. "Science")
    #[arg(long)]
    subject: String,

    /// Class / level (e.g. "Basic 4")
    #[arg(long)]
    level: String,

    /// Curriculum strand
    #[arg(long)]
    strand: String,

    /// Curriculum sub-strand
    #[arg(long)]
    sub_strand: String,

    /// Content standard identifier (e.g. "B4.1.1.1")
    #[arg(long)]
    content_standard: String,

    /// Note template name
    #[arg(long, default_value = "GES Standard")]
    template: String,

    /// Number of lessons in the note
    #[arg(long, default_value_t = 1)]
    lessons: u32,

    /// Generate one note per week for this many weeks
    #[arg(long, default_value_t = 1)]
    weeks: u32,

    /// Extra instructions appended to the prompt
    #[arg(long)]
    instructions: Option<String>,

    /// Output directory for exported documents
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip the .docx export
    #[arg(long)]
    no_docx: bool,

    /// Also write a print-ready .html export
    #[arg(long)]
    html: bool,

    /// Generation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliGenerationProvider>,

    /// Model name to use for generation
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Id of a stored note
    note_id: String,

    /// Output directory for exported documents
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip the .docx export
    #[arg(long)]
    no_docx: bool,

    /// Also write a print-ready .html export
    #[arg(long)]
    html: bool,
}

#[derive(Subcommand, Debug)]
enum WalletCommands {
    /// Show the wallet balance
    Balance,

    /// Start a mobile-money top-up
    Topup {
        /// Amount in Ghana cedis (e.g. 5.00)
        #[arg(long)]
        amount: f64,

        /// Mobile-money phone number
        #[arg(long)]
        phone: String,

        /// Mobile-money operator
        #[arg(long, value_enum)]
        network: CliMomoProvider,
    },

    /// Verify a pending top-up and credit the wallet
    Verify {
        /// Gateway transaction reference
        reference: String,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// Register or update a note template from a file
    Add {
        /// Template name referenced by --template at generation time
        #[arg(long)]
        name: String,

        /// File holding the template body
        #[arg(long)]
        file: PathBuf,

        /// Short description
        #[arg(long)]
        description: Option<String>,
    },

    /// Print a stored template body
    Show {
        /// Template name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate lesson notes (default command)
    Generate(GenerateArgs),

    /// Re-export a stored note as DOCX/HTML
    Export(ExportArgs),

    /// Wallet balance and mobile-money top-ups
    Wallet {
        #[command(subcommand)]
        command: WalletCommands,
    },

    /// Manage note templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Test the connection to the configured provider
    Check,

    /// Generate shell completions for lessonforge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// lessonforge - AI lesson notes for Ghanaian teachers
///
/// Generates curriculum-aligned lesson notes through AI providers
/// (Ollama, OpenAI, Anthropic) and exports them as DOCX or print-ready
/// HTML. Generations debit a local wallet topped up via mobile money.
#[derive(Parser, Debug)]
#[command(name = "lessonforge")]
#[command(version)]
#[command(about = "AI-powered lesson note generator")]
#[command(long_about = "lessonforge generates curriculum-aligned lesson notes with AI providers.

EXAMPLES:
    lessonforge generate --subject Science --level \"Basic 4\" \\
        --strand \"Diversity of Matter\" --sub-strand Materials \\
        --content-standard B4.1.1.1
    lessonforge generate ... --weeks 4 --html    # one note per week, plus HTML
    lessonforge wallet balance
    lessonforge wallet topup --amount 5.00 --phone 0244000000 --network mtn
    lessonforge wallet verify LF-ABCDEF123456
    lessonforge completions bash > lessonforge.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. API keys come from LESSONFORGE_API_KEY and
    LESSONFORGE_GATEWAY_KEY when set.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
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
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(cmd_log_level) = &cli.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "lessonforge", &mut std::io::stdout());
            Ok(())
        }
        Commands::Generate(args) => {
            let config = load_config(&cli.config_path, &cli.log_level, |config| {
                if let Some(provider) = &args.provider {
                    config.generation.provider = provider.clone().into();
                }
                if let Some(model) = &args.model {
                    let provider_str = config.generation.provider.to_lowercase_string();
                    if let Some(provider_config) = config
                        .generation
                        .available_providers
                        .iter_mut()
                        .find(|p| p.provider_type == provider_str)
                    {
                        provider_config.model = model.clone();
                    }
                }
            })?;
            run_generate(config, args).await
        }
        Commands::Export(args) => {
            let config = load_config(&cli.config_path, &cli.log_level, |_| {})?;
            run_export(config, args).await
        }
        Commands::Wallet { command } => {
            let config = load_config(&cli.config_path, &cli.log_level, |_| {})?;
            run_wallet(config, command).await
        }
        Commands::Template { command } => {
            let config = load_config(&cli.config_path, &cli.log_level, |_| {})?;
            run_template(config, command).await
        }
        Commands::Check => {
            let config = load_config(&cli.config_path, &cli.log_level, |_| {})?;
            let controller = Controller::with_config(config)?;
            controller.test_provider().await?;
            println!("Provider connection OK");
            Ok(())
        }
    }
}

/// Load the config file, creating a default one when missing, then apply
/// CLI overrides and validate.
fn load_config(
    config_path: &str,
    cli_log_level: &Option<CliLogLevel>,
    apply_overrides: impl FnOnce(&mut Config),
) -> Result<Config> {
    let mut config = if std::path::Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    apply_overrides(&mut config);

    if let Some(log_level) = cli_log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if cli_log_level.is_none() {
        // Just update the max level without reinitializing the logger
        log::set_max_level(level_filter(&config.log_level));
    }

    Ok(config)
}

async fn run_generate(config: Config, args: GenerateArgs) -> Result<()> {
    let controller = Controller::with_config(config)?;

    let options = ExportOptions {
        output_dir: args.output_dir.clone(),
        docx: !args.no_docx,
        html: args.html,
    };

    let base_request = LessonRequest {
        subject: args.subject.clone(),
        level: args.level.clone(),
        strand: args.strand.clone(),
        sub_strand: args.sub_strand.clone(),
        content_standard: args.content_standard.clone(),
        template_name: args.template.clone(),
        lesson_count: args.lessons,
        extra_instructions: args.instructions.clone(),
    };

    if args.weeks <= 1 {
        let note = controller.run(base_request, &options).await?;
        println!("Generated note {}", note.note_id);
        print_paths(&note.docx_path, &note.html_path);
        return Ok(());
    }

    let requests: Vec<LessonRequest> = (1..=args.weeks)
        .map(|week| {
            let mut request = base_request.clone();
            let week_line = format!("This note is for Week {}.", week);
            request.extra_instructions = Some(match &base_request.extra_instructions {
                Some(existing) => format!("{} {}", existing, week_line),
                None => week_line,
            });
            request
        })
        .collect();

    let notes = controller.run_many(requests, &options).await?;
    for (week, note) in notes.iter().enumerate() {
        println!("Week {}: note {}", week + 1, note.note_id);
        print_paths(&note.docx_path, &note.html_path);
    }

    Ok(())
}

fn print_paths(docx_path: &Option<PathBuf>, html_path: &Option<PathBuf>) {
    if let Some(path) = docx_path {
        println!("  docx: {}", path.display());
    }
    if let Some(path) = html_path {
        println!("  html: {}", path.display());
    }
}

async fn run_export(config: Config, args: ExportArgs) -> Result<()> {
    let controller = Controller::with_config(config)?;

    let options = ExportOptions {
        output_dir: args.output_dir,
        docx: !args.no_docx,
        html: args.html,
    };

    let (docx_path, html_path) = controller.export_note(&args.note_id, &options).await?;
    print_paths(&docx_path, &html_path);
    Ok(())
}

async fn run_template(config: Config, command: TemplateCommands) -> Result<()> {
    let controller = Controller::with_config(config)?;

    match command {
        TemplateCommands::Add { name, file, description } => {
            let body = file_utils::FileManager::read_to_string(&file)?;
            controller.add_template(&name, description, body).await?;
            println!("Stored template '{}'", name);
            Ok(())
        }
        TemplateCommands::Show { name } => {
            match controller.get_template(&name).await? {
                Some(template) => {
                    if let Some(description) = &template.description {
                        println!("# {}", description);
                    }
                    println!("{}", template.body);
                }
                None => println!("No template named '{}'", name),
            }
            Ok(())
        }
    }
}

async fn run_wallet(config: Config, command: WalletCommands) -> Result<()> {
    let controller = Controller::with_config(config)?;

    match command {
        WalletCommands::Balance => {
            let balance = controller.balance().await?;
            println!("Wallet balance: GHS {:.2}", balance as f64 / 100.0);
            Ok(())
        }
        WalletCommands::Topup { amount, phone, network } => {
            if amount <= 0.0 {
                return Err(anyhow!("Top-up amount must be positive"));
            }
            let amount_pesewas = (amount * 100.0).round() as i64;
            let reference = gateway::new_reference();

            let outcome = controller
                .topup(&phone, network.into(), amount_pesewas, &reference)
                .await?;

            println!("Charge initiated, reference: {}", outcome.reference);
            if let Some(text) = &outcome.display_text {
                println!("{}", text);
            }
            println!(
                "Approve the prompt on your phone, then run: lessonforge wallet verify {}",
                outcome.reference
            );
            Ok(())
        }
        WalletCommands::Verify { reference } => {
            let state = controller.verify_topup(&reference).await?;
            match state {
                payment::gateway::ChargeState::Success => {
                    let balance = controller.balance().await?;
                    println!(
                        "Payment confirmed. Wallet balance: GHS {:.2}",
                        balance as f64 / 100.0
                    );
                }
                payment::gateway::ChargeState::Pending => {
                    println!("Payment still pending; try again shortly.");
                }
                other => {
                    println!("Payment not completed: {:?}", other);
                }
            }
            Ok(())
        }
    }
}
