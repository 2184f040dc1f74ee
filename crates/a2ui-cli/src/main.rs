use std::path::PathBuf;
use std::sync::Arc;

use a2ui_client::{HttpTransport, MemorySource, Session, StreamOutcome};
use a2ui_core::config::{Config, LoggingConfig};
use a2ui_core::data::DataModel;
use a2ui_core::protocol::{ClientRequest, UserAction};
use a2ui_render::outline;
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(
    name = "a2ui",
    about = "A2UI client runtime: stream agent-built surfaces and render them as text",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a captured event stream and print the resulting surfaces
    Replay {
        /// Capture file, or `-` for stdin
        input: String,

        /// Bytes per simulated network chunk
        #[arg(long, default_value_t = 64)]
        chunk_size: usize,
    },

    /// Send a prompt to the agent server and render the reply
    Prompt {
        /// Message to send
        #[arg(short, long)]
        message: String,

        /// Target an existing surface
        #[arg(long)]
        surface_id: Option<String>,

        /// Override the configured server URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Send a user action to the agent server
    Action {
        /// Action name
        #[arg(long)]
        name: String,

        /// Surface the action belongs to
        #[arg(long)]
        surface_id: String,

        /// Form data as a JSON object
        #[arg(long)]
        form_data: Option<String>,

        /// Override the configured server URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Check the configuration for problems
    Validate,
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        logging.level.clone().unwrap_or_else(|| "info".into())
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = tracing_subscriber::EnvFilter::new(level);
        for directive in &logging.filters {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => eprintln!("Ignoring log filter '{directive}': {e}"),
            }
        }
        filter
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match (logging.format.as_str(), logging.output.as_str()) {
        ("json", "stdout") => builder.json().with_writer(std::io::stdout).init(),
        ("json", _) => builder.json().with_writer(std::io::stderr).init(),
        (_, "stdout") => builder.with_writer(std::io::stdout).init(),
        _ => builder.with_writer(std::io::stderr).init(),
    }
}

async fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::new();
    if input == "-" {
        tokio::io::stdin().read_to_end(&mut data).await?;
    } else {
        data = tokio::fs::read(input).await?;
    }
    Ok(data)
}

fn connect(config: &Config, url: Option<String>) -> anyhow::Result<Session> {
    let mut config = config.clone();
    if let Some(url) = url {
        config.server.get_or_insert_with(Default::default).url = Some(url);
    }
    let transport = HttpTransport::from_config(&config)?;
    tracing::info!("Using agent server at {}", transport.url());
    Ok(Session::new()
        .with_config(&config)
        .with_transport(Arc::new(transport)))
}

/// Send `request`, apply the reply, and stop early on Ctrl-C.
async fn run_request(session: &mut Session, request: &ClientRequest) -> anyhow::Result<StreamOutcome> {
    let pending = session.send(request).await?;
    let token = pending.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    Ok(session.run_stream(pending).await?)
}

fn print_log(session: &Session) {
    for entry in session.log() {
        let surface = entry.message.surface_id().unwrap_or("-");
        println!(
            "{} {:<16} {surface}",
            entry.at.format("%H:%M:%S%.3f"),
            entry.message.kind()
        );
    }
}

fn print_surfaces(session: &mut Session) {
    let ids: Vec<String> = session
        .registry()
        .iter()
        .map(|s| s.surface_id.clone())
        .collect();
    for id in ids {
        if let Some(tree) = session.render(&id) {
            println!("\n== surface {id} ==");
            print!("{}", outline(&tree));
        }
    }
}

fn print_outcome(session: &mut Session, outcome: &StreamOutcome) {
    print_log(session);
    print_surfaces(session);
    println!(
        "\n{} message(s) applied, stream {}",
        outcome.messages, outcome.finished
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    let config = Config::load(&config_path)?;

    // Initialize logging
    init_logging(&config.logging(), cli.verbose);

    match cli.command {
        Commands::Replay { input, chunk_size } => {
            let data = read_input(&input).await?;
            tracing::info!("Replaying {} bytes from {input}", data.len());
            let mut session = Session::new().with_config(&config);
            let outcome = session.replay(MemorySource::split(&data, chunk_size)).await?;
            print_outcome(&mut session, &outcome);
        }
        Commands::Prompt {
            message,
            surface_id,
            url,
        } => {
            let mut session = connect(&config, url)?;
            let request = ClientRequest::prompt(message, surface_id);
            let outcome = run_request(&mut session, &request).await?;
            print_outcome(&mut session, &outcome);
        }
        Commands::Action {
            name,
            surface_id,
            form_data,
            url,
        } => {
            let form_data: DataModel = match form_data {
                Some(raw) => serde_json::from_str(&raw)?,
                None => DataModel::new(),
            };
            let mut session = connect(&config, url)?;
            let request = ClientRequest::action(UserAction::new(name, surface_id, form_data));
            let outcome = run_request(&mut session, &request).await?;
            print_outcome(&mut session, &outcome);
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Validate => {
                println!("Config: {}", config_path.display());
                let (warnings, errors) = config.validate();
                for warning in &warnings {
                    println!("warning: {warning}");
                }
                for error in &errors {
                    println!("error: {error}");
                }
                if !errors.is_empty() {
                    anyhow::bail!("{} configuration error(s)", errors.len());
                }
                println!("OK ({} warning(s))", warnings.len());
            }
        },
    }

    Ok(())
}
