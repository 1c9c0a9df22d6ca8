mod commands;
mod desired;

use clap::{ArgGroup, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::asset::{AssetFields, AssetTypeRef};
use commands::{exit_code_for, resolve_config, ConnectionOptions, EXIT_SUCCESS};
use fresh_client::FreshClient;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "fresh",
    version,
    about = "Reconcile declared assets against a Freshservice-style API"
)]
struct Cli {
    /// Base URL of the API, e.g. https://acme.freshservice.com/api/v2.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// API key used for Basic authentication.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Path to a JSON config file (default: ~/.config/fresh/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create, read, update or delete assets.
    Asset {
        #[command(subcommand)]
        action: AssetCommand,
    },
    /// Look up asset types.
    AssetType {
        #[command(subcommand)]
        action: AssetTypeCommand,
    },
    /// Reconcile one asset from a TOML desired-state file.
    Apply {
        /// Path to the desired-state file.
        #[arg(default_value = "asset.toml")]
        file: PathBuf,
        /// Report the planned action without writing.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Asset type selector: exactly one of id or name.
#[derive(Debug, Args)]
struct TypeSelector {
    /// Numeric asset type id.
    #[arg(long)]
    asset_type_id: Option<i64>,
    /// Asset type name, resolved through the asset type listing.
    #[arg(long, conflicts_with = "asset_type_id")]
    asset_type: Option<String>,
}

impl TypeSelector {
    fn into_ref(self) -> Option<AssetTypeRef> {
        AssetTypeRef::from_flags(self.asset_type_id, self.asset_type)
    }
}

#[derive(Debug, Subcommand)]
enum AssetCommand {
    /// Create a new asset.
    #[command(group(
        ArgGroup::new("type")
            .required(true)
            .args(["asset_type_id", "asset_type"])
    ))]
    Create {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        asset_type: TypeSelector,
        #[command(flatten)]
        fields: AssetFields,
    },
    /// Show an asset by display id.
    Get { display_id: i64 },
    /// Change fields of an existing asset.
    Update {
        display_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        asset_type: TypeSelector,
        #[command(flatten)]
        fields: AssetFields,
    },
    /// Delete an asset by display id.
    Delete {
        display_id: i64,
        /// Treat an already-absent asset as success.
        #[arg(long, default_value_t = false)]
        missing_ok: bool,
    },
}

#[derive(Debug, Subcommand)]
enum AssetTypeCommand {
    /// Resolve an asset type by exact name.
    Get { name: String },
    /// List all asset types.
    List,
}

fn dispatch(client: &FreshClient, command: Commands, json: bool) -> Result<u8, String> {
    match command {
        Commands::Asset { action } => match action {
            AssetCommand::Create {
                name,
                asset_type,
                fields,
            } => {
                let asset_type = asset_type
                    .into_ref()
                    .ok_or("one of --asset-type-id or --asset-type is required")?;
                commands::asset::create(client, &name, &asset_type, &fields, json)
            }
            AssetCommand::Get { display_id } => commands::asset::get(client, display_id, json),
            AssetCommand::Update {
                display_id,
                name,
                asset_type,
                fields,
            } => commands::asset::update(
                client,
                display_id,
                name.as_deref(),
                asset_type.into_ref().as_ref(),
                &fields,
                json,
            ),
            AssetCommand::Delete {
                display_id,
                missing_ok,
            } => commands::asset::delete(client, display_id, missing_ok, json),
        },
        Commands::AssetType { action } => match action {
            AssetTypeCommand::Get { name } => commands::asset_type::get(client, &name, json),
            AssetTypeCommand::List => commands::asset_type::list(client, json),
        },
        Commands::Apply { file, dry_run } => commands::apply::run(client, &file, dry_run, json),
        Commands::Completions { .. } => Ok(EXIT_SUCCESS),
    }
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("FRESH_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "fresh", &mut std::io::stdout());
        return ExitCode::from(EXIT_SUCCESS);
    }

    let opts = ConnectionOptions {
        endpoint: cli.endpoint,
        api_key: cli.api_key,
        config: cli.config,
    };
    let result = resolve_config(&opts).and_then(|config| {
        tracing::debug!("using endpoint {}", config.endpoint());
        dispatch(&FreshClient::new(&config), cli.command, cli.json)
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}
