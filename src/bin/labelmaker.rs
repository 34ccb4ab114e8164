//! Offline label renderer.
//!
//! Composes the configs the host would see (environment + preferences) and
//! renders node snapshots saved as JSON.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use labelmaker::{
    LabelmakerError, NodeSnapshot, RenderOptions, Session, SnapshotHost, labelmaker_preferences,
    paths,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "labelmaker", version, about = "Render node autolabels from layered configs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Preference file (default: ~/.nuke/labelmaker_preferences.json).
    #[arg(long, value_name = "PATH", global = true)]
    prefs: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Render the label for a node snapshot.
    Render {
        /// Node snapshot JSON file.
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Show every rule, even at its default.
        #[arg(long)]
        always_show_all: bool,

        /// Render color readouts as plain text.
        #[arg(long)]
        no_colorize: bool,
    },

    /// List composed config sources, lowest precedence first.
    Sources,

    /// Print the JSON Schema of a config file.
    #[cfg(feature = "jsonschema")]
    Schema,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LabelmakerError> {
    let prefs_path = cli.prefs.unwrap_or_else(paths::default_preferences_path);

    match cli.command {
        Command::Render {
            snapshot,
            always_show_all,
            no_colorize,
        } => {
            let session = Session::from_env(labelmaker_preferences(prefs_path)?)?;
            let json = fs::read_to_string(&snapshot).map_err(|e| LabelmakerError::Io {
                path: snapshot.clone(),
                source: e,
            })?;
            let node = NodeSnapshot::from_json(&json).map_err(|e| LabelmakerError::Json {
                path: snapshot.clone(),
                source: e,
            })?;

            let prefs = session.options();
            let options = RenderOptions {
                always_show_all: always_show_all || prefs.always_show_all,
                colorize_disabled: no_colorize || prefs.colorize_disabled,
            };
            let label = render(&session, &node, options);
            println!("{label}");
        }
        Command::Sources => {
            let session = Session::from_env(labelmaker_preferences(prefs_path)?)?;
            for source in session.config().sources() {
                println!("{}\t{}", source.name(), source.path().display());
            }
        }
        #[cfg(feature = "jsonschema")]
        Command::Schema => {
            let schema = labelmaker::config_schema();
            let json = serde_json::to_string_pretty(&schema).map_err(|e| LabelmakerError::Json {
                path: PathBuf::from("<schema>"),
                source: e,
            })?;
            println!("{json}");
        }
    }

    Ok(())
}

fn render(session: &Session, node: &NodeSnapshot, options: RenderOptions) -> String {
    let host = SnapshotHost::new();
    let label = session.renderer().render(node, session.config(), options, &host);
    if let Some(indicators) = host.last_indicators() {
        info!(node = %node.name, indicators = indicators.bits(), "Indicators");
    }
    label
}
