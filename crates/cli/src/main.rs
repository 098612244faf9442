// scriptedit - edit saved scripts from the terminal

mod exit_codes;
mod logging;
mod scripts;
mod tui;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use scriptedit_client::ScriptId;
use scriptedit_config::Settings;
use scriptedit_session::ScriptRef;

use exit_codes::{EXIT_ERROR, EXIT_LOAD_FAILED, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "scriptedit")]
#[command(about = "Edit saved scripts on a scripts server")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Save an API token for the scripts server
    #[command(after_help = "\
Examples:
  scriptedit login --token abc123 --api-base https://fleet.example.com
  SCRIPTEDIT_TOKEN=abc123 scriptedit login")]
    Login {
        /// API token (falls back to SCRIPTEDIT_TOKEN, then a prompt)
        #[arg(long)]
        token: Option<String>,

        /// Server base URL (defaults to "api.baseUrl" from settings)
        #[arg(long, env = "SCRIPTEDIT_API_BASE")]
        api_base: Option<String>,
    },

    /// Forget the saved API token
    Logout,

    /// Print a script's current content to stdout
    Show {
        /// Script id
        id: ScriptId,

        /// Print {"id", "content"} as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open a script in the terminal editor
    #[command(after_help = "\
Keys:
  Ctrl+S            Save
  Esc / Ctrl+C      Cancel (unsaved edits are discarded)
  Tab               Insert spaces (editor.tabWidth)
  arrows, Home/End  Move cursor (Ctrl+Home/End: start/end of script)
  PgUp / PgDn       Page up/down")]
    Edit {
        /// Script id
        id: ScriptId,

        /// Display name, also sent as the file name on save
        #[arg(long)]
        name: String,
    },

    /// Print the settings file path
    ConfigPath,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();
    let settings = Settings::load();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: scriptedit <command> [options]");
            eprintln!("       scriptedit --help for more information");
            Ok(())
        }
        Some(Commands::Login { token, api_base }) => scripts::cmd_login(token, api_base, &settings),
        Some(Commands::Logout) => scripts::cmd_logout(),
        Some(Commands::Show { id, json }) => scripts::cmd_show(id, json, &settings),
        Some(Commands::Edit { id, name }) => cmd_edit(id, name, &settings),
        Some(Commands::ConfigPath) => {
            println!("{}", Settings::config_path_display());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn cmd_edit(id: ScriptId, name: String, settings: &Settings) -> Result<(), CliError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(CliError::args("--name must not be empty"));
    }

    let client = scripts::open_client(settings)?;
    let options = tui::EditOptions::from_settings(settings);
    log::info!("editing script {} ({})", id, name);

    let outcome = tui::run_edit(Arc::new(client), ScriptRef::new(id, name), options)
        .map_err(CliError::io)?;

    match outcome {
        tui::EditOutcome::Saved(message) => {
            eprintln!("{}", message);
            Ok(())
        }
        tui::EditOutcome::Cancelled => Ok(()),
        tui::EditOutcome::LoadFailed(reason) => Err(CliError {
            code: EXIT_LOAD_FAILED,
            message: reason,
            hint: Some("close the editor and try again".into()),
        }),
    }
}
