// EDTrace - Execution Trace Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! EDTrace - Execution Trace Debugger
//!
//! A step-by-step debugger for recorded program executions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use edtrace_common::Location;
use edtrace_engine::{CursorTarget, DisplayFlags};
use eyre::Result;

mod cmd;
mod config;

use config::Config;

/// Command-line interface for EDTrace
#[derive(Debug, Parser)]
#[command(name = "edtrace")]
#[command(about = "EDTrace - A step-by-step debugger for recorded program executions")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ~/.edtrace.toml)
    #[arg(long, global = true, env = "EDTRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write logs to a daily rolling file
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the source view at a position in a trace
    Show {
        /// Trace file to load
        #[arg(long)]
        trace: PathBuf,

        #[command(flatten)]
        start: StartArgs,

        /// Key commands to apply before printing (e.g. "lljR")
        #[arg(long, default_value = "")]
        keys: String,

        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Print the environment at a step as JSON
    Env {
        /// Trace file to load
        #[arg(long)]
        trace: PathBuf,

        /// Step index
        #[arg(long, default_value_t = 0)]
        step: usize,
    },
    /// Serve a trace over JSON-RPC until interrupted
    Serve {
        /// Trace file to load
        #[arg(long)]
        trace: PathBuf,

        /// Port for the JSON-RPC server
        #[arg(long)]
        port: Option<u16>,

        #[command(flatten)]
        start: StartArgs,

        #[command(flatten)]
        display: DisplayArgs,
    },
}

/// Where the cursor starts
#[derive(Debug, Clone, Args)]
pub struct StartArgs {
    /// Start at this step (clamped to the last step)
    #[arg(long, conflicts_with_all = ["source", "line"])]
    pub step: Option<usize>,

    /// Start at the first step executing this source file...
    #[arg(long, requires = "line")]
    pub source: Option<String>,

    /// ...at this line
    #[arg(long, requires = "source")]
    pub line: Option<u32>,
}

impl StartArgs {
    /// The cursor target these arguments describe
    pub fn target(&self) -> CursorTarget {
        let location = match (&self.source, self.line) {
            (Some(path), Some(line)) => Some(Location::new(path.clone(), line)),
            _ => None,
        };
        CursorTarget { step: self.step, location }
    }
}

/// Display modes to turn on, on top of the configured ones
#[derive(Debug, Clone, Args)]
pub struct DisplayArgs {
    /// Show source text with directives
    #[arg(long)]
    pub raw: bool,

    /// Cloak lines execution has not reached yet
    #[arg(long)]
    pub animate: bool,

    /// Show the environment
    #[arg(long = "env")]
    pub show_env: bool,

    /// Show notes
    #[arg(long = "notes")]
    pub show_notes: bool,
}

impl DisplayArgs {
    /// Merge into the configured flags
    pub fn apply(&self, base: DisplayFlags) -> DisplayFlags {
        DisplayFlags {
            raw: base.raw || self.raw,
            animate: base.animate || self.animate,
            show_env: base.show_env || self.show_env,
            show_notes: base.show_notes || self.show_notes,
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { .. } => edtrace_common::logging::init_logging("edtrace", cli.log_file)?,
        _ => edtrace_common::logging::init_simple_logging(tracing::Level::WARN)?,
    }

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Show { trace, start, keys, display } => {
            let flags = display.apply(config.display);
            let view = cmd::show_source(trace, &start.target(), keys, flags)?;
            print!("{view}");
        }
        Commands::Env { trace, step } => {
            let environment = cmd::show_environment(trace, *step)?;
            println!("{environment}");
        }
        Commands::Serve { trace, port, start, display } => {
            let port = port.or(config.server.port);
            let flags = display.apply(config.display);
            cmd::serve_trace(trace, port, start.target(), flags).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_start_target() {
        let cli = Cli::parse_from(["edtrace", "show", "--trace", "t.json", "--source", "a.py", "--line", "3"]);
        let Commands::Show { start, .. } = cli.command else { panic!("expected show") };
        assert_eq!(start.target(), CursorTarget::location(Location::new("a.py", 3)));
    }

    #[test]
    fn test_display_flags_merge() {
        let args = DisplayArgs { raw: false, animate: true, show_env: false, show_notes: false };
        let base = DisplayFlags { raw: true, ..Default::default() };
        let flags = args.apply(base);
        assert!(flags.raw && flags.animate);
        assert!(!flags.show_env);
    }
}
