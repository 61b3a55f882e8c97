//! artistactrl
//!
//! Writes images to USB-attached Artista LCD screens and manages their
//! power state and display ids.

mod commands;
mod stamp;

use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::{Context, Result};
use artista_hw::{Controller, UsbBus, ARTISTA_PID, ARTISTA_VID};
use clap::{error::ErrorKind, ArgGroup, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use commands::{describe_error, Action};

#[derive(Parser, Debug)]
#[command(name = "artistactrl")]
#[command(about = "Utility to control USB Artista displays")]
#[command(version)]
#[command(group(ArgGroup::new("action").required(true).multiple(false)))]
struct Cli {
    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// USB vendor id of the screens (hex)
    #[arg(long, value_parser = parse_hex_u16)]
    vid: Option<u16>,

    /// USB product id of the screens (hex)
    #[arg(long, value_parser = parse_hex_u16)]
    pid: Option<u16>,

    /// Display information on connected screens
    #[arg(short = 'l', group = "action")]
    list: bool,

    /// Show FILE on the given SCREEN (between 0 and number of screens)
    #[arg(short = 's', num_args = 2, value_names = ["SCREEN", "FILE"],
          allow_hyphen_values = true, group = "action")]
    show: Option<Vec<String>>,

    /// Reset SCREEN (SCREEN may be 'all', then all screens are reset)
    #[arg(short = 'r', value_name = "SCREEN", allow_hyphen_values = true, group = "action")]
    reset: Option<String>,

    /// Number screens with usb ordering and ids (requires reset afterwards)
    #[arg(short = 'n', group = "action")]
    number: bool,

    /// Print a YAML array of screen ids
    #[arg(long = "get_ids", group = "action")]
    get_ids: bool,

    /// Set the id of the screen currently carrying OLD_ID
    #[arg(long = "set_id", num_args = 2, value_names = ["OLD_ID", "NEW_ID"],
          allow_hyphen_values = true, group = "action")]
    set_id: Option<Vec<String>>,

    /// Set the id of the screen at usb ordering N
    #[arg(long = "set_id_by_n", num_args = 2, value_names = ["N", "NEW_ID"],
          allow_hyphen_values = true, group = "action")]
    set_id_by_n: Option<Vec<String>>,

    /// Show FILE on the screen carrying ID
    #[arg(long = "show", num_args = 2, value_names = ["FILE", "ID"],
          allow_hyphen_values = true, group = "action")]
    show_by_id: Option<Vec<String>>,
}

impl Cli {
    fn action(&self) -> Option<Action> {
        let pair = |values: &Option<Vec<String>>| match values.as_deref() {
            Some([a, b]) => Some((a.clone(), b.clone())),
            _ => None,
        };

        if self.list {
            Some(Action::List)
        } else if let Some((screen, file)) = pair(&self.show) {
            Some(Action::Show { screen, file })
        } else if let Some(screen) = &self.reset {
            Some(Action::Reset {
                screen: screen.clone(),
            })
        } else if self.number {
            Some(Action::Number)
        } else if self.get_ids {
            Some(Action::GetIds)
        } else if let Some((old_id, new_id)) = pair(&self.set_id) {
            Some(Action::SetId { old_id, new_id })
        } else if let Some((screen, new_id)) = pair(&self.set_id_by_n) {
            Some(Action::SetIdByIndex { screen, new_id })
        } else {
            pair(&self.show_by_id).map(|(file, display_id)| Action::ShowById { file, display_id })
        }
    }
}

fn parse_hex_u16(s: &str) -> std::result::Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id '{}': {}", s, e))
}

/// Parses the command line (program name first).
///
/// On failure returns the exit code to stop with: help and version exit 0,
/// no arguments prints usage and exits 1, like any other parse error.
fn parse_cli<I, T>(args: I) -> std::result::Result<Cli, ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() <= 1 {
        let _ = Cli::command().print_help();
        return Err(ExitCode::FAILURE);
    }

    Cli::try_parse_from(args).map_err(|e| {
        let _ = e.print();
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        }
    })
}

/// Reports the outcome of a command and maps it to the exit code.
fn report(outcome: Result<()>) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("{}", describe_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = match parse_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    // Setup logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    report(run(&cli))
}

fn run(cli: &Cli) -> Result<()> {
    let action = cli.action().context("No action given")?;

    let bus = UsbBus::with_ids(
        cli.vid.unwrap_or(ARTISTA_VID),
        cli.pid.unwrap_or(ARTISTA_PID),
    )?;
    let controller = Controller::new(bus);

    let stdout = std::io::stdout();
    commands::run(&controller, action, &mut stdout.lock())
}
