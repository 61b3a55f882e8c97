//! Verb dispatch for `artistactrl`.

use std::io::Write;

use anyhow::Result;
use artista_hw::{Controller, Error, ScreenBus};
use tracing::debug;

use crate::stamp;

/// One control verb with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Show { screen: String, file: String },
    Reset { screen: String },
    Number,
    GetIds,
    SetId { old_id: String, new_id: String },
    SetIdByIndex { screen: String, new_id: String },
    ShowById { file: String, display_id: String },
}

/// Runs one action, writing its report to `out`.
pub fn run<B: ScreenBus, W: Write>(
    controller: &Controller<B>,
    action: Action,
    out: &mut W,
) -> Result<()> {
    debug!("Running {:?}", action);
    match action {
        Action::List => {
            let listing = controller.list()?;
            writeln!(out, "{} Artista devices found.", listing.len())?;
            for screen in listing {
                writeln!(out, "Artista {} is a {}", screen.index, screen.description)?;
                writeln!(
                    out,
                    "    Firmware: {}.{}",
                    screen.firmware.0, screen.firmware.1
                )?;
                writeln!(
                    out,
                    "    Device Resolution: {}x{}",
                    screen.columns, screen.lines
                )?;
                writeln!(out, "    Device UUID (as string): {}", screen.display_id)?;
            }
        }
        Action::Show { screen, file } => {
            controller.show(&screen, &file)?;
        }
        Action::Reset { screen } => {
            controller.reset(&screen)?;
        }
        Action::Number => {
            let mut failed = None;
            for outcome in controller.stamp(stamp::render)? {
                match outcome.sent {
                    Ok(bytes) => {
                        writeln!(out, "Send {} bytes to '{}'", bytes, outcome.display_id)?
                    }
                    Err(e) => {
                        failed.get_or_insert(Error::Write {
                            screen: outcome.index.to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
            if let Some(e) = failed {
                return Err(e.into());
            }
        }
        Action::GetIds => {
            let ids = controller
                .ids()?
                .iter()
                .map(|id| serde_json::to_string(&id.to_string()))
                .collect::<serde_json::Result<Vec<_>>>()?;
            writeln!(out, "[{}]", ids.join(", "))?;
        }
        Action::SetId { old_id, new_id } => {
            // Succeeds even when nothing matched; the controller warns
            controller.set_id(&old_id, &new_id)?;
        }
        Action::SetIdByIndex { screen, new_id } => {
            controller.set_id_by_index(&screen, &new_id)?;
        }
        Action::ShowById { file, display_id } => {
            controller.show_by_id(&file, &display_id)?;
        }
    }
    Ok(())
}

/// Formats a failure the way `artistactrl` reports it.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Error>() {
        Some(Error::ScreenNotFound(screen)) => format!("ERROR: screen {} does not exist!", screen),
        Some(Error::Write { screen, .. }) => format!("ERROR: writing to screen {}", screen),
        _ => {
            let what = err.to_string();
            let what = what.strip_suffix('.').unwrap_or(&what);
            if what.is_empty() {
                "Unspecified error: aborted.".to_string()
            } else {
                format!("{}: aborted.", what)
            }
        }
    }
}
