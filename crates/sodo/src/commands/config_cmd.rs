//! Config subcommand handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::{Input, Select};
use sodo_core::RangePolicy;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn wizard(mut cfg: Config) -> Result<Config, CliError> {
    let data_dir: String = Input::new()
        .with_prompt("Project data directory")
        .default(cfg.data_dir().display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    cfg.storage.data_dir = Some(PathBuf::from(data_dir));

    cfg.share.base_url = Input::new()
        .with_prompt("Share link base URL")
        .default(cfg.share.base_url.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let policies = &[
        "strict (wrap rotation, clamp field of view)",
        "permissive (store values as typed)",
    ];
    let selection = Select::new()
        .with_prompt("Rotation / field-of-view policy")
        .items(policies)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    cfg.editor.range_policy = if selection == 0 {
        RangePolicy::Strict
    } else {
        RangePolicy::Permissive
    };

    let pdftoppm: String = Input::new()
        .with_prompt("pdftoppm executable")
        .default(cfg.import.pdftoppm.display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    cfg.import.pdftoppm = PathBuf::from(pdftoppm);
    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let path = config::config_path();
            let cfg = if std::io::stdin().is_terminal() && !global.yes {
                eprintln!("sodo configuration");
                eprintln!("   Config path: {}\n", path.display());
                wizard(Config::default())?
            } else if global.yes {
                Config::default()
            } else {
                return Err(CliError::NonInteractiveRequiresYes {
                    action: "config init".into(),
                });
            };
            cfg.validate()?;
            let written = config::save_config(&cfg)?;
            output::notice(&format!("Config written to {}", written.display()), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = match global.output.unwrap_or(OutputFormat::Table) {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                        field: "config".into(),
                        reason: format!("failed to serialize config: {e}"),
                    })?
                }
                format => output::render_single(format, &cfg, |_| String::new(), |_| String::new())?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
