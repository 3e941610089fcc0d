//! FontEase command-line front end
//!
//! Thin driver over the engine; exit codes map 1:1 to the engine's error
//! kinds (see `FontError::exit_code`).

#[cfg(windows)]
mod cli {
    use anyhow::{Context, Result};
    use clap::{Parser, Subcommand};
    use fontease::{ApplyOutcome, CancelToken, FontEngine, FontError, RefreshStatus};
    use std::path::PathBuf;
    use std::process::ExitCode;

    #[derive(Parser)]
    #[command(name = "fontease", version, about = "Change the Windows system font")]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// List fonts installed on this system
        List,
        /// Show the currently active system font
        Current,
        /// Apply a font as the system's default UI font (requires elevation)
        Apply {
            /// Display name of an installed font, e.g. "Consolas"
            font: String,
        },
        /// Install font files system-wide (requires elevation)
        Install {
            /// TTF/OTF/TTC files to install
            #[arg(required = true)]
            files: Vec<PathBuf>,
        },
        /// Restore the font configuration from before the last change
        Restore,
        /// Open the Windows fonts folder
        OpenFontsDir,
    }

    fn execute(engine: &FontEngine, command: Command) -> Result<()> {
        match command {
            Command::List => {
                for font in engine.list_fonts().context("listing installed fonts")? {
                    println!("{}\t{}", font.name, font.file_path.display());
                }
            }
            Command::Current => {
                let state = engine.current_font().context("reading the current font")?;
                println!("{}", state.active_font_name);
            }
            Command::Apply { font } => {
                match engine.apply(&font).context("applying the font")? {
                    ApplyOutcome::AlreadyActive { state } => {
                        println!("'{}' is already the active system font", state.active_font_name);
                    }
                    ApplyOutcome::Applied { state, refresh } => {
                        println!("System font changed to '{}'", state.active_font_name);
                        if refresh == RefreshStatus::Deferred {
                            println!("The change takes full effect after your next sign-in.");
                        }
                    }
                }
            }
            Command::Install { files } => {
                let cancel = CancelToken::new();
                for file in files {
                    let record = engine
                        .install(&file, &cancel)
                        .with_context(|| format!("installing {}", file.display()))?;
                    println!("Installed '{}'", record.name);
                }
            }
            Command::Restore => {
                let manager = engine.restore_manager();
                match manager.restore() {
                    Ok(outcome) => {
                        println!("System font restored to '{}'", outcome.state.active_font_name);
                        if outcome.refresh == RefreshStatus::Deferred {
                            println!("The change takes full effect after your next sign-in.");
                        }
                    }
                    Err(FontError::NoSnapshot) => {
                        eprintln!(
                            "Nothing to restore: no font change has been applied. \
                             The default system font is '{}'.",
                            manager.fallback_font_name()
                        );
                        return Err(FontError::NoSnapshot.into());
                    }
                    Err(e) => return Err(anyhow::Error::from(e).context("restoring the font")),
                }
            }
            Command::OpenFontsDir => {
                std::process::Command::new("explorer.exe")
                    .arg(engine.fonts_dir())
                    .spawn()
                    .context("opening the fonts folder")?;
            }
        }
        Ok(())
    }

    pub fn run() -> ExitCode {
        use tracing_subscriber::{fmt, EnvFilter};
        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();

        let cli = Cli::parse();
        let engine = FontEngine::system();

        match execute(&engine, cli.command) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {:#}", err);
                match err.downcast_ref::<FontError>() {
                    Some(font_err) => ExitCode::from(font_err.exit_code()),
                    None => ExitCode::FAILURE,
                }
            }
        }
    }
}

#[cfg(windows)]
fn main() -> std::process::ExitCode {
    cli::run()
}

#[cfg(not(windows))]
fn main() -> std::process::ExitCode {
    eprintln!("fontease manages the Windows system font and only runs on Windows");
    std::process::ExitCode::FAILURE
}
