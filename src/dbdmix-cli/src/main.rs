mod cli;
mod commands;
mod config;
mod file_utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::*;

/// Log to stderr, honoring RUST_LOG; `--debug` raises the default level
fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "dbdmix=debug,dbdmix_cli=debug"
    } else {
        "dbdmix=info,dbdmix_cli=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::Check { args } => {
            commands::check::handle(&args)?;
        }

        Commands::List { args, slot, format } => {
            commands::list::handle(&args, slot.as_deref(), format)?;
        }

        Commands::Mix {
            args,
            slot,
            base_model,
            output,
            print,
            overwrite,
            dry_run,
        } => {
            let options = commands::mix::MixOptions {
                slot,
                base_model,
                output,
                print,
                overwrite,
                dry_run,
            };
            commands::mix::handle(&args, options)?;
        }

        Commands::Configure {
            settings,
            attachments_dir,
            show,
        } => {
            commands::configure::handle(settings, attachments_dir, show)?;
        }
    }

    Ok(())
}
