use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    contentv2::logging::init().context("init logging")?;

    let cli = contentv2::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        contentv2::cli::Command::Convert(args) => {
            contentv2::walk::run(args).context("convert")?;
        }
        contentv2::cli::Command::ConvertOne(args) => {
            contentv2::convert::run_one(args).context("convert-one")?;
        }
        contentv2::cli::Command::Sort(args) => {
            contentv2::sort::run(args).context("sort")?;
        }
        contentv2::cli::Command::StripEmoji(args) => {
            contentv2::emoji::run(args).context("strip-emoji")?;
        }
    }

    Ok(())
}
