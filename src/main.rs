use anyhow::Result;
use clap::Parser;
use gdi_mount::commands::gdi::GdiCommands;
use gdi_mount::commands::{Cli, Commands};
use gdi_mount::gdrom::{extract_track, print_disc_info, verify_disc};
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let logger = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Gdi(inner) => match inner {
            GdiCommands::Info(cmd) => print_disc_info(cmd.input).await?,
            GdiCommands::Extract(cmd) => {
                extract_track(pb.clone(), cmd.input, cmd.track, cmd.output, cmd.force).await?
            }
            GdiCommands::Verify(cmd) => verify_disc(cmd.input).await?,
        },
    }

    Ok(())
}
