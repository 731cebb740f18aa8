use crate::commands::gdi::GdiCommands;
use clap::{Parser, Subcommand};

pub mod gdi;

/// CLI for mounting, inspecting, verifying and extracting GD-ROM GDI disc images.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(subcommand)]
    Gdi(GdiCommands),
}
