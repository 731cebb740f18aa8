use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Commands specific to GDI disc images
#[derive(Subcommand, Debug, Eq, PartialEq)]
pub enum GdiCommands {
    Info(InfoCommand),
    Extract(ExtractCommand),
    Verify(VerifyCommand),
}

/// Mounts a GDI descriptor and prints the disc's track table.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct InfoCommand {
    /// Input path of the .gdi descriptor
    #[arg(value_name = "INPUT_GDI")]
    pub input: PathBuf,
}

/// Extracts one track's sector stream to a file.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct ExtractCommand {
    /// Input path of the .gdi descriptor
    #[arg(value_name = "INPUT_GDI")]
    pub input: PathBuf,

    /// Track number to extract, as written in the descriptor
    #[arg(value_name = "TRACK")]
    pub track: u8,

    /// Output file path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Force overwrite of the output file if it already exists
    #[arg(long, short = 'f', value_name = "FORCE", default_value_t = false)]
    pub force: bool,
}

/// Verifies that a GDI disc image mounts and its data tracks are intact.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct VerifyCommand {
    /// Input path of the .gdi descriptor
    #[arg(value_name = "INPUT_GDI")]
    pub input: PathBuf,
}
