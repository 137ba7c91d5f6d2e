use clap::Parser;
use std::path::PathBuf;

/// Render a grid item tree into a widget tree and print it as JSON
#[derive(Parser, Debug, Clone)]
#[command(name = "gridslice", version, about, long_about = None)]
pub struct Cli {
    /// Path to the grid item tree (JSON)
    pub tree: PathBuf,

    /// JSON object of scope name to form data, used to seed the store
    #[arg(short, long, env = "GRIDSLICE_DATA")]
    pub data: Option<PathBuf>,

    /// Renderer configuration file (JSON)
    #[arg(short, long, env = "GRIDSLICE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Initial value stream, as inline JSON
    #[arg(long)]
    pub value_stream: Option<String>,

    /// Submit every rendered form and print the resulting store
    #[arg(long)]
    pub submit: bool,

    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}
