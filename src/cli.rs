use clap::Parser;
use std::path::PathBuf;

/// Command line options for the demo server binary.
#[derive(Parser, Debug)]
#[command(name = "trellis-serve")]
#[command(about = "Demo HTTP server built on the trellis router", long_about = None)]
pub struct Cli {
    /// Address to bind, e.g. 0.0.0.0:8080
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "TRELLIS_ADDR")]
    pub addr: String,

    /// Serve this directory under /static
    #[arg(short, long)]
    pub static_dir: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
