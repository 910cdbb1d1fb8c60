use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use varpack::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "varpack",
    about = "Export component variants into a single zip archive.",
    version
)]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(visible_alias = "x", about = "Export the selected variants of a scene")]
    Export(ExportArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    #[value(alias = "png")]
    Raster,
    #[value(alias = "svg")]
    Vector,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Raster => OutputFormat::Raster,
            FormatArg::Vector => OutputFormat::Vector,
        }
    }
}

#[derive(Debug, clap::Args)]
#[command(after_help = "\
\x1b[1m\x1b[4mRenderings:\x1b[0m
  Each selected node is read from the renders directory as
  \x1b[1m<id>.png\x1b[0m, \x1b[1m<id>.svg\x1b[0m or \x1b[1m<id>@4x.png\x1b[0m (128 px upscale).
  Characters outside [A-Za-z0-9_-] in node ids are replaced with `_`.

\x1b[1m\x1b[4mExamples:\x1b[0m
  varpack export scene.json --renders renders/ --out dist/
  varpack export scene.json --renders renders/ --out dist/ --format vector
  varpack export scene.json --renders renders/ --out dist/ --include-24 --no-upscale")]
pub struct ExportArgs {
    /// Scene description (JSON)
    pub scene: PathBuf,

    /// Directory holding pre-rendered files
    #[arg(short = 'r', long)]
    pub renders: PathBuf,

    /// Directory the archive is written to
    #[arg(short = 'o', long = "out")]
    pub out: PathBuf,

    /// Export configuration (TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<FormatArg>,

    /// Keep the `24` size suffix in file names
    #[arg(long = "include-24")]
    pub include_24: bool,

    /// Don't add 128 px renditions of 32 px variants
    #[arg(long)]
    pub no_upscale: bool,
}
