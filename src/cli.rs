use crate::config::{MirrorLayout, SettingsOverrides};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tiny-squeeze",
    about = "Batch image compression through the Tinify API",
    long_about = "tiny-squeeze walks a directory of JPEG and PNG images, sends each one to the \
                  Tinify (TinyPNG) API and writes the optimized result into a mirrored output \
                  directory. Images that already have an optimized counterpart are skipped.",
    version,
    after_help = "EXAMPLES:\n  \
    tiny-squeeze run --input ./raw_images --output ./compressed_images\n  \
    tiny-squeeze run --metadata --delete-raw\n  \
    tiny-squeeze plan --layout relative\n  \
    tiny-squeeze validate"
)]
pub struct Args {
    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Settings file (default: ./tiny-squeeze.toml)"
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print extra detail")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress every image under the input directory",
        long_about = "Validate the API key, mirror the input directory structure into the output \
                      directory, then compress each JPEG/PNG image that has no optimized copy yet."
    )]
    Run(SettingsArgs),

    #[command(
        about = "Show what a run would do without calling the API",
        long_about = "List every image a run would pick up, the artifact it would be written to, \
                      and whether that artifact already exists."
    )]
    Plan(SettingsArgs),

    #[command(about = "Check the API key and show this month's compression count")]
    Validate(SettingsArgs),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[arg(short = 'i', long, help = "Directory holding the uncompressed images")]
    pub input: Option<PathBuf>,

    #[arg(short = 'o', long, help = "Directory the optimized images are written to")]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'k',
        long,
        env = "TINIFY_API_KEY",
        hide_env_values = true,
        help = "Tinify API key"
    )]
    pub api_key: Option<String>,

    #[arg(
        short = 'm',
        long,
        help = "Preserve copyright and creation date",
        long_help = "Ask the service to keep copyright and creation date metadata. \
                     Output files are named <name>_optimized_copyright.<ext> and are larger."
    )]
    pub metadata: bool,

    #[arg(
        long,
        help = "Delete the input images after a fully successful run",
        long_help = "Remove the whole input directory after every image was compressed, \
                     then recreate it empty. Skipped when any image failed."
    )]
    pub delete_raw: bool,

    #[arg(
        short = 'l',
        long,
        value_enum,
        help = "How subdirectories are mirrored (default: flatten)",
        long_help = "flatten: every input subdirectory maps to output/<dir name>, at any depth. \
                     relative: subdirectories keep their full path relative to the input directory."
    )]
    pub layout: Option<MirrorLayout>,

    #[arg(long, help = "Keep going after a failed image instead of stopping")]
    pub keep_going: bool,

    #[arg(long, env = "TINIFY_API_ENDPOINT", hide = true)]
    pub endpoint: Option<String>,
}

impl SettingsArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            api_key: self.api_key.clone(),
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            metadata: self.metadata,
            delete_raw_after_compress: self.delete_raw,
            layout: self.layout,
            keep_going: self.keep_going,
        }
    }
}
