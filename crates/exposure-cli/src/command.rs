use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{check::CheckCommand, color::Color, render::Output};

pub(crate) const CORPUS_URL_ENV: &str = "EXPOSURE_CORPUS_URL";

#[derive(Parser, Clone)]
#[command(name = "Exposure CLI", version, about = "Check whether a credential appears in known data breaches", long_about = None, disable_version_flag = true)]
pub(crate) struct Cli {
    // Optional as a workaround for https://github.com/clap-rs/clap/issues/3572
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short = 'o', long, global = true, value_enum, default_value_t = Output::JSON)]
    pub output: Output,

    #[arg(short = 'c', long, global = true, value_enum, default_value_t = Color::Auto)]
    pub color: Color,

    #[arg(
        long,
        global = true,
        help = "Exit with a success exit code (0) unless an error is thrown."
    )]
    pub cleanexit: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        help = "Don't return anything to stdout."
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        help = "Do not prompt for interactive user input."
    )]
    pub nointeraction: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[arg(short = 'v', long, action = clap::builder::ArgAction::Version)]
    pub version: (),
}

/// Overrides applied on top of the settings file.
#[derive(Args, Clone, Default)]
pub(crate) struct SettingsArgs {
    #[arg(
        long,
        global = true,
        help = "Read the engine settings from a JSON file."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = CORPUS_URL_ENV,
        help = "Base URL of the breach corpus range API."
    )]
    pub corpus_url: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Upper bound for a single corpus request, in milliseconds."
    )]
    pub timeout_ms: Option<u64>,

    #[arg(
        long,
        global = true,
        help = "How long a resolved report is reused, in seconds."
    )]
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Subcommand, Clone)]
pub(crate) enum Commands {
    #[command(long_about = "Check a credential against the breach corpus.")]
    Check {
        #[command(subcommand)]
        command: CheckCommand,
    },

    #[command(long_about = "Print the effective engine settings.")]
    Config,

    #[command(long_about = "Generate shell completions.")]
    Completion {
        #[arg(long, help = "The shell to generate completions for.")]
        shell: Option<clap_complete::Shell>,
    },
}
