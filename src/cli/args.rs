//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Fardel asset bundler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project directory holding bundles.yaml
    #[arg(short, long, global = true, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub dir: PathBuf,

    /// Settings file path (default: fardel.toml in the project directory)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Media root override (relative to the project directory)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub media_root: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build bundles, rewrite cross-bundle references and compress
    #[command(visible_alias = "b")]
    Build {
        /// Compress freshly built bundles (default: from settings)
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
        compress: Option<bool>,

        /// Only build these bundles
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },

    /// List declared bundles and their files
    #[command(visible_alias = "l")]
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Only list these bundles
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },

    /// Lint the script members of bundles, or script files
    Lint {
        /// Bundle names or files relative to the media root
        #[arg(value_name = "NAME_OR_FILE")]
        targets: Vec<String>,
    },

    /// Build, then rebuild on source or declaration changes
    #[command(visible_alias = "w")]
    Watch,

    /// Remove superseded fingerprinted artifacts
    Prune {
        /// Artifacts to keep per bundle, the current one included
        #[arg(short, long, default_value = "1")]
        keep: NonZeroUsize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from(["fardel", "-d", "site", "build", "-c", "app.js", "site.css"]);
        assert_eq!(cli.dir, PathBuf::from("site"));
        match cli.command {
            Commands::Build { compress, names } => {
                assert_eq!(compress, Some(true));
                assert_eq!(names, ["app.js", "site.css"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_globals_after_subcommand() {
        let cli = Cli::parse_from(["fardel", "list", "--json", "-v", "--media-root", "static"]);
        assert!(cli.verbose);
        assert_eq!(cli.media_root, Some(PathBuf::from("static")));
        assert!(matches!(cli.command, Commands::List { json: true, .. }));
    }

    #[test]
    fn test_prune_keep_must_be_positive() {
        assert!(Cli::try_parse_from(["fardel", "prune", "--keep", "0"]).is_err());
        let cli = Cli::parse_from(["fardel", "prune"]);
        assert!(matches!(cli.command, Commands::Prune { keep } if keep.get() == 1));
    }
}
