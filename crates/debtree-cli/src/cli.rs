//! CLI argument definitions for debtree.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "debtree",
    version,
    about = "Inspect Debian package control data and build dependency trees",
    long_about = "debtree reads the control record out of .deb files and walks their \
                  Depends/Pre-Depends fields, downloading missing packages with \
                  `apt-get download` and skipping those already installed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this configuration file instead of ~/.debtree/config.toml
    #[arg(long, global = true, env = "DEBTREE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the dependencies of packages or .deb files
    Deps {
        /// Package names, or paths ending in .deb
        #[arg(required = true)]
        packages: Vec<String>,
        /// Follow dependencies that are not already installed
        #[arg(short, long)]
        recursive: bool,
        /// Stop at the named packages even if `[resolve] recursive` is set
        #[arg(long, conflicts_with = "recursive")]
        no_recursive: bool,
        /// File holding the output of `dpkg -l`
        #[arg(short, long)]
        installed: Option<PathBuf>,
        /// Directory searched for, and receiving, .deb files
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Order of packages in the report
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
        /// Show which packages depend on this one
        #[arg(long)]
        why: Option<String>,
    },

    /// Print the control record of a .deb file
    Control {
        /// Path to the .deb file
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },

    /// List the installed packages found in `dpkg -l` output
    Installed {
        /// File holding the output of `dpkg -l`
        file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortArg {
    Name,
    Discovery,
    Install,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Text,
    Json,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deps_flags() {
        let cli = Cli::try_parse_from([
            "debtree", "-v", "deps", "-r", "-i", "dpkg.txt", "--sort", "install", "hello", "x.deb",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Deps {
                packages,
                recursive,
                installed,
                sort,
                format,
                ..
            } => {
                assert_eq!(packages, vec!["hello", "x.deb"]);
                assert!(recursive);
                assert_eq!(installed, Some(PathBuf::from("dpkg.txt")));
                assert_eq!(sort, SortArg::Install);
                assert_eq!(format, FormatArg::Text);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn recursive_flags_conflict() {
        assert!(Cli::try_parse_from(["debtree", "deps", "-r", "--no-recursive", "hello"]).is_err());
        let cli = Cli::try_parse_from(["debtree", "deps", "--no-recursive", "hello"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Deps { recursive: false, no_recursive: true, .. }
        ));
    }

    #[test]
    fn deps_requires_a_package() {
        assert!(Cli::try_parse_from(["debtree", "deps"]).is_err());
    }
}
