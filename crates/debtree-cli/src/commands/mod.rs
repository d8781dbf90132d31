//! Command dispatch and handler modules.

mod control;
mod deps;
mod installed;

use debtree_ops::OutputFormat;
use debtree_resolver::report::SortOrder;
use miette::Result;

use crate::cli::{Cli, Command, FormatArg, SortArg};

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortOrder::Name,
            SortArg::Discovery => SortOrder::Discovery,
            SortArg::Install => SortOrder::Install,
        }
    }
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// `-r` and `--no-recursive` as an override; neither defers to the config.
fn recursion_override(recursive: bool, no_recursive: bool) -> Option<bool> {
    match (recursive, no_recursive) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match config {
        Some(path) => tracing::debug!("using config file {}", path.display()),
        None => tracing::debug!("using the default config location"),
    }
    match cli.command {
        Command::Deps {
            packages,
            recursive,
            no_recursive,
            installed,
            dir,
            sort,
            format,
            why,
        } => {
            let recursive = recursion_override(recursive, no_recursive);
            deps::exec(config, packages, recursive, installed, dir, sort, format, why)
        }
        Command::Control { file, format } => control::exec(config, &file, format),
        Command::Installed { file } => installed::exec(&file),
    }
}
