//! Implementation of `esq check`.

use std::process::ExitCode;

use esq_config::{ConfigWarning, discover_config_files, is_global_config};

use crate::cli::context::CommandContext;

/// Exit codes for `esq check`.
mod exit_codes {
    use std::process::ExitCode;

    /// Configuration is valid with no warnings.
    pub const OK: ExitCode = ExitCode::SUCCESS;
    /// Configuration has warnings or errors.
    pub const FAILED: ExitCode = ExitCode::FAILURE;
}

/// Validates the configuration and reports warnings with hints.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config_files = discover_config_files(&ctx.cwd);

    println!("Checking configuration...");
    println!();

    if config_files.is_empty() {
        println!("No configuration files found.");
        println!();
        println!("Run 'esq init' to create a configuration file.");
        return exit_codes::OK;
    }

    println!("Config files (highest precedence first):");
    for path in &config_files {
        let scope = if is_global_config(path) { " (global)" } else { "" };
        println!("  {}{scope}", path.display());
    }
    println!();

    let config = &ctx.config;
    if !config.params.is_empty() {
        println!("Params:");
        for (name, value) in &config.params {
            println!("  {name} = {value}");
        }
        println!();
    }

    println!("Fields:");
    if config.fields.is_empty() {
        println!("  (none defined)");
    } else {
        for field in &config.fields {
            println!("  {} -> {}", field.name, field.property);
        }
    }
    println!();

    if let Err(e) = config.build_registry(&[]) {
        eprintln!("error: {e}");
        return exit_codes::FAILED;
    }

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return exit_codes::OK;
    }

    println!("Warnings ({}):", warnings.len());
    for warning in &warnings {
        println!("  - {warning}");
    }
    println!();

    print_hints(&warnings);

    exit_codes::FAILED
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|warning| match warning {
            ConfigWarning::NoFieldsDefined => {
                "Add a [field.<name>] section with a property to map a field."
            }
            ConfigWarning::UnresolvedPlaceholder { .. } => {
                "Define the placeholder under [params] or pass it with --param."
            }
            ConfigWarning::UnusedParameter { .. } => {
                "Remove the parameter or reference it as {name} in a property."
            }
        })
        .collect();

    hints.sort_unstable();
    hints.dedup();

    if !hints.is_empty() {
        println!("Hints:");
        for hint in hints {
            println!("  - {hint}");
        }
    }
}
