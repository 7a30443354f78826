//! esmigrate library.
//!
//! This crate provides the types, command handlers, and utilities that power
//! the `esmigrate` CLI binary: a migration orchestrator for versioned
//! document indices, the alias cutover engine, the naming policy, and the
//! store-client abstraction with HTTP and in-memory implementations. Library
//! consumers (deployment tooling, test harnesses) can drive
//! [`migrate::run_schema_migration`] directly against any [`store::IndexStore`].

pub mod cli;
pub mod commands;
pub mod cutover;
pub mod error;
pub mod mapping;
pub mod migrate;
pub mod naming;
pub mod output;
pub mod store;

use cli::{Cli, Commands};

/// Dispatch a parsed [`Cli`] to the appropriate command handler.
///
/// This is the main entry point for executing CLI commands. The binary calls
/// this after parsing args and initializing tracing.
pub async fn run(cli: Cli) -> error::CliResult<()> {
    match cli.command {
        Commands::Schema {
            target,
            base_path,
            delete_existing,
            from,
            from_previous,
            add_alias,
        } => {
            commands::schema::run(
                &target,
                &base_path,
                delete_existing,
                from.as_deref(),
                from_previous,
                add_alias,
                cli.quiet,
                cli.verbose,
            )
            .await
        }

        Commands::Alias { target } => {
            commands::alias_cmd::run(&target, cli.quiet, cli.verbose).await
        }
    }
}
