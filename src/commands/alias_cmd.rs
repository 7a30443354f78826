use crate::cli::TargetArgs;
use crate::error::CliResult;
use crate::migrate::{self, MigrationRequest};
use crate::naming::AliasName;
use crate::output::{self, ConsoleReporter};
use crate::store::http::HttpIndexStore;
use colored::Colorize;

pub async fn run(target: &TargetArgs, quiet: bool, verbose: bool) -> CliResult<()> {
    let alias = match target.alias.as_deref() {
        Some(name) => AliasName::raw(name),
        None => AliasName::default_for(&target.prefix, &target.index),
    };
    let req = MigrationRequest::new(
        target.prefix.clone(),
        target.index.clone(),
        target.version,
        false,
        None,
        Some(alias),
    )?;

    if !quiet {
        println!(
            "{} {}",
            "Checking connection to".bold(),
            target.host.cyan()
        );
    }

    let store = HttpIndexStore::new(&target.host, target.token.clone());
    let reporter = ConsoleReporter::new(quiet, verbose);
    let outcome = migrate::run_alias_only_migration(&store, &req, |ev| reporter.handle(ev)).await?;

    output::print_outcome(&outcome, quiet);
    Ok(())
}
