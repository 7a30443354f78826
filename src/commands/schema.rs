use crate::cli::TargetArgs;
use crate::error::CliResult;
use crate::mapping;
use crate::migrate::{self, MigrationRequest, SourceSpec};
use crate::naming::{AliasName, IndexName};
use crate::output::{self, ConsoleReporter};
use crate::store::http::HttpIndexStore;
use colored::Colorize;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    target: &TargetArgs,
    base_path: &Path,
    delete_existing: bool,
    from: Option<&str>,
    from_previous: bool,
    add_alias: bool,
    quiet: bool,
    verbose: bool,
) -> CliResult<()> {
    let source = if from_previous {
        Some(SourceSpec::PreviousVersion)
    } else {
        from.map(|index| SourceSpec::Explicit(IndexName::raw(index)))
    };
    // --alias only names the alias; the cutover itself is gated on --add-alias.
    let cutover_alias = add_alias.then(|| match target.alias.as_deref() {
        Some(name) => AliasName::raw(name),
        None => AliasName::default_for(&target.prefix, &target.index),
    });

    let req = MigrationRequest::new(
        target.prefix.clone(),
        target.index.clone(),
        target.version,
        delete_existing,
        source,
        cutover_alias,
    )?;

    // Load and validate the mapping before touching the store, so input
    // errors are reported without any mutation attempted.
    let mapping = mapping::load_mapping(base_path, &req.index_name())?;

    if !quiet {
        println!(
            "{} {}",
            "Checking connection to".bold(),
            target.host.cyan()
        );
    }

    let store = HttpIndexStore::new(&target.host, target.token.clone());
    let reporter = ConsoleReporter::new(quiet, verbose);
    let outcome = migrate::run_schema_migration(&store, &req, &mapping, |ev| reporter.handle(ev))
        .await?;

    output::print_outcome(&outcome, quiet);
    Ok(())
}
