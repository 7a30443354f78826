//! Alias cutover engine.
//!
//! Computes the minimal add/remove action set that atomically moves a stable
//! alias from whatever it currently points at to a single target index, and
//! submits it as one batch. The planning half is pure so the convergence
//! rules are unit-testable without a store.

use crate::migrate::MigrateError;
use crate::naming::{AliasName, IndexName};
use crate::store::{AliasAction, AliasBindings, IndexStore};

/// Outcome of a completed cutover: which indices carried the alias before,
/// and the single index that carries it now.
#[derive(Debug, Clone)]
pub struct CutoverReport {
    pub previous: Vec<IndexName>,
    pub target: IndexName,
}

impl CutoverReport {
    /// Whether the alias was already bound only to the target (no-op re-run).
    pub fn was_noop(&self) -> bool {
        self.previous.len() == 1 && self.previous[0] == self.target
    }
}

/// Plan the action batch that converges `alias` onto exactly `target`.
///
/// Every currently-bound holder of the alias gets a remove, except the target
/// itself: re-running against an already-cutover alias must not cycle through
/// a redundant remove+add. The add is unconditional, so an unbound alias
/// degenerates to a pure first-time add. When multiple indices hold the alias
/// (fan-out from a prior inconsistent state) all non-target holders are
/// removed; there is no "most recent" heuristic.
pub fn plan_actions(
    bindings: &AliasBindings,
    alias: &AliasName,
    target: &IndexName,
) -> Vec<AliasAction> {
    let mut actions: Vec<AliasAction> = bindings
        .iter()
        .filter(|(index, aliases)| {
            index.as_str() != target.as_str() && aliases.contains(alias.as_str())
        })
        .map(|(index, _)| AliasAction::remove(index, alias))
        .collect();
    actions.push(AliasAction::add(target, alias));
    actions
}

/// Current holders of `alias` among `bindings`, in name order.
fn holders(bindings: &AliasBindings, alias: &AliasName) -> Vec<IndexName> {
    bindings
        .iter()
        .filter(|(_, aliases)| aliases.contains(alias.as_str()))
        .map(|(index, _)| IndexName::raw(index.clone()))
        .collect()
}

/// Atomically repoint `alias` at `target`.
///
/// Reads the current bindings, plans the batch, and submits it as one
/// `update_aliases` call so readers never observe the alias resolving to zero
/// indices or to both old and new.
pub async fn cutover<S: IndexStore + ?Sized>(
    store: &S,
    alias: &AliasName,
    target: &IndexName,
) -> Result<CutoverReport, MigrateError> {
    let bindings = store
        .alias_bindings(alias)
        .await
        .map_err(|e| MigrateError::store("reading alias bindings", e))?;

    let previous = holders(&bindings, alias);
    let actions = plan_actions(&bindings, alias, target);

    tracing::info!(
        alias = %alias,
        target = %target,
        removed = actions.len() - 1,
        "alias cutover"
    );

    store
        .update_aliases(&actions)
        .await
        .map_err(|e| MigrateError::store("updating aliases", e))?;

    Ok(CutoverReport {
        previous,
        target: target.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn bindings(entries: &[(&str, &[&str])]) -> AliasBindings {
        entries
            .iter()
            .map(|(index, aliases)| {
                (
                    index.to_string(),
                    aliases.iter().map(|a| a.to_string()).collect::<BTreeSet<_>>(),
                )
            })
            .collect()
    }

    fn alias() -> AliasName {
        AliasName::raw("app-users")
    }

    fn target() -> IndexName {
        IndexName::raw("app-users_v2")
    }

    #[test]
    fn unbound_alias_is_pure_add() {
        let actions = plan_actions(&AliasBindings::new(), &alias(), &target());
        assert_eq!(actions, vec![AliasAction::add(&target(), &alias())]);
    }

    #[test]
    fn single_holder_gets_removed() {
        let b = bindings(&[("app-users_v1", &["app-users"])]);
        let actions = plan_actions(&b, &alias(), &target());
        assert_eq!(
            actions,
            vec![
                AliasAction::remove("app-users_v1", &alias()),
                AliasAction::add(&target(), &alias()),
            ]
        );
    }

    #[test]
    fn target_already_holding_is_not_removed() {
        let b = bindings(&[("app-users_v2", &["app-users"])]);
        let actions = plan_actions(&b, &alias(), &target());
        assert_eq!(actions, vec![AliasAction::add(&target(), &alias())]);
    }

    #[test]
    fn fanout_removes_all_non_target_holders() {
        let b = bindings(&[
            ("app-users_v1", &["app-users"]),
            ("app-users_v2", &["app-users"]),
            ("app-users_v3", &["app-users"]),
        ]);
        let actions = plan_actions(&b, &alias(), &target());
        assert_eq!(
            actions,
            vec![
                AliasAction::remove("app-users_v1", &alias()),
                AliasAction::remove("app-users_v3", &alias()),
                AliasAction::add(&target(), &alias()),
            ]
        );
    }

    #[test]
    fn indices_holding_other_aliases_are_ignored() {
        let b = bindings(&[
            ("app-users_v1", &["app-users"]),
            ("app-orders_v1", &["app-orders"]),
        ]);
        let actions = plan_actions(&b, &alias(), &target());
        assert_eq!(
            actions,
            vec![
                AliasAction::remove("app-users_v1", &alias()),
                AliasAction::add(&target(), &alias()),
            ]
        );
    }
}
