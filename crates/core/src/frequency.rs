//! Effective recurrence rule for a contract, optionally narrowed to a site.
//!
//! Two-level inheritance: contract defaults -> site override. Each value is
//! resolved independently, so a site that only overrides the frequency still
//! inherits the contract's count and custom day count.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Contract, RuleSettings};
use crate::recurrence::{Frequency, Recurrence};
use crate::status::InterventionKind;
use crate::types::DbId;

/// First defined value across sources, in precedence order.
pub fn first_defined<T: Copy>(sources: &[Option<T>]) -> Option<T> {
    sources.iter().find_map(|s| *s)
}

/// Effective recurrence values for one contract/site/kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedRule {
    /// Absent frequency means the kind is not scheduled for this scope.
    pub frequency: Option<Frequency>,
    pub custom_days: Option<i32>,
    pub max_count: Option<i32>,
    pub first_date: Option<NaiveDate>,
}

impl ResolvedRule {
    pub fn recurrence(&self) -> Option<Recurrence> {
        self.frequency
            .map(|frequency| Recurrence::new(frequency, self.custom_days))
    }
}

/// Resolve the rule for `kind` on `contract`, preferring the override of
/// `site_id` when one exists.
///
/// Out-of-contract kinds resolve to an empty rule. Non-positive custom day
/// counts and counts are treated as unset.
pub fn resolve_rule(
    contract: &Contract,
    kind: InterventionKind,
    site_id: Option<DbId>,
) -> ResolvedRule {
    let Some(base) = contract.settings(kind) else {
        return ResolvedRule::default();
    };
    let site = site_id
        .and_then(|id| contract.site(id))
        .and_then(|s| s.settings(kind));

    let pick = |f: fn(&RuleSettings) -> Option<i32>| {
        first_defined(&[site.and_then(|s| positive(f(s))), positive(f(base))])
    };

    ResolvedRule {
        frequency: first_defined(&[site.and_then(|s| s.frequency), base.frequency]),
        custom_days: pick(|s| s.custom_days),
        max_count: pick(|s| s.max_count),
        first_date: first_defined(&[site.and_then(|s| s.first_date), base.first_date]),
    }
}

/// Service names for regular visits: the site's list when it has a
/// non-empty one, the contract's otherwise.
pub fn resolve_services(contract: &Contract, site_id: Option<DbId>) -> &[String] {
    site_id
        .and_then(|id| contract.site(id))
        .and_then(|s| s.services.as_deref())
        .filter(|services| !services.is_empty())
        .unwrap_or(contract.services.as_slice())
}

fn positive(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v > 0)
}
