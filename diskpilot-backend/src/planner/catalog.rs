//! Most-recently-generated plan cache
//!
//! Execution looks plans up here by id, so the catalog keeps the last
//! generated set regardless of age; freshness only gates whether the
//! plans endpoint regenerates.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::models::Plan;

const FRESHNESS_MINUTES: i64 = 5;

struct CachedPlans {
    plans: Vec<Plan>,
    generated_at: DateTime<Utc>,
}

pub struct PlanCatalog {
    inner: RwLock<Option<CachedPlans>>,
}

impl PlanCatalog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Replace the cached plan set
    pub fn store(&self, plans: Vec<Plan>) {
        *self.inner.write() = Some(CachedPlans {
            plans,
            generated_at: Utc::now(),
        });
    }

    /// The cached set, if generated within the freshness window
    pub fn fresh(&self) -> Option<Vec<Plan>> {
        let guard = self.inner.read();
        let cached = guard.as_ref()?;
        if Utc::now() - cached.generated_at < Duration::minutes(FRESHNESS_MINUTES) {
            Some(cached.plans.clone())
        } else {
            None
        }
    }

    /// Look up a plan by id in the last generated set, fresh or not
    pub fn find(&self, plan_id: &str) -> Option<Plan> {
        self.inner
            .read()
            .as_ref()?
            .plans
            .iter()
            .find(|p| p.id == plan_id)
            .cloned()
    }

    /// Whether any plan set has ever been generated
    pub fn is_populated(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;

    fn plan(id: &str) -> Plan {
        Plan {
            id: id.to_string(),
            name: id.to_string(),
            space_saved_bytes: 0,
            risk_level: RiskLevel::Low,
            estimated_minutes: 0,
            rationale: String::new(),
            actions: Vec::new(),
            recommended: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = PlanCatalog::new();
        assert!(!catalog.is_populated());
        assert!(catalog.fresh().is_none());
        assert!(catalog.find("conservative").is_none());
    }

    #[test]
    fn test_store_and_find() {
        let catalog = PlanCatalog::new();
        catalog.store(vec![plan("conservative"), plan("balanced")]);

        assert!(catalog.is_populated());
        assert_eq!(catalog.fresh().unwrap().len(), 2);
        assert_eq!(catalog.find("balanced").unwrap().id, "balanced");
        assert!(catalog.find("aggressive").is_none());
    }
}
