// KPI definitions and the read-only catalog
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::DashboardError;

const BUILTIN_CATALOG: &str = include_str!("../../catalog/kpis.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KpiDomain {
    ContactCenter,
    MobileBanking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub priority: Priority,
    pub calculation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiGroup {
    pub domain: KpiDomain,
    pub kpis: Vec<KpiDefinition>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    contact_center: Vec<KpiDefinition>,
    #[serde(default)]
    mobile_banking: Vec<KpiDefinition>,
}

/// Static KPI metadata grouped by domain, each group tiered by priority.
#[derive(Debug, Clone)]
pub struct KpiCatalog {
    groups: Vec<KpiGroup>,
}

impl KpiCatalog {
    pub fn new(groups: Vec<KpiGroup>) -> Result<Self, DashboardError> {
        let mut seen = HashSet::new();
        let mut groups = groups;
        for group in &mut groups {
            for kpi in &group.kpis {
                if !seen.insert(kpi.id.clone()) {
                    return Err(DashboardError::Catalog(format!("duplicate KPI id {}", kpi.id)));
                }
            }
            // stable: catalog order is kept inside each tier
            group.kpis.sort_by_key(|k| k.priority);
        }
        Ok(Self { groups })
    }

    pub fn from_toml(document: &str) -> Result<Self, DashboardError> {
        let doc: CatalogDocument =
            toml::from_str(document).map_err(|e| DashboardError::Catalog(e.to_string()))?;

        Self::new(vec![
            KpiGroup {
                domain: KpiDomain::ContactCenter,
                kpis: doc.contact_center,
            },
            KpiGroup {
                domain: KpiDomain::MobileBanking,
                kpis: doc.mobile_banking,
            },
        ])
    }

    pub fn builtin() -> Result<Self, DashboardError> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    pub fn groups(&self) -> &[KpiGroup] {
        &self.groups
    }

    pub fn all(&self) -> impl Iterator<Item = &KpiDefinition> {
        self.groups.iter().flat_map(|g| g.kpis.iter())
    }

    pub fn by_domain(&self, domain: KpiDomain) -> &[KpiDefinition] {
        self.groups
            .iter()
            .find(|g| g.domain == domain)
            .map(|g| g.kpis.as_slice())
            .unwrap_or(&[])
    }

    pub fn by_priority(&self, domain: KpiDomain, priority: Priority) -> Vec<&KpiDefinition> {
        self.by_domain(domain)
            .iter()
            .filter(|k| k.priority == priority)
            .collect()
    }

    /// Lookup by id. A miss is a normal outcome, not an error.
    pub fn get(&self, id: &str) -> Option<&KpiDefinition> {
        self.all().find(|k| k.id == id)
    }
}
