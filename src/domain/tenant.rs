// Tenant and user context
use serde::{Deserialize, Serialize};

use super::error::DashboardError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Tenant {
    pub fn new(id: i64, name: &str, code: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            code: code.to_string(),
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: String,
}

/// The tenant/user pair every data fetch is keyed on.
///
/// Exactly one tenant is active at any time. Tenants are seeded from
/// configuration and are never removed here.
#[derive(Debug, Clone)]
pub struct TenantContext {
    tenants: Vec<Tenant>,
    active_id: i64,
    user: Option<User>,
}

impl TenantContext {
    /// Builds a context with the first active tenant selected.
    pub fn new(tenants: Vec<Tenant>, user: Option<User>) -> Result<Self, DashboardError> {
        let active_id = tenants
            .iter()
            .find(|t| t.is_active)
            .map(|t| t.id)
            .ok_or(DashboardError::NoActiveTenant)?;

        Ok(Self {
            tenants,
            active_id,
            user,
        })
    }

    pub fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }

    pub fn active(&self) -> &Tenant {
        // active_id is only ever set to the id of a tenant in the list
        self.tenants
            .iter()
            .find(|t| t.id == self.active_id)
            .unwrap_or(&self.tenants[0])
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn select(&mut self, tenant_id: i64) -> Result<&Tenant, DashboardError> {
        let tenant = self
            .tenants
            .iter()
            .find(|t| t.id == tenant_id)
            .ok_or(DashboardError::UnknownTenant(tenant_id))?;

        if !tenant.is_active {
            return Err(DashboardError::InactiveTenant(tenant_id));
        }

        tracing::debug!("Switching active tenant {} -> {}", self.active_id, tenant_id);
        self.active_id = tenant_id;
        Ok(self.active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenants() -> Vec<Tenant> {
        let mut dormant = Tenant::new(1, "Dormant Bank", "DRM");
        dormant.is_active = false;
        vec![
            dormant,
            Tenant::new(2, "First National", "FNB"),
            Tenant::new(3, "Coastal Credit", "CCU"),
        ]
    }

    #[test]
    fn test_first_active_tenant_is_selected() {
        let ctx = TenantContext::new(tenants(), None).unwrap();
        assert_eq!(ctx.active().id, 2);
    }

    #[test]
    fn test_select_switches_single_active_tenant() {
        let mut ctx = TenantContext::new(tenants(), None).unwrap();
        assert_eq!(ctx.select(3).unwrap().code, "CCU");
        assert_eq!(ctx.active().id, 3);
    }

    #[test]
    fn test_select_rejects_unknown_and_inactive() {
        let mut ctx = TenantContext::new(tenants(), None).unwrap();
        assert_eq!(ctx.select(42), Err(DashboardError::UnknownTenant(42)));
        assert_eq!(ctx.select(1), Err(DashboardError::InactiveTenant(1)));
        assert_eq!(ctx.active().id, 2);
    }

    #[test]
    fn test_requires_an_active_tenant() {
        let mut only = Tenant::new(1, "Dormant Bank", "DRM");
        only.is_active = false;
        assert!(matches!(
            TenantContext::new(vec![only], None),
            Err(DashboardError::NoActiveTenant)
        ));
    }
}
