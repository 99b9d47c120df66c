//! Row visibility shared by every query: soft-deleted rows are hidden, and with
//! multi-tenancy on, rows of other tenants are too.

use sea_orm::sea_query::{Alias, ColumnRef, Condition, Expr, IntoColumnRef};

use crate::auth::TokenClaims;
use crate::config::ServerSettings;
use crate::filtering::QueryTarget;

pub const IS_DELETED_COLUMN: &str = "IsDeleted";
pub const TENANT_ID_COLUMN: &str = "TenantId";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataScope {
    /// The global multi-tenancy switch.
    pub multi_tenancy: bool,
    /// Tenant of the caller, if any.
    pub tenant_id: Option<String>,
}

impl DataScope {
    #[must_use]
    pub fn new(multi_tenancy: bool, tenant_id: Option<String>) -> Self {
        Self {
            multi_tenancy,
            tenant_id,
        }
    }

    #[must_use]
    pub fn from_claims(server: &ServerSettings, claims: &TokenClaims) -> Self {
        Self::new(
            server.use_multi_tenancy,
            claims.tenant_id().map(str::to_string),
        )
    }

    /// Whether a query on a resource with the given flag gets a tenant filter.
    #[must_use]
    pub const fn isolates_tenants(&self, resource_multi_tenancy: bool) -> bool {
        self.multi_tenancy && resource_multi_tenancy
    }

    /// `IsDeleted = false` on every alias (or the bare column when `aliases` is
    /// empty), plus `TenantId = ?` the same way when tenants are isolated.
    ///
    /// A caller without a tenant is matched against the empty tenant id.
    #[must_use]
    pub fn condition(&self, resource_multi_tenancy: bool, aliases: &[&str]) -> Condition {
        let mut condition = Condition::all();
        for column in scoped_columns(IS_DELETED_COLUMN, aliases) {
            condition = condition.add(Expr::col(column).eq(false));
        }
        if self.isolates_tenants(resource_multi_tenancy) {
            let tenant = self.tenant_id.clone().unwrap_or_default();
            for column in scoped_columns(TENANT_ID_COLUMN, aliases) {
                condition = condition.add(Expr::col(column).eq(tenant.clone()));
            }
        }
        condition
    }

    /// AND the scope condition onto `query`.
    pub fn apply<Q: QueryTarget>(
        &self,
        query: &mut Q,
        resource_multi_tenancy: bool,
        aliases: &[&str],
    ) {
        query.add_condition(self.condition(resource_multi_tenancy, aliases));
    }
}

fn scoped_columns(column: &str, aliases: &[&str]) -> Vec<ColumnRef> {
    let aliases: Vec<&str> = aliases.iter().copied().filter(|a| !a.is_empty()).collect();
    if aliases.is_empty() {
        return vec![Alias::new(column).into_column_ref()];
    }
    aliases
        .into_iter()
        .map(|alias| (Alias::new(alias), Alias::new(column)).into_column_ref())
        .collect()
}
