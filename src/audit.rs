//! Audit stamping for inserts, updates and soft deletes.
//!
//! Records opt into each audit column by overriding the matching setter on
//! [`Audited`]; a setter that is not overridden reports the column as absent and
//! nothing is written for it.
//!
//! ```rust,ignore
//! impl Audited for menu::ActiveModel {
//!     fn set_creator_id(&mut self, user_id: &str) -> bool {
//!         self.creator_id = Set(user_id.to_string());
//!         true
//!     }
//!     fn set_is_deleted(&mut self, deleted: bool) -> bool {
//!         self.is_deleted = Set(deleted);
//!         true
//!     }
//! }
//!
//! let ctx = AuditContext::from_claims(&settings.server, &claims);
//! stamp_insert(&mut active, &ctx);
//! ```

use chrono::{DateTime, Utc};

use crate::auth::TokenClaims;
use crate::config::ServerSettings;
use crate::errors::QueryError;
use crate::filtering::{MAX_EMBED_DEPTH, RecordShape};

pub const CREATOR_ID: &str = "CreatorId";
pub const TENANT_ID: &str = "TenantId";
pub const LAST_MODIFIER_ID: &str = "LastModifierId";
pub const LAST_MODIFICATION_TIME: &str = "LastModificationTime";
pub const IS_DELETED: &str = "IsDeleted";
pub const DELETER_ID: &str = "DeleterId";
pub const DELETION_TIME: &str = "DeletionTime";

/// Columns never written by an update.
const KEY_COLUMNS: [&str; 2] = ["Id", "ID"];

/// Who performs a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditContext {
    pub user_id: String,
    pub tenant_id: String,
    /// Global multi-tenancy switch at the time of the write.
    pub multi_tenancy: bool,
}

impl AuditContext {
    #[must_use]
    pub fn from_claims(server: &ServerSettings, claims: &TokenClaims) -> Self {
        Self {
            user_id: claims.user_id().to_string(),
            tenant_id: claims.tenant_id.clone(),
            multi_tenancy: server.use_multi_tenancy,
        }
    }
}

/// Audit columns a record may carry. Each setter returns whether the record
/// has that column.
pub trait Audited {
    fn set_creator_id(&mut self, _user_id: &str) -> bool {
        false
    }

    fn set_tenant_id(&mut self, _tenant_id: &str) -> bool {
        false
    }

    fn set_last_modifier_id(&mut self, _user_id: &str) -> bool {
        false
    }

    fn set_last_modification_time(&mut self, _at: DateTime<Utc>) -> bool {
        false
    }

    fn set_is_deleted(&mut self, _deleted: bool) -> bool {
        false
    }

    fn set_deleter_id(&mut self, _user_id: &str) -> bool {
        false
    }

    fn set_deletion_time(&mut self, _at: DateTime<Utc>) -> bool {
        false
    }
}

/// Audit columns written by a stamp call, in the order they were set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StampedColumns(Vec<&'static str>);

impl StampedColumns {
    fn mark(&mut self, column: &'static str, written: bool) {
        if written {
            self.0.push(column);
        }
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains(&column)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[&'static str] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Set the creator, and the tenant when multi-tenancy is on and the caller has
/// one. An empty user id leaves the creator unset.
pub fn stamp_insert<R: Audited + ?Sized>(record: &mut R, ctx: &AuditContext) -> StampedColumns {
    let mut stamped = StampedColumns::default();
    if !ctx.user_id.is_empty() {
        stamped.mark(CREATOR_ID, record.set_creator_id(&ctx.user_id));
    }
    if ctx.multi_tenancy && !ctx.tenant_id.is_empty() {
        stamped.mark(TENANT_ID, record.set_tenant_id(&ctx.tenant_id));
    }
    stamped
}

/// Set modifier and modification time.
pub fn stamp_update<R: Audited + ?Sized>(
    record: &mut R,
    ctx: &AuditContext,
    now: DateTime<Utc>,
) -> StampedColumns {
    let mut stamped = StampedColumns::default();
    stamped.mark(LAST_MODIFICATION_TIME, record.set_last_modification_time(now));
    stamped.mark(LAST_MODIFIER_ID, record.set_last_modifier_id(&ctx.user_id));
    stamped
}

/// Mark the record deleted and record who deleted it and when.
pub fn stamp_delete<R: Audited + ?Sized>(
    record: &mut R,
    ctx: &AuditContext,
    now: DateTime<Utc>,
) -> StampedColumns {
    let mut stamped = StampedColumns::default();
    stamped.mark(DELETION_TIME, record.set_deletion_time(now));
    stamped.mark(IS_DELETED, record.set_is_deleted(true));
    stamped.mark(DELETER_ID, record.set_deleter_id(&ctx.user_id));
    stamped
}

/// Columns an update writes: the modification pair first, then every field of
/// `shape` except the key columns and `omit`. Embedded records are flattened.
///
/// # Errors
///
/// [`QueryError::Shape`] when `shape` is not a record or nests embedded
/// records deeper than [`MAX_EMBED_DEPTH`].
pub fn update_columns(
    shape: &RecordShape,
    omit: &[&str],
) -> Result<Vec<&'static str>, QueryError> {
    let mut omitted: Vec<&str> = omit.to_vec();
    omitted.extend(KEY_COLUMNS);
    let mut columns = vec![LAST_MODIFICATION_TIME, LAST_MODIFIER_ID];
    collect_columns(shape, &omitted, &mut columns, 0)?;
    Ok(columns)
}

/// Every field of `shape` except `omit`, embedded records flattened.
///
/// # Errors
///
/// Same as [`update_columns`].
pub fn option_columns(
    shape: &RecordShape,
    omit: &[&str],
) -> Result<Vec<&'static str>, QueryError> {
    let mut columns = Vec::new();
    collect_columns(shape, omit, &mut columns, 0)?;
    Ok(columns)
}

fn collect_columns(
    shape: &RecordShape,
    omit: &[&str],
    columns: &mut Vec<&'static str>,
    depth: usize,
) -> Result<(), QueryError> {
    if depth > MAX_EMBED_DEPTH {
        return Err(QueryError::Shape(shape.type_name().to_string()));
    }
    for field in shape.fields()? {
        if let Some(inner) = field.embedded_record() {
            collect_columns(&inner, omit, columns, depth + 1)?;
            continue;
        }
        let column = field.column_name();
        if !omit.contains(&column) && !columns.contains(&column) {
            columns.push(column);
        }
    }
    Ok(())
}
