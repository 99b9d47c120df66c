use sea_orm::sea_query::{Alias, ColumnRef, IntoColumnRef};
use std::collections::HashMap;
use std::fmt;

use crate::errors::QueryError;

/// One entry of a record's static field table.
///
/// ```rust
/// use crudscope::filtering::{FieldDescriptor, RecordShape};
///
/// static AUDIT_FIELDS: &[FieldDescriptor] = &[
///     FieldDescriptor::new("CreatorId").tag("creatorId"),
/// ];
///
/// fn audit_shape() -> RecordShape {
///     RecordShape::record("AuditFields", AUDIT_FIELDS)
/// }
///
/// static MENU_FIELDS: &[FieldDescriptor] = &[
///     FieldDescriptor::new("Name").tag("name"),
///     FieldDescriptor::new("ParentName").tag("parentName").column("Name").table_alias("p"),
///     FieldDescriptor::new("Audit").embedded(audit_shape),
/// ];
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// Client-facing name used in filter and sort selectors.
    pub tag: Option<&'static str>,
    /// Column override; defaults to `name`.
    pub column: Option<&'static str>,
    /// Table alias override; wins over the caller's default alias.
    pub table_alias: Option<&'static str>,
    /// Set for embedded extension records whose fields flatten into the parent.
    pub embedded: Option<fn() -> RecordShape>,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            tag: None,
            column: None,
            table_alias: None,
            embedded: None,
        }
    }

    #[must_use]
    pub const fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    #[must_use]
    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    #[must_use]
    pub const fn table_alias(mut self, alias: &'static str) -> Self {
        self.table_alias = Some(alias);
        self
    }

    #[must_use]
    pub const fn embedded(mut self, shape: fn() -> RecordShape) -> Self {
        self.embedded = Some(shape);
        self
    }

    /// Physical column: the override when set, else the field name. Filters,
    /// sorts and audit column lists all resolve columns through this.
    #[must_use]
    pub const fn column_name(&self) -> &'static str {
        match self.column {
            Some(column) => column,
            None => self.name,
        }
    }

    /// Record shape of an embedded extension, `None` for plain fields and for
    /// embedded scalars or lists.
    #[must_use]
    pub fn embedded_record(&self) -> Option<RecordShape> {
        self.embedded
            .map(|shape| shape())
            .filter(|shape| matches!(shape, RecordShape::Record { .. }))
    }
}

/// Embedded records nest at most this deep; deeper (or cyclic) shapes are
/// rejected with [`QueryError::Shape`].
pub const MAX_EMBED_DEPTH: usize = 8;

/// Static description of a queryable type.
#[derive(Debug, Clone, Copy)]
pub enum RecordShape {
    Record {
        name: &'static str,
        fields: &'static [FieldDescriptor],
    },
    Scalar(&'static str),
    List(&'static str),
}

impl RecordShape {
    #[must_use]
    pub const fn record(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self::Record { name, fields }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Record { name, .. } | Self::Scalar(name) | Self::List(name) => name,
        }
    }

    /// Field table of a record, or `ShapeError` for anything else.
    pub fn fields(&self) -> Result<&'static [FieldDescriptor], QueryError> {
        match self {
            Self::Record { fields, .. } => Ok(fields),
            Self::Scalar(name) | Self::List(name) => Err(QueryError::Shape((*name).to_string())),
        }
    }
}

/// Physical location of a client-facing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag {
    pub client_name: &'static str,
    pub column: &'static str,
    pub table_alias: Option<&'static str>,
}

/// Qualified column reference, built only from field-map entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPath {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnPath {
    #[must_use]
    pub fn column_ref(&self) -> ColumnRef {
        match &self.table {
            Some(table) => (Alias::new(table), Alias::new(&self.column)).into_column_ref(),
            None => Alias::new(&self.column).into_column_ref(),
        }
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => f.write_str(&self.column),
        }
    }
}

/// Client field name -> [`FieldTag`], resolved once per request.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    tags: HashMap<&'static str, FieldTag>,
}

impl FieldMap {
    /// Build the map for a record shape, flattening embedded extensions one
    /// level at a time into the same namespace.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Shape`] when `shape` is not a record, or when
    /// embedded records nest deeper than [`MAX_EMBED_DEPTH`].
    pub fn resolve(shape: &RecordShape) -> Result<Self, QueryError> {
        let mut map = Self::default();
        map.collect(shape, 0)?;
        Ok(map)
    }

    fn collect(&mut self, shape: &RecordShape, depth: usize) -> Result<(), QueryError> {
        if depth > MAX_EMBED_DEPTH {
            return Err(QueryError::Shape(shape.type_name().to_string()));
        }
        for field in shape.fields()? {
            if let Some(tag) = field.tag {
                self.insert(tag, field);
            } else if let Some(inner) = field.embedded_record() {
                self.collect(&inner, depth + 1)?;
            } else {
                self.insert(field.name, field);
            }
        }
        Ok(())
    }

    fn insert(&mut self, client_name: &'static str, field: &FieldDescriptor) {
        self.tags.insert(
            client_name,
            FieldTag {
                client_name,
                column: field.column_name(),
                table_alias: field.table_alias,
            },
        );
    }

    #[must_use]
    pub fn get(&self, selector: &str) -> Option<&FieldTag> {
        self.tags.get(selector)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Qualified column for a selector: the field's own alias, else the caller's
    /// default alias, else the bare column.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownField`] for selectors absent from the map.
    pub fn column_path(
        &self,
        selector: &str,
        default_alias: Option<&str>,
    ) -> Result<ColumnPath, QueryError> {
        let tag = self
            .get(selector)
            .ok_or_else(|| QueryError::UnknownField(selector.to_string()))?;
        let table = tag
            .table_alias
            .or(default_alias)
            .filter(|alias| !alias.is_empty())
            .map(str::to_string);
        Ok(ColumnPath {
            table,
            column: tag.column.to_string(),
        })
    }
}
