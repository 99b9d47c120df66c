use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::errors::ApiError;
use crate::filtering::{CompiledRequest, FieldMap, RecordShape};
use crate::models::{PageList, PageRequest};
use crate::scope::DataScope;

/// A resource that can be listed page by page with the client filter / sort
/// language.
///
/// ```rust,ignore
/// impl PagedResource for Menu {
///     type EntityType = menu::Entity;
///     const RESOURCE_NAME_PLURAL: &'static str = "menus";
///     const USE_MULTI_TENANCY: bool = true;
///
///     fn record_shape() -> RecordShape {
///         RecordShape::record("Menu", MENU_FIELDS)
///     }
/// }
/// ```
#[async_trait]
pub trait PagedResource: Sized + Send + Sync
where
    Self::EntityType: EntityTrait + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync,
    Self: From<<Self::EntityType as EntityTrait>::Model>,
{
    type EntityType: EntityTrait + Sync;

    const RESOURCE_NAME_PLURAL: &'static str;
    /// Per-resource tenant isolation; only effective when the global switch
    /// is on as well.
    const USE_MULTI_TENANCY: bool = false;

    /// Fields that filter and sort selectors may name.
    fn record_shape() -> RecordShape;

    /// One page of visible rows. The total count, when requested, is taken
    /// after filtering but before ordering and paging.
    ///
    /// # Errors
    ///
    /// 400 for a bad filter or sort, 500 for database failures.
    async fn get_page(
        db: &DatabaseConnection,
        request: &PageRequest,
        scope: &DataScope,
    ) -> Result<PageList<Self>, ApiError> {
        let fields = FieldMap::resolve(&Self::record_shape())?;
        let compiled = CompiledRequest::compile(request, &fields, None)?;

        let mut query = Self::EntityType::find();
        scope.apply(&mut query, Self::USE_MULTI_TENANCY, &[]);
        compiled.apply_filters(&mut query);
        let count_query = request.require_total_count.then(|| query.clone());
        compiled.apply_order_and_page(&mut query);

        let total_count = match count_query {
            Some(count_query) => PaginatorTrait::count(count_query, db).await?,
            None => 0,
        };
        let models = query.all(db).await?;
        tracing::debug!(
            resource = Self::RESOURCE_NAME_PLURAL,
            rows = models.len(),
            total_count,
            "Fetched page"
        );
        Ok(PageList::new(
            total_count,
            models.into_iter().map(Self::from).collect(),
        ))
    }
}
