use crudscope::filtering::{FieldDescriptor, RecordShape};
use crudscope::traits::PagedResource;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "menus")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "Id")]
    pub id: String,
    #[sea_orm(column_name = "Name")]
    pub name: String,
    #[sea_orm(column_name = "Code")]
    pub code: String,
    #[sea_orm(column_name = "Sort")]
    pub sort: i32,
    #[sea_orm(column_name = "TenantId")]
    pub tenant_id: String,
    #[sea_orm(column_name = "IsDeleted")]
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: String,
    pub name: String,
    pub code: String,
    pub sort: i32,
}

impl From<Model> for Menu {
    fn from(model: Model) -> Self {
        Menu {
            id: model.id,
            name: model.name,
            code: model.code,
            sort: model.sort,
        }
    }
}

pub static MENU_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Id").tag("id").column("Id"),
    FieldDescriptor::new("Name").tag("name").column("Name"),
    FieldDescriptor::new("Code").tag("code").column("Code"),
    FieldDescriptor::new("Sort").tag("sort").column("Sort"),
];

impl PagedResource for Menu {
    type EntityType = Entity;

    const RESOURCE_NAME_PLURAL: &'static str = "menus";
    const USE_MULTI_TENANCY: bool = true;

    fn record_shape() -> RecordShape {
        RecordShape::record("Menu", MENU_FIELDS)
    }
}
