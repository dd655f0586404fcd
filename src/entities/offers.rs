use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub advertiser_id: i32,
    pub name: String,
    pub description: String,
    /// Payout per conversion in minor units
    pub payout: i64,
    pub category: String,
    pub status: String,
    /// Always `payout * 20`, in minor units
    pub prepayment_amount: i64,
    pub prepayment_paid: bool,
    pub test_lead_completed: bool,
    pub pixel_code: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AdvertiserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Advertiser,
    #[sea_orm(has_many = "super::clicks::Entity")]
    Clicks,
    #[sea_orm(has_many = "super::conversions::Entity")]
    Conversions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advertiser.def()
    }
}

impl Related<super::clicks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clicks.def()
    }
}

impl Related<super::conversions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
