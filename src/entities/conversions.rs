use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "conversions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub offer_id: i32,
    /// Not a foreign key: conversions are recorded for any id the pixel reports.
    pub webmaster_id: i32,
    /// Most recent click of the same (offer, webmaster) pair, if any
    pub click_id: Option<i32>,
    /// Webmaster share in minor units
    pub payout: i64,
    /// Platform share in minor units
    pub commission: i64,
    pub ip_address: String,
    pub status: String,
    pub converted_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::offers::Entity",
        from = "Column::OfferId",
        to = "super::offers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Offers,
    #[sea_orm(
        belongs_to = "super::clicks::Entity",
        from = "Column::ClickId",
        to = "super::clicks::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Clicks,
}

impl Related<super::offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offers.def()
    }
}

impl Related<super::clicks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clicks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
