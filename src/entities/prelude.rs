pub use super::clicks::Entity as Clicks;
pub use super::conversions::Entity as Conversions;
pub use super::offers::Entity as Offers;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;
