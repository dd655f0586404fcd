pub mod prelude;

pub mod clicks;
pub mod conversions;
pub mod offers;
pub mod sessions;
pub mod users;
