pub mod click;
pub mod conversion;
pub mod offer;
pub mod session;
pub mod stats;
pub mod user;
