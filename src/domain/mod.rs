mod ids;
pub mod models;

pub use ids::fresh_id;
pub use models::*;
