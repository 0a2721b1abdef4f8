// Core algorithm exports
pub mod distance;
pub mod feed;
pub mod ranker;
pub mod recipients;

pub use distance::{calculate_bounding_box, haversine_distance};
pub use feed::nearby_alerts;
pub use ranker::{rank_nearby, validate_query, InvalidInputError, Located, Ranked};
pub use recipients::{build_recipients, find_nearby_users};
