pub const DESTINATIONS: &str = "destinations";
pub const USERS: &str = "users";
pub const BOOKINGS: &str = "bookings";
pub const REVIEWS: &str = "reviews";
pub const FAVORITES: &str = "favorites";

/// Every top-level collection the application writes to.
pub const ALL: [&str; 5] = [DESTINATIONS, USERS, BOOKINGS, REVIEWS, FAVORITES];
