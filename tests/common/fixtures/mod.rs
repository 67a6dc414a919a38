//! Sample data used by the card tests

/// Track title drawn on the card
pub const SAMPLE_TITLE: &str = "Never Gonna Give You Up";

/// Display name of the requesting user
pub const SAMPLE_REQUESTER: &str = "alice";

/// Path the mock server serves the thumbnail from
pub const THUMBNAIL_ROUTE: &str = "/vi/dQw4w9WgXcQ/hqdefault.jpg";

/// Background colour, distinct from the thumbnail
pub const BACKGROUND_COLOR: [u8; 3] = [10, 20, 30];

pub const THUMBNAIL_COLOR: [u8; 3] = [200, 40, 40];
