pub mod countdown;
pub mod status;

pub use countdown::TimeRemaining;
pub use status::AuctionStatus;
