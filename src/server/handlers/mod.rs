pub mod bids;
pub mod jobs;
pub mod requests;
pub mod ws;
