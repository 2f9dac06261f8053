pub mod api;
pub mod auction;
pub mod db;
pub mod engine;
pub mod entities;
pub mod error;
pub mod external;
pub mod notify;
pub mod realtime;
pub mod server;
pub mod tracking;
