pub mod import;
pub mod notifications;
pub mod refresh;
pub mod remote;
pub mod report;
pub mod server;
pub mod session;
pub mod squad;
pub mod watchlist;
