pub mod admin;
pub mod auction;
pub mod banner;
pub mod bidding;
pub mod config;
pub mod database;
pub mod handlers;
pub mod member;
pub mod query;
pub mod scheduler;
pub mod session;
pub mod view;
