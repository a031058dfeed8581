pub mod account;
pub mod auth;
pub mod config;
pub mod guard;
pub mod preset;
pub mod room;
pub mod settings;
pub mod stats;
pub mod sync;
pub mod timer;
pub mod zoo;
