pub mod config;
pub mod conversation;
pub mod credentials;
pub mod datastore;
pub mod generation;
pub mod message;
pub mod store;
