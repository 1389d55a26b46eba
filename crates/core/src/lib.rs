pub mod auth;
pub mod content;
pub mod document;
pub mod editorial;
pub mod intake;
pub mod mutation;
pub mod query;
pub mod sections;
pub mod store;
