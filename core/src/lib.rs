pub mod artifact;
pub mod backend;
pub mod cleanup;
pub mod config;
pub mod context;
pub mod error;
pub mod function;
pub mod job;
pub mod pool;
pub mod script;
pub mod submit;

pub mod api;
