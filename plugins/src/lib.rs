pub mod backend;
pub mod factory;
pub mod functions;
pub mod queue;
pub mod retry;
