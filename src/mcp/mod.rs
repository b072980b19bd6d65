mod dispatcher;
mod handler;
mod registry;
mod server;
mod types;
mod validation;


pub use dispatcher::Dispatcher;
pub use server::MCPServer;
