mod manager;
mod scenarios;

pub(crate) use manager::describe;
pub use manager::SessionManager;
pub use scenarios::AuthScenarios;
