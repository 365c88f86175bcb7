pub mod controller;
pub mod crud;
pub mod model;
pub mod routes;
pub mod schema;

pub use crud::CheckResultCrud;
pub use routes::monitor_routes;
