// Library for tests to access modules

pub mod config;
pub mod models;
pub mod probe_repo;
pub mod results_repo;
pub mod routes;
pub mod version;
pub mod worker;
