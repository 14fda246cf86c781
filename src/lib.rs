// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod discovery;
pub mod models;
pub mod probe;
pub mod routes;
pub mod store;
pub mod sysinfo_repo;
pub mod worker;
