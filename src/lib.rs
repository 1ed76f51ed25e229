// Library for tests to access modules

pub mod config;
pub mod history;
pub mod history_repo;
pub mod models;
pub mod routes;
pub mod runtime_stats;
pub mod scheduler;
pub mod sysinfo_repo;
