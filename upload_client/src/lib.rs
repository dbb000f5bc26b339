mod page;
mod prediction;
mod regions;
mod routes;
mod server;

#[cfg(test)]
mod testing;

pub mod app;
pub mod config;

pub use app::start_app;
