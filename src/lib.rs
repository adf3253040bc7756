pub mod config;
pub mod error;
pub mod notifier;
pub mod routes;
pub mod service;
pub mod validation;

#[cfg(test)]
mod test_utils;
