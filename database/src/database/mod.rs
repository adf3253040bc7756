pub mod database;
pub mod options;
pub mod request_manager;
pub mod table;
