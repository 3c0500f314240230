pub mod analysis;
pub mod config;
pub mod errors;
pub mod extract;
pub mod llm_client;
pub mod quota;
pub mod routes;
pub mod state;
