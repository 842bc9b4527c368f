pub mod bootstrap;
pub mod config;
pub mod csv;
pub mod llm_clients;
pub mod remote;
pub mod response;
pub mod security;
pub mod sentiment_api;
pub mod storage;
