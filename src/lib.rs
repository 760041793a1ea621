pub mod app;
pub mod backend;
pub mod config;
pub mod document;
pub mod editor;
pub mod projection;
pub mod shared;
pub mod status;
pub mod styling;
