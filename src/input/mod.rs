//! Input processing module
//! Handles file detection, request parsing, and input management

pub mod file_detector;
pub mod parser;
pub mod manager;
