//! Input manager for loading ranking requests from disk

use crate::error::{RankerError, Result};
use crate::input::file_detector::FileType;
use crate::input::parser::{JsonParser, RequestParser, TomlParser};
use crate::ranking::engine::RankingRequest;
use anyhow::Context;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

pub struct InputManager {
    cache: HashMap<String, RankingRequest>,
    enable_cache: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn load_request(&mut self, path: &Path) -> Result<RankingRequest> {
        let path_str = path.to_string_lossy().to_string();

        // Check cache first
        if self.enable_cache {
            if let Some(cached) = self.cache.get(&path_str) {
                info!("Using cached request for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !path.exists() {
            return Err(RankerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let parser: Box<dyn RequestParser> = match self.detect_file_type(path)? {
            FileType::Json => Box::new(JsonParser),
            FileType::Toml => Box::new(TomlParser),
            FileType::Unknown => {
                return Err(RankerError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )));
            }
        };

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        info!("Parsing request: {}", path.display());
        let request = parser.parse(&content)?;
        info!("Loaded {} candidate(s) from {}", request.candidates.len(), path.display());

        if self.enable_cache {
            self.cache.insert(path_str, request.clone());
        }

        Ok(request)
    }

    fn detect_file_type(&self, path: &Path) -> Result<FileType> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| RankerError::InvalidInput(format!("File has no extension: {}", path.display())))?;

        Ok(FileType::from_extension(extension))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
