//! Ranking request parsing for the supported file formats

use crate::error::Result;
use crate::ranking::engine::RankingRequest;

pub trait RequestParser {
    fn parse(&self, content: &str) -> Result<RankingRequest>;
}

pub struct JsonParser;

impl RequestParser for JsonParser {
    fn parse(&self, content: &str) -> Result<RankingRequest> {
        Ok(serde_json::from_str(content)?)
    }
}

pub struct TomlParser;

impl RequestParser for TomlParser {
    fn parse(&self, content: &str) -> Result<RankingRequest> {
        Ok(toml::from_str(content)?)
    }
}
