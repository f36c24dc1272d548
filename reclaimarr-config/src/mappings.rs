use reclaimarr_model::MediaType;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One archive routing entry: which source library folder maps to which
/// archive destination. Automated archive actions must resolve an item's
/// root folder to exactly one destination through these, or refuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMapping {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub source: String,
    pub destination: String,
}

/// Parse the `ARCHIVE_MAPPINGS_ENV` format: semicolon-separated
/// `type|source|destination` triples. Invalid entries are skipped with a
/// warning rather than failing the whole variable.
pub fn parse_env_mappings(raw: &str) -> Vec<ArchiveMapping> {
    let mut mappings = Vec::new();

    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
        let [kind, source, destination] = parts.as_slice() else {
            warn!("Skipping invalid archive mapping format: {entry}");
            continue;
        };

        let media_type = match *kind {
            "tv" => MediaType::Tv,
            "movie" => MediaType::Movie,
            _ => {
                warn!("Skipping archive mapping with unknown type: {entry}");
                continue;
            }
        };

        if source.is_empty() || destination.is_empty() {
            warn!("Skipping archive mapping with empty path: {entry}");
            continue;
        }

        mappings.push(ArchiveMapping {
            media_type,
            source: (*source).to_string(),
            destination: (*destination).to_string(),
        });
    }

    if !mappings.is_empty() {
        info!("Loaded {} archive mappings from environment", mappings.len());
    }

    mappings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_triples() {
        let mappings = parse_env_mappings("tv|/tv|/archive/tv; movie|/movies|/archive/movies");
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].media_type, MediaType::Tv);
        assert_eq!(mappings[0].source, "/tv");
        assert_eq!(mappings[1].destination, "/archive/movies");
    }

    #[test]
    fn skips_malformed_entries_but_keeps_the_rest() {
        let mappings =
            parse_env_mappings("tv|/tv; music|/m|/a; movie|/movies|/archive/movies; |/x|/y");
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].media_type, MediaType::Movie);
    }

    #[test]
    fn empty_input_yields_no_mappings() {
        assert!(parse_env_mappings("").is_empty());
        assert!(parse_env_mappings(" ; ; ").is_empty());
    }
}
