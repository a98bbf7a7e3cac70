//! Entity normalizer
//!
//! Joins owner rows with their child social-link rows. Owner order is the
//! store's order and is never changed here.

use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::SyncError;
use crate::model::{Platform, SocialLinks, SocialOwner};
use crate::traits::{value_as_string, Row};

/// Decode store rows into typed records, keeping their order
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, SyncError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| SyncError::Decode(format!("row {}: {}", index, e)))
        })
        .collect()
}

/// Group child link rows by owner foreign key into platform → url maps
///
/// Rows without a foreign key, platform or url are skipped. Platform names
/// are stored lowercased.
pub fn group_links(link_rows: &[Row], foreign_key: &str) -> HashMap<String, SocialLinks> {
    let mut grouped: HashMap<String, SocialLinks> = HashMap::new();

    for row in link_rows {
        let owner = row.get(foreign_key).and_then(value_as_string);
        let platform = row.get("platform").and_then(|v| v.as_str());
        let url = row.get("url").and_then(|v| v.as_str());

        match (owner, platform, url) {
            (Some(owner), Some(platform), Some(url)) => {
                let platform = Platform::from_name(platform);
                grouped
                    .entry(owner)
                    .or_default()
                    .insert(platform.as_str().to_string(), url.to_string());
            }
            _ => tracing::debug!(?row, foreign_key, "Skipping incomplete social link row"),
        }
    }

    grouped
}

/// Attach each owner's link set; owners without links get an empty map
pub fn normalize<T: SocialOwner>(owners: Vec<T>, link_rows: &[Row], foreign_key: &str) -> Vec<T> {
    let mut grouped = group_links(link_rows, foreign_key);

    owners
        .into_iter()
        .map(|mut owner| {
            let links = grouped.remove(owner.owner_id()).unwrap_or_default();
            owner.attach_social_links(links);
            owner
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Connection;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_links_attached_by_foreign_key() {
        let owners: Vec<Connection> = decode_rows(rows(json!([
            {"id": "c2", "name": "Zed", "category": "business", "position": 1},
            {"id": "c1", "name": "Amy", "category": "health", "position": 0},
            {"id": "c3", "name": "Bo", "category": "learning", "position": 2}
        ])))
        .unwrap();

        let links = rows(json!([
            {"connection_id": "c1", "platform": "linkedin", "url": "https://li/amy"},
            {"connection_id": "c2", "platform": "Twitter", "url": "https://tw/zed"},
            {"connection_id": "c1", "platform": "youtube", "url": "https://yt/amy"},
            {"connection_id": "c9", "platform": "spotify", "url": "https://sp/ghost"}
        ]));

        let normalized = normalize(owners, &links, "connection_id");

        assert_eq!(normalized.len(), 3);
        // Store order preserved
        let ids: Vec<&str> = normalized.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1", "c3"]);

        assert_eq!(normalized[0].social_links.len(), 1);
        assert_eq!(normalized[0].social_links["twitter"], "https://tw/zed");
        assert_eq!(normalized[1].social_links.len(), 2);
        assert_eq!(normalized[1].social_links["youtube"], "https://yt/amy");
        assert!(normalized[2].social_links.is_empty());
    }

    #[test]
    fn test_numeric_foreign_keys_match_string_ids() {
        let links = rows(json!([
            {"family_member_id": 4, "platform": "instagram", "url": "https://ig/x"}
        ]));
        let grouped = group_links(&links, "family_member_id");
        assert_eq!(grouped["4"]["instagram"], "https://ig/x");
    }

    #[test]
    fn test_incomplete_link_rows_skipped() {
        let links = rows(json!([
            {"profile_id": "p1", "platform": "linkedin"},
            {"platform": "linkedin", "url": "https://li/a"},
            {"profile_id": "p1", "platform": "spotify", "url": "https://sp/a"}
        ]));
        let grouped = group_links(&links, "profile_id");
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["p1"].len(), 1);
    }

    #[test]
    fn test_decode_error_names_row() {
        let result: Result<Vec<Connection>, _> = decode_rows(rows(json!([
            {"id": "c1", "name": "A"},
            {"name": "no id"}
        ])));
        match result {
            Err(SyncError::Decode(message)) => assert!(message.starts_with("row 1")),
            other => panic!("expected decode error, got {:?}", other),
        }
    }
}
