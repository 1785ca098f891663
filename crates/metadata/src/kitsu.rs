//! Kitsu provider client.
//!
//! Uses the Kitsu JSON:API edge endpoints: https://kitsu.docs.apiary.io

use chrono::Datelike;
use serde_json::Value;
use tracing::debug;

use crate::fetch::{HttpFetcher, endpoint};
use crate::source::CatalogSource;
use crate::{CandidateRecord, MetadataConfig, MetadataError, TitleVariants};

pub const BASE_URL: &str = "https://kitsu.io/api/edge";
pub const NAME: &str = "kitsu";
pub const ORDER: i32 = -4;
/// Kitsu's `averageRating` is out of 100.
pub const RATING_SCALE: f64 = 0.1;

const TITLE_KEYS: &[&str] = &["en", "en_jp", "en_us", "ja_jp"];

pub struct KitsuClient {
    base_url: String,
    http: HttpFetcher,
}

impl KitsuClient {
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        Ok(Self {
            base_url: config.kitsu_url.trim_end_matches('/').to_string(),
            http: HttpFetcher::new(NAME, config)?,
        })
    }
}

#[async_trait::async_trait]
impl CatalogSource for KitsuClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<CandidateRecord>, MetadataError> {
        let fetched = match endpoint(&self.base_url, &["anime", id]) {
            Ok(url) => self.http.fetch_json(&url, &[("include", "genres")]).await,
            Err(e) => Err(e),
        };
        let doc = match fetched {
            Ok(doc) => doc,
            Err(MetadataError::NotFound) => {
                debug!(id, "kitsu entry not found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let data = doc
            .get("data")
            .filter(|d| d.is_object())
            .ok_or_else(|| MetadataError::MalformedResponse("kitsu: missing data object".into()))?;
        let included = included_of(&doc);

        parse_anime(data, included, true)
            .map(Some)
            .ok_or_else(|| MetadataError::MalformedResponse("kitsu: entry without id".into()))
    }

    async fn search(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Vec<CandidateRecord>, MetadataError> {
        let mut params = vec![("filter[text]", title), ("include", "genres")];
        let year_str = year.map(|y| y.to_string());
        if let Some(ref y) = year_str {
            params.push(("filter[seasonYear]", y.as_str()));
        }

        let url = endpoint(&self.base_url, &["anime"])?;
        let doc = self.http.fetch_json(&url, &params).await?;

        let data = doc["data"]
            .as_array()
            .ok_or_else(|| MetadataError::MalformedResponse("kitsu: missing data array".into()))?;
        let included = included_of(&doc);

        Ok(data
            .iter()
            .filter_map(|entry| parse_anime(entry, included, false))
            .collect())
    }
}

fn included_of(doc: &Value) -> &[Value] {
    doc["included"].as_array().map(Vec::as_slice).unwrap_or_default()
}

/// Map one `anime` resource to a candidate. Returns `None` when the entry
/// has no id.
///
/// With `all_genres`, every included genre is used when the entry carries no
/// genre relationship (single-entry responses).
fn parse_anime(data: &Value, included: &[Value], all_genres: bool) -> Option<CandidateRecord> {
    let external_id = match &data["id"] {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let attrs = &data["attributes"];

    Some(CandidateRecord {
        external_id,
        title: parse_titles(attrs),
        overview: attrs["synopsis"]
            .as_str()
            .or_else(|| attrs["description"].as_str())
            .unwrap_or_default()
            .to_string(),
        raw_rating: match &attrs["averageRating"] {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        },
        genres: parse_genres(data, included, all_genres),
        image_url: ["original", "large", "medium"]
            .iter()
            .find_map(|size| attrs["posterImage"][size].as_str())
            .map(|s| s.to_string()),
        year: attrs["startDate"]
            .as_str()
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d.year()),
    })
}

fn parse_titles(attrs: &Value) -> TitleVariants {
    let titles = &attrs["titles"];
    let canonical = attrs["canonicalTitle"]
        .as_str()
        .or_else(|| TITLE_KEYS.iter().find_map(|k| titles[k].as_str()))
        .unwrap_or("Unknown");

    let mut variants = TitleVariants::new(canonical);
    for key in TITLE_KEYS {
        if let Some(t) = titles[key].as_str() {
            variants.push_alternate(t);
        }
    }
    if let Some(other) = titles.as_object() {
        for (key, value) in other {
            if TITLE_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(t) = value.as_str() {
                variants.push_alternate(t);
            }
        }
    }
    if let Some(abbrev) = attrs["abbreviatedTitles"].as_array() {
        for t in abbrev.iter().filter_map(|t| t.as_str()) {
            variants.push_alternate(t);
        }
    }
    variants
}

fn parse_genres(data: &Value, included: &[Value], all_genres: bool) -> Vec<String> {
    let genre_name = |g: &Value| g["attributes"]["name"].as_str().map(|s| s.to_string());
    let is_genre = |g: &&Value| g["type"].as_str() == Some("genres");

    match data["relationships"]["genres"]["data"].as_array() {
        Some(refs) => refs
            .iter()
            .filter_map(|r| r["id"].as_str())
            .filter_map(|id| {
                included
                    .iter()
                    .filter(is_genre)
                    .find(|g| g["id"].as_str() == Some(id))
            })
            .filter_map(genre_name)
            .collect(),
        None if all_genres => included.iter().filter(is_genre).filter_map(genre_name).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn attack_on_titan() -> Value {
        json!({
            "id": "7442",
            "type": "anime",
            "attributes": {
                "synopsis": "Centuries ago, mankind was slaughtered to near extinction...",
                "titles": {
                    "en": "Attack on Titan",
                    "en_jp": "Shingeki no Kyojin",
                    "ja_jp": "進撃の巨人"
                },
                "canonicalTitle": "Attack on Titan",
                "abbreviatedTitles": ["AoT", "SnK"],
                "averageRating": "84.8",
                "startDate": "2013-04-07",
                "posterImage": {
                    "medium": "https://media.kitsu.io/anime/poster_images/7442/medium.jpg",
                    "original": "https://media.kitsu.io/anime/poster_images/7442/original.jpg"
                }
            },
            "relationships": {
                "genres": { "data": [
                    { "type": "genres", "id": "1" },
                    { "type": "genres", "id": "3" }
                ] }
            }
        })
    }

    fn genres() -> Value {
        json!([
            { "id": "1", "type": "genres", "attributes": { "name": "Action" } },
            { "id": "2", "type": "genres", "attributes": { "name": "Comedy" } },
            { "id": "3", "type": "genres", "attributes": { "name": "Drama" } }
        ])
    }

    fn client(server: &mockito::Server) -> KitsuClient {
        KitsuClient::new(&MetadataConfig {
            kitsu_url: server.url(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn parse_anime_from_json() {
        let included = genres();
        let rec = parse_anime(&attack_on_titan(), included.as_array().unwrap(), false).unwrap();

        assert_eq!(rec.external_id, "7442");
        assert_eq!(rec.title.canonical, "Attack on Titan");
        assert_eq!(
            rec.title.alternates,
            vec!["Shingeki no Kyojin", "進撃の巨人", "AoT", "SnK"]
        );
        assert_eq!(rec.raw_rating.as_deref(), Some("84.8"));
        assert_eq!(rec.genres, vec!["Action", "Drama"]);
        assert!(rec.image_url.unwrap().ends_with("original.jpg"));
        assert_eq!(rec.year, Some(2013));
    }

    #[test]
    fn parse_anime_tolerates_missing_fields() {
        let rec = parse_anime(
            &json!({ "id": 12, "attributes": { "titles": { "en_jp": "Mushishi" } } }),
            &[],
            true,
        )
        .unwrap();

        assert_eq!(rec.external_id, "12");
        assert_eq!(rec.title.canonical, "Mushishi");
        assert!(rec.title.alternates.is_empty());
        assert_eq!(rec.overview, "");
        assert_eq!(rec.raw_rating, None);
        assert!(rec.genres.is_empty());
        assert_eq!(rec.image_url, None);
        assert_eq!(rec.year, None);
    }

    #[test]
    fn parse_anime_without_id_is_skipped() {
        assert!(parse_anime(&json!({ "attributes": {} }), &[], false).is_none());
    }

    #[test]
    fn single_entry_uses_all_included_genres() {
        let mut entry = attack_on_titan();
        entry.as_object_mut().unwrap().remove("relationships");
        let included = genres();

        let single = parse_anime(&entry, included.as_array().unwrap(), true).unwrap();
        assert_eq!(single.genres, vec!["Action", "Comedy", "Drama"]);

        let listed = parse_anime(&entry, included.as_array().unwrap(), false).unwrap();
        assert!(listed.genres.is_empty());
    }

    #[tokio::test]
    async fn search_sends_text_and_year_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/anime")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filter[text]".into(), "Attack on Titan".into()),
                Matcher::UrlEncoded("filter[seasonYear]".into(), "2013".into()),
                Matcher::UrlEncoded("include".into(), "genres".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/vnd.api+json")
            .with_body(json!({ "data": [attack_on_titan()], "included": genres() }).to_string())
            .create_async()
            .await;

        let results = client(&server)
            .search("Attack on Titan", Some(2013))
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].external_id, "7442");
        assert_eq!(results[0].genres, vec!["Action", "Drama"]);
    }

    #[tokio::test]
    async fn search_with_empty_data_returns_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/anime")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let results = client(&server).search("Nothing", None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_without_data_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/anime")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"errors": []}"#)
            .create_async()
            .await;

        let err = client(&server).search("Nothing", None).await.unwrap_err();
        assert!(matches!(err, MetadataError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn find_by_id_fetches_entry_with_genres() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/anime/7442")
            .match_query(Matcher::UrlEncoded("include".into(), "genres".into()))
            .with_status(200)
            .with_body(json!({ "data": attack_on_titan(), "included": genres() }).to_string())
            .create_async()
            .await;

        let rec = client(&server).find_by_id("7442").await.unwrap().unwrap();
        mock.assert_async().await;
        assert_eq!(rec.title.canonical, "Attack on Titan");
        assert_eq!(rec.genres, vec!["Action", "Drama"]);
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/anime/999999")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"errors":[{"title":"Record not found","status":"404"}]}"#)
            .create_async()
            .await;

        assert!(client(&server).find_by_id("999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/anime/1")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = client(&server).find_by_id("1").await.unwrap_err();
        assert!(matches!(err, MetadataError::SourceUnavailable(_)));
    }
}
