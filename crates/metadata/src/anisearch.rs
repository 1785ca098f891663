//! AniSearch provider client.
//!
//! AniSearch has no public API; entries are scraped from the HTML detail
//! and search pages. DOM handling stays in synchronous helpers so no parsed
//! document is held across an await.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::fetch::{HttpFetcher, endpoint};
use crate::source::CatalogSource;
use crate::{CandidateRecord, MetadataConfig, MetadataError, TitleVariants};

pub const BASE_URL: &str = "https://www.anisearch.com";
pub const NAME: &str = "anisearch";
pub const ORDER: i32 = -3;
/// AniSearch rates out of 5.
pub const RATING_SCALE: f64 = 2.0;

const MAX_SEARCH_RESULTS: usize = 10;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static SEL_TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        selector(r#"h1#htitle [itemprop="name"]"#),
        selector("h1#htitle"),
    ]
});
static SEL_OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static SEL_ALT_TITLES: LazyLock<Selector> = LazyLock::new(|| selector("div.title strong"));
static SEL_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[itemprop="description"]"#));
static SEL_META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"]"#));
static SEL_RATING: LazyLock<Selector> = LazyLock::new(|| selector(r#"[itemprop="ratingValue"]"#));
static SEL_GENRES: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a.gg, a[href*="genre/"]"#));
static SEL_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(r#"img[itemprop="image"]"#));
static SEL_OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:image"]"#));
static SEL_START_DATE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[itemprop="startDate"], [itemprop="dateCreated"]"#));
static SEL_CANONICAL: LazyLock<Selector> = LazyLock::new(|| selector(r#"link[rel="canonical"]"#));
static SEL_RESULT_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector("table.responsive-table a[href], ul.covers a[href]"));

// anime/8197,shingeki-no-kyojin
static RE_ANIME_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|/)anime/(\d+),").unwrap());

static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

pub struct AniSearchClient {
    base_url: String,
    http: HttpFetcher,
}

impl AniSearchClient {
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        Ok(Self {
            base_url: config.anisearch_url.trim_end_matches('/').to_string(),
            http: HttpFetcher::new(NAME, config)?,
        })
    }
}

#[async_trait::async_trait]
impl CatalogSource for AniSearchClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<CandidateRecord>, MetadataError> {
        let fetched = match endpoint(&self.base_url, &["anime", id]) {
            Ok(url) => self.http.fetch_text(&url, &[]).await,
            Err(e) => Err(e),
        };
        match fetched {
            Ok(body) => parse_detail_page(id, &body).map(Some),
            Err(MetadataError::NotFound) => {
                debug!(id, "anisearch entry not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// AniSearch search has no year filter; `year` is ignored.
    async fn search(
        &self,
        title: &str,
        _year: Option<i32>,
    ) -> Result<Vec<CandidateRecord>, MetadataError> {
        let url = endpoint(&self.base_url, &["anime", "index"])?;
        let body = self
            .http
            .fetch_text(&url, &[("text", title), ("smode", "1")])
            .await?;

        let ids = match parse_search_page(&body)? {
            SearchPage::Detail(record) => return Ok(vec![record]),
            SearchPage::Results(ids) => ids,
        };
        debug!(title, hits = ids.len(), "anisearch search page parsed");

        let records =
            futures::future::try_join_all(ids.iter().map(|id| self.find_by_id(id))).await?;
        Ok(records.into_iter().flatten().collect())
    }
}

enum SearchPage {
    /// A single hit redirects straight to the entry page.
    Detail(CandidateRecord),
    Results(Vec<String>),
}

fn parse_search_page(html: &str) -> Result<SearchPage, MetadataError> {
    let doc = Html::parse_document(html);

    let canonical_id = doc
        .select(&SEL_CANONICAL)
        .next()
        .and_then(|l| l.value().attr("href"))
        .and_then(anime_id_from_link);
    if let Some(id) = canonical_id {
        if find_title(&doc).is_some() {
            return parse_detail(&id, &doc).map(SearchPage::Detail);
        }
    }

    let mut ids: Vec<String> = Vec::new();
    for link in doc.select(&SEL_RESULT_LINKS) {
        if let Some(id) = link.value().attr("href").and_then(anime_id_from_link) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.len() == MAX_SEARCH_RESULTS {
            break;
        }
    }
    Ok(SearchPage::Results(ids))
}

fn anime_id_from_link(href: &str) -> Option<String> {
    RE_ANIME_LINK.captures(href).map(|c| c[1].to_string())
}

fn parse_detail_page(id: &str, html: &str) -> Result<CandidateRecord, MetadataError> {
    parse_detail(id, &Html::parse_document(html))
}

fn parse_detail(id: &str, doc: &Html) -> Result<CandidateRecord, MetadataError> {
    let canonical = find_title(doc).ok_or_else(|| {
        MetadataError::MalformedResponse(format!("anisearch: no title on page for {id}"))
    })?;

    let mut title = TitleVariants::new(canonical);
    for alt in doc.select(&SEL_ALT_TITLES) {
        title.push_alternate(element_text(alt));
    }

    let overview = doc
        .select(&SEL_DESCRIPTION)
        .map(element_text)
        .find(|t| !t.is_empty())
        .or_else(|| meta_content(doc, &SEL_META_DESCRIPTION))
        .unwrap_or_default();

    let raw_rating = doc.select(&SEL_RATING).next().and_then(|el| {
        el.value()
            .attr("content")
            .map(str::to_string)
            .or_else(|| Some(element_text(el)))
            .filter(|r| !r.is_empty())
    });

    let genres = doc
        .select(&SEL_GENRES)
        .map(element_text)
        .filter(|g| !g.is_empty())
        .collect();

    let image_url = doc
        .select(&SEL_IMAGE)
        .next()
        .and_then(|img| {
            img.value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
                .map(str::to_string)
        })
        .or_else(|| meta_content(doc, &SEL_OG_IMAGE));

    let year = doc.select(&SEL_START_DATE).find_map(|el| {
        let text = el
            .value()
            .attr("content")
            .map(str::to_string)
            .unwrap_or_else(|| element_text(el));
        RE_YEAR.captures(&text).and_then(|c| c[1].parse().ok())
    });

    Ok(CandidateRecord {
        external_id: id.trim().to_string(),
        title,
        overview,
        raw_rating,
        genres,
        image_url,
        year,
    })
}

fn find_title(doc: &Html) -> Option<String> {
    SEL_TITLE
        .iter()
        .find_map(|sel| {
            doc.select(sel)
                .map(element_text)
                .find(|t| !t.is_empty())
        })
        .or_else(|| meta_content(doc, &SEL_OG_TITLE))
}

fn meta_content(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
