use serde::{Deserialize, Serialize};

/// A single lookup request from the host.
///
/// `known_id` is an identifier scoped to whichever catalog the request is
/// sent to; identifiers are never shared between catalogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub known_id: Option<String>,
}

impl RawQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            known_id: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_known_id(mut self, id: impl Into<String>) -> Self {
        self.known_id = Some(id.into());
        self
    }

    /// The known identifier, ignoring blank values.
    pub fn known_id(&self) -> Option<&str> {
        self.known_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// The title of a catalog entry plus its alternate forms (romaji, english,
/// japanese, abbreviations).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleVariants {
    pub canonical: String,
    #[serde(default)]
    pub alternates: Vec<String>,
}

impl TitleVariants {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            alternates: Vec::new(),
        }
    }

    /// Add an alternate title. Blank values and exact repeats are skipped.
    pub fn push_alternate(&mut self, title: impl Into<String>) {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() || trimmed == self.canonical {
            return;
        }
        if self.alternates.iter().any(|t| t == trimmed) {
            return;
        }
        self.alternates.push(trimmed.to_string());
    }

    pub fn with_alternates<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for title in titles {
            self.push_alternate(title);
        }
        self
    }

    /// Canonical title first, then alternates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str()).chain(self.alternates.iter().map(String::as_str))
    }
}

impl std::fmt::Display for TitleVariants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// One catalog entry as returned by a source adapter.
///
/// `raw_rating` is kept as the text the catalog returned, on the catalog's
/// own scale. Converting it is the assembler's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub external_id: String,
    pub title: TitleVariants,
    pub overview: String,
    pub raw_rating: Option<String>,
    pub genres: Vec<String>,
    pub image_url: Option<String>,
    pub year: Option<i32>,
}

/// Normalized metadata handed back to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetadata {
    pub external_id: String,
    pub title: String,
    pub overview: String,
    /// Always within `0.0..=10.0`.
    pub community_rating: Option<f64>,
    /// Trimmed, case-insensitively unique, first-seen order.
    pub genres: Vec<String>,
    pub image_url: Option<String>,
    pub year: Option<i32>,
}

/// Image kind offered by a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Primary,
}

impl ImageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote image the host may download for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteImage {
    pub provider: String,
    pub kind: ImageKind,
    pub url: String,
}
