use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrResult {
    pub success: bool,
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_words: u64,
    #[serde(default)]
    pub total_characters: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<PageResult>>,
    #[serde(default)]
    pub full_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub page: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub character_count: u64,
}

impl PageResult {
    /// Counts words and characters the way the backend does: whitespace-split
    /// words and Unicode scalar values.
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            page,
            word_count: text.split_whitespace().count() as u64,
            character_count: text.chars().count() as u64,
            text,
        }
    }
}

impl OcrResult {
    /// Builds a result whose totals are derived from its pages.
    pub fn from_pages(filename: impl Into<String>, pages: Vec<PageResult>) -> Self {
        let full_text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        Self {
            success: true,
            filename: filename.into(),
            total_pages: Some(pages.len() as u32),
            total_words: pages.iter().map(|p| p.word_count).sum(),
            total_characters: pages.iter().map(|p| p.character_count).sum(),
            pages: Some(pages),
            full_text,
        }
    }

    pub fn is_displayable(&self) -> bool {
        self.success
    }

    pub fn page_count(&self) -> u32 {
        self.total_pages.unwrap_or(1)
    }

    /// Whether page counts add up to the totals. Results without pages are
    /// trivially consistent.
    pub fn is_consistent(&self) -> bool {
        match &self.pages {
            Some(pages) => {
                pages.iter().map(|p| p.word_count).sum::<u64>() == self.total_words
                    && pages.iter().map(|p| p.character_count).sum::<u64>()
                        == self.total_characters
            }
            None => true,
        }
    }
}

/// Success body as it arrives on the wire. The image endpoint answers with
/// `text`/`word_count`/`character_count` instead of the aggregate fields.
#[derive(Debug, Deserialize)]
pub(crate) struct WireOcrBody {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default)]
    total_words: Option<u64>,
    #[serde(default)]
    total_characters: Option<u64>,
    #[serde(default)]
    pages: Option<Vec<PageResult>>,
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    word_count: Option<u64>,
    #[serde(default)]
    character_count: Option<u64>,
}

impl WireOcrBody {
    pub(crate) fn into_result(self) -> OcrResult {
        OcrResult {
            success: true,
            filename: self.filename.unwrap_or_default(),
            total_pages: self.total_pages,
            total_words: self.total_words.or(self.word_count).unwrap_or(0),
            total_characters: self.total_characters.or(self.character_count).unwrap_or(0),
            pages: self.pages,
            full_text: self.full_text.or(self.text).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
