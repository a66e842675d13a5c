//! Type-specific item payloads.
//!
//! # Responsibility
//! - Define one payload record per `ItemType`, each stored in its own side table.
//! - Derive a single-line plain-text label for any payload.
//!
//! # Invariants
//! - `ItemContent::item_type()` always matches the side table the payload lives in.

use crate::model::item::ItemType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MARKUP_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Rich text item. `content` is inline markup (`<b>`, `<i>`, `<u>`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    pub content: String,
}

/// Item bound to a browser tab or bookmarked URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebPageItem {
    pub url: String,
    pub favicon_url: String,
    /// Last title reported by the tab; kept after the tab closes.
    pub tab_title: String,
    /// User-set title overriding `tab_title`.
    pub title: Option<String>,
    pub is_unread: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    pub url: String,
    pub caption: String,
    pub height_px: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockItem {
    pub code: String,
    pub language: String,
}

/// Formula item holding TeX source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexItem {
    pub code: String,
}

/// Payload for exactly one item variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemContent {
    Text(TextItem),
    WebPage(WebPageItem),
    Image(ImageItem),
    CodeBlock(CodeBlockItem),
    Tex(TexItem),
}

impl ItemContent {
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Text(_) => ItemType::Text,
            Self::WebPage(_) => ItemType::WebPage,
            Self::Image(_) => ItemType::Image,
            Self::CodeBlock(_) => ItemType::CodeBlock,
            Self::Tex(_) => ItemType::Tex,
        }
    }

    /// Empty payload for a variant.
    pub fn empty(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Text => Self::Text(TextItem::default()),
            ItemType::WebPage => Self::WebPage(WebPageItem::default()),
            ItemType::Image => Self::Image(ImageItem::default()),
            ItemType::CodeBlock => Self::CodeBlock(CodeBlockItem::default()),
            ItemType::Tex => Self::Tex(TexItem::default()),
        }
    }

    /// Single-line label used for page titles and breadcrumbs.
    ///
    /// Web pages prefer the user title, then the tab title, then the URL.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(text) => strip_markup(&text.content),
            Self::WebPage(page) => {
                let title = page.title.as_deref().unwrap_or(page.tab_title.as_str());
                if title.is_empty() {
                    page.url.clone()
                } else {
                    collapse_whitespace(title)
                }
            }
            Self::Image(image) => collapse_whitespace(&image.caption),
            Self::CodeBlock(block) => collapse_whitespace(&block.code),
            Self::Tex(tex) => collapse_whitespace(&tex.code),
        }
    }
}

fn strip_markup(value: &str) -> String {
    let without_tags = MARKUP_TAG_RE.replace_all(value, " ");
    let unescaped = without_tags
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    collapse_whitespace(&unescaped)
}

fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value, " ").trim().to_string()
}
