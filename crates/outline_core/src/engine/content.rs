//! Item creation and per-item field writes.

use super::{EngineError, EngineResult, OutlineEngine};
use crate::model::content::ItemContent;
use crate::model::item::{Cite, Item, ItemId};
use crate::mutation::property_path::PropertyPath;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static STYLE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("valid style tag regex"));

impl OutlineEngine {
    /// Allocates an id and stores an unplaced item with `content`.
    ///
    /// The item has no parents until it is inserted somewhere.
    pub fn create_item(&mut self, content: ItemContent) -> ItemId {
        let item_id = self.obtain_new_id();
        let item = Item::new(content.item_type(), self.now());
        self.state.items.insert(item_id, Arc::new(item));
        self.state.put_content(item_id, content);
        self.mark(PropertyPath::ItemEntry(item_id));
        self.mark(PropertyPath::Content(item_id));
        item_id
    }

    pub fn content(&self, item_id: ItemId) -> EngineResult<ItemContent> {
        self.item_ref(item_id)?;
        self.state
            .content(item_id)
            .ok_or(EngineError::UnknownItem(item_id))
    }

    /// Replaces the payload. The variant must match the item's type.
    pub fn set_content(&mut self, item_id: ItemId, content: ItemContent) -> EngineResult<()> {
        let expected = self.item_ref(item_id)?.item_type;
        let actual = content.item_type();
        if expected != actual {
            return Err(EngineError::ItemTypeMismatch {
                item_id,
                expected,
                actual,
            });
        }
        self.state.put_content(item_id, content);
        self.mark(PropertyPath::Content(item_id));
        Ok(())
    }

    /// Stamps the item with the clock's current time.
    pub fn update_item_timestamp(&mut self, item_id: ItemId) -> EngineResult<()> {
        let now = self.now();
        self.item_mut(item_id)?.timestamp = now;
        self.mark(PropertyPath::Timestamp(item_id));
        Ok(())
    }

    /// Replaces the style tags. Tags are lowercase slugs; duplicates are dropped.
    pub fn set_style_tags(&mut self, item_id: ItemId, tags: Vec<String>) -> EngineResult<()> {
        self.item_ref(item_id)?;
        let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !STYLE_TAG_RE.is_match(&tag) {
                return Err(EngineError::InvalidStyleTag(tag));
            }
            if !normalized.contains(&tag) {
                normalized.push(tag);
            }
        }
        if self.item_ref(item_id)?.style_tags == normalized {
            return Ok(());
        }
        self.item_mut(item_id)?.style_tags = normalized;
        self.mark(PropertyPath::StyleTags(item_id));
        Ok(())
    }

    /// Adds `tag` if absent, removes it otherwise. Returns whether it is now set.
    pub fn toggle_style_tag(&mut self, item_id: ItemId, tag: &str) -> EngineResult<bool> {
        if !STYLE_TAG_RE.is_match(tag) {
            return Err(EngineError::InvalidStyleTag(tag.to_string()));
        }
        let item = self.item_mut(item_id)?;
        let now_set = match item.style_tags.iter().position(|existing| existing == tag) {
            Some(index) => {
                item.style_tags.remove(index);
                false
            }
            None => {
                item.style_tags.push(tag.to_string());
                true
            }
        };
        self.mark(PropertyPath::StyleTags(item_id));
        Ok(now_set)
    }

    pub fn set_cite(&mut self, item_id: ItemId, cite: Option<Cite>) -> EngineResult<()> {
        if self.item_ref(item_id)?.cite == cite {
            return Ok(());
        }
        self.item_mut(item_id)?.cite = cite;
        self.mark(PropertyPath::Cite(item_id));
        Ok(())
    }

    /// Single-line label of the item's payload.
    pub fn plain_text(&self, item_id: ItemId) -> EngineResult<String> {
        Ok(self.content(item_id)?.plain_text())
    }
}
