//! Story library: the record store and the search index kept side by side

use crate::error::{AppError, Result};
use crate::models::Story;
use crate::search::{IndexService, IndexStats, SearchConfig, SearchRequest, SearchResponse};
use crate::state::InMemoryStore;
use std::sync::Arc;
use uuid::Uuid;

/// Result of a write addressed to an existing story
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    NotFound,
}

/// Keeps the authoritative record store and the index consistent.
///
/// The index is written first, so a failed index write leaves the record
/// store untouched.
#[derive(Clone)]
pub struct StoryLibrary {
    index: Arc<IndexService<Story>>,
    records: InMemoryStore<Story>,
}

impl StoryLibrary {
    pub fn open(config: SearchConfig) -> Result<Self> {
        let index = IndexService::open(config)?;
        Ok(Self::new(Arc::new(index), InMemoryStore::new()))
    }

    pub fn new(index: Arc<IndexService<Story>>, records: InMemoryStore<Story>) -> Self {
        Self { index, records }
    }

    pub fn index(&self) -> &IndexService<Story> {
        &self.index
    }

    pub fn records(&self) -> &InMemoryStore<Story> {
        &self.records
    }

    /// Load the sample stories into both stores
    pub fn seed(&self) -> Result<usize> {
        let samples = Story::samples();
        let indexed = self.index.add_or_replace_all(&samples)?;
        for story in samples {
            self.records.put(story.id.clone(), story);
        }
        tracing::info!(indexed, "Sample stories loaded");
        Ok(indexed)
    }

    /// Add or replace a story, assigning an identifier if it has none
    pub fn save(&self, mut story: Story) -> Result<Story> {
        if story.id.trim().is_empty() {
            story.id = Uuid::new_v4().simple().to_string();
        }
        self.index.add_or_replace(&story)?;
        self.records.put(story.id.clone(), story.clone());
        Ok(story)
    }

    /// Replace an existing story.
    ///
    /// The record's entry is held across the index write, so a concurrent
    /// delete cannot leave the two stores disagreeing.
    pub fn update(&self, story: Story) -> Result<WriteOutcome> {
        let id = story.id.clone();
        let updated = self.records.update_with(&id, |slot| -> Result<()> {
            self.index.add_or_replace(&story)?;
            *slot = story;
            Ok(())
        });

        match updated {
            Some(result) => result.map(|()| WriteOutcome::Applied),
            None => Ok(WriteOutcome::NotFound),
        }
    }

    /// Delete a story from both stores
    pub fn delete(&self, id: &str) -> Result<WriteOutcome> {
        let removed = self.records.remove_with(id, |_| -> Result<()> {
            if !self.index.remove(id)? {
                tracing::warn!(id, "Story was not in the index");
            }
            Ok(())
        });

        match removed {
            Some(result) => result.map(|_| WriteOutcome::Applied),
            None => Ok(WriteOutcome::NotFound),
        }
    }

    /// Delete every story
    pub fn delete_all(&self) -> Result<()> {
        self.index.remove_all()?;
        self.records.clear();
        Ok(())
    }

    /// Search, then fill in index-only fields from the record store
    pub fn query(&self, request: &SearchRequest) -> Result<SearchResponse<Story>> {
        let mut response = self.index.search(request)?;
        for hit in &mut response.hits {
            match self.records.get(&hit.record.id) {
                Some(full) => hit.record.content = full.content,
                None => tracing::warn!(id = %hit.record.id, "Indexed story missing from record store"),
            }
        }
        Ok(response)
    }

    pub fn get(&self, id: &str) -> Result<Story> {
        self.records
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Story {} not found", id)))
    }

    pub fn stats(&self) -> Result<IndexStats> {
        Ok(self.index.stats()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn library(dir: &TempDir) -> StoryLibrary {
        let config = SearchConfig {
            index_path: dir.path().to_path_buf(),
            ..Default::default()
        };
        StoryLibrary::open(config).unwrap()
    }

    #[test]
    fn test_query_rejoins_content() {
        let temp_dir = TempDir::new().unwrap();
        let library = library(&temp_dir);
        library.seed().unwrap();

        let response = library
            .query(&SearchRequest::new("content", "魔鬼"))
            .unwrap();

        assert_eq!(response.hits.len(), 1);
        let story = &response.hits[0].record;
        assert_eq!(story.id, "00002");
        assert_eq!(story.author, "吴承恩");
        assert!(story.content.contains("妖魔鬼怪"));
    }

    #[test]
    fn test_save_assigns_identifier() {
        let temp_dir = TempDir::new().unwrap();
        let library = library(&temp_dir);

        let saved = library
            .save(Story::new("", "红楼梦", "大观园", "曹雪芹", 40))
            .unwrap();

        assert_eq!(saved.id.len(), 32);
        assert!(library.index().contains(&saved.id).unwrap());
        assert_eq!(library.get(&saved.id).unwrap().title, "红楼梦");
    }

    #[test]
    fn test_update_and_delete_unknown_story() {
        let temp_dir = TempDir::new().unwrap();
        let library = library(&temp_dir);

        let outcome = library.update(Story::new("nope", "t", "c", "a", 1)).unwrap();
        assert_eq!(outcome, WriteOutcome::NotFound);
        assert!(!library.index().contains("nope").unwrap());

        assert_eq!(library.delete("nope").unwrap(), WriteOutcome::NotFound);
    }

    #[test]
    fn test_concurrent_update_and_delete_keep_stores_aligned() {
        let temp_dir = TempDir::new().unwrap();
        let library = library(&temp_dir);
        library.seed().unwrap();

        let updater = {
            let library = library.clone();
            std::thread::spawn(move || {
                for price in 0..20 {
                    let _ = library
                        .update(Story::new("00001", "聊斋志异", "鬼故事", "蒲松龄", price))
                        .unwrap();
                }
            })
        };
        let deleter = {
            let library = library.clone();
            std::thread::spawn(move || {
                for _ in 0..10 {
                    let _ = library.delete("00001").unwrap();
                    library
                        .save(Story::new("00001", "聊斋志异", "鬼故事", "蒲松龄", 1))
                        .unwrap();
                }
                let _ = library.delete("00001").unwrap();
            })
        };
        updater.join().unwrap();
        deleter.join().unwrap();

        assert!(!library.records().contains("00001"));
        assert!(!library.index().contains("00001").unwrap());
    }

    #[test]
    fn test_delete_all_empties_both_stores() {
        let temp_dir = TempDir::new().unwrap();
        let library = library(&temp_dir);
        library.seed().unwrap();

        library.delete_all().unwrap();

        assert!(library.records().is_empty());
        assert_eq!(library.stats().unwrap().total_documents, 0);
    }
}
