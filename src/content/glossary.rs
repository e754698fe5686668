use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::content::{ContentStore, GlossaryEntry};
use crate::store::repository::Repository;
use crate::store::schema::CustomTerm;

#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("a term is required")]
    EmptyTerm,
    #[error("a definition is required")]
    EmptyDefinition,
    #[error(transparent)]
    Persist(#[from] anyhow::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlossaryFilter {
    All,
    Lecture(u32),
    Custom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermSource {
    Custom,
    Lecture(u32),
}

/// One row of the merged glossary.
#[derive(Clone, Copy, Debug)]
pub struct GlossaryItem<'a> {
    pub id: &'a str,
    pub term: &'a str,
    pub term_en: Option<&'a str>,
    pub definition: &'a str,
    pub source: TermSource,
}

impl GlossaryItem<'_> {
    pub fn is_custom(&self) -> bool {
        self.source == TermSource::Custom
    }

    /// Case-sensitive on the term, case-insensitive on the English gloss.
    pub fn matches(&self, query: &str) -> bool {
        if self.term.contains(query) {
            return true;
        }
        let query = query.to_lowercase();
        self.term_en
            .is_some_and(|en| en.to_lowercase().contains(&query))
    }

    fn passes(&self, filter: GlossaryFilter) -> bool {
        match filter {
            GlossaryFilter::All => true,
            GlossaryFilter::Custom => self.is_custom(),
            GlossaryFilter::Lecture(id) => self.source == TermSource::Lecture(id),
        }
    }
}

struct CatalogTerm {
    id: String,
    lecture_id: u32,
    entry: GlossaryEntry,
}

/// Built-in lecture terms merged with user-authored ones.
pub struct GlossaryManager {
    catalog: Vec<CatalogTerm>,
    custom: Vec<CustomTerm>,
    repo: Box<dyn Repository<Vec<CustomTerm>>>,
}

impl GlossaryManager {
    pub fn new(content: &ContentStore, repo: Box<dyn Repository<Vec<CustomTerm>>>) -> Self {
        let catalog = content
            .all_terms()
            .map(|(lecture_id, entry)| CatalogTerm {
                id: format!("lecture-{lecture_id}-{}", entry.term),
                lecture_id,
                entry: entry.clone(),
            })
            .collect();
        let custom = repo.load();
        Self {
            catalog,
            custom,
            repo,
        }
    }

    pub fn custom_terms(&self) -> &[CustomTerm] {
        &self.custom
    }

    /// Custom entries first (newest first), then catalog entries in lecture order.
    pub fn items(&self) -> impl Iterator<Item = GlossaryItem<'_>> {
        let custom = self.custom.iter().map(|t| GlossaryItem {
            id: &t.id,
            term: &t.term,
            term_en: t.term_en.as_deref(),
            definition: &t.definition,
            source: TermSource::Custom,
        });
        let catalog = self.catalog.iter().map(|t| GlossaryItem {
            id: &t.id,
            term: &t.entry.term,
            term_en: t.entry.term_en.as_deref(),
            definition: &t.entry.definition,
            source: TermSource::Lecture(t.lecture_id),
        });
        custom.chain(catalog)
    }

    pub fn search(&self, query: &str, filter: GlossaryFilter) -> Vec<GlossaryItem<'_>> {
        self.items()
            .filter(|item| item.passes(filter) && item.matches(query))
            .collect()
    }

    /// Validate and prepend a user term, then persist the full custom list.
    /// A failed save drops the new term again.
    pub fn add(
        &mut self,
        term: &str,
        term_en: &str,
        definition: &str,
    ) -> Result<&CustomTerm, GlossaryError> {
        let term = term.trim();
        let definition = definition.trim();
        if term.is_empty() {
            return Err(GlossaryError::EmptyTerm);
        }
        if definition.is_empty() {
            return Err(GlossaryError::EmptyDefinition);
        }
        let term_en = Some(term_en.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        self.custom.insert(
            0,
            CustomTerm {
                id: Uuid::new_v4().to_string(),
                term: term.to_string(),
                term_en,
                definition: definition.to_string(),
                created_at: Utc::now(),
            },
        );
        if let Err(e) = self.repo.save(&self.custom) {
            self.custom.remove(0);
            return Err(e.into());
        }
        tracing::info!(term, "custom term added");
        Ok(&self.custom[0])
    }

    /// Remove a custom term. Returns whether anything was removed.
    /// The term stays in the list when the save fails.
    pub fn delete(&mut self, id: &str) -> Result<bool, GlossaryError> {
        let Some(pos) = self.custom.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let removed = self.custom.remove(pos);
        if let Err(e) = self.repo.save(&self.custom) {
            self.custom.insert(pos, removed);
            return Err(e.into());
        }
        tracing::info!(id, "custom term deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use anyhow::anyhow;

    use super::*;
    use crate::content::fixtures::{entry, lecture};
    use crate::store::json_store::{KeyValueStore, MemoryStore};
    use crate::store::repository::JsonRepository;
    use crate::store::schema::CUSTOM_TERMS_KEY;

    fn content() -> ContentStore {
        ContentStore::from_parts(
            vec![
                lecture(
                    1,
                    vec![
                        entry("الهو", Some("Id"), "instinct reservoir"),
                        entry("الأنا", Some("Ego"), "reality principle"),
                    ],
                ),
                lecture(
                    2,
                    vec![
                        entry("التثبيت", Some("Fixation"), "arrested development"),
                        entry("الأنا", Some("Ego"), "duplicate across lectures"),
                    ],
                ),
            ],
            Vec::new(),
        )
    }

    /// Accepts reads, rejects every write after the first `allowed` ones.
    struct FlakyRepository {
        inner: JsonRepository<MemoryStore, Vec<CustomTerm>>,
        allowed: Cell<usize>,
    }

    impl Repository<Vec<CustomTerm>> for FlakyRepository {
        fn load(&self) -> Vec<CustomTerm> {
            self.inner.load()
        }

        fn save(&self, value: &Vec<CustomTerm>) -> anyhow::Result<()> {
            match self.allowed.get() {
                0 => Err(anyhow!("disk full")),
                n => {
                    self.allowed.set(n - 1);
                    self.inner.save(value)
                }
            }
        }
    }

    fn flaky_manager(store: &MemoryStore, allowed: usize) -> GlossaryManager {
        GlossaryManager::new(
            &content(),
            Box::new(FlakyRepository {
                inner: JsonRepository::new(store.clone(), CUSTOM_TERMS_KEY),
                allowed: Cell::new(allowed),
            }),
        )
    }

    fn manager(store: &MemoryStore) -> GlossaryManager {
        GlossaryManager::new(
            &content(),
            Box::new(JsonRepository::new(store.clone(), CUSTOM_TERMS_KEY)),
        )
    }

    #[test]
    fn empty_query_with_custom_filter_returns_custom_list() {
        let store = MemoryStore::new();
        let mut glossary = manager(&store);
        glossary.add("الطرح", "", "first").unwrap();
        glossary.add("المقاومة", "Resistance", "second").unwrap();

        let found: Vec<&str> = glossary
            .search("", GlossaryFilter::Custom)
            .iter()
            .map(|i| i.id)
            .collect();
        let expected: Vec<&str> = glossary.custom_terms().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn search_is_case_sensitive_on_term_and_insensitive_on_gloss() {
        let store = MemoryStore::new();
        let mut glossary = manager(&store);
        glossary.add("Latin", "", "a custom latin-script term").unwrap();

        assert_eq!(glossary.search("eGo", GlossaryFilter::All).len(), 2);
        assert_eq!(glossary.search("Latin", GlossaryFilter::All).len(), 1);
        assert!(glossary.search("latin", GlossaryFilter::All).is_empty());
    }

    #[test]
    fn duplicates_across_lectures_both_appear() {
        let store = MemoryStore::new();
        let glossary = manager(&store);
        let hits = glossary.search("الأنا", GlossaryFilter::All);
        assert_eq!(hits.len(), 2);
        assert_eq!(glossary.search("الأنا", GlossaryFilter::Lecture(2)).len(), 1);
    }

    #[test]
    fn add_requires_term_and_definition() {
        let store = MemoryStore::new();
        let mut glossary = manager(&store);
        assert!(matches!(
            glossary.add("  ", "x", "def"),
            Err(GlossaryError::EmptyTerm)
        ));
        assert!(matches!(
            glossary.add("term", "x", ""),
            Err(GlossaryError::EmptyDefinition)
        ));
        assert!(glossary.custom_terms().is_empty());
        assert_eq!(store.get(CUSTOM_TERMS_KEY).unwrap(), None);
    }

    #[test]
    fn add_prepends_with_unique_ids_and_persists() {
        let store = MemoryStore::new();
        let mut glossary = manager(&store);
        let first = glossary.add("أ", "", "one").unwrap().id.clone();
        let second = glossary.add("ب", "", "two").unwrap().id.clone();
        assert_ne!(first, second);
        assert_eq!(glossary.custom_terms()[0].id, second);

        let reloaded = manager(&store);
        assert_eq!(reloaded.custom_terms().len(), 2);
        assert_eq!(reloaded.custom_terms()[0].term, "ب");
    }

    #[test]
    fn delete_removes_by_id_and_persists() {
        let store = MemoryStore::new();
        let mut glossary = manager(&store);
        let id = glossary.add("أ", "", "one").unwrap().id.clone();
        assert!(!glossary.delete("missing").unwrap());
        assert!(glossary.delete(&id).unwrap());
        assert!(manager(&store).custom_terms().is_empty());
    }

    #[test]
    fn custom_items_come_before_catalog() {
        let store = MemoryStore::new();
        let mut glossary = manager(&store);
        glossary.add("جديد", "", "new").unwrap();
        let first = glossary.items().next().unwrap();
        assert!(first.is_custom());
        assert_eq!(glossary.items().count(), 5);
    }

    #[test]
    fn failed_save_keeps_memory_in_step_with_storage() {
        let store = MemoryStore::new();
        let mut glossary = flaky_manager(&store, 1);
        let id = glossary.add("أ", "", "one").unwrap().id.clone();

        assert!(matches!(
            glossary.add("ب", "", "two"),
            Err(GlossaryError::Persist(_))
        ));
        assert_eq!(glossary.custom_terms().len(), 1);
        assert_eq!(glossary.custom_terms()[0].id, id);

        assert!(matches!(glossary.delete(&id), Err(GlossaryError::Persist(_))));
        assert_eq!(glossary.custom_terms().len(), 1);
        assert_eq!(glossary.search("أ", GlossaryFilter::Custom).len(), 1);

        let stored = manager(&store);
        assert_eq!(stored.custom_terms().len(), 1);
        assert_eq!(stored.custom_terms()[0].id, id);
    }
}
