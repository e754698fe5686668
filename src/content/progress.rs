use std::collections::HashSet;

use anyhow::Result;

use crate::store::repository::Repository;
use crate::store::schema::CompletedLectures;

/// Which lectures the user has marked as studied.
pub struct ProgressTracker {
    repo: Box<dyn Repository<CompletedLectures>>,
    completed: CompletedLectures,
}

impl ProgressTracker {
    pub fn new(repo: Box<dyn Repository<CompletedLectures>>) -> Self {
        let mut completed = repo.load();
        // Older files may carry duplicates; keep first occurrence.
        let mut seen = HashSet::new();
        completed.retain(|id| seen.insert(*id));
        Self { repo, completed }
    }

    pub fn is_completed(&self, lecture_id: u32) -> bool {
        self.completed.contains(&lecture_id)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Flip the completion mark and persist the full set. Returns the new mark.
    /// A failed save leaves the mark as it was.
    pub fn toggle(&mut self, lecture_id: u32) -> Result<bool> {
        let previous = self.completed.clone();
        let now_completed = if let Some(pos) = self.completed.iter().position(|&id| id == lecture_id) {
            self.completed.remove(pos);
            false
        } else {
            self.completed.push(lecture_id);
            true
        };
        if let Err(e) = self.repo.save(&self.completed) {
            self.completed = previous;
            return Err(e);
        }
        Ok(now_completed)
    }

    /// Fraction of the given lectures that are marked completed.
    pub fn ratio(&self, lecture_ids: &[u32]) -> f64 {
        if lecture_ids.is_empty() {
            return 0.0;
        }
        let done = lecture_ids.iter().filter(|id| self.is_completed(**id)).count();
        done as f64 / lecture_ids.len() as f64
    }
}
