//! Question and quiz selection filters and category metadata

use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, QuestionId};
use crate::value_objects::{CategoryName, Tag};

use super::question::{Difficulty, Question};
use super::quiz::Quiz;

/// Criteria used by question repositories when drawing from the pool.
///
/// An empty filter matches every question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFilter {
    pub category_id: Option<CategoryId>,
    pub difficulty: Option<Difficulty>,
    pub exclude_ids: Vec<QuestionId>,
    pub min_points: Option<u32>,
    pub max_points: Option<u32>,
}

impl QuestionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = QuestionId>) -> Self {
        self.exclude_ids.extend(ids);
        self
    }

    pub fn with_points_between(mut self, min: u32, max: u32) -> Self {
        self.min_points = Some(min);
        self.max_points = Some(max);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, question: &Question) -> bool {
        if let Some(category_id) = self.category_id {
            if question.category_id() != Some(category_id) {
                return false;
            }
        }
        if let Some(difficulty) = self.difficulty {
            if question.difficulty() != Some(difficulty) {
                return false;
            }
        }
        if self.exclude_ids.contains(&question.id()) {
            return false;
        }
        let points = question.points().value();
        if self.min_points.is_some_and(|min| points < min) {
            return false;
        }
        if self.max_points.is_some_and(|max| points > max) {
            return false;
        }
        true
    }
}

/// Criteria for browsing quizzes. A quiz must carry every listed tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizFilter {
    pub category_id: Option<CategoryId>,
    pub tags: Vec<Tag>,
}

impl QuizFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn matches(&self, quiz: &Quiz) -> bool {
        if self.category_id.is_some() && quiz.category_id() != self.category_id {
            return false;
        }
        self.tags.iter().all(|tag| quiz.has_tag(tag))
    }
}

/// A question category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    id: CategoryId,
    name: CategoryName,
}

impl Category {
    pub fn new(name: CategoryName) -> Self {
        Self {
            id: CategoryId::new(),
            name,
        }
    }

    pub fn with_id(mut self, id: CategoryId) -> Self {
        self.id = id;
        self
    }

    #[inline]
    pub fn id(&self) -> CategoryId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &CategoryName {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::question::fixtures::question;

    #[test]
    fn empty_filter_matches_everything() {
        let filter = QuestionFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&question(100)));
    }

    #[test]
    fn category_and_difficulty_must_match() {
        let category = CategoryId::new();
        let q = question(100)
            .with_category(category)
            .with_difficulty(Difficulty::Hard);

        assert!(QuestionFilter::new().with_category(category).matches(&q));
        assert!(!QuestionFilter::new().with_category(CategoryId::new()).matches(&q));
        assert!(!QuestionFilter::new()
            .with_difficulty(Difficulty::Easy)
            .matches(&q));
    }

    #[test]
    fn quiz_filter_needs_every_tag() {
        let go = Tag::new("language:go").unwrap();
        let easy = Tag::new("difficulty:easy").unwrap();
        let quiz = crate::content::quiz::fixtures::quiz(1, 100, 30, 0)
            .with_tags([go.clone()])
            .unwrap();

        assert!(QuizFilter::new().matches(&quiz));
        assert!(QuizFilter::new().with_tag(go.clone()).matches(&quiz));
        assert!(!QuizFilter::new().with_tag(go).with_tag(easy).matches(&quiz));
        assert!(!QuizFilter::new().with_category(CategoryId::new()).matches(&quiz));
    }

    #[test]
    fn excluded_ids_and_point_range() {
        let q = question(300);
        assert!(!QuestionFilter::new().excluding([q.id()]).matches(&q));
        assert!(QuestionFilter::new().with_points_between(100, 300).matches(&q));
        assert!(!QuestionFilter::new().with_points_between(400, 500).matches(&q));
    }
}
