//! Data repository collaborator.

use crate::error::ReportsResult;
use crate::query::{Filters, Sort};
use crate::reportable::Reportable;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Source of entities for an export.
///
/// Implementations interpret [`Filters`] and [`Sort`]. The export layer
/// only forwards them.
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// Returns every entity in natural order.
    async fn find_all(&self) -> ReportsResult<Vec<T>>;

    /// Returns the entities matching `filters`, ordered by `sort`.
    ///
    /// Either argument may be absent.
    async fn find_all_matching(
        &self,
        filters: Option<&Filters>,
        sort: Option<&Sort>,
    ) -> ReportsResult<Vec<T>>;
}

/// A [`Repository`] holding its entities in memory.
///
/// Filters and sort are evaluated through [`Reportable::field_values`]. Sort
/// keys are computed once per entity.
///
/// # Example
///
/// ```
/// use folio_core::{Filter, Filters, InMemoryRepository, Reportable, Repository};
/// use serde::Serialize;
///
/// #[derive(Clone, Serialize)]
/// struct City { name: &'static str }
/// impl Reportable for City {}
///
/// # tokio_test::block_on(async {
/// let repo = InMemoryRepository::new(vec![City { name: "Cluj" }, City { name: "Iasi" }]);
/// let filters = Filters::new().with(Filter::equals("name", "Iasi"));
/// let found = repo.find_all_matching(Some(&filters), None).await.unwrap();
/// assert_eq!(found.len(), 1);
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    items: RwLock<Vec<T>>,
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> InMemoryRepository<T> {
    /// Creates a repository holding `items`.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Appends an entity.
    pub fn insert(&self, item: T) {
        self.items.write().push(item);
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl<T> Repository<T> for InMemoryRepository<T>
where
    T: Reportable + Clone + 'static,
{
    async fn find_all(&self) -> ReportsResult<Vec<T>> {
        Ok(self.items.read().clone())
    }

    async fn find_all_matching(
        &self,
        filters: Option<&Filters>,
        sort: Option<&Sort>,
    ) -> ReportsResult<Vec<T>> {
        let mut found: Vec<T> = self
            .items
            .read()
            .iter()
            .filter(|item| filters.map_or(true, |f| f.matches(*item)))
            .cloned()
            .collect();

        if let Some(sort) = sort.filter(|s| !s.is_empty()) {
            let mut keyed: Vec<_> = found
                .into_iter()
                .map(|item| (sort.keys(&item), item))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| sort.compare_keys(a, b));
            found = keyed.into_iter().map(|(_, item)| item).collect();
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Filter, FilterOperator, Order};
    use serde::Serialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Employee {
        first_name: &'static str,
        last_name: &'static str,
    }

    impl Reportable for Employee {}

    #[derive(Clone)]
    struct Ranked {
        rank: u32,
        serializations: Arc<AtomicUsize>,
    }

    impl Serialize for Ranked {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            use serde::ser::SerializeMap;

            self.serializations.fetch_add(1, Ordering::SeqCst);
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry("rank", &self.rank)?;
            map.end()
        }
    }

    impl Reportable for Ranked {}

    fn repo() -> InMemoryRepository<Employee> {
        InMemoryRepository::new(vec![
            Employee {
                first_name: "Sad",
                last_name: "Panda",
            },
            Employee {
                first_name: "Gigi",
                last_name: "Petrescu",
            },
        ])
    }

    #[tokio::test]
    async fn test_find_all_returns_natural_order() {
        let all = repo().find_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|e| e.first_name).collect();
        assert_eq!(names, vec!["Sad", "Gigi"]);
    }

    #[tokio::test]
    async fn test_find_all_matching_filters_and_sorts() {
        let repo = repo();
        repo.insert(Employee {
            first_name: "Ana",
            last_name: "Pop",
        });
        assert_eq!(repo.len(), 3);

        let filters = Filters::new().with(Filter::new("lastName", FilterOperator::StartsWith, "P"));
        let sort = Sort::by(Order::asc("firstName"));
        let found = repo.find_all_matching(Some(&filters), Some(&sort)).await.unwrap();

        let names: Vec<_> = found.iter().map(|e| e.first_name).collect();
        assert_eq!(names, vec!["Ana", "Gigi", "Sad"]);
    }

    #[tokio::test]
    async fn test_find_all_matching_without_criteria_returns_everything() {
        let found = repo().find_all_matching(None, None).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_no_match_yields_empty() {
        let filters = Filters::new().with(Filter::equals("lastName", "Nobody"));
        let found = repo().find_all_matching(Some(&filters), None).await.unwrap();
        assert!(found.is_empty());
        assert!(InMemoryRepository::<Employee>::default().is_empty());
    }

    #[tokio::test]
    async fn test_sort_serializes_each_entity_once() {
        let serializations = Arc::new(AtomicUsize::new(0));
        let repo = InMemoryRepository::new(
            [5, 3, 9, 1, 7, 2, 8, 4, 6, 0]
                .into_iter()
                .map(|rank| Ranked {
                    rank,
                    serializations: Arc::clone(&serializations),
                })
                .collect(),
        );

        let sort = Sort::by(Order::desc("rank"));
        let found = repo.find_all_matching(None, Some(&sort)).await.unwrap();

        let ranks: Vec<_> = found.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(serializations.load(Ordering::SeqCst), 10);

        serializations.store(0, Ordering::SeqCst);
        let filters = Filters::new()
            .with(Filter::new("rank", FilterOperator::Gt, 2))
            .with(Filter::new("rank", FilterOperator::Lt, 8));
        let found = repo.find_all_matching(Some(&filters), None).await.unwrap();

        assert_eq!(found.len(), 5);
        assert_eq!(serializations.load(Ordering::SeqCst), 10);
    }
}
