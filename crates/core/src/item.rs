//! Query items fed into reports

/// A pre-aggregated count of tasks sharing a row key and an age
///
/// Persistence produces items with raw calendar-day ages; they are converted
/// to working-day ages before being added to a report. The optional detail
/// key feeds the nested rows of a [`FoldableRow`](crate::FoldableRow).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryItem {
    key: String,
    detail_key: Option<String>,
    age_in_days: i32,
    count: u64,
}

impl QueryItem {
    /// Create an item without a detail key
    pub fn new(key: impl Into<String>, age_in_days: i32, count: u64) -> Self {
        Self {
            key: key.into(),
            detail_key: None,
            age_in_days,
            count,
        }
    }

    /// Attach a secondary grouping key
    pub fn with_detail_key(mut self, detail_key: impl Into<String>) -> Self {
        self.detail_key = Some(detail_key.into());
        self
    }

    /// Row key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Secondary grouping key, if any
    pub fn detail_key(&self) -> Option<&str> {
        self.detail_key.as_deref()
    }

    /// Age in days relative to the report's reference date
    pub fn age_in_days(&self) -> i32 {
        self.age_in_days
    }

    /// Number of tasks this item stands for
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Same item with a converted age
    pub(crate) fn with_age(mut self, age_in_days: i32) -> Self {
        self.age_in_days = age_in_days;
        self
    }

    pub(crate) fn set_count(&mut self, count: u64) {
        self.count = count;
    }
}

/// Hook run on every item before it is added to a report
///
/// The returned value replaces the item's count. The age cannot be changed.
pub trait QueryItemPreprocessor {
    fn apply(&self, item: &QueryItem) -> u64;
}

impl<F> QueryItemPreprocessor for F
where
    F: Fn(&QueryItem) -> u64,
{
    fn apply(&self, item: &QueryItem) -> u64 {
        self(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_item_accessors() {
        let item = QueryItem::new("WBI:1", -3, 7).with_detail_key("L1050");
        assert_eq!(item.key(), "WBI:1");
        assert_eq!(item.detail_key(), Some("L1050"));
        assert_eq!(item.age_in_days(), -3);
        assert_eq!(item.count(), 7);
    }

    #[test]
    fn test_with_age_keeps_other_fields() {
        let item = QueryItem::new("key", 4, 2).with_detail_key("sub").with_age(3);
        assert_eq!(item.age_in_days(), 3);
        assert_eq!(item.count(), 2);
        assert_eq!(item.detail_key(), Some("sub"));
    }

    #[test]
    fn test_closure_preprocessor() {
        let double = |item: &QueryItem| item.count() * 2;
        assert_eq!(double.apply(&QueryItem::new("key", 0, 5)), 10);
    }
}
