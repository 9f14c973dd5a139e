use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// The committed, session-wide filter for posts/events queries.
///
/// Categories and tags are deduplicated display strings; uniqueness is by
/// string equality, not by id. `max_budget == 0` means free events only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub selected_date: NaiveDate,
    pub selected_time: NaiveTime,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub max_budget: u32,
    pub include_further_events: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        let now = Local::now();
        Self {
            selected_date: now.date_naive(),
            selected_time: now.time(),
            categories: Vec::new(),
            tags: Vec::new(),
            max_budget: 0,
            include_further_events: true,
        }
    }
}

impl FilterSettings {
    #[must_use]
    pub fn formatted_date(&self) -> String {
        self.selected_date.format("%Y-%m-%d").to_string()
    }

    #[must_use]
    pub fn formatted_time(&self) -> String {
        self.selected_time.format("%H:%M").to_string()
    }

    /// The shared query-string tail of both filtered endpoints.
    ///
    /// Parameter names, including the misspelled `maxBuget` and
    /// `inlcudeFurtherEvents`, are what the backend matches on.
    #[must_use]
    pub fn query_fragment(&self) -> String {
        format!(
            "selectedData={}&selectedTime={}&categories={}&tags={}&maxBuget={}&inlcudeFurtherEvents={}",
            self.formatted_date(),
            self.formatted_time(),
            self.categories.join(","),
            self.tags.join(","),
            self.max_budget,
            self.include_further_events,
        )
    }
}

/// Working state of the filter-settings sheet.
///
/// Opens with fresh defaults every time; nothing leaks into
/// [`FilterSettings`] until [`FilterDraft::commit`]. The free-only switch
/// masks the numeric budget until commit collapses them to one value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterDraft {
    pub selected_date: NaiveDate,
    pub selected_time: NaiveTime,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub max_budget: u32,
    pub free_only: bool,
    pub include_further_events: bool,

    pub entered_tag: String,
    pub entered_category: String,
    pub category_suggestions: Vec<String>,
}

impl Default for FilterDraft {
    fn default() -> Self {
        let now = Local::now();
        Self {
            selected_date: now.date_naive(),
            selected_time: now.time(),
            categories: Vec::new(),
            tags: Vec::new(),
            max_budget: 0,
            free_only: false,
            include_further_events: false,
            entered_tag: String::new(),
            entered_category: String::new(),
            category_suggestions: Vec::new(),
        }
    }
}

impl FilterDraft {
    /// Adds the pending tag entry. Duplicates and blanks are dropped.
    pub fn add_entered_tag(&mut self) {
        let tag = std::mem::take(&mut self.entered_tag);
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Commits a suggestion (or free-typed category) and clears the
    /// auto-complete state.
    pub fn add_category(&mut self, category: String) {
        if !category.is_empty() && !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self.entered_category.clear();
        self.category_suggestions.clear();
    }

    pub fn remove_category(&mut self, category: &str) {
        self.categories.retain(|c| c != category);
    }

    /// Replaces the suggestion list, hiding anything already committed.
    pub fn set_category_suggestions(&mut self, items: Vec<String>) {
        self.category_suggestions = items
            .into_iter()
            .filter(|item| !self.categories.contains(item))
            .collect();
    }

    #[must_use]
    pub fn commit(self) -> FilterSettings {
        FilterSettings {
            selected_date: self.selected_date,
            selected_time: self.selected_time,
            categories: self.categories,
            tags: self.tags,
            max_budget: if self.free_only { 0 } else { self.max_budget },
            include_further_events: self.include_further_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> FilterSettings {
        FilterSettings {
            selected_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            selected_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            categories: vec!["music".into()],
            tags: vec!["jazz".into()],
            max_budget: 0,
            include_further_events: true,
        }
    }

    #[test]
    fn query_fragment_uses_wire_names_and_formats() {
        let fragment = settings().query_fragment();
        assert_eq!(
            fragment,
            "selectedData=2024-01-01&selectedTime=18:30&categories=music&tags=jazz&maxBuget=0&inlcudeFurtherEvents=true"
        );
    }

    #[test]
    fn query_fragment_joins_multiple_values_with_commas() {
        let mut s = settings();
        s.tags = vec!["jazz".into(), "live".into()];
        s.categories = vec!["music".into(), "food".into()];
        let fragment = s.query_fragment();
        assert!(fragment.contains("tags=jazz,live"));
        assert!(fragment.contains("categories=music,food"));
    }

    #[test]
    fn time_format_drops_seconds() {
        let mut s = settings();
        s.selected_time = NaiveTime::from_hms_opt(9, 5, 47).unwrap();
        assert_eq!(s.formatted_time(), "09:05");
    }

    #[test]
    fn free_only_collapses_budget_to_zero() {
        let draft = FilterDraft {
            max_budget: 250,
            free_only: true,
            ..FilterDraft::default()
        };
        assert_eq!(draft.commit().max_budget, 0);

        let paid = FilterDraft {
            max_budget: 250,
            free_only: false,
            ..FilterDraft::default()
        };
        assert_eq!(paid.commit().max_budget, 250);
    }

    #[test]
    fn tags_deduplicate_by_string_equality() {
        let mut draft = FilterDraft::default();
        draft.entered_tag = "jazz".into();
        draft.add_entered_tag();
        draft.entered_tag = "jazz".into();
        draft.add_entered_tag();

        assert_eq!(draft.tags, vec!["jazz".to_string()]);
        assert!(draft.entered_tag.is_empty());
    }

    #[test]
    fn blank_tag_entry_is_ignored() {
        let mut draft = FilterDraft::default();
        draft.add_entered_tag();
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn committed_categories_are_hidden_from_suggestions() {
        let mut draft = FilterDraft::default();
        draft.add_category("music".into());
        draft.set_category_suggestions(vec!["music".into(), "theatre".into()]);

        assert_eq!(draft.category_suggestions, vec!["theatre".to_string()]);
    }

    #[test]
    fn choosing_a_category_clears_autocomplete_state() {
        let mut draft = FilterDraft::default();
        draft.entered_category = "mus".into();
        draft.category_suggestions = vec!["music".into()];
        draft.add_category("music".into());

        assert_eq!(draft.categories, vec!["music".to_string()]);
        assert!(draft.entered_category.is_empty());
        assert!(draft.category_suggestions.is_empty());
    }
}
