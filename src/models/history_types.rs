use crate::models::classify_types::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    ConfidenceDesc,
    ConfidenceAsc,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::DateDesc => "date_desc",
            SortKey::DateAsc => "date_asc",
            SortKey::ConfidenceDesc => "confidence_desc",
            SortKey::ConfidenceAsc => "confidence_asc",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "date_desc" => Some(SortKey::DateDesc),
            "date_asc" => Some(SortKey::DateAsc),
            "confidence_desc" => Some(SortKey::ConfidenceDesc),
            "confidence_asc" => Some(SortKey::ConfidenceAsc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Grid,
}

/// Filterable fields of the history list. The string form is the query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Search,
    Category,
    DateFrom,
    DateTo,
    Confidence,
}

impl FilterField {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterField::Search => "search",
            FilterField::Category => "category",
            FilterField::DateFrom => "date_from",
            FilterField::DateTo => "date_to",
            FilterField::Confidence => "confidence",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one paged-list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRequestParams {
    pub page: u32,
    pub limit: u32,
    pub sort: SortKey,
    pub filters: BTreeMap<FilterField, String>,
}

impl HistoryRequestParams {
    /// Flat `key=value` pairs, filters after the fixed keys.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
            ("sort".to_string(), self.sort.as_str().to_string()),
        ];
        pairs.extend(
            self.filters
                .iter()
                .map(|(field, value)| (field.as_str().to_string(), value.clone())),
        );
        pairs
    }
}

/// One stored classification as listed in the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub filename: String,
    pub file_size: u64,
    pub result: Category,
    pub subcategory: Option<String>,
    /// Percentage in `0..=100`.
    pub confidence: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub alert_sent: bool,
    pub processing_time: Option<f64>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub per_page: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            per_page: 20,
            total: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityStats {
    pub total_classifications: u64,
    pub today_classifications: u64,
    pub alerts_generated: u64,
    pub avg_accuracy: f64,
}

/// Rendered history row, shared by the table and grid views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub id: String,
    pub filename: String,
    pub file_size: String,
    pub result_class: &'static str,
    pub result_text: String,
    pub confidence_percent: u8,
    pub age: String,
    pub alert_status_class: &'static str,
    pub alert_status_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationView {
    pub summary_start: u64,
    pub summary_end: u64,
    pub total: u64,
    pub pages: Vec<u32>,
    pub current_page: u32,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub mode: ViewMode,
    pub rows: Vec<HistoryRow>,
    pub is_empty: bool,
    pub pagination: PaginationView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_put_filters_after_fixed_keys() {
        let mut filters = BTreeMap::new();
        filters.insert(FilterField::Search, "bridge".to_string());
        filters.insert(FilterField::Category, "fire".to_string());
        let params = HistoryRequestParams {
            page: 2,
            limit: 20,
            sort: SortKey::ConfidenceDesc,
            filters,
        };
        let pairs = params.to_query_pairs();
        assert_eq!(pairs[0], ("page".to_string(), "2".to_string()));
        assert_eq!(pairs[2], ("sort".to_string(), "confidence_desc".to_string()));
        assert_eq!(pairs[3], ("search".to_string(), "bridge".to_string()));
        assert_eq!(pairs[4], ("category".to_string(), "fire".to_string()));
    }

    #[test]
    fn sort_key_parses_wire_names() {
        assert_eq!(SortKey::parse("date_asc"), Some(SortKey::DateAsc));
        assert_eq!(SortKey::parse("random"), None);
        assert_eq!(SortKey::default().as_str(), "date_desc");
    }
}
