//! Page contract
//!
//! The text elements a cycle writes to. The browser dashboard backs this with
//! the DOM, the terminal watcher with its status line.

use std::collections::HashMap;

use crate::error::PageError;

/// Element showing the latest temperature
pub const TEMPERATURE_ID: &str = "temperature";
/// Element showing the latest humidity
pub const HUMIDITY_ID: &str = "humidity";
/// Optional element showing the date of the latest reading
pub const DATE_TITLE_ID: &str = "chart-date-title";
/// Canvas the chart is drawn on
pub const CHART_CANVAS_ID: &str = "sensorChart_temp_humidity";

/// Text-bearing elements addressed by id
pub trait Page {
    /// Whether the element exists
    fn contains(&self, id: &str) -> bool;

    /// Replace the element's text. Fails if the element is missing.
    fn set_text(&mut self, id: &str, text: &str) -> Result<(), PageError>;
}

/// In-memory page holding a fixed set of elements
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    elements: HashMap<String, String>,
    writes: usize,
}

impl MemoryPage {
    /// A page with every element of the dashboard
    pub fn dashboard() -> Self {
        Self::with_elements(&[TEMPERATURE_ID, HUMIDITY_ID, DATE_TITLE_ID])
    }

    pub fn with_elements(ids: &[&str]) -> Self {
        Self {
            elements: ids.iter().map(|id| (id.to_string(), String::new())).collect(),
            writes: 0,
        }
    }

    /// Current text of an element
    pub fn text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(String::as_str)
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Page for MemoryPage {
    fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), PageError> {
        let slot = self
            .elements
            .get_mut(id)
            .ok_or_else(|| PageError::MissingElement(id.to_string()))?;
        *slot = text.to_string();
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_page_writes() {
        let mut page = MemoryPage::dashboard();
        assert!(page.contains(DATE_TITLE_ID));
        assert_eq!(page.text(TEMPERATURE_ID), Some(""));

        page.set_text(TEMPERATURE_ID, "21").unwrap();
        assert_eq!(page.text(TEMPERATURE_ID), Some("21"));
        assert_eq!(page.writes(), 1);
    }

    #[test]
    fn test_memory_page_missing_element() {
        let mut page = MemoryPage::with_elements(&[TEMPERATURE_ID]);
        assert!(!page.contains(HUMIDITY_ID));

        let err = page.set_text(HUMIDITY_ID, "41").unwrap_err();
        assert_eq!(err, PageError::MissingElement("humidity".to_string()));
        assert_eq!(page.writes(), 0);
    }
}
