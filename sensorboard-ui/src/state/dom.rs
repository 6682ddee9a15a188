//! DOM Page
//!
//! Writes cycle results straight into the page's elements by id.

use sensorboard::{Page, PageError};
use web_sys::Document;

/// The live document
pub struct DomPage {
    document: Document,
}

impl DomPage {
    pub fn new() -> Result<Self, PageError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| PageError::Write("no document".to_string()))?;
        Ok(Self { document })
    }
}

impl Page for DomPage {
    fn contains(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), PageError> {
        let element = self
            .document
            .get_element_by_id(id)
            .ok_or_else(|| PageError::MissingElement(id.to_string()))?;
        element.set_text_content(Some(text));
        Ok(())
    }
}
