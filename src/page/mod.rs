// src/page/mod.rs
//! # Page observation
//!
//! The collector never talks to a browser directly. It drives a
//! [`PageObserver`]: a live page that can list the currently rendered item
//! links, read text and attributes around them, and scroll.
//!
//! Element handles ([`ElementRef`]) are opaque and short-lived. The page
//! re-renders as it scrolls, so any per-element call may fail with
//! [`HarvestError::ElementStale`]; callers skip that one item and move on.
//!
//! Implementors supply a handful of primitives; the higher-level operations
//! (`wait_ready`, `resolve_href`, `nearest_container`, `extract_text`) are
//! provided on top of them.
//!
//! - `webdriver` – a W3C WebDriver session (chromedriver) over HTTP.
//! - `extract` – ordered field extractors used to read a card's text.

pub mod extract;
pub mod webdriver;

use std::thread;
use std::time::{Duration, Instant};

use crate::core::{canonical_link, sanitize::normalize_ws};
use crate::error::HarvestError;

pub use extract::{CssAttr, CssText, FieldChain, FieldExtractor};
pub use webdriver::WebDriverPage;

/// How often `wait_ready` re-reads the page.
pub const READY_POLL: Duration = Duration::from_millis(500);

/// Opaque handle to a rendered element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
    pub fn id(&self) -> &str { &self.0 }
}

pub trait PageObserver {
    /// Load `url` and let it settle.
    fn navigate(&mut self, url: &str) -> Result<(), HarvestError>;

    /// Address of the page as currently shown (after redirects).
    fn current_url(&mut self) -> Result<String, HarvestError>;

    /// All elements currently matching `selector`, in document order.
    fn list_links(&mut self, selector: &str) -> Result<Vec<ElementRef>, HarvestError>;

    /// Attribute value, `None` when the attribute is absent.
    fn attribute(&mut self, el: &ElementRef, name: &str) -> Result<Option<String>, HarvestError>;

    /// First descendant of `el` matching `selector`.
    fn find_within(&mut self, el: &ElementRef, selector: &str) -> Result<Option<ElementRef>, HarvestError>;

    /// Direct parent element, if any.
    fn parent_of(&mut self, el: &ElementRef) -> Result<Option<ElementRef>, HarvestError>;

    /// Rendered text of `el`.
    fn text_of(&mut self, el: &ElementRef) -> Result<String, HarvestError>;

    /// Scroll by `fraction` of one viewport height.
    fn scroll_viewport(&mut self, fraction: f64) -> Result<(), HarvestError>;

    /// Poll until `selector` matches at least one element.
    fn wait_ready(&mut self, selector: &str, timeout: Duration) -> Result<(), HarvestError> {
        let start = Instant::now();
        loop {
            if !self.list_links(selector)?.is_empty() {
                return Ok(());
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(HarvestError::PageNotReady { selector: selector.to_string(), timeout });
            }
            thread::sleep(READY_POLL.min(timeout - elapsed));
        }
    }

    /// Absolute item URL for a link element; `None` if blank or unresolvable.
    fn resolve_href(&mut self, el: &ElementRef) -> Result<Option<String>, HarvestError> {
        let Some(href) = self.attribute(el, "href")? else { return Ok(None) };
        let base = self.current_url()?;
        Ok(canonical_link(&base, &href))
    }

    /// The card around a link: its parent, or the link itself when there is none.
    fn nearest_container(&mut self, el: &ElementRef) -> Result<ElementRef, HarvestError> {
        match self.parent_of(el) {
            Ok(Some(parent)) => Ok(parent),
            Ok(None) => Ok(el.clone()),
            Err(e) if e.is_stale() => Err(e),
            Err(e) => {
                logd!("Page: no container for {}: {e}", el.id());
                Ok(el.clone())
            }
        }
    }

    /// Whitespace-normalized text of the first match under `el`; empty → `None`.
    fn extract_text(&mut self, el: &ElementRef, selector: &str) -> Result<Option<String>, HarvestError> {
        let Some(found) = self.find_within(el, selector)? else { return Ok(None) };
        let text = normalize_ws(&self.text_of(&found)?);
        Ok((!text.is_empty()).then_some(text))
    }
}
