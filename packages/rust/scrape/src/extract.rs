//! CSS-selector field extraction.
//!
//! One call per field: the selector is run against the whole document and
//! yields that field's text fragments in document order. A field that is
//! structurally absent for some records simply yields fewer fragments than
//! the listing has records; re-establishing index alignment is the dataset
//! layer's job, not the extractor's.

use scraper::{Html, Selector};
use tracing::debug;

use reeltab_shared::{ReeltabError, Result};

/// Extract the ordered text fragments matched by `selector`.
///
/// Zero matches is not an error: the caller decides whether an empty or
/// short sequence is acceptable. An unparsable selector is a [`Parse`]
/// error.
///
/// [`Parse`]: ReeltabError::Parse
pub fn extract(doc: &Html, selector: &str) -> Result<Vec<String>> {
    let sel = parse_selector(selector)?;

    let fragments: Vec<String> = doc
        .select(&sel)
        .map(|el| el.text().collect::<String>())
        .collect();

    debug!(selector, matched = fragments.len(), "field extracted");

    Ok(fragments)
}

/// Parse a CSS selector string, returning a [`ReeltabError::Parse`] on failure.
fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ReeltabError::parse(format!("invalid CSS selector '{selector}': {e}")))
}
