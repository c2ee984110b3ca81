use scraper::{ElementRef, Html, Selector};

/// Read-only view of a live page: query-selector text/attribute reads plus the
/// page URL and `<title>`. Extractors only see this trait, so tests run against
/// in-memory documents instead of a real browser.
///
/// All methods absorb failure: a selector that does not parse, or matches
/// nothing, reads as `None`. Implementations must never mutate the page.
pub trait DomAccessor {
    fn url(&self) -> &str;

    /// Text of the document `<title>`, or empty string.
    fn page_title(&self) -> String;

    /// Whitespace-normalized text of the first element matching `selectors`
    /// (comma-separated alternatives allowed, like `querySelector`).
    fn select_text(&self, selectors: &str) -> Option<String>;

    /// Attribute value of the first element matching `selectors`.
    fn select_attr(&self, selectors: &str, attr: &str) -> Option<String>;

    /// Like `select_text`, but scoped to the first element matching `scope`.
    fn select_text_within(&self, scope: &str, selectors: &str) -> Option<String>;

    /// Like `select_attr`, but scoped to the first element matching `scope`.
    fn select_attr_within(&self, scope: &str, selectors: &str, attr: &str) -> Option<String>;

    /// True if at least one element matches `selectors`.
    fn exists(&self, selectors: &str) -> bool;
}

/// `DomAccessor` over a parsed HTML document.
pub struct HtmlPage {
    url: String,
    doc: Html,
}

impl HtmlPage {
    pub fn parse(url: &str, html: &str) -> Self {
        Self {
            url: url.to_string(),
            doc: Html::parse_document(html),
        }
    }

    fn first(&self, selectors: &str) -> Option<ElementRef<'_>> {
        let sel = Selector::parse(selectors).ok()?;
        self.doc.select(&sel).next()
    }
}

fn normalized_text(el: ElementRef<'_>) -> String {
    let raw = el.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_within<'a>(scope: ElementRef<'a>, selectors: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selectors).ok()?;
    scope.select(&sel).next()
}

impl DomAccessor for HtmlPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn page_title(&self) -> String {
        self.first("title").map(normalized_text).unwrap_or_default()
    }

    fn select_text(&self, selectors: &str) -> Option<String> {
        self.first(selectors).map(normalized_text)
    }

    fn select_attr(&self, selectors: &str, attr: &str) -> Option<String> {
        self.first(selectors)?.value().attr(attr).map(str::to_string)
    }

    fn select_text_within(&self, scope: &str, selectors: &str) -> Option<String> {
        let scope = self.first(scope)?;
        first_within(scope, selectors).map(normalized_text)
    }

    fn select_attr_within(&self, scope: &str, selectors: &str, attr: &str) -> Option<String> {
        let scope = self.first(scope)?;
        first_within(scope, selectors)?.value().attr(attr).map(str::to_string)
    }

    fn exists(&self, selectors: &str) -> bool {
        self.first(selectors).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head><title>  Backend   Engineer - Acme Co </title></head>
          <body>
            <h1 class="job-title"> Backend
                <span>Engineer</span></h1>
            <div class="card"><a class="link" href="/jobs/view/42">Open</a>
              <span class="name">Acme Co</span></div>
            <div class="card"><span class="name">Other Co</span></div>
          </body>
        </html>"#;

    fn page() -> HtmlPage {
        HtmlPage::parse("https://example.com/jobs/view/1", PAGE)
    }

    #[test]
    fn page_title_is_normalized() {
        assert_eq!(page().page_title(), "Backend Engineer - Acme Co");
    }

    #[test]
    fn select_text_collapses_whitespace_across_children() {
        assert_eq!(page().select_text("h1.job-title").as_deref(), Some("Backend Engineer"));
    }

    #[test]
    fn selector_list_returns_first_match_in_document_order() {
        // Neither .missing nor a second .job-title exists; the list still
        // resolves to the one present element.
        assert_eq!(
            page().select_text(".missing, h1.job-title").as_deref(),
            Some("Backend Engineer")
        );
        // Both alternatives match; document order wins over list order.
        assert_eq!(page().select_text(".name, .link").as_deref(), Some("Open"));
    }

    #[test]
    fn scoped_queries_stay_inside_the_scope() {
        let p = page();
        assert_eq!(p.select_text_within(".card", ".name").as_deref(), Some("Acme Co"));
        assert_eq!(
            p.select_attr_within(".card", "a.link", "href").as_deref(),
            Some("/jobs/view/42")
        );
        // Second card has no link.
        assert_eq!(p.select_attr_within(".card + .card", "a.link", "href"), None);
    }

    #[test]
    fn missing_and_malformed_selectors_read_as_none() {
        let p = page();
        assert_eq!(p.select_text(".nope"), None);
        assert_eq!(p.select_text("][not-a-selector"), None);
        assert!(!p.exists("][not-a-selector"));
        assert!(p.exists(".card"));
    }
}
