use log::debug;
use url::Url;

use crate::dom::DomAccessor;
use crate::models::JobData;
use crate::registry::{Registry, SiteDescriptor, SiteKind};

pub const NO_DESCRIPTION: &str = "No description available";
pub const UNKNOWN_LOCATION: &str = "Unknown location";

// LinkedIn collections/search pages show a list of compact job cards instead
// of a single job view. The highlighted card carries the --selected modifier.
const SELECTED_CARD: &str = ".job-card-container--selected";
const ANY_CARD: &str = ".job-card-container";
const CARD_TITLE: &str = ".job-card-list__title";
const CARD_COMPANY: &str = ".job-card-container__company-name";
const CARD_LOCATION: &str = ".job-card-container__metadata-item";
const CARD_LINK: &str = "a.job-card-container__link";
const DETAILS_DESCRIPTION: &str = ".jobs-description";

/// Pure URL test: true if `kind`'s extractor knows how to read this page.
/// Called on every navigation tick, so it never touches the DOM.
pub fn can_handle(kind: SiteKind, registry: &Registry, url: &str) -> bool {
    registry.descriptor(kind).url_pattern.is_match(url)
}

/// Run the extractor for `kind` against the current page. Returns `None` when
/// the required fields (title and company) cannot be recovered; all DOM-level
/// failures degrade to that same `None`.
pub fn extract(kind: SiteKind, registry: &Registry, dom: &dyn DomAccessor) -> Option<JobData> {
    let descriptor = registry.descriptor(kind);
    match kind {
        SiteKind::LinkedIn => extract_linkedin(descriptor, dom),
        SiteKind::Indeed => extract_indeed(descriptor, dom),
        SiteKind::Glassdoor => extract_glassdoor(descriptor, dom),
        SiteKind::Generic => extract_generic(descriptor, dom),
    }
}

/// Title and company text currently visible on the page, read through the
/// site's primary selectors with no fallbacks. The re-injection controller
/// compares consecutive readings of this pair to notice in-place job switches.
pub fn displayed_title_company(
    kind: SiteKind,
    registry: &Registry,
    dom: &dyn DomAccessor,
) -> (String, String) {
    let selectors = &registry.descriptor(kind).selectors;
    (
        field(dom, selectors.job_title),
        field(dom, selectors.company),
    )
}

fn field(dom: &dyn DomAccessor, selectors: Option<&str>) -> String {
    selectors
        .and_then(|s| dom.select_text(s))
        .unwrap_or_default()
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() { fallback.to_string() } else { value }
}

fn strip_suffix_once<'a>(s: &'a str, suffix: &str) -> &'a str {
    s.strip_suffix(suffix).unwrap_or(s)
}

fn resolve_href(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    Some(base.join(href).ok()?.to_string())
}

// --- LinkedIn ---

fn extract_linkedin(descriptor: &SiteDescriptor, dom: &dyn DomAccessor) -> Option<JobData> {
    let url = dom.url();
    if url.contains("/jobs/collections/") || url.contains("/jobs/search/") {
        extract_linkedin_card(dom)
    } else {
        extract_linkedin_view(descriptor, dom)
    }
}

fn extract_linkedin_view(descriptor: &SiteDescriptor, dom: &dyn DomAccessor) -> Option<JobData> {
    let selectors = &descriptor.selectors;
    let title = field(dom, selectors.job_title);
    let company = field(dom, selectors.company);
    let location = field(dom, selectors.location);
    let description = field(dom, selectors.description);
    let url = dom.url().to_string();

    if title.is_empty() || company.is_empty() {
        debug!("linkedin: job view selectors came up short, parsing page title");

        // Page titles look like "Senior Engineer | LinkedIn".
        let page_title = dom.page_title();
        let derived = page_title.split(" | ").next().unwrap_or("").trim();
        if derived.is_empty() {
            return None;
        }
        return Some(JobData {
            title: derived.to_string(),
            company: non_empty_or(company, "LinkedIn"),
            location: non_empty_or(location, UNKNOWN_LOCATION),
            description: non_empty_or(description, NO_DESCRIPTION),
            url,
            source: "LinkedIn".to_string(),
        });
    }

    Some(JobData {
        title,
        company,
        location,
        description,
        url,
        source: "LinkedIn".to_string(),
    })
}

fn extract_linkedin_card(dom: &dyn DomAccessor) -> Option<JobData> {
    let card = if dom.exists(SELECTED_CARD) {
        SELECTED_CARD
    } else if dom.exists(ANY_CARD) {
        // No card is highlighted; first in document order wins.
        debug!("linkedin: no selected job card, using the first one");
        ANY_CARD
    } else {
        debug!("linkedin: no job cards on the page");
        return None;
    };

    let title = dom.select_text_within(card, CARD_TITLE).unwrap_or_default();
    let company = dom.select_text_within(card, CARD_COMPANY).unwrap_or_default();
    let location = dom.select_text_within(card, CARD_LOCATION).unwrap_or_default();

    // Cards carry no description; the details panel next to the list might.
    let description = dom
        .select_text(DETAILS_DESCRIPTION)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    // Prefer the card's own job link over the list-page URL.
    let url = dom
        .select_attr_within(card, CARD_LINK, "href")
        .and_then(|href| resolve_href(dom.url(), &href))
        .unwrap_or_else(|| dom.url().to_string());

    if title.is_empty() || company.is_empty() {
        debug!("linkedin: card is missing title or company");
        return None;
    }

    Some(JobData {
        title,
        company,
        location,
        description,
        url,
        source: "LinkedIn".to_string(),
    })
}

// --- Indeed ---

fn extract_indeed(descriptor: &SiteDescriptor, dom: &dyn DomAccessor) -> Option<JobData> {
    let selectors = &descriptor.selectors;
    let title = field(dom, selectors.job_title);
    let company = field(dom, selectors.company);
    let location = field(dom, selectors.location);
    let description = field(dom, selectors.description);
    let url = dom.url().to_string();

    if title.is_empty() || company.is_empty() {
        debug!("indeed: selectors came up short, parsing page title");

        // Page titles look like "Backend Engineer - Acme Co - Denver, CO".
        let page_title = dom.page_title();
        let parts: Vec<&str> = page_title.split(" - ").collect();
        if parts.len() >= 2 {
            let derived_title = parts[0].trim();
            let derived_company =
                strip_suffix_once(strip_suffix_once(parts[1].trim(), " Careers"), " Jobs").trim();

            let title = non_empty_or(derived_title.to_string(), &title);
            if title.is_empty() {
                return None;
            }
            return Some(JobData {
                title,
                company: non_empty_or(
                    derived_company.to_string(),
                    &non_empty_or(company, "Indeed"),
                ),
                location: non_empty_or(location, UNKNOWN_LOCATION),
                description: non_empty_or(description, NO_DESCRIPTION),
                url,
                source: "Indeed".to_string(),
            });
        }

        if !title.is_empty() && company.is_empty() {
            return Some(JobData {
                title,
                company: "Unknown Company".to_string(),
                location: non_empty_or(location, UNKNOWN_LOCATION),
                description: non_empty_or(description, NO_DESCRIPTION),
                url,
                source: "Indeed".to_string(),
            });
        }

        return None;
    }

    Some(JobData {
        title,
        company,
        location,
        description,
        url,
        source: "Indeed".to_string(),
    })
}

// --- Glassdoor ---

fn extract_glassdoor(descriptor: &SiteDescriptor, dom: &dyn DomAccessor) -> Option<JobData> {
    let selectors = &descriptor.selectors;
    let title = field(dom, selectors.job_title);
    let company = field(dom, selectors.company);
    let location = field(dom, selectors.location);
    let description = field(dom, selectors.description);
    let url = dom.url().to_string();

    if title.is_empty() || company.is_empty() {
        debug!("glassdoor: selectors came up short, parsing page title");

        // Page titles look like "Backend Engineer Job at Acme in Denver, CO".
        let page_title = dom.page_title();
        let parts: Vec<&str> = page_title.split(" at ").collect();
        if parts.len() >= 2 {
            let derived_title = strip_suffix_once(parts[0].trim(), " Job").trim();
            let mut derived_company = parts[1].trim();
            if let Some((before, _)) = derived_company.split_once(" in ") {
                derived_company = before.trim();
            }

            let title = non_empty_or(derived_title.to_string(), &title);
            if title.is_empty() {
                return None;
            }
            return Some(JobData {
                title,
                company: non_empty_or(
                    derived_company.to_string(),
                    &non_empty_or(company, "Glassdoor"),
                ),
                location: non_empty_or(location, UNKNOWN_LOCATION),
                description: non_empty_or(description, NO_DESCRIPTION),
                url,
                source: "Glassdoor".to_string(),
            });
        }

        if title.is_empty() {
            return None;
        }
        return Some(JobData {
            title,
            company: non_empty_or(company, "Glassdoor"),
            location,
            description,
            url,
            source: "Glassdoor".to_string(),
        });
    }

    Some(JobData {
        title,
        company,
        location,
        description,
        url,
        source: "Glassdoor".to_string(),
    })
}

// --- Generic careers pages ---

fn extract_generic(descriptor: &SiteDescriptor, dom: &dyn DomAccessor) -> Option<JobData> {
    let selectors = &descriptor.selectors;
    let mut title = field(dom, selectors.job_title);
    let mut company = dom
        .select_attr("meta[property='og:site_name']", "content")
        .map(|c| c.trim().to_string())
        .unwrap_or_default();
    let description = selectors
        .description
        .and_then(|s| dom.select_attr(s, "content"))
        .map(|d| d.trim().to_string())
        .unwrap_or_default();
    let url = dom.url().to_string();

    if title.is_empty() || company.is_empty() {
        // "Title | Company", "Title at Company", "Title - Company"; first
        // separator that splits into two non-empty halves wins.
        let page_title = dom.page_title();
        for separator in [" | ", " at ", " - "] {
            if let Some((left, right)) = page_title.split_once(separator) {
                let (left, right) = (left.trim(), right.trim());
                if left.is_empty() || right.is_empty() {
                    continue;
                }
                if title.is_empty() {
                    title = left.to_string();
                }
                if company.is_empty() {
                    company = right.to_string();
                }
                break;
            }
        }
    }

    if title.is_empty() {
        // Last resort: the whole page title.
        title = dom.page_title().trim().to_string();
    }
    if title.is_empty() {
        return None;
    }
    if company.is_empty() {
        company = host_name(dom.url())?;
    }

    Some(JobData {
        title,
        company,
        location: String::new(),
        description,
        url,
        source: "Generic".to_string(),
    })
}

fn host_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}
