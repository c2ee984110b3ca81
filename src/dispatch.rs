use anyhow::Result;
use log::debug;

use crate::dom::DomAccessor;
use crate::extractors;
use crate::models::JobData;
use crate::registry::{Registry, SiteKind};

/// Owns the registration-ordered extractor list and picks the first one whose
/// URL test matches. First match wins; there is no scoring, since the site
/// patterns are disjoint in practice and the generic fallback sits last.
pub struct Dispatcher {
    registry: Registry,
    order: Vec<SiteKind>,
}

impl Dispatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            registry: Registry::new()?,
            order: vec![
                SiteKind::LinkedIn,
                SiteKind::Indeed,
                SiteKind::Glassdoor,
                SiteKind::Generic,
            ],
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// First registered extractor that can handle `url`.
    pub fn detect(&self, url: &str) -> Option<SiteKind> {
        self.order
            .iter()
            .copied()
            .find(|&kind| extractors::can_handle(kind, &self.registry, url))
    }

    /// URL-shape check only; extraction can still miss on a matching page.
    pub fn is_job_page(&self, url: &str) -> bool {
        self.detect(url).is_some()
    }

    /// Delegate extraction to the matching extractor, if any.
    pub fn job_data(&self, dom: &dyn DomAccessor) -> Option<JobData> {
        let url = dom.url();
        match self.detect(url) {
            Some(kind) => {
                debug!("dispatch: {} extractor matched {url}", kind.name());
                extractors::extract(kind, &self.registry, dom)
            }
            None => {
                debug!("dispatch: no extractor matched {url}");
                None
            }
        }
    }
}
