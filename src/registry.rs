use anyhow::Result;
use regex::Regex;

/// The closed set of supported extraction targets. Dispatch happens by `match`
/// on this enum rather than open-ended dynamic dispatch; adding a site means
/// adding a variant, a descriptor, and an arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    LinkedIn,
    Indeed,
    Glassdoor,
    Generic,
}

impl SiteKind {
    pub fn name(self) -> &'static str {
        match self {
            SiteKind::LinkedIn => "LinkedIn",
            SiteKind::Indeed => "Indeed",
            SiteKind::Glassdoor => "Glassdoor",
            SiteKind::Generic => "Generic",
        }
    }
}

/// CSS selectors for the job fields of one site. Each entry is a
/// comma-separated alternative list so that markup drift on the site does not
/// immediately break extraction; `None` means the site exposes no usable
/// element for that field.
#[derive(Debug, Clone, Default)]
pub struct SelectorSet {
    pub job_title: Option<&'static str>,
    pub company: Option<&'static str>,
    pub location: Option<&'static str>,
    pub description: Option<&'static str>,
    pub apply_button: Option<&'static str>,
    pub container: Option<&'static str>,
}

/// Static per-site configuration: identity, URL shape, and field selectors.
#[derive(Debug, Clone)]
pub struct SiteDescriptor {
    pub kind: SiteKind,
    pub name: &'static str,
    pub hostname: &'static str,
    pub url_pattern: Regex,
    pub selectors: SelectorSet,
}

/// All site descriptors, built once at startup and read-only afterwards.
pub struct Registry {
    // Indexed by `SiteKind as usize`; `new` builds the entries in declaration
    // order, which `descriptor` relies on.
    descriptors: Vec<SiteDescriptor>,
}

impl Registry {
    pub fn new() -> Result<Self> {
        let descriptors = vec![
            SiteDescriptor {
                kind: SiteKind::LinkedIn,
                name: "LinkedIn",
                hostname: "linkedin.com",
                url_pattern: Regex::new(r"linkedin\.com/jobs")?,
                selectors: SelectorSet {
                    job_title: Some(
                        ".job-details-jobs-unified-top-card__job-title, \
                         .jobs-unified-top-card__job-title, \
                         .jobs-unified-top-card__job-title-heading",
                    ),
                    company: Some(
                        ".job-details-jobs-unified-top-card__company-name, \
                         .jobs-unified-top-card__company-name, \
                         .jobs-unified-top-card__subtitle-primary-grouping .app-aware-link",
                    ),
                    location: Some(
                        ".job-details-jobs-unified-top-card__bullet, \
                         .jobs-unified-top-card__bullet, \
                         .jobs-unified-top-card__subtitle-primary-grouping \
                         .job-card-container__metadata-item",
                    ),
                    description: Some(
                        ".jobs-description__content, .jobs-description, .jobs-box__html-content",
                    ),
                    apply_button: Some(".jobs-apply-button"),
                    container: Some("body"),
                },
            },
            SiteDescriptor {
                kind: SiteKind::Indeed,
                name: "Indeed",
                hostname: "indeed.com",
                url_pattern: Regex::new(r"indeed\.com/(viewjob|job)")?,
                selectors: SelectorSet {
                    job_title: Some(
                        "h1.jobsearch-JobInfoHeader-title, \
                         .jobsearch-DesktopStickyContainer-title h1, \
                         .jobsearch-JobComponent-embeddedHeader h1, \
                         .icl-u-xs-mb--xs",
                    ),
                    company: Some(
                        ".jobsearch-InlineCompanyRating-companyHeader, \
                         .jobsearch-DesktopStickyContainer-companyrating \
                         .jobsearch-InlineCompanyRating div:first-child, \
                         .jobsearch-JobInfoHeader-subtitle \
                         .jobsearch-InlineCompanyRating div:first-child",
                    ),
                    location: Some(
                        ".jobsearch-JobInfoHeader-subtitle .jobsearch-JobInfoHeader-locationText, \
                         .jobsearch-DesktopStickyContainer-companyrating \
                         .jobsearch-JobInfoHeader-locationText, \
                         [data-testid='job-location']",
                    ),
                    description: Some(
                        "#jobDescriptionText, .jobsearch-jobDescriptionText, \
                         [data-testid='jobDescriptionText']",
                    ),
                    apply_button: Some(".jobsearch-IndeedApplyButton-newDesign"),
                    container: Some(".jobsearch-ViewJobLayout-innerContent"),
                },
            },
            SiteDescriptor {
                kind: SiteKind::Glassdoor,
                name: "Glassdoor",
                hostname: "glassdoor.com",
                url_pattern: Regex::new(r"glassdoor\.com/[Jj]ob")?,
                selectors: SelectorSet {
                    job_title: Some(
                        "[data-test='job-title'], .JobDetails_jobTitle__Rw_gn, \
                         .css-1vg6q84, .e11nt52q1",
                    ),
                    company: Some(
                        "[data-test='employer-name'], .JobDetails_employerName__Taztg, \
                         .css-16nw49e, .e11nt52q4",
                    ),
                    location: Some(
                        "[data-test='location'], .JobDetails_location__N_iYE, \
                         .css-56kyx5, .e11nt52q5",
                    ),
                    description: Some(
                        ".JobDetails_jobDescriptionWrapper__BTDTA, [data-test='jobDesc'], .desc",
                    ),
                    apply_button: None,
                    container: None,
                },
            },
            SiteDescriptor {
                kind: SiteKind::Generic,
                name: "Generic",
                hostname: "*",
                url_pattern: Regex::new(r"(?i)/(jobs?|careers?)([/?#._-]|$)")?,
                selectors: SelectorSet {
                    job_title: Some("h1"),
                    description: Some("meta[name='description'], meta[property='og:description']"),
                    ..SelectorSet::default()
                },
            },
        ];
        debug_assert!(
            descriptors
                .iter()
                .enumerate()
                .all(|(i, d)| d.kind as usize == i)
        );
        Ok(Self { descriptors })
    }

    pub fn descriptor(&self, kind: SiteKind) -> &SiteDescriptor {
        &self.descriptors[kind as usize]
    }

    /// Case-insensitive lookup by site name; `None` for unknown sites.
    pub fn descriptor_by_name(&self, name: &str) -> Option<&SiteDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }
}
