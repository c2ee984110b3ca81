use log::{debug, info};
use std::thread;
use std::time::Duration;

use crate::dispatch::Dispatcher;
use crate::dom::DomAccessor;
use crate::extractors;
use crate::models::User;
use crate::overlay::{Overlay, OverlayHost};
use crate::storage::AuthSource;

/// How long to let the host page finish rendering before re-extracting.
/// Host SPAs swap content after the URL or the selected job changes; reading
/// too early sees the old job. Tests run with `immediate()`.
#[derive(Debug, Clone, Copy)]
pub struct SettleDelays {
    pub url_change: Duration,
    pub job_change: Duration,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            url_change: Duration::from_millis(1000),
            job_change: Duration::from_millis(500),
        }
    }
}

impl SettleDelays {
    pub fn immediate() -> Self {
        Self {
            url_change: Duration::ZERO,
            job_change: Duration::ZERO,
        }
    }
}

/// What the controller knows about the page it is tracking. One instance per
/// tab/frame lifetime; nothing here is shared or persisted.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    pub last_url: String,
    pub last_job_title: String,
    pub last_company_name: String,
    pub is_authenticated: bool,
    pub current_user: Option<User>,
}

/// Keeps the injected overlay synchronized with a single-page application
/// that changes its visible job without a full navigation.
///
/// Two triggers feed it: URL-change ticks from a document-wide mutation
/// observer (`on_mutation`) and narrower job-details mutations
/// (`on_job_details_mutation`). Both coalesce bursts: re-injection only
/// happens when the tracked URL or job identity actually changed, and
/// mounting always removes the previous overlay first. No trigger does any
/// DOM work while unauthenticated.
pub struct ReinjectionController<'a> {
    dispatcher: Dispatcher,
    auth: &'a dyn AuthSource,
    overlay: OverlayHost,
    delays: SettleDelays,
    state: NavigationState,
}

impl<'a> ReinjectionController<'a> {
    pub fn new(dispatcher: Dispatcher, auth: &'a dyn AuthSource, delays: SettleDelays) -> Self {
        Self {
            dispatcher,
            auth,
            overlay: OverlayHost::new(),
            delays,
            state: NavigationState::default(),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn overlay(&self) -> &OverlayHost {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayHost {
        &mut self.overlay
    }

    /// Initial injection attempt when the content script starts up.
    pub fn on_load(&mut self, dom: &dyn DomAccessor) {
        self.state.last_url = dom.url().to_string();
        self.inject(dom);
    }

    /// Document-subtree mutation tick. Mutations themselves carry no signal;
    /// the current URL is compared against the last seen one, so any burst of
    /// ticks for a single navigation collapses into one re-injection.
    pub fn on_mutation(&mut self, dom: &dyn DomAccessor) {
        let current_url = dom.url();
        if current_url == self.state.last_url {
            return;
        }
        self.state.last_url = current_url.to_string();
        debug!("reinject: url changed to {current_url}");

        thread::sleep(self.delays.url_change);
        self.inject(dom);
    }

    /// Mutation tick from the job-details container. The host page swaps the
    /// displayed job in place (e.g. clicking through a LinkedIn job list), so
    /// the job's visible title/company pair is the identity being tracked.
    pub fn on_job_details_mutation(&mut self, dom: &dyn DomAccessor) {
        // Gate on the last auth check; no scraping while logged out.
        if !self.state.is_authenticated {
            return;
        }
        let Some(kind) = self.dispatcher.detect(dom.url()) else {
            return;
        };
        let (title, company) =
            extractors::displayed_title_company(kind, self.dispatcher.registry(), dom);
        if title.is_empty() || company.is_empty() {
            return;
        }
        if title == self.state.last_job_title && company == self.state.last_company_name {
            return;
        }
        debug!("reinject: displayed job changed to \"{title}\" at {company}");

        // Tear down and update the tracked identity before the settle sleep;
        // extraction re-reads the live page when the timer fires.
        self.overlay.unmount_all();
        self.state.last_job_title = title;
        self.state.last_company_name = company;

        thread::sleep(self.delays.job_change);
        self.inject(dom);
    }

    /// Explicit re-show request from the extension popup.
    pub fn request_reshow(&mut self, dom: &dyn DomAccessor) {
        self.inject(dom);
    }

    /// The full pipeline: auth check, then extraction, then overlay mount.
    fn inject(&mut self, dom: &dyn DomAccessor) {
        let Some(user) = self.auth.current_user() else {
            debug!("reinject: not authenticated, skipping injection");
            self.state.is_authenticated = false;
            self.state.current_user = None;
            self.overlay.unmount_all();
            return;
        };
        self.state.is_authenticated = true;
        self.state.current_user = Some(user.clone());

        if !self.dispatcher.is_job_page(dom.url()) {
            debug!("reinject: {} is not a job page", dom.url());
            return;
        }
        let Some(job) = self.dispatcher.job_data(dom) else {
            // Not an error: the page may still be rendering, or the posting
            // is gone. The next trigger will try again.
            debug!("reinject: extraction miss on {}", dom.url());
            return;
        };

        self.state.last_job_title = job.title.clone();
        self.state.last_company_name = job.company.clone();
        info!("reinject: mounting overlay for \"{}\" at {}", job.title, job.company);
        self.overlay.mount(Overlay::new(job, &user));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlPage;
    use std::cell::{Cell, RefCell};

    /// Counts auth checks; one check per pipeline run.
    struct FakeAuth {
        user: RefCell<Option<User>>,
        checks: Cell<usize>,
    }

    impl FakeAuth {
        fn logged_in() -> Self {
            Self {
                user: RefCell::new(Some(User {
                    email: "dev@example.com".to_string(),
                    name: "Dev".to_string(),
                    token: None,
                })),
                checks: Cell::new(0),
            }
        }

        fn logged_out() -> Self {
            Self {
                user: RefCell::new(None),
                checks: Cell::new(0),
            }
        }

        fn log_out(&self) {
            *self.user.borrow_mut() = None;
        }
    }

    impl AuthSource for FakeAuth {
        fn current_user(&self) -> Option<User> {
            self.checks.set(self.checks.get() + 1);
            self.user.borrow().clone()
        }
    }

    fn controller<'a>(auth: &'a FakeAuth) -> ReinjectionController<'a> {
        ReinjectionController::new(
            Dispatcher::new().unwrap(),
            auth,
            SettleDelays::immediate(),
        )
    }

    fn indeed_page(url: &str, title: &str, company: &str) -> HtmlPage {
        HtmlPage::parse(
            url,
            &format!(
                r#"<html><head><title>x</title></head><body>
                   <h1 class="jobsearch-JobInfoHeader-title">{title}</h1>
                   <div class="jobsearch-InlineCompanyRating-companyHeader">{company}</div>
                   </body></html>"#
            ),
        )
    }

    fn linkedin_view(url: &str, title: &str, company: &str) -> HtmlPage {
        HtmlPage::parse(
            url,
            &format!(
                r#"<html><head><title>x</title></head><body>
                   <h1 class="job-details-jobs-unified-top-card__job-title">{title}</h1>
                   <a class="job-details-jobs-unified-top-card__company-name">{company}</a>
                   </body></html>"#
            ),
        )
    }

    #[test]
    fn unauthenticated_session_mounts_nothing() {
        let auth = FakeAuth::logged_out();
        let mut ctl = controller(&auth);
        let page = indeed_page("https://www.indeed.com/viewjob?jk=1", "Engineer", "Acme");

        ctl.on_load(&page);
        assert_eq!(ctl.overlay().count(), 0);
        assert!(!ctl.state().is_authenticated);
        assert!(ctl.state().current_user.is_none());
    }

    #[test]
    fn repeated_navigation_leaves_exactly_one_overlay() {
        let auth = FakeAuth::logged_in();
        let mut ctl = controller(&auth);

        ctl.on_load(&indeed_page("https://www.indeed.com/viewjob?jk=1", "A", "Acme"));
        for jk in 2..6 {
            let url = format!("https://www.indeed.com/viewjob?jk={jk}");
            ctl.on_mutation(&indeed_page(&url, &format!("Job {jk}"), "Acme"));
            assert_eq!(ctl.overlay().count(), 1);
        }
        assert_eq!(ctl.overlay().current().unwrap().job.title, "Job 5");
    }

    #[test]
    fn mutation_bursts_without_url_change_coalesce() {
        let auth = FakeAuth::logged_in();
        let mut ctl = controller(&auth);
        let page = indeed_page("https://www.indeed.com/viewjob?jk=1", "Engineer", "Acme");

        ctl.on_load(&page);
        let after_load = auth.checks.get();
        for _ in 0..10 {
            ctl.on_mutation(&page);
        }
        // No URL change, no pipeline runs.
        assert_eq!(auth.checks.get(), after_load);

        ctl.on_mutation(&indeed_page("https://www.indeed.com/viewjob?jk=2", "Other", "Acme"));
        assert_eq!(auth.checks.get(), after_load + 1);
        for _ in 0..10 {
            ctl.on_mutation(&indeed_page("https://www.indeed.com/viewjob?jk=2", "Other", "Acme"));
        }
        assert_eq!(auth.checks.get(), after_load + 1);
    }

    #[test]
    fn job_selection_change_swaps_the_overlay() {
        let auth = FakeAuth::logged_in();
        let mut ctl = controller(&auth);
        let url = "https://www.linkedin.com/jobs/view/1";

        ctl.on_load(&linkedin_view(url, "Backend Engineer", "Acme"));
        assert_eq!(ctl.overlay().current().unwrap().job.title, "Backend Engineer");

        // Host page swaps the displayed job without changing the URL.
        let swapped = linkedin_view(url, "Platform Engineer", "Globex");
        ctl.on_job_details_mutation(&swapped);
        assert_eq!(ctl.overlay().count(), 1);
        assert_eq!(ctl.overlay().current().unwrap().job.title, "Platform Engineer");
        assert_eq!(ctl.state().last_company_name, "Globex");

        // Same job again: no further pipeline run.
        let checks = auth.checks.get();
        ctl.on_job_details_mutation(&swapped);
        assert_eq!(auth.checks.get(), checks);
    }

    #[test]
    fn job_selection_trigger_ignores_partial_reads() {
        let auth = FakeAuth::logged_in();
        let mut ctl = controller(&auth);
        let url = "https://www.linkedin.com/jobs/view/1";

        ctl.on_load(&linkedin_view(url, "Backend Engineer", "Acme"));

        // Mid-render DOM with the company not yet painted.
        let partial = HtmlPage::parse(
            url,
            r#"<html><body>
               <h1 class="job-details-jobs-unified-top-card__job-title">Platform Engineer</h1>
               </body></html>"#,
        );
        ctl.on_job_details_mutation(&partial);
        assert_eq!(ctl.overlay().current().unwrap().job.title, "Backend Engineer");
    }

    #[test]
    fn extraction_miss_keeps_the_previous_overlay() {
        let auth = FakeAuth::logged_in();
        let mut ctl = controller(&auth);

        ctl.on_load(&indeed_page("https://www.indeed.com/viewjob?jk=1", "Engineer", "Acme"));
        assert_eq!(ctl.overlay().count(), 1);

        // Job-shaped URL whose DOM gives nothing back.
        let empty = HtmlPage::parse(
            "https://www.indeed.com/viewjob?jk=2",
            "<html><head></head><body></body></html>",
        );
        ctl.on_mutation(&empty);
        assert_eq!(ctl.overlay().count(), 1);
        assert_eq!(ctl.overlay().current().unwrap().job.title, "Engineer");
    }

    #[test]
    fn logging_out_tears_the_overlay_down() {
        let auth = FakeAuth::logged_in();
        let mut ctl = controller(&auth);

        ctl.on_load(&indeed_page("https://www.indeed.com/viewjob?jk=1", "Engineer", "Acme"));
        assert_eq!(ctl.overlay().count(), 1);

        auth.log_out();
        ctl.on_mutation(&indeed_page("https://www.indeed.com/viewjob?jk=2", "Other", "Acme"));
        assert_eq!(ctl.overlay().count(), 0);
        assert!(!ctl.state().is_authenticated);
    }

    #[test]
    fn reshow_request_reinjects_immediately() {
        let auth = FakeAuth::logged_in();
        let mut ctl = controller(&auth);
        let page = indeed_page("https://www.indeed.com/viewjob?jk=1", "Engineer", "Acme");

        ctl.on_load(&page);
        ctl.overlay_mut().unmount_all();
        assert_eq!(ctl.overlay().count(), 0);

        ctl.request_reshow(&page);
        assert_eq!(ctl.overlay().count(), 1);
    }
}
