use std::time::Duration;

use crate::models::{JobData, User};

/// Class marker on the injected root element. Namespaced so host-page styles
/// and queries cannot collide with it.
pub const OVERLAY_CLASS: &str = "appli-stash-overlay";

/// How long the save button shows "Saved!" before reverting.
pub const SAVED_REVERT_AFTER: Duration = Duration::from_secs(3);

/// Transient state of the overlay's save button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveButtonState {
    #[default]
    Idle,
    Saving,
    Saved,
}

impl SaveButtonState {
    pub fn label(self) -> &'static str {
        match self {
            SaveButtonState::Idle => "Save to AppliStash",
            SaveButtonState::Saving => "Saving...",
            SaveButtonState::Saved => "Saved!",
        }
    }
}

/// One floating panel showing the extracted job and the save action.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub job: JobData,
    pub user_name: String,
    pub save_state: SaveButtonState,
}

impl Overlay {
    pub fn new(job: JobData, user: &User) -> Self {
        Self {
            job,
            user_name: user.name.clone(),
            save_state: SaveButtonState::Idle,
        }
    }

    pub fn begin_save(&mut self) {
        self.save_state = SaveButtonState::Saving;
    }

    pub fn finish_save(&mut self) {
        self.save_state = SaveButtonState::Saved;
    }

    /// Called once `SAVED_REVERT_AFTER` has elapsed.
    pub fn revert_save(&mut self) {
        self.save_state = SaveButtonState::Idle;
    }

    /// Render the panel subtree as HTML, fixed-positioned over the host page.
    pub fn render(&self) -> String {
        format!(
            concat!(
                r#"<div class="{class}" style="position:fixed;bottom:20px;right:20px;z-index:2147483647">"#,
                r#"<div class="{class}-title">{title}</div>"#,
                r#"<div class="{class}-company">{company}</div>"#,
                r#"<div class="{class}-location">{location}</div>"#,
                r#"<button class="{class}-save">{save}</button>"#,
                r#"<div class="{class}-user">Logged in as {user}</div>"#,
                "</div>"
            ),
            class = OVERLAY_CLASS,
            title = escape_html(&self.job.title),
            company = escape_html(&self.job.company),
            location = escape_html(&self.job.location),
            save = self.save_state.label(),
            user = escape_html(&self.user_name),
        )
    }
}

/// The extension-owned children of `document.body`. Mounting always removes
/// prior instances first, so at most one overlay element exists at any time.
#[derive(Default)]
pub struct OverlayHost {
    mounted: Vec<Overlay>,
}

impl OverlayHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, overlay: Overlay) {
        self.unmount_all();
        self.mounted.push(overlay);
    }

    pub fn unmount_all(&mut self) {
        self.mounted.clear();
    }

    pub fn count(&self) -> usize {
        self.mounted.len()
    }

    pub fn current(&self) -> Option<&Overlay> {
        self.mounted.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Overlay> {
        self.mounted.last_mut()
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, company: &str) -> JobData {
        JobData {
            title: title.to_string(),
            company: company.to_string(),
            location: "Denver, CO".to_string(),
            description: String::new(),
            url: "https://example.com/jobs/1".to_string(),
            source: "Generic".to_string(),
        }
    }

    fn user() -> User {
        User {
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            token: None,
        }
    }

    #[test]
    fn mount_replaces_instead_of_stacking() {
        let mut host = OverlayHost::new();
        for i in 0..5 {
            host.mount(Overlay::new(job(&format!("Job {i}"), "Acme"), &user()));
            assert_eq!(host.count(), 1);
        }
        assert_eq!(host.current().unwrap().job.title, "Job 4");
    }

    #[test]
    fn render_escapes_page_controlled_text() {
        let overlay = Overlay::new(job("<script>alert(1)</script>", "A & B"), &user());
        let html = overlay.render();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A &amp; B"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains(OVERLAY_CLASS));
    }

    #[test]
    fn save_button_walks_its_states() {
        let mut overlay = Overlay::new(job("Engineer", "Acme"), &user());
        assert_eq!(overlay.save_state.label(), "Save to AppliStash");
        overlay.begin_save();
        assert_eq!(overlay.save_state.label(), "Saving...");
        overlay.finish_save();
        assert_eq!(overlay.save_state.label(), "Saved!");
        overlay.revert_save();
        assert_eq!(overlay.save_state, SaveButtonState::Idle);
    }
}
