//! Integration tests for routing, history and fragment scrolling through the
//! page shell.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::{Duration, Instant};

use campus_view::config::Config;
use campus_view::models::{PageView, PersistedContent, RouteState};
use campus_view::services::{
    LocationHost, MemoryHistory, NavigateOptions, PageShell, ScrollHost, ScrollOutcome,
};

/// Page whose sections mount on demand.
#[derive(Default)]
struct Page {
    mounted: HashSet<String>,
    scrolled_to: Vec<String>,
}

impl Page {
    fn with_sections(ids: &[&str]) -> Self {
        Self {
            mounted: ids.iter().map(ToString::to_string).collect(),
            scrolled_to: Vec::new(),
        }
    }

    fn mount(&mut self, id: &str) {
        self.mounted.insert(id.to_string());
    }
}

impl ScrollHost for Page {
    fn scroll_into_view(&mut self, id: &str) -> bool {
        if self.mounted.contains(id) {
            self.scrolled_to.push(id.to_string());
            true
        } else {
            false
        }
    }
}

fn shell(initial: &str) -> PageShell {
    PageShell::from_config(
        &Config::default(),
        MemoryHistory::new(initial),
        &PersistedContent::defaults(),
    )
    .unwrap()
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_initial_fragment_is_scrolled_on_start() {
    let mut shell = shell("/#admissions");
    let mut page = Page::with_sections(&["admissions"]);

    let outcome = shell.start(&mut page, Instant::now());
    assert_eq!(outcome, ScrollOutcome::Scrolled("admissions".to_string()));
    assert_eq!(shell.view(), PageView::Home);
}

#[test]
fn test_unknown_path_renders_home() {
    let shell = shell("/no-such-page");
    assert_eq!(shell.view(), PageView::Home);
    assert!(shell.header().home_page);
}

#[test]
fn test_back_and_forward_restore_routes() {
    let mut shell = shell("/");
    let mut page = Page::default();
    let now = Instant::now();

    shell.navigate("/view-gallery", NavigateOptions::default(), &mut page, now);
    shell.navigate("/admin", NavigateOptions::default(), &mut page, now);
    assert_eq!(shell.view(), PageView::Admin);

    assert!(shell.router_mut().host_mut().go(-1));
    assert!(shell.pop_state(&mut page, now).is_some());
    assert_eq!(shell.view(), PageView::Gallery);

    assert!(shell.router_mut().host_mut().go(1));
    shell.pop_state(&mut page, now);
    assert_eq!(shell.view(), PageView::Admin);
}

#[test]
fn test_redirect_replaces_history_entry() {
    let mut shell = shell("/");
    let mut page = Page::default();
    let now = Instant::now();

    shell.navigate("/admin", NavigateOptions::default(), &mut page, now);
    shell.navigate("/login", NavigateOptions::replace(), &mut page, now);

    assert_eq!(shell.router().host().entries(), &["/", "/login"]);
    assert!(shell.router_mut().back());
    assert_eq!(shell.view(), PageView::Home);
}

#[test]
fn test_subscribers_see_every_route_change() {
    let mut shell = shell("/");
    let mut page = Page::default();
    let seen: Rc<RefCell<Vec<RouteState>>> = Rc::default();
    let sink = Rc::clone(&seen);
    shell
        .router_mut()
        .on_path_change(move |route| sink.borrow_mut().push(route.clone()));

    let now = Instant::now();
    shell.navigate("/view-gallery", NavigateOptions::default(), &mut page, now);
    assert!(shell
        .navigate("/view-gallery", NavigateOptions::default(), &mut page, now)
        .is_none());
    shell.follow_section_link("contact", &mut page, now);

    let paths: Vec<String> = seen.borrow().iter().map(ToString::to_string).collect();
    assert_eq!(paths, vec!["/view-gallery", "/#contact"]);
}

// ============================================================================
// Fragment scrolling
// ============================================================================

#[test]
fn test_fragment_retry_succeeds_once_section_mounts() {
    let mut shell = shell("/view-gallery");
    let mut page = Page::default();
    let start = Instant::now();

    let outcome = shell.follow_section_link("testimonials", &mut page, start);
    assert_eq!(outcome, ScrollOutcome::RetryScheduled("testimonials".to_string()));

    // Not due yet
    assert_eq!(shell.tick(&mut page, start + Duration::from_millis(50)), None);

    page.mount("testimonials");
    let outcome = shell.tick(&mut page, start + Duration::from_millis(100));
    assert_eq!(outcome, Some(ScrollOutcome::Scrolled("testimonials".to_string())));
    assert_eq!(page.scrolled_to, vec!["testimonials"]);
}

#[test]
fn test_fragment_retry_gives_up_after_one_attempt() {
    let mut shell = shell("/#missing");
    let mut page = Page::default();
    let start = Instant::now();

    assert_eq!(
        shell.start(&mut page, start),
        ScrollOutcome::RetryScheduled("missing".to_string())
    );
    assert_eq!(
        shell.tick(&mut page, start + Duration::from_secs(1)),
        Some(ScrollOutcome::Abandoned("missing".to_string()))
    );
    assert_eq!(shell.tick(&mut page, start + Duration::from_secs(2)), None);
}

#[test]
fn test_new_route_cancels_pending_retry() {
    let mut shell = shell("/");
    let mut page = Page::default();
    let start = Instant::now();

    shell.navigate("#gallery", NavigateOptions::default(), &mut page, start);
    shell.navigate("/admin", NavigateOptions::default(), &mut page, start);

    page.mount("gallery");
    assert_eq!(shell.tick(&mut page, start + Duration::from_secs(1)), None);
    assert!(page.scrolled_to.is_empty());
}
