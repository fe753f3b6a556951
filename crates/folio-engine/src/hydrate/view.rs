use super::{
    ElementPath, EmbedHost, HtmlHost, HydrationReport, Hydrator, HydratorOptions, MountResult,
    MountTicket, SharedLoader, WidgetProvider,
};

/// Rendered content plus the hydrator that owns its placeholders.
///
/// Hydration runs once per distinct content value. Rendering the same
/// content again leaves the page alone; new content gets a fresh page and a
/// fresh hydrator, so results still in flight for the old content are
/// dropped when they arrive.
pub struct ContentView<P> {
    content: String,
    host: HtmlHost,
    hydrator: Hydrator<ElementPath>,
    loader: SharedLoader,
    options: HydratorOptions,
    provider: P,
}

impl<P: WidgetProvider> ContentView<P> {
    pub fn new(
        content: &str,
        loader: SharedLoader,
        options: HydratorOptions,
        provider: P,
    ) -> (Self, HydrationReport) {
        let mut view = Self {
            content: content.to_string(),
            host: HtmlHost::new(content),
            hydrator: Hydrator::with_options(loader.clone(), options.clone()),
            loader,
            options,
            provider,
        };
        let report = view.hydrator.hydrate(&mut view.host, &mut view.provider);
        (view, report)
    }

    /// Render `content`. Returns `None` when it equals the current content.
    pub fn update(&mut self, content: &str) -> Option<HydrationReport> {
        if content == self.content {
            log::debug!("Content unchanged, skipping hydration");
            return None;
        }
        self.content = content.to_string();
        self.host = HtmlHost::new(content);
        self.hydrator = Hydrator::with_options(self.loader.clone(), self.options.clone());
        Some(self.hydrator.hydrate(&mut self.host, &mut self.provider))
    }

    pub fn pump(&mut self) -> HydrationReport {
        self.hydrator.pump(&mut self.host, &mut self.provider)
    }

    pub fn complete(&mut self, ticket: MountTicket, result: MountResult) -> bool {
        self.hydrator.complete(&mut self.host, ticket, result)
    }

    pub fn pending_mounts(&self) -> Vec<MountTicket> {
        self.hydrator.pending_mounts()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn host(&self) -> &HtmlHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut HtmlHost {
        &mut self.host
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn html(&self) -> String {
        self.host.to_html()
    }

    /// Placeholders on the current page that have not been handled.
    pub fn unprocessed(&self) -> usize {
        self.host
            .placeholders()
            .iter()
            .filter(|placeholder| !placeholder.flagged)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrate::{MountPoll, WidgetLoader, WidgetMarkup};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const CONTENT: &str = r#"<p>before</p><div data-social-embed="" data-embed-kind="social" data-embed-id="9"></div>"#;

    #[derive(Default)]
    struct Spy {
        calls: HashMap<String, usize>,
        pending: bool,
    }

    impl WidgetProvider for Spy {
        fn mount(&mut self, _ticket: MountTicket, external_id: &str) -> MountPoll {
            *self.calls.entry(external_id.to_string()).or_default() += 1;
            if self.pending {
                MountPoll::Pending
            } else {
                MountPoll::Ready(Ok(WidgetMarkup(format!("<iframe title=\"{external_id}\"></iframe>"))))
            }
        }
    }

    fn ready_loader() -> SharedLoader {
        let loader = WidgetLoader::shared();
        loader.borrow_mut().begin(crate::hydrate::DEFAULT_SCRIPT_SRC);
        loader.borrow_mut().settle(Ok(()));
        loader
    }

    #[test]
    fn test_identical_content_mounts_once() {
        let (mut view, report) =
            ContentView::new(CONTENT, ready_loader(), HydratorOptions::default(), Spy::default());
        assert_eq!(report.mounted, 1);

        assert_eq!(view.update(CONTENT), None);
        assert_eq!(view.update(CONTENT), None);
        view.pump();

        assert_eq!(view.provider().calls.get("9"), Some(&1));
        assert_eq!(view.unprocessed(), 0);
        assert!(view.html().contains(r#"data-embed-state="ready""#));
    }

    #[test]
    fn test_new_content_hydrates_again() {
        let (mut view, _) =
            ContentView::new(CONTENT, ready_loader(), HydratorOptions::default(), Spy::default());
        let changed = CONTENT.replace("before", "after");
        let report = view.update(&changed).unwrap();
        assert_eq!(report.mounted, 1);
        assert_eq!(view.content(), changed);
        assert_eq!(view.provider().calls.get("9"), Some(&2));
    }

    #[test]
    fn test_late_result_for_replaced_content_is_dropped() {
        let spy = Spy {
            pending: true,
            ..Spy::default()
        };
        let (mut view, _) = ContentView::new(CONTENT, ready_loader(), HydratorOptions::default(), spy);
        let stale = view.pending_mounts()[0];

        view.update("<p>no embeds here</p>");
        let accepted = view.complete(stale, Ok(WidgetMarkup("<b>stale</b>".to_string())));

        assert!(!accepted);
        assert!(!view.html().contains("stale"));
    }
}
