use folio_engine::extensions::social_embed;
use folio_engine::hydrate::{
    ContentView, EmbedHost, FallbackCard, HtmlHost, Hydrator, HydratorOptions, LoadError,
    MountError, MountPoll, MountTicket, WidgetLoader, WidgetMarkup, hydrate_static,
};
use folio_engine::{Document, Node, to_html};
use pretty_assertions::assert_eq;
use std::cell::Cell;

fn page() -> String {
    to_html(&Document::new(vec![
        Node::paragraph("Three posts:"),
        social_embed::create("1790123456789012345").unwrap(),
        social_embed::create("20").unwrap(),
        Node::paragraph("and one more"),
        social_embed::create("31").unwrap(),
    ]))
}

#[test]
fn repeated_hydration_mounts_each_placeholder_once() {
    let loader = WidgetLoader::shared();
    let mut host = HtmlHost::new(&page());
    let mut hydrator = Hydrator::new(loader.clone());
    let calls = Cell::new(0);
    let mut provider = |_: MountTicket, id: &str| {
        calls.set(calls.get() + 1);
        MountPoll::Ready(Ok(WidgetMarkup(format!("<iframe title=\"{id}\"></iframe>"))))
    };

    for _ in 0..3 {
        hydrator.hydrate(&mut host, &mut provider);
    }
    loader.borrow_mut().settle(Ok(()));
    hydrator.pump(&mut host, &mut provider);
    hydrator.pump(&mut host, &mut provider);
    let report = hydrator.hydrate(&mut host, &mut provider);

    assert_eq!(calls.get(), 3);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.mount_attempts, 0);
    assert_eq!(host.scripts().len(), 1);
}

#[test]
fn flagged_page_is_not_rehydrated_by_a_new_hydrator() {
    let loader = WidgetLoader::shared();
    loader.borrow_mut().begin(folio_engine::hydrate::DEFAULT_SCRIPT_SRC);
    loader.borrow_mut().settle(Ok(()));

    let mut host = HtmlHost::new(&page());
    let calls = Cell::new(0);
    let mut provider = |_: MountTicket, _: &str| {
        calls.set(calls.get() + 1);
        MountPoll::Ready(Ok(WidgetMarkup("<iframe></iframe>".to_string())))
    };
    Hydrator::new(loader.clone()).hydrate(&mut host, &mut provider);

    let mut reloaded = HtmlHost::new(&host.to_html());
    let report = Hydrator::new(loader).hydrate(&mut reloaded, &mut provider);
    assert_eq!(report.skipped, 3);
    assert_eq!(calls.get(), 3);
}

#[test]
fn content_view_hydrates_once_per_content() {
    let calls = Cell::new(0);
    let provider = |_: MountTicket, _: &str| {
        calls.set(calls.get() + 1);
        MountPoll::Pending
    };
    let loader = WidgetLoader::shared();
    let (mut view, _) = ContentView::new(&page(), loader.clone(), HydratorOptions::default(), provider);
    for _ in 0..3 {
        assert!(view.update(&page()).is_none());
    }
    loader.borrow_mut().settle(Ok(()));
    view.pump();
    view.pump();
    assert_eq!(calls.get(), 3);
}

#[test]
fn fallback_is_deterministic() {
    let loader = WidgetLoader::shared();
    let render_failure = |error: MountError| {
        let loader = loader.clone();
        if matches!(loader.borrow().state(), folio_engine::hydrate::LoaderState::Unloaded) {
            loader.borrow_mut().begin(folio_engine::hydrate::DEFAULT_SCRIPT_SRC);
            loader.borrow_mut().settle(Ok(()));
        }
        let mut host = HtmlHost::new(&page());
        let mut hydrator = Hydrator::new(loader);
        hydrator.hydrate(&mut host, &mut |_: MountTicket, _: &str| {
            MountPoll::Ready(Err(error.clone()))
        });
        host.to_html()
    };

    let network = render_failure(MountError::Network("connection reset".to_string()));
    let limited = render_failure(MountError::RateLimited);
    let missing = render_failure(MountError::NotFound);
    assert_eq!(network, limited);
    assert_eq!(limited, missing);

    let card = FallbackCard::new("20", social_embed::CANONICAL_BASE);
    assert!(network.contains(&card.to_html()));
    assert!(network.contains(r#"href="https://x.com/i/status/1790123456789012345""#));
}

#[test]
fn script_failure_matches_mount_failure_output() {
    let loader = WidgetLoader::shared();
    let mut host = HtmlHost::new(&page());
    let mut hydrator = Hydrator::new(loader.clone());
    let mut provider = |_: MountTicket, _: &str| MountPoll::Pending;
    hydrator.hydrate(&mut host, &mut provider);
    loader.borrow_mut().settle(Err(LoadError::MissingApi));
    let report = hydrator.pump(&mut host, &mut provider);
    assert_eq!(report.fallbacks, 3);

    let static_html = hydrate_static(&page());
    let cards = |html: &str| html.matches("data-embed-fallback").count();
    assert_eq!(cards(&host.to_html()), cards(&static_html));
}

#[test]
fn invalid_placeholder_never_mounts() {
    let loader = WidgetLoader::shared();
    let html = r#"<div data-social-embed="" data-embed-kind="social" data-embed-id=" "></div>"#;
    let mut host = HtmlHost::new(html);
    let calls = Cell::new(0);
    let report = Hydrator::new(loader).hydrate(&mut host, &mut |_: MountTicket, _: &str| {
        calls.set(calls.get() + 1);
        MountPoll::Pending
    });
    assert_eq!(report.invalid, 1);
    assert_eq!(calls.get(), 0);
    assert!(host.scripts().is_empty());
    assert!(host.placeholders()[0].flagged);
    assert!(host.to_html().contains(social_embed::INVALID_MESSAGE));
}
