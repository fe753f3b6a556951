/*!
 * # Embed Hydration
 *
 * After persisted HTML is put into a live page, social embed placeholders are
 * still inert. The [`Hydrator`] walks them in document order and replaces each
 * one with a live widget, exactly once.
 *
 * ## Flow per placeholder
 *
 * 1. Skip it if the [`ProcessedSet`] or the DOM flag says it was handled.
 * 2. Record it as processed and flag it in the DOM, before anything else.
 * 3. No post id: show the invalid marker and stop.
 * 4. Show the loading state and wait for the shared widget script
 *    ([`WidgetLoader`]).
 * 5. Ask the [`WidgetProvider`] to mount the widget. The result may come back
 *    at once or later through [`Hydrator::complete`], in any order.
 * 6. Success shows the widget. Failure shows the [`FallbackCard`].
 *
 * Results that arrive for tickets the hydrator does not know, or for
 * placeholders that have left the page, are dropped.
 *
 * The page is reached only through [`EmbedHost`]. [`HtmlHost`] implements it
 * over an owned HTML tree, which is what the CLI and the tests use.
 */

mod fallback;
mod host;
mod loader;
mod processed;
mod view;

pub use fallback::{FALLBACK_ATTR, FallbackCard};
pub use host::{ElementPath, HtmlHost, STATE_ATTR, hydrate_static, hydrate_static_with};
pub use loader::{LoadError, LoadResult, LoadStep, LoaderState, SharedLoader, WidgetLoader};
pub use processed::ProcessedSet;
pub use view::ContentView;

use crate::extensions::social_embed;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_SCRIPT_SRC: &str = "https://platform.twitter.com/widgets.js";

static NEXT_HYDRATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one mount request. Tickets are unique across hydrators, so a
/// result meant for replaced content never matches a current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountTicket {
    hydrator: u64,
    seq: u64,
}

/// Markup of a mounted widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetMarkup(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
    #[error("network error: {0}")]
    Network(String),
    #[error("provider rate limit reached")]
    RateLimited,
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    ScriptUnavailable(#[from] LoadError),
}

pub type MountResult = Result<WidgetMarkup, MountError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountPoll {
    Ready(MountResult),
    /// The result will be delivered through [`Hydrator::complete`].
    Pending,
}

/// Remote widget provider.
pub trait WidgetProvider {
    fn mount(&mut self, ticket: MountTicket, external_id: &str) -> MountPoll;
}

impl<F> WidgetProvider for F
where
    F: FnMut(MountTicket, &str) -> MountPoll,
{
    fn mount(&mut self, ticket: MountTicket, external_id: &str) -> MountPoll {
        self(ticket, external_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<K> {
    pub key: K,
    pub external_id: Option<String>,
    /// Already carries the processed flag in the page.
    pub flagged: bool,
}

/// The live page as seen by the hydrator.
pub trait EmbedHost {
    type Key: Clone + Eq + Hash + Debug;

    /// Placeholders in document order.
    fn placeholders(&self) -> Vec<Placeholder<Self::Key>>;
    fn flag_processed(&mut self, key: &Self::Key);
    /// Whether the placeholder is still part of the page.
    fn is_attached(&self, key: &Self::Key) -> bool;
    fn show_loading(&mut self, key: &Self::Key);
    fn show_invalid(&mut self, key: &Self::Key);
    fn show_widget(&mut self, key: &Self::Key, widget: &WidgetMarkup);
    fn show_fallback(&mut self, key: &Self::Key, card: &FallbackCard);
    fn inject_script(&mut self, src: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratorOptions {
    pub script_src: String,
    pub canonical_base: String,
}

impl Default for HydratorOptions {
    fn default() -> Self {
        Self {
            script_src: DEFAULT_SCRIPT_SRC.to_string(),
            canonical_base: social_embed::CANONICAL_BASE.to_string(),
        }
    }
}

/// Counts for one hydration call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationReport {
    pub scanned: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub mount_attempts: usize,
    /// Placeholders waiting for the widget script after this call.
    pub waiting: usize,
    pub mounted: usize,
    pub fallbacks: usize,
}

pub struct Hydrator<K, P = HashSet<K>> {
    id: u64,
    options: HydratorOptions,
    processed: P,
    loader: SharedLoader,
    next_seq: u64,
    awaiting_script: Vec<(K, String)>,
    in_flight: HashMap<MountTicket, (K, String)>,
    inbox: Rc<RefCell<Option<LoadResult>>>,
    subscribed: bool,
}

impl<K: Clone + Eq + Hash + Debug> Hydrator<K> {
    pub fn new(loader: SharedLoader) -> Self {
        Self::with_processed(loader, HydratorOptions::default(), HashSet::new())
    }

    pub fn with_options(loader: SharedLoader, options: HydratorOptions) -> Self {
        Self::with_processed(loader, options, HashSet::new())
    }
}

impl<K, P> Hydrator<K, P>
where
    K: Clone + Eq + Hash + Debug,
    P: ProcessedSet<K>,
{
    pub fn with_processed(loader: SharedLoader, options: HydratorOptions, processed: P) -> Self {
        Self {
            id: NEXT_HYDRATOR_ID.fetch_add(1, Ordering::Relaxed),
            options,
            processed,
            loader,
            next_seq: 0,
            awaiting_script: Vec::new(),
            in_flight: HashMap::new(),
            inbox: Rc::new(RefCell::new(None)),
            subscribed: false,
        }
    }

    pub fn processed(&self) -> &P {
        &self.processed
    }

    /// Mount requests still waiting for a result.
    pub fn pending_mounts(&self) -> Vec<MountTicket> {
        let mut tickets: Vec<MountTicket> = self.in_flight.keys().copied().collect();
        tickets.sort();
        tickets
    }

    pub fn waiting_for_script(&self) -> usize {
        self.awaiting_script.len()
    }

    /// Run a hydration pass over every placeholder in the host.
    pub fn hydrate<H, W>(&mut self, host: &mut H, provider: &mut W) -> HydrationReport
    where
        H: EmbedHost<Key = K>,
        W: WidgetProvider + ?Sized,
    {
        let mut report = HydrationReport::default();
        for placeholder in host.placeholders() {
            report.scanned += 1;
            if placeholder.flagged || self.processed.contains(&placeholder.key) {
                report.skipped += 1;
                continue;
            }
            self.processed.insert(placeholder.key.clone());
            host.flag_processed(&placeholder.key);

            match placeholder.external_id {
                None => {
                    log::debug!("Placeholder {:?} has no post id", placeholder.key);
                    host.show_invalid(&placeholder.key);
                    report.invalid += 1;
                }
                Some(id) => {
                    host.show_loading(&placeholder.key);
                    self.awaiting_script.push((placeholder.key, id));
                }
            }
        }

        if !self.awaiting_script.is_empty() {
            let step = self.loader.borrow_mut().begin(&self.options.script_src);
            match step {
                LoadStep::Inject(src) => {
                    host.inject_script(&src);
                    self.subscribe();
                }
                LoadStep::Wait => self.subscribe(),
                LoadStep::Ready => self.dispatch(host, provider, &mut report),
                LoadStep::Failed(err) => self.fail_waiting(host, &err, &mut report),
            }
        }
        report.waiting = self.awaiting_script.len();
        report
    }

    /// Handle a widget script outcome that arrived since the last call.
    pub fn pump<H, W>(&mut self, host: &mut H, provider: &mut W) -> HydrationReport
    where
        H: EmbedHost<Key = K>,
        W: WidgetProvider + ?Sized,
    {
        let mut report = HydrationReport::default();
        let delivered = self.inbox.borrow_mut().take();
        let outcome = delivered.or_else(|| match self.loader.borrow().state() {
            LoaderState::Ready => Some(Ok(())),
            LoaderState::Failed(err) => Some(Err(err.clone())),
            LoaderState::Unloaded | LoaderState::Loading { .. } => None,
        });
        if let Some(outcome) = outcome {
            self.subscribed = false;
            match outcome {
                Ok(()) => self.dispatch(host, provider, &mut report),
                Err(err) => self.fail_waiting(host, &err, &mut report),
            }
        }
        report.waiting = self.awaiting_script.len();
        report
    }

    /// Deliver the result of a pending mount. Returns false if the result was
    /// dropped because the ticket is unknown or the placeholder is gone.
    pub fn complete<H>(&mut self, host: &mut H, ticket: MountTicket, result: MountResult) -> bool
    where
        H: EmbedHost<Key = K>,
    {
        let Some((key, id)) = self.in_flight.remove(&ticket) else {
            log::debug!("Dropping result for unknown mount {ticket:?}");
            return false;
        };
        if !host.is_attached(&key) {
            log::debug!("Dropping result for detached placeholder {key:?}");
            return false;
        }
        let mut report = HydrationReport::default();
        self.finish(host, &key, &id, result, &mut report);
        true
    }

    fn subscribe(&mut self) {
        if self.subscribed {
            return;
        }
        self.subscribed = true;
        let inbox = self.inbox.clone();
        self.loader
            .borrow_mut()
            .subscribe(Box::new(move |result| *inbox.borrow_mut() = Some(result.clone())));
    }

    fn next_ticket(&mut self) -> MountTicket {
        self.next_seq += 1;
        MountTicket {
            hydrator: self.id,
            seq: self.next_seq,
        }
    }

    fn dispatch<H, W>(&mut self, host: &mut H, provider: &mut W, report: &mut HydrationReport)
    where
        H: EmbedHost<Key = K>,
        W: WidgetProvider + ?Sized,
    {
        for (key, id) in std::mem::take(&mut self.awaiting_script) {
            if !host.is_attached(&key) {
                log::debug!("Placeholder {key:?} left the page before mounting");
                continue;
            }
            let ticket = self.next_ticket();
            report.mount_attempts += 1;
            match provider.mount(ticket, &id) {
                MountPoll::Ready(result) => self.finish(host, &key, &id, result, report),
                MountPoll::Pending => {
                    self.in_flight.insert(ticket, (key, id));
                }
            }
        }
    }

    fn fail_waiting<H>(&mut self, host: &mut H, err: &LoadError, report: &mut HydrationReport)
    where
        H: EmbedHost<Key = K>,
    {
        for (key, id) in std::mem::take(&mut self.awaiting_script) {
            if host.is_attached(&key) {
                let result = Err(MountError::ScriptUnavailable(err.clone()));
                self.finish(host, &key, &id, result, report);
            }
        }
    }

    fn finish<H>(
        &mut self,
        host: &mut H,
        key: &K,
        id: &str,
        result: MountResult,
        report: &mut HydrationReport,
    ) where
        H: EmbedHost<Key = K>,
    {
        match result {
            Ok(widget) => {
                host.show_widget(key, &widget);
                report.mounted += 1;
            }
            Err(err) => {
                log::warn!("Post {id} could not be embedded: {err}");
                host.show_fallback(key, &FallbackCard::new(id, &self.options.canonical_base));
                report.fallbacks += 1;
            }
        }
    }
}
