//! Singleton loader for the third-party widget script.
//!
//! One loader is shared by every hydrator on a page. Its state only moves
//! forward:
//!
//! ```text
//! Unloaded --begin--> Loading --settle(Ok)--> Ready
//!                             \--settle(Err)-> Failed
//! ```
//!
//! Only the first `begin` asks for the script to be injected; everyone else
//! waits and is told the outcome through a subscription.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("widget script {src} failed to load: {reason}")]
    Script { src: String, reason: String },
    #[error("widget script loaded without a widget API")]
    MissingApi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    Unloaded,
    Loading { src: String },
    Ready,
    Failed(LoadError),
}

/// What a caller of [`WidgetLoader::begin`] should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStep {
    /// Inject a script element with this `src`. Returned exactly once.
    Inject(String),
    /// Another caller already started the load.
    Wait,
    Ready,
    Failed(LoadError),
}

pub type LoadResult = Result<(), LoadError>;

/// Called once with the load outcome. Subscribers must not touch the loader.
pub type Subscriber = Box<dyn FnOnce(&LoadResult)>;

pub type SharedLoader = Rc<RefCell<WidgetLoader>>;

pub struct WidgetLoader {
    state: LoaderState,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for WidgetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetLoader")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for WidgetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetLoader {
    pub fn new() -> Self {
        Self {
            state: LoaderState::Unloaded,
            subscribers: Vec::new(),
        }
    }

    pub fn shared() -> SharedLoader {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, LoaderState::Ready | LoaderState::Failed(_))
    }

    /// Request the script.
    pub fn begin(&mut self, src: &str) -> LoadStep {
        match &self.state {
            LoaderState::Unloaded => {
                log::debug!("Loading widget script {src}");
                self.state = LoaderState::Loading {
                    src: src.to_string(),
                };
                LoadStep::Inject(src.to_string())
            }
            LoaderState::Loading { .. } => LoadStep::Wait,
            LoaderState::Ready => LoadStep::Ready,
            LoaderState::Failed(err) => LoadStep::Failed(err.clone()),
        }
    }

    /// Register for the load outcome. If the load has already settled the
    /// callback runs immediately.
    pub fn subscribe(&mut self, subscriber: Subscriber) {
        match &self.state {
            LoaderState::Ready => subscriber(&Ok(())),
            LoaderState::Failed(err) => subscriber(&Err(err.clone())),
            LoaderState::Unloaded | LoaderState::Loading { .. } => {
                self.subscribers.push(subscriber)
            }
        }
    }

    /// Record the outcome of the script load and notify subscribers. Has no
    /// effect unless a load is in progress.
    pub fn settle(&mut self, result: LoadResult) {
        if !matches!(self.state, LoaderState::Loading { .. }) {
            log::debug!("Ignoring widget script result outside of a load");
            return;
        }
        self.state = match &result {
            Ok(()) => LoaderState::Ready,
            Err(err) => {
                log::warn!("Widget script unavailable: {err}");
                LoaderState::Failed(err.clone())
            }
        };
        for subscriber in std::mem::take(&mut self.subscribers) {
            subscriber(&result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    const SRC: &str = "https://platform.example/widgets.js";

    #[test]
    fn test_only_first_request_injects() {
        let mut loader = WidgetLoader::new();
        assert_eq!(loader.begin(SRC), LoadStep::Inject(SRC.to_string()));
        assert_eq!(loader.begin(SRC), LoadStep::Wait);
        assert_eq!(loader.begin(SRC), LoadStep::Wait);
        loader.settle(Ok(()));
        assert_eq!(loader.begin(SRC), LoadStep::Ready);
    }

    #[test]
    fn test_settle_notifies_every_subscriber_once() {
        let calls = Rc::new(Cell::new(0));
        let mut loader = WidgetLoader::new();
        loader.begin(SRC);
        for _ in 0..3 {
            let calls = calls.clone();
            loader.subscribe(Box::new(move |result| {
                assert!(result.is_ok());
                calls.set(calls.get() + 1);
            }));
        }
        loader.settle(Ok(()));
        loader.settle(Ok(()));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_failure_is_sticky() {
        let mut loader = WidgetLoader::new();
        loader.begin(SRC);
        let err = LoadError::Script {
            src: SRC.to_string(),
            reason: "blocked".to_string(),
        };
        loader.settle(Err(err.clone()));
        assert_eq!(loader.state(), &LoaderState::Failed(err.clone()));
        assert_eq!(loader.begin(SRC), LoadStep::Failed(err));
    }

    #[test]
    fn test_late_subscriber_runs_immediately() {
        let mut loader = WidgetLoader::new();
        loader.begin(SRC);
        loader.settle(Ok(()));
        let seen = Rc::new(Cell::new(false));
        let flag = seen.clone();
        loader.subscribe(Box::new(move |result| flag.set(result.is_ok())));
        assert!(seen.get());
    }

    #[test]
    fn test_settle_without_load_is_ignored() {
        let mut loader = WidgetLoader::new();
        loader.settle(Ok(()));
        assert_eq!(loader.state(), &LoaderState::Unloaded);
    }
}
