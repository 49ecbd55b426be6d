//! Capture dispatcher.
//!
//! Decides, per tab, whether to inject the capture agent. Tab queries and
//! script injection belong to the host browser and sit behind [`TabHost`].
//!
//! ### Rules
//! - Nothing is injected unless capture is enabled.
//! - Only `http`/`https` tabs are injected.
//! - A tab that finishes loading, or becomes active, gets the agent.
//! - Injection failures (restricted pages) are logged and skipped.

pub mod url;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tabbear_core::SessionState;

pub use self::url::{UrlError, is_injectable_url, parse_page_url};

/// Tab load status that triggers injection.
pub const STATUS_COMPLETE: &str = "complete";

/// What the host reports about a tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabInfo {
    pub id: Option<u32>,
    pub url: Option<String>,
}

/// Errors reported by the tab host.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    #[error("INJECT_FAILED: tab {tab_id}: {reason}")]
    InjectFailed { tab_id: u32, reason: String },
}

/// Browser-side tab operations.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// All open tabs.
    async fn tabs(&self) -> Vec<TabInfo>;

    /// Look up one tab.
    async fn tab(&self, tab_id: u32) -> Option<TabInfo>;

    /// Run the capture agent in a tab.
    async fn inject(&self, tab_id: u32) -> Result<(), DispatchError>;

    /// Tell a tab's agent to stop and remove its indicator.
    async fn deactivate(&self, tab_id: u32);
}

/// Tracks whether capture is on and injects agents accordingly.
pub struct CaptureDispatcher<H> {
    host: H,
    enabled: AtomicBool,
}

impl<H: TabHost> CaptureDispatcher<H> {
    pub fn new(host: H) -> Self {
        Self { host, enabled: AtomicBool::new(false) }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turn capture on and inject into every eligible open tab.
    ///
    /// Returns the number of tabs injected; `0` if capture was already on.
    pub async fn enable(&self) -> usize {
        if self.enabled.swap(true, Ordering::SeqCst) {
            return 0;
        }

        let mut injected = 0;
        for tab in self.host.tabs().await {
            let Some(id) = tab.id else { continue };
            if is_injectable_url(tab.url.as_deref()) && self.try_inject(id).await {
                injected += 1;
            }
        }
        tracing::info!(injected, "capture enabled");
        injected
    }

    /// Turn capture off and deactivate the agent in every tab.
    pub async fn disable(&self) {
        if !self.enabled.swap(false, Ordering::SeqCst) {
            return;
        }

        let tabs = self.host.tabs().await;
        for id in tabs.iter().filter_map(|t| t.id) {
            self.host.deactivate(id).await;
        }
        tracing::info!(tabs = tabs.len(), "capture disabled");
    }

    /// Enable or disable to match the session flag.
    pub async fn sync_with(&self, state: &SessionState) {
        if state.active {
            self.enable().await;
        } else {
            self.disable().await;
        }
    }

    /// A tab changed. Injects when it finished loading an eligible page.
    pub async fn on_tab_updated(&self, tab_id: u32, status: Option<&str>, url: Option<&str>) -> bool {
        if !self.is_enabled() || status != Some(STATUS_COMPLETE) || !is_injectable_url(url) {
            return false;
        }
        self.try_inject(tab_id).await
    }

    /// A tab became active. Injects when it shows an eligible page.
    pub async fn on_tab_activated(&self, tab_id: u32) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let Some(tab) = self.host.tab(tab_id).await else {
            return false;
        };
        if !is_injectable_url(tab.url.as_deref()) {
            return false;
        }
        self.try_inject(tab_id).await
    }

    async fn try_inject(&self, tab_id: u32) -> bool {
        match self.host.inject(tab_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("skipping tab: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeHost {
        tabs: Vec<TabInfo>,
        blocked: Vec<u32>,
        injected: Mutex<Vec<u32>>,
        deactivated: Mutex<Vec<u32>>,
    }

    impl FakeHost {
        fn with_tabs(tabs: &[(Option<u32>, Option<&str>)]) -> Self {
            Self {
                tabs: tabs
                    .iter()
                    .map(|(id, url)| TabInfo { id: *id, url: url.map(str::to_string) })
                    .collect(),
                ..Default::default()
            }
        }

        fn injected(&self) -> Vec<u32> {
            self.injected.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TabHost for FakeHost {
        async fn tabs(&self) -> Vec<TabInfo> {
            self.tabs.clone()
        }

        async fn tab(&self, tab_id: u32) -> Option<TabInfo> {
            self.tabs.iter().find(|t| t.id == Some(tab_id)).cloned()
        }

        async fn inject(&self, tab_id: u32) -> Result<(), DispatchError> {
            if self.blocked.contains(&tab_id) {
                return Err(DispatchError::InjectFailed { tab_id, reason: "restricted".into() });
            }
            self.injected.lock().unwrap().push(tab_id);
            Ok(())
        }

        async fn deactivate(&self, tab_id: u32) {
            self.deactivated.lock().unwrap().push(tab_id);
        }
    }

    #[tokio::test]
    async fn test_enable_injects_eligible_tabs() {
        let host = FakeHost::with_tabs(&[
            (Some(1), Some("https://a.com")),
            (Some(2), Some("chrome://newtab")),
            (None, Some("https://b.com")),
            (Some(3), None),
            (Some(4), Some("http://c.com")),
        ]);
        let dispatcher = CaptureDispatcher::new(host);

        assert_eq!(dispatcher.enable().await, 2);
        assert_eq!(dispatcher.host().injected(), vec![1, 4]);

        assert_eq!(dispatcher.enable().await, 0);
        assert_eq!(dispatcher.host().injected(), vec![1, 4]);
    }

    #[tokio::test]
    async fn test_injection_failures_are_skipped() {
        let mut host = FakeHost::with_tabs(&[(Some(1), Some("https://a.com")), (Some(2), Some("https://b.com"))]);
        host.blocked = vec![1];
        let dispatcher = CaptureDispatcher::new(host);

        assert_eq!(dispatcher.enable().await, 1);
        assert_eq!(dispatcher.host().injected(), vec![2]);
    }

    #[tokio::test]
    async fn test_disable_deactivates_all_tabs() {
        let host = FakeHost::with_tabs(&[(Some(1), Some("https://a.com")), (Some(2), Some("chrome://x")), (None, None)]);
        let dispatcher = CaptureDispatcher::new(host);

        dispatcher.disable().await;
        assert!(dispatcher.host().deactivated.lock().unwrap().is_empty());

        dispatcher.enable().await;
        dispatcher.disable().await;
        assert_eq!(*dispatcher.host().deactivated.lock().unwrap(), vec![1, 2]);
        assert!(!dispatcher.is_enabled());
    }

    #[tokio::test]
    async fn test_tab_updated_rules() {
        let dispatcher = CaptureDispatcher::new(FakeHost::default());

        assert!(!dispatcher.on_tab_updated(7, Some("complete"), Some("https://a.com")).await);

        dispatcher.enable().await;
        assert!(!dispatcher.on_tab_updated(7, Some("loading"), Some("https://a.com")).await);
        assert!(!dispatcher.on_tab_updated(7, None, Some("https://a.com")).await);
        assert!(!dispatcher.on_tab_updated(7, Some("complete"), Some("about:blank")).await);
        assert!(dispatcher.on_tab_updated(7, Some("complete"), Some("https://a.com")).await);
        assert_eq!(dispatcher.host().injected(), vec![7]);
    }

    #[tokio::test]
    async fn test_tab_activated_rules() {
        let host = FakeHost::with_tabs(&[(Some(1), Some("https://a.com")), (Some(2), Some("chrome://x"))]);
        let dispatcher = CaptureDispatcher::new(host);
        dispatcher.enable().await;
        dispatcher.host().injected.lock().unwrap().clear();

        assert!(dispatcher.on_tab_activated(1).await);
        assert!(!dispatcher.on_tab_activated(2).await);
        assert!(!dispatcher.on_tab_activated(99).await);
        assert_eq!(dispatcher.host().injected(), vec![1]);
    }

    #[tokio::test]
    async fn test_sync_with_session_state() {
        let host = FakeHost::with_tabs(&[(Some(1), Some("https://a.com"))]);
        let dispatcher = CaptureDispatcher::new(host);

        dispatcher.sync_with(&SessionState { active: true, pages_count: 0, start_time: Some(1) }).await;
        assert!(dispatcher.is_enabled());

        dispatcher.sync_with(&SessionState { active: false, pages_count: 0, start_time: None }).await;
        assert!(!dispatcher.is_enabled());
    }
}
