//! Headless Chrome rendering surface
//!
//! Wraps one `headless_chrome` tab. The library is synchronous, so every call
//! runs on the blocking pool.

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::BrowserConfig;
use crate::surface::{ElementSnapshot, RenderSurface};
use crate::utils::error::RenderError;

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

pub struct ChromeSurface {
    // Dropping the browser kills the Chrome process
    _browser: Browser,
    tab: Arc<Tab>,
    closed: bool,
}

impl ChromeSurface {
    /// Start a browser and open the tab used for the run
    pub async fn launch(config: &BrowserConfig) -> Result<Self, RenderError> {
        let config = config.clone();
        tokio::task::spawn_blocking(move || Self::launch_blocking(&config))
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))?
    }

    fn launch_blocking(config: &BrowserConfig) -> Result<Self, RenderError> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(config.sandbox)
            .window_size(Some((config.window_width, config.window_height)))
            .build()
            .map_err(|e| RenderError::Backend(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(options).map_err(backend)?;
        let tab = browser.new_tab().map_err(backend)?;

        if let Some(user_agent) = &config.user_agent {
            tab.set_user_agent(user_agent, None, None).map_err(backend)?;
        }

        tracing::debug!(headless = config.headless, "Launched Chrome");
        Ok(Self {
            _browser: browser,
            tab,
            closed: false,
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<anyhow::Result<T>, RenderError>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> anyhow::Result<T> + Send + 'static,
    {
        if self.closed {
            return Err(RenderError::Closed);
        }
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || op(&tab))
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))
    }
}

fn backend(err: anyhow::Error) -> RenderError {
    RenderError::Backend(format!("{err:#}"))
}

#[async_trait]
impl RenderSurface for ChromeSurface {
    async fn navigate(&mut self, url: &Url) -> Result<(), RenderError> {
        let target = url.to_string();
        self.blocking(move |tab| {
            tab.navigate_to(&target)?;
            Ok(())
        })
        .await?
        .map_err(|e| RenderError::Navigation(format!("{url}: {e:#}")))
    }

    async fn wait_for_load(&mut self, timeout: Duration) -> Result<(), RenderError> {
        self.blocking(move |tab| {
            tab.set_default_timeout(timeout);
            tab.wait_until_navigated()?;
            Ok(())
        })
        .await?
        .map_err(|_| RenderError::timeout("page load", timeout.as_millis() as u64))
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        let target = selector.to_string();
        self.blocking(move |tab| {
            tab.wait_for_element_with_custom_timeout(&target, timeout)?;
            Ok(())
        })
        .await?
        .map_err(|_| RenderError::timeout(selector, timeout.as_millis() as u64))
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementSnapshot>, RenderError> {
        let target = selector.to_string();
        let found = self
            .blocking(move |tab| {
                // No match is an error in headless_chrome; treat it as empty
                let Ok(elements) = tab.find_elements(&target) else {
                    return Ok(Vec::new());
                };
                elements
                    .iter()
                    .map(|element| element.get_content().map(ElementSnapshot::new))
                    .collect::<anyhow::Result<Vec<_>>>()
            })
            .await?;
        found.map_err(backend)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        self.blocking(|tab| {
            tab.evaluate(SCROLL_SCRIPT, false)?;
            Ok(())
        })
        .await?
        .map_err(|e| RenderError::Script(format!("{e:#}")))
    }

    async fn click(&mut self, selector: &str) -> Result<(), RenderError> {
        let target = selector.to_string();
        let found = self
            .blocking(move |tab| Ok(tab.find_element(&target).ok().map(|el| el.click().map(|_| ()))))
            .await?
            .map_err(backend)?;

        match found {
            Some(clicked) => clicked.map_err(backend),
            None => Err(RenderError::ElementNotFound(selector.to_string())),
        }
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        if self.closed {
            return Ok(());
        }
        let result = self
            .blocking(|tab| {
                tab.close(true)?;
                Ok(())
            })
            .await?;
        self.closed = true;
        result.map_err(backend)
    }
}
