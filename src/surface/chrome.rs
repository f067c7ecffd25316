//! Chromium backend over the DevTools protocol
//!
//! Wraps an async chromiumoxide page behind the synchronous [`Surface`]
//! trait; every call is driven to completion on an owned tokio runtime.

use std::cell::Cell;
use std::future::Future;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::config::{AutomationSettings, Point, ViewportGeometry};
use crate::perception::text;

use super::{PointerAction, Surface, SurfaceError};

/// Mobile client; the game lays itself out for this
const USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";

/// localStorage key family holding the session token
const TOKEN_KEY_PREFIX: &str = "nova-link-auth-token";
const TOKEN_KEY_DEFAULT: &str = "nova-link-auth-token-5g7WL0v8820py9fB";
const TOKEN_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;

const GAME_READY_POLLS: u32 = 25;
const HOME_READY_POLLS: u32 = 5;
const READY_POLL_MS: u64 = 1000;
const PAGE_SETTLE_MS: u64 = 1000;

/// Longest element label kept by `element_labels`
const MAX_LABEL_LEN: usize = 32;

/// A Chromium page sized to the canonical viewport
pub struct ChromeSurface {
    runtime: Runtime,
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    cursor: Cell<Point>,
    held: Cell<bool>,
}

impl ChromeSurface {
    /// Launch Chromium, inject the session token, and wait for the game
    pub fn launch(
        automation: &AutomationSettings,
        geometry: &ViewportGeometry,
        token: &str,
    ) -> Result<Self, SurfaceError> {
        let runtime = Runtime::new().map_err(|e| SurfaceError::Backend(e.to_string()))?;

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(geometry.width, geometry.height)
            .viewport(Viewport {
                width: geometry.width,
                height: geometry.height,
                device_scale_factor: Some(1.0),
                ..Default::default()
            })
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={USER_AGENT}"));
        builder = if automation.headless {
            builder.with_head().arg("--headless=new")
        } else {
            builder.with_head()
        };
        let config = builder.build().map_err(SurfaceError::Backend)?;

        let (browser, page, handler) = runtime.block_on(async {
            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| SurfaceError::Backend(format!("launch failed: {e}")))?;

            let handler = tokio::spawn(async move {
                // Unknown protocol messages surface as errors; keep draining
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        log::trace!("Browser event error: {}", e);
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| SurfaceError::Backend(e.to_string()))?;
            Ok::<_, SurfaceError>((browser, page, handler))
        })?;

        let surface = Self {
            runtime,
            browser,
            page,
            handler,
            cursor: Cell::new(Point::new(0, 0)),
            held: Cell::new(false),
        };
        surface.bootstrap(automation, token)?;
        Ok(surface)
    }

    /// Authenticate the client and land on the home tab
    fn bootstrap(&self, automation: &AutomationSettings, token: &str) -> Result<(), SurfaceError> {
        let base = automation.base_url.trim_end_matches('/');

        self.navigate(base)?;
        self.pause(PAGE_SETTLE_MS);
        self.inject_token(token)?;
        // Reload so the client picks the token up
        self.navigate(base)?;

        if self.wait_for_text(GAME_READY_POLLS, text::game_ready) {
            log::info!("Game client loaded");
        } else {
            log::warn!("Game client not detected after {}s, continuing", GAME_READY_POLLS);
        }

        self.navigate(&format!("{base}/home"))?;
        if !self.wait_for_text(HOME_READY_POLLS, text::home_ready) {
            log::warn!("Home tab not detected, continuing");
        }
        Ok(())
    }

    fn inject_token(&self, token: &str) -> Result<(), SurfaceError> {
        let token = serde_json::to_string(token).map_err(|e| SurfaceError::Script(e.to_string()))?;
        let script = format!(
            r#"(() => {{
                const token = {token};
                const existing = Object.keys(localStorage).filter(k => k.includes('{TOKEN_KEY_PREFIX}'));
                if (existing.length > 0) {{
                    const value = JSON.parse(localStorage.getItem(existing[0]) || '{{}}');
                    value.token = token;
                    localStorage.setItem(existing[0], JSON.stringify(value));
                    return existing[0];
                }}
                const expires = new Date(Date.now() + {TOKEN_TTL_MS}).toISOString();
                localStorage.setItem('{TOKEN_KEY_DEFAULT}', JSON.stringify({{ token, expires }}));
                return '{TOKEN_KEY_DEFAULT}';
            }})()"#
        );
        let key: String = self.eval(&script)?;
        log::debug!("Session token written to {}", key);
        Ok(())
    }

    /// Poll the page text until `ready` accepts it
    fn wait_for_text(&self, polls: u32, ready: fn(&str) -> bool) -> bool {
        for _ in 0..polls {
            // The page may be mid-navigation; treat a failed read as not ready
            if self.visible_text().map(|t| ready(&t)).unwrap_or(false) {
                return true;
            }
            self.pause(READY_POLL_MS);
        }
        false
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn eval<T: DeserializeOwned>(&self, script: &str) -> Result<T, SurfaceError> {
        self.block_on(async {
            let result = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| SurfaceError::Script(e.to_string()))?;
            result
                .into_value::<T>()
                .map_err(|e| SurfaceError::Script(e.to_string()))
        })
    }

    fn dispatch(&self, kind: DispatchMouseEventType, at: Point) -> Result<(), SurfaceError> {
        let is_button = matches!(
            kind,
            DispatchMouseEventType::MousePressed | DispatchMouseEventType::MouseReleased
        );
        let mut params = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(at.x as f64)
            .y(at.y as f64);
        if is_button {
            params = params.button(MouseButton::Left).click_count(1);
        } else if self.held.get() {
            // Moves with the button down must say so, or the client sees a hover
            params = params.button(MouseButton::Left).buttons(1_i64);
        }
        let params = params.build().map_err(SurfaceError::Backend)?;

        self.block_on(self.page.execute(params))
            .map(|_| ())
            .map_err(|e| SurfaceError::Backend(e.to_string()))
    }

    /// Close the browser and stop its event loop
    pub fn close(mut self) -> Result<(), SurfaceError> {
        let result = self
            .runtime
            .block_on(self.browser.close())
            .map(|_| ())
            .map_err(|e| SurfaceError::Backend(e.to_string()));
        self.handler.abort();
        result
    }
}

impl Surface for ChromeSurface {
    fn viewport(&self) -> Result<(u32, u32), SurfaceError> {
        self.eval("[window.innerWidth, window.innerHeight]")
    }

    fn visible_text(&self) -> Result<String, SurfaceError> {
        self.eval("document.body ? document.body.innerText : ''")
    }

    fn element_labels(&self) -> Result<Vec<String>, SurfaceError> {
        self.eval(&format!(
            "Array.from(document.querySelectorAll('button, div'))\
                .map(el => (el.textContent || '').trim())\
                .filter(t => t.length > 0 && t.length <= {MAX_LABEL_LEN})"
        ))
    }

    fn pointer(&self, action: PointerAction) -> Result<(), SurfaceError> {
        match action {
            PointerAction::Move(at) => {
                self.dispatch(DispatchMouseEventType::MouseMoved, at)?;
                self.cursor.set(at);
            }
            PointerAction::Press => {
                self.dispatch(DispatchMouseEventType::MousePressed, self.cursor.get())?;
                self.held.set(true);
            }
            PointerAction::Release => {
                self.dispatch(DispatchMouseEventType::MouseReleased, self.cursor.get())?;
                self.held.set(false);
            }
        }
        Ok(())
    }

    fn activate_text(&self, needle: &str) -> Result<bool, SurfaceError> {
        let needle =
            serde_json::to_string(&needle.to_uppercase()).map_err(|e| SurfaceError::Script(e.to_string()))?;
        self.eval(&format!(
            r#"(() => {{
                for (const el of document.querySelectorAll('*')) {{
                    if (el.innerText && el.innerText.toUpperCase().includes({needle})) {{
                        el.click();
                        return true;
                    }}
                }}
                return false;
            }})()"#
        ))
    }

    fn navigate(&self, url: &str) -> Result<(), SurfaceError> {
        log::debug!("Navigating to {}", url);
        self.block_on(self.page.goto(url))
            .map(|_| ())
            .map_err(|e| SurfaceError::Backend(format!("navigation to {url} failed: {e}")))
    }
}
