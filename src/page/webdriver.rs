// src/page/webdriver.rs
// Minimal W3C WebDriver client (JSON over HTTP) driving one headless Chrome
// session through chromedriver. Only the commands the collector needs.

use std::thread;
use std::time::Duration;

use serde_json::{Value, json};
use ureq::Agent;

use crate::config::options::BrowserOptions;
use crate::error::HarvestError;

use super::{ElementRef, PageObserver};

/// W3C element reference key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const SCROLL_SCRIPT: &str = "window.scrollBy(0, Math.floor(window.innerHeight * arguments[0]));";
const PARENT_XPATH: &str = "./ancestor::*[1]";

/// Driver-side failure, before it is mapped onto [`HarvestError`].
#[derive(Debug)]
enum Fault {
    Stale(String),
    NoSuchElement,
    Protocol(String),
}

impl From<Fault> for HarvestError {
    fn from(f: Fault) -> Self {
        match f {
            Fault::Stale(msg) => HarvestError::ElementStale(msg),
            Fault::NoSuchElement => HarvestError::Browser("no such element".into()),
            Fault::Protocol(msg) => HarvestError::Browser(msg),
        }
    }
}

enum Verb {
    Get,
    Post(Value),
    Delete,
}

pub struct WebDriverPage {
    agent: Agent,
    session_url: String,
    warmup: Duration,
    load_settle: Duration,
}

impl WebDriverPage {
    /// Start a new browser session at `opts.endpoint`.
    pub fn open(opts: &BrowserOptions) -> Result<Self, HarvestError> {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(opts.command_timeout))
            .build()
            .into();

        let mut args = vec![
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--window-size={},{}", opts.window.0, opts.window.1),
        ];
        if opts.headless {
            args.push("--headless=new".to_string());
        }

        let mut chrome = json!({ "args": args });
        if let Some(bin) = &opts.browser_binary {
            chrome["binary"] = json!(bin);
        }

        let caps = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": chrome,
                    "timeouts": { "pageLoad": opts.page_load_timeout.as_millis() as u64 }
                }
            }
        });

        let endpoint = opts.endpoint.trim_end_matches('/');
        let value = send(&agent, Verb::Post(caps), &format!("{endpoint}/session"))
            .map_err(HarvestError::from)?;
        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| HarvestError::Browser(format!("no sessionId in new-session reply: {value}")))?;

        logf!("WebDriver: session {id} opened at {endpoint}");
        Ok(Self {
            agent,
            session_url: format!("{endpoint}/session/{id}"),
            warmup: opts.warmup,
            load_settle: opts.load_settle,
        })
    }

    fn cmd(&self, verb: Verb, path: &str) -> Result<Value, Fault> {
        send(&self.agent, verb, &format!("{}{path}", self.session_url))
    }

    fn find_from(&self, scope: Option<&ElementRef>, using: &str, value: &str) -> Result<Option<ElementRef>, Fault> {
        let path = match scope {
            Some(el) => format!("/element/{}/element", el.id()),
            None => "/element".to_string(),
        };
        match self.cmd(Verb::Post(json!({ "using": using, "value": value })), &path) {
            Ok(v) => Ok(element_of(&v)),
            Err(Fault::NoSuchElement) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for WebDriverPage {
    fn drop(&mut self) {
        if let Err(e) = self.cmd(Verb::Delete, "") {
            logd!("WebDriver: session close failed: {e:?}");
        }
    }
}

impl PageObserver for WebDriverPage {
    fn navigate(&mut self, url: &str) -> Result<(), HarvestError> {
        self.cmd(Verb::Post(json!({ "url": url })), "/url")?;
        thread::sleep(self.warmup);
        // the listing only hydrates reliably after one reload
        self.cmd(Verb::Post(json!({})), "/refresh")?;
        thread::sleep(self.load_settle);
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, HarvestError> {
        let v = self.cmd(Verb::Get, "/url")?;
        Ok(v.as_str().unwrap_or_default().to_string())
    }

    fn list_links(&mut self, selector: &str) -> Result<Vec<ElementRef>, HarvestError> {
        let v = self.cmd(Verb::Post(json!({ "using": "css selector", "value": selector })), "/elements")?;
        Ok(v.as_array()
            .map(|arr| arr.iter().filter_map(element_of).collect())
            .unwrap_or_default())
    }

    fn attribute(&mut self, el: &ElementRef, name: &str) -> Result<Option<String>, HarvestError> {
        let v = self.cmd(Verb::Get, &format!("/element/{}/attribute/{name}", el.id()))?;
        Ok(v.as_str().map(str::to_string))
    }

    fn find_within(&mut self, el: &ElementRef, selector: &str) -> Result<Option<ElementRef>, HarvestError> {
        Ok(self.find_from(Some(el), "css selector", selector)?)
    }

    fn parent_of(&mut self, el: &ElementRef) -> Result<Option<ElementRef>, HarvestError> {
        Ok(self.find_from(Some(el), "xpath", PARENT_XPATH)?)
    }

    fn text_of(&mut self, el: &ElementRef) -> Result<String, HarvestError> {
        let v = self.cmd(Verb::Get, &format!("/element/{}/text", el.id()))?;
        Ok(v.as_str().unwrap_or_default().to_string())
    }

    fn scroll_viewport(&mut self, fraction: f64) -> Result<(), HarvestError> {
        self.cmd(Verb::Post(json!({ "script": SCROLL_SCRIPT, "args": [fraction] })), "/execute/sync")?;
        Ok(())
    }
}

/* ---------------- Wire helpers ---------------- */

fn element_of(v: &Value) -> Option<ElementRef> {
    v.get(ELEMENT_KEY).and_then(Value::as_str).map(ElementRef::new)
}

/// One WebDriver command. Replies are `{"value": ...}`; on failure the value
/// carries `{"error": <code>, "message": ...}`.
fn send(agent: &Agent, verb: Verb, url: &str) -> Result<Value, Fault> {
    let result = match verb {
        Verb::Get => agent.get(url).call(),
        Verb::Post(body) => agent.post(url).send_json(&body),
        Verb::Delete => agent.delete(url).call(),
    };
    let resp = result.map_err(|e| Fault::Protocol(format!("{url}: {e}")))?;
    let status = resp.status();

    let mut body: Value = resp
        .into_body()
        .read_json()
        .map_err(|e| Fault::Protocol(format!("{url}: unreadable reply ({status}): {e}")))?;
    let value = body.get_mut("value").map(Value::take).unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }
    Err(classify(&value, status.as_u16()))
}

fn classify(value: &Value, status: u16) -> Fault {
    let code = value.get("error").and_then(Value::as_str).unwrap_or("");
    let message = value.get("message").and_then(Value::as_str).unwrap_or("");
    match code {
        "stale element reference" => Fault::Stale(message.to_string()),
        "no such element" => Fault::NoSuchElement,
        "" => Fault::Protocol(format!("HTTP {status}: {value}")),
        _ => Fault::Protocol(format!("{code}: {message}")),
    }
}
