//! Hook fired right before a view renders.

use std::fmt;

use indexmap::IndexMap;
use pagekit_page::PageVars;
use serde_json::Value;

/// Mutable render request handed to each [`RenderListeners`] subscriber.
///
/// Subscribers may rewrite any field; the view renders with whatever the
/// event holds once dispatch finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct BeforeRenderEvent {
    layout: String,
    vars: PageVars,
    response_code: u16,
    headers: IndexMap<String, String>,
    propagation_stopped: bool,
}

impl BeforeRenderEvent {
    #[must_use]
    pub fn new(
        layout: impl Into<String>,
        vars: PageVars,
        response_code: u16,
        headers: IndexMap<String, String>,
    ) -> Self {
        Self {
            layout: layout.into(),
            vars,
            response_code,
            headers,
            propagation_stopped: false,
        }
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn vars(&self) -> &PageVars {
        &self.vars
    }

    pub fn response_code(&self) -> u16 {
        self.response_code
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn set_layout(&mut self, layout: impl Into<String>) -> &mut Self {
        self.layout = layout.into();
        self
    }

    pub fn set_vars(&mut self, vars: PageVars) -> &mut Self {
        self.vars = vars;
        self
    }

    /// Insert or overwrite one variable.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn set_response_code(&mut self, code: u16) -> &mut Self {
        self.response_code = code;
        self
    }

    pub fn set_headers(&mut self, headers: IndexMap<String, String>) -> &mut Self {
        self.headers = headers;
        self
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Skip every subscriber after the current one.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub(crate) fn into_parts(self) -> (String, PageVars, u16, IndexMap<String, String>) {
        (self.layout, self.vars, self.response_code, self.headers)
    }
}

type Listener = Box<dyn Fn(&mut BeforeRenderEvent) + Send + Sync>;

/// Ordered list of [`BeforeRenderEvent`] subscribers.
#[derive(Default)]
pub struct RenderListeners {
    listeners: Vec<Listener>,
}

impl RenderListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; subscribers run in registration order.
    pub fn subscribe<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&mut BeforeRenderEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Run subscribers until one stops propagation.
    pub fn dispatch(&self, event: &mut BeforeRenderEvent) {
        for listener in &self.listeners {
            if event.is_propagation_stopped() {
                break;
            }
            listener(event);
        }
    }
}

impl fmt::Debug for RenderListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}
