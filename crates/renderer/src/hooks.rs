//! Ordered render hooks.
//!
//! Handlers run in registration order. Each hook point takes a mutable view of
//! exactly the data it is allowed to change.

use std::fmt;

use strata_core::{HtmlContext, IslandContext, IslandResponse};

use crate::context::{IncomingRequest, SsrContext};

type AppRenderedHook = Box<dyn Fn(&SsrContext) + Send + Sync>;
type RenderHtmlHook = Box<dyn Fn(&mut HtmlContext, &IncomingRequest) + Send + Sync>;
type RenderIslandHook =
    Box<dyn Fn(&mut IslandResponse, &IncomingRequest, &IslandContext) + Send + Sync>;

#[derive(Default)]
pub struct HookRegistry {
    app_rendered: Vec<AppRenderedHook>,
    render_html: Vec<RenderHtmlHook>,
    render_island: Vec<RenderIslandHook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the application render was attempted, successful or not.
    pub fn on_app_rendered(mut self, hook: impl Fn(&SsrContext) + Send + Sync + 'static) -> Self {
        self.app_rendered.push(Box::new(hook));
        self
    }

    /// Called with the collected document sections before serialization.
    pub fn on_render_html(
        mut self,
        hook: impl Fn(&mut HtmlContext, &IncomingRequest) + Send + Sync + 'static,
    ) -> Self {
        self.render_html.push(Box::new(hook));
        self
    }

    /// Called with the island response before it is encoded.
    pub fn on_render_island(
        mut self,
        hook: impl Fn(&mut IslandResponse, &IncomingRequest, &IslandContext) + Send + Sync + 'static,
    ) -> Self {
        self.render_island.push(Box::new(hook));
        self
    }

    pub fn call_app_rendered(&self, ctx: &SsrContext) {
        for hook in &self.app_rendered {
            hook(ctx);
        }
    }

    pub fn call_render_html(&self, html: &mut HtmlContext, request: &IncomingRequest) {
        for hook in &self.render_html {
            hook(html, request);
        }
    }

    pub fn call_render_island(
        &self,
        response: &mut IslandResponse,
        request: &IncomingRequest,
        island: &IslandContext,
    ) {
        for hook in &self.render_island {
            hook(response, request, island);
        }
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("app_rendered", &self.app_rendered.len())
            .field("render_html", &self.render_html.len())
            .field("render_island", &self.render_island.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_render_html_hooks_run_in_order() {
        let hooks = HookRegistry::new()
            .on_render_html(|html, _| html.head.push("<first>".to_string()))
            .on_render_html(|html, _| html.head.push("<second>".to_string()));

        let mut html = HtmlContext::default();
        let request = IncomingRequest::new(Method::GET, "/".parse().unwrap());
        hooks.call_render_html(&mut html, &request);

        assert_eq!(html.head, vec!["<first>", "<second>"]);
    }

    #[test]
    fn test_render_island_hook_mutates_response() {
        let hooks = HookRegistry::new().on_render_island(|response, _, island| {
            response.html = format!("<!-- {} -->{}", island.name, response.html);
        });

        let mut response = IslandResponse {
            id: None,
            html: "<p></p>".to_string(),
            state: Default::default(),
            tags: Vec::new(),
        };
        let island = IslandContext {
            id: None,
            url: "/".to_string(),
            format: None,
            name: "Card".to_string(),
            props: Default::default(),
        };
        let request = IncomingRequest::new(Method::GET, "/__island/Card".parse().unwrap());
        hooks.call_render_island(&mut response, &request, &island);

        assert_eq!(response.html, "<!-- Card --><p></p>");
    }

    #[test]
    fn test_registry_debug_counts() {
        let hooks = HookRegistry::new().on_app_rendered(|_| {});
        assert_eq!(
            format!("{hooks:?}"),
            "HookRegistry { app_rendered: 1, render_html: 0, render_island: 0 }"
        );
    }
}
