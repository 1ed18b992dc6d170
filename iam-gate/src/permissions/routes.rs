//! Route template resolution.
//!
//! Parameterized routes such as `/things/{id}/activate` cannot be found in the
//! permission matrix by the concrete request path. A [`RouteTemplateResolver`]
//! maps a request back to the template it was registered under, so the matrix
//! can be keyed by templates independently of the router in use.

use axum::extract::MatchedPath;
use http::request::Parts;
use http::Method;

/// Given a request, returns the template of the route it matched, if any
pub trait RouteTemplateResolver: Send + Sync {
    fn route_template(&self, request: &Parts) -> Option<String>;
}

/// Resolves templates of requests routed by an axum [`Router`](axum::Router).
///
/// axum stores the matched route as a [`MatchedPath`] extension, which is present
/// for middleware added with `Router::layer` or `Router::route_layer`, but not for
/// the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchedPathResolver;

impl RouteTemplateResolver for MatchedPathResolver {
    fn route_template(&self, request: &Parts) -> Option<String> {
        request
            .extensions
            .get::<MatchedPath>()
            .map(|path| path.as_str().to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Param,
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    template: String,
    segments: Vec<Segment>,
}

/// Standalone table of route templates with `{param}` segments.
///
/// Routes are tried in registration order and a trailing slash is ignored.
#[derive(Debug, Clone, Default)]
pub struct TemplateRouter {
    routes: Vec<Route>,
}

impl TemplateRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route template for a method
    pub fn route(mut self, method: Method, template: impl Into<String>) -> Self {
        let template = template.into();
        let segments = split_path(&template)
            .map(|segment| {
                if segment.starts_with('{') && segment.ends_with('}') {
                    Segment::Param
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();
        self.routes.push(Route {
            method,
            template,
            segments,
        });
        self
    }

    /// Template of the first route matching `method` and `path`
    pub fn find(&self, method: &Method, path: &str) -> Option<&str> {
        let segments: Vec<&str> = split_path(path).collect();
        self.routes
            .iter()
            .find(|route| {
                route.method == *method
                    && route.segments.len() == segments.len()
                    && route
                        .segments
                        .iter()
                        .zip(&segments)
                        .all(|(expected, actual)| match expected {
                            Segment::Literal(literal) => literal == actual,
                            Segment::Param => !actual.is_empty(),
                        })
            })
            .map(|route| route.template.as_str())
    }
}

impl RouteTemplateResolver for TemplateRouter {
    fn route_template(&self, request: &Parts) -> Option<String> {
        self.find(&request.method, request.uri.path())
            .map(str::to_string)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.trim_start_matches('/')
        .trim_end_matches('/')
        .split('/')
}
