/// Moves the application to a route when the session ends.
///
/// The gateway calls [`navigate`](Navigator::navigate) with the configured
/// login route once the session could not be renewed, and the logout
/// procedure calls it after clearing credentials.
///
/// Concurrent requests that fail together trigger a single call while refresh
/// coalescing is on. With coalescing off each failed request navigates.
///
/// Closures implement this trait:
///
/// ```rust,ignore
/// let gateway = Gateway::new(config, MemoryStore::new())
///     .with_navigator(|route: &str| router.push(route));
/// ```
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, route: &str) {
        self(route);
    }
}

/// Navigator for headless use: logs the transition and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, route: &str) {
        tracing::debug!(route = %route, "Navigation requested without a navigator");
    }
}
