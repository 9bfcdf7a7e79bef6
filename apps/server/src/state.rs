use checker::CheckHandler;

/// Shared per-process state handed to every route
pub struct AppState {
    pub handler: CheckHandler,
    secret: String,
}

impl AppState {
    pub fn new(handler: CheckHandler, secret: String) -> Self {
        Self { handler, secret }
    }

    /// Whether `authorization` carries the configured secret.
    /// An empty secret accepts every request.
    pub fn authorized(&self, authorization: Option<&str>) -> bool {
        if self.secret.is_empty() {
            return true;
        }
        authorization
            .and_then(|value| value.strip_prefix("Basic "))
            .is_some_and(|value| value == self.secret)
    }
}
