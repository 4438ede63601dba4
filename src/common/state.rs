use crate::common::context::{Context, Notifier};
use crate::repositories::collections::CollectionClient;
use crate::repositories::users::Authenticator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub collections: Arc<dyn CollectionClient>,
    pub authenticator: Arc<dyn Authenticator>,
    pub notifier: Arc<dyn Notifier>,
}

impl Context for AppState {
    fn collections(&self) -> &dyn CollectionClient {
        self.collections.as_ref()
    }

    fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}
