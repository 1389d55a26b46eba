use std::sync::Arc;

use buurt_core::auth::TokenSigner;
use buurt_core::content::SiteContent;
use buurt_core::editorial::Editor;
use buurt_core::intake::{ContactIntake, Mailer, RegistrationIntake};
use buurt_core::sections::{ImageCdn, RenderContext};
use buurt_core::store::ContentStore;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    config: AppConfig,
    store: Arc<dyn ContentStore>,
    site: SiteContent,
    editor: Editor,
    registrations: RegistrationIntake,
    contact: ContactIntake,
    tokens: TokenSigner,
    render: RenderContext,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ContentStore>, mailer: Arc<dyn Mailer>) -> Self {
        let contact = ContactIntake::new(
            mailer,
            config.mail.contact_from.clone(),
            config.mail.contact_to.clone(),
        );
        Self {
            inner: Arc::new(InnerState {
                site: SiteContent::new(Arc::clone(&store)),
                editor: Editor::new(Arc::clone(&store)),
                registrations: RegistrationIntake::new(Arc::clone(&store)),
                contact,
                tokens: TokenSigner::new(config.jwt_secret.as_bytes()),
                render: RenderContext::new(ImageCdn::new(
                    config.project_id.clone(),
                    config.dataset.clone(),
                )),
                store,
                config,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.inner.store.as_ref()
    }

    pub fn site(&self) -> &SiteContent {
        &self.inner.site
    }

    pub fn editor(&self) -> &Editor {
        &self.inner.editor
    }

    pub fn registrations(&self) -> &RegistrationIntake {
        &self.inner.registrations
    }

    pub fn contact(&self) -> &ContactIntake {
        &self.inner.contact
    }

    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }

    pub fn render(&self) -> &RenderContext {
        &self.inner.render
    }
}
