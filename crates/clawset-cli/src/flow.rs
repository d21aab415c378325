//! Provider configuration wizard and the top-level action loop.
//!
//! Each step may be abandoned with ESC; abandoning any step ends the wizard
//! without touching the configuration. Only once every decision is made is
//! the operation list built and handed to the pipeline.

use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;
use tracing::{Span, debug, error, info_span};

use clawset_core::catalog::{self, ModelDescriptor, ModelSource, Provider, ServiceType, Vendor};
use clawset_core::config::ConfigStore;
use clawset_core::i18n::Msg;
use clawset_core::operation::{
    self, Operation, OperationContext, RunOptions, StatusIndicator, run_operations,
};
use clawset_core::settings::Settings;

use crate::console::Console;
use crate::menu::{Menu, MenuContext, MenuItem, MenuOutcome};
use crate::prompt::{Prompted, esc_input, esc_password};

/// How a wizard run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// A step was cancelled or could not continue; nothing was written.
    Aborted,
    /// Nothing needed changing.
    NothingToDo,
    Saved,
    /// The pipeline stopped at a failing step.
    Failed,
}

impl FlowOutcome {
    fn from_pipeline(ok: bool) -> Self {
        if ok { Self::Saved } else { Self::Failed }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    SelectModel,
}

pub struct ConfigFlow<'a> {
    settings: Arc<Settings>,
    console: &'a Console,
    catalog: &'a dyn ModelSource,
    indicator: Arc<dyn StatusIndicator>,
    span: Span,
}

impl<'a> ConfigFlow<'a> {
    pub fn new(
        settings: Arc<Settings>,
        console: &'a Console,
        catalog: &'a dyn ModelSource,
        indicator: Arc<dyn StatusIndicator>,
    ) -> Self {
        Self {
            settings,
            console,
            catalog,
            indicator,
            span: info_span!("config_flow"),
        }
    }

    fn t(&self, msg: Msg) -> &'static str {
        self.settings.locale.t(msg)
    }

    fn warn(&self, msg: Msg) -> Result<()> {
        self.console
            .println(&format!("{} {}", "⚠".yellow(), self.t(msg)))?;
        Ok(())
    }

    fn select_vendor(&self) -> Result<Option<Vendor>> {
        let outcome = Menu::new(self.t(Msg::SelectVendor))
            .item(MenuItem::new(self.t(Msg::VendorPackycode), Vendor::PackyCode))
            .item(MenuItem::new(self.t(Msg::VendorOther), Vendor::Other))
            .run(self.console)?;
        Ok(outcome.into_selection())
    }

    fn select_service_type(&self) -> Result<Option<ServiceType>> {
        let outcome = Menu::new(self.t(Msg::SelectServiceType))
            .item(MenuItem::new(self.t(Msg::ServiceTypeApi), ServiceType::Api))
            .item(MenuItem::new(self.t(Msg::ServiceTypeCodex), ServiceType::Codex))
            .run(self.console)?;
        Ok(outcome.into_selection())
    }

    /// Vendor endpoint: fixed for PackyCode, asked for otherwise. An empty
    /// answer counts as cancelled.
    fn base_url(&self, vendor: Vendor, service: Option<ServiceType>) -> Result<Option<String>> {
        if let Some(url) = vendor.fixed_base_url(service) {
            return Ok(Some(url.to_string()));
        }
        let url = esc_input(self.console, self.t(Msg::InputBaseUrl))?
            .answered()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        Ok(url)
    }

    /// Fetch the catalog and narrow it to what the vendor serves. A fetch
    /// failure is reported and yields `None`.
    fn fetch_models(&self, vendor: Vendor, service: Option<ServiceType>) -> Option<Vec<ModelDescriptor>> {
        self.indicator.start(self.t(Msg::FetchingModels));
        match self.catalog.list_models() {
            Ok(listing) => {
                let models = catalog::filter_models(listing.models, vendor, service);
                debug!("{} of {} models usable", models.len(), listing.count);
                self.indicator.succeed(None);
                Some(models)
            }
            Err(e) => {
                self.indicator.fail(self.t(Msg::FetchingModelsFailed));
                error!("{}", e);
                None
            }
        }
    }

    fn select_model(&self, models: Vec<ModelDescriptor>) -> Result<Option<ModelDescriptor>> {
        let items = models.into_iter().map(|m| {
            let label = format!("{} ({})", m.name, m.key);
            MenuItem::new(label, m)
        });
        let outcome = Menu::new(self.t(Msg::SelectModel))
            .items(items)
            .run(self.console)?;
        Ok(outcome.into_selection())
    }

    fn api_key(&self, provider: Provider) -> Result<Option<String>> {
        let message = self
            .settings
            .locale
            .format(Msg::InputApiKey, &[("provider", provider.as_str())]);
        Ok(esc_password(self.console, &message)?.answered())
    }

    /// Walk the user through vendor, endpoint, model and key, then save.
    pub fn configure_provider(&self) -> Result<FlowOutcome> {
        let _enter = self.span.enter();

        let Some(vendor) = self.select_vendor()? else {
            return Ok(FlowOutcome::Aborted);
        };
        debug!("Selected vendor: {}", vendor);

        let service = match vendor {
            Vendor::PackyCode => match self.select_service_type()? {
                Some(service) => Some(service),
                None => return Ok(FlowOutcome::Aborted),
            },
            Vendor::Other => None,
        };
        if let Some(service) = service {
            debug!("Selected service type: {}", service);
        }

        let Some(base_url) = self.base_url(vendor, service)? else {
            return Ok(FlowOutcome::Aborted);
        };
        debug!("Base URL: {}", base_url);

        let Some(models) = self.fetch_models(vendor, service) else {
            return Ok(FlowOutcome::Aborted);
        };
        if models.is_empty() {
            self.warn(Msg::NoModelsAvailable)?;
            return Ok(FlowOutcome::Aborted);
        }

        let Some(model) = self.select_model(models)? else {
            return Ok(FlowOutcome::Aborted);
        };
        debug!("Selected model: {}", model.key);

        let Some(provider) = Provider::for_key(&model.key, vendor.filter().allowed_providers())
        else {
            return Ok(FlowOutcome::Aborted);
        };

        let Some(api_key) = self.api_key(provider)? else {
            return Ok(FlowOutcome::Aborted);
        };

        let settings = &self.settings;
        let operations = vec![
            Box::new(operation::set_provider_config(
                settings,
                provider,
                provider.base_url(&base_url),
            )) as Box<dyn Operation>,
            Box::new(operation::set_api_key(
                settings,
                ServiceType::auth_provider(service, provider),
                api_key,
            )),
            Box::new(operation::set_model(settings, model.key)),
        ];
        Ok(FlowOutcome::from_pipeline(self.run(operations)))
    }

    /// Make one of the already configured models the default.
    pub fn select_configured_model(&self) -> Result<FlowOutcome> {
        let _enter = self.span.enter();

        let store = ConfigStore::new(&self.settings);
        let configured = store.configured_models()?;
        if configured.is_empty() {
            self.warn(Msg::NoConfiguredModels)?;
            return Ok(FlowOutcome::NothingToDo);
        }

        let current = store.primary_model()?;
        let items = configured.into_iter().map(|key| {
            let label = if current.as_deref() == Some(key.as_str()) {
                format!("{} {}", key, self.t(Msg::CurrentModelHint))
            } else {
                key.clone()
            };
            MenuItem::new(label, key)
        });

        let selected = match Menu::new(self.t(Msg::SelectConfiguredModel))
            .items(items)
            .run(self.console)?
        {
            MenuOutcome::Selected(key) => key,
            MenuOutcome::Exited | MenuOutcome::Cancelled => return Ok(FlowOutcome::Aborted),
        };
        if current.as_deref() == Some(selected.as_str()) {
            return Ok(FlowOutcome::NothingToDo);
        }

        debug!("Selected model: {}", selected);
        let op: Box<dyn Operation> = Box::new(operation::set_model(&self.settings, selected));
        let ok = self.run(vec![op]);
        Ok(FlowOutcome::from_pipeline(ok))
    }

    /// Offer add / switch / exit until the user leaves.
    pub fn run_config_loop(&self) -> Result<()> {
        let ctx = MenuContext::new(self.console);
        Menu::new(self.t(Msg::ConfigActionPrompt))
            .item(
                MenuItem::new(self.t(Msg::ConfigActionAdd), Action::Add)
                    .with_action(|_| self.configure_provider().map(drop)),
            )
            .item(
                MenuItem::new(self.t(Msg::ConfigActionSelectModel), Action::SelectModel)
                    .with_action(|_| self.select_configured_model().map(drop)),
            )
            .item(MenuItem::exit(self.t(Msg::ConfigActionExit)))
            .looping(true)
            .context(&ctx)
            .run(self.console)?;
        Ok(())
    }

    fn run(&self, operations: Vec<Box<dyn Operation>>) -> bool {
        let ctx = OperationContext::new(self.settings.clone(), self.indicator.clone());
        run_operations(&ctx, operations, RunOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::scripted;
    use clawset_core::auth::AuthStore;
    use clawset_core::catalog::ModelsListing;
    use clawset_core::error::ClawsetError;
    use clawset_core::operation::Quiet;
    use std::cell::Cell;
    use tempfile::TempDir;

    const DOWN: &[u8] = b"\x1b[B";
    const ENTER: &[u8] = b"\r";
    const ESC: &[u8] = b"\x1b";

    struct FakeCatalog {
        keys: Vec<&'static str>,
        fail: bool,
        calls: Cell<usize>,
    }

    impl FakeCatalog {
        fn with(keys: &[&'static str]) -> Self {
            Self {
                keys: keys.to_vec(),
                fail: false,
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                keys: vec![],
                fail: true,
                calls: Cell::new(0),
            }
        }
    }

    impl ModelSource for FakeCatalog {
        fn list_models(&self) -> clawset_core::error::Result<ModelsListing> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ClawsetError::Fetch("openclaw exploded".into()));
            }
            let models = self
                .keys
                .iter()
                .map(|&key| {
                    serde_json::from_value(serde_json::json!({
                        "key": key,
                        "name": key.rsplit('/').next().unwrap_or(key),
                    }))
                    .unwrap()
                })
                .collect::<Vec<ModelDescriptor>>();
            Ok(ModelsListing {
                count: models.len(),
                models,
            })
        }
    }

    fn catalog() -> FakeCatalog {
        FakeCatalog::with(&[
            "openai/gpt-5",
            "google/gemini-2.5-pro",
            "anthropic/claude-sonnet-4-5-20250929",
            "openai/gpt-unlisted",
        ])
    }

    fn settings(dir: &TempDir) -> Arc<Settings> {
        Arc::new(Settings::with_config_dir(dir.path()))
    }

    fn flow<'a>(settings: &Arc<Settings>, console: &'a Console, catalog: &'a FakeCatalog) -> ConfigFlow<'a> {
        ConfigFlow::new(settings.clone(), console, catalog, Arc::new(Quiet))
    }

    #[test]
    fn test_packycode_api_uses_fixed_endpoint() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = catalog();
        let (console, captured) = scripted(&[ENTER, ENTER, ENTER, b"sk-test", ENTER]);

        let outcome = flow(&settings, &console, &catalog).configure_provider().unwrap();
        assert_eq!(outcome, FlowOutcome::Saved);
        assert!(!captured.text().contains("Base URL"));

        let config = ConfigStore::new(&settings).load().unwrap();
        assert_eq!(config.provider_base_url("openai"), Some("https://www.packyapi.com/v1"));
        assert_eq!(config.primary_model(), Some("openai/gpt-5"));
        assert!(config.meta.and_then(|m| m.last_touched_at).is_some());

        let profile = AuthStore::new(&settings).load().unwrap().get("openai").unwrap();
        assert_eq!(profile.key, "sk-test");
        assert_eq!(profile.kind, "api_key");
    }

    #[test]
    fn test_packycode_filters_catalog() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = catalog();
        // gemini and the unlisted gpt are filtered out.
        let (console, _) = scripted(&[ENTER, ENTER, DOWN, ENTER, b"sk-ant", ENTER]);

        let outcome = flow(&settings, &console, &catalog).configure_provider().unwrap();
        assert_eq!(outcome, FlowOutcome::Saved);

        let config = ConfigStore::new(&settings).load().unwrap();
        assert_eq!(
            config.primary_model(),
            Some("anthropic/claude-sonnet-4-5-20250929")
        );
        assert_eq!(
            config.provider_base_url("anthropic"),
            Some("https://www.packyapi.com")
        );
    }

    #[test]
    fn test_codex_stores_credential_separately() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = catalog();
        let (console, _) = scripted(&[ENTER, DOWN, ENTER, ENTER, b"sk-codex", ENTER]);

        let outcome = flow(&settings, &console, &catalog).configure_provider().unwrap();
        assert_eq!(outcome, FlowOutcome::Saved);

        let config = ConfigStore::new(&settings).load().unwrap();
        assert_eq!(
            config.provider_base_url("openai"),
            Some("https://codex-api.packycode.com/v1")
        );
        let profiles = AuthStore::new(&settings).load().unwrap();
        assert_eq!(profiles.get("openai-codex").unwrap().key, "sk-codex");
        assert!(profiles.get("openai").is_none());
    }

    #[test]
    fn test_cancel_at_base_url_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = catalog();
        let (console, captured) = scripted(&[DOWN, ENTER, ESC]);

        let outcome = flow(&settings, &console, &catalog).configure_provider().unwrap();
        assert_eq!(outcome, FlowOutcome::Aborted);
        assert!(captured.text().contains("Base URL"));
        assert_eq!(catalog.calls.get(), 0);
        assert!(!settings.config_path().exists());
        assert!(!settings.auth_profiles_path().exists());
        assert_eq!(console.input().listener_count(), 0);
    }

    #[test]
    fn test_empty_base_url_aborts() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = catalog();
        let (console, _) = scripted(&[DOWN, ENTER, b"   ", ENTER]);

        let outcome = flow(&settings, &console, &catalog).configure_provider().unwrap();
        assert_eq!(outcome, FlowOutcome::Aborted);
        assert_eq!(catalog.calls.get(), 0);
    }

    #[test]
    fn test_other_vendor_keeps_custom_endpoint() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = catalog();
        let (console, _) = scripted(&[
            DOWN,
            ENTER,
            b"https://llm.example.com/",
            ENTER,
            ENTER,
            b"key",
            ENTER,
        ]);

        let outcome = flow(&settings, &console, &catalog).configure_provider().unwrap();
        assert_eq!(outcome, FlowOutcome::Saved);

        let config = ConfigStore::new(&settings).load().unwrap();
        assert_eq!(
            config.provider_base_url("openai"),
            Some("https://llm.example.com/v1")
        );
        assert_eq!(config.primary_model(), Some("openai/gpt-5"));
    }

    #[test]
    fn test_unsupported_provider_aborts() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = catalog();
        // gemini is listed for open vendors but cannot be configured here.
        let (console, _) = scripted(&[DOWN, ENTER, b"https://llm.example.com", ENTER, DOWN, ENTER]);

        let outcome = flow(&settings, &console, &catalog).configure_provider().unwrap();
        assert_eq!(outcome, FlowOutcome::Aborted);
        assert!(!settings.config_path().exists());
    }

    #[test]
    fn test_fetch_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = FakeCatalog::failing();
        let (console, _) = scripted(&[DOWN, ENTER, b"https://llm.example.com", ENTER]);

        let outcome = flow(&settings, &console, &catalog).configure_provider().unwrap();
        assert_eq!(outcome, FlowOutcome::Aborted);
        assert_eq!(catalog.calls.get(), 1);
        assert!(!settings.config_path().exists());
    }

    #[test]
    fn test_no_usable_models() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = FakeCatalog::with(&["google/gemini-2.5-pro"]);
        let (console, captured) = scripted(&[ENTER, ENTER]);

        let outcome = flow(&settings, &console, &catalog).configure_provider().unwrap();
        assert_eq!(outcome, FlowOutcome::Aborted);
        assert!(captured.text().contains("No models available"));
    }

    #[test]
    fn test_switch_configured_model() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let store = ConfigStore::new(&settings);
        store.set_model("openai/gpt-5").unwrap();
        store.set_model("anthropic/claude-opus-4-5-20251101").unwrap();
        let catalog = catalog();
        let (console, captured) = scripted(&[ENTER]);

        let outcome = flow(&settings, &console, &catalog)
            .select_configured_model()
            .unwrap();
        assert_eq!(outcome, FlowOutcome::Saved);
        assert!(captured.text().contains("(current)"));

        let config = store.load().unwrap();
        assert_eq!(config.primary_model(), Some("openai/gpt-5"));
        assert!(config.meta.and_then(|m| m.last_touched_at).is_some());
    }

    #[test]
    fn test_switch_to_current_model_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let store = ConfigStore::new(&settings);
        store.set_model("openai/gpt-5").unwrap();
        let catalog = catalog();
        let (console, _) = scripted(&[ENTER]);

        let outcome = flow(&settings, &console, &catalog)
            .select_configured_model()
            .unwrap();
        assert_eq!(outcome, FlowOutcome::NothingToDo);
        assert!(store.load().unwrap().meta.is_none());
    }

    #[test]
    fn test_config_loop_until_exit() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir);
        let catalog = catalog();
        let (console, captured) = scripted(&[DOWN, ENTER, DOWN, DOWN, ENTER]);

        flow(&settings, &console, &catalog).run_config_loop().unwrap();
        assert!(captured.text().contains("No models configured yet"));
        assert_eq!(console.input().listener_count(), 0);
    }
}
