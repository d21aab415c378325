//! Operations: named configuration mutations, run in order as one pipeline.

use std::sync::Arc;

use tracing::Span;

use crate::auth::AuthStore;
use crate::cancel::CancelToken;
use crate::catalog::Provider;
use crate::config::{ConfigStore, ProviderEntry};
use crate::error::{ClawsetError, Result};
use crate::i18n::Msg;
use crate::settings::Settings;

/// A single side-effecting step.
///
/// # Example
///
/// ```rust,ignore
/// struct Hello;
///
/// impl Operation for Hello {
///     fn name(&self) -> &str { "op_hello" }
///     fn execute(&self) -> Result<()> {
///         println!("hello");
///         Ok(())
///     }
/// }
/// ```
pub trait Operation {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Apply the step.
    fn execute(&self) -> Result<()>;
}

/// An operation backed by a closure.
pub struct FnOperation<F> {
    name: String,
    f: F,
}

impl<F> FnOperation<F>
where
    F: Fn() -> Result<()>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Operation for FnOperation<F>
where
    F: Fn() -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self) -> Result<()> {
        (self.f)()
    }
}

/// Progress feedback for a whole pipeline run.
pub trait StatusIndicator {
    fn start(&self, message: &str);
    /// `None` keeps the message given to `start`.
    fn succeed(&self, message: Option<&str>);
    fn fail(&self, message: &str);
}

/// Indicator that shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quiet;

impl StatusIndicator for Quiet {
    fn start(&self, _message: &str) {}
    fn succeed(&self, _message: Option<&str>) {}
    fn fail(&self, _message: &str) {}
}

/// Shared, read-only state for one pipeline run.
#[derive(Clone)]
pub struct OperationContext {
    pub settings: Arc<Settings>,
    pub indicator: Arc<dyn StatusIndicator>,
    /// Logs emitted by the pipeline are recorded inside this span.
    pub span: Span,
    pub cancel: Option<CancelToken>,
}

impl OperationContext {
    pub fn new(settings: Arc<Settings>, indicator: Arc<dyn StatusIndicator>) -> Self {
        Self {
            settings,
            indicator,
            span: tracing::info_span!("operations"),
            cancel: None,
        }
    }
}

/// Options for [`run_operations`].
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Message shown while the pipeline runs (defaults to "saving").
    pub status_message: Option<Msg>,
    /// Append the gateway-reload step (default `true`).
    pub auto_finalize: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            status_message: None,
            auto_finalize: true,
        }
    }
}

/// Run `operations` in order.
///
/// - An empty list is a no-op that returns `true`; nothing is appended.
/// - Otherwise, unless disabled, the gateway-reload step runs last.
/// - The first failing step stops the run and the result is `false`.
///   Steps that already ran stay applied.
pub fn run_operations(
    ctx: &OperationContext,
    operations: Vec<Box<dyn Operation>>,
    options: RunOptions,
) -> bool {
    if operations.is_empty() {
        return true;
    }

    let mut operations = operations;
    if options.auto_finalize {
        operations.push(Box::new(trigger_gateway_restart(&ctx.settings)));
    }

    let _entered = ctx.span.enter();
    let locale = ctx.settings.locale;
    ctx.indicator
        .start(locale.t(options.status_message.unwrap_or(Msg::SavingConfig)));

    for op in &operations {
        tracing::debug!("Executing: {}", op.name());
        if let Err(e) = op.execute() {
            let err = ClawsetError::Operation {
                name: op.name().to_string(),
                message: e.to_string(),
            };
            ctx.indicator.fail(locale.t(Msg::ConfigSaveFailed));
            tracing::error!("{}", err);
            return false;
        }
    }

    ctx.indicator.succeed(Some(locale.t(Msg::ConfigSaved)));
    true
}

/// Point `provider` at `base_url`.
pub fn set_provider_config(
    settings: &Settings,
    provider: Provider,
    base_url: impl Into<String>,
) -> impl Operation + 'static {
    let store = ConfigStore::new(settings);
    let entry = ProviderEntry::new(base_url);
    FnOperation::new("op_set_provider_config", move || {
        store.set_provider_config(provider.as_str(), entry.clone())
    })
}

/// Store `api_key` as the default credential for `provider`.
pub fn set_api_key(
    settings: &Settings,
    provider: impl Into<String>,
    api_key: impl Into<String>,
) -> impl Operation + 'static {
    let store = AuthStore::new(settings);
    let provider = provider.into();
    let api_key = api_key.into();
    FnOperation::new("op_set_api_key", move || store.set_api_key(&provider, &api_key))
}

/// Make `model_key` the default model.
pub fn set_model(settings: &Settings, model_key: impl Into<String>) -> impl Operation + 'static {
    let store = ConfigStore::new(settings);
    let model_key = model_key.into();
    FnOperation::new("op_set_model", move || store.set_model(&model_key))
}

/// Touch the config so the gateway reloads. Only the pipeline appends this.
fn trigger_gateway_restart(settings: &Settings) -> impl Operation + 'static {
    let store = ConfigStore::new(settings);
    FnOperation::new("op_trigger_gateway_restart", move || store.touch())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl StatusIndicator for Recorder {
        fn start(&self, message: &str) {
            self.events.borrow_mut().push(format!("start:{}", message));
        }
        fn succeed(&self, message: Option<&str>) {
            self.events
                .borrow_mut()
                .push(format!("succeed:{}", message.unwrap_or_default()));
        }
        fn fail(&self, message: &str) {
            self.events.borrow_mut().push(format!("fail:{}", message));
        }
    }

    fn context(dir: &TempDir) -> (OperationContext, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let ctx = OperationContext::new(
            Arc::new(Settings::with_config_dir(dir.path())),
            recorder.clone(),
        );
        (ctx, recorder)
    }

    fn counting(name: &str, calls: &Rc<Cell<usize>>, fail: bool) -> Box<dyn Operation> {
        let calls = calls.clone();
        Box::new(FnOperation::new(name, move || {
            calls.set(calls.get() + 1);
            if fail {
                Err(ClawsetError::Other("boom".into()))
            } else {
                Ok(())
            }
        }))
    }

    fn touched(dir: &TempDir) -> bool {
        ConfigStore::at(dir.path().join("openclaw.json"))
            .load()
            .unwrap()
            .meta
            .and_then(|m| m.last_touched_at)
            .is_some()
    }

    #[test]
    fn test_empty_pipeline_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let (ctx, recorder) = context(&dir);

        assert!(run_operations(&ctx, vec![], RunOptions::default()));
        assert!(!touched(&dir));
        assert!(!dir.path().join("openclaw.json").exists());
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn test_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        let (ctx, recorder) = context(&dir);
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let c = Rc::new(Cell::new(0));

        let ok = run_operations(
            &ctx,
            vec![counting("a", &a, false), counting("b", &b, true), counting("c", &c, false)],
            RunOptions::default(),
        );

        assert!(!ok);
        assert_eq!((a.get(), b.get(), c.get()), (1, 1, 0));
        assert!(!touched(&dir));
        assert_eq!(
            *recorder.events.borrow(),
            vec!["start:Saving configuration...", "fail:Failed to save configuration"]
        );
    }

    #[test]
    fn test_success_appends_finalize_step() {
        let dir = TempDir::new().unwrap();
        let (ctx, recorder) = context(&dir);
        let a = Rc::new(Cell::new(0));

        assert!(run_operations(&ctx, vec![counting("a", &a, false)], RunOptions::default()));
        assert_eq!(a.get(), 1);
        assert!(touched(&dir));
        assert_eq!(
            *recorder.events.borrow(),
            vec!["start:Saving configuration...", "succeed:Configuration saved"]
        );
    }

    /// Log sink shared with a scoped subscriber.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn debug_lines(logs: &LogBuffer) -> Vec<String> {
        String::from_utf8_lossy(&logs.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_steps_logged_before_running_and_finalize_last() {
        let dir = TempDir::new().unwrap();
        let (ctx, _) = context(&dir);
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_writer(move || writer.clone())
            .finish();

        let ok = tracing::subscriber::with_default(subscriber, || {
            let step = |name: &'static str| {
                Box::new(FnOperation::new(name, move || {
                    tracing::debug!("ran {}", name);
                    Ok(())
                })) as Box<dyn Operation>
            };
            run_operations(&ctx, vec![step("op_first"), step("op_second")], RunOptions::default())
        });
        assert!(ok);
        assert!(touched(&dir));

        let events: Vec<String> = debug_lines(&logs)
            .into_iter()
            .filter_map(|line| {
                line.split_once("Executing: ")
                    .map(|(_, name)| format!("exec:{}", name.trim()))
                    .or_else(|| line.split_once("ran ").map(|(_, name)| format!("ran:{}", name.trim())))
            })
            .collect();
        assert_eq!(
            events,
            vec![
                "exec:op_first",
                "ran:op_first",
                "exec:op_second",
                "ran:op_second",
                "exec:op_trigger_gateway_restart",
            ]
        );
    }

    #[test]
    fn test_auto_finalize_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let (ctx, _) = context(&dir);
        let a = Rc::new(Cell::new(0));
        let options = RunOptions {
            status_message: Some(Msg::FetchingModels),
            auto_finalize: false,
        };

        assert!(run_operations(&ctx, vec![counting("a", &a, false)], options));
        assert!(!touched(&dir));
    }

    #[test]
    fn test_full_provider_pipeline() {
        let dir = TempDir::new().unwrap();
        let (ctx, _) = context(&dir);
        let settings = ctx.settings.clone();

        let ok = run_operations(
            &ctx,
            vec![
                Box::new(set_provider_config(&settings, Provider::OpenAi, "https://www.packyapi.com/v1"))
                    as Box<dyn Operation>,
                Box::new(set_api_key(&settings, "openai", "sk-1")) as Box<dyn Operation>,
                Box::new(set_model(&settings, "openai/gpt-5")) as Box<dyn Operation>,
            ],
            RunOptions::default(),
        );

        assert!(ok);
        let config = ConfigStore::new(&settings).load().unwrap();
        assert_eq!(config.primary_model(), Some("openai/gpt-5"));
        assert_eq!(config.provider_base_url("openai"), Some("https://www.packyapi.com/v1"));
        assert!(config.meta.unwrap().last_touched_at.is_some());
        let profiles = AuthStore::new(&settings).load().unwrap();
        assert_eq!(profiles.get("openai").unwrap().key, "sk-1");
    }
}
