//! The bot host - wires listeners, services and plugins together

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::errors::BotError;
use crate::application::listeners::{ButtonListeners, DispatchReport, Listener, ListenerRegistry};
use crate::application::services::{CommandService, Leveling, Membership, MessageService, ReactionRoles, Reconciler};
use crate::domain::entities::Event;
use crate::domain::traits::{Platform, Store};
use crate::infrastructure::config::Config;
use crate::infrastructure::plugins::{PluginContext, PluginLoader, PluginRegistry};

type ShutdownHook = Box<dyn FnOnce() + Send>;

/// Handles the ready signal: starts plugins and the reconciliation timer
struct ReadyListener {
    plugins: Arc<PluginRegistry>,
    reconciler: Arc<Reconciler>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl ReadyListener {
    fn stop_timer(&self) {
        if let Some(handle) = self.timer.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl Listener for ReadyListener {
    fn name(&self) -> &str {
        "ready"
    }

    async fn on_event(&self, event: &Event) -> Result<(), BotError> {
        let Event::Ready { user } = event else {
            return Ok(());
        };
        tracing::info!("Logged in as {}", user.tag());

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        // The client re-sends ready after a reconnect
        if timer.is_some() {
            return Ok(());
        }
        self.plugins.started_all();
        *timer = Some(Arc::clone(&self.reconciler).spawn());
        Ok(())
    }
}

/// The bot host.
///
/// Construction loads plugins (running their `load` hooks), registers the
/// core listeners and collects plugin commands, so the bot is ready to take
/// events as soon as `new` returns.
pub struct Bot {
    config: Config,
    listeners: Arc<ListenerRegistry>,
    buttons: Arc<ButtonListeners>,
    commands: Arc<RwLock<CommandService>>,
    plugins: Arc<PluginRegistry>,
    ready: Arc<ReadyListener>,
    shutdown_hooks: Mutex<Vec<ShutdownHook>>,
}

impl Bot {
    pub fn new(config: Config, store: Arc<dyn Store>, platform: Arc<dyn Platform>) -> Self {
        let loader = PluginLoader::new(&config.plugins.directory);
        Self::with_loader(config, store, platform, loader)
    }

    pub fn with_loader(
        config: Config,
        store: Arc<dyn Store>,
        platform: Arc<dyn Platform>,
        loader: PluginLoader,
    ) -> Self {
        let listeners = Arc::new(ListenerRegistry::new());
        let buttons = Arc::new(ButtonListeners::new());

        let ctx = PluginContext::new(
            Arc::clone(&store),
            Arc::clone(&platform),
            Arc::clone(&listeners),
            Arc::clone(&buttons),
        );
        let plugins = Arc::new(loader.load_all(&ctx));
        tracing::info!(count = plugins.len(), "Plugin system initialized");

        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&store),
            Arc::clone(&platform),
            config.reconcile_interval(),
        ));
        let ready = Arc::new(ReadyListener {
            plugins: Arc::clone(&plugins),
            reconciler,
            timer: Mutex::new(None),
        });
        listeners.register(Arc::clone(&ready) as Arc<dyn Listener>);
        listeners.register(Arc::new(Membership::new(Arc::clone(&store), Arc::clone(&platform))));
        listeners.register(Arc::new(ReactionRoles::new(Arc::clone(&store), Arc::clone(&platform))));

        // Plugin commands go in before the first message can arrive
        let mut commands = CommandService::new(&config.bot.prefix);
        commands.register_defaults();
        plugins.register_commands(commands.registry_mut());
        let commands = Arc::new(RwLock::new(commands));

        let leveling = Leveling::new(Arc::clone(&store), config.leveling.points_per_message);
        listeners.register(Arc::new(MessageService::new(
            store,
            platform,
            Arc::clone(&commands),
            leveling,
            Arc::clone(&buttons),
        )));

        Self {
            config,
            listeners,
            buttons,
            commands,
            plugins,
            ready,
            shutdown_hooks: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }

    pub fn buttons(&self) -> &Arc<ButtonListeners> {
        &self.buttons
    }

    pub fn commands(&self) -> &Arc<RwLock<CommandService>> {
        &self.commands
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Whether the reconciliation timer is running
    pub fn timer_running(&self) -> bool {
        self.ready
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Deliver one event to every listener
    pub async fn handle(&self, event: Event) -> DispatchReport {
        tracing::trace!(event = event.kind(), "Dispatching event");
        self.listeners.dispatch(event).await
    }

    /// Process events until the sender side is dropped
    pub async fn run(&self, mut events: mpsc::Receiver<Event>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        tracing::info!("Event stream closed");
    }

    /// Run `hook` during [`Bot::shutdown`]
    pub fn on_shutdown(&self, hook: impl FnOnce() + Send + 'static) {
        self.shutdown_hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(hook));
    }

    /// Best-effort shutdown: stop the timer and run shutdown hooks.
    /// In-flight platform requests and plugin work are not drained.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down");
        self.ready.stop_timer();

        let hooks = std::mem::take(&mut *self.shutdown_hooks.lock().unwrap_or_else(PoisonError::into_inner));
        for hook in hooks {
            hook();
        }
        tracing::info!("Finished, exiting");
    }
}
