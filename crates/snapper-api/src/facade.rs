//! The per-SnApp façade.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use snapper_bus::{BusMessage, MessageBus, SubscriptionId};
use snapper_core::{HookEvent, Permission, SnappId, SnappState};
use snapper_hooks::{HookCallback, HookHandlerId, HookOptions, HookRouter};
use snapper_registry::Manifest;
use snapper_state::{PersistOptions, StateStore};

use crate::commands::{
    CommandArgs, CommandContext, CommandHandler, CommandOutput, RegisteredCommand,
};
use crate::error::{ApiError, ApiResult};
use crate::logger::SnappLogger;
use crate::surface::{
    PanelDefinition, PanelEvent, PanelOptions, TabDefinition, TabEvent, TabEventKind, TabOptions,
    TabUpdate, ToastOptions,
};

/// The façade's API version, reported via [`SnappApi::version_info`].
pub const API_VERSION: &str = "1.0.0";

/// Bus channel carrying toast definitions to the host.
const TOAST_CHANNEL: &str = "ui:toast";
/// Bus channel carrying injected prompt context to the host.
const PROMPT_CONTEXT_CHANNEL: &str = "prompt:context";
/// Bus channel carrying command reply lines to the shell.
const COMMAND_REPLY_CHANNEL: &str = "command:reply";

/// Version details reported to the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// The app's own manifest version, if declared.
    pub version: Option<String>,
    /// The façade API version.
    pub api_version: String,
}

/// The shared core services a façade is stitched over.
#[derive(Clone)]
pub struct CoreServices {
    /// The state store.
    pub state: Arc<StateStore>,
    /// The hook router.
    pub hooks: Arc<HookRouter>,
    /// The message bus.
    pub bus: MessageBus,
}

impl std::fmt::Debug for CoreServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreServices").finish_non_exhaustive()
    }
}

type TabCallback = Box<dyn Fn(&TabEvent) -> anyhow::Result<()> + Send + Sync>;
type PanelCallback = Box<dyn Fn(&PanelEvent) -> anyhow::Result<()> + Send + Sync>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToastEnvelope<'a> {
    snapp_id: &'a str,
    #[serde(flatten)]
    toast: &'a ToastOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptContextEnvelope<'a> {
    snapp_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<i32>,
}

/// The capability-gated surface one active SnApp sees.
///
/// Every gated operation checks the granted permission set and raises
/// [`ApiError::PermissionDenied`] naming the missing tag. The façade
/// holds no durable state; everything durable flows through the store.
pub struct SnappApi {
    id: SnappId,
    manifest: Manifest,
    state: SnappState,
    permissions: HashSet<Permission>,
    services: CoreServices,
    working_dir: PathBuf,
    logger: SnappLogger,

    session_id: RwLock<Option<String>>,
    tabs: RwLock<Vec<TabDefinition>>,
    panels: RwLock<Vec<PanelDefinition>>,
    tab_listeners: RwLock<Vec<TabCallback>>,
    panel_listeners: RwLock<Vec<PanelCallback>>,
    commands: RwLock<HashMap<String, RegisteredCommand>>,
    tab_counter: AtomicU64,
    panel_counter: AtomicU64,
    bus_subscriptions: Mutex<Vec<(String, SubscriptionId)>>,
    hook_subscriptions: Mutex<Vec<(HookEvent, HookHandlerId)>>,
    disposed: AtomicBool,
}

impl SnappApi {
    /// Construct a façade bound to one app's identity and grants.
    ///
    /// `state` is the app's lifecycle state at construction time;
    /// `permissions` is the granted set (normally
    /// [`Manifest::granted_permissions`]).
    #[must_use]
    pub fn new(
        manifest: Manifest,
        state: SnappState,
        permissions: Vec<Permission>,
        services: CoreServices,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        let id = manifest.id.clone();
        Self {
            logger: SnappLogger::new(id.clone()),
            id,
            manifest,
            state,
            permissions: permissions.into_iter().collect(),
            services,
            working_dir: working_dir.into(),
            session_id: RwLock::new(None),
            tabs: RwLock::new(Vec::new()),
            panels: RwLock::new(Vec::new()),
            tab_listeners: RwLock::new(Vec::new()),
            panel_listeners: RwLock::new(Vec::new()),
            commands: RwLock::new(HashMap::new()),
            tab_counter: AtomicU64::new(0),
            panel_counter: AtomicU64::new(0),
            bus_subscriptions: Mutex::new(Vec::new()),
            hook_subscriptions: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
        }
    }

    // ---- identity ----

    /// The app's id.
    #[must_use]
    pub fn id(&self) -> &SnappId {
        &self.id
    }

    /// The app's manifest.
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The app's lifecycle state at façade construction.
    #[must_use]
    pub fn state(&self) -> SnappState {
        self.state
    }

    /// Manifest and API version details.
    #[must_use]
    pub fn version_info(&self) -> VersionInfo {
        VersionInfo {
            version: self.manifest.version.clone(),
            api_version: API_VERSION.to_string(),
        }
    }

    /// The app's attributed logger.
    #[must_use]
    pub fn logger(&self) -> &SnappLogger {
        &self.logger
    }

    /// The working directory the app was bound to.
    #[must_use]
    pub fn working_directory(&self) -> &Path {
        &self.working_dir
    }

    /// Record the active session id, used by command contexts.
    pub fn set_session_id(&self, session_id: Option<String>) {
        *self.session_id.write().expect("lock poisoned") = session_id;
    }

    // ---- permissions ----

    /// Whether the app holds a capability tag.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    fn require(&self, permission: Permission) -> ApiResult<()> {
        if self.permissions.contains(&permission) {
            Ok(())
        } else {
            Err(ApiError::PermissionDenied(permission))
        }
    }

    // ---- state ----

    /// Store a value. Requires `storage:write`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant, or the store's
    /// write error.
    pub async fn persist(&self, key: &str, value: Value, opts: PersistOptions) -> ApiResult<()> {
        self.require(Permission::StorageWrite)?;
        self.services.state.persist(&self.id, key, value, opts).await?;
        Ok(())
    }

    /// Read a value, or `default` when missing/expired. Requires
    /// `storage:read`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub async fn restore(
        &self,
        key: &str,
        default: Value,
        namespace: Option<&str>,
    ) -> ApiResult<Value> {
        self.require(Permission::StorageRead)?;
        Ok(self
            .services
            .state
            .restore(&self.id, key, namespace)
            .await
            .unwrap_or(default))
    }

    /// Delete a value. Requires `storage:delete`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant, or the store's
    /// removal error.
    pub async fn remove(&self, key: &str, namespace: Option<&str>) -> ApiResult<()> {
        self.require(Permission::StorageDelete)?;
        self.services.state.remove(&self.id, key, namespace).await?;
        Ok(())
    }

    /// List live keys. Requires `storage:read`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub async fn list_keys(&self, namespace: Option<&str>) -> ApiResult<Vec<String>> {
        self.require(Permission::StorageRead)?;
        Ok(self.services.state.list_keys(&self.id, namespace).await)
    }

    /// Drop the whole namespace. Requires `storage:delete`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant, or the store's
    /// clear error.
    pub async fn clear(&self, namespace: Option<&str>) -> ApiResult<()> {
        self.require(Permission::StorageDelete)?;
        self.services.state.clear(&self.id, namespace).await?;
        Ok(())
    }

    // ---- tabs ----

    /// Register a tab. Requires `ui:tab`. Returns the generated tab id
    /// and emits an `activated` event.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn register_tab(&self, options: TabOptions) -> ApiResult<String> {
        self.require(Permission::UiTab)?;
        let counter = self.tab_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("tab_{}_{counter}", self.id);
        {
            let mut tabs = self.tabs.write().expect("lock poisoned");
            for tab in tabs.iter_mut() {
                tab.active = false;
            }
            tabs.push(TabDefinition {
                id: id.clone(),
                title: options.title,
                icon: options.icon,
                active: true,
            });
        }
        self.emit_tab_event(TabEventKind::Activated, &id);
        Ok(id)
    }

    /// Unregister a tab. Requires `ui:tab`. Emits a `closed` event when
    /// the tab existed.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn unregister_tab(&self, tab_id: &str) -> ApiResult<bool> {
        self.require(Permission::UiTab)?;
        let removed = {
            let mut tabs = self.tabs.write().expect("lock poisoned");
            let before = tabs.len();
            tabs.retain(|tab| tab.id != tab_id);
            tabs.len() != before
        };
        if removed {
            self.emit_tab_event(TabEventKind::Closed, tab_id);
        }
        Ok(removed)
    }

    /// Update a tab's definition. Requires `ui:tab`. Emits an `updated`
    /// event when the tab existed.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn update_tab(&self, tab_id: &str, update: TabUpdate) -> ApiResult<bool> {
        self.require(Permission::UiTab)?;
        let updated = {
            let mut tabs = self.tabs.write().expect("lock poisoned");
            match tabs.iter_mut().find(|tab| tab.id == tab_id) {
                Some(tab) => {
                    if let Some(title) = update.title {
                        tab.title = title;
                    }
                    if let Some(icon) = update.icon {
                        tab.icon = Some(icon);
                    }
                    true
                },
                None => false,
            }
        };
        if updated {
            self.emit_tab_event(TabEventKind::Updated, tab_id);
        }
        Ok(updated)
    }

    /// Bring a tab to the front. Requires `ui:tab`. Emits an `activated`
    /// event when the tab existed.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn activate_tab(&self, tab_id: &str) -> ApiResult<bool> {
        self.require(Permission::UiTab)?;
        let found = {
            let mut tabs = self.tabs.write().expect("lock poisoned");
            let found = tabs.iter().any(|tab| tab.id == tab_id);
            if found {
                for tab in tabs.iter_mut() {
                    tab.active = tab.id == tab_id;
                }
            }
            found
        };
        if found {
            self.emit_tab_event(TabEventKind::Activated, tab_id);
        }
        Ok(found)
    }

    /// The app's current tabs. Requires `ui:tab`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn get_tabs(&self) -> ApiResult<Vec<TabDefinition>> {
        self.require(Permission::UiTab)?;
        Ok(self.tabs.read().expect("lock poisoned").clone())
    }

    /// Subscribe to this app's tab events. Requires `ui:tab`. Callback
    /// failures are swallowed.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn on_tab_event<F>(&self, callback: F) -> ApiResult<()>
    where
        F: Fn(&TabEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.require(Permission::UiTab)?;
        self.tab_listeners
            .write()
            .expect("lock poisoned")
            .push(Box::new(callback));
        Ok(())
    }

    fn emit_tab_event(&self, kind: TabEventKind, tab_id: &str) {
        let event = TabEvent {
            kind,
            tab_id: tab_id.to_string(),
        };
        let listeners = self.tab_listeners.read().expect("lock poisoned");
        for callback in listeners.iter() {
            if let Err(e) = callback(&event) {
                warn!(snapp_id = %self.id, error = %e, "Tab event callback failed");
            }
        }
    }

    // ---- panels ----

    /// Register a panel. Requires `ui:panel`. Returns the generated
    /// panel id and emits an `activated` event.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn register_panel(&self, options: PanelOptions) -> ApiResult<String> {
        self.require(Permission::UiPanel)?;
        let counter = self.panel_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("panel_{}_{counter}", self.id);
        self.panels
            .write()
            .expect("lock poisoned")
            .push(PanelDefinition {
                id: id.clone(),
                title: options.title,
                icon: options.icon,
                expanded: options.expanded,
            });
        self.emit_panel_event(TabEventKind::Activated, &id);
        Ok(id)
    }

    /// Unregister a panel. Requires `ui:panel`. Emits a `closed` event
    /// when the panel existed.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn unregister_panel(&self, panel_id: &str) -> ApiResult<bool> {
        self.require(Permission::UiPanel)?;
        let removed = {
            let mut panels = self.panels.write().expect("lock poisoned");
            let before = panels.len();
            panels.retain(|panel| panel.id != panel_id);
            panels.len() != before
        };
        if removed {
            self.emit_panel_event(TabEventKind::Closed, panel_id);
        }
        Ok(removed)
    }

    /// Flip (or set) a panel's `expanded` flag. Requires `ui:panel`.
    /// Emits an `updated` event when the panel existed.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn toggle_panel(&self, panel_id: &str, expanded: Option<bool>) -> ApiResult<bool> {
        self.require(Permission::UiPanel)?;
        let toggled = {
            let mut panels = self.panels.write().expect("lock poisoned");
            match panels.iter_mut().find(|panel| panel.id == panel_id) {
                Some(panel) => {
                    panel.expanded = expanded.unwrap_or(!panel.expanded);
                    true
                },
                None => false,
            }
        };
        if toggled {
            self.emit_panel_event(TabEventKind::Updated, panel_id);
        }
        Ok(toggled)
    }

    /// The app's current panels. Requires `ui:panel`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn get_panels(&self) -> ApiResult<Vec<PanelDefinition>> {
        self.require(Permission::UiPanel)?;
        Ok(self.panels.read().expect("lock poisoned").clone())
    }

    /// Subscribe to this app's panel events. Requires `ui:panel`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn on_panel_event<F>(&self, callback: F) -> ApiResult<()>
    where
        F: Fn(&PanelEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.require(Permission::UiPanel)?;
        self.panel_listeners
            .write()
            .expect("lock poisoned")
            .push(Box::new(callback));
        Ok(())
    }

    fn emit_panel_event(&self, kind: TabEventKind, panel_id: &str) {
        let event = PanelEvent {
            kind,
            panel_id: panel_id.to_string(),
        };
        let listeners = self.panel_listeners.read().expect("lock poisoned");
        for callback in listeners.iter() {
            if let Err(e) = callback(&event) {
                warn!(snapp_id = %self.id, error = %e, "Panel event callback failed");
            }
        }
    }

    // ---- toasts ----

    /// Forward a toast to the host over the bus. Requires `ui:toast`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn show_toast(&self, options: &ToastOptions) -> ApiResult<()> {
        self.require(Permission::UiToast)?;
        let payload = serde_json::to_value(ToastEnvelope {
            snapp_id: self.id.as_str(),
            toast: options,
        })?;
        self.services
            .bus
            .publish(TOAST_CHANNEL, &payload, Some(self.id.as_str()));
        Ok(())
    }

    // ---- commands ----

    /// Register a terminal command under `<snapp>:<name>`. Requires
    /// `command:register`. A later registration with the same name
    /// replaces the earlier one.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn register_command<F, Fut>(
        &self,
        name: &str,
        description: impl Into<String>,
        handler: F,
    ) -> ApiResult<String>
    where
        F: Fn(CommandArgs, CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<CommandOutput>> + Send + 'static,
    {
        self.require(Permission::CommandRegister)?;
        let qualified = format!("{}:{name}", self.id);
        let handler: CommandHandler = Arc::new(move |args, ctx| Box::pin(handler(args, ctx)));
        self.commands.write().expect("lock poisoned").insert(
            qualified.clone(),
            RegisteredCommand {
                description: description.into(),
                handler,
            },
        );
        Ok(qualified)
    }

    /// Execute a command line.
    ///
    /// Tokenizes on whitespace and looks the first token up verbatim, so
    /// callers pass the qualified `<snapp>:<name>` form. Unknown commands
    /// and handler failures come back as unsuccessful outputs, never
    /// errors.
    pub async fn execute_command(&self, line: &str) -> CommandOutput {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return CommandOutput::failure("empty command");
        };

        let handler = {
            let commands = self.commands.read().expect("lock poisoned");
            commands
                .get(name)
                .map(|command| Arc::clone(&command.handler))
        };
        let Some(handler) = handler else {
            return CommandOutput::failure(format!("unknown command: {name}"));
        };

        let args = CommandArgs {
            positional: tokens.map(str::to_string).collect(),
            options: HashMap::new(),
            flags: Vec::new(),
            raw: line.to_string(),
        };
        let session_id = self.session_id.read().expect("lock poisoned").clone();
        let bus = self.services.bus.clone();
        let snapp_id = self.id.clone();
        let ctx = CommandContext::new(
            self.id.clone(),
            session_id,
            Arc::new(move |text| {
                let payload = serde_json::json!({
                    "snappId": snapp_id.as_str(),
                    "text": text,
                });
                bus.publish(COMMAND_REPLY_CHANNEL, &payload, Some(snapp_id.as_str()));
            }),
        );

        match handler(args, ctx).await {
            Ok(output) => output,
            Err(e) => CommandOutput::failure(e.to_string()),
        }
    }

    /// Registered command names with their descriptions, qualified form.
    #[must_use]
    pub fn command_descriptions(&self) -> Vec<(String, String)> {
        let commands = self.commands.read().expect("lock poisoned");
        let mut list: Vec<(String, String)> = commands
            .iter()
            .map(|(name, command)| (name.clone(), command.description.clone()))
            .collect();
        list.sort();
        list
    }

    // ---- hooks ----

    /// Subscribe to a host lifecycle hook. Requires `session:hook`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn on_hook(
        &self,
        event: HookEvent,
        callback: HookCallback,
        options: HookOptions,
    ) -> ApiResult<HookHandlerId> {
        self.require(Permission::SessionHook)?;
        let id = self.services.hooks.on(event, callback, options);
        self.hook_subscriptions
            .lock()
            .expect("lock poisoned")
            .push((event, id));
        Ok(id)
    }

    /// Subscribe to a hook for exactly one delivery. Requires
    /// `session:hook`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn once_hook(&self, event: HookEvent, callback: HookCallback) -> ApiResult<HookHandlerId> {
        self.require(Permission::SessionHook)?;
        let id = self.services.hooks.once(event, callback);
        self.hook_subscriptions
            .lock()
            .expect("lock poisoned")
            .push((event, id));
        Ok(id)
    }

    /// Unsubscribe a hook handler registered through this façade.
    pub fn off_hook(&self, event: HookEvent, id: HookHandlerId) -> bool {
        self.hook_subscriptions
            .lock()
            .expect("lock poisoned")
            .retain(|(_, handler_id)| *handler_id != id);
        self.services.hooks.off(event, id)
    }

    // ---- context ----

    /// Hand prompt context to the host. Requires `prompt:inject`.
    /// `priority` is forwarded verbatim; the core assigns it no
    /// semantics.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn inject_prompt_context(&self, text: &str, priority: Option<i32>) -> ApiResult<()> {
        self.require(Permission::PromptInject)?;
        let payload = serde_json::to_value(PromptContextEnvelope {
            snapp_id: self.id.as_str(),
            text,
            priority,
        })?;
        self.services
            .bus
            .publish(PROMPT_CONTEXT_CHANNEL, &payload, Some(self.id.as_str()));
        Ok(())
    }

    // ---- messaging ----

    /// Publish a message with this app as sender. Requires
    /// `bus:publish`. Returns the number of subscribers reached.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn publish(&self, channel: &str, message: &BusMessage) -> ApiResult<usize> {
        self.require(Permission::BusPublish)?;
        Ok(self
            .services
            .bus
            .publish(channel, message, Some(self.id.as_str())))
    }

    /// Subscribe to a channel with this app as subscriber. Requires
    /// `bus:subscribe`. The subscription is torn down on
    /// [`dispose`](Self::dispose).
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] without the grant.
    pub fn subscribe<F>(&self, channel: &str, handler: F) -> ApiResult<SubscriptionId>
    where
        F: Fn(&BusMessage, Option<&str>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.require(Permission::BusSubscribe)?;
        let id = self
            .services
            .bus
            .subscribe(channel, Some(self.id.as_str()), handler);
        self.bus_subscriptions
            .lock()
            .expect("lock poisoned")
            .push((channel.to_string(), id));
        Ok(id)
    }

    /// Remove a subscription taken through this façade.
    pub fn unsubscribe(&self, channel: &str, id: SubscriptionId) -> bool {
        self.bus_subscriptions
            .lock()
            .expect("lock poisoned")
            .retain(|(_, sub_id)| *sub_id != id);
        self.services.bus.unsubscribe(channel, id)
    }

    // ---- teardown ----

    /// Tear the façade down: clears tabs, panels, commands, event
    /// callbacks, and every hook/bus subscription taken through it.
    /// Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.tabs.write().expect("lock poisoned").clear();
        self.panels.write().expect("lock poisoned").clear();
        self.commands.write().expect("lock poisoned").clear();
        self.tab_listeners.write().expect("lock poisoned").clear();
        self.panel_listeners.write().expect("lock poisoned").clear();

        let hook_subscriptions: Vec<_> = std::mem::take(
            &mut *self.hook_subscriptions.lock().expect("lock poisoned"),
        );
        for (event, id) in hook_subscriptions {
            self.services.hooks.off(event, id);
        }

        let bus_subscriptions: Vec<_> =
            std::mem::take(&mut *self.bus_subscriptions.lock().expect("lock poisoned"));
        for (channel, id) in bus_subscriptions {
            self.services.bus.unsubscribe(&channel, id);
        }

        self.logger.info("disposed");
    }
}

impl std::fmt::Debug for SnappApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnappApi")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("permissions", &self.permissions.len())
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
