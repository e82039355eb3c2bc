//! Façade behavior: permission gating, UI surface bookkeeping, commands,
//! messaging, and teardown.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};

use snapper_api::{
    ApiError, CommandOutput, CoreServices, PanelOptions, SnappApi, TabEventKind, TabOptions,
    TabUpdate, ToastOptions,
};
use snapper_bus::MessageBus;
use snapper_core::{HookEvent, HookPayload, Permission, SnappState};
use snapper_hooks::{HookCallback, HookOptions, HookRouter};
use snapper_registry::Manifest;
use snapper_state::{PersistOptions, StateStore};

fn manifest(id: &str, permissions: &[&str]) -> Manifest {
    let (manifest, _) = Manifest::from_value(&json!({
        "id": id,
        "name": format!("App {id}"),
        "entry": "./index",
        "version": "1.2.3",
        "permissions": permissions,
        "openclaw": { "minVersion": "2.0.0" }
    }))
    .unwrap();
    manifest
}

struct Fixture {
    _tmp: tempfile::TempDir,
    services: CoreServices,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        Self {
            services: CoreServices {
                state: Arc::new(StateStore::new(tmp.path())),
                hooks: Arc::new(HookRouter::new()),
                bus: MessageBus::new(),
            },
            _tmp: tmp,
        }
    }

    fn api(&self, id: &str, permissions: &[&str]) -> SnappApi {
        let manifest = manifest(id, permissions);
        let granted = manifest.granted_permissions();
        SnappApi::new(
            manifest,
            SnappState::Active,
            granted,
            self.services.clone(),
            "/workspace",
        )
    }
}

fn deep_value() -> Value {
    json!({"nested": {"list": [1, 2, 3]}, "flag": true})
}

#[tokio::test]
async fn identity_surface() {
    let fixture = Fixture::new();
    let api = fixture.api("notes", &["storage:read"]);

    assert_eq!(api.id().as_str(), "notes");
    assert_eq!(api.state(), SnappState::Active);
    assert_eq!(api.working_directory().to_str(), Some("/workspace"));

    let version = api.version_info();
    assert_eq!(version.version.as_deref(), Some("1.2.3"));
    assert_eq!(version.api_version, "1.0.0");
}

#[tokio::test]
async fn storage_permission_gate() {
    let fixture = Fixture::new();
    let api = fixture.api("notes", &["storage:read"]);

    // Write without storage:write is denied with the missing tag named.
    let err = api
        .persist("k", json!(1), PersistOptions::default())
        .await
        .unwrap_err();
    match err {
        ApiError::PermissionDenied(tag) => assert_eq!(tag, Permission::StorageWrite),
        other => panic!("expected PermissionDenied, got {other}"),
    }

    // Read with storage:read succeeds, returning the default on miss.
    let value = api.restore("k", json!("fallback"), None).await.unwrap();
    assert_eq!(value, json!("fallback"));

    // Delete needs storage:delete.
    let err = api.remove("k", None).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::PermissionDenied(Permission::StorageDelete)
    ));
}

#[tokio::test]
async fn storage_round_trip_with_grants() {
    let fixture = Fixture::new();
    let api = fixture.api(
        "notes",
        &["storage:read", "storage:write", "storage:delete"],
    );

    api.persist("doc", deep_value(), PersistOptions::default())
        .await
        .unwrap();
    assert_eq!(
        api.restore("doc", json!(null), None).await.unwrap(),
        deep_value()
    );
    assert_eq!(api.list_keys(None).await.unwrap(), vec!["doc"]);

    api.remove("doc", None).await.unwrap();
    assert_eq!(
        api.restore("doc", json!("gone"), None).await.unwrap(),
        json!("gone")
    );

    api.persist("other", json!(1), PersistOptions::default())
        .await
        .unwrap();
    api.clear(None).await.unwrap();
    assert!(api.list_keys(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn tab_lifecycle_and_events() {
    let fixture = Fixture::new();
    let api = fixture.api("board", &["ui:tab"]);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);
    api.on_tab_event(move |event| {
        events_clone
            .lock()
            .unwrap()
            .push((event.kind, event.tab_id.clone()));
        Ok(())
    })
    .unwrap();

    let first = api.register_tab(TabOptions {
        title: "Overview".into(),
        icon: None,
    })
    .unwrap();
    let second = api.register_tab(TabOptions {
        title: "Details".into(),
        icon: Some("list".into()),
    })
    .unwrap();

    assert_eq!(first, "tab_board_1");
    assert_eq!(second, "tab_board_2");

    let tabs = api.get_tabs().unwrap();
    assert_eq!(tabs.len(), 2);
    // The most recently registered tab is the active one.
    assert!(!tabs[0].active);
    assert!(tabs[1].active);

    assert!(api.activate_tab(&first).unwrap());
    let tabs = api.get_tabs().unwrap();
    assert!(tabs[0].active);
    assert!(!tabs[1].active);

    assert!(api.update_tab(&first, TabUpdate {
        title: Some("Summary".into()),
        icon: None,
    })
    .unwrap());
    assert_eq!(api.get_tabs().unwrap()[0].title, "Summary");

    assert!(api.unregister_tab(&second).unwrap());
    assert!(!api.unregister_tab(&second).unwrap());

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (TabEventKind::Activated, "tab_board_1".to_string()),
            (TabEventKind::Activated, "tab_board_2".to_string()),
            (TabEventKind::Activated, "tab_board_1".to_string()),
            (TabEventKind::Updated, "tab_board_1".to_string()),
            (TabEventKind::Closed, "tab_board_2".to_string()),
        ]
    );
}

#[tokio::test]
async fn tab_event_callback_failures_are_swallowed() {
    let fixture = Fixture::new();
    let api = fixture.api("board", &["ui:tab"]);

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    api.on_tab_event(|_| anyhow::bail!("listener bug")).unwrap();
    api.on_tab_event(move |_| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    api.register_tab(TabOptions {
        title: "T".into(),
        icon: None,
    })
    .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn tabs_require_permission() {
    let fixture = Fixture::new();
    let api = fixture.api("board", &[]);
    assert!(matches!(
        api.register_tab(TabOptions::default()),
        Err(ApiError::PermissionDenied(Permission::UiTab))
    ));
    assert!(matches!(
        api.get_tabs(),
        Err(ApiError::PermissionDenied(Permission::UiTab))
    ));
}

#[tokio::test]
async fn panel_toggle() {
    let fixture = Fixture::new();
    let api = fixture.api("board", &["ui:panel"]);

    let id = api.register_panel(PanelOptions {
        title: "Files".into(),
        icon: None,
        expanded: false,
    })
    .unwrap();
    assert_eq!(id, "panel_board_1");

    // No explicit value flips the flag.
    assert!(api.toggle_panel(&id, None).unwrap());
    assert!(api.get_panels().unwrap()[0].expanded);
    assert!(api.toggle_panel(&id, None).unwrap());
    assert!(!api.get_panels().unwrap()[0].expanded);

    // An explicit value sets it.
    assert!(api.toggle_panel(&id, Some(true)).unwrap());
    assert!(api.get_panels().unwrap()[0].expanded);

    assert!(!api.toggle_panel("panel_board_99", None).unwrap());
    assert!(api.unregister_panel(&id).unwrap());
}

#[tokio::test]
async fn toast_forwarded_over_bus() {
    let fixture = Fixture::new();
    let api = fixture.api("board", &["ui:toast"]);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    fixture
        .services
        .bus
        .subscribe("ui:toast", Some("host"), move |message, sender| {
            seen_clone
                .lock()
                .unwrap()
                .push((message.clone(), sender.map(str::to_string)));
            Ok(())
        });

    api.show_toast(&ToastOptions {
        message: "saved".into(),
        ..Default::default()
    })
    .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (payload, sender) = &seen[0];
    assert_eq!(payload["snappId"], "board");
    assert_eq!(payload["message"], "saved");
    assert_eq!(sender.as_deref(), Some("board"));

    let no_grant = fixture.api("quiet", &[]);
    assert!(matches!(
        no_grant.show_toast(&ToastOptions::default()),
        Err(ApiError::PermissionDenied(Permission::UiToast))
    ));
}

#[tokio::test]
async fn command_registration_and_execution() {
    let fixture = Fixture::new();
    let api = fixture.api("todo", &["command:register"]);
    api.set_session_id(Some("session-7".into()));

    let qualified = api
        .register_command("add", "Add an item", |args, ctx| async move {
            assert_eq!(ctx.session_id.as_deref(), Some("session-7"));
            ctx.reply("adding");
            Ok(CommandOutput::ok_with_message(format!(
                "added {}",
                args.positional.join(" ")
            )))
        })
        .unwrap();
    assert_eq!(qualified, "todo:add");

    let replies = Arc::new(Mutex::new(Vec::new()));
    let replies_clone = Arc::clone(&replies);
    fixture
        .services
        .bus
        .subscribe("command:reply", Some("shell"), move |message, _| {
            replies_clone.lock().unwrap().push(message.clone());
            Ok(())
        });

    let output = api.execute_command("todo:add milk eggs").await;
    assert!(output.success);
    assert_eq!(output.message.as_deref(), Some("added milk eggs"));

    let replies = replies.lock().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["text"], "adding");
    assert_eq!(replies[0]["snappId"], "todo");
}

#[tokio::test]
async fn command_edge_cases() {
    let fixture = Fixture::new();
    let api = fixture.api("todo", &["command:register"]);

    // Unknown command.
    let output = api.execute_command("todo:missing").await;
    assert!(!output.success);
    assert_eq!(output.message.as_deref(), Some("unknown command: todo:missing"));

    // Empty line.
    let output = api.execute_command("   ").await;
    assert!(!output.success);

    // Handler failure is caught, not raised.
    api.register_command("boom", "Always fails", |_, _| async {
        anyhow::bail!("kaput")
    })
    .unwrap();
    let output = api.execute_command("todo:boom").await;
    assert!(!output.success);
    assert_eq!(output.message.as_deref(), Some("kaput"));

    // Without the grant, registration is denied.
    let no_grant = fixture.api("other", &[]);
    assert!(matches!(
        no_grant.register_command("x", "", |_, _| async { Ok(CommandOutput::ok()) }),
        Err(ApiError::PermissionDenied(Permission::CommandRegister))
    ));
}

#[tokio::test]
async fn command_args_positional_only() {
    let fixture = Fixture::new();
    let api = fixture.api("todo", &["command:register"]);

    let captured = Arc::new(Mutex::new(None));
    let captured_clone = Arc::clone(&captured);
    api.register_command("inspect", "Echo args", move |args, _| {
        let captured = Arc::clone(&captured_clone);
        async move {
            *captured.lock().unwrap() = Some(args);
            Ok(CommandOutput::ok())
        }
    })
    .unwrap();

    api.execute_command("todo:inspect --flag value positional").await;
    let args = captured.lock().unwrap().take().unwrap();
    // The minimal parse: everything after the name is positional.
    assert_eq!(args.positional, vec!["--flag", "value", "positional"]);
    assert!(args.options.is_empty());
    assert!(args.flags.is_empty());
    assert_eq!(args.raw, "todo:inspect --flag value positional");
}

#[tokio::test]
async fn hooks_gated_and_routed() {
    let fixture = Fixture::new();
    let api = fixture.api("watcher", &["session:hook"]);

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    api.on_hook(
        HookEvent::SessionStart,
        HookCallback::sync(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        HookOptions::default(),
    )
    .unwrap();

    fixture
        .services
        .hooks
        .emit(HookPayload::SessionStart {
            session_id: "s".into(),
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let no_grant = fixture.api("deaf", &[]);
    assert!(matches!(
        no_grant.on_hook(
            HookEvent::SessionStart,
            HookCallback::sync(|_| Ok(())),
            HookOptions::default()
        ),
        Err(ApiError::PermissionDenied(Permission::SessionHook))
    ));
}

#[tokio::test]
async fn prompt_context_forwarded() {
    let fixture = Fixture::new();
    let api = fixture.api("context", &["prompt:inject"]);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    fixture
        .services
        .bus
        .subscribe("prompt:context", Some("host"), move |message, _| {
            seen_clone.lock().unwrap().push(message.clone());
            Ok(())
        });

    api.inject_prompt_context("remember the milk", Some(5)).unwrap();
    api.inject_prompt_context("no priority", None).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["snappId"], "context");
    assert_eq!(seen[0]["text"], "remember the milk");
    assert_eq!(seen[0]["priority"], 5);
    assert!(seen[1].get("priority").is_none());
}

#[tokio::test]
async fn messaging_gated_and_attributed() {
    let fixture = Fixture::new();
    let publisher = fixture.api("pub", &["bus:publish"]);
    let subscriber = fixture.api("sub", &["bus:subscribe"]);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    subscriber
        .subscribe("news", move |message, sender| {
            seen_clone
                .lock()
                .unwrap()
                .push((message.clone(), sender.map(str::to_string)));
            Ok(())
        })
        .unwrap();

    let delivered = publisher.publish("news", &json!({"headline": "hi"})).unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(seen.lock().unwrap()[0].1.as_deref(), Some("pub"));

    assert!(matches!(
        subscriber.publish("news", &json!(null)),
        Err(ApiError::PermissionDenied(Permission::BusPublish))
    ));
    assert!(matches!(
        publisher.subscribe("news", |_, _| Ok(())),
        Err(ApiError::PermissionDenied(Permission::BusSubscribe))
    ));
}

#[tokio::test]
async fn dispose_clears_everything_and_is_idempotent() {
    let fixture = Fixture::new();
    let api = fixture.api(
        "full",
        &[
            "ui:tab",
            "ui:panel",
            "command:register",
            "session:hook",
            "bus:subscribe",
        ],
    );

    api.register_tab(TabOptions {
        title: "T".into(),
        icon: None,
    })
    .unwrap();
    api.register_panel(PanelOptions {
        title: "P".into(),
        icon: None,
        expanded: false,
    })
    .unwrap();
    api.register_command("c", "cmd", |_, _| async { Ok(CommandOutput::ok()) })
        .unwrap();

    let hook_calls = Arc::new(AtomicUsize::new(0));
    let hook_calls_clone = Arc::clone(&hook_calls);
    api.on_hook(
        HookEvent::SessionStart,
        HookCallback::sync(move |_| {
            hook_calls_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        HookOptions::default(),
    )
    .unwrap();

    let bus_calls = Arc::new(AtomicUsize::new(0));
    let bus_calls_clone = Arc::clone(&bus_calls);
    api.subscribe("ch", move |_, _| {
        bus_calls_clone.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    api.dispose();
    api.dispose(); // idempotent

    assert!(api.get_tabs().unwrap().is_empty());
    assert!(api.get_panels().unwrap().is_empty());
    assert!(api.command_descriptions().is_empty());
    assert!(!api.execute_command("full:c").await.success);

    fixture
        .services
        .hooks
        .emit(HookPayload::SessionStart {
            session_id: "s".into(),
        })
        .await;
    assert_eq!(hook_calls.load(Ordering::SeqCst), 0);

    fixture.services.bus.publish("ch", &json!(1), None);
    assert_eq!(bus_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn has_permission_reflects_grants() {
    let fixture = Fixture::new();
    let api = fixture.api("perms", &["storage:read", "ui:toast"]);

    assert!(api.has_permission(Permission::StorageRead));
    assert!(api.has_permission(Permission::UiToast));
    assert!(!api.has_permission(Permission::StorageWrite));
    assert!(!api.has_permission(Permission::SystemExec));
}

#[tokio::test]
async fn unknown_manifest_permissions_are_never_granted() {
    let fixture = Fixture::new();
    // "quantum:entangle" survives validation as a warning but confers
    // nothing.
    let api = fixture.api("odd", &["storage:read", "quantum:entangle"]);
    assert!(api.has_permission(Permission::StorageRead));
    assert_eq!(api.manifest().permissions.len(), 2);
}
