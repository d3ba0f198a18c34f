// Integration tests for hook broadcast and result merging.

mod common;

use std::sync::{Arc, Mutex};

use common::{clear, entries, journal, ModuleSpec};
use gantry_kernel::{Capabilities, FactorySource, Hook, HookOutput, ModuleHost};
use serde_json::json;

async fn loaded_host(source: FactorySource, keys: &[&str]) -> ModuleHost {
    let mut host = ModuleHost::new(source);
    for key in keys {
        host.request_load(key, "app");
    }
    host.run_until_loaded().await;
    host
}

#[tokio::test]
async fn test_broadcast_merges_list_results_in_invocation_order() {
    let journal = journal();
    let source = FactorySource::new()
        .with(
            "a",
            ModuleSpec::new("a", Capabilities::ON_UPDATE, &journal)
                .output(Hook::OnUpdate, HookOutput::list([json!(1)]))
                .factory(),
        )
        .with(
            "b",
            ModuleSpec::new("b", Capabilities::ON_UPDATE, &journal)
                .output(Hook::OnUpdate, HookOutput::list([json!(2), json!(3)]))
                .factory(),
        )
        .with(
            "c",
            ModuleSpec::new("c", Capabilities::ON_UPDATE, &journal)
                .output(Hook::OnUpdate, HookOutput::list([]))
                .factory(),
        );
    let mut host = loaded_host(source, &["a", "b", "c"]).await;
    host.enable_context("app");

    let merged = host.broadcast(Hook::OnUpdate);

    assert_eq!(merged, HookOutput::list([json!(1), json!(2), json!(3)]));
}

#[tokio::test]
async fn test_broadcast_merges_map_results_later_wins() {
    let journal = journal();
    let source = FactorySource::new()
        .with(
            "a",
            ModuleSpec::new("a", Capabilities::ON_UPDATE, &journal)
                .output(
                    Hook::OnUpdate,
                    HookOutput::map([("a".to_string(), json!(1))]),
                )
                .factory(),
        )
        .with(
            "b",
            ModuleSpec::new("b", Capabilities::ON_UPDATE, &journal)
                .output(
                    Hook::OnUpdate,
                    HookOutput::map([("a".to_string(), json!(2)), ("b".to_string(), json!(3))]),
                )
                .factory(),
        );
    let mut host = loaded_host(source, &["a", "b"]).await;
    host.enable_context("app");

    let merged = host.broadcast(Hook::OnUpdate);

    assert_eq!(
        merged,
        HookOutput::map([("a".to_string(), json!(2)), ("b".to_string(), json!(3))])
    );
}

#[tokio::test]
async fn test_broadcast_of_unimplemented_hook_is_empty() {
    let journal = journal();
    let source = FactorySource::new().with(
        "a",
        ModuleSpec::new("a", Capabilities::ON_UPDATE, &journal).factory(),
    );
    let mut host = loaded_host(source, &["a"]).await;
    host.enable_context("app");

    assert!(host.broadcast(Hook::BeforeRenderLate).is_empty());
}

#[tokio::test]
async fn test_broadcast_skips_disabled_modules() {
    let journal = journal();
    let source = FactorySource::new()
        .with(
            "on",
            ModuleSpec::new("on", Capabilities::ON_UPDATE, &journal)
                .output(Hook::OnUpdate, HookOutput::list([json!("on")]))
                .factory(),
        )
        .with(
            "off",
            ModuleSpec::new("off", Capabilities::ON_UPDATE, &journal)
                .output(Hook::OnUpdate, HookOutput::list([json!("off")]))
                .factory(),
        );
    let mut host = loaded_host(source, &["on", "off"]).await;
    host.enable("on");
    clear(&journal);

    let merged = host.broadcast(Hook::OnUpdate);

    assert_eq!(merged, HookOutput::list([json!("on")]));
    assert_eq!(entries(&journal), vec!["update:on"]);
}

#[tokio::test]
async fn test_broadcast_isolates_a_panicking_module() {
    let journal = journal();
    let source = FactorySource::new()
        .with(
            "bad",
            ModuleSpec::new("bad", Capabilities::ON_UPDATE, &journal)
                .panics_on_update()
                .factory(),
        )
        .with(
            "good",
            ModuleSpec::new("good", Capabilities::ON_UPDATE, &journal)
                .output(Hook::OnUpdate, HookOutput::list([json!("ok")]))
                .factory(),
        );
    let mut host = loaded_host(source, &["bad", "good"]).await;
    host.enable_context("app");

    let merged = host.broadcast(Hook::OnUpdate);

    // The panic is contained; the healthy module still contributes.
    assert_eq!(merged, HookOutput::list([json!("ok")]));
}

#[tokio::test]
async fn test_broadcast_with_input_feeds_merged_payload() {
    let journal = journal();
    let scene = Arc::new(Mutex::new(None));
    let source = FactorySource::new()
        .with(
            "balls",
            ModuleSpec::new("balls", Capabilities::BEFORE_RENDER_EARLY, &journal)
                .output(Hook::BeforeRenderEarly, HookOutput::list([json!("ball")]))
                .factory(),
        )
        .with(
            "paddles",
            ModuleSpec::new("paddles", Capabilities::BEFORE_RENDER_EARLY, &journal)
                .output(Hook::BeforeRenderEarly, HookOutput::list([json!("paddle")]))
                .factory(),
        )
        .with(
            "renderer",
            ModuleSpec::new("renderer", Capabilities::ON_RENDER, &journal)
                .scene_slot(&scene)
                .factory(),
        );
    let mut host = loaded_host(source, &["balls", "paddles", "renderer"]).await;
    host.enable_context("app");

    host.broadcast_with_input(Hook::BeforeRenderEarly, Hook::OnRender);

    let seen = scene.lock().unwrap().clone().expect("renderer saw scene");
    assert_eq!(seen, HookOutput::list([json!("ball"), json!("paddle")]));
}

#[tokio::test]
async fn test_broadcast_to_peers_is_context_scoped() {
    let journal = journal();
    let spec = |name: &'static str| {
        ModuleSpec::new(name, Capabilities::ON_UPDATE, &journal)
            .output(Hook::OnUpdate, HookOutput::list([json!(name)]))
    };
    let source = FactorySource::new()
        .with("a", spec("a").factory())
        .with("b", spec("b").factory())
        .with("other", spec("other").factory());
    let mut host = ModuleHost::new(source);
    host.request_load("a", "pong");
    host.request_load("b", "pong");
    host.request_load("other", "menu");
    host.run_until_loaded().await;
    host.enable("a");
    host.enable("b");
    host.enable("other");

    let merged = host.broadcast_to_peers("a", Hook::OnUpdate).unwrap();
    assert_eq!(merged, HookOutput::list([json!("a"), json!("b")]));

    assert!(host.broadcast_to_peers("ghost", Hook::OnUpdate).is_err());
}

#[tokio::test]
async fn test_undeclared_hook_is_never_invoked() {
    let journal = journal();
    // Overrides on_update but does not declare ON_UPDATE.
    let source = FactorySource::new().with(
        "shy",
        ModuleSpec::new("shy", Capabilities::INIT, &journal)
            .output(Hook::OnUpdate, HookOutput::list([json!(1)]))
            .factory(),
    );
    let mut host = loaded_host(source, &["shy"]).await;
    host.enable("shy");
    clear(&journal);

    assert!(host.broadcast(Hook::OnUpdate).is_empty());
    assert!(host.invoke("shy", Hook::OnUpdate).is_empty());
    assert!(entries(&journal).is_empty());
}

#[tokio::test]
async fn test_broadcast_all_ignores_enabled_state() {
    let journal = journal();
    let source = FactorySource::new()
        .with(
            "a",
            ModuleSpec::new("a", Capabilities::INIT, &journal).factory(),
        )
        .with(
            "b",
            ModuleSpec::new("b", Capabilities::INIT, &journal).factory(),
        );
    let mut host = loaded_host(source, &["a", "b"]).await;
    host.enable("a");
    clear(&journal);

    host.broadcast_all(Hook::Init);

    assert_eq!(entries(&journal), vec!["init:a", "init:b"]);
}
