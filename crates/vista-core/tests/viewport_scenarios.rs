// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end viewport behaviour: root swaps, driver fan-out, capture and
//! hit-test routing, hover and scene death.

use glam::{Affine2, Vec2};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use vista_core::{
    Action, DriverMsg, DynamicScene, GraphKey, HitMissPolicy, Input, InputType, MemoryGraphStore,
    Modifiers, MouseButton, NoSupervisor, SceneId, SceneSupervisor, TransformContext, ViewPort,
    ViewPortConfig, ViewPortInfo,
};
use vista_dry_tests::graphs::{split, SplitLayout};
use vista_dry_tests::{connect_driver, CallLog, RecordingScene, RecordingSupervisor, SceneEvent};

const QUIET: Duration = Duration::from_millis(100);

struct Rig {
    viewport: ViewPort,
    graphs: Arc<MemoryGraphStore>,
    _task: JoinHandle<()>,
}

fn rig(config: ViewPortConfig, supervisor: Arc<dyn SceneSupervisor>) -> Rig {
    let graphs = Arc::new(MemoryGraphStore::new());
    let (viewport, task) = ViewPort::start(config, supervisor, graphs.clone());
    Rig {
        viewport,
        graphs,
        _task: task,
    }
}

fn static_rig() -> Rig {
    rig(ViewPortConfig::default(), Arc::new(NoSupervisor))
}

fn device(viewport: &ViewPort) -> TransformContext {
    viewport.device_context(Affine2::IDENTITY)
}

fn click(x: f32, y: f32) -> Input {
    Input::CursorButton {
        button: MouseButton::Left,
        action: Action::Press,
        mods: Modifiers::default(),
        pos: Vec2::new(x, y),
    }
}

fn key(name: &str) -> Input {
    Input::Key {
        key: name.into(),
        action: Action::Press,
        mods: Modifiers::default(),
    }
}

async fn wait_for(viewport: &ViewPort, pred: impl Fn(&ViewPortInfo) -> bool) -> ViewPortInfo {
    timeout(Duration::from_secs(2), async {
        loop {
            let info = viewport.info().await.unwrap();
            if pred(&info) {
                return info;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("viewport never reached the expected state")
}

async fn wait_for_log(log: &CallLog, entry: &str) {
    timeout(Duration::from_secs(2), async {
        while log.position(entry).is_none() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("{entry} never logged; log = {:?}", log.entries()));
}

fn assert_near(a: Vec2, b: Vec2) {
    assert!((a - b).length() < 1e-4, "{a} != {b}");
}

#[tokio::test]
async fn pointer_walk_routes_to_components_with_hover() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let (root, mut root_tap, _rt) = RecordingScene::spawn("root");
    let (left, mut left_tap, _lt) = RecordingScene::spawn("left");
    let (right, mut right_tap, _rrt) = RecordingScene::spawn("right");
    let SplitLayout {
        background,
        left_button,
        right_button,
    } = split(&rig.graphs, root.id(), left.id(), right.id()).unwrap();

    let mut driver = connect_driver(vp).unwrap();
    assert_eq!(driver.next().await, Some(DriverMsg::SetRoot(None)));

    vp.monitor(&left).unwrap();
    vp.monitor(&right).unwrap();
    vp.set_root(root, json!({"mode": "demo"})).unwrap();
    assert_eq!(
        driver.next().await,
        Some(DriverMsg::SetRoot(Some(GraphKey::new("root"))))
    );
    match root_tap.next().await {
        Some(SceneEvent::Activated { args, context }) => {
            assert_eq!(args, json!({"mode": "demo"}));
            assert_eq!(context.graph_key(), &GraphKey::new("root"));
        }
        other => panic!("expected activation, got {other:?}"),
    }

    let dev = device(vp);
    vp.input(&dev, Input::CursorPos(Vec2::new(60.0, 60.0))).unwrap();
    assert_eq!(left_tap.next().await, Some(SceneEvent::Enter(left_button)));
    match left_tap.next().await {
        Some(SceneEvent::Input {
            input: Input::CursorPos(p),
            context,
        }) => {
            assert_near(p, Vec2::new(50.0, 50.0));
            assert_eq!(context.graph_key(), &GraphKey::new("left"));
            assert_eq!(context.node(), Some(left_button));
        }
        other => panic!("expected cursor input, got {other:?}"),
    }

    vp.input(&dev, Input::CursorPos(Vec2::new(250.0, 60.0))).unwrap();
    assert_eq!(left_tap.next().await, Some(SceneEvent::Exit(left_button)));
    assert_eq!(right_tap.next().await, Some(SceneEvent::Enter(right_button)));
    let (input, _) = right_tap.next_input().await.unwrap();
    assert_near(input.position().unwrap(), Vec2::new(50.0, 50.0));

    let info = vp.info().await.unwrap();
    let hover = info.hover.unwrap();
    assert_eq!(hover.scene, SceneId::new("right"));
    assert_eq!(hover.primitive, right_button);

    // Background belongs to the root graph itself.
    vp.input(&dev, click(150.0, 200.0)).unwrap();
    let (input, context) = root_tap.next_input().await.unwrap();
    assert_near(input.position().unwrap(), Vec2::new(150.0, 200.0));
    assert_eq!(context.node(), Some(background));
    assert!(left_tap.quiet_for(QUIET).await);
}

#[tokio::test]
async fn static_root_capture_then_release_returns_to_hit_testing() {
    let rig = static_rig();
    let vp = &rig.viewport;
    assert_eq!(vp.request_root().await.unwrap(), None);

    let (root, mut root_tap, _rt) = RecordingScene::spawn("static_scene");
    let (left, mut left_tap, _lt) = RecordingScene::spawn("left");
    let (right, _rp, _rrt) = RecordingScene::spawn("right");
    let layout = split(&rig.graphs, root.id(), left.id(), right.id()).unwrap();
    vp.monitor(&left).unwrap();

    let mut early = connect_driver(vp).unwrap();
    assert_eq!(early.next().await, Some(DriverMsg::SetRoot(None)));
    vp.set_root(root.clone(), Value::Null).unwrap();
    let key = GraphKey::new("static_scene");
    assert_eq!(early.next().await, Some(DriverMsg::SetRoot(Some(key.clone()))));

    let mut late = connect_driver(vp).unwrap();
    assert_eq!(late.next().await, Some(DriverMsg::SetRoot(Some(key.clone()))));

    let root_ctx = TransformContext::new(vp.id(), key);
    vp.capture_input(&root, &root_ctx, &[InputType::CursorButton])
        .unwrap();
    vp.input(&device(vp), click(60.0, 60.0)).unwrap();
    assert!(matches!(root_tap.next().await, Some(SceneEvent::Activated { .. })));
    let (input, context) = root_tap.next_input().await.unwrap();
    assert_near(input.position().unwrap(), Vec2::new(60.0, 60.0));
    assert_eq!(context.node(), None);
    assert!(left_tap.quiet_for(QUIET).await);

    vp.release_input(&root, &[InputType::CursorButton]).unwrap();
    vp.input(&device(vp), click(60.0, 60.0)).unwrap();
    let (input, context) = left_tap.next_input().await.unwrap();
    assert_near(input.position().unwrap(), Vec2::new(50.0, 50.0));
    assert_eq!(context.node(), Some(layout.left_button));
}

#[tokio::test]
async fn driver_space_is_mapped_before_hit_testing() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let (root, _root_tap, _rt) = RecordingScene::spawn("root");
    let (left, mut left_tap, _lt) = RecordingScene::spawn("left");
    let (right, _right_tap, _rrt) = RecordingScene::spawn("right");
    split(&rig.graphs, root.id(), left.id(), right.id()).unwrap();
    vp.monitor(&left).unwrap();
    vp.set_root(root, Value::Null).unwrap();

    // A HiDPI driver reporting in 2x device pixels.
    let hidpi = vp.device_context(Affine2::from_scale(Vec2::splat(0.5)));
    vp.input(&hidpi, click(40.0, 40.0)).unwrap();
    let (input, _) = left_tap.next_input().await.unwrap();
    assert_near(input.position().unwrap(), Vec2::new(10.0, 10.0));
}

#[tokio::test]
async fn dynamic_root_swap_deactivates_then_terminates_previous() {
    let log = CallLog::new();
    let supervisor = Arc::new(RecordingSupervisor::new(log.clone()));
    let rig = rig(ViewPortConfig::default(), supervisor.clone());
    let vp = &rig.viewport;
    let mut driver = connect_driver(vp).unwrap();
    assert_eq!(driver.next().await, Some(DriverMsg::SetRoot(None)));

    vp.set_root(DynamicScene::new("menu", json!({})), Value::Null).unwrap();
    assert_eq!(
        driver.next().await,
        Some(DriverMsg::SetRoot(Some(GraphKey::new("menu-0"))))
    );
    let info = vp.info().await.unwrap();
    assert!(info.root_is_dynamic);

    vp.set_root(DynamicScene::new("menu", json!({})), Value::Null).unwrap();
    assert_eq!(
        driver.next().await,
        Some(DriverMsg::SetRoot(Some(GraphKey::new("menu-1"))))
    );
    wait_for_log(&log, "terminate:menu-0").await;

    assert!(log.ordered("start:menu-1", "deactivate:menu-0"));
    assert!(log.ordered("deactivate:menu-0", "terminate:menu-0"));
    assert_eq!(supervisor.running(), vec![SceneId::new("menu-1")]);
    assert!(log.position("deactivate:menu-1").is_none());
}

#[tokio::test]
async fn static_root_is_deactivated_but_not_terminated() {
    let log = CallLog::new();
    let supervisor = Arc::new(RecordingSupervisor::new(log.clone()));
    let rig = rig(ViewPortConfig::default(), supervisor);
    let vp = &rig.viewport;
    let (scene, mut tap) = RecordingScene::new("static");
    let (old, _task) = vista_core::spawn_scene("static", scene.with_log(log.clone()));

    vp.set_root(old.clone(), Value::Null).unwrap();
    vp.set_root(DynamicScene::new("menu", Value::Null), Value::Null)
        .unwrap();
    wait_for_log(&log, "deactivate:static").await;

    assert!(matches!(tap.next().await, Some(SceneEvent::Activated { .. })));
    assert_eq!(tap.next().await, Some(SceneEvent::Deactivated));
    assert!(log.position("terminate:static").is_none());
    assert!(old.is_alive());
}

#[tokio::test]
async fn reinstalling_the_same_root_does_not_retire_it() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let (root, mut tap, _rt) = RecordingScene::spawn("root");
    vp.set_root(root.clone(), json!(1)).unwrap();
    vp.set_root(root.clone(), json!(2)).unwrap();

    assert!(matches!(tap.next().await, Some(SceneEvent::Activated { args, .. }) if args == json!(1)));
    assert!(matches!(tap.next().await, Some(SceneEvent::Activated { args, .. }) if args == json!(2)));
    assert!(tap.quiet_for(QUIET).await);
}

#[tokio::test]
async fn swapping_back_to_a_retired_root_leaves_it_active() {
    let log = CallLog::new();
    let rig = static_rig();
    let vp = &rig.viewport;
    let (scene, mut tap) = RecordingScene::new("a");
    let (a, _at) = vista_core::spawn_scene("a", scene.with_log(log.clone()));
    let (b, _b_tap, _bt) = RecordingScene::spawn("b");

    vp.set_root(a.clone(), json!(1)).unwrap();
    vp.set_root(b, Value::Null).unwrap();
    vp.set_root(a, json!(2)).unwrap();

    assert!(matches!(tap.next().await, Some(SceneEvent::Activated { args, .. }) if args == json!(1)));
    assert_eq!(tap.next().await, Some(SceneEvent::Deactivated));
    assert!(matches!(tap.next().await, Some(SceneEvent::Activated { args, .. }) if args == json!(2)));
    assert!(tap.quiet_for(QUIET).await);
    assert_eq!(log.entries(), vec!["deactivate:a".to_string()]);
    assert_eq!(vp.request_root().await.unwrap(), Some(GraphKey::new("a")));
}

#[tokio::test]
async fn failed_dynamic_start_keeps_current_root() {
    let supervisor = Arc::new(RecordingSupervisor::new(CallLog::new()));
    let rig = rig(ViewPortConfig::default(), supervisor.clone());
    let vp = &rig.viewport;
    vp.set_root(DynamicScene::new("menu", Value::Null), Value::Null)
        .unwrap();
    wait_for(vp, |info| info.root.is_some()).await;
    supervisor.set_fail_start(true);
    vp.set_root(DynamicScene::new("menu", Value::Null), Value::Null)
        .unwrap();
    assert_eq!(
        vp.request_root().await.unwrap(),
        Some(GraphKey::new("menu-0"))
    );
}

#[tokio::test]
async fn request_root_is_none_until_set() {
    let rig = static_rig();
    assert_eq!(rig.viewport.request_root().await.unwrap(), None);
    let (root, _tap, _rt) = RecordingScene::spawn("late");
    rig.viewport.set_root(root, Value::Null).unwrap();
    assert_eq!(
        rig.viewport.request_root().await.unwrap(),
        Some(GraphKey::new("late"))
    );
}

#[tokio::test]
async fn late_driver_receives_current_root_and_casts_fan_out() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let (root, _tap, _rt) = RecordingScene::spawn("root");
    vp.set_root(root, Value::Null).unwrap();

    let mut early = connect_driver(vp).unwrap();
    let mut late = connect_driver(vp).unwrap();
    assert_eq!(
        late.next().await,
        Some(DriverMsg::SetRoot(Some(GraphKey::new("root"))))
    );
    // Re-announcing does not register twice.
    vp.driver_ready(early.handle()).unwrap();

    vp.driver_cast(json!({"redraw": true})).unwrap();
    assert_eq!(
        late.next().await,
        Some(DriverMsg::Cast(json!({"redraw": true})))
    );
    let info = vp.info().await.unwrap();
    assert_eq!(info.drivers, vec![early.id(), late.id()]);
    assert_eq!(
        early
            .drain()
            .iter()
            .filter(|m| matches!(m, DriverMsg::Cast(_)))
            .count(),
        1
    );
}

#[tokio::test]
async fn stopped_and_dropped_drivers_leave_the_registry() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let mut stopped = connect_driver(vp).unwrap();
    let dropped = connect_driver(vp).unwrap();
    let explicit = connect_driver(vp).unwrap();
    wait_for(vp, |i| i.drivers.len() == 3).await;

    vp.stop_driver(stopped.id()).unwrap();
    assert_eq!(stopped.next().await, Some(DriverMsg::SetRoot(None)));
    assert_eq!(stopped.next().await, Some(DriverMsg::Stop));

    vp.driver_stopped(explicit.id()).unwrap();
    drop(dropped);
    let info = wait_for(vp, |i| i.drivers.is_empty()).await;
    assert!(info.drivers.is_empty());
}

#[tokio::test]
async fn capture_is_exclusive_and_release_checks_ownership() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let (root, mut root_tap, _rt) = RecordingScene::spawn("root");
    let (a, mut a_tap, _at) = RecordingScene::spawn("a");
    let (b, mut b_tap, _bt) = RecordingScene::spawn("b");
    vp.set_root(root.clone(), Value::Null).unwrap();
    assert!(matches!(root_tap.next().await, Some(SceneEvent::Activated { .. })));

    let ctx = TransformContext::new(vp.id(), GraphKey::new("a"));
    vp.capture_input(&a, &ctx, &[InputType::Key]).unwrap();
    vp.capture_input(&b, &ctx, &[InputType::Key]).unwrap();
    vp.release_input(&a, &[InputType::Key]).unwrap();

    let dev = device(vp);
    vp.input(&dev, key("x")).unwrap();
    assert_eq!(b_tap.next_input().await.unwrap().0, key("x"));
    assert!(a_tap.quiet_for(QUIET).await);

    vp.release_input(&b, &[InputType::Key]).unwrap();
    vp.input(&dev, key("y")).unwrap();
    assert_eq!(root_tap.next_input().await.unwrap().0, key("y"));
    let info = vp.info().await.unwrap();
    assert!(info.captures.is_empty());
}

#[tokio::test]
async fn positional_capture_bypasses_hit_testing() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let (root, _root_tap, _rt) = RecordingScene::spawn("root");
    let (left, mut left_tap, _lt) = RecordingScene::spawn("left");
    let (right, _right_tap, _rrt) = RecordingScene::spawn("right");
    let (dragger, mut drag_tap, _dt) = RecordingScene::spawn("dragger");
    split(&rig.graphs, root.id(), left.id(), right.id()).unwrap();
    vp.monitor(&left).unwrap();
    vp.set_root(root, Value::Null).unwrap();

    let ctx = TransformContext::new(vp.id(), GraphKey::new("dragger"))
        .with_transform(Affine2::from_translation(Vec2::new(100.0, 100.0)));
    vp.capture_input(&dragger, &ctx, &[InputType::CursorButton])
        .unwrap();

    vp.input(&device(vp), click(60.0, 60.0)).unwrap();
    let (input, context) = drag_tap.next_input().await.unwrap();
    assert_near(input.position().unwrap(), Vec2::new(-40.0, -40.0));
    assert_eq!(context.graph_key(), &GraphKey::new("dragger"));
    assert!(left_tap.quiet_for(QUIET).await);

    let info = vp.info().await.unwrap();
    assert_eq!(
        info.captures.get(&InputType::CursorButton),
        Some(&SceneId::new("dragger"))
    );
}

#[tokio::test]
async fn set_root_clears_captures_and_hover() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let (root, _root_tap, _rt) = RecordingScene::spawn("root");
    let (left, _left_tap, _lt) = RecordingScene::spawn("left");
    let (right, _right_tap, _rrt) = RecordingScene::spawn("right");
    split(&rig.graphs, root.id(), left.id(), right.id()).unwrap();
    vp.monitor(&left).unwrap();
    vp.set_root(root, Value::Null).unwrap();
    vp.capture_input(
        &right,
        &TransformContext::new(vp.id(), GraphKey::new("right")),
        &[InputType::Key],
    )
    .unwrap();
    vp.input(&device(vp), Input::CursorPos(Vec2::new(60.0, 60.0)))
        .unwrap();
    wait_for(vp, |i| i.hover.is_some() && !i.captures.is_empty()).await;

    let (next, _next_tap, _nt) = RecordingScene::spawn("next");
    vp.set_root(next, Value::Null).unwrap();
    let info = vp.info().await.unwrap();
    assert!(info.hover.is_none());
    assert!(info.captures.is_empty());
}

#[tokio::test]
async fn misses_drop_by_default() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let (root, mut root_tap, _rt) = RecordingScene::spawn("root");
    let (left, _lp, _lt) = RecordingScene::spawn("left");
    let (right, _rp, _rrt) = RecordingScene::spawn("right");
    split(&rig.graphs, root.id(), left.id(), right.id()).unwrap();
    vp.set_root(root, Value::Null).unwrap();
    assert!(matches!(root_tap.next().await, Some(SceneEvent::Activated { .. })));

    vp.input(&device(vp), click(1000.0, 1000.0)).unwrap();
    assert!(root_tap.quiet_for(QUIET).await);
}

#[tokio::test]
async fn misses_reach_root_under_root_policy() {
    let config = ViewPortConfig {
        hit_miss: HitMissPolicy::Root,
        ..ViewPortConfig::default()
    };
    let rig = rig(config, Arc::new(NoSupervisor));
    let vp = &rig.viewport;
    let (root, mut root_tap, _rt) = RecordingScene::spawn("root");
    vp.set_root(root, Value::Null).unwrap();

    vp.input(&device(vp), click(1000.0, 1000.0)).unwrap();
    let (input, context) = root_tap.next_input().await.unwrap();
    assert_eq!(input, click(1000.0, 1000.0));
    assert_eq!(context.graph_key(), &GraphKey::new("root"));
    assert_eq!(context.node(), None);
}

#[tokio::test]
async fn too_deep_graphs_count_as_misses() {
    let config = ViewPortConfig {
        max_depth: 1,
        hit_miss: HitMissPolicy::Root,
        ..ViewPortConfig::default()
    };
    let rig = rig(config, Arc::new(NoSupervisor));
    let vp = &rig.viewport;
    let (root, mut root_tap, _rt) = RecordingScene::spawn("root");
    let (left, mut left_tap, _lt) = RecordingScene::spawn("left");
    let (right, _rp, _rrt) = RecordingScene::spawn("right");
    split(&rig.graphs, root.id(), left.id(), right.id()).unwrap();
    vp.monitor(&left).unwrap();
    vp.set_root(root, Value::Null).unwrap();

    vp.input(&device(vp), click(60.0, 60.0)).unwrap();
    let (_, context) = root_tap.next_input().await.unwrap();
    assert_eq!(context.node(), None);
    assert!(left_tap.quiet_for(QUIET).await);
}

#[tokio::test]
async fn positionless_input_goes_to_root_and_reshape_resizes() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let dev = device(vp);
    // No root yet: dropped without complaint.
    vp.input(&dev, key("lost")).unwrap();

    let (root, mut root_tap, _rt) = RecordingScene::spawn("root");
    vp.set_root(root, Value::Null).unwrap();
    vp.input(&dev, Input::ViewportReshape {
        width: 1024,
        height: 768,
    })
    .unwrap();
    assert_eq!(
        root_tap.next_input().await.unwrap().0,
        Input::ViewportReshape {
            width: 1024,
            height: 768
        }
    );
    let info = vp.info().await.unwrap();
    assert_eq!(info.size, (1024, 768));
    assert_eq!(info.name, "main_viewport");
}

#[tokio::test]
async fn dead_capture_holder_is_forgotten() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let (root, mut root_tap, _rt) = RecordingScene::spawn("root");
    let (holder, _hp, holder_task) = RecordingScene::spawn("holder");
    vp.set_root(root, Value::Null).unwrap();
    vp.capture_input(
        &holder,
        &TransformContext::new(vp.id(), GraphKey::new("holder")),
        &[InputType::Codepoint],
    )
    .unwrap();
    wait_for(vp, |i| i.captures.len() == 1).await;

    holder_task.abort();
    wait_for(vp, |i| {
        i.captures.is_empty() && !i.scenes.contains(&SceneId::new("holder"))
    })
    .await;

    let typed = Input::Codepoint {
        codepoint: 'q',
        mods: Modifiers::default(),
    };
    vp.input(&device(vp), typed.clone()).unwrap();
    assert_eq!(root_tap.next_input().await.unwrap().0, typed);
}

#[tokio::test]
async fn dead_root_leaves_viewport_without_root() {
    let rig = static_rig();
    let vp = &rig.viewport;
    let mut driver = connect_driver(vp).unwrap();
    let (root, _tap, root_task) = RecordingScene::spawn("root");
    vp.set_root(root, Value::Null).unwrap();
    assert_eq!(driver.next().await, Some(DriverMsg::SetRoot(None)));
    assert_eq!(
        driver.next().await,
        Some(DriverMsg::SetRoot(Some(GraphKey::new("root"))))
    );

    root_task.abort();
    assert_eq!(driver.next().await, Some(DriverMsg::SetRoot(None)));
    assert_eq!(vp.request_root().await.unwrap(), None);
}

#[tokio::test]
async fn dead_dynamic_root_is_released_by_its_supervisor() {
    let log = CallLog::new();
    let supervisor = Arc::new(RecordingSupervisor::new(log.clone()));
    let rig = rig(ViewPortConfig::default(), supervisor.clone());
    let vp = &rig.viewport;
    vp.set_root(DynamicScene::new("menu", Value::Null), Value::Null)
        .unwrap();
    wait_for(vp, |info| info.root.is_some()).await;

    assert!(supervisor.crash(&SceneId::new("menu-0")));
    wait_for(vp, |info| info.root.is_none()).await;
    wait_for_log(&log, "terminate:menu-0").await;
    assert!(supervisor.running().is_empty());
    assert!(log.position("deactivate:menu-0").is_none());
}

#[tokio::test]
async fn dropping_every_handle_stops_the_coordinator() {
    let graphs = Arc::new(MemoryGraphStore::new());
    let (viewport, task) = ViewPort::start(ViewPortConfig::default(), Arc::new(NoSupervisor), graphs);
    let clone = viewport.clone();
    drop(viewport);
    assert!(clone.info().await.is_ok());
    drop(clone);
    timeout(Duration::from_secs(1), task)
        .await
        .expect("coordinator should exit once unreferenced")
        .unwrap();
}
