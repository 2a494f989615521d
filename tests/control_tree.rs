use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gantry::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tree() -> Tree {
    init_logger();
    Tree::with_config(UiConfig::new().screen_size(1280.0, 720.0))
}

fn window(tree: &mut Tree, width: f32, height: f32) -> ControlId {
    let id = tree.create_control("window");
    tree.set_size(id, Vec2::new(width, height));
    id
}

fn assert_contiguous(tree: &Tree, parent: ControlId) {
    for (i, &child) in tree.children(parent).iter().enumerate() {
        assert_eq!(tree.z_order(child), i as i32, "z-order of child {}", i);
    }
}

/// Counts structural notifications seen on one control.
#[derive(Default)]
struct StructureLog {
    added: Cell<u32>,
    removed: Cell<u32>,
}

fn watch_structure(tree: &mut Tree, id: ControlId) -> Rc<StructureLog> {
    let log = Rc::new(StructureLog::default());
    let sink = log.clone();
    tree.listen(id, move |n| match n {
        Notification::ControlAdded { .. } => sink.added.set(sink.added.get() + 1),
        Notification::ControlRemoved { .. } => sink.removed.set(sink.removed.get() + 1),
        _ => {}
    });
    log
}

#[test]
fn test_size_stays_within_bounds() {
    let mut tree = tree();
    let id = window(&mut tree, 100.0, 80.0);
    tree.set_min_size(id, Vec2::new(50.0, 40.0));
    tree.set_max_size(id, Vec2::new(200.0, 100.0));

    let requests = [
        Vec2::new(10.0, 10.0),
        Vec2::new(500.0, 500.0),
        Vec2::new(120.0, 5.0),
        Vec2::new(-30.0, 90.0),
        Vec2::new(199.0, 101.0),
    ];
    for request in requests {
        tree.set_size(id, request);
        let size = tree.size(id);
        assert!(size.x >= 50.0 && size.x <= 200.0, "width {} for {:?}", size.x, request);
        assert!(size.y >= 40.0 && size.y <= 100.0, "height {} for {:?}", size.y, request);
    }

    // Raising the minimum above the current size grows the control.
    tree.set_size(id, Vec2::new(50.0, 40.0));
    tree.set_min_size(id, Vec2::new(150.0, 60.0));
    assert_eq!(tree.size(id), Vec2::new(150.0, 60.0));
}

#[test]
fn test_versions_grow_with_every_mutation() {
    let mut tree = tree();
    let id = window(&mut tree, 100.0, 100.0);
    let mut last = tree.version(id);

    let mutations: Vec<Box<dyn Fn(&mut Tree)>> = vec![
        Box::new(move |t: &mut Tree| {
            t.set_size(id, Vec2::new(300.0, 200.0));
        }),
        Box::new(move |t: &mut Tree| {
            t.set_relative_position(id, Vec2::new(15.0, 25.0));
        }),
        Box::new(move |t: &mut Tree| {
            t.set_color(id, Color::rgb(0.2, 0.4, 0.6));
        }),
        Box::new(move |t: &mut Tree| {
            t.set_opacity(id, 0.3);
        }),
        Box::new(move |t: &mut Tree| {
            t.set_pivot(id, Pivot::MiddleCenter);
        }),
        Box::new(move |t: &mut Tree| {
            t.set_name(id, "dialog");
        }),
    ];
    for mutate in mutations {
        mutate(&mut tree);
        let version = tree.version(id);
        assert!(version > last, "{} should exceed {}", version, last);
        last = version;
    }

    // Reads leave the version alone.
    let _ = tree.relative_position(id);
    let _ = tree.corners(id);
    let _ = tree.is_visible(id);
    let _ = tree.effective_opacity(id);
    assert_eq!(tree.version(id), last);

    // So does a setter that changes nothing.
    tree.set_color(id, Color::rgb(0.2, 0.4, 0.6));
    assert_eq!(tree.version(id), last);
}

#[test]
fn test_z_order_stays_contiguous() {
    let mut tree = tree();
    let root = window(&mut tree, 400.0, 400.0);
    let kids: Vec<ControlId> = (0..5)
        .map(|i| tree.create_child(root, &format!("child {}", i)).unwrap())
        .collect();
    assert_contiguous(&tree, root);

    tree.remove_control(root, kids[2]);
    assert_contiguous(&tree, root);
    assert_eq!(tree.children(root).len(), 4);

    tree.set_z_order(kids[0], 3);
    assert_contiguous(&tree, root);
    assert_eq!(tree.children(root).last(), Some(&kids[0]));

    tree.bring_to_front(kids[4]);
    tree.send_to_back(kids[1]);
    assert_contiguous(&tree, root);

    tree.add_control(root, kids[2]).unwrap();
    assert_contiguous(&tree, root);

    tree.destroy(kids[3]);
    assert_contiguous(&tree, root);
    assert_eq!(tree.children(root).len(), 4);
}

#[test]
fn test_visibility_and_enabled_compose_with_ancestors() {
    let mut tree = tree();
    let a = window(&mut tree, 300.0, 300.0);
    let b = tree.create_child(a, "b").unwrap();
    let c = tree.create_child(b, "c").unwrap();
    assert!(tree.is_visible(c) && tree.is_enabled(c));

    tree.set_visible(b, false);
    assert!(tree.is_visible(a));
    assert!(!tree.is_visible(b));
    assert!(!tree.is_visible(c));
    assert!(tree.control(c).unwrap().is_visible);

    tree.set_enabled(a, false);
    assert!(!tree.is_enabled(c));
    tree.set_enabled(a, true);
    tree.set_enabled(c, false);
    assert!(tree.is_enabled(b));
    assert!(!tree.is_enabled(c));

    tree.set_visible(b, true);
    assert!(tree.is_visible(c));
}

#[test]
fn test_reconciliation_is_idempotent() {
    let mut tree = tree();
    let panel = window(&mut tree, 300.0, 300.0);
    let first = tree.create_child(panel, "first").unwrap();
    let stray = tree.create_control("stray");
    let log = watch_structure(&mut tree, panel);

    // Nothing changed on the host side.
    tree.update_control_hierarchy(panel).unwrap();
    assert_eq!((log.added.get(), log.removed.get()), (0, 0));

    // Some other system moves a host object under the panel's.
    let panel_host = tree.control(panel).unwrap().host.unwrap();
    let stray_host = tree.control(stray).unwrap().host.unwrap();
    tree.host_mut().set_parent(stray_host, Some(panel_host));

    tree.update_control_hierarchy(panel).unwrap();
    assert_eq!(log.added.get(), 1);
    assert_eq!(tree.children(panel), &[first, stray]);
    assert_eq!(tree.parent(stray), Some(panel));
    assert!(!tree.roots().contains(&stray));

    let version = tree.version(panel);
    tree.update_control_hierarchy(panel).unwrap();
    assert_eq!((log.added.get(), log.removed.get()), (1, 0));
    assert_eq!(tree.version(panel), version);
}

#[test]
fn test_reconciliation_drops_children_the_host_lost() {
    let mut tree = tree();
    let panel = window(&mut tree, 300.0, 300.0);
    let child = tree.create_child(panel, "child").unwrap();
    let log = watch_structure(&mut tree, panel);

    let child_host = tree.control(child).unwrap().host.unwrap();
    tree.host_mut().set_parent(child_host, None);
    tree.update_control_hierarchy(panel).unwrap();

    assert_eq!(log.removed.get(), 1);
    assert!(tree.children(panel).is_empty());
    assert_eq!(tree.parent(child), None);
    assert!(tree.roots().contains(&child));
}

#[test]
fn test_reset_then_perform_is_a_fixed_point() {
    let mut tree = tree();
    let anchors = [
        AnchorStyle::TOP | AnchorStyle::LEFT,
        AnchorStyle::BOTTOM | AnchorStyle::RIGHT,
        AnchorStyle::ALL,
        AnchorStyle::CENTER,
        AnchorStyle::ALL | AnchorStyle::PROPORTIONAL,
        AnchorStyle::LEFT | AnchorStyle::RIGHT | AnchorStyle::CENTER_VERTICAL,
    ];
    let pivots = [Pivot::TopLeft, Pivot::MiddleCenter, Pivot::BottomRight];

    for &anchor in &anchors {
        for &pivot in &pivots {
            let parent = window(&mut tree, 640.0, 480.0);
            tree.set_pivot(parent, pivot);
            let child = tree.create_child(parent, "child").unwrap();
            tree.set_size(child, Vec2::new(123.0, 77.0));
            tree.set_relative_position(child, Vec2::new(41.0, 59.0));
            tree.set_pivot(child, pivot);
            tree.set_anchor(child, anchor);

            let size = tree.size(child);
            let position = tree.relative_position(child);
            tree.reset_layout(child, true);
            tree.perform_layout(child);

            assert!(
                tree.size(child).approx_eq(size, 1.0),
                "{:?}/{:?}: size {:?} became {:?}",
                anchor,
                pivot,
                size,
                tree.size(child)
            );
            assert!(
                tree.relative_position(child).approx_eq(position, 1.0),
                "{:?}/{:?}: position {:?} became {:?}",
                anchor,
                pivot,
                position,
                tree.relative_position(child)
            );
            tree.destroy(parent);
        }
    }
}

/// Records every event reaching a control, used or not.
struct Recorder {
    seen: Rc<RefCell<Vec<(bool, usize)>>>,
}

impl WidgetBehavior for Recorder {
    fn event(&mut self, _tree: &mut Tree, _id: ControlId, event: &mut ControlEvent) {
        let address = event as *const ControlEvent as usize;
        self.seen.borrow_mut().push((event.is_used(), address));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn test_used_event_keeps_bubbling() {
    let mut tree = tree();
    let a = window(&mut tree, 300.0, 300.0);
    let b = tree.create_child(a, "b").unwrap();
    let c = tree.create_child(b, "c").unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    tree.set_behavior(a, Recorder { seen: seen.clone() }).unwrap();

    let used_at = Rc::new(Cell::new(0usize));
    let sink = used_at.clone();
    tree.subscribe(b, EventKind::MouseDown, move |e| {
        sink.set(e as *const ControlEvent as usize);
        e.use_event();
    });
    let a_subscriber = Rc::new(Cell::new(false));
    let flag = a_subscriber.clone();
    tree.subscribe(a, EventKind::MouseDown, move |_| flag.set(true));

    let event = tree.raise_mouse(c, EventKind::MouseDown, MouseEvent::at(Vec2::new(5.0, 5.0)));

    assert!(event.is_used());
    assert_eq!(event.source, c);
    assert_eq!(event.current, a);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], (true, used_at.get()));
    // Default reactions stay suppressed on the way up.
    assert!(!a_subscriber.get());
}

#[test]
fn test_add_remove_lifecycle() {
    let mut tree = tree();
    let parent = window(&mut tree, 300.0, 300.0);
    let child = tree.create_control("child");
    let log = watch_structure(&mut tree, parent);

    tree.add_control(parent, child).unwrap();
    assert_eq!(tree.parent(child), Some(parent));
    assert_eq!(tree.children(parent), &[child]);
    assert_eq!(tree.z_order(child), 0);
    assert_eq!(log.added.get(), 1);

    // Adding again changes nothing.
    tree.add_control(parent, child).unwrap();
    assert_eq!(log.added.get(), 1);

    assert!(tree.remove_control(parent, child));
    assert_eq!(tree.parent(child), None);
    assert!(tree.children(parent).is_empty());
    assert_eq!(log.removed.get(), 1);

    assert!(!tree.remove_control(parent, child));
    assert_eq!(log.removed.get(), 1);
}

#[test]
fn test_add_rejects_cycles() {
    let mut tree = tree();
    let a = window(&mut tree, 300.0, 300.0);
    let b = tree.create_child(a, "b").unwrap();
    let c = tree.create_child(b, "c").unwrap();

    assert_eq!(tree.add_control(c, a), Err(TreeError::HierarchyCycle { parent: c, child: a }));
    assert!(matches!(tree.add_control(b, b), Err(TreeError::HierarchyCycle { .. })));
    assert_eq!(tree.parent(a), None);
}

#[test]
fn test_suspended_layout_runs_once_on_resume() {
    let mut tree = tree();
    let parent = window(&mut tree, 400.0, 300.0);
    let child = tree.create_child(parent, "child").unwrap();
    tree.set_size(child, Vec2::new(380.0, 280.0));
    tree.set_relative_position(child, Vec2::new(10.0, 10.0));
    tree.set_anchor(child, AnchorStyle::ALL);

    tree.suspend_layout(child);
    let passes = tree.layout_pass_count(child);
    for (w, h) in [(500.0, 400.0), (600.0, 450.0), (700.0, 500.0)] {
        tree.set_size(parent, Vec2::new(w, h));
    }
    assert_eq!(tree.layout_pass_count(child), passes);
    assert_eq!(tree.size(child), Vec2::new(380.0, 280.0));

    tree.resume_layout(child);
    assert_eq!(tree.layout_pass_count(child), passes + 1);
    assert_eq!(tree.size(child), Vec2::new(680.0, 480.0));
    assert!(tree
        .relative_position(child)
        .approx_eq(Vec2::new(10.0, 10.0), 0.01));
}

#[test]
fn test_focus_cleared_when_focused_control_disabled() {
    let mut tree = tree();
    let form = window(&mut tree, 300.0, 300.0);
    let field = tree.create_child(form, "field").unwrap();
    tree.set_can_focus(field, true);

    assert!(tree.focus(field));
    assert_eq!(tree.focused_control(), Some(field));

    tree.set_enabled(form, false);
    assert_eq!(tree.focused_control(), None);

    tree.set_enabled(form, true);
    assert!(tree.focus(field));
    tree.set_visible(field, false);
    assert_eq!(tree.focused_control(), None);
    assert!(!tree.focus(field));
}

#[test]
fn test_effective_opacity_multiplies() {
    let mut tree = tree();
    let root = window(&mut tree, 300.0, 300.0);
    let leaf = tree.create_child(root, "leaf").unwrap();
    tree.set_opacity(root, 0.5);
    tree.set_opacity(leaf, 0.5);
    assert!((tree.effective_opacity(leaf) - 0.25).abs() < 1e-6);

    tree.set_opacity(root, 1.0);
    assert!((tree.effective_opacity(leaf) - 0.5).abs() < 1e-6);
}

#[test]
fn test_range_with_empty_span_hides_indicator() {
    let mut tree = tree();
    let slider = window(&mut tree, 200.0, 20.0);
    let fill = tree.create_child(slider, "fill").unwrap();
    let range = RangeControl::new(5.0, 5.0).indicator(fill);
    RangeControl::install(&mut tree, slider, range).unwrap();

    assert!(!tree.is_visible(fill));
    let size = tree.size(fill);
    assert!(size.x.is_finite() && size.y.is_finite());
    assert!(tree.relative_position(fill).x.is_finite());
    assert_eq!(RangeControl::value_of(&tree, slider), Some(5.0));

    RangeControl::set_range(&mut tree, slider, 0.0, 10.0).unwrap();
    assert!(tree.is_visible(fill));
}

#[test]
fn test_auto_focus_lands_one_frame_later() {
    let mut tree = tree();
    let form = window(&mut tree, 300.0, 300.0);
    let field = tree.create_child(form, "field").unwrap();
    tree.set_can_focus(field, true);
    tree.set_visible(form, false);
    tree.set_auto_focus(field, true);

    tree.set_visible(form, true);
    // The end of the frame that queued the request does not apply it.
    tree.late_update();
    assert_eq!(tree.focused_control(), None);
    tree.tick();
    assert_eq!(tree.focused_control(), Some(field));
}
