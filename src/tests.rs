//! End-to-end resolution scenarios.
//!
//! These exercise whole trees: ordering of component invocations, behaviour
//! on repeated passes, error propagation and the two sibling orders.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::Rc,
    task::Poll,
};

use futures::{executor::block_on, future::poll_fn};

use crate::{Str, prelude::*};

// ============================================================================
// Test Infrastructure
// ============================================================================

/// Returns `Pending` once before completing, so the caller really suspends.
fn yield_now() -> impl Future<Output = ()> {
    let mut yielded = false;
    poll_fn(move |cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
}

/// A component that records the counter value it observed and bumps it.
fn counting(counter: &Rc<Cell<i64>>) -> Component {
    let counter = Rc::clone(counter);
    Component::new("Counting", move |_props: Props| {
        let counter = Rc::clone(&counter);
        async move {
            yield_now().await;
            let seen = counter.get();
            counter.set(seen + 1);
            Ok(Node::tag("li").with_prop("seen", seen))
        }
    })
}

/// A component that suspends `delay` times, then logs its id.
fn delayed(id: i64, delay: usize, log: &Rc<RefCell<Vec<i64>>>) -> Node {
    let log = Rc::clone(log);
    let component = Component::new("Delayed", move |_props: Props| {
        let log = Rc::clone(&log);
        async move {
            for _ in 0..delay {
                yield_now().await;
            }
            log.borrow_mut().push(id);
            Ok(Node::text(format!("item {id}")))
        }
    });
    Node::component(component)
}

fn countdown() -> Component {
    Component::new("Countdown", |props: Props| async move {
        let n = props.int("n")?;
        if n == 0 {
            Ok(Node::text("liftoff"))
        } else {
            Ok(Node::component(countdown()).with_prop("n", n - 1))
        }
    })
}

fn forever() -> Component {
    Component::from_fn("Forever", |_| Node::component(forever()))
}

/// Builds `depth` nested `div`s around `leaf`.
fn chain(depth: usize, leaf: Node) -> Node {
    (0..depth).fold(leaf, |inner, _| Node::tag("div").with_child(inner))
}

/// Follows single children down to the bottom, returning the number of
/// levels above it and the bottom node.
fn descend(node: &Node) -> (usize, &Node) {
    let mut levels = 0;
    let mut node = node;
    while let Some(Children::Single(child)) = node.children() {
        levels += 1;
        node = child;
    }
    (levels, node)
}

/// Drops a tree one node at a time instead of through nested drop glue.
fn dismantle(node: Node) {
    let mut pending = vec![node];
    while let Some(mut node) = pending.pop() {
        match node.take_children() {
            Some(Children::Single(child)) => pending.push(*child),
            Some(Children::Many(nodes)) => pending.extend(nodes),
            None => {}
        }
    }
}

fn rendered_child(node: &Node, index: usize) -> Node {
    let Some(Children::Many(children)) = node.children() else {
        panic!("expected a sequence of children in {node}");
    };
    let NodeType::Rendered(rendered) = children[index].ty() else {
        panic!("expected child {index} to be rendered");
    };
    rendered.call()
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn terminal_leaf_round_trips() {
    let leaf = Node::tag("img").with_prop("src", "logo.png").with_key("logo");
    assert_eq!(block_on(resolve(&leaf)).unwrap(), leaf);
}

#[test]
fn callable_yields_its_terminal_output() {
    let avatar = Component::new("Avatar", |_props: Props| async {
        yield_now().await;
        Ok(Node::tag("img"))
    });
    let out = block_on(resolve(&Node::component(avatar))).unwrap();

    let NodeType::Rendered(rendered) = out.ty() else {
        panic!("expected a rendered node, got {out}");
    };
    assert_eq!(rendered.name(), "Avatar");
    assert_eq!(rendered.call(), Node::tag("img"));
    assert!(out.is_resolved());
}

#[test]
fn children_are_invoked_in_index_order() {
    let counter = Rc::new(Cell::new(0));
    let tree = Node::tag("ul").with_children((0..5).map(|_| Node::component(counting(&counter))));

    let out = block_on(resolve(&tree)).unwrap();

    assert_eq!(counter.get(), 5);
    for index in 0..5 {
        let item = rendered_child(&out, index);
        assert_eq!(item.props().int("seen").unwrap(), index as i64);
    }
}

#[test]
fn nested_components_resolve_fully() {
    let item = Component::from_fn("Item", |props: Props| {
        Node::tag("li").with_prop("label", props.get("label").cloned())
    });
    let list = Component::new("List", move |props: Props| {
        let item = item.clone();
        async move {
            yield_now().await;
            let labels = props.list("labels")?.to_vec();
            Ok(Node::tag("ul").with_children(
                labels
                    .into_iter()
                    .map(|label| Node::component(item.clone()).with_prop("label", label)),
            ))
        }
    });
    let page = Node::tag("main").with_child(
        Node::component(list).with_prop("labels", vec!["a", "b", "c"]),
    );

    let out = block_on(resolve(&page)).unwrap();
    assert!(out.is_resolved());
    // main, List, ul, three Item wrappers and three li
    assert_eq!(out.count(), 9);
}

#[test]
fn second_pass_is_equivalent() {
    let counter = Rc::new(Cell::new(0));
    let tree = Node::fragment(vec![
        Node::component(countdown()).with_prop("n", 2),
        Node::component(counting(&counter)),
        Node::text("tail"),
    ]);

    let first = block_on(resolve(&tree)).unwrap();
    let second = block_on(resolve(&first)).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    // the counting component ran only during the first pass
    assert_eq!(counter.get(), 1);
}

#[test]
fn outline_of_resolved_tree() {
    let tree = Node::tag("p").with_child(Node::component(countdown()).with_prop("n", 1));
    let out = block_on(resolve(&tree)).unwrap();

    assert_eq!(
        out.to_string(),
        "<p>\n  <Countdown n=1>\n    <Countdown n=0>\n      \"liftoff\"\n    </Countdown>\n  </Countdown>\n</p>\n"
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn nested_failure_fails_resolve() {
    let counter = Rc::new(Cell::new(0));
    let broken = Component::new("Broken", |_props: Props| async {
        yield_now().await;
        Err::<Node, _>(anyhow::anyhow!("backend unavailable"))
    });
    let tree = Node::tag("section").with_children([
        Node::component(counting(&counter)),
        Node::tag("div").with_child(Node::component(broken)),
        Node::component(counting(&counter)),
    ]);

    let err = block_on(resolve(&tree)).unwrap_err();
    assert!(err.is_render());
    assert_eq!(err.to_string(), "backend unavailable");
    // siblings after the failure are never invoked
    assert_eq!(counter.get(), 1);
}

#[test]
fn nested_failure_fails_patch() {
    let tree = Node::tag("div").with_child(Node::component(countdown()));
    let err = block_on(patch(tree)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<PropError>(),
        Some(&PropError::Missing { key: "n".into() })
    );
}

#[test]
fn depth_limit_stops_runaway_recursion() {
    let resolver = Resolver::new(ResolveOptions::new().max_depth(16));
    let err = block_on(resolver.resolve(&Node::component(forever()))).unwrap_err();
    assert!(matches!(err, ResolveError::DepthExceeded { limit: 16 }));
}

#[test]
fn depth_limit_allows_shallow_recursion() {
    let resolver = Resolver::new(ResolveOptions::new().max_depth(16));
    let out = block_on(resolver.resolve(&Node::component(countdown()).with_prop("n", 3))).unwrap();
    assert!(out.is_resolved());
}

// ============================================================================
// Deep Trees
// ============================================================================

#[test]
fn deep_tag_chain_resolves() {
    let tree = chain(5000, Node::text("bottom"));

    let out = block_on(resolve(&tree)).unwrap();
    let (levels, bottom) = descend(&out);

    assert_eq!(levels, 5000);
    assert_eq!(bottom, &Node::text("bottom"));
    dismantle(out);
    dismantle(tree);
}

#[test]
fn deep_chain_below_a_component_resolves() {
    let inner = Component::from_fn("Inner", |_| Node::text("inner"));
    let tree = chain(3000, Node::component(inner));

    let out = block_on(resolve(&tree)).unwrap();
    let (levels, bottom) = descend(&out);

    assert_eq!(levels, 3000);
    let NodeType::Rendered(rendered) = bottom.ty() else {
        panic!("expected the bottom to be rendered");
    };
    assert_eq!(rendered.call(), Node::text("inner"));
    dismantle(out);
    dismantle(tree);
}

#[test]
fn deep_component_output_resolves() {
    let tall = Component::from_fn("Tall", |_| {
        chain(1000, Node::component(countdown()).with_prop("n", 1))
    });

    let out = block_on(resolve(&Node::component(tall))).unwrap();
    let NodeType::Rendered(rendered) = out.ty() else {
        panic!("expected a rendered node");
    };
    let (levels, bottom) = descend(rendered.node());

    assert_eq!(levels, 1000);
    assert_eq!(bottom.ty().name().map(Str::as_str), Some("Countdown"));
    assert!(out.is_resolved());
}

#[test]
fn long_component_recursion_resolves() {
    let out = block_on(resolve(&Node::component(countdown()).with_prop("n", 500))).unwrap();
    assert!(out.is_resolved());
    // one wrapper per countdown step plus the text leaf
    assert_eq!(out.count(), 502);
}

#[test]
fn depth_limit_applies_to_deep_chains() {
    let tree = chain(2000, Node::text("bottom"));
    let resolver = Resolver::new(ResolveOptions::new().max_depth(1000));

    let err = block_on(resolver.resolve(&tree)).unwrap_err();
    assert!(matches!(err, ResolveError::DepthExceeded { limit: 1000 }));
    dismantle(tree);
}

// ============================================================================
// Patch
// ============================================================================

#[test]
fn patch_accepts_ready_and_pending() {
    let ready = block_on(patch(Node::component(countdown()).with_prop("n", 1))).unwrap();
    let pending = block_on(patch(async {
        yield_now().await;
        anyhow::Ok(Node::component(countdown()).with_prop("n", 1))
    }))
    .unwrap();

    assert_eq!(ready.render().to_string(), pending.render().to_string());
    assert!(ready.render().is_resolved());
    assert!(matches!(ready.render().ty(), NodeType::Fragment));
}

// ============================================================================
// Sibling Order
// ============================================================================

#[test]
fn sequential_siblings_complete_in_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let tree = Node::fragment(vec![delayed(0, 3, &log), delayed(1, 2, &log), delayed(2, 1, &log)]);

    block_on(resolve(&tree)).unwrap();
    assert_eq!(*log.borrow(), vec![0, 1, 2]);
}

#[test]
fn concurrent_siblings_keep_output_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let tree = Node::fragment(vec![delayed(0, 3, &log), delayed(1, 2, &log), delayed(2, 1, &log)]);
    let resolver = Resolver::new(ResolveOptions::new().siblings(SiblingOrder::Concurrent));

    let out = block_on(resolver.resolve(&tree)).unwrap();

    assert_eq!(*log.borrow(), vec![2, 1, 0]);
    for index in 0..3 {
        assert_eq!(rendered_child(&out, index), Node::text(format!("item {index}")));
    }
}

// ============================================================================
// Serialization
// ============================================================================

#[cfg(feature = "serde")]
#[test]
fn resolved_tree_serializes() {
    let badge = Component::from_fn("Badge", |_| Node::text("new"));
    let tree = Node::tag("span")
        .with_prop("class", "pill")
        .with_child(Node::component(badge));

    let out = block_on(resolve(&tree)).unwrap();
    let json = serde_json::to_value(&out).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "type": { "tag": "span" },
            "props": {
                "class": "pill",
                "children": {
                    "type": {
                        "rendered": {
                            "name": "Badge",
                            "node": { "type": { "text": "new" }, "props": {} }
                        }
                    },
                    "props": {}
                }
            }
        })
    );
}

#[test]
fn logging_can_be_installed_before_resolving() {
    crate::logging::install();
    let tree = Node::tag("div").with_child(Node::component(countdown()).with_prop("n", 0));
    assert!(block_on(resolve(&tree)).unwrap().is_resolved());
}
