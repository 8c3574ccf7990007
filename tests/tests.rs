//! Run with `cargo test --all-features`.

use std::cell::Cell;
use std::rc::Rc;

use rememo::{
    Callback, Compare, Config, Error, Runtime, Scope, Store, Value, deep_equals, deep_memo,
    memo, memo_with, shallow_equals, try_use_memo, use_callback, use_deep_memo, use_memo,
    use_memo_with, use_ref, use_ref_with,
};

macro_rules! test {
    (miss: $call:expr, $result:expr) => {{
        assert_eq!($call, $result);
        assert!(!rememo::internal::last_was_hit());
    }};
    (hit: $call:expr, $result:expr) => {{
        assert_eq!($call, $result);
        assert!(rememo::internal::last_was_hit());
    }};
}

/// Counts how often a producer ran.
#[derive(Default)]
struct Counter(Cell<usize>);

impl Counter {
    fn bump(&self) -> usize {
        self.0.set(self.0.get() + 1);
        self.0.get()
    }

    fn get(&self) -> usize {
        self.0.get()
    }
}

/// Test that a cache hit suppresses the producer.
#[test]
fn test_memo_hit() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    let counter = Counter::default();

    let mut pass = |deps: (i32, i32)| {
        runtime
            .render(id, |cx| use_memo(cx, || (counter.bump(), deps.0 + deps.1), deps))
            .unwrap()
    };

    test!(miss: pass((1, 2)), (1, 3));
    test!(hit: pass((1, 2)), (1, 3));
    test!(hit: pass((1, 2)), (1, 3));
    assert_eq!(counter.get(), 1);
}

/// Test that changed dependencies recompute.
#[test]
fn test_memo_miss() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    let counter = Counter::default();

    let mut pass = |deps: [i32; 2]| {
        runtime
            .render(id, |cx| use_memo(cx, || (counter.bump(), deps[0] * deps[1]), deps))
            .unwrap()
    };

    test!(miss: pass([1, 2]), (1, 2));
    test!(miss: pass([1, 3]), (2, 3));
    test!(hit: pass([1, 3]), (2, 3));
    test!(miss: pass([1, 2]), (3, 2));
    assert_eq!(counter.get(), 3);
}

/// Test that shallow dependencies compare elements by identity.
#[test]
fn test_memo_shallow_dependencies() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    let shared = Rc::new(vec![1, 2, 3]);

    let mut pass = |items: Rc<Vec<i32>>| {
        runtime
            .render(id, |cx| use_memo(cx, || items.iter().sum::<i32>(), (items.clone(),)))
            .unwrap()
    };

    test!(miss: pass(shared.clone()), 6);
    test!(hit: pass(shared.clone()), 6);

    // Same content, different allocation.
    test!(miss: pass(Rc::new(vec![1, 2, 3])), 6);
}

/// Test that sequence dependencies of another length recompute.
#[test]
fn test_memo_length_change() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    let mut pass = |deps: Vec<i32>| {
        runtime
            .render(id, |cx| use_memo(cx, || deps.len(), deps.clone()))
            .unwrap()
    };

    test!(miss: pass(vec![1, 2]), 2);
    test!(hit: pass(vec![1, 2]), 2);
    test!(miss: pass(vec![1, 2, 3]), 3);
    test!(miss: pass(vec![1, 2]), 2);
    test!(miss: pass(vec![]), 0);
}

/// Test that deep dependencies compare structurally.
#[test]
fn test_deep_memo() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    let mut pass = |items: Rc<Vec<i32>>| {
        runtime
            .render(id, |cx| {
                use_deep_memo(cx, || items.iter().product::<i32>(), (items.clone(),))
            })
            .unwrap()
    };

    test!(miss: pass(Rc::new(vec![2, 3])), 6);
    test!(hit: pass(Rc::new(vec![2, 3])), 6);
    test!(miss: pass(Rc::new(vec![3, 3])), 9);
}

/// Test that the strategy sees the whole dependency sequences.
#[test]
fn test_memo_custom_strategy() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    let seen = Cell::new(0);

    // Only the length matters.
    let by_len = |a: &Vec<u8>, b: &Vec<u8>| {
        seen.set(seen.get() + 1);
        a.len() == b.len()
    };

    let mut pass = |deps: Vec<u8>| {
        runtime
            .render(id, |cx| use_memo_with(cx, || deps.clone(), deps.clone(), by_len))
            .unwrap()
    };

    test!(miss: pass(vec![1, 2]), vec![1, 2]);
    test!(hit: pass(vec![3, 4]), vec![1, 2]);
    test!(miss: pass(vec![5]), vec![5]);
    assert_eq!(seen.get(), 2);
}

/// Test that a failing producer leaves the previous entry intact.
#[test]
fn test_memo_failure() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    let mut pass = |dep: i32, fail: bool| {
        runtime
            .render(id, |cx| {
                try_use_memo(cx, || if fail { Err("boom") } else { Ok(dep * 10) }, (dep,))
            })
            .unwrap()
    };

    test!(miss: pass(1, false), Ok(10));
    assert_eq!(pass(2, true), Err("boom"));

    // The old entry still answers for the old dependencies.
    test!(hit: pass(1, true), Ok(10));

    // New dependencies retry the producer.
    test!(miss: pass(2, false), Ok(20));
    test!(hit: pass(2, true), Ok(20));
}

/// Test that a panicking producer leaves the previous entry intact.
#[test]
fn test_memo_panic() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    let value = runtime.render(id, |cx| use_memo(cx, || 1, (1,))).unwrap();
    assert_eq!(value, 1);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        runtime.render(id, |cx| use_memo(cx, || -> i32 { panic!("producer failed") }, (2,)))
    }));
    assert!(result.is_err());

    test!(hit: runtime.render(id, |cx| use_memo(cx, || 3, (1,))).unwrap(), 1);
}

/// Test that persistent cells keep their identity across passes.
#[test]
fn test_ref_identity() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    let first = runtime.render(id, |cx| use_ref(cx, 0)).unwrap();
    first.set(5);

    let second = runtime.render(id, |cx| use_ref(cx, 100)).unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(second.get(), 5);

    second.update(|v| *v += 1);
    assert_eq!(*first.current(), 6);
}

/// Test the different ways of reading and writing a cell.
#[test]
fn test_ref_access() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    let cell = runtime.render(id, |cx| use_ref(cx, vec![1])).unwrap();
    assert_eq!(cell.with(|v| v.len()), 1);
    assert_eq!(cell.replace(vec![2, 3]), vec![1]);
    assert_eq!(cell.with(|v| v.iter().sum::<i32>()), 5);

    let again = runtime.render(id, |cx| use_ref(cx, Vec::<i32>::new())).unwrap();
    assert_eq!(again.get(), vec![2, 3]);
}

/// Test that the lazy initializer runs exactly once.
#[test]
fn test_ref_initializes_once() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    let counter = Counter::default();

    for _ in 0..3 {
        runtime
            .render(id, |cx| use_ref_with(cx, || counter.bump()))
            .unwrap();
    }

    assert_eq!(counter.get(), 1);
}

/// Test that instances never share cells.
#[test]
fn test_ref_per_instance() {
    let mut runtime = Runtime::new();
    let a = runtime.mount();
    let b = runtime.mount();

    let ra = runtime.render(a, |cx| use_ref(cx, String::from("a"))).unwrap();
    let rb = runtime.render(b, |cx| use_ref(cx, String::from("b"))).unwrap();
    ra.current_mut().push('!');

    assert!(!ra.ptr_eq(&rb));
    assert_eq!(rb.get(), "b");
    assert_eq!(runtime.render(a, |cx| use_ref(cx, String::new()).get()).unwrap(), "a!");
}

/// Test that the callback is handed back, never called.
#[test]
fn test_callback_not_called() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    let calls = Rc::new(Counter::default());

    let mut pass = |key: u8| {
        let calls = calls.clone();
        runtime
            .render(id, |cx| use_callback(cx, move || calls.bump(), (key,)))
            .unwrap()
    };

    let first = pass(1);
    assert!(!rememo::internal::last_was_hit());
    let second = pass(1);
    assert!(rememo::internal::last_was_hit());
    assert_eq!(calls.get(), 0);

    assert!(first.ptr_eq(&second));
    assert_eq!((*second)(), 1);
    assert_eq!(calls.get(), 1);
}

/// Test that callbacks stay the same while dependencies do.
#[test]
fn test_callback() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    let mut pass = |factor: i32| {
        runtime
            .render(id, |cx| use_callback(cx, move |x: i32| x * factor, (factor,)))
            .unwrap()
    };

    let first = pass(2);
    assert!(!rememo::internal::last_was_hit());
    let second = pass(2);
    assert!(rememo::internal::last_was_hit());
    let third = pass(3);
    assert!(!rememo::internal::last_was_hit());

    assert!(first.ptr_eq(&second));
    assert!(!second.ptr_eq(&third));
    assert!(shallow_equals(&first, &second));
    assert!(!deep_equals(&second, &third));
    assert_eq!((*second)(5), 10);
    assert_eq!((*third)(5), 15);
}

#[derive(Clone, Compare)]
struct RowProps {
    label: Rc<str>,
    count: u32,
    on_click: Callback<dyn Fn(u32)>,
}

#[derive(Clone, Compare)]
struct ListProps {
    title: String,
    filter: Filter,
}

#[derive(Clone, Compare)]
struct Filter {
    query: String,
}

/// Test the prop equality gate of memoized components.
#[test]
fn test_memo_component() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    let renders = Counter::default();

    let row = memo(|props: &RowProps| {
        renders.bump();
        format!("{} ({})", props.label, props.count)
    });

    let label: Rc<str> = "apples".into();
    let on_click: Callback<dyn Fn(u32)> = Callback::from(Rc::new(|_: u32| {}) as Rc<dyn Fn(u32)>);
    let props = |count| RowProps { label: label.clone(), count, on_click: on_click.clone() };

    let mut pass = |props: RowProps| runtime.render(id, |cx| row.render(cx, props)).unwrap();

    test!(miss: pass(props(1)), "apples (1)");

    // Shallow-equal, but a different props value.
    test!(hit: pass(props(1)), "apples (1)");
    test!(miss: pass(props(2)), "apples (2)");
    assert_eq!(renders.get(), 2);

    // A new callback breaks the shallow comparison.
    let fresh = RowProps {
        on_click: Callback::from(Rc::new(|_: u32| {}) as Rc<dyn Fn(u32)>),
        ..props(2)
    };
    test!(miss: pass(fresh), "apples (2)");
    assert_eq!(renders.get(), 3);
}

/// Test that nested props need the deep strategy.
#[test]
fn test_deep_memo_component() {
    let mut runtime = Runtime::new();
    let shallow = runtime.mount();
    let deep = runtime.mount();

    let render = |props: &ListProps| format!("{}: {}", props.title, props.filter.query);
    let shallow_list = memo(render);
    let deep_list = deep_memo(render);

    let props = || ListProps { title: "Fruit".into(), filter: Filter { query: "ap".into() } };

    test!(miss: runtime.render(shallow, |cx| shallow_list.render(cx, props())).unwrap(), "Fruit: ap");
    test!(miss: runtime.render(shallow, |cx| shallow_list.render(cx, props())).unwrap(), "Fruit: ap");

    test!(miss: runtime.render(deep, |cx| deep_list.render(cx, props())).unwrap(), "Fruit: ap");
    test!(hit: runtime.render(deep, |cx| deep_list.render(cx, props())).unwrap(), "Fruit: ap");
}

/// Test that the last props are replaced on every pass, even on a hit.
#[test]
fn test_memo_component_compares_with_previous_props() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    // Equal if within a distance of one.
    let close = |a: &i32, b: &i32| (a - b).abs() <= 1;
    let view = memo_with(|n: &i32| format!("n = {n}"), close);

    let mut pass = |n: i32| runtime.render(id, |cx| view.render(cx, n)).unwrap();

    test!(miss: pass(0), "n = 0");
    test!(hit: pass(1), "n = 0");

    // Compared against 1 (the previous props), not 0 (the last render).
    test!(hit: pass(2), "n = 0");
    test!(miss: pass(4), "n = 4");
}

/// Test that one memoized definition caches per instance.
#[test]
fn test_memo_component_per_instance() {
    let mut runtime = Runtime::new();
    let a = runtime.mount();
    let b = runtime.mount();
    let renders = Counter::default();

    let view = memo(|name: &String| {
        renders.bump();
        format!("Hello, {name}!")
    });

    let mut pass = |id, name: &str| runtime.render(id, |cx| view.render(cx, name.to_string())).unwrap();

    test!(miss: pass(a, "A"), "Hello, A!");
    test!(miss: pass(b, "B"), "Hello, B!");
    test!(hit: pass(a, "A"), "Hello, A!");
    test!(hit: pass(b, "B"), "Hello, B!");
    assert_eq!(renders.get(), 2);
}

/// Test that a failed render keeps the previous props and output.
#[test]
fn test_memo_component_failure() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    let view = memo(|n: &u32| if *n == 0 { Err("zero") } else { Ok(100 / n) });
    let mut pass = |n: u32| runtime.render(id, |cx| view.try_render(cx, n)).unwrap();

    test!(miss: pass(5), Ok(20));
    assert_eq!(pass(0), Err("zero"));
    test!(hit: pass(5), Ok(20));
}

/// Test that memoization can be switched off.
#[test]
fn test_disabled() {
    let mut runtime = Runtime::with_config(Config { memoize: false, ..Config::default() });
    let id = runtime.mount();
    let counter = Counter::default();
    let view = memo(|n: &u8| *n);

    for _ in 0..3 {
        let (value, rendered) = runtime
            .render(id, |cx| (use_memo(cx, || counter.bump(), (1,)), view.render(cx, 7)))
            .unwrap();
        assert!(!rememo::internal::last_was_hit());
        assert_eq!(rendered, 7);
        assert_eq!(value, counter.get());
    }

    assert_eq!(counter.get(), 3);
}

/// Test that deep memos respect the configured depth limit.
#[test]
fn test_depth_limit() {
    fn nested(depth: usize) -> Value {
        (0..depth).fold(Value::from(1), |inner, _| Value::list([inner]))
    }

    for (limit, hit) in [(5, false), (100, true)] {
        let mut runtime = Runtime::with_config(Config { depth_limit: limit, ..Config::default() });
        let id = runtime.mount();
        let mut pass = || {
            runtime
                .render(id, |cx| use_deep_memo(cx, || 1, nested(20)))
                .unwrap()
        };

        test!(miss: pass(), 1);
        assert_eq!(pass(), 1);
        assert_eq!(rememo::internal::last_was_hit(), hit);
    }
}

/// Test that a scope knows its instance and pass.
#[test]
fn test_scope() {
    let config = Config { memoize: true, depth_limit: 8 };
    let mut runtime = Runtime::with_config(config.clone());
    assert_eq!(runtime.config(), &config);
    assert_eq!(Runtime::new().config(), &Config::default());

    let id = runtime.mount();
    let first = runtime.render(id, |cx| (cx.id(), cx.is_first_pass(), cx.depth_limit()));
    assert_eq!(first, Ok((id, true, 8)));
    let second = runtime.render(id, |cx| cx.is_first_pass());
    assert_eq!(second, Ok(false));
}

/// Test that unmounting drops the stored values.
#[test]
fn test_unmount() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    let data = Rc::new(());

    runtime
        .render(id, |cx| use_memo(cx, || data.clone(), ()))
        .unwrap();
    assert_eq!(Rc::strong_count(&data), 2);
    assert!(runtime.is_mounted(id));

    runtime.unmount(id).unwrap();
    assert_eq!(Rc::strong_count(&data), 1);
    assert!(!runtime.is_mounted(id));
    assert!(runtime.is_empty());
    assert_eq!(runtime.render(id, |_| ()), Err(Error::UnknownInstance(id)));
    assert_eq!(runtime.unmount(id), Err(Error::UnknownInstance(id)));

    // The slab slot is reused, but the old id stays dead.
    let next = runtime.mount();
    assert_ne!(next, id);
    assert!(!runtime.is_mounted(id));
    test!(miss: runtime.render(next, |cx| *use_memo(cx, || data.clone(), ())).unwrap(), ());
}

/// Test that a changed number of slots is reported.
#[test]
fn test_hook_count_changed() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();

    fn pass(cx: &mut Scope, extra: bool) {
        use_ref(cx, 1);
        if extra {
            use_ref(cx, 2);
        }
    }

    runtime.render(id, |cx| pass(cx, true)).unwrap();
    runtime.render(id, |cx| pass(cx, true)).unwrap();
    assert_eq!(
        runtime.render(id, |cx| pass(cx, false)),
        Err(Error::HookCountChanged { instance: id, expected: 2, found: 1 }),
    );
}

/// Test that a slot acquired with another type panics.
#[test]
#[should_panic(expected = "slots must be acquired in the same order")]
fn test_slot_type_mismatch() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    runtime.render(id, |cx| use_ref(cx, 1_u8)).unwrap();
    runtime.render(id, |cx| use_ref(cx, "one")).unwrap();
}

/// Test that dynamic values work as dependencies.
#[test]
fn test_value_dependencies() {
    let mut runtime = Runtime::new();
    let id = runtime.mount();
    let items = Value::list([1, 2, 3]);

    let mut pass = |items: &Value| {
        runtime
            .render(id, |cx| use_memo(cx, || items.len(), (items.clone(), Value::from("sum"))))
            .unwrap()
    };

    test!(miss: pass(&items), Some(3));
    test!(hit: pass(&items), Some(3));
    test!(miss: pass(&Value::list([1, 2, 3])), Some(3));
}

/// A store that is not the bundled runtime.
#[derive(Default)]
struct Fixed {
    slots: Vec<Box<dyn std::any::Any>>,
    cursor: usize,
}

impl Store for Fixed {
    fn slot<T: 'static>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        if self.cursor == self.slots.len() {
            self.slots.push(Box::new(init()));
        }
        self.cursor += 1;
        self.slots[self.cursor - 1].downcast_mut().unwrap()
    }
}

/// Test that the hooks only rely on the `Store` trait.
#[test]
fn test_custom_store() {
    let mut store = Fixed::default();
    let counter = Counter::default();

    for _ in 0..2 {
        store.cursor = 0;
        let cell = use_ref(&mut store, 10);
        let value = use_memo(&mut store, || counter.bump(), ("key",));
        assert_eq!(cell.get(), 10);
        assert_eq!(value, 1);
    }

    assert_eq!(counter.get(), 1);
}
