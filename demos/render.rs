//! This example renders a small list over a few passes and shows which parts
//! are recomputed. Run it with `RUST_LOG=trace` to see every hit and miss.

use std::rc::Rc;

use rememo::{Callback, Compare, Runtime, Scope, memo, use_memo, use_ref};

/// The props of a single row.
#[derive(Compare)]
struct RowProps {
    label: Rc<str>,
    selected: bool,
    on_select: Callback<dyn Fn(usize)>,
}

fn main() -> rememo::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .with_target(false)
        .init();

    let items: Rc<[Rc<str>]> = ["apples", "pears", "plums"].map(Rc::<str>::from).into();
    let row = memo(|props: &RowProps| {
        let marker = if props.selected { '>' } else { ' ' };
        format!("{marker} {}", props.label)
    });

    let mut runtime = Runtime::new();
    let list = runtime.mount();
    let rows: Vec<_> = items.iter().map(|_| runtime.mount()).collect();

    // [Miss] Everything renders on the first pass.
    // [Hit]  Nothing changed on the second pass.
    // [Miss] Only the rows whose selection flipped render on the third pass.
    for selected in [0, 0, 2] {
        let (summary, on_select) = runtime.render(list, |cx| view(cx, &items, selected))?;
        println!("{summary}");

        for (i, &id) in rows.iter().enumerate() {
            let line = runtime.render(id, |cx| {
                row.render(
                    cx,
                    RowProps {
                        label: items[i].clone(),
                        selected: i == selected,
                        on_select: on_select.clone(),
                    },
                )
            })?;
            println!("{line}");
        }
    }

    for id in rows.into_iter().chain([list]) {
        runtime.unmount(id)?;
    }

    Ok(())
}

/// Render the list header and the shared selection handler.
fn view(
    cx: &mut Scope,
    items: &Rc<[Rc<str>]>,
    selected: usize,
) -> (String, Callback<dyn Fn(usize)>) {
    let passes = use_ref(cx, 0);
    passes.update(|n| *n += 1);

    let total = use_memo(cx, || items.iter().map(|item| item.len()).sum::<usize>(), items.clone());
    let on_select = use_memo(
        cx,
        || Callback::from(Rc::new(|i: usize| println!("selected {i}")) as Rc<dyn Fn(usize)>),
        (),
    );

    let summary = format!(
        "pass {}: {} items, {total} letters, #{selected} selected",
        passes.get(),
        items.len(),
    );
    (summary, on_select)
}
