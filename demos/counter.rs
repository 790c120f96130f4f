//! Counter Example - state slots driving incremental terminal updates
//!
//! This example demonstrates the reconciliation loop:
//! - Painting a component tree onto the terminal
//! - Writing state cells and flushing them into repaint passes
//! - Keyed children being added and removed between passes
//!
//! Run with: cargo run --example counter

use std::cell::RefCell;
use std::io::stdout;
use std::rc::Rc;
use std::thread::sleep;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use spark_reconciler::{
    Component, Controller, Injection, RenderError, Result, StatePath, TerminalView, TreeScheduler,
    VNode, Viewport,
};

fn main() -> Result<()> {
    let counter = Component::new("Counter", |args: &Injection| {
        let name = args.prop("name").map(|p| p.to_string()).unwrap_or_default();
        let count = args
            .state()
            .and_then(|state| state.get::<i64>("count"))
            .ok_or_else(|| RenderError::new("counter without state"))?;
        Ok::<_, RenderError>(VNode::text(format!("{name}: {count}")))
    })
    .state("count", |_| 0i64)
    .build();

    let names = Rc::new(RefCell::new(vec!["apples", "pears"]));
    let list = names.clone();
    let app = Component::new("App", move |_: &Injection| {
        let rows: Vec<VNode> = list
            .borrow()
            .iter()
            .map(|name| VNode::component(&counter).with_key(*name).with_prop("name", *name))
            .collect();
        Ok::<_, RenderError>(vec![
            VNode::text("== fruit =="),
            VNode::element("column").with_children(rows),
        ])
    })
    .build();

    execute!(stdout(), Clear(ClearType::All))?;
    let controller = Controller::builder()
        .scheduler(TreeScheduler::new())
        .view(TerminalView::new(stdout()))
        .build();
    controller.paint(VNode::component(&app), Viewport { row: 0 })?;

    for step in 1..=5i64 {
        sleep(Duration::from_millis(300));
        let apples = controller
            .get_state_tree()
            .slot(&StatePath::root().child("Counter#apples"))?;
        apples.set("count", step);
        controller.flush()?;
    }

    // Swap the list: pears stay, apples go, plums arrive.
    sleep(Duration::from_millis(300));
    *names.borrow_mut() = vec!["pears", "plums"];
    if let Some(tree) = controller.get_ctree() {
        controller.repaint(&[tree.root().clone()])?;
    }

    sleep(Duration::from_millis(300));
    controller.unmount()?;
    println!();
    Ok(())
}
