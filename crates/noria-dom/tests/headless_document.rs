//! Behaviour of the headless document as seen through `dyn Document`.

use std::cell::RefCell;
use std::rc::Rc;

use noria_dom::{Document, DomError, DomEvent, EventType, HeadlessDocument, insert_child_at};
use pretty_assertions::assert_eq;

fn list(doc: &mut dyn Document, items: &[&str]) -> noria_dom::NodeHandle {
    let ul = doc.create_element("ul");
    for item in items {
        let li = doc.create_element("li");
        let text = doc.create_text(item);
        doc.append_child(li, text).unwrap();
        doc.append_child(ul, li).unwrap();
    }
    ul
}

#[test]
fn insert_child_at_appends_past_the_end() {
    let mut doc = HeadlessDocument::new();
    let ul = list(&mut doc, &["a", "c"]);
    let b = doc.create_text("b");
    insert_child_at(&mut doc, ul, b, 1).unwrap();
    let d = doc.create_text("d");
    insert_child_at(&mut doc, ul, d, 42).unwrap();
    assert_eq!(
        doc.to_html(ul).unwrap(),
        "<ul><li>a</li>b<li>c</li>d</ul>"
    );
}

#[test]
fn reinserting_moves_instead_of_copying() {
    let mut doc = HeadlessDocument::new();
    let ul = list(&mut doc, &["a", "b"]);
    let first = doc.child_at(ul, 0).unwrap().unwrap();
    doc.append_child(ul, first).unwrap();
    assert_eq!(doc.to_html(ul).unwrap(), "<ul><li>b</li><li>a</li></ul>");
    assert_eq!(doc.child_count(ul).unwrap(), 2);
}

#[test]
fn replace_child_swaps_in_place() {
    let mut doc = HeadlessDocument::new();
    let ul = list(&mut doc, &["a", "b", "c"]);
    let old = doc.child_at(ul, 1).unwrap().unwrap();
    let new = doc.create_element("hr");
    doc.replace_child(ul, new, old).unwrap();
    assert_eq!(doc.to_html(ul).unwrap(), "<ul><li>a</li><hr></hr><li>c</li></ul>");
    assert_eq!(doc.parent_of(old).unwrap(), None);
    assert_eq!(
        doc.remove_child(ul, old),
        Err(DomError::NotAChild { parent: ul, child: old })
    );
}

#[test]
fn listeners_see_the_document() {
    let mut doc = HeadlessDocument::new();
    let button = doc.create_element("button");
    doc.mount(button).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    doc.add_listener(
        button,
        EventType::Click,
        Rc::new(move |doc: &mut dyn Document, event: &DomEvent| {
            let target = event.target.unwrap();
            doc.set_attribute(target, "data-clicked", "yes").unwrap();
            sink.borrow_mut().push(event.kind);
        }),
    )
    .unwrap();
    assert_eq!(doc.dispatch(button, DomEvent::click()).unwrap(), 1);
    assert_eq!(*seen.borrow(), vec![EventType::Click]);
    assert_eq!(doc.mounted_html(), r#"<button data-clicked="yes"></button>"#);
}

#[test]
fn text_nodes_reject_element_operations() {
    let mut doc = HeadlessDocument::new();
    let text = doc.create_text("x");
    let child = doc.create_text("y");
    assert_eq!(
        doc.set_attribute(text, "class", "a"),
        Err(DomError::NotAnElement(text))
    );
    assert_eq!(doc.append_child(text, child), Err(DomError::NotAnElement(text)));
}
