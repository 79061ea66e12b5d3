//! End-to-end scenarios: frames in, mirrored tree and outbound traffic out.

use noria_client::{Diagnostic, MessageKind, NodeId, Reconciler};
use noria_dom::{Document, DomEvent, HeadlessDocument};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn reconciler() -> Reconciler<HeadlessDocument> {
    Reconciler::new(HeadlessDocument::new())
}

fn apply(r: &mut Reconciler<HeadlessDocument>, frame: Value) {
    r.process_frame(&frame.to_string()).unwrap();
}

fn make(id: u64, ty: &str, props: Value) -> Value {
    json!({"update_type": "make-node", "make-node_node": id, "make-node_type": ty, "make-node_props": props})
}

fn update(id: u64, diff: Value) -> Value {
    json!({"update_type": "update-props", "update-props_node": id, "update-props_props-diff": diff})
}

fn add(parent: u64, child: u64, index: usize) -> Value {
    json!({"update_type": "add", "add_parent": parent, "add_child": child, "add_index": index})
}

#[test]
fn editor_view_builds_and_updates() {
    let mut r = reconciler();
    apply(
        &mut r,
        json!([
            make(0, "div", json!({"class": "editor"})),
            make(1, "style", json!({"name": ".kw", "style": {"color": "blue"}})),
            make(2, "raw-line", json!({
                "metrics": {"width": 10, "height": 20},
                "text": "abcdef",
                "fg-markup": [[3, "kw"], [3, null]],
                "bg-markup": [[6, "sel"]]
            })),
            add(0, 1, 0),
            add(0, 2, 1),
        ]),
    );
    let html = r.doc().mounted_html();
    assert!(html.starts_with(r#"<div class="editor"><style>.kw { color: blue; }</style>"#));
    assert!(html.contains(r#"<span class="kw">abc</span><span>def</span>"#));
    assert!(html.contains("left: 0px; width: 60px; height: 20px;"));

    apply(&mut r, json!([update(2, json!({"fg-markup": [[6, "str"]]}))]));
    let html = r.doc().mounted_html();
    assert!(html.contains(r#"<span class="str">abcdef</span>"#));
    assert!(html.contains("width: 60px"));
}

#[test]
fn raw_line_under_covering_markup() {
    let mut r = reconciler();
    apply(
        &mut r,
        json!([make(0, "raw-line", json!({
            "metrics": {"width": 7, "height": 14},
            "text": "hello",
            "fg-markup": [[2, "x"]]
        }))]),
    );
    assert!(r
        .doc()
        .mounted_html()
        .contains(r#"<span class="x">he</span><span>llo</span>"#));
}

#[test]
fn children_follow_server_indices() {
    let mut r = reconciler();
    apply(
        &mut r,
        json!([
            make(0, "div", json!({})),
            make(1, "text", json!({"text": "a"})),
            make(2, "text", json!({"text": "b"})),
            make(3, "text", json!({"text": "c"})),
            add(0, 3, 0),
            add(0, 1, 0),
            add(0, 2, 1),
        ]),
    );
    assert_eq!(r.doc().mounted_html(), "<div>abc</div>");

    apply(&mut r, json!([{"update_type": "remove", "remove_node": 2}, add(0, 2, 99)]));
    assert_eq!(r.doc().mounted_html(), "<div>acb</div>");
}

#[test]
fn unknown_type_is_reported_and_later_updates_skip() {
    let mut r = reconciler();
    let report = r
        .process_frame(
            &json!([
                make(5, "canvas", json!({})),
                update(5, json!({"class": "x"})),
                make(6, "div", json!({})),
            ])
            .to_string(),
        )
        .unwrap();
    assert_eq!((report.applied, report.skipped), (1, 2));
    assert!(!r.nodes().contains(NodeId(5)));
    let diagnostics: Vec<_> = r.diagnostics().iter().cloned().collect();
    assert_eq!(
        diagnostics,
        vec![
            Diagnostic::UnknownType {
                node: NodeId(5),
                node_type: "canvas".to_owned(),
            },
            Diagnostic::DanglingReference {
                message: MessageKind::UpdateProps,
                role: "node",
                node: NodeId(5),
            },
        ]
    );
}

#[test]
fn removed_click_handler_sends_nothing() {
    let mut r = reconciler();
    apply(&mut r, json!([make(0, "div", json!({"on-click": "noria-handler"}))]));
    apply(&mut r, json!([update(0, json!({"on-click": "-noria-handler"}))]));
    let root = r.primitive_of(NodeId(0)).unwrap();
    r.doc_mut().dispatch(root, DomEvent::click()).unwrap();
    assert!(r.take_outbound().is_empty());
}

#[test]
fn outbound_order_matches_firing_order() {
    let mut r = reconciler();
    apply(
        &mut r,
        json!([
            make(0, "div", json!({})),
            make(1, "div", json!({"on-click": "noria-handler", "on-wheel": "noria-handler"})),
            make(2, "div", json!({"on-click": "noria-handler"})),
            add(0, 1, 0),
            add(1, 2, 0),
        ]),
    );
    let inner = r.primitive_of(NodeId(2)).unwrap();
    let outer = r.primitive_of(NodeId(1)).unwrap();
    r.doc_mut().dispatch(inner, DomEvent::click()).unwrap();
    r.doc_mut().dispatch(outer, DomEvent::wheel(0.0, 3.0)).unwrap();
    let sent: Vec<_> = r
        .take_outbound()
        .into_iter()
        .map(|m| (m.node, m.key, m.arguments))
        .collect();
    assert_eq!(
        sent,
        vec![
            (NodeId(2), "on-click".to_owned(), vec![]),
            (NodeId(1), "on-click".to_owned(), vec![]),
            (NodeId(1), "on-wheel".to_owned(), vec![json!(0.0), json!(3.0)]),
        ]
    );
}

#[test]
fn hidden_input_forwards_keystrokes() {
    let mut r = reconciler();
    apply(
        &mut r,
        json!([
            make(0, "div", json!({})),
            make(9, "input-capture", json!({"on-input": "noria-handler", "focused?": true})),
            add(0, 9, 0),
        ]),
    );
    let input = r.primitive_of(NodeId(9)).unwrap();
    assert_eq!(r.doc().focused(), Some(input));
    r.doc_mut().type_text(input, "ls").unwrap();
    let sent = r.take_outbound();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].arguments, vec![json!("ls")]);
    assert_eq!(r.doc().input_value(input).unwrap(), "");
}

#[test]
fn style_update_is_a_hard_failure() {
    let mut r = reconciler();
    apply(&mut r, json!([make(1, "style", json!({"name": ".a", "style": ""}))]));
    let err = r
        .process_frame(&json!([update(1, json!({"style": "b: c"}))]).to_string())
        .unwrap_err();
    assert_eq!(err.node(), Some(NodeId(1)));
    assert!(err.to_string().contains("style does not support update_props"));
}

#[test]
fn independent_reconcilers_do_not_share_state() {
    let mut a = reconciler();
    let mut b = reconciler();
    apply(&mut a, json!([make(0, "div", json!({"on-click": "noria-handler"}))]));
    apply(&mut b, json!([make(0, "span", json!({}))]));
    let root = a.primitive_of(NodeId(0)).unwrap();
    a.doc_mut().dispatch(root, DomEvent::click()).unwrap();
    assert_eq!(a.outbox().len(), 1);
    assert!(b.outbox().is_empty());
    assert_eq!(b.doc().mounted_html(), "<span></span>");
}
