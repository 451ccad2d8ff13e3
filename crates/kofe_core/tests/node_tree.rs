use kofe_core::db::open_db_in_memory;
use kofe_core::{
    DescriptorEdit, DescriptorService, EngineConfig, ErrorKind, LanguageRequest, LanguageService,
    NewNode, Node, NodeService, NodeUpdate, Outcome, Refusal, ServiceError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    LanguageService::try_new(&conn, EngineConfig::default())
        .unwrap()
        .initialize_first(None)
        .unwrap();
    conn
}

fn create(service: &NodeService<'_>, request: NewNode) -> Node {
    service.create(&request).unwrap().into_value()
}

/// Builds the chain `a -> b -> c`.
fn chain(service: &NodeService<'_>) -> (Node, Node, Node) {
    let a = create(service, NewNode::root("a"));
    let b = create(service, NewNode::child_of(a.id, "b"));
    let c = create(service, NewNode::child_of(b.id, "c"));
    (a, b, c)
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn create_root_reports_null_parent_and_expansion() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();

    let outcome = service.create(&NewNode::root("first")).unwrap();
    assert!(outcome.is_done());
    assert_eq!(
        outcome.message(),
        "Node has been added. Parent: null. Expanded 1 descriptor(s)"
    );

    let node = outcome.into_value();
    assert!(node.is_root());
    assert!(node.active);
    assert_eq!(node.note, "first");
}

#[test]
fn create_child_reports_parent_id() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let parent = create(&service, NewNode::root("parent"));

    let outcome = service
        .create(&NewNode::child_of(parent.id, "child"))
        .unwrap();
    assert!(outcome
        .message()
        .contains(&format!("Parent: id={}", parent.id)));
    assert_eq!(outcome.value().parent_id, Some(parent.id));
}

#[test]
fn create_with_unknown_parent_fails_without_side_effects() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = service
        .create(&NewNode::child_of(missing, "orphan"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ParentNotFound(id) if id == missing));
    assert_eq!(count(&conn, "nodes"), 0);
    assert_eq!(count(&conn, "descriptors"), 0);
}

#[test]
fn siblings_keep_creation_order() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let parent = create(&service, NewNode::root("parent"));
    let first = create(&service, NewNode::child_of(parent.id, "1"));
    let second = create(&service, NewNode::child_of(parent.id, "2"));
    let third = create(&service, NewNode::child_of(parent.id, "3").with_active(false));

    let ids: Vec<_> = service
        .children(Some(parent.id))
        .unwrap()
        .into_iter()
        .map(|node| node.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);

    let roots = service.children(None).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, parent.id);

    assert_eq!(service.list_all().unwrap().len(), 4);
    assert_eq!(service.list_active().unwrap().len(), 3);
}

#[test]
fn children_of_unknown_parent_is_not_found() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();

    let err = service.children(Some(Uuid::new_v4())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn can_relocate_rejects_moves_into_own_subtree() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let (a, b, c) = chain(&service);

    assert!(!service.can_relocate(a.id, Some(c.id)).unwrap());
    assert!(!service.can_relocate(a.id, Some(b.id)).unwrap());
    assert!(!service.can_relocate(a.id, Some(a.id)).unwrap());
    assert!(service.can_relocate(c.id, Some(a.id)).unwrap());
    assert!(service.can_relocate(b.id, None).unwrap());
    assert!(service.can_relocate(a.id, None).unwrap());
}

#[test]
fn can_relocate_reports_unknown_nodes() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let a = create(&service, NewNode::root("a"));
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.can_relocate(missing, Some(a.id)).unwrap_err(),
        ServiceError::NodeNotFound(id) if id == missing
    ));
    assert!(matches!(
        service.can_relocate(a.id, Some(missing)).unwrap_err(),
        ServiceError::ParentNotFound(id) if id == missing
    ));
}

#[test]
fn cyclic_relocation_is_refused_without_mutation() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let (a, _, c) = chain(&service);

    let outcome = service.relocate(a.id, Some(c.id)).unwrap();
    assert!(!outcome.is_done());
    assert_eq!(
        outcome.reasons(),
        &[Refusal::RelocationCycle {
            node_id: a.id,
            destination_id: c.id,
        }]
    );
    assert_eq!(service.get(a.id).unwrap(), a);
}

#[test]
fn relocation_appends_as_last_child() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let (a, b, c) = chain(&service);
    let d = create(&service, NewNode::child_of(a.id, "d"));

    let outcome = service.relocate(c.id, Some(a.id)).unwrap();
    assert!(outcome.is_done());
    assert_eq!(outcome.value().parent_id, Some(a.id));

    let ids: Vec<_> = service
        .children(Some(a.id))
        .unwrap()
        .into_iter()
        .map(|node| node.id)
        .collect();
    assert_eq!(ids, vec![b.id, d.id, c.id]);
    assert!(service.children(Some(b.id)).unwrap().is_empty());
}

#[test]
fn relocation_to_root() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let (a, b, _) = chain(&service);

    let moved = service.relocate(b.id, None).unwrap().into_value();
    assert!(moved.is_root());

    let roots: Vec<_> = service
        .children(None)
        .unwrap()
        .into_iter()
        .map(|node| node.id)
        .collect();
    assert_eq!(roots, vec![a.id, b.id]);
}

#[test]
fn relocating_unknown_node_is_not_found() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();

    let err = service.relocate(Uuid::new_v4(), None).unwrap_err();
    assert!(matches!(err, ServiceError::NodeNotFound(_)));
}

#[test]
fn update_applies_fields_and_descriptor_edits() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let descriptors = DescriptorService::try_new(&conn).unwrap();
    let node = create(&service, NewNode::root("before"));
    let descriptor = descriptors.list_for_node(node.id).unwrap().remove(0);

    let outcome = service
        .update(&NodeUpdate {
            id: node.id,
            active: false,
            note: "after".to_string(),
            descriptors: vec![DescriptorEdit {
                id: descriptor.id,
                title: "Title".to_string(),
                brief: "Brief".to_string(),
                full_descr: Some("docs/full.md".to_string()),
            }],
        })
        .unwrap();

    assert!(outcome.is_done());
    assert_eq!(outcome.message(), "Node has been updated");
    assert!(!outcome.value().active);
    assert_eq!(outcome.value().note, "after");

    let stored = descriptors.get(descriptor.id).unwrap();
    assert_eq!(stored.title, "Title");
    assert_eq!(stored.brief, "Brief");
    assert_eq!(stored.full_descr.as_deref(), Some("docs/full.md"));
}

#[test]
fn update_reports_each_missing_descriptor_and_applies_the_rest() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let descriptors = DescriptorService::try_new(&conn).unwrap();
    let node = create(&service, NewNode::root("node"));
    let known = descriptors.list_for_node(node.id).unwrap().remove(0);
    let first_missing = Uuid::new_v4();
    let second_missing = Uuid::new_v4();

    let edit = |id| DescriptorEdit {
        id,
        title: "edited".to_string(),
        brief: String::new(),
        full_descr: None,
    };
    let outcome = service
        .update(&NodeUpdate {
            id: node.id,
            active: true,
            note: "changed".to_string(),
            descriptors: vec![edit(first_missing), edit(known.id), edit(second_missing)],
        })
        .unwrap();

    assert!(matches!(outcome, Outcome::Partial { .. }));
    assert_eq!(
        outcome.reasons(),
        &[
            Refusal::DescriptorMissing(first_missing),
            Refusal::DescriptorMissing(second_missing),
        ]
    );
    assert_eq!(
        outcome.message(),
        format!(
            "Node has been updated | descriptor not found: {first_missing} | descriptor not found: {second_missing}"
        )
    );
    assert_eq!(service.get(node.id).unwrap().note, "changed");
    assert_eq!(descriptors.get(known.id).unwrap().title, "edited");
}

#[test]
fn update_unknown_node_is_not_found() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();

    let err = service
        .update(&NodeUpdate {
            id: Uuid::new_v4(),
            active: true,
            note: String::new(),
            descriptors: Vec::new(),
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::NodeNotFound(_)));
}

#[test]
fn delete_removes_subtree_and_descriptors_only() {
    let conn = setup();
    LanguageService::try_new(&conn, EngineConfig::default())
        .unwrap()
        .create(&LanguageRequest::new("FR", "French"))
        .unwrap();
    let service = NodeService::try_new(&conn).unwrap();
    let descriptors = DescriptorService::try_new(&conn).unwrap();
    let (a, b, c) = chain(&service);
    let sibling = create(&service, NewNode::root("sibling"));
    assert_eq!(count(&conn, "descriptors"), 8);

    let deletion = service.delete(b.id).unwrap();
    assert_eq!(deletion.node_ids, vec![b.id, c.id]);
    assert_eq!(deletion.descriptor_ids.len(), 4);

    for id in [b.id, c.id] {
        assert!(matches!(
            service.get(id).unwrap_err(),
            ServiceError::NodeNotFound(_)
        ));
        assert!(descriptors.list_for_node(id).unwrap().is_empty());
    }
    for id in deletion.descriptor_ids {
        assert!(descriptors.get(id).is_err());
    }
    assert!(service.children(Some(a.id)).unwrap().is_empty());
    assert_eq!(descriptors.list_for_node(sibling.id).unwrap().len(), 2);
    assert_eq!(count(&conn, "nodes"), 2);
    assert_eq!(count(&conn, "descriptors"), 4);
}

#[test]
fn delete_unknown_node_is_not_found() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();

    let err = service.delete(Uuid::new_v4()).unwrap_err();
    assert_eq!(err.code(), "NODE_NOT_FOUND");
}

#[test]
fn tree_nests_children_and_hides_inactive_subtrees() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let (a, b, c) = chain(&service);
    let hidden = create(&service, NewNode::child_of(a.id, "hidden").with_active(false));
    create(&service, NewNode::child_of(hidden.id, "under hidden"));

    let full = service.tree(false).unwrap();
    assert_eq!(full.len(), 1);
    assert_eq!(full[0].node_count(), 5);

    let active = service.tree(true).unwrap();
    assert_eq!(active[0].node_count(), 3);
    assert_eq!(active[0].children[0].id, b.id);
    assert_eq!(active[0].children[0].children[0].id, c.id);
    assert_eq!(active[0].descriptors.len(), 1);
}

#[test]
fn view_serializes_nested_payload() {
    let conn = setup();
    let service = NodeService::try_new(&conn).unwrap();
    let (a, b, _) = chain(&service);

    let view = service.view(b.id).unwrap();
    assert_eq!(view.parent_id, Some(a.id));
    assert_eq!(view.node_count(), 2);

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["note"], "b");
    assert_eq!(json["children"][0]["note"], "c");
    assert_eq!(json["descriptors"][0]["title"], "");
    assert!(json["descriptors"][0]["full_descr"].is_null());
}
