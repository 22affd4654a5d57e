use super::*;

fn record(name: &str, kind: ModuleKind) -> ModuleRecord {
    ModuleRecord {
        name: QualifiedName::from(name),
        source: SourceId::new(format!("{name}.py")),
        tree: NodeTree::new(),
        kind,
    }
}

#[test]
fn test_insert_rejects_duplicates() {
    let mut set = ModuleSet::new();
    assert!(set.insert(record("a", ModuleKind::Importable)));
    assert!(!set.insert(record("a", ModuleKind::Entry)));
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.get(&QualifiedName::from("a")).map(|r| r.kind),
        Some(ModuleKind::Importable)
    );
}

#[test]
fn test_frozen_set_orders_by_name() {
    let mut set = ModuleSet::new();
    for name in ["b.x", "a.z", "a.y"] {
        set.insert(record(name, ModuleKind::Importable));
    }
    set.insert(record("main", ModuleKind::Entry));
    let frozen = set.freeze();
    let order: Vec<&str> = frozen.importable().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["a.y", "a.z", "b.x"]);
    assert_eq!(
        frozen.entry().map(|r| r.name.as_str()),
        Some("main")
    );
}

#[test]
fn test_located_without_record() {
    let mut set = ModuleSet::new();
    set.mark_located(QualifiedName::from("ghost"));
    let frozen = set.freeze();
    let ghost = QualifiedName::from("ghost");
    assert!(frozen.was_located(&ghost));
    assert!(!frozen.is_compiled(&ghost));
}
