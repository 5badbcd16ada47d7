use std::sync::Arc;

use super::*;
use crate::module_system::dependency::{resolve_load_order, DependencyResolver};
use crate::module_system::error::{ErrorKind, ModuleSystemError};
use crate::module_system::registry::{ModuleEntry, ModuleRegistry};

fn registry(entries: Vec<ModuleEntry>) -> ModuleRegistry {
    ModuleRegistry::new(entries).expect("registry should build")
}

fn position(order: &[ModuleType], module_type: ModuleType) -> usize {
    order
        .iter()
        .position(|t| *t == module_type)
        .unwrap_or_else(|| panic!("{module_type} missing from {order:?}"))
}

#[test]
fn test_dependency_forces_order_over_priority() {
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(Probe::<A>::new("A", BootPriority::Normal, &log).depends_on(ty::<B>())),
        ModuleEntry::new(Probe::<B>::new("B", BootPriority::Lowest, &log)),
    ]);

    let order = resolve_load_order(&reg).unwrap();
    assert_eq!(order, vec![ty::<B>(), ty::<A>()]);
}

#[test]
fn test_higher_priority_first_regardless_of_registration_order() {
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(Probe::<Y>::new("Y", BootPriority::Normal, &log)),
        ModuleEntry::new(Probe::<X>::new("X", BootPriority::Highest, &log)),
    ]);

    let order = DependencyResolver::new(&reg).resolve().unwrap();
    assert_eq!(order, vec![ty::<X>(), ty::<Y>()]);
}

#[test]
fn test_equal_priority_keeps_registration_order() {
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(Probe::<C>::new("C", BootPriority::Normal, &log)),
        ModuleEntry::new(Probe::<A>::new("A", BootPriority::Normal, &log)),
        ModuleEntry::new(Probe::<B>::new("B", BootPriority::Normal, &log)),
    ]);

    let order = resolve_load_order(&reg).unwrap();
    assert_eq!(order, vec![ty::<C>(), ty::<A>(), ty::<B>()]);
}

#[test]
fn test_manual_modules_never_in_startup_order() {
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(Probe::<Z>::new("Z", BootPriority::None, &log)),
        ModuleEntry::new(Probe::<A>::new("A", BootPriority::Normal, &log)),
    ]);

    let order = resolve_load_order(&reg).unwrap();
    assert_eq!(order, vec![ty::<A>()]);
}

#[test]
fn test_dependency_on_manual_module_is_validated_but_not_scheduled() {
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(Probe::<A>::new("A", BootPriority::Normal, &log).depends_on(ty::<Z>())),
        ModuleEntry::new(Probe::<Z>::new("Z", BootPriority::None, &log)),
    ]);

    let order = resolve_load_order(&reg).unwrap();
    assert_eq!(order, vec![ty::<A>()]);
}

#[test]
fn test_diamond_graph_contains_each_module_once_with_dependencies_first() {
    // D depends on B and C, both depend on A.
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(
            Probe::<D>::new("D", BootPriority::Critical, &log)
                .depends_on(ty::<B>())
                .depends_on(ty::<C>()),
        ),
        ModuleEntry::new(Probe::<C>::new("C", BootPriority::Lowest, &log).depends_on(ty::<A>())),
        ModuleEntry::new(Probe::<B>::new("B", BootPriority::Highest, &log).depends_on(ty::<A>())),
        ModuleEntry::new(Probe::<A>::new("A", BootPriority::Lowest, &log)),
        ModuleEntry::new(Probe::<X>::new("X", BootPriority::Normal, &log)),
    ]);

    let order = resolve_load_order(&reg).unwrap();
    assert_eq!(order.len(), 5);
    for module_type in [ty::<A>(), ty::<B>(), ty::<C>(), ty::<D>(), ty::<X>()] {
        assert_eq!(order.iter().filter(|t| **t == module_type).count(), 1);
    }

    let edges = [
        (ty::<D>(), ty::<B>()),
        (ty::<D>(), ty::<C>()),
        (ty::<C>(), ty::<A>()),
        (ty::<B>(), ty::<A>()),
    ];
    for (module, dependency) in edges {
        assert!(
            position(&order, dependency) < position(&order, module),
            "{dependency} must precede {module} in {order:?}"
        );
    }
    // The critical module and everything it needs come before the unrelated normal one
    assert_eq!(order.last(), Some(&ty::<X>()));
}

#[test]
fn test_dependency_by_capability() {
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(
            Probe::<A>::new("A", BootPriority::Critical, &log)
                .depends_on(ModuleType::of::<dyn Greeter>()),
        ),
        ModuleEntry::builder(Arc::new(GreeterModule::with_priority(
            "hi",
            BootPriority::Lowest,
            &log,
        )))
        .provides(|m| m as Arc<dyn Greeter>)
        .build(),
    ]);

    let order = resolve_load_order(&reg).unwrap();
    assert_eq!(order, vec![ModuleType::of::<GreeterModule>(), ty::<A>()]);
}

#[test]
fn test_two_module_cycle_detected() {
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(Probe::<A>::new("A", BootPriority::Normal, &log).depends_on(ty::<B>())),
        ModuleEntry::new(Probe::<B>::new("B", BootPriority::Normal, &log).depends_on(ty::<A>())),
    ]);

    let err = resolve_load_order(&reg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    match err {
        ModuleSystemError::CircularDependency { module, path } => {
            assert_eq!(module, "A");
            assert_eq!(path, vec!["A", "B", "A"]);
        }
        other => panic!("expected CircularDependency, got {other:?}"),
    }
}

#[test]
fn test_three_module_cycle_path_excludes_unrelated_modules() {
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(Probe::<D>::new("D", BootPriority::Critical, &log).depends_on(ty::<A>())),
        ModuleEntry::new(Probe::<A>::new("A", BootPriority::Normal, &log).depends_on(ty::<B>())),
        ModuleEntry::new(Probe::<B>::new("B", BootPriority::Normal, &log).depends_on(ty::<C>())),
        ModuleEntry::new(Probe::<C>::new("C", BootPriority::Normal, &log).depends_on(ty::<A>())),
    ]);

    let err = resolve_load_order(&reg).unwrap_err();
    let message = err.to_string();
    match err {
        ModuleSystemError::CircularDependency { module, path } => {
            assert_eq!(module, "A");
            assert_eq!(path, vec!["A", "B", "C", "A"]);
            assert!(!path.contains(&"D".to_string()));
        }
        other => panic!("expected CircularDependency, got {other:?}"),
    }
    assert!(message.contains("Circular dependency detected involving module 'A'"));
    assert!(message.contains("A -> B -> C -> A"));
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let log = new_log();
    let reg = registry(vec![ModuleEntry::new(
        Probe::<A>::new("A", BootPriority::Normal, &log).depends_on(ty::<A>()),
    )]);

    assert!(matches!(
        resolve_load_order(&reg),
        Err(ModuleSystemError::CircularDependency { .. })
    ));
}

#[test]
fn test_missing_dependency_names_module_and_type() {
    let log = new_log();
    let reg = registry(vec![ModuleEntry::new(
        Probe::<A>::new("A", BootPriority::Normal, &log).depends_on(ty::<B>()),
    )]);

    let err = resolve_load_order(&reg).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Module 'A' depends on 'Probe<B>' but it is not registered"
    );
    match err {
        ModuleSystemError::MissingDependency { module, dependency } => {
            assert_eq!(module, "A");
            assert_eq!(dependency, "Probe<B>");
        }
        other => panic!("expected MissingDependency, got {other:?}"),
    }
}

#[test]
fn test_missing_dependency_of_manual_module_not_checked_at_startup() {
    // Manual modules are outside the startup graph; their wiring is checked
    // when they are loaded.
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(Probe::<Z>::new("Z", BootPriority::None, &log).depends_on(ty::<B>())),
        ModuleEntry::new(Probe::<A>::new("A", BootPriority::Normal, &log)),
    ]);

    assert_eq!(resolve_load_order(&reg).unwrap(), vec![ty::<A>()]);
}

#[test]
fn test_resolution_does_not_initialize_modules() {
    let log = new_log();
    let reg = registry(vec![
        ModuleEntry::new(Probe::<A>::new("A", BootPriority::Normal, &log)),
        ModuleEntry::new(Probe::<B>::new("B", BootPriority::Normal, &log).depends_on(ty::<A>())),
    ]);

    resolve_load_order(&reg).unwrap();
    assert!(events(&log).is_empty());
}
