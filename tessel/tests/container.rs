use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tessel::dependency_container::ContainerDependencyResolver;
use tessel::{Container, DependencyLifetime, DependencyResolver, ResolutionError};

struct Database {
    url: String,
}

struct UserRepository {
    db: Arc<Database>,
}

trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self, name: &str) -> String {
        format!("Hello, {name}!")
    }
}

#[test]
fn instance_binding_returns_same_arc() {
    let container = Container::new();
    let db = Arc::new(Database {
        url: "postgres://localhost".into(),
    });
    container.bind_instance(db.clone());

    assert!(container.has_binding::<Database>());
    let resolved = container.resolve::<Database>().unwrap();
    assert!(Arc::ptr_eq(&db, &resolved));
    assert_eq!(resolved.url, "postgres://localhost");
}

#[test]
fn unbound_type_reports_type_name() {
    let container = Container::new();
    let err = container.resolve::<Database>().err().unwrap();
    assert!(matches!(err, ResolutionError::NotBound { .. }));
    assert!(err.type_name().ends_with("Database"));
}

#[test]
fn singleton_factory_runs_once() {
    let container = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    container.bind_singleton(move |_: &Container| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Database {
            url: "sqlite::memory:".into(),
        }))
    });

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let first = container.resolve::<Database>().unwrap();
    let second = container.resolve::<Database>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn transient_factory_runs_every_time() {
    let container = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    container.bind_factory(DependencyLifetime::Transient, move |_: &Container| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Database {
            url: format!("db-{n}"),
        }))
    });

    let first = container.resolve::<Database>().unwrap();
    let second = container.resolve::<Database>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.url, "db-0");
    assert_eq!(second.url, "db-1");
}

#[test]
fn factories_resolve_their_own_dependencies() {
    let container = Container::new();
    container.bind_singleton(|container: &Container| {
        Ok(Arc::new(UserRepository {
            db: container.resolve::<Database>()?,
        }))
    });
    container.bind_instance(Arc::new(Database {
        url: "mysql://db".into(),
    }));

    let repo = container.resolve::<UserRepository>().unwrap();
    assert_eq!(repo.db.url, "mysql://db");
}

#[test]
fn failing_singleton_is_not_cached() {
    let container = Container::new();
    container.bind_singleton(|container: &Container| {
        Ok(Arc::new(UserRepository {
            db: container.resolve::<Database>()?,
        }))
    });

    let err = container.resolve::<UserRepository>().err().unwrap();
    assert!(matches!(err, ResolutionError::Factory { .. }));
    let source = std::error::Error::source(&err).unwrap();
    assert!(source.to_string().contains("Database"));

    container.bind_instance(Arc::new(Database { url: "late".into() }));
    let repo = container.resolve::<UserRepository>().unwrap();
    assert_eq!(repo.db.url, "late");
}

#[test]
fn trait_objects_can_be_bound() {
    let container = Container::new();
    let greeter: Arc<dyn Greeter> = Arc::new(EnglishGreeter);
    container.bind_instance(greeter);

    assert!(container.has_binding::<dyn Greeter>());
    assert!(!container.has_binding::<EnglishGreeter>());
    let greeter = container.resolve::<dyn Greeter>().unwrap();
    assert_eq!(greeter.greet("tessel"), "Hello, tessel!");
}

#[test]
fn rebinding_replaces_and_unbind_removes() {
    let container = Container::new();
    container.bind_instance(Arc::new(Database { url: "a".into() }));
    container.bind_instance(Arc::new(Database { url: "b".into() }));
    assert_eq!(container.len(), 1);
    assert_eq!(container.resolve::<Database>().unwrap().url, "b");

    assert!(container.unbind::<Database>());
    assert!(!container.unbind::<Database>());
    assert!(container.is_empty());
}

#[test]
fn clones_share_bindings() {
    let container = Container::new();
    let clone = container.clone();
    clone.bind_instance(Arc::new(Database { url: "shared".into() }));

    assert!(container.ptr_eq(&clone));
    assert_eq!(container.resolve::<Database>().unwrap().url, "shared");
}

#[test]
fn resolver_holds_weak_handle() {
    let container = Container::new();
    container.bind_instance(Arc::new(Database { url: "weak".into() }));
    let resolver: Arc<dyn DependencyResolver> =
        Arc::new(ContainerDependencyResolver::new(&container));
    container.bind_instance(resolver.clone());

    assert_eq!(resolver.resolve::<Database>().unwrap().url, "weak");

    drop(container);
    let err = resolver.resolve::<Database>().err().unwrap();
    assert!(matches!(err, ResolutionError::ContainerDropped { .. }));
}
