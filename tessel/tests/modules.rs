use parking_lot::Mutex;
use std::sync::Arc;
use tessel::auto::ModuleFlag;
use tessel::config::ApplicationConfig;
use tessel::{
    Application, ApplicationBuilder, BootstrapError, Command, CommandRegistry, ComponentBuilder,
    Module, handler_fn,
};

fn noop(_: &[String]) -> anyhow::Result<i32> {
    Ok(0)
}

struct MigrationModule;

impl Module for MigrationModule {
    fn build(&self, builder: &mut ApplicationBuilder) {
        builder.with_commands(|registry| {
            registry.register_command(
                Command::new("migrate", "Run database migrations")?
                    .with_help_text("migrate [--step N]"),
                noop,
            );
            Ok(())
        });
    }
}

fn register_ping(builder: &mut ApplicationBuilder) {
    builder.with_routes(|routes| {
        routes
            .get("/ping")
            .to_handler(handler_fn(|_req| async { "pong" }));
        Ok(())
    });
}

tessel::inventory::submit! {
    ModuleFlag { name: "ping", register: register_ping }
}

fn app_builder() -> ApplicationBuilder {
    let mut builder = Application::builder();
    builder.with_config(ApplicationConfig::default());
    ComponentBuilder::new()
        .with_command_component(&mut builder)
        .with_route_component(&mut builder);
    builder
}

#[test]
fn module_contributes_commands() {
    let mut builder = app_builder();
    builder.with_module(MigrationModule);
    let app = builder.build().unwrap();

    let commands = app.commands().unwrap();
    let registry = commands.read();
    let binding = registry.get("migrate").unwrap();
    assert_eq!(binding.command.description(), "Run database migrations");
    assert_eq!(binding.command.help_text(), Some("migrate [--step N]"));
    assert_eq!(binding.handler.handle(&[]).unwrap(), 0);
}

#[tokio::test]
async fn discovered_modules_are_applied() {
    let mut builder = app_builder();
    builder.with_discovered_modules();
    let app = builder.build().unwrap();

    app.test_client()
        .unwrap()
        .get("/ping")
        .send()
        .await
        .assert_text("pong");
}

#[test]
fn bootstrappers_run_before_component_factories() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut builder = app_builder();

    let log = events.clone();
    builder.with_bootstrapper(move |_| {
        log.lock().push("bootstrap");
        Ok(())
    });
    let log = events.clone();
    builder.with_commands(move |_| {
        log.lock().push("commands");
        Ok(())
    });
    builder.build().unwrap();

    assert_eq!(*events.lock(), vec!["bootstrap", "commands"]);
}

#[test]
fn replaced_factory_keeps_its_position() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut builder = Application::builder();
    builder.with_config(ApplicationConfig::default());

    let log = events.clone();
    builder.register_component_factory("first", move |_, _, _| {
        log.lock().push("first-original");
        Ok(())
    });
    let log = events.clone();
    builder.register_component_factory("second", move |_, _, _| {
        log.lock().push("second");
        Ok(())
    });
    let log = events.clone();
    builder.register_component_factory("first", move |_, _, callbacks| {
        log.lock().push("first-replacement");
        assert_eq!(callbacks.len(), 1);
        Ok(())
    });
    builder.with_component("first", |_: &mut CommandRegistry| Ok(()));
    builder.build().unwrap();

    assert_eq!(*events.lock(), vec!["first-replacement", "second"]);
}

#[test]
fn registrations_made_by_a_running_factory_are_rejected() {
    let mut builder = Application::builder();
    builder.with_config(ApplicationConfig::default());
    builder.register_component_factory("outer", |builder, _, _| {
        builder.register_component_factory("inner", |_, _, _| Ok(()));
        Ok(())
    });

    let err = builder.build().err().unwrap();
    match err.downcast_ref::<BootstrapError>() {
        Some(BootstrapError::LateRegistration { component }) => assert_eq!(component, "inner"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn callbacks_added_by_a_running_factory_are_rejected() {
    let mut builder = app_builder();
    builder.register_component_factory("late", |builder, _, _| {
        builder.with_commands(|_| Ok(()));
        Ok(())
    });

    let err = builder.build().err().unwrap();
    assert!(matches!(
        err.downcast_ref::<BootstrapError>(),
        Some(BootstrapError::LateRegistration { component }) if component == "commands"
    ));
}
