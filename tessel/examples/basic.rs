use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tessel::handler::BoxFuture;
use tessel::router::RouteParams;
use tessel::tessel_core::{Req, Resp};
use tessel::*;

/// 由容器管理的计数器
#[derive(Default)]
struct Visits(AtomicU64);

struct VisitHandler {
    visits: Arc<Visits>,
}

impl RequestHandler for VisitHandler {
    fn handle(&self, req: Req) -> BoxFuture<'static, AppResult<Resp>> {
        let page = req
            .extensions()
            .get::<RouteParams>()
            .and_then(|p| p.get("page"))
            .unwrap_or("index")
            .to_string();
        let count = self.visits.0.fetch_add(1, Ordering::Relaxed) + 1;
        Box::pin(async move {
            Ok(Json(serde_json::json!({ "page": page, "visits": count })).into_response())
        })
    }
}

fn greet(args: &[String]) -> anyhow::Result<i32> {
    let name = args.first().map(String::as_str).unwrap_or("world");
    println!("Hello, {name}!");
    Ok(0)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut builder = Application::builder();
    ComponentBuilder::new()
        .with_command_component(&mut builder)
        .with_route_component(&mut builder);

    builder
        .with_bootstrapper(|container| {
            container.bind_instance(Arc::new(Visits::default()));
            container.bind_factory(DependencyLifetime::Transient, |c: &Container| {
                Ok(Arc::new(VisitHandler {
                    visits: c.resolve::<Visits>()?,
                }))
            });
            Ok(())
        })
        .with_commands(|commands| {
            commands.register_command(
                Command::new("greet", "Print a greeting")?.with_help_text("greet [name]"),
                greet,
            );
            Ok(())
        })
        .with_routes(|routes| {
            routes
                .get("/")
                .to_handler(handler_fn(|_req| async { "Hello, tessel!" }));
            routes.group("/pages", |pages| {
                pages.get("/{page}").named("page").to::<VisitHandler>();
            });
            Ok(())
        });

    let app = builder.build()?;
    let names: Vec<String> = app
        .commands()?
        .read()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    tracing::info!(commands = ?names, "registered console commands");

    app.run().await
}
