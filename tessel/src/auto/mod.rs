use crate::app::ApplicationBuilder;

/// 编译期登记的模块
///
/// ```rust,ignore
/// fn register(builder: &mut ApplicationBuilder) {
///     builder.with_routes(|routes| {
///         routes.get("/ping").to_handler(handler_fn(|_req| async { "pong" }));
///         Ok(())
///     });
/// }
///
/// tessel::inventory::submit! {
///     tessel::auto::ModuleFlag { name: "ping", register }
/// }
/// ```
pub struct ModuleFlag {
    pub name: &'static str,
    pub register: fn(&mut ApplicationBuilder),
}

inventory::collect!(ModuleFlag);
