use super::route::RouteTable;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock};

type RouteProducer = Arc<dyn Fn() -> anyhow::Result<RouteTable> + Send + Sync>;

/// 延迟构建路由表的工厂
///
/// 持有一组无参的生产者，直到第一次调用 [`create_routes`](Self::create_routes)
/// 才依次执行它们、合并并校验结果。成功后路由表被缓存，生产者不会再次执行。
///
/// 生产者执行时不持有生产者列表的锁，因此可以调用 [`add_factory`](Self::add_factory)，
/// 但这样追加的生产者不参与本轮生成。生产者内部不能调用 `create_routes`。
#[derive(Default)]
pub struct LazyRouteFactory {
    producers: Mutex<Vec<RouteProducer>>,
    // 串行化首次生成，保证并发的首次调用只执行一轮生产者
    materializing: Mutex<()>,
    routes: OnceLock<Arc<RouteTable>>,
}

impl LazyRouteFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个生产者
    pub fn add_factory<F>(&self, producer: F)
    where
        F: Fn() -> anyhow::Result<RouteTable> + Send + Sync + 'static,
    {
        let mut producers = self.producers.lock();
        if self.routes.get().is_some() {
            tracing::warn!("route table already materialized, new route producer will never run");
        }
        producers.push(Arc::new(producer));
    }

    pub fn producer_count(&self) -> usize {
        self.producers.lock().len()
    }

    /// 路由表是否已经生成
    pub fn is_materialized(&self) -> bool {
        self.routes.get().is_some()
    }

    /// 生成（或返回缓存的）路由表
    ///
    /// 任一生产者失败，或合并后的路由表存在重名、模板冲突时返回错误，不缓存任何结果
    pub fn create_routes(&self) -> anyhow::Result<Arc<RouteTable>> {
        if let Some(routes) = self.routes.get() {
            return Ok(routes.clone());
        }
        let _guard = self.materializing.lock();
        if let Some(routes) = self.routes.get() {
            return Ok(routes.clone());
        }
        let producers: Vec<RouteProducer> = self.producers.lock().clone();
        let mut table = RouteTable::default();
        for producer in &producers {
            table.extend(producer()?);
        }
        table.validate()?;
        tracing::info!(
            routes = table.len(),
            producers = producers.len(),
            "route table materialized"
        );
        Ok(self.routes.get_or_init(|| Arc::new(table)).clone())
    }
}

impl fmt::Debug for LazyRouteFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRouteFactory")
            .field("producers", &self.producer_count())
            .field("materialized", &self.is_materialized())
            .finish()
    }
}
