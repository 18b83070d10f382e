//! 最大流算法
//!
//! Edmonds-Karp: 反复在残量图上做广度优先搜索, 沿最少跳数的
//! 增广路径推满瓶颈流量。必须使用最短增广路径, 这是迭代次数
//! 多项式有界的前提, 不能退化为"任意路径"。

use super::residual::{ResidualBuilder, ResidualDirection, ResidualGraph};
use super::traversal::BreadthFirst;
use crate::error::{Error, Result};
use crate::graph::{EdgeId, Graph, VertexId, Walk};
use crate::types::EPSILON;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// 默认迭代上限, 防御畸形或数值漂移的输入
pub const DEFAULT_ITERATION_LIMIT: usize = 100_000;

/// 最大流结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxFlow {
    /// 最大流量值
    pub value: f64,
    /// 流量分配 (原图边 -> 流量)
    pub flow: HashMap<EdgeId, f64>,
    /// 最小割的源侧顶点集 (最终残量图上从源点可达的顶点)
    pub source_side: HashSet<VertexId>,
}

impl MaxFlow {
    /// 将流量分配写回图中
    pub fn apply_to(&self, graph: &Graph) -> Result<()> {
        for (&edge, &flow) in &self.flow {
            graph.set_flow(edge, Some(flow))?;
        }
        Ok(())
    }
}

/// Edmonds-Karp 最大流算法
pub struct EdmondsKarp {
    graph: Arc<Graph>,
    iteration_limit: usize,
}

impl EdmondsKarp {
    /// 创建算法实例
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            iteration_limit: DEFAULT_ITERATION_LIMIT,
        }
    }

    /// 设置迭代上限
    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = limit;
        self
    }

    /// 计算从 source 到 sink 的最大流。
    /// 在克隆上工作, 原图不被修改; 结果可按需 `apply_to` 写回。
    /// source == sink 或不存在增广路径时流量为 0。
    pub fn run(&self, source: VertexId, sink: VertexId) -> Result<MaxFlow> {
        if !self.graph.contains_vertex(source) {
            return Err(Error::VertexNotFound(source));
        }
        if !self.graph.contains_vertex(sink) {
            return Err(Error::VertexNotFound(sink));
        }

        let work = self.graph.clone_network();
        // 从零流开始
        for edge in work.edges().iter() {
            work.set_flow(edge.id(), Some(0.0))?;
        }

        if source == sink {
            return Ok(MaxFlow {
                value: 0.0,
                flow: collect_flow(&work),
                source_side: HashSet::from([source]),
            });
        }

        let builder = ResidualBuilder::new();
        let mut value = 0.0;
        let mut rounds = 0usize;

        let residual = loop {
            rounds += 1;
            if rounds > self.iteration_limit {
                return Err(Error::IterationLimitExceeded(self.iteration_limit));
            }

            let residual = builder.build(&work)?;
            let tree = BreadthFirst::new(residual.graph().clone()).run(source)?;
            if !tree.is_reached(sink) {
                // 汇点不可达, 当前流即最大流
                break residual;
            }

            let walk = tree.walk_to(sink)?;
            let bottleneck = walk.bottleneck_capacity(residual.graph())?;
            if bottleneck <= EPSILON {
                break residual;
            }

            debug!(round = rounds, bottleneck, path = %walk, "推流");
            push_along(&work, &residual, &walk, bottleneck)?;
            value += bottleneck;
        };

        // 最终残量图上源点可达的顶点构成最小割的源侧
        let tree = BreadthFirst::new(residual.graph().clone()).run(source)?;
        let source_side: HashSet<VertexId> = tree.reached().iter().copied().collect();

        Ok(MaxFlow {
            value,
            flow: collect_flow(&work),
            source_side,
        })
    }
}

/// 沿残量路径推送 amount 的流量: 同向残量边对应原边加流,
/// 反向残量边对应原边减流。
pub(crate) fn push_along(
    work: &Graph,
    residual: &ResidualGraph,
    walk: &Walk,
    amount: f64,
) -> Result<()> {
    for &re in walk.edges() {
        let (orig, direction) = residual
            .origin(re)
            .ok_or_else(|| Error::InternalError(format!("残量边 {} 没有原边映射", re)))?;
        let current = work
            .get_edge(orig)
            .ok_or(Error::EdgeNotFound(orig))?
            .flow()
            .unwrap_or(0.0);
        let next = match direction {
            ResidualDirection::Forward => current + amount,
            ResidualDirection::Backward => current - amount,
        };
        work.set_flow(orig, Some(next))?;
    }
    Ok(())
}

/// 收集图中全部边的流量分配
fn collect_flow(work: &Graph) -> HashMap<EdgeId, f64> {
    work.edges()
        .iter()
        .map(|e| (e.id(), e.flow().unwrap_or(0.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity_edge(graph: &Graph, src: VertexId, dst: VertexId, capacity: f64) -> EdgeId {
        let e = graph.add_edge_directed(src, dst).unwrap();
        graph.set_capacity(e, Some(capacity)).unwrap();
        e
    }

    /// 经典场景: s->a(10), s->b(5), a->t(5), a->b(15), b->t(10)
    fn scenario() -> (Arc<Graph>, VertexId, VertexId) {
        let graph = Graph::new();
        let s = graph.add_vertex();
        let a = graph.add_vertex();
        let b = graph.add_vertex();
        let t = graph.add_vertex();
        capacity_edge(&graph, s, a, 10.0);
        capacity_edge(&graph, s, b, 5.0);
        capacity_edge(&graph, a, t, 5.0);
        capacity_edge(&graph, a, b, 15.0);
        capacity_edge(&graph, b, t, 10.0);
        (graph, s, t)
    }

    #[test]
    fn test_max_flow_scenario_matches_min_cut() {
        let (graph, s, t) = scenario();
        let result = EdmondsKarp::new(graph).run(s, t).unwrap();
        // 最小割 {s,a,b}: a->t(5) + b->t(10) = 15
        assert!((result.value - 15.0).abs() < EPSILON);
    }

    #[test]
    fn test_max_flow_respects_capacities_and_conserves() {
        let (graph, s, t) = scenario();
        let result = EdmondsKarp::new(graph.clone()).run(s, t).unwrap();
        result.apply_to(&graph).unwrap();

        // flow <= capacity 处处成立
        for edge in graph.edges().iter() {
            let f = edge.flow().unwrap();
            assert!(f >= -EPSILON);
            assert!(f <= edge.capacity().unwrap() + EPSILON);
        }
        // 源点流出 == 汇点流入 == 最大流值
        assert!((graph.net_outflow(s) - result.value).abs() < EPSILON);
        assert!((graph.net_outflow(t) + result.value).abs() < EPSILON);
        // 中间顶点守恒
        for v in graph.vertices().ids() {
            if v != s && v != t {
                assert!(graph.net_outflow(v).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_max_flow_not_exceeding_cuts() {
        let (graph, s, t) = scenario();
        let result = EdmondsKarp::new(graph.clone()).run(s, t).unwrap();

        // 任何 s-t 割的容量都不小于最大流; 验证几个手工割
        // 割 {s}: s->a + s->b = 15
        // 割 {s,a}: s->b + a->t + a->b = 25
        // 割 {s,b}: s->a + b->t = 20
        // 割 {s,a,b}: a->t + b->t = 15
        for cut_capacity in [15.0, 25.0, 20.0, 15.0] {
            assert!(result.value <= cut_capacity + EPSILON);
        }

        // 最小割源侧与汇点分离
        assert!(result.source_side.contains(&s));
        assert!(!result.source_side.contains(&t));
    }

    #[test]
    fn test_max_flow_with_cross_edge() {
        //   s -> a (10), s -> b (5), a -> b (5), a -> t (5), b -> t (10)
        let graph = Graph::new();
        let s = graph.add_vertex();
        let a = graph.add_vertex();
        let b = graph.add_vertex();
        let t = graph.add_vertex();
        capacity_edge(&graph, s, a, 10.0);
        capacity_edge(&graph, s, b, 5.0);
        capacity_edge(&graph, a, b, 5.0);
        capacity_edge(&graph, a, t, 5.0);
        capacity_edge(&graph, b, t, 10.0);

        let result = EdmondsKarp::new(graph).run(s, t).unwrap();
        assert!((result.value - 15.0).abs() < EPSILON);
    }

    #[test]
    fn test_max_flow_degenerate() {
        let (graph, s, t) = scenario();

        // source == sink
        let result = EdmondsKarp::new(graph.clone()).run(s, s).unwrap();
        assert_eq!(result.value, 0.0);

        // 无路径
        let isolated = graph.add_vertex();
        let result = EdmondsKarp::new(graph).run(isolated, t).unwrap();
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn test_max_flow_leaves_input_untouched() {
        let (graph, s, t) = scenario();
        EdmondsKarp::new(graph.clone()).run(s, t).unwrap();

        // 未显式 apply_to, 原图流量保持未设置
        for edge in graph.edges().iter() {
            assert_eq!(edge.flow(), None);
        }
    }

    #[test]
    fn test_max_flow_missing_vertex_fails() {
        let (graph, s, _) = scenario();
        let err = EdmondsKarp::new(graph).run(s, VertexId::new(99)).unwrap_err();
        assert!(matches!(err, Error::VertexNotFound(_)));
    }
}
