//! 最小费用流
//!
//! 两种解法, 均要求输入余额平衡 (供给与需求之和为零):
//! - 消圈法: 先经超级源汇与 Edmonds-Karp 求可行流, 再反复消去
//!   残量图中的负费用环, 直至不存在为止 (负环最优性定理)。
//! - 连续最短路法: 按权重符号初始化流量, 反复沿 Bellman-Ford
//!   最便宜路径把剩余供给推向剩余需求。

use super::max_flow::{push_along, EdmondsKarp, DEFAULT_ITERATION_LIMIT};
use super::residual::ResidualBuilder;
use super::shortest_path::BellmanFord;
use crate::error::{Error, Result};
use crate::graph::{EdgeId, Graph, VertexId};
use crate::types::EPSILON;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 最小费用流结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinCostFlowResult {
    /// 总费用 = Σ 流量 × 权重
    pub cost: f64,
    /// 流量分配 (原图边 -> 流量)
    pub flow: HashMap<EdgeId, f64>,
}

impl MinCostFlowResult {
    /// 将流量分配写回图中
    pub fn apply_to(&self, graph: &Graph) -> Result<()> {
        for (&edge, &flow) in &self.flow {
            graph.set_flow(edge, Some(flow))?;
        }
        Ok(())
    }
}

/// 最小费用流算法
pub struct MinCostFlow {
    graph: Arc<Graph>,
    iteration_limit: usize,
}

impl MinCostFlow {
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

    /// 消圈法求最小费用流
    pub fn cycle_canceling(&self) -> Result<MinCostFlowResult> {
        let total_supply = self.check_balanced()?;

        let work = self.graph.clone_network();
        for edge in work.edges().iter() {
            work.set_flow(edge.id(), Some(0.0))?;
        }

        // 可行流: 超级源/汇连接所有供给与需求顶点, 容量为 |余额|
        let feasibility = work.clone_network();
        let super_source = feasibility.add_vertex();
        let super_sink = feasibility.add_vertex();
        for vertex in self.graph.vertices().iter() {
            let balance = vertex.balance();
            if balance > EPSILON {
                let e = feasibility.add_edge_directed(super_source, vertex.id())?;
                feasibility.set_capacity(e, Some(balance))?;
                feasibility.set_weight(e, Some(0.0))?;
            } else if balance < -EPSILON {
                let e = feasibility.add_edge_directed(vertex.id(), super_sink)?;
                feasibility.set_capacity(e, Some(-balance))?;
                feasibility.set_weight(e, Some(0.0))?;
            }
        }

        let feasible = EdmondsKarp::new(feasibility.clone())
            .with_iteration_limit(self.iteration_limit)
            .run(super_source, super_sink)?;
        if feasible.value < total_supply - EPSILON {
            return Err(Error::InsufficientCapacity);
        }

        // 去掉超级顶点, 把可行流写回工作图
        for (&edge, &flow) in &feasible.flow {
            if work.contains_edge(edge) {
                work.set_flow(edge, Some(flow))?;
            }
        }

        // 消圈: 只要残量图还有负费用环, 沿环推满瓶颈流量
        let builder = ResidualBuilder::new();
        let mut rounds = 0usize;
        loop {
            rounds += 1;
            if rounds > self.iteration_limit {
                return Err(Error::IterationLimitExceeded(self.iteration_limit));
            }

            let residual = builder.build(&work)?;
            let Some(cycle) = BellmanFord::new(residual.graph().clone()).negative_cycle()? else {
                break;
            };
            let bottleneck = cycle.bottleneck_capacity(residual.graph())?;
            if bottleneck <= EPSILON {
                break;
            }
            debug!(round = rounds, bottleneck, cycle = %cycle, "消去负费用环");
            push_along(&work, &residual, cycle.walk(), bottleneck)?;
        }

        Ok(collect_result(&work))
    }

    /// 连续最短路法求最小费用流
    pub fn successive_shortest_paths(&self) -> Result<MinCostFlowResult> {
        self.check_balanced()?;

        let work = self.graph.clone_network();
        // 初始化: 负权边满载, 其余为零流
        for edge in work.edges().iter() {
            let flow = if edge.weight_or(1.0) < -EPSILON {
                edge.capacity().ok_or(Error::CapacityNotSet(edge.id()))?
            } else {
                0.0
            };
            work.set_flow(edge.id(), Some(flow))?;
        }

        let builder = ResidualBuilder::new();
        let mut rounds = 0usize;
        loop {
            rounds += 1;
            if rounds > self.iteration_limit {
                return Err(Error::IterationLimitExceeded(self.iteration_limit));
            }

            // 剩余超额: 正为尚未送出的供给, 负为尚未满足的需求
            let vertices = work.vertices();
            let supply = vertices
                .iter()
                .map(|v| (v.id(), v.balance() - work.net_outflow(v.id())))
                .find(|&(_, excess)| excess > EPSILON);
            let Some((supply_id, supply_excess)) = supply else {
                // 供给耗尽; 余额平衡保证需求同时耗尽
                break;
            };

            let residual = builder.build(&work)?;
            let tree = BellmanFord::new(residual.graph().clone()).run(supply_id)?;

            // 可达的需求顶点中取路径最便宜者
            let mut best: Option<(VertexId, f64, f64)> = None;
            for vertex in vertices.iter() {
                let deficit = work.net_outflow(vertex.id()) - vertex.balance();
                if deficit > EPSILON {
                    if let Some(d) = tree.distance(vertex.id()) {
                        if best.map_or(true, |(_, _, bd)| d < bd) {
                            best = Some((vertex.id(), deficit, d));
                        }
                    }
                }
            }
            let Some((demand_id, deficit, _)) = best else {
                // 供给仍有剩余却无可达需求
                return Err(Error::InsufficientCapacity);
            };

            let walk = tree.walk_to(demand_id)?;
            let bottleneck = walk.bottleneck_capacity(residual.graph())?;
            let amount = supply_excess.min(deficit).min(bottleneck);
            if amount <= EPSILON {
                return Err(Error::InsufficientCapacity);
            }
            debug!(
                round = rounds,
                supply = %supply_id,
                demand = %demand_id,
                amount,
                "沿最便宜路径推流"
            );
            push_along(&work, &residual, &walk, amount)?;
        }

        Ok(collect_result(&work))
    }

    /// 余额平衡校验, 在任何计算开始之前执行。
    /// 返回正余额之和 (总供给量)。
    fn check_balanced(&self) -> Result<f64> {
        let total = self.graph.total_balance();
        if total.abs() > EPSILON {
            return Err(Error::NotBalanced(total));
        }
        Ok(self
            .graph
            .vertices()
            .iter()
            .map(|v| v.balance().max(0.0))
            .sum())
    }
}

/// 汇总工作图上的流量分配与总费用
fn collect_result(work: &Graph) -> MinCostFlowResult {
    let mut cost = 0.0;
    let mut flow = HashMap::new();
    for edge in work.edges().iter() {
        let f = edge.flow().unwrap_or(0.0);
        cost += f * edge.weight_or(1.0);
        flow.insert(edge.id(), f);
    }
    MinCostFlowResult { cost, flow }
}
