//! 残量图构造
//!
//! 把带流量的图转换为结构独立的派生图: 每条剩余容量为正的边
//! 生成一条同向残量边, 每条流量为正的边生成一条端点互换、权重
//! 取负的反向残量边。残量容量存放在派生边的 capacity 字段,
//! 费用存放在 weight 字段。最大流与最小费用流共享该构造。

use crate::error::{Error, Result};
use crate::graph::{EdgeId, Graph, VertexId};
use crate::types::EPSILON;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// 残量边相对原边的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResidualDirection {
    /// 同向: 容量 = capacity - flow
    Forward,
    /// 反向: 容量 = flow, 权重取负
    Backward,
}

/// 残量图构造器
#[derive(Debug, Clone, Default)]
pub struct ResidualBuilder {
    /// 为真时, 剩余容量为零的边也生成同向残量边
    keep_zero_edges: bool,
    /// 为真时, 合并同一有序顶点对之间的平行残量边 (容量求和)。
    /// 仅当费用无关或相同才是安全的; 默认关闭。
    merge_parallel: bool,
}

impl ResidualBuilder {
    /// 创建构造器 (默认不保留零容量边, 不合并平行边)
    pub fn new() -> Self {
        Self::default()
    }

    /// 保留零容量的同向残量边
    pub fn keep_zero_edges(mut self, keep: bool) -> Self {
        self.keep_zero_edges = keep;
        self
    }

    /// 合并平行残量边。合并后无法映射回原边, 只适合
    /// 可达性 / 流值类查询。
    pub fn merge_parallel(mut self, merge: bool) -> Self {
        self.merge_parallel = merge;
        self
    }

    /// 构造残量图。
    /// 前置条件逐字段校验: 每条边必须是有向边, 且流量与容量
    /// 均已设置; 违反立即失败, 不会跳过问题边。
    pub fn build(&self, graph: &Graph) -> Result<ResidualGraph> {
        let edges = graph.edges();
        for edge in edges.iter() {
            if edge.is_undirected() {
                return Err(Error::UndirectedEdge(edge.id()));
            }
            if edge.flow().is_none() {
                return Err(Error::FlowNotSet(edge.id()));
            }
            if edge.capacity().is_none() {
                return Err(Error::CapacityNotSet(edge.id()));
            }
        }

        // 顶点克隆进一张无边图, 句柄保持不变
        let residual = Graph::new();
        for vertex in graph.vertices().iter() {
            residual.insert_vertex(vertex.clone());
        }

        let mut forward_of: HashMap<EdgeId, EdgeId> = HashMap::new();
        let mut backward_of: HashMap<EdgeId, EdgeId> = HashMap::new();

        for edge in edges.iter() {
            let remaining = edge.residual_capacity()?;
            let flow = edge.flow().ok_or(Error::FlowNotSet(edge.id()))?;

            if remaining > EPSILON || self.keep_zero_edges {
                let re = residual.add_edge_directed(edge.src(), edge.dst())?;
                residual.set_capacity(re, Some(remaining.max(0.0)))?;
                residual.set_weight(re, edge.weight())?;
                forward_of.insert(re, edge.id());
            }
            if flow > EPSILON {
                let re = residual.add_edge_directed(edge.dst(), edge.src())?;
                residual.set_capacity(re, Some(flow))?;
                // 未设置的权重按 1 计, 反向边必须显式取负为 -1,
                // 留空会被费用计算再次按 +1 读取
                residual.set_weight(re, Some(-edge.weight_or(1.0)))?;
                backward_of.insert(re, edge.id());
            }
        }

        if self.merge_parallel {
            merge_parallel_edges(&residual, &mut forward_of, &mut backward_of)?;
        }

        trace!(
            vertices = residual.vertex_count(),
            edges = residual.edge_count(),
            "残量图构造完成"
        );

        Ok(ResidualGraph {
            graph: residual,
            forward_of,
            backward_of,
        })
    }
}

/// 合并同一有序顶点对之间的平行残量边: 保留首条, 容量求和。
/// 发生合并的边 (包括被保留的那条) 不再唯一对应原边, 一律从
/// 映射中移除; 未发生合并的边保留映射。
fn merge_parallel_edges(
    residual: &Graph,
    forward_of: &mut HashMap<EdgeId, EdgeId>,
    backward_of: &mut HashMap<EdgeId, EdgeId>,
) -> Result<()> {
    let mut kept: HashMap<(VertexId, VertexId), (EdgeId, f64, usize)> = HashMap::new();
    let mut doomed = Vec::new();

    for edge in residual.edges().iter() {
        let key = (edge.src(), edge.dst());
        let capacity = edge.capacity().unwrap_or(0.0);
        match kept.get_mut(&key) {
            Some((_, total, count)) => {
                *total += capacity;
                *count += 1;
                doomed.push(edge.id());
            }
            None => {
                kept.insert(key, (edge.id(), capacity, 1));
            }
        }
    }

    for (_, (id, total, count)) in kept {
        if count > 1 {
            residual.set_capacity(id, Some(total))?;
            forward_of.remove(&id);
            backward_of.remove(&id);
        }
    }
    for id in doomed {
        residual.remove_edge(id)?;
        forward_of.remove(&id);
        backward_of.remove(&id);
    }
    Ok(())
}

/// 残量图及其到原图的边映射
pub struct ResidualGraph {
    graph: Arc<Graph>,
    /// 同向残量边 -> 原边
    forward_of: HashMap<EdgeId, EdgeId>,
    /// 反向残量边 -> 原边
    backward_of: HashMap<EdgeId, EdgeId>,
}

impl fmt::Debug for ResidualGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResidualGraph")
            .field("vertices", &self.graph.vertex_count())
            .field("edges", &self.graph.edge_count())
            .field("forward_of", &self.forward_of)
            .field("backward_of", &self.backward_of)
            .finish()
    }
}

impl ResidualGraph {
    /// 派生出的残量图
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// 残量边对应的原边及相对方向
    pub fn origin(&self, edge: EdgeId) -> Option<(EdgeId, ResidualDirection)> {
        if let Some(&orig) = self.forward_of.get(&edge) {
            return Some((orig, ResidualDirection::Forward));
        }
        if let Some(&orig) = self.backward_of.get(&edge) {
            return Some((orig, ResidualDirection::Backward));
        }
        None
    }
}
