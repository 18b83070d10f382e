//! 路径与环
//!
//! Walk 是顶点与边交替的序列: v0, e1, v1, ..., en, vn, 其中 ei
//! 连接 v(i-1) 与 vi, 顶点数始终等于边数加一。Walk 只持有句柄,
//! 被引用的元素之后若被销毁, 可用 `is_valid` 检测失效。
//!
//! Cycle 是首尾顶点相同且至少含一条边的 Walk。

use super::edge::EdgeId;
use super::graph::Graph;
use super::vertex::VertexId;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 路径
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walk {
    /// 顶点序列 (长度 = 边数 + 1)
    vertices: Vec<VertexId>,
    /// 边序列
    edges: Vec<EdgeId>,
}

impl Walk {
    /// 从起点开始的平凡路径 (零条边)
    pub fn start(v: VertexId) -> Self {
        Self {
            vertices: vec![v],
            edges: Vec::new(),
        }
    }

    /// 追加一步: 经过 edge 到达 to
    pub fn push_step(&mut self, edge: EdgeId, to: VertexId) {
        self.edges.push(edge);
        self.vertices.push(to);
    }

    /// 从顶点与边序列构造, 并对照图校验连接关系
    /// (每条边必须连接相邻顶点对, 有向边方向必须一致)。
    pub fn from_parts(vertices: Vec<VertexId>, edges: Vec<EdgeId>, graph: &Graph) -> Result<Self> {
        if vertices.is_empty() {
            return Err(Error::InvalidWalk("顶点序列不能为空".to_string()));
        }
        if vertices.len() != edges.len() + 1 {
            return Err(Error::InvalidWalk(format!(
                "顶点数 {} 与边数 {} 不匹配",
                vertices.len(),
                edges.len()
            )));
        }

        for (i, &edge_id) in edges.iter().enumerate() {
            let edge = graph.get_edge(edge_id).ok_or(Error::EdgeNotFound(edge_id))?;
            if !edge.connects(vertices[i], vertices[i + 1]) {
                return Err(Error::InvalidWalk(format!(
                    "边 {} 不连接 {} -> {}",
                    edge_id,
                    vertices[i],
                    vertices[i + 1]
                )));
            }
        }

        Ok(Self { vertices, edges })
    }

    /// 起点
    pub fn first_vertex(&self) -> VertexId {
        self.vertices[0]
    }

    /// 终点
    pub fn last_vertex(&self) -> VertexId {
        *self.vertices.last().expect("路径至少包含一个顶点")
    }

    /// 顶点序列
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// 边序列
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// 边数
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// 是否为零边的平凡路径
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// 首尾顶点是否相同
    pub fn is_closed(&self) -> bool {
        self.first_vertex() == self.last_vertex()
    }

    /// 所有被引用的元素是否仍存在于图中
    pub fn is_valid(&self, graph: &Graph) -> bool {
        self.vertices.iter().all(|&v| graph.contains_vertex(v))
            && self.edges.iter().all(|&e| graph.contains_edge(e))
    }

    /// 路径总权重 (未设置权重的边按 1 计)
    pub fn total_weight(&self, graph: &Graph) -> Result<f64> {
        let mut total = 0.0;
        for &edge_id in &self.edges {
            let edge = graph.get_edge(edge_id).ok_or(Error::EdgeNotFound(edge_id))?;
            total += edge.weight_or(1.0);
        }
        Ok(total)
    }

    /// 路径瓶颈 = 沿途边容量的最小值 (容量必须全部已设置)
    pub fn bottleneck_capacity(&self, graph: &Graph) -> Result<f64> {
        let mut bottleneck = f64::INFINITY;
        for &edge_id in &self.edges {
            let edge = graph.get_edge(edge_id).ok_or(Error::EdgeNotFound(edge_id))?;
            let capacity = edge.capacity().ok_or(Error::CapacityNotSet(edge_id))?;
            bottleneck = bottleneck.min(capacity);
        }
        Ok(bottleneck)
    }
}

impl fmt::Display for Walk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.vertices.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join(" -> "))
    }
}

/// 环: 首尾相同且至少含一条边的路径
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle(Walk);

impl Cycle {
    /// 由闭合路径构造; 路径不闭合或不含边时报错
    pub fn new(walk: Walk) -> Result<Self> {
        if walk.is_trivial() {
            return Err(Error::InvalidWalk("环至少需要一条边".to_string()));
        }
        if !walk.is_closed() {
            return Err(Error::InvalidWalk(format!(
                "路径不闭合: {} != {}",
                walk.first_vertex(),
                walk.last_vertex()
            )));
        }
        Ok(Self(walk))
    }

    /// 底层路径
    pub fn walk(&self) -> &Walk {
        &self.0
    }

    /// 环上的边序列
    pub fn edges(&self) -> &[EdgeId] {
        self.0.edges()
    }

    /// 环上的边数
    pub fn edge_count(&self) -> usize {
        self.0.edge_count()
    }

    /// 环的总权重 (负权环为负)
    pub fn total_weight(&self, graph: &Graph) -> Result<f64> {
        self.0.total_weight(graph)
    }

    /// 环的瓶颈容量
    pub fn bottleneck_capacity(&self, graph: &Graph) -> Result<f64> {
        self.0.bottleneck_capacity(graph)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
