//! 边定义
//!
//! 边分为有向边和无向边两个封闭变体, 共享权重 / 容量 / 流量
//! 三个可空数值属性。不变式 `flow <= capacity` 在设置任一字段时
//! 立即校验, 违反即报错, 不会出现部分生效的状态。

use crate::error::{Error, Result};
use crate::graph::vertex::VertexId;
use crate::types::{PropertyValue, EPSILON};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 边 ID (图内唯一, 单调分配, 不会复用)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// 边的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// 有向边: src -> dst
    Directed,
    /// 无向边: 两端对称
    Undirected,
}

/// 边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// 边 ID
    id: EdgeId,
    /// 边的种类
    kind: EdgeKind,
    /// 源顶点 (无向边为存储顺序的第一个端点)
    src: VertexId,
    /// 目标顶点 (无向边为存储顺序的第二个端点)
    dst: VertexId,
    /// 权重 (可空, 任意实数)
    weight: Option<f64>,
    /// 容量 (可空表示无上界, 非负)
    capacity: Option<f64>,
    /// 流量 (可空)
    flow: Option<f64>,
    /// 属性
    properties: HashMap<String, PropertyValue>,
}

impl Edge {
    /// 创建有向边 (仅供 Graph 工厂使用)
    pub(crate) fn new_directed(id: EdgeId, src: VertexId, dst: VertexId) -> Self {
        Self::new(id, EdgeKind::Directed, src, dst)
    }

    /// 创建无向边 (仅供 Graph 工厂使用)
    pub(crate) fn new_undirected(id: EdgeId, a: VertexId, b: VertexId) -> Self {
        Self::new(id, EdgeKind::Undirected, a, b)
    }

    fn new(id: EdgeId, kind: EdgeKind, src: VertexId, dst: VertexId) -> Self {
        Self {
            id,
            kind,
            src,
            dst,
            weight: None,
            capacity: None,
            flow: None,
            properties: HashMap::new(),
        }
    }

    /// 获取边 ID
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// 获取边的种类
    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind == EdgeKind::Directed
    }

    pub fn is_undirected(&self) -> bool {
        self.kind == EdgeKind::Undirected
    }

    /// 获取源顶点 ID (无向边返回存储顺序的第一个端点)
    pub fn src(&self) -> VertexId {
        self.src
    }

    /// 获取目标顶点 ID (无向边返回存储顺序的第二个端点)
    pub fn dst(&self) -> VertexId {
        self.dst
    }

    /// 获取两个端点
    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.src, self.dst)
    }

    /// 给定一个端点, 返回另一个端点; 给定顶点不是端点时返回 None。
    /// 自环返回同一顶点。
    pub fn other_endpoint(&self, v: VertexId) -> Option<VertexId> {
        if v == self.src {
            Some(self.dst)
        } else if v == self.dst {
            Some(self.src)
        } else {
            None
        }
    }

    /// 是否连接 from -> to (有向边区分方向, 无向边对称)
    pub fn connects(&self, from: VertexId, to: VertexId) -> bool {
        match self.kind {
            EdgeKind::Directed => self.src == from && self.dst == to,
            EdgeKind::Undirected => {
                (self.src == from && self.dst == to) || (self.src == to && self.dst == from)
            }
        }
    }

    /// 是否以给定顶点为端点
    pub fn is_incident(&self, v: VertexId) -> bool {
        self.src == v || self.dst == v
    }

    /// 是否为自环
    pub fn is_loop(&self) -> bool {
        self.src == self.dst
    }

    // ==================== 数值属性 ====================

    /// 获取权重
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// 获取权重, 未设置时使用默认值
    pub fn weight_or(&self, default: f64) -> f64 {
        self.weight.unwrap_or(default)
    }

    /// 设置权重 (任意实数)
    pub fn set_weight(&mut self, weight: Option<f64>) {
        self.weight = weight;
    }

    /// 获取容量 (None 表示无上界)
    pub fn capacity(&self) -> Option<f64> {
        self.capacity
    }

    /// 设置容量, 必须非负且不小于已设置的流量
    pub fn set_capacity(&mut self, capacity: Option<f64>) -> Result<()> {
        if let Some(c) = capacity {
            if c < 0.0 {
                return Err(Error::NegativeCapacity(self.id, c));
            }
            if let Some(f) = self.flow {
                if f > c + EPSILON {
                    return Err(Error::FlowExceedsCapacity(self.id, f, c));
                }
            }
        }
        self.capacity = capacity;
        Ok(())
    }

    /// 获取流量
    pub fn flow(&self) -> Option<f64> {
        self.flow
    }

    /// 设置流量, 不得超过已设置的容量
    pub fn set_flow(&mut self, flow: Option<f64>) -> Result<()> {
        if let (Some(f), Some(c)) = (flow, self.capacity) {
            if f > c + EPSILON {
                return Err(Error::FlowExceedsCapacity(self.id, f, c));
            }
        }
        self.flow = flow;
        Ok(())
    }

    /// 剩余容量 = 容量 - 流量, 两者都必须已设置
    pub fn residual_capacity(&self) -> Result<f64> {
        let capacity = self.capacity.ok_or(Error::CapacityNotSet(self.id))?;
        let flow = self.flow.ok_or(Error::FlowNotSet(self.id))?;
        Ok(capacity - flow)
    }

    // ==================== 通用属性 ====================

    /// 获取属性
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// 设置属性
    pub fn set_property(&mut self, key: String, value: PropertyValue) {
        self.properties.insert(key, value);
    }

    /// 移除属性
    pub fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.remove(key)
    }

    /// 获取所有属性
    pub fn properties(&self) -> &HashMap<String, PropertyValue> {
        &self.properties
    }
}
