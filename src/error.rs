//! 错误类型定义

use crate::graph::{Cycle, EdgeId, VertexId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("顶点不存在: {0}")]
    VertexNotFound(VertexId),

    #[error("边不存在: {0}")]
    EdgeNotFound(EdgeId),

    #[error("无效的路径: {0}")]
    InvalidWalk(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("不支持负权重: 边 {0} 权重为 {1}, 请使用 Bellman-Ford")]
    NegativeWeight(EdgeId, f64),

    #[error("边 {0} 不是有向边")]
    UndirectedEdge(EdgeId),

    #[error("边 {0} 未设置流量")]
    FlowNotSet(EdgeId),

    #[error("边 {0} 未设置容量")]
    CapacityNotSet(EdgeId),

    #[error("容量不能为负: 边 {0} 容量为 {1}")]
    NegativeCapacity(EdgeId, f64),

    #[error("流量超过容量: 边 {0} 流量 {1}, 容量 {2}")]
    FlowExceedsCapacity(EdgeId, f64, f64),

    #[error("顶点余额不平衡: 总和为 {0}")]
    NotBalanced(f64),

    #[error("容量不足, 无法满足流量需求")]
    InsufficientCapacity,

    #[error("检测到负权环: {0}")]
    NegativeCycle(Cycle),

    #[error("迭代次数超过上限: {0}")]
    IterationLimitExceeded(usize),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl Error {
    /// 取出负权环 (仅当错误为 NegativeCycle 时)
    pub fn into_negative_cycle(self) -> Option<Cycle> {
        match self {
            Error::NegativeCycle(cycle) => Some(cycle),
            _ => None,
        }
    }
}
