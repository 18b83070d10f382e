//! FlowGraph - 内存图模型与网络流算法库
//!
//! 以句柄引用的顶点/边模型为核心，提供：
//! - 有向与无向边混合的属性图容器
//! - 广度优先遍历与最短路径（Dijkstra / Bellman-Ford 含负环检测）
//! - 残量图构造、Edmonds-Karp 最大流
//! - 最小费用流（消圈法与连续最短路法）

pub mod algorithm;
pub mod error;
pub mod graph;
pub mod types;

// 重导出常用类型
pub use algorithm::{
    BellmanFord, BreadthFirst, Dijkstra, EdmondsKarp, MaxFlow, MinCostFlow, MinCostFlowResult,
    ResidualBuilder, ResidualGraph,
};
pub use error::{Error, Result};
pub use graph::{Cycle, Edge, EdgeId, EdgeKind, Graph, Vertex, VertexId, Walk};
pub use types::{PropertyValue, EPSILON};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
