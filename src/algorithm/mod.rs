//! 图算法模块
//!
//! 包含广度优先遍历、最短路径、残量图构造、最大流与最小费用流。
//! 所有算法持有 `Arc<Graph>`, 在克隆图上计算, 结果按需写回。

mod max_flow;
mod min_cost_flow;
mod residual;
mod shortest_path;
mod traversal;

pub use max_flow::{EdmondsKarp, MaxFlow, DEFAULT_ITERATION_LIMIT};
pub use min_cost_flow::{MinCostFlow, MinCostFlowResult};
pub use residual::{ResidualBuilder, ResidualDirection, ResidualGraph};
pub use shortest_path::{BellmanFord, Dijkstra, ShortestPathTree};
pub use traversal::{BreadthFirst, Direction, TraversalTree};
