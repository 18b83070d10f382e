//! 图核心模块
//!
//! 定义顶点、边、图容器、元素集合与路径的核心数据结构

mod edge;
mod graph;
mod index;
mod set;
mod vertex;
mod walk;

pub use edge::{Edge, EdgeId, EdgeKind};
pub use graph::Graph;
pub use index::EdgeIndex;
pub use set::{EdgeSet, VertexSet};
pub use vertex::{Vertex, VertexId};
pub use walk::{Cycle, Walk};
