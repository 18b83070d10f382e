//! 图容器
//!
//! 图是顶点和边唯一的创建与销毁入口。元素通过句柄 (VertexId /
//! EdgeId) 引用, 句柄由图单调分配且不复用, 避免了顶点-边-图之间
//! 的引用环。销毁操作在所有被引用处一次性完成解除, 不会出现
//! 部分解除的中间状态。

use super::edge::{Edge, EdgeId, EdgeKind};
use super::index::EdgeIndex;
use super::set::{EdgeSet, VertexSet};
use super::vertex::{Vertex, VertexId};
use crate::error::{Error, Result};
use crate::types::PropertyValue;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 图
///
/// 元素以插入顺序存储, 因此 `vertices()` / `edges()` 返回的集合
/// 顺序是确定的。内部锁只为 `&self` 方法提供内部可变性, 核心
/// 假定单调用栈独占访问 (迭代期间不得并发修改)。
pub struct Graph {
    /// 顶点存储 (按创建顺序)
    vertices: RwLock<IndexMap<VertexId, Vertex>>,
    /// 边存储 (按创建顺序)
    edges: RwLock<IndexMap<EdgeId, Edge>>,
    /// 邻接索引
    edge_index: EdgeIndex,
    /// 下一个顶点 ID
    next_vertex_id: AtomicU64,
    /// 下一个边 ID
    next_edge_id: AtomicU64,
    /// 图级属性
    properties: RwLock<HashMap<String, PropertyValue>>,
}

impl Graph {
    /// 创建空图
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            vertices: RwLock::new(IndexMap::new()),
            edges: RwLock::new(IndexMap::new()),
            edge_index: EdgeIndex::new(),
            next_vertex_id: AtomicU64::new(1),
            next_edge_id: AtomicU64::new(1),
            properties: RwLock::new(HashMap::new()),
        })
    }

    // ==================== 顶点操作 ====================

    /// 创建顶点
    pub fn add_vertex(&self) -> VertexId {
        let id = VertexId::new(self.next_vertex_id.fetch_add(1, Ordering::SeqCst));
        self.vertices.write().insert(id, Vertex::new(id));
        id
    }

    /// 插入已有顶点 (克隆图时使用, 保持原 ID)
    pub(crate) fn insert_vertex(&self, vertex: Vertex) {
        let id = vertex.id();
        self.next_vertex_id
            .fetch_max(id.as_u64() + 1, Ordering::SeqCst);
        self.vertices.write().insert(id, vertex);
    }

    /// 获取顶点
    pub fn get_vertex(&self, id: VertexId) -> Option<Vertex> {
        self.vertices.read().get(&id).cloned()
    }

    /// 顶点是否存在
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.read().contains_key(&id)
    }

    /// 销毁顶点: 先销毁所有关联边, 再移除顶点本身。
    /// 重复销毁报 VertexNotFound。
    pub fn remove_vertex(&self, id: VertexId) -> Result<()> {
        if !self.contains_vertex(id) {
            return Err(Error::VertexNotFound(id));
        }

        let mut incident = self.edge_index.get_outgoing(id);
        incident.extend(self.edge_index.get_incoming(id));
        incident.sort_unstable();
        incident.dedup();

        for edge_id in incident {
            self.remove_edge(edge_id)?;
        }

        self.vertices.write().shift_remove(&id);
        Ok(())
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.vertices.read().len()
    }

    /// 获取所有顶点 (按创建顺序的快照)
    pub fn vertices(&self) -> VertexSet {
        VertexSet::new(self.vertices.read().values().cloned().collect())
    }

    /// 设置顶点余额
    pub fn set_balance(&self, id: VertexId, balance: f64) -> Result<()> {
        let mut vertices = self.vertices.write();
        let vertex = vertices.get_mut(&id).ok_or(Error::VertexNotFound(id))?;
        vertex.set_balance(balance);
        Ok(())
    }

    /// 获取顶点余额
    pub fn balance(&self, id: VertexId) -> Result<f64> {
        self.vertices
            .read()
            .get(&id)
            .map(|v| v.balance())
            .ok_or(Error::VertexNotFound(id))
    }

    /// 所有顶点余额之和
    pub fn total_balance(&self) -> f64 {
        self.vertices.read().values().map(|v| v.balance()).sum()
    }

    /// 设置顶点属性
    pub fn set_vertex_property(
        &self,
        id: VertexId,
        key: String,
        value: PropertyValue,
    ) -> Result<()> {
        let mut vertices = self.vertices.write();
        let vertex = vertices.get_mut(&id).ok_or(Error::VertexNotFound(id))?;
        vertex.set_property(key, value);
        Ok(())
    }

    // ==================== 边操作 ====================

    /// 创建有向边 src -> dst
    pub fn add_edge_directed(&self, src: VertexId, dst: VertexId) -> Result<EdgeId> {
        self.add_edge(EdgeKind::Directed, src, dst)
    }

    /// 创建无向边 a -- b
    pub fn add_edge_undirected(&self, a: VertexId, b: VertexId) -> Result<EdgeId> {
        self.add_edge(EdgeKind::Undirected, a, b)
    }

    fn add_edge(&self, kind: EdgeKind, src: VertexId, dst: VertexId) -> Result<EdgeId> {
        // 端点必须属于本图
        if !self.contains_vertex(src) {
            return Err(Error::VertexNotFound(src));
        }
        if !self.contains_vertex(dst) {
            return Err(Error::VertexNotFound(dst));
        }

        let id = EdgeId::new(self.next_edge_id.fetch_add(1, Ordering::SeqCst));
        let edge = match kind {
            EdgeKind::Directed => Edge::new_directed(id, src, dst),
            EdgeKind::Undirected => Edge::new_undirected(id, src, dst),
        };

        self.edge_index
            .add_edge(id, src, dst, kind == EdgeKind::Directed);
        self.edges.write().insert(id, edge);

        Ok(id)
    }

    /// 插入已有边 (克隆图时使用, 保持原 ID)
    pub(crate) fn insert_edge(&self, edge: Edge) {
        let id = edge.id();
        self.next_edge_id
            .fetch_max(id.as_u64() + 1, Ordering::SeqCst);
        self.edge_index
            .add_edge(id, edge.src(), edge.dst(), edge.is_directed());
        self.edges.write().insert(id, edge);
    }

    /// 获取边
    pub fn get_edge(&self, id: EdgeId) -> Option<Edge> {
        self.edges.read().get(&id).cloned()
    }

    /// 边是否存在
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.read().contains_key(&id)
    }

    /// 销毁边: 从索引和两个端点处解除。重复销毁报 EdgeNotFound。
    pub fn remove_edge(&self, id: EdgeId) -> Result<()> {
        if self.edges.write().shift_remove(&id).is_none() {
            return Err(Error::EdgeNotFound(id));
        }
        self.edge_index.remove(id);
        Ok(())
    }

    /// 获取边数量
    pub fn edge_count(&self) -> usize {
        self.edges.read().len()
    }

    /// 获取所有边 (按创建顺序的快照)
    pub fn edges(&self) -> EdgeSet {
        EdgeSet::new(self.edges.read().values().cloned().collect())
    }

    /// 设置边权重
    pub fn set_weight(&self, id: EdgeId, weight: Option<f64>) -> Result<()> {
        let mut edges = self.edges.write();
        let edge = edges.get_mut(&id).ok_or(Error::EdgeNotFound(id))?;
        edge.set_weight(weight);
        Ok(())
    }

    /// 设置边容量 (非负, 且不小于已设置的流量)
    pub fn set_capacity(&self, id: EdgeId, capacity: Option<f64>) -> Result<()> {
        let mut edges = self.edges.write();
        let edge = edges.get_mut(&id).ok_or(Error::EdgeNotFound(id))?;
        edge.set_capacity(capacity)
    }

    /// 设置边流量 (不得超过容量)
    pub fn set_flow(&self, id: EdgeId, flow: Option<f64>) -> Result<()> {
        let mut edges = self.edges.write();
        let edge = edges.get_mut(&id).ok_or(Error::EdgeNotFound(id))?;
        edge.set_flow(flow)
    }

    /// 设置边属性
    pub fn set_edge_property(&self, id: EdgeId, key: String, value: PropertyValue) -> Result<()> {
        let mut edges = self.edges.write();
        let edge = edges.get_mut(&id).ok_or(Error::EdgeNotFound(id))?;
        edge.set_property(key, value);
        Ok(())
    }

    // ==================== 邻接查询 ====================

    /// 获取顶点的出边 (无向边计入)
    pub fn outgoing_edges(&self, vertex_id: VertexId) -> Vec<Edge> {
        self.edge_index
            .get_outgoing(vertex_id)
            .iter()
            .filter_map(|&id| self.get_edge(id))
            .collect()
    }

    /// 获取顶点的入边 (无向边计入)
    pub fn incoming_edges(&self, vertex_id: VertexId) -> Vec<Edge> {
        self.edge_index
            .get_incoming(vertex_id)
            .iter()
            .filter_map(|&id| self.get_edge(id))
            .collect()
    }

    /// 获取顶点的所有关联边 (去重)
    pub fn incident_edges(&self, vertex_id: VertexId) -> Vec<Edge> {
        let mut ids = self.edge_index.get_outgoing(vertex_id);
        ids.extend(self.edge_index.get_incoming(vertex_id));
        ids.sort_unstable();
        ids.dedup();
        ids.iter().filter_map(|&id| self.get_edge(id)).collect()
    }

    /// 获取 src -> dst 方向上的所有边
    pub fn edges_between(&self, src: VertexId, dst: VertexId) -> EdgeSet {
        EdgeSet::new(
            self.edge_index
                .get_edges_between(src, dst)
                .iter()
                .filter_map(|&id| self.get_edge(id))
                .collect(),
        )
    }

    /// 获取邻居 (出边另一端的顶点)
    pub fn neighbors(&self, vertex_id: VertexId) -> Vec<VertexId> {
        self.edge_index.neighbors(vertex_id)
    }

    /// 获取前驱 (入边另一端的顶点)
    pub fn predecessors(&self, vertex_id: VertexId) -> Vec<VertexId> {
        self.edge_index.predecessors(vertex_id)
    }

    /// 获取顶点的出度
    pub fn out_degree(&self, vertex_id: VertexId) -> usize {
        self.edge_index.out_degree(vertex_id)
    }

    /// 获取顶点的入度
    pub fn in_degree(&self, vertex_id: VertexId) -> usize {
        self.edge_index.in_degree(vertex_id)
    }

    /// 顶点净流出量 = 出边流量之和 - 入边流量之和。
    /// 未设置流量的边按 0 计。仅对全有向图有意义。
    pub fn net_outflow(&self, vertex_id: VertexId) -> f64 {
        let out: f64 = self
            .outgoing_edges(vertex_id)
            .iter()
            .map(|e| e.flow().unwrap_or(0.0))
            .sum();
        let inn: f64 = self
            .incoming_edges(vertex_id)
            .iter()
            .map(|e| e.flow().unwrap_or(0.0))
            .sum();
        out - inn
    }

    // ==================== 图级属性 ====================

    /// 设置图属性
    pub fn set_property(&self, key: String, value: PropertyValue) {
        self.properties.write().insert(key, value);
    }

    /// 获取图属性
    pub fn property(&self, key: &str) -> Option<PropertyValue> {
        self.properties.read().get(key).cloned()
    }

    // ==================== 克隆 ====================

    /// 深拷贝整张图, 保持所有句柄不变。
    /// 算法在克隆上工作, 除非调用方显式写回, 原图不会被修改。
    pub fn clone_network(&self) -> Arc<Graph> {
        let clone = Graph::new();
        for vertex in self.vertices.read().values() {
            clone.insert_vertex(vertex.clone());
        }
        for edge in self.edges.read().values() {
            clone.insert_edge(edge.clone());
        }
        *clone.properties.write() = self.properties.read().clone();
        clone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_basic() {
        let graph = Graph::new();

        let v1 = graph.add_vertex();
        let v2 = graph.add_vertex();
        assert_eq!(graph.vertex_count(), 2);

        let e1 = graph.add_edge_directed(v1, v2).unwrap();
        assert_eq!(graph.edge_count(), 1);

        let edges = graph.edges_between(v1, v2);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges.first().unwrap().id(), e1);

        assert_eq!(graph.neighbors(v1), vec![v2]);
        assert_eq!(graph.predecessors(v2), vec![v1]);
    }

    #[test]
    fn test_edge_requires_existing_endpoints() {
        let graph = Graph::new();
        let v1 = graph.add_vertex();

        let err = graph.add_edge_directed(v1, VertexId::new(999)).unwrap_err();
        assert!(matches!(err, Error::VertexNotFound(_)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_remove_vertex_cascades() {
        let graph = Graph::new();

        let v1 = graph.add_vertex();
        let v2 = graph.add_vertex();
        let v3 = graph.add_vertex();
        let e12 = graph.add_edge_directed(v1, v2).unwrap();
        let e23 = graph.add_edge_directed(v2, v3).unwrap();
        let e31 = graph.add_edge_undirected(v3, v1).unwrap();

        graph.remove_vertex(v2).unwrap();

        assert!(!graph.contains_vertex(v2));
        assert!(!graph.contains_edge(e12));
        assert!(!graph.contains_edge(e23));
        assert!(graph.contains_edge(e31));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_double_destroy_fails() {
        let graph = Graph::new();
        let v1 = graph.add_vertex();
        let v2 = graph.add_vertex();
        let e = graph.add_edge_directed(v1, v2).unwrap();

        graph.remove_edge(e).unwrap();
        assert!(matches!(graph.remove_edge(e), Err(Error::EdgeNotFound(_))));

        graph.remove_vertex(v1).unwrap();
        assert!(matches!(
            graph.remove_vertex(v1),
            Err(Error::VertexNotFound(_))
        ));
    }

    #[test]
    fn test_ids_not_reused_after_destroy() {
        let graph = Graph::new();
        let v1 = graph.add_vertex();
        graph.remove_vertex(v1).unwrap();

        let v2 = graph.add_vertex();
        assert_ne!(v1, v2);
    }

    #[test]
    fn test_flow_invariant_via_graph() {
        let graph = Graph::new();
        let v1 = graph.add_vertex();
        let v2 = graph.add_vertex();
        let e = graph.add_edge_directed(v1, v2).unwrap();

        graph.set_capacity(e, Some(5.0)).unwrap();
        assert!(matches!(
            graph.set_flow(e, Some(7.0)),
            Err(Error::FlowExceedsCapacity(_, _, _))
        ));
        // 失败后原值可见且不变式成立
        assert_eq!(graph.get_edge(e).unwrap().flow(), None);
    }

    #[test]
    fn test_net_outflow() {
        let graph = Graph::new();
        let v1 = graph.add_vertex();
        let v2 = graph.add_vertex();
        let v3 = graph.add_vertex();

        let e12 = graph.add_edge_directed(v1, v2).unwrap();
        let e23 = graph.add_edge_directed(v2, v3).unwrap();
        graph.set_flow(e12, Some(3.0)).unwrap();
        graph.set_flow(e23, Some(1.0)).unwrap();

        assert_eq!(graph.net_outflow(v1), 3.0);
        assert_eq!(graph.net_outflow(v2), -2.0);
        assert_eq!(graph.net_outflow(v3), -1.0);
    }

    #[test]
    fn test_clone_network_preserves_handles() {
        let graph = Graph::new();
        let v1 = graph.add_vertex();
        let v2 = graph.add_vertex();
        let e = graph.add_edge_directed(v1, v2).unwrap();
        graph.set_balance(v1, 2.0).unwrap();
        graph.set_weight(e, Some(7.0)).unwrap();

        let clone = graph.clone_network();
        assert_eq!(clone.balance(v1).unwrap(), 2.0);
        assert_eq!(clone.get_edge(e).unwrap().weight(), Some(7.0));

        // 克隆上的修改不影响原图
        clone.set_weight(e, Some(1.0)).unwrap();
        assert_eq!(graph.get_edge(e).unwrap().weight(), Some(7.0));

        // 克隆继续分配不冲突的新句柄
        let v3 = clone.add_vertex();
        assert!(!graph.contains_vertex(v3));
    }
}
