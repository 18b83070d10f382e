//! 邻接索引
//!
//! 边的内存索引, 支持按端点快速查找。无向边会同时注册到
//! 两个方向, 因此出边 / 入边查询对无向边天然对称。

use crate::graph::edge::EdgeId;
use crate::graph::vertex::VertexId;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::collections::HashMap;

type EdgeList = SmallVec<[EdgeId; 4]>;

/// 边索引
pub struct EdgeIndex {
    /// 源顶点到出边的映射
    outgoing: RwLock<HashMap<VertexId, EdgeList>>,
    /// 目标顶点到入边的映射
    incoming: RwLock<HashMap<VertexId, EdgeList>>,
    /// 边 ID 到 (src, dst, 是否有向) 的映射
    edge_endpoints: RwLock<HashMap<EdgeId, (VertexId, VertexId, bool)>>,
    /// (src, dst) 到边 ID 列表的映射 (支持多重边)
    pair_to_edges: RwLock<HashMap<(VertexId, VertexId), EdgeList>>,
}

impl EdgeIndex {
    /// 创建新索引
    pub fn new() -> Self {
        Self {
            outgoing: RwLock::new(HashMap::new()),
            incoming: RwLock::new(HashMap::new()),
            edge_endpoints: RwLock::new(HashMap::new()),
            pair_to_edges: RwLock::new(HashMap::new()),
        }
    }

    /// 添加边; 无向边注册双向
    pub fn add_edge(&self, edge_id: EdgeId, src: VertexId, dst: VertexId, directed: bool) {
        self.outgoing.write().entry(src).or_default().push(edge_id);
        self.incoming.write().entry(dst).or_default().push(edge_id);

        if !directed && src != dst {
            self.outgoing.write().entry(dst).or_default().push(edge_id);
            self.incoming.write().entry(src).or_default().push(edge_id);
        }

        self.edge_endpoints
            .write()
            .insert(edge_id, (src, dst, directed));

        self.pair_to_edges
            .write()
            .entry((src, dst))
            .or_default()
            .push(edge_id);
        if !directed && src != dst {
            self.pair_to_edges
                .write()
                .entry((dst, src))
                .or_default()
                .push(edge_id);
        }
    }

    /// 获取顶点的出边 (含无向边)
    pub fn get_outgoing(&self, vertex_id: VertexId) -> Vec<EdgeId> {
        self.outgoing
            .read()
            .get(&vertex_id)
            .map(|v| v.to_vec())
            .unwrap_or_default()
    }

    /// 获取顶点的入边 (含无向边)
    pub fn get_incoming(&self, vertex_id: VertexId) -> Vec<EdgeId> {
        self.incoming
            .read()
            .get(&vertex_id)
            .map(|v| v.to_vec())
            .unwrap_or_default()
    }

    /// 获取边的端点
    pub fn get_endpoints(&self, edge_id: EdgeId) -> Option<(VertexId, VertexId)> {
        self.edge_endpoints
            .read()
            .get(&edge_id)
            .map(|&(src, dst, _)| (src, dst))
    }

    /// 获取 src -> dst 方向上的所有边 (无向边在两个方向都可见)
    pub fn get_edges_between(&self, src: VertexId, dst: VertexId) -> Vec<EdgeId> {
        self.pair_to_edges
            .read()
            .get(&(src, dst))
            .map(|v| v.to_vec())
            .unwrap_or_default()
    }

    /// 移除边
    pub fn remove(&self, edge_id: EdgeId) {
        let Some((src, dst, directed)) = self.edge_endpoints.write().remove(&edge_id) else {
            return;
        };

        let mut outgoing = self.outgoing.write();
        let mut incoming = self.incoming.write();
        let mut pairs = self.pair_to_edges.write();

        if let Some(edges) = outgoing.get_mut(&src) {
            edges.retain(|&mut id| id != edge_id);
        }
        if let Some(edges) = incoming.get_mut(&dst) {
            edges.retain(|&mut id| id != edge_id);
        }
        if let Some(edges) = pairs.get_mut(&(src, dst)) {
            edges.retain(|&mut id| id != edge_id);
        }

        if !directed && src != dst {
            if let Some(edges) = outgoing.get_mut(&dst) {
                edges.retain(|&mut id| id != edge_id);
            }
            if let Some(edges) = incoming.get_mut(&src) {
                edges.retain(|&mut id| id != edge_id);
            }
            if let Some(edges) = pairs.get_mut(&(dst, src)) {
                edges.retain(|&mut id| id != edge_id);
            }
        }
    }

    /// 获取边数量
    pub fn edge_count(&self) -> usize {
        self.edge_endpoints.read().len()
    }

    /// 获取顶点的出度
    pub fn out_degree(&self, vertex_id: VertexId) -> usize {
        self.outgoing
            .read()
            .get(&vertex_id)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    /// 获取顶点的入度
    pub fn in_degree(&self, vertex_id: VertexId) -> usize {
        self.incoming
            .read()
            .get(&vertex_id)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    /// 获取邻居 (出边另一端的顶点)
    pub fn neighbors(&self, vertex_id: VertexId) -> Vec<VertexId> {
        let endpoints = self.edge_endpoints.read();
        self.get_outgoing(vertex_id)
            .iter()
            .filter_map(|edge_id| {
                endpoints.get(edge_id).map(|&(src, dst, _)| {
                    if src == vertex_id {
                        dst
                    } else {
                        src
                    }
                })
            })
            .collect()
    }

    /// 获取前驱 (入边另一端的顶点)
    pub fn predecessors(&self, vertex_id: VertexId) -> Vec<VertexId> {
        let endpoints = self.edge_endpoints.read();
        self.get_incoming(vertex_id)
            .iter()
            .filter_map(|edge_id| {
                endpoints.get(edge_id).map(|&(src, dst, _)| {
                    if dst == vertex_id {
                        src
                    } else {
                        dst
                    }
                })
            })
            .collect()
    }
}

impl Default for EdgeIndex {
    fn default() -> Self {
        Self::new()
    }
}
