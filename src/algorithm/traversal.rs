//! 广度优先遍历
//!
//! 从起点做层序扩展, 每个顶点至多入队一次, 到每个可达顶点的
//! 路径即跳数最少的路径。连通性查询与增广路径搜索都建立在
//! 该遍历之上。

use crate::error::{Error, Result};
use crate::graph::{Edge, EdgeId, Graph, VertexId, Walk};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// 遍历方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// 沿出边方向
    Outgoing,
    /// 沿入边方向
    Incoming,
    /// 双向
    Both,
}

/// 广度优先遍历
pub struct BreadthFirst {
    graph: Arc<Graph>,
    direction: Direction,
}

impl BreadthFirst {
    /// 创建遍历 (默认沿出边方向)
    pub fn new(graph: Arc<Graph>) -> Self {
        Self::with_direction(graph, Direction::Outgoing)
    }

    /// 创建指定方向的遍历
    pub fn with_direction(graph: Arc<Graph>, direction: Direction) -> Self {
        Self { graph, direction }
    }

    /// 从起点遍历, 返回层序树
    pub fn run(&self, start: VertexId) -> Result<TraversalTree> {
        if !self.graph.contains_vertex(start) {
            return Err(Error::VertexNotFound(start));
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut parent: HashMap<VertexId, (VertexId, EdgeId)> = HashMap::new();
        let mut depth = HashMap::new();
        let mut order = vec![start];

        visited.insert(start);
        depth.insert(start, 0usize);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let edges = match self.direction {
                Direction::Outgoing => self.graph.outgoing_edges(current),
                Direction::Incoming => self.graph.incoming_edges(current),
                Direction::Both => self.graph.incident_edges(current),
            };

            for edge in edges {
                let Some(next) = self.traversal_target(&edge, current) else {
                    continue;
                };
                if visited.insert(next) {
                    parent.insert(next, (current, edge.id()));
                    depth.insert(next, depth[&current] + 1);
                    order.push(next);
                    queue.push_back(next);
                }
            }
        }

        Ok(TraversalTree {
            start,
            parent,
            depth,
            order,
        })
    }

    /// 从 from 出发经 edge 可到达的顶点; 方向不匹配时为 None
    fn traversal_target(&self, edge: &Edge, from: VertexId) -> Option<VertexId> {
        if edge.is_undirected() {
            return edge.other_endpoint(from);
        }
        match self.direction {
            Direction::Outgoing => (edge.src() == from).then(|| edge.dst()),
            Direction::Incoming => (edge.dst() == from).then(|| edge.src()),
            Direction::Both => edge.other_endpoint(from),
        }
    }
}

/// 遍历结果: 每个可达顶点的父边与层数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalTree {
    start: VertexId,
    /// 可达顶点到 (父顶点, 连接边) 的映射
    parent: HashMap<VertexId, (VertexId, EdgeId)>,
    /// 可达顶点到跳数的映射
    depth: HashMap<VertexId, usize>,
    /// 按层序记录的可达顶点
    order: Vec<VertexId>,
}

impl TraversalTree {
    /// 遍历的起点
    pub fn start(&self) -> VertexId {
        self.start
    }

    /// 顶点是否可达 (存在性查询不报错, 只返回布尔)
    pub fn is_reached(&self, v: VertexId) -> bool {
        v == self.start || self.parent.contains_key(&v)
    }

    /// 起点到顶点的跳数
    pub fn distance(&self, v: VertexId) -> Option<usize> {
        self.depth.get(&v).copied()
    }

    /// 按层序排列的所有可达顶点
    pub fn reached(&self) -> &[VertexId] {
        &self.order
    }

    /// 起点到顶点的最少跳数路径; 不可达时报 NotFound。
    /// 路径顶点顺序沿遍历方向 (Incoming 模式下边的指向与
    /// 路径方向相反)。
    pub fn walk_to(&self, v: VertexId) -> Result<Walk> {
        if v == self.start {
            return Ok(Walk::start(v));
        }
        if !self.parent.contains_key(&v) {
            return Err(Error::NotFound(format!("顶点 {} 不可达", v)));
        }

        let mut steps = Vec::new();
        let mut current = v;
        while current != self.start {
            let &(prev, edge) = self
                .parent
                .get(&current)
                .expect("可达顶点的父边链必然到达起点");
            steps.push((edge, current));
            current = prev;
        }
        steps.reverse();

        let mut walk = Walk::start(self.start);
        for (edge, to) in steps {
            walk.push_step(edge, to);
        }
        Ok(walk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> (Arc<Graph>, Vec<VertexId>) {
        // 1 -> 2 -> 4
        //  \-> 3 ->/   5 (孤立)
        let graph = Graph::new();
        let v: Vec<VertexId> = (0..5).map(|_| graph.add_vertex()).collect();
        graph.add_edge_directed(v[0], v[1]).unwrap();
        graph.add_edge_directed(v[0], v[2]).unwrap();
        graph.add_edge_directed(v[1], v[3]).unwrap();
        graph.add_edge_directed(v[2], v[3]).unwrap();
        (graph, v)
    }

    #[test]
    fn test_bfs_levels() {
        let (graph, v) = diamond();
        let tree = BreadthFirst::new(graph).run(v[0]).unwrap();

        assert_eq!(tree.distance(v[0]), Some(0));
        assert_eq!(tree.distance(v[1]), Some(1));
        assert_eq!(tree.distance(v[2]), Some(1));
        assert_eq!(tree.distance(v[3]), Some(2));
        assert_eq!(tree.distance(v[4]), None);
        assert!(!tree.is_reached(v[4]));
        assert_eq!(tree.reached().len(), 4);
    }

    #[test]
    fn test_bfs_walk_is_shortest() {
        let (graph, v) = diamond();
        // 额外的绕行路径 1 -> 5... 改为 v0 -> v4 -> v3
        graph.add_edge_directed(v[0], v[4]).unwrap();
        graph.add_edge_directed(v[4], v[3]).unwrap();

        let tree = BreadthFirst::new(graph.clone()).run(v[0]).unwrap();
        let walk = tree.walk_to(v[3]).unwrap();

        assert_eq!(walk.edge_count(), 2);
        assert_eq!(walk.first_vertex(), v[0]);
        assert_eq!(walk.last_vertex(), v[3]);
        assert!(walk.is_valid(&graph));
    }

    #[test]
    fn test_bfs_unreached_walk_fails() {
        let (graph, v) = diamond();
        let tree = BreadthFirst::new(graph).run(v[0]).unwrap();

        assert!(matches!(tree.walk_to(v[4]), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_bfs_incoming() {
        let (graph, v) = diamond();
        let tree = BreadthFirst::with_direction(graph, Direction::Incoming)
            .run(v[3])
            .unwrap();

        assert!(tree.is_reached(v[0]));
        assert_eq!(tree.distance(v[0]), Some(2));
        assert!(!tree.is_reached(v[4]));
    }

    #[test]
    fn test_bfs_undirected_both_ways() {
        let graph = Graph::new();
        let a = graph.add_vertex();
        let b = graph.add_vertex();
        let c = graph.add_vertex();
        graph.add_edge_undirected(a, b).unwrap();
        graph.add_edge_directed(c, b).unwrap();

        // 出边模式: 无向边可走, 有向边 c->b 不能反向
        let tree = BreadthFirst::new(graph.clone()).run(a).unwrap();
        assert!(tree.is_reached(b));
        assert!(!tree.is_reached(c));

        // 双向模式: 有向边也可反向
        let tree = BreadthFirst::with_direction(graph, Direction::Both)
            .run(a)
            .unwrap();
        assert!(tree.is_reached(c));
    }

    #[test]
    fn test_bfs_missing_start_fails() {
        let graph = Graph::new();
        let err = BreadthFirst::new(graph).run(VertexId::new(42)).unwrap_err();
        assert!(matches!(err, Error::VertexNotFound(_)));
    }
}
