//! 单源最短路径
//!
//! Dijkstra 适用于全非负权图, 遇到负权边立即报错而不是给出
//! 错误结果; Moore-Bellman-Ford 适用于任意权重, 并能检测从
//! 源点可达的负权环, 检测结果作为数据随错误返回, 供消圈
//! 算法消费。两者共享同一种前驱树结果。

use crate::error::{Error, Result};
use crate::graph::{Cycle, Edge, EdgeId, Graph, VertexId, Walk};
use crate::types::EPSILON;
use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// 全序化的路径代价, 作为唯一的最小优先级抽象
/// (不做取负模拟最小堆的把戏)。
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// 最短路径结果: 每个可达顶点的距离与最优前驱边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortestPathTree {
    source: VertexId,
    /// 可达顶点到距离的映射
    distance: HashMap<VertexId, f64>,
    /// 可达顶点到 (前驱顶点, 前驱边) 的映射
    predecessor: HashMap<VertexId, (VertexId, EdgeId)>,
}

impl ShortestPathTree {
    /// 源点
    pub fn source(&self) -> VertexId {
        self.source
    }

    /// 源点到顶点的最短距离; 不可达为 None
    pub fn distance(&self, v: VertexId) -> Option<f64> {
        self.distance.get(&v).copied()
    }

    /// 顶点的最优前驱边
    pub fn predecessor_edge(&self, v: VertexId) -> Option<EdgeId> {
        self.predecessor.get(&v).map(|&(_, e)| e)
    }

    /// 顶点是否可达
    pub fn is_reached(&self, v: VertexId) -> bool {
        self.distance.contains_key(&v)
    }

    /// 所有可达顶点, 按距离升序
    pub fn reached(&self) -> Vec<VertexId> {
        let mut ids: Vec<VertexId> = self.distance.keys().copied().collect();
        ids.sort_by(|a, b| self.distance[a].total_cmp(&self.distance[b]));
        ids
    }

    /// 源点到顶点的最短路径; 不可达时报 NotFound
    pub fn walk_to(&self, v: VertexId) -> Result<Walk> {
        if v == self.source {
            return Ok(Walk::start(v));
        }
        if !self.predecessor.contains_key(&v) {
            return Err(Error::NotFound(format!("顶点 {} 不可达", v)));
        }

        let mut steps = Vec::new();
        let mut current = v;
        while current != self.source {
            let &(prev, edge) = self
                .predecessor
                .get(&current)
                .expect("可达顶点的前驱链必然到达源点");
            steps.push((edge, current));
            current = prev;
        }
        steps.reverse();

        let mut walk = Walk::start(self.source);
        for (edge, to) in steps {
            walk.push_step(edge, to);
        }
        Ok(walk)
    }
}

/// Dijkstra 最短路径 (非负权)
pub struct Dijkstra {
    graph: Arc<Graph>,
}

impl Dijkstra {
    /// 创建算法实例
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    /// 从源点计算最短路径树。
    /// 碰到负权边立即失败, 绝不静默给出错误答案。
    pub fn run(&self, source: VertexId) -> Result<ShortestPathTree> {
        if !self.graph.contains_vertex(source) {
            return Err(Error::VertexNotFound(source));
        }

        let mut distance: HashMap<VertexId, f64> = HashMap::new();
        let mut predecessor: HashMap<VertexId, (VertexId, EdgeId)> = HashMap::new();
        let mut finalized: HashSet<VertexId> = HashSet::new();
        let mut queue: PriorityQueue<VertexId, Reverse<Cost>> = PriorityQueue::new();

        distance.insert(source, 0.0);
        queue.push(source, Reverse(Cost(0.0)));

        while let Some((u, _)) = queue.pop() {
            // 已定型顶点的过期条目直接跳过
            if !finalized.insert(u) {
                continue;
            }
            let du = distance[&u];
            trace!(vertex = %u, distance = du, "Dijkstra 定型顶点");

            for edge in self.graph.outgoing_edges(u) {
                let Some(next) = traversal_target(&edge, u) else {
                    continue;
                };
                let w = edge.weight_or(1.0);
                if w < -EPSILON {
                    return Err(Error::NegativeWeight(edge.id(), w));
                }
                if finalized.contains(&next) {
                    continue;
                }

                let candidate = du + w;
                let improved = match distance.get(&next) {
                    Some(&d) => candidate < d,
                    None => true,
                };
                if improved {
                    distance.insert(next, candidate);
                    predecessor.insert(next, (u, edge.id()));
                    queue.push(next, Reverse(Cost(candidate)));
                }
            }
        }

        Ok(ShortestPathTree {
            source,
            distance,
            predecessor,
        })
    }
}

/// Moore-Bellman-Ford 最短路径 (任意权重, 负环检测)
pub struct BellmanFord {
    graph: Arc<Graph>,
}

/// 松弛表条目: (起点, 终点, 权重, 边)。无向边生成两个方向的条目。
type RelaxEntry = (VertexId, VertexId, f64, EdgeId);

impl BellmanFord {
    /// 创建算法实例
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    /// 从源点计算最短路径树。
    /// 检测到从源点可达的负权环时, 以 NegativeCycle 错误携带
    /// 该环返回。
    pub fn run(&self, source: VertexId) -> Result<ShortestPathTree> {
        if !self.graph.contains_vertex(source) {
            return Err(Error::VertexNotFound(source));
        }

        let mut distance: HashMap<VertexId, f64> = HashMap::new();
        distance.insert(source, 0.0);

        let tree = self.relax_to_fixpoint(source, distance)?;
        Ok(tree)
    }

    /// 检测图中任意位置的负权环 (不限定源点)。
    /// 所有顶点以距离 0 起步, 有负环必然被发现。
    pub fn negative_cycle(&self) -> Result<Option<Cycle>> {
        let ids = self.graph.vertices().ids();
        // 任取一个占位源点; 全零初始化下它只决定结果归属
        let Some(source) = ids.first().copied() else {
            return Ok(None);
        };
        let mut distance: HashMap<VertexId, f64> = HashMap::new();
        for id in ids {
            distance.insert(id, 0.0);
        }

        match self.relax_to_fixpoint(source, distance) {
            Ok(_) => Ok(None),
            Err(Error::NegativeCycle(cycle)) => Ok(Some(cycle)),
            Err(e) => Err(e),
        }
    }

    /// 至多 |V|-1 轮全量松弛 + 一轮验证。
    /// 验证轮仍有改进即存在负权环, 通过回溯前驱恢复环。
    fn relax_to_fixpoint(
        &self,
        source: VertexId,
        mut distance: HashMap<VertexId, f64>,
    ) -> Result<ShortestPathTree> {
        let n = self.graph.vertex_count();
        let entries = self.relax_entries();
        let mut predecessor: HashMap<VertexId, (VertexId, EdgeId)> = HashMap::new();

        for pass in 1..n {
            let mut updated = false;
            for &(from, to, w, edge) in &entries {
                if let Some(&df) = distance.get(&from) {
                    let candidate = df + w;
                    let improved = match distance.get(&to) {
                        Some(&dt) => candidate < dt - EPSILON,
                        None => true,
                    };
                    if improved {
                        distance.insert(to, candidate);
                        predecessor.insert(to, (from, edge));
                        updated = true;
                    }
                }
            }
            if !updated {
                debug!(pass, "Bellman-Ford 提前收敛");
                break;
            }
        }

        // 验证轮: 仍可改进 => 负权环
        for &(from, to, w, edge) in &entries {
            if let Some(&df) = distance.get(&from) {
                let candidate = df + w;
                let still_improving = match distance.get(&to) {
                    Some(&dt) => candidate < dt - EPSILON,
                    None => true,
                };
                if still_improving {
                    distance.insert(to, candidate);
                    predecessor.insert(to, (from, edge));
                    let cycle = self.extract_cycle(&predecessor, to, n)?;
                    debug!(%cycle, "检测到负权环");
                    return Err(Error::NegativeCycle(cycle));
                }
            }
        }

        Ok(ShortestPathTree {
            source,
            distance,
            predecessor,
        })
    }

    /// 展开为松弛表: 有向边一个条目, 无向边两个方向各一个。
    fn relax_entries(&self) -> Vec<RelaxEntry> {
        let mut entries = Vec::new();
        for edge in self.graph.edges().iter() {
            let w = edge.weight_or(1.0);
            entries.push((edge.src(), edge.dst(), w, edge.id()));
            if edge.is_undirected() && !edge.is_loop() {
                entries.push((edge.dst(), edge.src(), w, edge.id()));
            }
        }
        entries
    }

    /// 从仍在改进的顶点恢复负权环: 沿前驱回退 |V| 步保证落入
    /// 环内, 再回溯到顶点重复为止, 两次出现之间即为环; 环上的
    /// 边通过相邻顶点间最便宜边查找重建。
    fn extract_cycle(
        &self,
        predecessor: &HashMap<VertexId, (VertexId, EdgeId)>,
        start: VertexId,
        n: usize,
    ) -> Result<Cycle> {
        let step = |v: VertexId| -> Result<VertexId> {
            predecessor
                .get(&v)
                .map(|&(p, _)| p)
                .ok_or_else(|| Error::InternalError(format!("顶点 {} 缺少前驱", v)))
        };

        let mut on_cycle = start;
        for _ in 0..n {
            on_cycle = step(on_cycle)?;
        }

        let mut backward = vec![on_cycle];
        let mut current = step(on_cycle)?;
        while current != on_cycle {
            backward.push(current);
            current = step(current)?;
        }

        // 前驱链是逆向的; 正向顶点序列为 on_cycle 之后反转再闭合
        let mut vertices = vec![on_cycle];
        vertices.extend(backward[1..].iter().rev().copied());
        vertices.push(on_cycle);

        let mut edges = Vec::new();
        for pair in vertices.windows(2) {
            edges.push(cheapest_edge_between(&self.graph, pair[0], pair[1])?);
        }

        let walk = Walk::from_parts(vertices, edges, &self.graph)?;
        Cycle::new(walk)
    }
}

/// u -> v 方向上最便宜的边 (未设置权重按 1 计)
fn cheapest_edge_between(graph: &Graph, u: VertexId, v: VertexId) -> Result<EdgeId> {
    graph
        .edges_between(u, v)
        .order_by(|e| e.weight_or(1.0), false)
        .first()
        .map(|e| e.id())
        .ok_or_else(|| Error::NotFound(format!("{} 与 {} 之间没有边", u, v)))
}

/// 沿出边从 from 可到达的顶点 (无向边两个方向均可)
fn traversal_target(edge: &Edge, from: VertexId) -> Option<VertexId> {
    if edge.is_undirected() {
        edge.other_endpoint(from)
    } else {
        (edge.src() == from).then(|| edge.dst())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_graph() -> (Arc<Graph>, Vec<VertexId>) {
        //      1        4
        // v0 ----> v1 ----> v3
        //  \                ^
        //   \--- 2 --> v2 --/ 1
        let graph = Graph::new();
        let v: Vec<VertexId> = (0..4).map(|_| graph.add_vertex()).collect();
        let e01 = graph.add_edge_directed(v[0], v[1]).unwrap();
        let e13 = graph.add_edge_directed(v[1], v[3]).unwrap();
        let e02 = graph.add_edge_directed(v[0], v[2]).unwrap();
        let e23 = graph.add_edge_directed(v[2], v[3]).unwrap();
        graph.set_weight(e01, Some(1.0)).unwrap();
        graph.set_weight(e13, Some(4.0)).unwrap();
        graph.set_weight(e02, Some(2.0)).unwrap();
        graph.set_weight(e23, Some(1.0)).unwrap();
        (graph, v)
    }

    #[test]
    fn test_dijkstra_basic() {
        let (graph, v) = weighted_graph();
        let tree = Dijkstra::new(graph).run(v[0]).unwrap();

        assert_eq!(tree.distance(v[0]), Some(0.0));
        assert_eq!(tree.distance(v[1]), Some(1.0));
        assert_eq!(tree.distance(v[3]), Some(3.0));

        let walk = tree.walk_to(v[3]).unwrap();
        assert_eq!(walk.vertices(), &[v[0], v[2], v[3]]);
    }

    #[test]
    fn test_dijkstra_rejects_negative_weight() {
        let (graph, v) = weighted_graph();
        let e = graph.add_edge_directed(v[1], v[2]).unwrap();
        graph.set_weight(e, Some(-1.0)).unwrap();

        let err = Dijkstra::new(graph).run(v[0]).unwrap_err();
        assert!(matches!(err, Error::NegativeWeight(_, _)));
    }

    #[test]
    fn test_dijkstra_unreachable() {
        let (graph, v) = weighted_graph();
        let isolated = graph.add_vertex();

        let tree = Dijkstra::new(graph).run(v[0]).unwrap();
        assert!(!tree.is_reached(isolated));
        assert!(matches!(tree.walk_to(isolated), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_bellman_ford_agrees_with_dijkstra() {
        let (graph, v) = weighted_graph();
        let dj = Dijkstra::new(graph.clone()).run(v[0]).unwrap();
        let bf = BellmanFord::new(graph).run(v[0]).unwrap();

        for &vid in &v {
            let a = dj.distance(vid).unwrap();
            let b = bf.distance(vid).unwrap();
            assert!((a - b).abs() < EPSILON, "{}: {} != {}", vid, a, b);
        }
    }

    #[test]
    fn test_bellman_ford_negative_weight_ok() {
        let graph = Graph::new();
        let v0 = graph.add_vertex();
        let v1 = graph.add_vertex();
        let v2 = graph.add_vertex();
        let e01 = graph.add_edge_directed(v0, v1).unwrap();
        let e12 = graph.add_edge_directed(v1, v2).unwrap();
        let e02 = graph.add_edge_directed(v0, v2).unwrap();
        graph.set_weight(e01, Some(2.0)).unwrap();
        graph.set_weight(e12, Some(-5.0)).unwrap();
        graph.set_weight(e02, Some(0.0)).unwrap();

        let tree = BellmanFord::new(graph).run(v0).unwrap();
        assert_eq!(tree.distance(v2), Some(-3.0));
    }

    #[test]
    fn test_negative_triangle_detected() {
        // 权重 1, 1, -3 的三角形: 总权 -1, 必须检出
        let graph = Graph::new();
        let v0 = graph.add_vertex();
        let v1 = graph.add_vertex();
        let v2 = graph.add_vertex();
        let e01 = graph.add_edge_directed(v0, v1).unwrap();
        let e12 = graph.add_edge_directed(v1, v2).unwrap();
        let e20 = graph.add_edge_directed(v2, v0).unwrap();
        graph.set_weight(e01, Some(1.0)).unwrap();
        graph.set_weight(e12, Some(1.0)).unwrap();
        graph.set_weight(e20, Some(-3.0)).unwrap();

        let err = BellmanFord::new(graph.clone()).run(v0).unwrap_err();
        let cycle = err.into_negative_cycle().expect("应检测到负权环");
        assert_eq!(cycle.edge_count(), 3);
        assert!(cycle.total_weight(&graph).unwrap() < 0.0);
        assert!(cycle.walk().is_closed());
    }

    #[test]
    fn test_no_false_negative_cycle() {
        let (graph, v) = weighted_graph();
        // 正权环 v1 -> v3 -> v1
        let e31 = graph.add_edge_directed(v[3], v[1]).unwrap();
        graph.set_weight(e31, Some(1.0)).unwrap();

        assert!(BellmanFord::new(graph.clone()).run(v[0]).is_ok());
        assert!(BellmanFord::new(graph).negative_cycle().unwrap().is_none());
    }

    #[test]
    fn test_nonnegative_self_loop_not_a_cycle() {
        let graph = Graph::new();
        let v0 = graph.add_vertex();
        let v1 = graph.add_vertex();
        let e01 = graph.add_edge_directed(v0, v1).unwrap();
        let loop0 = graph.add_edge_directed(v0, v0).unwrap();
        let loop1 = graph.add_edge_directed(v1, v1).unwrap();
        graph.set_weight(e01, Some(1.0)).unwrap();
        graph.set_weight(loop0, Some(0.0)).unwrap();
        graph.set_weight(loop1, Some(2.0)).unwrap();

        let tree = BellmanFord::new(graph.clone()).run(v0).unwrap();
        assert_eq!(tree.distance(v1), Some(1.0));
        assert!(BellmanFord::new(graph).negative_cycle().unwrap().is_none());
    }

    #[test]
    fn test_negative_self_loop_detected() {
        let graph = Graph::new();
        let v0 = graph.add_vertex();
        let lp = graph.add_edge_directed(v0, v0).unwrap();
        graph.set_weight(lp, Some(-1.0)).unwrap();

        let cycle = BellmanFord::new(graph.clone())
            .negative_cycle()
            .unwrap()
            .expect("负自环应被检出");
        assert_eq!(cycle.edge_count(), 1);
        assert_eq!(cycle.total_weight(&graph).unwrap(), -1.0);
    }

    #[test]
    fn test_dijkstra_agrees_with_bellman_ford_random() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let graph = Graph::new();
        let v: Vec<VertexId> = (0..30).map(|_| graph.add_vertex()).collect();
        for _ in 0..120 {
            let src = v[rng.gen_range(0..v.len())];
            let dst = v[rng.gen_range(0..v.len())];
            let e = graph.add_edge_directed(src, dst).unwrap();
            graph.set_weight(e, Some(rng.gen_range(0.0..10.0))).unwrap();
        }

        let dj = Dijkstra::new(graph.clone()).run(v[0]).unwrap();
        let bf = BellmanFord::new(graph).run(v[0]).unwrap();
        for &vid in &v {
            match (dj.distance(vid), bf.distance(vid)) {
                (Some(a), Some(b)) => {
                    assert!((a - b).abs() < EPSILON, "{}: {} != {}", vid, a, b)
                }
                (None, None) => {}
                other => panic!("{}: 可达性不一致 {:?}", vid, other),
            }
        }
    }

    #[test]
    fn test_negative_cycle_search_without_source() {
        // 负环与占位源点不连通, negative_cycle 仍应找到它
        let graph = Graph::new();
        let _a = graph.add_vertex();
        let _b = graph.add_vertex();
        let c = graph.add_vertex();
        let d = graph.add_vertex();
        let e1 = graph.add_edge_directed(c, d).unwrap();
        let e2 = graph.add_edge_directed(d, c).unwrap();
        graph.set_weight(e1, Some(1.0)).unwrap();
        graph.set_weight(e2, Some(-2.0)).unwrap();

        let cycle = BellmanFord::new(graph)
            .negative_cycle()
            .unwrap()
            .expect("应检测到负权环");
        assert_eq!(cycle.edge_count(), 2);
    }
}
