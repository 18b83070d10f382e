//! 元素集合
//!
//! 图和算法之间传递的有序只读视图。集合是快照, 查询操作
//! 不会修改底层图; 排序和过滤返回新集合。

use super::edge::{Edge, EdgeId};
use super::vertex::{Vertex, VertexId};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// 顶点集合 (有序快照)
#[derive(Debug, Clone, Default)]
pub struct VertexSet {
    items: Vec<Vertex>,
}

impl VertexSet {
    pub(crate) fn new(items: Vec<Vertex>) -> Self {
        Self { items }
    }

    /// 第一个元素
    pub fn first(&self) -> Option<&Vertex> {
        self.items.first()
    }

    /// 最后一个元素
    pub fn last(&self) -> Option<&Vertex> {
        self.items.last()
    }

    /// 返回首个满足条件的元素, 不存在时报 NotFound
    pub fn get_match<P>(&self, predicate: P) -> Result<&Vertex>
    where
        P: Fn(&Vertex) -> bool,
    {
        self.items
            .iter()
            .find(|v| predicate(v))
            .ok_or_else(|| Error::NotFound("没有满足条件的顶点".to_string()))
    }

    /// 过滤出满足条件的元素
    pub fn filter<P>(&self, predicate: P) -> VertexSet
    where
        P: Fn(&Vertex) -> bool,
    {
        VertexSet::new(self.items.iter().filter(|v| predicate(v)).cloned().collect())
    }

    /// 按准则排序 (稳定排序, descending 为真时降序)
    pub fn order_by<F>(&self, criterion: F, descending: bool) -> VertexSet
    where
        F: Fn(&Vertex) -> f64,
    {
        let mut items = self.items.clone();
        items.sort_by(|a, b| {
            let ord = criterion(a).total_cmp(&criterion(b));
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        VertexSet::new(items)
    }

    /// 按 ID 去重, 保留首次出现
    pub fn distinct(&self) -> VertexSet {
        let mut seen = HashSet::new();
        VertexSet::new(
            self.items
                .iter()
                .filter(|v| seen.insert(v.id()))
                .cloned()
                .collect(),
        )
    }

    /// 是否包含给定 ID 的顶点
    pub fn contains(&self, id: VertexId) -> bool {
        self.items.iter().any(|v| v.id() == id)
    }

    /// 所有元素的 ID (按集合顺序)
    pub fn ids(&self) -> Vec<VertexId> {
        self.items.iter().map(|v| v.id()).collect()
    }

    /// 转为向量
    pub fn to_vec(self) -> Vec<Vertex> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vertex> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a VertexSet {
    type Item = &'a Vertex;
    type IntoIter = std::slice::Iter<'a, Vertex>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// 边集合 (有序快照)
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    items: Vec<Edge>,
}

impl EdgeSet {
    pub(crate) fn new(items: Vec<Edge>) -> Self {
        Self { items }
    }

    /// 第一个元素
    pub fn first(&self) -> Option<&Edge> {
        self.items.first()
    }

    /// 最后一个元素
    pub fn last(&self) -> Option<&Edge> {
        self.items.last()
    }

    /// 返回首个满足条件的元素, 不存在时报 NotFound
    pub fn get_match<P>(&self, predicate: P) -> Result<&Edge>
    where
        P: Fn(&Edge) -> bool,
    {
        self.items
            .iter()
            .find(|e| predicate(e))
            .ok_or_else(|| Error::NotFound("没有满足条件的边".to_string()))
    }

    /// 过滤出满足条件的元素
    pub fn filter<P>(&self, predicate: P) -> EdgeSet
    where
        P: Fn(&Edge) -> bool,
    {
        EdgeSet::new(self.items.iter().filter(|e| predicate(e)).cloned().collect())
    }

    /// 按准则排序 (稳定排序, descending 为真时降序)
    pub fn order_by<F>(&self, criterion: F, descending: bool) -> EdgeSet
    where
        F: Fn(&Edge) -> f64,
    {
        let mut items = self.items.clone();
        items.sort_by(|a, b| {
            let ord = criterion(a).total_cmp(&criterion(b));
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        EdgeSet::new(items)
    }

    /// 按 ID 去重, 保留首次出现
    pub fn distinct(&self) -> EdgeSet {
        let mut seen = HashSet::new();
        EdgeSet::new(
            self.items
                .iter()
                .filter(|e| seen.insert(e.id()))
                .cloned()
                .collect(),
        )
    }

    /// 是否包含给定 ID 的边
    pub fn contains(&self, id: EdgeId) -> bool {
        self.items.iter().any(|e| e.id() == id)
    }

    /// 所有元素的 ID (按集合顺序)
    pub fn ids(&self) -> Vec<EdgeId> {
        self.items.iter().map(|e| e.id()).collect()
    }

    /// 转为向量
    pub fn to_vec(self) -> Vec<Edge> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
