//! 顶点定义
//!
//! 顶点的身份由图分配的句柄 (VertexId) 决定, 而不是任何存储字段。
//! 除余额外, 顶点携带一个通用属性包, 供调用方存放元数据。

use crate::types::PropertyValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 顶点 ID (图内唯一, 单调分配, 不会复用)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// 顶点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// 顶点 ID
    id: VertexId,
    /// 余额: 正为供给, 负为需求, 零为中转 (最小费用流使用)
    balance: f64,
    /// 属性
    properties: HashMap<String, PropertyValue>,
}

impl Vertex {
    /// 创建新顶点 (仅供 Graph 工厂使用)
    pub(crate) fn new(id: VertexId) -> Self {
        Self {
            id,
            balance: 0.0,
            properties: HashMap::new(),
        }
    }

    /// 获取顶点 ID
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// 获取余额
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// 设置余额
    pub fn set_balance(&mut self, balance: f64) {
        self.balance = balance;
    }

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
