//! 挂在物品实例上的结构化数据（JSON 对象），收纳袋内容就存在这里

use bevy::prelude::*;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ItemDataError {
    #[error("Could not encode item data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Item data must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemData(Map<String, Value>);

impl ItemData {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 按路径读取一个记录列表；列表不存在返回 None，坏记录跳过
    pub fn get_list<T: DeserializeOwned>(&self, path: &[&str]) -> Option<Vec<T>> {
        let (last, parents) = path.split_last()?;
        let mut map = &self.0;
        for key in parents {
            map = map.get(*key)?.as_object()?;
        }
        let list = map.get(*last)?.as_array()?;

        Some(
            list.iter()
                .filter_map(|value| match T::deserialize(value) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("跳过无法解析的记录 {value}: {e}");
                        None
                    }
                })
                .collect(),
        )
    }

    /// 按路径写入记录列表，中间层不存在（或不是对象）时新建
    pub fn set_list<T: Serialize>(&mut self, path: &[&str], records: &[T]) -> Result<(), ItemDataError> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(());
        };
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        write_path(&mut self.0, parents, last, Value::Array(values));
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ItemDataError> {
        Ok(serde_json::to_string(&self.0)?)
    }

    pub fn from_json(s: &str) -> Result<Self, ItemDataError> {
        match serde_json::from_str::<Value>(s)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ItemDataError::NotAnObject),
        }
    }
}

fn write_path(map: &mut Map<String, Value>, parents: &[&str], last: &str, value: Value) {
    let Some((key, rest)) = parents.split_first() else {
        map.insert(last.to_string(), value);
        return;
    };
    let child = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    if let Value::Object(inner) = child {
        write_path(inner, rest, last, value);
    }
}
