//! Deep merge used by `dataModelUpdate`.

use std::sync::Arc;

use crate::data::{DataModel, DataObject, DataValue};

/// Merge `partial` into `model`, returning a new model.
///
/// For every key in `partial`: when both the existing and the incoming value
/// are objects they are merged recursively, otherwise the incoming value
/// replaces the existing one. Arrays are always replaced whole. Keys absent
/// from `partial` keep their existing storage.
pub fn deep_merge(model: &DataModel, partial: &DataObject) -> DataModel {
    let mut next = model.clone();
    if !partial.is_empty() {
        merge_into(next.root_mut(), partial);
    }
    next
}

fn merge_into(target: &mut DataObject, source: &DataObject) {
    for (key, incoming) in source {
        if let (Some(DataValue::Object(existing)), DataValue::Object(patch)) =
            (target.get_mut(key), incoming)
        {
            merge_into(Arc::make_mut(existing), patch);
            continue;
        }
        target.insert(key.clone(), incoming.clone());
    }
}
