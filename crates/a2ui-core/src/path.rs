//! Bound path resolution over a [`DataModel`].
//!
//! A bound path is a slash-delimited address such as `/contact/name`. One
//! leading `/` is stripped before splitting, so `"/a"` and `"a"` address the
//! same key and `""` addresses the key `""`.
//!
//! Writes are copy-on-write: the top-level object and every container on the
//! path are copied, everything else is shared with the input.

use std::sync::Arc;

use crate::data::{DataModel, DataValue};

/// Split a bound path into its segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// Read the value at `path`. Returns `None` as soon as the walk hits a
/// missing key or a scalar with segments left.
pub fn get<'a>(model: &'a DataModel, path: &str) -> Option<&'a DataValue> {
    let mut segs = segments(path);
    let first = segs.next()?;
    let mut current = model.get_key(first)?;

    for seg in segs {
        current = match current {
            DataValue::Object(map) => map.get(seg)?,
            DataValue::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Return a new model with `value` stored at `path`.
///
/// Missing intermediate keys are created as empty objects, and an
/// intermediate scalar is replaced by an empty object. An array on the path
/// is descended into when the segment is an in-bounds index; otherwise it is
/// replaced like a scalar.
pub fn set(model: &DataModel, path: &str, value: DataValue) -> DataModel {
    let mut segs = segments(path);
    let head = segs.next().unwrap_or_default();
    let rest: Vec<&str> = segs.collect();

    let mut next = model.clone();
    let slot = next.root_mut().entry(head.to_string()).or_default();
    assign(slot, &rest, value);
    next
}

fn assign(target: &mut DataValue, segs: &[&str], value: DataValue) {
    let Some((head, rest)) = segs.split_first() else {
        *target = value;
        return;
    };

    if let DataValue::Array(items) = target {
        if let Some(index) = head.parse::<usize>().ok().filter(|i| *i < items.len()) {
            let items = Arc::make_mut(items);
            assign(&mut items[index], rest, value);
            return;
        }
    }

    if !target.is_object() {
        *target = DataValue::empty_object();
    }

    if let DataValue::Object(map) = target {
        let slot = Arc::make_mut(map).entry((*head).to_string()).or_default();
        assign(slot, rest, value);
    }
}
