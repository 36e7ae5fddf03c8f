// Klass Shallow Copy
// Copies each source's entries onto a target, later sources winning

use crate::runtime::{PropertyMap, Value};

/// With `keep_nullish` unset, nullish values and zero-length strings/arrays are skipped
pub fn copy_into<'a>(
    target: &'a mut PropertyMap,
    sources: &[&PropertyMap],
    keep_nullish: bool,
) -> &'a mut PropertyMap {
    for source in sources {
        for (key, value) in source.iter() {
            if keep_nullish || is_substantial(value) {
                target.insert(key.clone(), value.clone());
            }
        }
    }
    target
}

fn is_substantial(value: &Value) -> bool {
    !value.is_nullish() && value.length() != Some(0)
}
