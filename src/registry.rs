// Klass Class Registry
// Identifier -> class handle for the current thread. Handles are Rc-based, so
// each thread sees its own registry; it is created on first use and lives until
// the thread ends or `clear` is called.

use crate::class::ClassHandle;
use crate::runtime::Value;
use rand::Rng;
use rustc_hash::FxHashMap;
use std::cell::RefCell;

pub const DEFAULT_DELIMITER: &str = ".";

thread_local! {
    static CLASSES: RefCell<FxHashMap<String, ClassHandle>> = RefCell::new(FxHashMap::default());
}

/// Store `class` under `id`. An existing entry is only replaced when
/// `overwrite` is set; returns whether the class was stored.
pub fn register(id: &str, class: &ClassHandle, overwrite: bool) -> bool {
    CLASSES.with(|classes| {
        let mut classes = classes.borrow_mut();
        if overwrite || !classes.contains_key(id) {
            classes.insert(id.to_string(), class.clone());
            true
        } else {
            false
        }
    })
}

/// Exact identifier lookup, no path walking
pub fn lookup(id: &str) -> Option<ClassHandle> {
    CLASSES.with(|classes| classes.borrow().get(id).cloned())
}

pub fn contains(id: &str) -> bool {
    CLASSES.with(|classes| classes.borrow().contains_key(id))
}

pub fn remove(id: &str) -> Option<ClassHandle> {
    CLASSES.with(|classes| classes.borrow_mut().remove(id))
}

pub fn clear() {
    CLASSES.with(|classes| classes.borrow_mut().clear());
}

pub fn ids() -> Vec<String> {
    let mut ids: Vec<String> = CLASSES.with(|classes| classes.borrow().keys().cloned().collect());
    ids.sort();
    ids
}

pub fn get(path: &str) -> Option<Value> {
    get_with_delimiter(path, DEFAULT_DELIMITER)
}

/// Walk `path`: the first segment names a registered class, later segments
/// name members of the value reached so far. Stops at the first missing segment.
pub fn get_with_delimiter(path: &str, delimiter: &str) -> Option<Value> {
    let mut segments = path.split(delimiter);
    let root = lookup(segments.next()?)?;
    segments.try_fold(Value::Class(root), |current, segment| current.member(segment))
}

/// `get`, keeping only results that are classes
pub fn get_class(path: &str) -> Option<ClassHandle> {
    match get(path)? {
        Value::Class(class) => Some(class),
        _ => None,
    }
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Fresh `class#<token>` identifier not present in the registry
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    loop {
        let id = format!("class#{}", base36(rng.random::<u64>()));
        if !contains(&id) {
            return id;
        }
    }
}
