// Klass Listener Registry
// Ordered before/after hook lists per method name

use crate::runtime::Callable;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;

pub type ListenerList = SmallVec<[Callable; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Runs ahead of the method body; answering `false` vetoes the body
    Before,
    /// Runs after the body (or the veto) and sees the result
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Before => write!(f, "before"),
            Phase::After => write!(f, "after"),
        }
    }
}

#[derive(Default)]
pub struct ListenerRegistry {
    before: FxHashMap<String, ListenerList>,
    after: FxHashMap<String, ListenerList>,
}

impl ListenerRegistry {
    fn phase(&self, phase: Phase) -> &FxHashMap<String, ListenerList> {
        match phase {
            Phase::Before => &self.before,
            Phase::After => &self.after,
        }
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut FxHashMap<String, ListenerList> {
        match phase {
            Phase::Before => &mut self.before,
            Phase::After => &mut self.after,
        }
    }

    pub fn add(&mut self, phase: Phase, name: &str, listener: Callable) {
        self.phase_mut(phase)
            .entry(name.to_string())
            .or_default()
            .push(listener);
    }

    /// Drop every entry identical to `listener`; unknown listeners are ignored
    pub fn remove(&mut self, phase: Phase, name: &str, listener: &Callable) {
        if let Some(list) = self.phase_mut(phase).get_mut(name) {
            list.retain(|registered| !registered.ptr_eq(listener));
        }
    }

    pub fn get(&self, phase: Phase, name: &str) -> ListenerList {
        self.phase(phase).get(name).cloned().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.before.clear();
        self.after.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Value;

    fn listener(name: &str) -> Callable {
        Callable::native(name, |_, _| Ok(Value::Undefined))
    }

    #[test]
    fn test_add_keeps_registration_order() {
        let mut registry = ListenerRegistry::default();
        registry.add(Phase::Before, "run", listener("a"));
        registry.add(Phase::Before, "run", listener("b"));

        let names: Vec<String> = registry
            .get(Phase::Before, "run")
            .iter()
            .map(|l| l.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(registry.get(Phase::After, "run").is_empty());
    }

    #[test]
    fn test_remove_by_identity() {
        let mut registry = ListenerRegistry::default();
        let keep = listener("same");
        let drop = listener("same");
        registry.add(Phase::After, "run", keep.clone());
        registry.add(Phase::After, "run", drop.clone());
        registry.add(Phase::After, "run", drop.clone());

        registry.remove(Phase::After, "run", &drop);
        let left = registry.get(Phase::After, "run");
        assert_eq!(left.len(), 1);
        assert!(left[0].ptr_eq(&keep));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut registry = ListenerRegistry::default();
        registry.remove(Phase::Before, "missing", &listener("x"));
        registry.add(Phase::Before, "run", listener("x"));
        registry.remove(Phase::Before, "run", &listener("x"));
        assert_eq!(registry.get(Phase::Before, "run").len(), 1);
    }
}
