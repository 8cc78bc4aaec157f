//! Per-kind free-list allocator with an id index for network release.
//!
//! Every instance the pool ever creates lives in one slot vector; a
//! [`Handle`] is the slot index plus a generation that is bumped on release,
//! so a handle kept past its release is detected instead of aliasing the
//! next occupant. Free lists are FIFO: the instance released first is the
//! first one handed out again.

use std::collections::{HashMap, VecDeque};

use glam::Vec2;

/// Hooks the pool calls when an instance changes hands.
pub trait Poolable {
    fn on_acquire(&mut self, position: Vec2, rotation: f32);
    fn on_release(&mut self);
}

pub type Template<T> = Box<dyn Fn() -> T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("no pool registered for kind {kind:?}")]
    UnknownKind { kind: String },
    #[error("no active instance with id {id}")]
    ReleaseNotFound { id: u16 },
    #[error("handle {0:?} does not refer to an active instance")]
    StaleHandle(Handle),
}

#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub instantiated: u64,
    pub grown_beyond_prewarm: u64,
    pub acquired: u64,
    pub released: u64,
    pub discarded: u64,
}

struct Slot<T> {
    kind: String,
    generation: u32,
    active: bool,
    id: Option<u16>,
    value: T,
}

enum Entry<T> {
    Occupied(Slot<T>),
    Vacant { generation: u32 },
}

struct KindEntry<T> {
    template: Template<T>,
    free: VecDeque<u32>,
    prewarm: usize,
    instantiated: usize,
}

pub struct ObjectPool<T> {
    slots: Vec<Entry<T>>,
    vacant: Vec<u32>,
    kinds: HashMap<String, KindEntry<T>>,
    active_by_id: HashMap<u16, Handle>,
    active_count: usize,
    stats: PoolStats,
}

impl<T: Poolable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Poolable> ObjectPool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            kinds: HashMap::new(),
            active_by_id: HashMap::new(),
            active_count: 0,
            stats: PoolStats::default(),
        }
    }

    /// Registers a kind and pre-creates `prewarm` inactive instances.
    /// Registering a kind twice keeps the first registration.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        template: impl Fn() -> T + 'static,
        prewarm: usize,
    ) {
        let kind = kind.into();
        if self.kinds.contains_key(&kind) {
            return;
        }

        let mut entry = KindEntry {
            template: Box::new(template),
            free: VecDeque::with_capacity(prewarm),
            prewarm,
            instantiated: 0,
        };

        for _ in 0..prewarm {
            let value = (entry.template)();
            let index = insert_slot(&mut self.slots, &mut self.vacant, &kind, value);
            entry.free.push_back(index);
            entry.instantiated += 1;
            self.stats.instantiated += 1;
        }

        log::debug!("registered pool kind {kind:?} with {prewarm} prewarmed instances");
        self.kinds.insert(kind, entry);
    }

    /// Drops the kind's template and its idle instances. Instances still
    /// active are discarded when they are released.
    pub fn unregister(&mut self, kind: &str) -> bool {
        let Some(entry) = self.kinds.remove(kind) else {
            return false;
        };

        for index in entry.free {
            self.discard_slot(index);
        }
        true
    }

    pub fn acquire(&mut self, kind: &str, position: Vec2, rotation: f32) -> Result<Handle, PoolError> {
        let Some(entry) = self.kinds.get_mut(kind) else {
            log::error!("acquire from unregistered pool kind {kind:?}");
            return Err(PoolError::UnknownKind {
                kind: kind.to_string(),
            });
        };

        let index = match entry.free.pop_front() {
            Some(index) => index,
            None => {
                let value = (entry.template)();
                entry.instantiated += 1;
                self.stats.instantiated += 1;
                if entry.instantiated > entry.prewarm {
                    self.stats.grown_beyond_prewarm += 1;
                    log::debug!(
                        "pool kind {kind:?} grew to {} instances (prewarm {})",
                        entry.instantiated,
                        entry.prewarm
                    );
                }
                insert_slot(&mut self.slots, &mut self.vacant, kind, value)
            }
        };

        let Some(Entry::Occupied(slot)) = self.slots.get_mut(index as usize) else {
            log::error!("free list of {kind:?} points at vacant slot {index}");
            return Err(PoolError::StaleHandle(Handle {
                index,
                generation: 0,
            }));
        };
        slot.active = true;
        slot.value.on_acquire(position, rotation);

        self.active_count += 1;
        self.stats.acquired += 1;

        Ok(Handle {
            index,
            generation: slot.generation,
        })
    }

    pub fn release(&mut self, handle: Handle) -> Result<(), PoolError> {
        let slot = match self.slots.get_mut(handle.index as usize) {
            Some(Entry::Occupied(slot)) if slot.active && slot.generation == handle.generation => {
                slot
            }
            _ => return Err(PoolError::StaleHandle(handle)),
        };

        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.value.on_release();
        let id = slot.id.take();

        if let Some(id) = id {
            if self.active_by_id.get(&id) == Some(&handle) {
                self.active_by_id.remove(&id);
            }
        }
        self.active_count -= 1;
        self.stats.released += 1;

        let kind = slot.kind.clone();
        match self.kinds.get_mut(&kind) {
            Some(entry) => {
                entry.free.push_back(handle.index);
                Ok(())
            }
            None => {
                log::warn!("released instance of unregistered kind {kind:?}, discarding it");
                self.discard_slot(handle.index);
                Err(PoolError::UnknownKind { kind })
            }
        }
    }

    /// Makes an active instance addressable by a network id. A previous
    /// holder of the same id loses its binding.
    pub fn bind_id(&mut self, id: u16, handle: Handle) -> Result<(), PoolError> {
        if self.get(handle).is_none() {
            return Err(PoolError::StaleHandle(handle));
        }

        if let Some(previous) = self.active_by_id.insert(id, handle) {
            if previous != handle {
                log::warn!("bullet id {id} rebound while still active");
                if let Some(Entry::Occupied(slot)) = self.slots.get_mut(previous.index as usize) {
                    slot.id = None;
                }
            }
        }

        if let Entry::Occupied(slot) = &mut self.slots[handle.index as usize] {
            slot.id = Some(id);
        }
        Ok(())
    }

    pub fn release_by_id(&mut self, id: u16) -> Result<(), PoolError> {
        let Some(&handle) = self.active_by_id.get(&id) else {
            log::warn!("no active bullet found with id {id}");
            return Err(PoolError::ReleaseNotFound { id });
        };
        self.release(handle)
    }

    pub fn handle_by_id(&self, id: u16) -> Option<Handle> {
        self.active_by_id.get(&id).copied()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        match self.slots.get(handle.index as usize) {
            Some(Entry::Occupied(slot)) if slot.active && slot.generation == handle.generation => {
                Some(&slot.value)
            }
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.slots.get_mut(handle.index as usize) {
            Some(Entry::Occupied(slot)) if slot.active && slot.generation == handle.generation => {
                Some(&mut slot.value)
            }
            _ => None,
        }
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, entry)| match entry {
            Entry::Occupied(slot) if slot.active => Some((
                Handle {
                    index: index as u32,
                    generation: slot.generation,
                },
                &slot.value,
            )),
            _ => None,
        })
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                Entry::Occupied(slot) if slot.active => Some((
                    Handle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    &mut slot.value,
                )),
                _ => None,
            })
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn free_count(&self, kind: &str) -> usize {
        self.kinds.get(kind).map_or(0, |entry| entry.free.len())
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    fn discard_slot(&mut self, index: u32) {
        let generation = match &self.slots[index as usize] {
            Entry::Occupied(slot) => slot.generation.wrapping_add(1),
            Entry::Vacant { generation } => *generation,
        };
        self.slots[index as usize] = Entry::Vacant { generation };
        self.vacant.push(index);
        self.stats.discarded += 1;
    }
}

fn insert_slot<T>(slots: &mut Vec<Entry<T>>, vacant: &mut Vec<u32>, kind: &str, value: T) -> u32 {
    let mut slot = Slot {
        kind: kind.to_string(),
        generation: 0,
        active: false,
        id: None,
        value,
    };

    if let Some(index) = vacant.pop() {
        if let Entry::Vacant { generation } = slots[index as usize] {
            slot.generation = generation;
        }
        slots[index as usize] = Entry::Occupied(slot);
        index
    } else {
        slots.push(Entry::Occupied(slot));
        (slots.len() - 1) as u32
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug)]
    struct Dummy {
        serial: u32,
        position: Vec2,
        active: bool,
    }

    impl Poolable for Dummy {
        fn on_acquire(&mut self, position: Vec2, _rotation: f32) {
            self.position = position;
            self.active = true;
        }

        fn on_release(&mut self) {
            self.active = false;
        }
    }

    fn pool_with(kind: &str, prewarm: usize) -> ObjectPool<Dummy> {
        let counter = Rc::new(Cell::new(0));
        let mut pool = ObjectPool::new();
        pool.register(
            kind,
            move || {
                counter.set(counter.get() + 1);
                Dummy {
                    serial: counter.get(),
                    position: Vec2::ZERO,
                    active: false,
                }
            },
            prewarm,
        );
        pool
    }

    #[test]
    fn prewarm_fills_free_list() {
        let pool = pool_with("bullet", 8);
        assert_eq!(pool.free_count("bullet"), 8);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.stats().instantiated, 8);
    }

    #[test]
    fn register_is_idempotent() {
        let mut pool = pool_with("bullet", 2);
        pool.register(
            "bullet",
            || Dummy {
                serial: 999,
                position: Vec2::ZERO,
                active: false,
            },
            10,
        );
        assert_eq!(pool.free_count("bullet"), 2);

        let handle = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        assert_ne!(pool.get(handle).unwrap().serial, 999);
    }

    #[test]
    fn reuse_is_fifo_before_growth() {
        let mut pool = pool_with("bullet", 0);

        let a = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        let b = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        let serial_a = pool.get(a).unwrap().serial;
        let serial_b = pool.get(b).unwrap().serial;
        assert_eq!(pool.stats().grown_beyond_prewarm, 2);

        pool.release(a).unwrap();
        pool.release(b).unwrap();

        let first = pool.acquire("bullet", Vec2::new(1.0, 2.0), 0.0).unwrap();
        let second = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        assert_eq!(pool.get(first).unwrap().serial, serial_a);
        assert_eq!(pool.get(second).unwrap().serial, serial_b);
        assert_eq!(pool.get(first).unwrap().position, Vec2::new(1.0, 2.0));
        assert_eq!(pool.stats().instantiated, 2);
    }

    #[test]
    fn released_handle_goes_stale() {
        let mut pool = pool_with("bullet", 1);
        let handle = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        pool.release(handle).unwrap();

        assert_eq!(pool.release(handle), Err(PoolError::StaleHandle(handle)));
        assert!(pool.get(handle).is_none());

        let again = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        assert_eq!(again.index(), handle.index());
        assert_ne!(again, handle);
    }

    #[test]
    fn release_by_unknown_id_is_isolated() {
        let mut pool = pool_with("bullet", 2);
        let a = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        let b = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        pool.bind_id(10, a).unwrap();
        pool.bind_id(11, b).unwrap();

        assert_eq!(
            pool.release_by_id(42),
            Err(PoolError::ReleaseNotFound { id: 42 })
        );
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.handle_by_id(10), Some(a));
        assert_eq!(pool.handle_by_id(11), Some(b));

        pool.release_by_id(10).unwrap();
        assert_eq!(pool.handle_by_id(10), None);
        assert_eq!(
            pool.release_by_id(10),
            Err(PoolError::ReleaseNotFound { id: 10 })
        );
        assert!(pool.get(b).is_some());
    }

    #[test]
    fn local_release_unbinds_id() {
        let mut pool = pool_with("bullet", 1);
        let handle = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        pool.bind_id(3, handle).unwrap();
        pool.release(handle).unwrap();

        assert_eq!(pool.handle_by_id(3), None);
        assert!(!pool.iter_active().any(|_| true));
    }

    #[test]
    fn unregistered_kind_is_discarded_on_release() {
        let mut pool = pool_with("bullet", 1);
        let handle = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();

        assert!(pool.unregister("bullet"));
        assert_eq!(
            pool.release(handle),
            Err(PoolError::UnknownKind {
                kind: "bullet".to_string()
            })
        );
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.free_count("bullet"), 0);
        assert_eq!(pool.stats().discarded, 1);

        assert!(matches!(
            pool.acquire("bullet", Vec2::ZERO, 0.0),
            Err(PoolError::UnknownKind { .. })
        ));
    }

    #[test]
    fn kinds_keep_separate_free_lists() {
        let mut pool = pool_with("bullet", 1);
        pool.register(
            "spark",
            || Dummy {
                serial: 500,
                position: Vec2::ZERO,
                active: false,
            },
            0,
        );

        let spark = pool.acquire("spark", Vec2::ZERO, 0.0).unwrap();
        pool.release(spark).unwrap();
        assert_eq!(pool.free_count("spark"), 1);
        assert_eq!(pool.free_count("bullet"), 1);

        let bullet = pool.acquire("bullet", Vec2::ZERO, 0.0).unwrap();
        assert_ne!(pool.get(bullet).unwrap().serial, 500);
        assert!(pool.get(bullet).unwrap().active);
    }
}
