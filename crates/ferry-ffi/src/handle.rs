//! Generation-checked handle table for values owned across the C boundary.
//!
//! C callers hold `u64` handles instead of Rust pointers. A handle packs a
//! slot index (upper 32 bits) and the slot's generation (lower 32 bits);
//! removing a value bumps the generation, so a stale or double-destroyed
//! handle resolves to `None` instead of to whatever reused the slot.

/// A decoded handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Key {
    slot: u32,
    generation: u32,
}

impl Key {
    fn pack(self) -> u64 {
        (u64::from(self.slot) << 32) | u64::from(self.generation)
    }

    fn unpack(handle: u64) -> Self {
        Self {
            slot: (handle >> 32) as u32,
            generation: handle as u32,
        }
    }
}

enum Entry<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
    /// Generation space exhausted; never handed out again.
    Retired,
}

/// Slot table mapping `u64` handles to owned values.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> HandleTable<T> {
    /// An empty table, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        self.live += 1;
        while let Some(slot) = self.free.pop() {
            let Some(entry) = self.entries.get_mut(slot as usize) else {
                continue;
            };
            if let Entry::Vacant { generation } = *entry {
                *entry = Entry::Occupied { generation, value };
                return Key { slot, generation }.pack();
            }
        }
        let slot = self.entries.len() as u32;
        self.entries.push(Entry::Occupied {
            generation: 0,
            value,
        });
        Key {
            slot,
            generation: 0,
        }
        .pack()
    }

    /// The value behind `handle`, or `None` if stale or never issued.
    #[cfg(test)]
    pub fn get(&self, handle: u64) -> Option<&T> {
        let key = Key::unpack(handle);
        match self.entries.get(key.slot as usize)? {
            Entry::Occupied { generation, value } if *generation == key.generation => Some(value),
            _ => None,
        }
    }

    /// Mutable access to the value behind `handle`.
    pub fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        let key = Key::unpack(handle);
        match self.entries.get_mut(key.slot as usize)? {
            Entry::Occupied { generation, value } if *generation == key.generation => Some(value),
            _ => None,
        }
    }

    /// Take the value behind `handle` out of the table.
    ///
    /// The slot's generation advances so `handle` goes stale. A slot whose
    /// generation would wrap to zero is retired rather than recycled, so an
    /// ancient handle can never match a new occupant.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let key = Key::unpack(handle);
        let entry = self.entries.get_mut(key.slot as usize)?;
        match entry {
            Entry::Occupied { generation, .. } if *generation == key.generation => {}
            _ => return None,
        }
        let next = key.generation.wrapping_add(1);
        let replacement = if next == 0 {
            Entry::Retired
        } else {
            Entry::Vacant { generation: next }
        };
        let Entry::Occupied { value, .. } = std::mem::replace(entry, replacement) else {
            return None;
        };
        if next != 0 {
            self.free.push(key.slot);
        }
        self.live -= 1;
        Some(value)
    }

    /// Number of values currently stored.
    pub fn len(&self) -> usize {
        self.live
    }
}
