use crate::error::Result;
use crate::gadget::CheckBitLength;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

/// Memoizes one `CheckBitLength` instance per bit width. The constraint system only depends on
/// the width, so instances are built once and shared.
#[derive(Debug, Default)]
pub struct Cache {
    gadgets: Mutex<BTreeMap<usize, Arc<CheckBitLength>>>,
}

impl Cache {
    pub fn get(&self, bits: usize) -> Result<Arc<CheckBitLength>> {
        let mut gadgets = self.gadgets.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(gadget) = gadgets.get(&bits) {
            return Ok(gadget.clone());
        }
        let gadget = Arc::new(CheckBitLength::new(bits)?);
        gadgets.insert(bits, gadget.clone());
        Ok(gadget)
    }

    pub fn len(&self) -> usize {
        self.gadgets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub static CACHE: LazyLock<Cache> = LazyLock::new(Cache::default);
