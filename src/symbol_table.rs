use crate::Encoding;
use smallvec::SmallVec;
use std::{cell::RefCell, collections::HashMap, convert::TryFrom};

/// Append-only storage of interned symbol names.
///
/// Names live back to back in one byte store; `startpos_list` holds one more
/// entry than there are symbols, so name `i` spans
/// `startpos_list[i]..startpos_list[i + 1]`. `index` maps each name to the
/// encodings it was interned under.
pub(crate) struct SymbolTable {
    startpos_list: RefCell<Vec<usize>>,
    data_store: RefCell<Vec<u8>>,
    encodings: RefCell<Vec<Encoding>>,
    index: RefCell<HashMap<Vec<u8>, SmallVec<[(Encoding, u32); 1]>>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable {
            startpos_list: RefCell::new(vec![0]),
            data_store: RefCell::new(Vec::default()),
            encodings: RefCell::new(Vec::default()),
            index: RefCell::new(HashMap::default()),
        }
    }
}

impl SymbolTable {
    pub(crate) fn len(&self) -> usize {
        self.encodings.borrow().len()
    }

    /// Returns the index of `name` under `encoding`, appending it first if
    /// it is not registered yet.
    pub(crate) fn intern(&self, name: &[u8], encoding: Encoding) -> u32 {
        let mut index = self.index.borrow_mut();
        if let Some(entries) = index.get(name) {
            if let Some(&(_, idx)) = entries.iter().find(|(enc, _)| *enc == encoding) {
                return idx;
            }
        }
        let idx = u32::try_from(self.len()).unwrap();
        let mut data_store = self.data_store.borrow_mut();
        data_store.extend_from_slice(name);
        self.startpos_list.borrow_mut().push(data_store.len());
        self.encodings.borrow_mut().push(encoding);
        index.entry(name.to_vec()).or_default().push((encoding, idx));
        idx
    }

    pub(crate) fn with_existing_name<F, T>(&self, idx: u32, f: F) -> T
    where
        F: FnOnce(&[u8], Encoding) -> T,
    {
        let idx = idx as usize;
        let range = {
            let startpos_list = self.startpos_list.borrow();
            startpos_list[idx]..startpos_list[idx + 1]
        };
        let encoding = self.encodings.borrow()[idx];
        let data_store = self.data_store.borrow();
        f(&data_store[range], encoding)
    }
}

thread_local! {
    pub(crate) static THREAD_SYMBOL_TABLE: SymbolTable = SymbolTable::default();
}
