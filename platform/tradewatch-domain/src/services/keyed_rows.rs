use crate::value_objects::filter::SideFilter;
use crate::value_objects::side::Side;
use std::collections::HashMap;

pub trait KeyedRow {
    fn key(&self) -> &str;
    fn side(&self) -> Option<Side>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upserted {
    pub row: usize,
    pub inserted: bool,
}

/// Rows keyed by symbol. Updates overwrite in place, new keys append, so iteration follows
/// first-seen order.
#[derive(Debug, Clone)]
pub struct KeyedRows<R> {
    rows: Vec<R>,
    index: HashMap<String, usize>,
}

impl<R> Default for KeyedRows<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R: KeyedRow> KeyedRows<R> {
    pub fn upsert(&mut self, row: R) -> Upserted {
        if let Some(&position) = self.index.get(row.key()) {
            self.rows[position] = row;
            return Upserted {
                row: position,
                inserted: false,
            };
        }
        let position = self.rows.len();
        self.index.insert(row.key().to_string(), position);
        self.rows.push(row);
        Upserted {
            row: position,
            inserted: true,
        }
    }

    pub fn get(&self, key: &str) -> Option<&R> {
        self.index.get(key).map(|&position| &self.rows[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn filtered(&self, filter: SideFilter) -> impl Iterator<Item = &R> + '_ {
        self.rows.iter().filter(move |row| filter.matches(row.side()))
    }
}
