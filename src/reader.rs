//!
//! Streaming row sources feeding the bulk-load channel.
//!
use std::mem;

use crate::mapping::EntityMapping;
use crate::value::Value;

/// A single-pass, forward-only sequence of rows. Consumed exactly once per
/// insert call; implementations must not buffer the full collection.
pub trait RowSource {
    fn field_count(&self) -> usize;

    /// The next row, one value per column in mapping order, or `None` when
    /// the sequence is exhausted.
    fn next_row(&mut self) -> Option<Vec<Value>>;
}

/// Adapts an item iterator into a row stream through the mapping's property
/// getters.
pub struct EntityReader<'a, T, I> {
    items: I,
    mapping: &'a EntityMapping<T>,
}

impl<'a, T, I> EntityReader<'a, T, I>
where
    I: Iterator<Item = &'a T>,
    T: 'a,
{
    pub fn new(items: I, mapping: &'a EntityMapping<T>) -> Self {
        EntityReader { items, mapping }
    }
}

impl<'a, T, I> RowSource for EntityReader<'a, T, I>
where
    I: Iterator<Item = &'a T>,
    T: 'a,
{
    fn field_count(&self) -> usize {
        self.mapping.columns().len()
    }

    fn next_row(&mut self) -> Option<Vec<Value>> {
        self.items
            .next()
            .map(|item| self.mapping.columns().iter().map(|c| c.get(item)).collect())
    }
}

/// Projects an inner source down to a subset of its columns, in the order
/// given by `indices`. Used to stream only key/updated columns into a
/// staging table.
pub(crate) struct ProjectedSource<'a> {
    inner: &'a mut dyn RowSource,
    indices: Vec<usize>,
}

impl<'a> ProjectedSource<'a> {
    pub(crate) fn new(inner: &'a mut dyn RowSource, indices: Vec<usize>) -> Self {
        ProjectedSource { inner, indices }
    }
}

impl RowSource for ProjectedSource<'_> {
    fn field_count(&self) -> usize {
        self.indices.len()
    }

    fn next_row(&mut self) -> Option<Vec<Value>> {
        self.inner.next_row().map(|mut row| {
            self.indices
                .iter()
                .map(|&i| mem::replace(&mut row[i], Value::Null))
                .collect()
        })
    }
}
