//! Filtered, restartable views over the properties of a grid.

use std::marker::PhantomData;

use resq_core::{EntityId, IndexableElement};

use crate::kind::{Facet, PropertyKind};
use crate::property::Property;

/// Criteria a property must meet to be selected. Unset fields match
/// anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    /// Required kind.
    pub kind: Option<PropertyKind>,
    /// Required facet.
    pub facet: Option<Facet>,
    /// Required domain.
    pub domain: Option<IndexableElement>,
    /// Required time index.
    pub time_index: Option<u32>,
    /// Required realization.
    pub realization: Option<u32>,
}

impl PropertyFilter {
    /// A filter matching every property.
    pub fn any() -> Self {
        Self::default()
    }

    /// Require `kind`.
    pub fn kind(mut self, kind: PropertyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Require `facet`.
    pub fn facet(mut self, facet: Facet) -> Self {
        self.facet = Some(facet);
        self
    }

    /// Require `domain`.
    pub fn domain(mut self, domain: IndexableElement) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Require `time_index`.
    pub fn time_index(mut self, time_index: u32) -> Self {
        self.time_index = Some(time_index);
        self
    }

    /// Require `realization`.
    pub fn realization(mut self, realization: u32) -> Self {
        self.realization = Some(realization);
        self
    }

    /// `true` if `property` meets every set criterion.
    pub fn matches(&self, property: &Property) -> bool {
        let spec = property.spec();
        self.kind.is_none_or(|k| k == spec.kind)
            && self.facet.is_none_or(|f| Some(f) == spec.facet)
            && self.domain.is_none_or(|d| d == spec.domain)
            && self.time_index.is_none_or(|t| Some(t) == spec.time_index)
            && self.realization.is_none_or(|r| Some(r) == spec.realization)
    }
}

/// The properties of one grid matching a filter.
///
/// A selection holds a cloneable source iterator rather than results, so
/// every call to [`iter`](Selection::iter) starts over and sees the
/// source in its original (insertion) order.
#[derive(Clone, Debug)]
pub struct Selection<'a, I> {
    source: I,
    grid: EntityId,
    filter: PropertyFilter,
    _marker: PhantomData<&'a Property>,
}

impl<'a, I> Selection<'a, I>
where
    I: Iterator<Item = &'a Property> + Clone,
{
    /// Select from `source` the properties attached to `grid` that match
    /// `filter`.
    pub fn new(grid: EntityId, filter: PropertyFilter, source: I) -> Self {
        Self {
            source,
            grid,
            filter,
            _marker: PhantomData,
        }
    }

    /// The grid being selected from.
    pub fn grid(&self) -> EntityId {
        self.grid
    }

    /// The filter in use.
    pub fn filter(&self) -> &PropertyFilter {
        &self.filter
    }

    /// Iterate matches from the start.
    pub fn iter(&self) -> impl Iterator<Item = &'a Property> + '_ {
        self.source
            .clone()
            .filter(move |p| p.grid() == self.grid && self.filter.matches(p))
    }

    /// Number of matches.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// `true` when nothing matches.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// First match in insertion order.
    pub fn first(&self) -> Option<&'a Property> {
        self.iter().next()
    }
}
