//! Utils for merging things

use std::collections::BTreeMap;

/// Trait for merging a new layer of config
pub trait ApplyLayer
where
    Self: Sized,
{
    /// The much more Option-ridden version of this config
    /// that can be repeatedly layered with options
    type Layer;

    /// Merges this value with another layer of itself, preferring the new layer
    fn apply_layer(&mut self, layer: Self::Layer);
}

/// Extension trait to provide apply_val
pub trait ApplyValExt
where
    Self: Sized,
{
    /// Merges a `T` with an `Option<T>`
    ///
    /// Overwrites the lhs if the rhs is Some
    fn apply_val(&mut self, layer: Option<Self>);
}
impl<T> ApplyValExt for T {
    fn apply_val(&mut self, layer: Option<Self>) {
        if let Some(val) = layer {
            *self = val;
        }
    }
}

/// Extension trait to provide apply_opt
pub trait ApplyOptExt
where
    Self: Sized,
{
    /// Merges an `Option<T>` with an `Option<T>`
    ///
    /// Overwrites the lhs if the rhs is Some
    fn apply_opt(&mut self, layer: Self);
}
impl<T> ApplyOptExt for Option<T> {
    fn apply_opt(&mut self, layer: Self) {
        if let Some(val) = layer {
            *self = Some(val);
        }
    }
}

/// Extension trait to provide apply_entries
pub trait ApplyEntriesExt {
    /// the map
    type Map;
    /// Merges a map with an optional map, key by key
    ///
    /// Keys in the rhs replace keys in the lhs, everything else is kept
    fn apply_entries(&mut self, layer: Option<Self::Map>);
}
impl<K: Ord, V> ApplyEntriesExt for BTreeMap<K, V> {
    type Map = BTreeMap<K, V>;
    fn apply_entries(&mut self, layer: Option<Self::Map>) {
        if let Some(entries) = layer {
            self.extend(entries);
        }
    }
}
