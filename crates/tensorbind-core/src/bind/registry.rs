use std::collections::HashMap;

use super::field::FieldSlot;

/// Destination record whose fields are bound to named outputs.
///
/// Implementations register each bound field once, in declaration order.
/// The `tensor_record!` macro writes this impl from a field/name listing.
///
/// # Examples
/// ```
/// use tensorbind_core::{FieldRegistry, TensorRecord};
///
/// #[derive(Default)]
/// struct Scores {
///     score: f32,
///     labels: Vec<String>,
/// }
///
/// impl TensorRecord for Scores {
///     fn register_fields<'a>(&'a mut self, registry: &mut FieldRegistry<'a>) {
///         registry.register("score", &mut self.score);
///         registry.register("labels", &mut self.labels);
///     }
/// }
///
/// let mut scores = Scores::default();
/// let registry = FieldRegistry::build(&mut scores);
/// assert!(registry.contains("score"));
/// assert_eq!(registry.len(), 2);
/// ```
pub trait TensorRecord {
    fn register_fields<'a>(&'a mut self, registry: &mut FieldRegistry<'a>);
}

/// Output name to field slot mapping for one decode call.
///
/// Empty names are ignored and never looked up. When two fields claim the
/// same name, the one registered last wins.
#[derive(Default)]
pub struct FieldRegistry<'a> {
    slots: HashMap<String, &'a mut dyn FieldSlot>,
}

impl<'a> FieldRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<R: TensorRecord + ?Sized>(record: &'a mut R) -> Self {
        let mut registry = Self::new();
        record.register_fields(&mut registry);
        registry
    }

    pub fn register<F: FieldSlot + 'a>(&mut self, name: &str, field: &'a mut F) {
        self.register_slot(name, field);
    }

    pub fn register_slot(&mut self, name: &str, slot: &'a mut dyn FieldSlot) {
        if name.is_empty() {
            return;
        }
        if self.slots.insert(name.to_string(), slot).is_some() {
            tracing::debug!(name, "output name claimed by more than one field, last one wins");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn slot(&mut self, name: &str) -> Option<&mut (dyn FieldSlot + 'a)> {
        self.slots.get_mut(name).map(|slot| &mut **slot)
    }

    /// Bound output names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Implement `TensorRecord` by listing `field: "output name"` pairs.
///
/// Fields left out of the listing, or bound to `""`, are ignored.
///
/// # Examples
/// ```
/// use tensorbind_core::{FieldRegistry, tensor_record};
///
/// #[derive(Default)]
/// struct Detection {
///     boxes: Vec<Vec<f32>>,
///     count: i32,
///     note: String,
/// }
///
/// tensor_record!(Detection {
///     boxes: "detection_boxes",
///     count: "num_detections",
///     note: "",
/// });
///
/// let mut detection = Detection::default();
/// let registry = FieldRegistry::build(&mut detection);
/// assert_eq!(registry.names(), vec!["detection_boxes", "num_detections"]);
/// ```
#[macro_export]
macro_rules! tensor_record {
    ($ty:ty { $($field:ident : $name:expr),* $(,)? }) => {
        impl $crate::TensorRecord for $ty {
            #[allow(unused_variables)]
            fn register_fields<'a>(&'a mut self, registry: &mut $crate::FieldRegistry<'a>) {
                $( registry.register($name, &mut self.$field); )*
            }
        }
    };
}
