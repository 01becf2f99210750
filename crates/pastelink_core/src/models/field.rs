//! Three-state field updates for partial patches.

use serde::{Deserialize, Deserializer};

/// Update intent for a single patch field.
///
/// A plain `Option` cannot tell "leave this field alone" apart from "reset
/// it", so patch payloads use three states instead: a field absent from the
/// JSON body is `Keep`, an explicit `null` is `Clear` (reset to the field's
/// default), and any other value is `Set`.
///
/// Fields of this type must carry `#[serde(default)]` so that absent keys
/// deserialize to `Keep`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Field absent from the patch; existing value is preserved.
    #[default]
    Keep,
    /// Field explicitly `null`; value resets to the field's default.
    Clear,
    /// Field set to a new value.
    Set(T),
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        })
    }
}
