//! Capabilities: an ability on a resource, optionally narrowed by caveats.

use cairn_encoding::{Map, Value};

use crate::error::UcanError;

/// A permitted action on a named resource.
///
/// Matching is literal: `*` in either position has no wildcard meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    can: String,
    with: String,
    nb: Option<Map>,
}

impl Capability {
    /// Ability `can` on resource `with`, without caveats.
    pub fn new(can: impl Into<String>, with: impl Into<String>) -> Self {
        Self {
            can: can.into(),
            with: with.into(),
            nb: None,
        }
    }

    /// Attach caveats.
    #[must_use]
    pub fn with_caveats(mut self, nb: Map) -> Self {
        self.nb = Some(nb);
        self
    }

    /// The ability, e.g. `upload/add`.
    pub fn can(&self) -> &str {
        &self.can
    }

    /// The resource, usually a DID.
    pub fn with(&self) -> &str {
        &self.with
    }

    /// The caveats, if any.
    pub fn caveats(&self) -> Option<&Map> {
        self.nb.as_ref()
    }

    /// Does this capability cover `can`, on `with` when one is given?
    pub fn matches(&self, can: &str, with: Option<&str>) -> bool {
        self.can == can && with.is_none_or(|with| self.with == with)
    }

    /// Canonical object form, keys `can`, `nb`, `with`.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new().with("can", self.can.as_str());
        if let Some(nb) = &self.nb {
            map.insert("nb", nb.clone());
        }
        map.with("with", self.with.as_str()).into()
    }

    /// Read the canonical object form.
    pub fn from_value(value: &Value) -> Result<Self, UcanError> {
        let map = value.as_map().ok_or(UcanError::InvalidField {
            field: "att",
            reason: "capability is not a map",
        })?;
        let text = |key: &'static str| {
            map.get(key)
                .ok_or(UcanError::MissingField(key))?
                .as_text()
                .map(str::to_owned)
                .ok_or(UcanError::InvalidField {
                    field: key,
                    reason: "expected text",
                })
        };
        let nb = match map.get("nb") {
            None => None,
            Some(nb) => Some(nb.as_map().cloned().ok_or(UcanError::InvalidField {
                field: "nb",
                reason: "expected a map",
            })?),
        };
        Ok(Self {
            can: text("can")?,
            with: text("with")?,
            nb,
        })
    }
}
