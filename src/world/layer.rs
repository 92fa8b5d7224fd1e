//! Collision layers and layer masks

use serde::{Deserialize, Serialize};

/// Collision layer a collider lives on (0..32).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u8);

impl LayerId {
    /// Default layer for terrain and props
    pub const DEFAULT: LayerId = LayerId(0);
    /// Layer for vegetation (branches)
    pub const VEGETATION: LayerId = LayerId(1);
    /// Layer for water volumes
    pub const WATER: LayerId = LayerId(4);

    /// Mask containing only this layer
    pub fn mask(self) -> LayerMask {
        LayerMask::from_layer(self)
    }
}

/// Set of layers, one bit per [`LayerId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    /// Only [`LayerId::DEFAULT`]
    pub const DEFAULT: LayerMask = LayerMask(1);

    pub fn from_layer(layer: LayerId) -> Self {
        if layer.0 >= 32 {
            return Self::NONE;
        }
        LayerMask(1 << layer.0)
    }

    pub fn from_layers(layers: &[LayerId]) -> Self {
        layers
            .iter()
            .fold(Self::NONE, |mask, layer| mask.with(*layer))
    }

    pub fn with(self, layer: LayerId) -> Self {
        LayerMask(self.0 | Self::from_layer(layer).0)
    }

    pub fn union(self, other: LayerMask) -> Self {
        LayerMask(self.0 | other.0)
    }

    pub fn contains(self, layer: LayerId) -> bool {
        self.0 & Self::from_layer(layer).0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_contains() {
        let mask = LayerMask::from_layers(&[LayerId::DEFAULT, LayerId::WATER]);
        assert!(mask.contains(LayerId::DEFAULT));
        assert!(mask.contains(LayerId::WATER));
        assert!(!mask.contains(LayerId::VEGETATION));
        assert_eq!(mask.0, 0b1_0001);
    }

    #[test]
    fn test_mask_with_union() {
        let mask = LayerMask::NONE.with(LayerId::VEGETATION);
        assert!(mask.contains(LayerId::VEGETATION));
        assert_eq!(mask.union(LayerMask::DEFAULT).0, 0b11);
    }

    #[test]
    fn test_out_of_range_layer() {
        assert!(LayerMask::from_layer(LayerId(40)).is_empty());
        assert!(!LayerMask::ALL.contains(LayerId(40)));
    }

    #[test]
    fn test_mask_serializes_as_number() {
        let json = serde_json::to_string(&LayerMask(5)).unwrap();
        assert_eq!(json, "5");
    }
}
