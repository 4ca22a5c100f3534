//! WKB encoding of feature geometries.

use geosketch_types::Geom;
use geozero::wkb::Wkb;
use geozero::{CoordDimensions, ToGeo, ToWkb};

use crate::error::EditError;

/// Decodes a geometry from its stored WKB bytes.
pub fn from_wkb(bytes: &[u8]) -> Result<Geom, EditError> {
    let geometry = Wkb(bytes.to_vec())
        .to_geo()
        .map_err(|e| EditError::Wkb(e.to_string()))?;
    Geom::try_from(geometry).map_err(|e| EditError::Wkb(e.to_string()))
}

/// Encodes a geometry into WKB bytes.
pub fn to_wkb(geom: &Geom) -> Result<Vec<u8>, EditError> {
    let geometry: geo_types::Geometry<f64> = geom.clone().into();
    geometry
        .to_wkb(CoordDimensions::xy())
        .map_err(|e| EditError::Wkb(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosketch_types::latlon;

    #[test]
    fn polygon_round_trip() {
        let geom = Geom::polygon_from(&[
            latlon!(45.0, 11.0),
            latlon!(45.2, 11.1),
            latlon!(45.0, 11.2),
        ])
        .expect("valid polygon input");

        let bytes = to_wkb(&geom).expect("wkb encoding");
        assert_eq!(from_wkb(&bytes).expect("wkb decoding"), geom);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(from_wkb(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }
}
