use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::schema::UnitDef;

/// Registry of affine unit conversions to canonical SI.
///
/// `si = raw * to_si_mult + to_si_offset`. Offsets are nonzero for scale
/// units (degree Celsius), so the inverse must subtract before dividing.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: BTreeMap<String, UnitDef>,
}

impl UnitRegistry {
    pub fn new(defs: impl IntoIterator<Item = UnitDef>) -> Self {
        Self {
            units: defs.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    pub fn get(&self, unit_id: &str) -> Result<&UnitDef, ModelError> {
        self.units
            .get(unit_id)
            .ok_or_else(|| ModelError::UnknownUnit(unit_id.to_string()))
    }

    /// Convert a raw value in `unit_id` to canonical SI.
    pub fn convert(&self, unit_id: &str, raw: f64) -> Result<f64, ModelError> {
        let unit = self.get(unit_id)?;
        Ok(raw * unit.to_si_mult + unit.to_si_offset)
    }

    /// Re-express a canonical SI value in `unit_id`. Exact inverse affine.
    pub fn invert(&self, unit_id: &str, si: f64) -> Result<f64, ModelError> {
        let unit = self.get(unit_id)?;
        Ok((si - unit.to_si_offset) / unit.to_si_mult)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::QuantityKind;
    use proptest::prelude::*;

    fn unit(id: &str, kind: QuantityKind, mult: f64, offset: f64) -> UnitDef {
        UnitDef {
            id: id.into(),
            name: id.into(),
            kind,
            si_unit: "X".into(),
            to_si_mult: mult,
            to_si_offset: offset,
            authority_url: None,
        }
    }

    fn registry() -> UnitRegistry {
        UnitRegistry::new([
            unit("U_eV", QuantityKind::Energy, 1.602176634e-19, 0.0),
            unit("U_C", QuantityKind::Temperature, 1.0, 273.15),
            unit("U_K", QuantityKind::Temperature, 1.0, 0.0),
        ])
    }

    #[test]
    fn energy_is_multiplier_only() {
        let r = registry();
        assert_eq!(r.convert("U_eV", 1.0).unwrap(), 1.602176634e-19);
    }

    #[test]
    fn temperature_offset_is_applied() {
        let r = registry();
        // -273.15 degC is absolute zero, exactly 0 K
        assert_eq!(r.convert("U_C", -273.15).unwrap(), 0.0);
        assert_eq!(r.convert("U_C", 0.0).unwrap(), 273.15);
        assert_eq!(r.convert("U_K", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn invert_subtracts_offset_first() {
        let r = registry();
        assert_eq!(r.invert("U_C", 0.0).unwrap(), -273.15);
        assert_eq!(r.invert("U_C", 273.15).unwrap(), 0.0);
    }

    #[test]
    fn unknown_unit_is_an_error() {
        let r = registry();
        let err = r.convert("U_X", 1.0).unwrap_err();
        assert_eq!(err, ModelError::UnknownUnit("U_X".into()));
        assert_eq!(r.invert("U_X", 1.0).unwrap_err().kind(), "unknown_unit");
    }

    // (to_si_mult, to_si_offset) pairs as they occur in real unit tables:
    // J, eV, ft-lbf, kcal, degC, degF
    const AFFINE_FORMS: [(f64, f64); 6] = [
        (1.0, 0.0),
        (1.602176634e-19, 0.0),
        (1.3558179483314, 0.0),
        (4184.0, 0.0),
        (1.0, 273.15),
        (0.5555555555555556, 255.37222222222223),
    ];

    proptest! {
        // convert then invert recovers the raw value within float tolerance,
        // for multiplier-only and offset units alike
        #[test]
        fn round_trip(raw in -1e6f64..1e6, form in 0usize..AFFINE_FORMS.len()) {
            let (mult, offset) = AFFINE_FORMS[form];
            let r = UnitRegistry::new([unit("U_t", QuantityKind::Energy, mult, offset)]);
            let si = r.convert("U_t", raw).unwrap();
            let back = r.invert("U_t", si).unwrap();
            prop_assert!((back - raw).abs() <= 1e-9 * raw.abs().max(1.0));
        }
    }
}
