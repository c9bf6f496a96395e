//! Built-in canonical model: constructed vs. reality-constrained truth,
//! anchored on the electron rest energy and the Kelvin/Celsius scales.
//!
//! Constants and conversions follow NIST CODATA and the BIPM SI brochure;
//! authority URLs are carried on each record.

use crate::engine::TruthModel;
use crate::schema::ModelSchema;

pub const CANONICAL_TOML: &str = r#"
name = "Constructed vs. Reality-Constrained Truth"
description = "Electron rest energy across unit systems, plus the Kelvin/Celsius scale anchor. Edit a constant to watch claims and questions update."

# --- Units -----------------------------------------------------------------

[[units]]
id = "U_J"
name = "joule"
kind = "energy"
si_unit = "J"
to_si_mult = 1.0
authority_url = "https://www.bipm.org/en/measurement-units"

[[units]]
id = "U_eV"
name = "electronvolt"
kind = "energy"
si_unit = "J"
to_si_mult = 1.602176634e-19
authority_url = "https://physics.nist.gov/cgi-bin/cuu/Value?evj="

[[units]]
id = "U_ftlbf"
name = "foot-pound force"
kind = "energy"
si_unit = "J"
to_si_mult = 1.3558179483314
authority_url = "https://www.convertunits.com/from/ft-lbf/to/joule"

[[units]]
id = "U_K"
name = "kelvin"
kind = "temperature"
si_unit = "K"
to_si_mult = 1.0
authority_url = "https://www.bipm.org/documents/20126/41483022/SI-Brochure-9-concise-EN.pdf"

[[units]]
id = "U_C"
name = "degree Celsius"
kind = "temperature"
si_unit = "K"
to_si_mult = 1.0
to_si_offset = 273.15
authority_url = "https://www.bipm.org/documents/20126/41483022/SI-Brochure-9-concise-EN.pdf"

[[units]]
id = "U_kg"
name = "kilogram"
kind = "mass"
si_unit = "kg"
to_si_mult = 1.0
authority_url = "https://www.bipm.org/en/measurement-units"

[[units]]
id = "U_mps"
name = "metre per second"
kind = "speed"
si_unit = "m/s"
to_si_mult = 1.0
authority_url = "https://www.bipm.org/documents/20126/41483022/SI-Brochure-9-EN.pdf"

[[units]]
id = "U_Coul"
name = "coulomb"
kind = "charge"
si_unit = "C"
to_si_mult = 1.0
authority_url = "https://www.bipm.org/en/measurement-units"

# --- Constants -------------------------------------------------------------

[[constants]]
id = "C_me"
name = "electron mass"
symbol = "m_e"
value = 9.1093837139e-31
unit = "U_kg"
source_layer = "Measured (CODATA)"
authority_url = "https://physics.nist.gov/cgi-bin/cuu/Value?me="
note = "From NIST CODATA"

[[constants]]
id = "C_c"
name = "speed of light in vacuum"
symbol = "c"
value = 299792458.0
unit = "U_mps"
source_layer = "Defined (SI)"
authority_url = "https://www.bipm.org/en/measurement-units"
note = "Exact by SI definition"

[[constants]]
id = "C_e"
name = "elementary charge"
symbol = "e"
value = 1.602176634e-19
unit = "U_Coul"
source_layer = "Defined (SI)"
authority_url = "https://www.bipm.org/en/measurement-units"
note = "Exact by SI definition"

[[constants]]
id = "C_mec2"
name = "electron mass energy equivalent"
symbol = "m_e c^2"
value = 8.1871057880e-14
unit = "U_J"
source_layer = "Measured/Adjusted (CODATA)"
authority_url = "https://physics.nist.gov/cgi-bin/cuu/Value?mec2"
note = "Reference value to validate E=mc^2"

[[constants]]
id = "C_abs0"
name = "absolute zero (thermodynamic)"
symbol = "0 K"
value = 0.0
unit = "U_K"
source_layer = "Defined (scale anchor)"
authority_url = "https://www.bipm.org/documents/20126/41483022/SI-Brochure-9-concise-EN.pdf"
note = "0 K is absolute zero on the Kelvin scale"

# --- Calculations ----------------------------------------------------------

[[calculations]]
id = "F_Ecalc"
name = "Electron rest energy from E=mc^2"
expression = { product = [ { constant = "C_me" }, { constant = "C_c", exponent = 2 } ] }
note = "Uses constants C_me and C_c"

[[calculations]]
id = "F_eV_to_J"
name = "eV to J conversion"
expression = { constant = "C_e" }
note = "The conversion derives from defined constants: 1 V = 1 J/C, so eV = e joules"

[[calculations]]
id = "F_T_C_from_K"
name = "Celsius from Kelvin"
expression = "unspecified"
note = "t(degC) = T(K) - 273.15 per BIPM; kept as a placeholder with no numeric formula"

# --- Instances -------------------------------------------------------------

[[instances]]
id = "I_Ecalc_J"
scenario = "ElectronRestEnergy"
quantity = "E (calc)"
unit = "U_J"
source = { calculation = "F_Ecalc" }

[[instances]]
id = "I_Ecalc_eV"
scenario = "ElectronRestEnergy"
quantity = "E (calc)"
unit = "U_eV"
source = { calculation = "F_Ecalc" }
note = "Converted from SI"

[[instances]]
id = "I_Ecalc_ftlbf"
scenario = "ElectronRestEnergy"
quantity = "E (calc)"
unit = "U_ftlbf"
source = { calculation = "F_Ecalc" }
note = "Converted from SI"

[[instances]]
id = "I_Eexpected_J"
scenario = "ElectronRestEnergy"
quantity = "E (CODATA)"
unit = "U_J"
source = { constant = "C_mec2" }
note = "Reference constant C_mec2"

[[instances]]
id = "I_Tabs0_K"
scenario = "AbsoluteZero"
quantity = "T absolute"
unit = "U_K"
source = { literal = 0.0 }

[[instances]]
id = "I_Tabs0_C"
scenario = "AbsoluteZero"
quantity = "T absolute"
unit = "U_C"
source = { constant = "C_abs0" }
note = "Celsius representation of absolute zero"

# --- Claims ----------------------------------------------------------------

[[claims]]
id = "CL1"
text = "Electron rest energy is invariant across units (J, eV, ft-lbf)."
kind = "reality_invariant"
sources = [ { instance = "I_Ecalc_J" }, { instance = "I_Ecalc_eV" }, { instance = "I_Ecalc_ftlbf" } ]
tolerance = 1e-25

[[claims]]
id = "CL2"
text = "E = m c^2 (using m_e and c) matches CODATA m_e c^2 within tolerance."
kind = "reality_invariant"
sources = [ { instance = "I_Ecalc_J" }, { instance = "I_Eexpected_J" } ]
tolerance = 1e-22

[[claims]]
id = "CL3"
text = "0 K and -273.15 degC represent the same absolute temperature."
kind = "mixed"
sources = [ { instance = "I_Tabs0_K" }, { instance = "I_Tabs0_C" } ]
tolerance = 1e-9

[[claims]]
id = "CL4"
text = "1 eV equals e joules (constructed via SI definition of e and volt)."
kind = "constructed"
sources = [ { calculation = "F_eV_to_J" }, { constant = "C_e" } ]
tolerance = 0.0

# --- Questions -------------------------------------------------------------

[[questions]]
id = "Q0"
text = "Are some truths in the model constructed (true because defined)?"
answer = { claim = "CL4" }
explanation = "TRUE if the definitional/conventional check (CL4) passes."

[[questions]]
id = "Q1"
text = "Are there consistent truths that don't come from construction (i.e., unit-independent invariants)?"
answer = { any_of = ["CL1", "CL2", "CL3"] }
explanation = "TRUE if at least one reality-constrained invariant claim passes."

[[questions]]
id = "Q2"
text = "Does changing the measurement system (J vs ft-lbf vs eV) change the underlying electron rest energy?"
answer = { not = "CL1" }
explanation = "FALSE if CL1 passes (energy is invariant after conversion)."

[[questions]]
id = "Q3"
text = "Does E=mc^2 hold as long as appropriate conversions are done?"
answer = { claim = "CL2" }
explanation = "TRUE if CL2 passes."

[[questions]]
id = "Q4"
text = "Is 0 K the same temperature as -273.15 degC (after conversion)?"
answer = { claim = "CL3" }
explanation = "TRUE if CL3 passes."

[[questions]]
id = "Q5"
text = "Is 'reality' the constraining source of truth for invariants in this model?"
answer = { any_of = ["CL1", "CL2", "CL3"] }
explanation = "TRUE if at least one invariant passes; conventions set coordinates (units), reality constrains what fits."
"#;

pub fn canonical_schema() -> ModelSchema {
    ModelSchema::from_toml(CANONICAL_TOML).expect("embedded canonical schema must parse")
}

pub fn canonical_model() -> TruthModel {
    TruthModel::new(canonical_schema()).expect("embedded canonical schema must load")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Status, Value};

    #[test]
    fn loads_and_counts() {
        let schema = canonical_schema();
        assert_eq!(schema.units.len(), 8);
        assert_eq!(schema.constants.len(), 5);
        assert_eq!(schema.calculations.len(), 3);
        assert_eq!(schema.instances.len(), 6);
        assert_eq!(schema.claims.len(), 4);
        assert_eq!(schema.questions.len(), 6);
    }

    #[test]
    fn energy_invariance_across_unit_paths() {
        let m = canonical_model();
        let outcome = m.claim("CL1").unwrap();
        assert!(outcome.pass, "range = {:?}", outcome.range);
        assert!(outcome.range.unwrap() <= 1e-25);
        assert_eq!(outcome.values.len(), 3);
    }

    #[test]
    fn computed_rest_energy_matches_codata_reference() {
        let m = canonical_model();
        let computed = m.instance_si("I_Ecalc_J").unwrap().unwrap();
        let reference = m.instance_si("I_Eexpected_J").unwrap().unwrap();
        assert!((computed - reference).abs() <= 1e-22);
        assert!(m.claim("CL2").unwrap().pass);
    }

    #[test]
    fn kelvin_and_celsius_agree_at_absolute_zero() {
        let m = canonical_model();
        let kelvin = m.instance_si("I_Tabs0_K").unwrap().unwrap();
        let celsius = m.instance_si("I_Tabs0_C").unwrap().unwrap();
        assert!((kelvin - celsius).abs() <= 1e-9);
        assert!(m.claim("CL3").unwrap().pass);
    }

    #[test]
    fn definitional_claim_is_bit_identical() {
        let m = canonical_model();
        let outcome = m.claim("CL4").unwrap();
        // Both sides read the same source value, so the range is exactly
        // zero, not merely within tolerance.
        assert_eq!(outcome.range, Some(0.0));
        assert!(outcome.pass);
    }

    #[test]
    fn placeholder_calculation_is_undefined_not_an_error() {
        let m = canonical_model();
        assert_eq!(m.calculation_si("F_T_C_from_K").unwrap(), None);
        let snap = m.snapshot();
        assert_eq!(snap.entry("F_T_C_from_K").unwrap().status, Status::Undefined);
        assert_eq!(snap.summary.errors, 0);
    }

    #[test]
    fn all_questions_answer_as_documented() {
        let m = canonical_model();
        assert!(m.question("Q0").unwrap());
        assert!(m.question("Q1").unwrap());
        assert!(!m.question("Q2").unwrap());
        assert!(m.question("Q3").unwrap());
        assert!(m.question("Q4").unwrap());
        assert!(m.question("Q5").unwrap());
    }

    #[test]
    fn snapshot_passes_every_claim() {
        let snap = canonical_model().snapshot();
        assert_eq!(snap.summary.claims_passed, 4);
        assert_eq!(snap.summary.claims_failed, 0);
        assert_eq!(snap.summary.questions_true, 5);
        assert_eq!(snap.summary.questions_false, 1);
        // Only the placeholder calculation is undefined
        assert_eq!(snap.summary.undefined, 1);
    }

    #[test]
    fn editing_electron_mass_moves_only_its_downstream() {
        let mut m = canonical_model();
        let before = m.snapshot();
        m.set_constant_value("C_me", 9.2e-31).unwrap();
        let after = m.snapshot();

        // CL2 compares against the CODATA reference and must now fail;
        // its question follows.
        assert_eq!(after.entry("CL2").unwrap().value, Some(Value::Bool(false)));
        assert_eq!(after.entry("Q3").unwrap().value, Some(Value::Bool(false)));

        // Unit-invariance holds for any mass value.
        assert_eq!(after.entry("CL1").unwrap().value, Some(Value::Bool(true)));

        // Entities outside C_me's downstream are byte-for-byte unchanged.
        for id in ["C_c", "C_e", "C_abs0", "F_eV_to_J", "I_Tabs0_K", "I_Tabs0_C", "CL3", "CL4", "Q0", "Q4"] {
            assert_eq!(before.entry(id).unwrap(), after.entry(id).unwrap(), "{id} moved");
        }

        // And the energy instances did move.
        assert_ne!(
            before.entry("I_Ecalc_J").unwrap().value,
            after.entry("I_Ecalc_J").unwrap().value
        );
    }

    #[test]
    fn edit_then_restore_recovers_the_original_table() {
        let mut m = canonical_model();
        let before = m.snapshot();
        m.set_constant_value("C_me", 1.0).unwrap();
        m.set_constant_value("C_me", 9.1093837139e-31).unwrap();
        let after = m.snapshot();
        assert_eq!(before.entries, after.entries);
    }
}
