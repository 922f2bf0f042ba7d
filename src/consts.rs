use super::*;

//Physical constants, in the MeV - g/cm^2 - cm system used throughout
/// One atomic mass unit in MeV/c^2.
pub const AMU: f64 = 931.49410242;
/// Electron mass in MeV/c^2.
pub const ME: f64 = 0.51099895;
/// Bethe-Bloch prefactor 4 pi N_A r_e^2 m_e c^2 in MeV cm^2/mol.
pub const BETHE_BLOCH_PREFACTOR: f64 = 0.307075;
/// Bohr energy-loss straggling prefactor 4 pi N_A r_e^2 (m_e c^2)^2 in MeV^2 cm^2/mol.
pub const BOHR_STRAGGLING_PREFACTOR: f64 = BETHE_BLOCH_PREFACTOR*ME;
/// Avogadro's number in 1/mol.
pub const AVOGADRO: f64 = 6.02214076E23;
/// Inverse fine-structure constant.
pub const FINE_STRUCTURE_INV: f64 = 137.035999084;
/// Speed of light in cm/ns.
pub const C: f64 = 29.9792458;
/// One electron-volt in MeV.
pub const EV: f64 = 1E-6;
/// One kilo-electron-volt in MeV.
pub const KEV: f64 = 1E-3;
/// Lindhard-Scharff electronic stopping prefactor, in eV Angstrom^2 (eV/amu)^-1/2.
pub const LINDHARD_SCHARFF_PREFACTOR: f64 = 1.212;
/// Converts a cross section in eV Angstrom^2 per atom to MeV cm^2/mol.
pub const EV_ANGSTROM2_TO_MEV_CM2_MOL: f64 = EV*ANGSTROM*ANGSTROM*AVOGADRO;
/// Converts a cross section in eV per 1E15 atoms/cm^2 to MeV cm^2/mol.
pub const EV_1E15_TO_MEV_CM2_MOL: f64 = EV*1E-15*AVOGADRO;

//Geometric lengths, in cm
/// One centimeter in cm.
pub const CM: f64 = 1.;
/// One millimeter in cm.
pub const MM: f64 = 1E-1;
/// One micron in cm.
pub const MICRON: f64 = 1E-4;
/// One nanometer in cm.
pub const NM: f64 = 1E-7;
/// One Angstrom in cm.
pub const ANGSTROM: f64 = 1E-8;

//Areal densities, in g/cm^2
/// One g/cm^2.
pub const G_CM2: f64 = 1.;
/// One mg/cm^2 in g/cm^2.
pub const MG_CM2: f64 = 1E-3;
/// One ug/cm^2 in g/cm^2.
pub const UG_CM2: f64 = 1E-6;
