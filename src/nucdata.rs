use super::*;

/// Standard atomic weights in g/mol for Z = 1..=92.
const ATOMIC_WEIGHTS: [f64; 92] = [
    1.008, 4.002602, 6.94, 9.0121831, 10.81, 12.011, 14.007, 15.999, 18.998403163, 20.1797,
    22.98976928, 24.305, 26.9815385, 28.085, 30.973761998, 32.06, 35.45, 39.948, 39.0983, 40.078,
    44.955908, 47.867, 50.9415, 51.9961, 54.938044, 55.845, 58.933194, 58.6934, 63.546, 65.38,
    69.723, 72.630, 74.921595, 78.971, 79.904, 83.798, 85.4678, 87.62, 88.90584, 91.224,
    92.90637, 95.95, 97.90721, 101.07, 102.90550, 106.42, 107.8682, 112.414, 114.818, 118.710,
    121.760, 127.60, 126.90447, 131.293, 132.90545196, 137.327, 138.90547, 140.116, 140.90766, 144.242,
    144.91276, 150.36, 151.964, 157.25, 158.92535, 162.500, 164.93033, 167.259, 168.93422, 173.045,
    174.9668, 178.49, 180.94788, 183.84, 186.207, 190.23, 192.217, 195.084, 196.966569, 200.592,
    204.38, 207.2, 208.98040, 208.98243, 209.98715, 222.01758, 223.01974, 226.02541, 227.02775, 232.0377,
    231.03588, 238.02891,
];

/// Densities of the elements at normal conditions in g/cm^3 for Z = 1..=92.
const DENSITIES: [f64; 92] = [
    8.988E-5, 1.786E-4, 0.534, 1.85, 2.34, 2.0, 1.251E-3, 1.429E-3, 1.696E-3, 9.002E-4,
    0.971, 1.738, 2.698, 2.329, 1.82, 2.067, 3.214E-3, 1.784E-3, 0.862, 1.54,
    2.989, 4.54, 6.11, 7.15, 7.44, 7.874, 8.86, 8.912, 8.96, 7.134,
    5.907, 5.323, 5.776, 4.809, 3.122, 3.749E-3, 1.532, 2.64, 4.469, 6.506,
    8.57, 10.22, 11.5, 12.37, 12.41, 12.02, 10.501, 8.69, 7.31, 7.287,
    6.685, 6.232, 4.93, 5.894E-3, 1.873, 3.594, 6.145, 6.77, 6.773, 7.007,
    7.26, 7.52, 5.243, 7.895, 8.229, 8.55, 8.795, 9.066, 9.321, 6.965,
    9.84, 13.31, 16.654, 19.25, 21.02, 22.59, 22.56, 21.45, 19.32, 13.5336,
    11.85, 11.342, 9.807, 9.32, 7.0, 9.73E-3, 1.87, 5.5, 10.07, 11.72,
    15.37, 18.95,
];

/// Atomic weight of element `z` in g/mol, or 0 if `z` is not tabulated.
pub fn element_atomic_weight(z: i32) -> f64 {
    match z {
        1..=92 => ATOMIC_WEIGHTS[(z - 1) as usize],
        _ => 0.,
    }
}

/// Density of element `z` in g/cm^3, or 0 if `z` is not tabulated.
pub fn element_density(z: i32) -> f64 {
    match z {
        1..=92 => DENSITIES[(z - 1) as usize],
        _ => 0.,
    }
}

/// Single-element material with the tabulated weight and density and zero thickness.
pub fn get_material(z: i32) -> Result<material::Material> {
    if !(1..=92).contains(&z) {
        return Err(anyhow!("Input error: no element data for Z = {}. Use 1 <= Z <= 92.", z));
    }
    Ok(material::Material::from_element(element_atomic_weight(z), z, element_density(z), 0., 0.))
}
