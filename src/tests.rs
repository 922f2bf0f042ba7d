#[cfg(test)]
use super::*;
#[cfg(test)]
use float_cmp::approx_eq;
#[cfg(test)]
use std::cell::Cell;

#[cfg(test)]
fn carbon_foil() -> Material {
    let mut carbon = get_material(6).unwrap();
    carbon.set_density(2.23).set_thickness_cm(500.*1E-6);
    carbon
}

#[cfg(test)]
fn proton(T: f64) -> Projectile {
    Projectile::new(element_atomic_weight(1), 1, 0., T)
}

#[test]
fn test_projectile_equality() {
    let p1 = Projectile::new(12., 6, 6., 1.);
    let p2 = Projectile::new(12., 6, 6., 100.);
    let p3 = Projectile::new(12., 6, 5., 1.);
    let p4 = Projectile::new(13., 6, 6., 1.);

    //Energy is transient state, not identity
    assert!(p1 == p2);
    assert!(p1 != p3);
    assert!(p1 != p4);
    assert_eq!(Projectile::bare(4., 2, 1.).Q, 2.);
    assert!(approx_eq!(f64, p2.energy(), 1200., epsilon = 1E-12));
}

#[test]
fn test_material_molar_mass() {
    //Stoichiometric water
    let water = Material::new(&[(1.008, 1, 2.), (15.999, 8, 1.)], 1.0, 0., 0.);
    assert_eq!(water.ncomponents(), 2);
    assert!(approx_eq!(f64, water.M(), 2.*1.008 + 15.999, epsilon = 1E-12));

    //Mass fractions: harmonic mean of the weights
    let mix = Material::new(&[(1.008, 1, 0.111894), (15.999, 8, 0.888106)], 1.0, 0., 0.);
    let expected = 1./(0.111894/1.008 + 0.888106/15.999);
    assert!(approx_eq!(f64, mix.M(), expected, epsilon = 1E-12));

    //Explicit mass wins
    let explicit = Material::new(&[(1.008, 1, 2.), (15.999, 8, 1.)], 1.0, 0., 18.);
    assert_eq!(explicit.M(), 18.);

    //Zero weight selects the tabulated value
    let tabulated = Material::new(&[(0., 6, 1.)], 2.0, 0., 0.);
    assert_eq!(tabulated.get_element(0).A, 12.011);
    assert_eq!(tabulated.M(), 12.011);

    let fractions = water.mass_fractions();
    assert!(approx_eq!(f64, fractions.iter().sum::<f64>(), 1., epsilon = 1E-12));
    assert!(approx_eq!(f64, fractions[0], 2.016/18.015, epsilon = 1E-12));
}

#[test]
fn test_material_thickness_and_equality() {
    let carbon = carbon_foil();
    assert!(approx_eq!(f64, carbon.thickness(), 1.115E-3, epsilon = 1E-15));
    assert!(approx_eq!(f64, carbon.thickness_cm(), 500E-6, epsilon = 1E-15));

    let mut other = get_material(6).unwrap();
    other.set_density(2.23 + 5E-7).set_thickness(1.);
    //Thickness is not part of identity; density within 1e-6
    assert!(carbon == other);

    other.set_density(2.24);
    assert!(carbon != other);

    let graphite = Material::from_element(12.0, 6, 2.23, 0., 0.);
    assert!(carbon != graphite);

    assert!(get_material(0).is_err());
    assert!(get_material(93).is_err());
}

#[test]
fn test_layers() {
    let carbon = carbon_foil();
    let mut water = Material::new(&[(0., 1, 2.), (0., 8, 1.)], 1.0, 0., 0.);
    water.set_thickness(2E-3);

    let mut layers = Layers::new();
    layers.push(carbon.clone());
    layers.push(water.clone());
    assert_eq!(layers.num(), 2);
    assert!(approx_eq!(f64, layers.thickness(), 1.115E-3 + 2E-3, epsilon = 1E-15));
    assert!(approx_eq!(f64, layers.thickness_cm(), 500E-6 + 2E-3, epsilon = 1E-15));

    //Concatenation flattens and keeps order
    let stacked = &layers + &layers;
    assert_eq!(stacked.num(), 4);
    assert!(stacked[2] == carbon);
    assert!(stacked[3] == water);

    let appended = layers.clone() + carbon.clone();
    assert_eq!(appended.num(), 3);
    assert!(appended[2] == carbon);

    let mut flattened = Layers::from(water.clone());
    flattened.push_layers(&layers);
    assert_eq!(flattened.num(), 3);
    assert!(flattened[0] == water);
    assert!(flattened[1] == carbon);

    let owned = layers.clone() + layers.clone();
    assert!(owned == stacked);
}

#[test]
fn test_constant_stopping_is_exact() {
    let constant = |_: &Projectile, _: &Material, _: &Config| 10.;
    let mut material = carbon_foil();
    material.set_thickness(0.01);

    let mut projectile = Projectile::new(4., 2, 2., 5.);
    let loss = integrate_energyloss(&mut projectile, &material, &constant, &Config::default(), &IntegrationOptions::default()).unwrap();

    assert!(approx_eq!(f64, projectile.T, 5. - 0.1, epsilon = 1E-12), "T: {}", projectile.T);
    assert!(approx_eq!(f64, loss, 0.1*4., epsilon = 1E-12), "loss: {}", loss);

    let gain = reverse_integrate_energyloss(&mut projectile, &material, &constant, &Config::default(), &IntegrationOptions::default()).unwrap();
    assert!(approx_eq!(f64, projectile.T, 5., epsilon = 1E-12));
    assert!(approx_eq!(f64, gain, loss, epsilon = 1E-12));
}

#[test]
fn test_proton_in_carbon_round_trip() {
    let carbon = carbon_foil();
    let config = Config::default();
    let options = IntegrationOptions::default();
    let mut projectile = proton(3.0);

    let loss = integrate_energyloss(&mut projectile, &carbon, &StandardStopping, &config, &options).unwrap();
    let T1 = projectile.T;

    println!("Energy loss: {} MeV Final energy: {} MeV/u", loss, T1);
    assert!(loss.is_finite());
    assert!(loss > 0.10 && loss < 0.13, "loss: {} MeV", loss);
    assert!(T1 < 3.0);
    assert!(approx_eq!(f64, loss, (3.0 - T1)*projectile.A, epsilon = 1E-12));

    let reverse_loss = reverse_integrate_energyloss(&mut projectile, &carbon, &StandardStopping, &config, &options).unwrap();
    println!("Reverse energy loss: {} MeV Initial energy: {} MeV/u", reverse_loss, projectile.T);

    assert!(((projectile.T - 3.0)/3.0).abs() < 1E-4, "Recovered T: {}", projectile.T);
    assert!(((reverse_loss - loss)/loss).abs() < 1E-2);
}

#[test]
fn test_monotonic_energy_loss() {
    let config = Config::default();
    let options = IntegrationOptions::default();

    for thickness in vec![1E-6, 1E-5, 1E-4, 1E-3] {
        for T in vec![2.0, 3.0, 100., 1000.] {
            let mut carbon = carbon_foil();
            carbon.set_thickness(thickness);
            let mut projectile = proton(T);

            let loss = integrate_energyloss(&mut projectile, &carbon, &StandardStopping, &config, &options).unwrap();
            assert!(loss > 0., "loss {} for {} g/cm2 at {} MeV/u", loss, thickness, T);
            assert!(projectile.T < T);
            assert!(projectile.T > 0.);
        }
    }

    //Thicker layer loses more
    let mut thin = carbon_foil();
    thin.set_thickness(1E-3);
    let mut thick = carbon_foil();
    thick.set_thickness(2E-3);
    let loss_thin = integrate_energyloss(&mut proton(3.0), &thin, &StandardStopping, &config, &options).unwrap();
    let loss_thick = integrate_energyloss(&mut proton(3.0), &thick, &StandardStopping, &config, &options).unwrap();
    assert!(loss_thick > loss_thin);
}

#[test]
fn test_thickness_additivity() {
    let config = Config::default();
    let options = IntegrationOptions::default();

    for T in vec![3.0, 10.0, 30.0] {
        let mut full = carbon_foil();
        full.set_thickness(2E-3);
        let mut half = carbon_foil();
        half.set_thickness(1E-3);

        let mut p_full = proton(T);
        let loss_full = integrate_energyloss(&mut p_full, &full, &StandardStopping, &config, &options).unwrap();

        let mut p_half = proton(T);
        let loss_1 = integrate_energyloss(&mut p_half, &half, &StandardStopping, &config, &options).unwrap();
        let loss_2 = integrate_energyloss(&mut p_half, &half, &StandardStopping, &config, &options).unwrap();

        assert!(((p_full.T - p_half.T)/p_full.T).abs() < 1E-4, "{} vs {}", p_full.T, p_half.T);
        assert!(((loss_full - (loss_1 + loss_2))/loss_full).abs() < 1E-2);
    }
}

#[test]
fn test_zero_thickness() {
    let mut material = carbon_foil();
    material.set_thickness(0.);
    let mut projectile = proton(3.0);

    let loss = integrate_energyloss(&mut projectile, &material, &StandardStopping, &Config::default(), &IntegrationOptions::default()).unwrap();
    assert_eq!(loss, 0.);
    assert_eq!(projectile.T, 3.0);

    let loss = reverse_integrate_energyloss(&mut projectile, &material, &StandardStopping, &Config::default(), &IntegrationOptions::default()).unwrap();
    assert_eq!(loss, 0.);
    assert_eq!(projectile.T, 3.0);

    //Vanishing thickness, vanishing loss
    material.set_thickness(1E-12);
    let loss = integrate_energyloss(&mut projectile, &material, &StandardStopping, &Config::default(), &IntegrationOptions::default()).unwrap();
    assert!(loss > 0. && loss < 1E-9);
    assert!(approx_eq!(f64, projectile.T, 3.0, epsilon = 1E-9));
}

#[test]
fn test_depth_cap() {
    let calls = Cell::new(0_usize);
    let runaway = |_: &Projectile, _: &Material, _: &Config| {
        calls.set(calls.get() + 1);
        1E300
    };
    let carbon = carbon_foil();
    let options = IntegrationOptions::default();

    let mut projectile = proton(3.0);
    let result = integrate_energyloss(&mut projectile, &carbon, &runaway, &Config::default(), &options);

    match result {
        Err(IntegrationError::NotConverged{depth, traversed, ..}) => {
            assert_eq!(depth, 100);
            assert_eq!(traversed, 0.);
        },
        _ => panic!("Expected NotConverged, got {:?}", result),
    }
    assert_eq!(result.unwrap_err().fallback_energy(), 3.0*projectile.A);
    //One initial query plus one per halving
    assert_eq!(calls.get(), 101);
    //Nothing was committed
    assert_eq!(projectile.T, 3.0);

    calls.set(0);
    let mut projectile = proton(2.0);
    let result = reverse_integrate_energyloss(&mut projectile, &carbon, &runaway, &Config::default(), &options);
    assert!(matches!(result, Err(IntegrationError::NotConverged{..})));
    assert_eq!(result.unwrap_err().fallback_energy(), 2.0*projectile.A);
    assert_eq!(calls.get(), 101);

    //A tighter cap is honoured per call
    calls.set(0);
    let shallow = IntegrationOptions {max_fractional_step: 0.001, max_depth: 5};
    let result = integrate_energyloss(&mut proton(3.0), &carbon, &runaway, &Config::default(), &shallow);
    assert!(matches!(result, Err(IntegrationError::NotConverged{depth: 5, ..})));
    assert_eq!(calls.get(), 6);
}

#[test]
fn test_projectile_stopping_in_layer() {
    let constant = |_: &Projectile, _: &Material, _: &Config| 10.;
    let mut material = carbon_foil();
    material.set_thickness(1.);

    //The threshold keeps every step positive, so refinement runs into the depth cap
    let mut projectile = Projectile::new(1., 1, 1., 1.);
    let result = integrate_energyloss(&mut projectile, &material, &constant, &Config::default(), &IntegrationOptions::default());
    match result {
        Err(IntegrationError::NotConverged{traversed, energy, fallback, ..}) => {
            assert!(traversed < 0.1 + 1E-9 && traversed > 0.09);
            assert!(energy > 0. && energy < 1E-20);
            assert_eq!(fallback, 1.);
        },
        _ => panic!("Expected NotConverged, got {:?}", result),
    }
    assert!(projectile.T > 0.);

    //A permissive threshold lets a committed step overshoot to negative energy
    let permissive = IntegrationOptions {max_fractional_step: 2., max_depth: 100};
    let mut projectile = Projectile::new(1., 1, 1., 1.);
    let result = integrate_energyloss(&mut projectile, &material, &constant, &Config::default(), &permissive);
    match result {
        Err(IntegrationError::NonPhysical{traversed, energy, fallback, ..}) => {
            assert!(approx_eq!(f64, traversed, 0.125, epsilon = 1E-15));
            assert!(approx_eq!(f64, energy, -0.25, epsilon = 1E-15));
            assert_eq!(fallback, 1.);
        },
        _ => panic!("Expected NonPhysical, got {:?}", result),
    }
    //Left at the last committed, non-physical value
    assert!(approx_eq!(f64, projectile.T, -0.25, epsilon = 1E-15));
}

#[test]
fn test_non_positive_entry_energy() {
    let calls = Cell::new(0_usize);
    let counting = |_: &Projectile, _: &Material, _: &Config| {
        calls.set(calls.get() + 1);
        100.
    };

    for T in vec![0., -1., f64::NAN] {
        let mut projectile = proton(T);
        let result = integrate_energyloss(&mut projectile, &carbon_foil(), &counting, &Config::default(), &IntegrationOptions::default());
        assert!(matches!(result, Err(IntegrationError::NonPhysical{..})));
        let result = reverse_integrate_energyloss(&mut projectile, &carbon_foil(), &counting, &Config::default(), &IntegrationOptions::default());
        assert!(matches!(result, Err(IntegrationError::NonPhysical{..})));
    }
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_stopping_power() {
    let carbon = carbon_foil();
    let config = Config::default();

    let dedx = StandardStopping.dedx(&proton(3.0), &carbon, &config);
    assert!(dedx > 90. && dedx < 120., "dedx: {} MeV/u/(g/cm2)", dedx);

    //Per nucleon: a deuteron at the same velocity loses the same total energy per g/cm2
    let deuteron = Projectile::new(2.*element_atomic_weight(1), 1, 0., 3.0);
    let total_proton = StandardStopping.dedx(&proton(3.0), &carbon, &config)*proton(3.0).A;
    let total_deuteron = StandardStopping.dedx(&deuteron, &carbon, &config)*deuteron.A;
    assert!(((total_proton - total_deuteron)/total_proton).abs() < 1E-3);

    //Stopping falls with energy above the Bragg peak
    let mut last = f64::INFINITY;
    for T in vec![1., 3., 10., 100., 300.] {
        let dedx = StandardStopping.dedx(&proton(T), &carbon, &config);
        assert!(dedx > 0. && dedx < last);
        last = dedx;
    }

    //Electronic modes bracket the interpolated value
    for T in vec![0.001, 0.01, 0.1, 1.0] {
        let p = proton(T);
        let element = carbon.get_element(0);
        let I = stopping::mean_excitation_potential_element(6);
        let bethe = stopping::electronic_stopping(&p, element, I, &Config {electronic_stopping_mode: ElectronicStoppingMode::BETHE, ..config});
        let ls = stopping::electronic_stopping(&p, element, I, &Config {electronic_stopping_mode: ElectronicStoppingMode::LINDHARD_SCHARFF, ..config});
        let interpolated = stopping::electronic_stopping(&p, element, I, &config);
        assert!(interpolated < bethe && interpolated < ls);
        assert!(interpolated > 0.);
    }

    //Nuclear stopping matters only at low energy
    let without_nuclear = Config {nuclear_stopping: false, ..config};
    let high = StandardStopping.dedx(&proton(3.0), &carbon, &without_nuclear);
    assert!((dedx - high)/dedx < 1E-3);
    let low = StandardStopping.dedx(&proton(0.001), &carbon, &without_nuclear);
    assert!(StandardStopping.dedx(&proton(0.001), &carbon, &config) > low);

    //Element and single-element material agree
    let element = *carbon.get_element(0);
    assert!(approx_eq!(f64, element.stopping_power(&proton(3.0), &config), carbon.stopping_power(&proton(3.0), &config), epsilon = 1E-9));
}

#[test]
fn test_effective_charge() {
    let slow_uranium = Projectile::new(238., 92, 30., 0.1);
    let config = Config::default();

    let z_pb = stopping::z_effective(&slow_uranium, &config);
    assert!(z_pb > 0. && z_pb < 92.);
    assert_eq!(stopping::z_effective(&slow_uranium, &Config {z_effective: ZEffective::NONE, ..config}), 92.);
    assert_eq!(stopping::z_effective(&slow_uranium, &Config {z_effective: ZEffective::FIXED, ..config}), 30.);

    let fully_stripped_fallback = Projectile::new(238., 92, 0., 0.1);
    assert_eq!(stopping::z_effective(&fully_stripped_fallback, &Config {z_effective: ZEffective::FIXED, ..config}), 92.);

    //Fast light ions are fully stripped
    assert!(approx_eq!(f64, stopping::z_effective(&proton(100.), &config), 1., epsilon = 1E-9));
}

#[test]
fn test_mean_excitation_potential() {
    let water = Material::new(&[(0., 1, 2.), (0., 8, 1.)], 1.0, 0., 0.);
    let I_H = stopping::mean_excitation_potential_element(1);
    let I_O = stopping::mean_excitation_potential_element(8);
    let I = stopping::mean_excitation_potential(&water);

    assert!(approx_eq!(f64, I_H, 19., epsilon = 1E-12));
    assert!(I > I_H && I < I_O, "I: {}", I);

    let mut explicit = water.clone();
    explicit.set_i_potential(78.);
    assert_eq!(stopping::mean_excitation_potential(&explicit), 78.);

    //Explicit potential changes the stopping power
    let config = Config::default();
    assert!(explicit.stopping_power(&proton(10.), &config) != water.stopping_power(&proton(10.), &config));
}

#[test]
fn test_kinematics() {
    assert_eq!(beta_from_T(0.), 0.);
    assert!(approx_eq!(f64, gamma_from_T(AMU), 2., epsilon = 1E-12));
    assert!(approx_eq!(f64, beta_from_T(AMU), (3.0_f64).sqrt()/2., epsilon = 1E-12));
    //p^2 = (E_total)^2 - m^2
    let T = 100.;
    let M = 12.;
    let p = p_from_T(T, M);
    let total = M*(T + AMU);
    assert!(approx_eq!(f64, p*p, total*total - M*M*AMU*AMU, epsilon = 1E-3));
}

#[test]
fn test_range() {
    let constant = |_: &Projectile, _: &Material, _: &Config| 100.;
    let carbon = carbon_foil();
    let config = Config::default();

    let r = calculate::range(&proton(3.0), &carbon, &constant, &config);
    assert!(((r - 0.03)/0.03).abs() < 1E-3, "range: {}", r);

    let below = calculate::range(&proton(1E-5), &carbon, &constant, &config);
    assert!(approx_eq!(f64, below, 1E-7, epsilon = 1E-15));

    //Range difference matches the traversed thickness
    let mut projectile = proton(10.);
    let mut foil = carbon_foil();
    foil.set_thickness(0.05);
    let r_in = calculate::range(&projectile, &foil, &StandardStopping, &config);
    integrate_energyloss(&mut projectile, &foil, &StandardStopping, &config, &IntegrationOptions::default()).unwrap();
    let r_out = calculate::range(&projectile, &foil, &StandardStopping, &config);
    assert!(r_in > r_out);
    assert!((((r_in - r_out) - 0.05)/0.05).abs() < 1E-2, "{} - {}", r_in, r_out);
}

#[test]
fn test_layer_chaining() {
    let config = Config::default();
    let options = IntegrationOptions::default();

    let mut mylar = Material::new(&[(0., 6, 10.), (0., 1, 8.), (0., 8, 4.)], 1.39, 0., 0.);
    mylar.set_thickness(2E-3);
    let layers = Layers::from(carbon_foil()) + mylar + carbon_foil();

    let mut projectile = proton(5.0);
    let forward = calculate_layers(&mut projectile, &layers, &StandardStopping, &config, &options).unwrap();
    assert_eq!(forward.results.len(), 3);

    //Each layer starts where the previous one ended
    for (previous, next) in forward.results.iter().tuple_windows() {
        assert_eq!(previous.Eout, next.Ein);
    }
    assert_eq!(forward.total.Ein, 5.0);
    assert_eq!(forward.total.Eout, projectile.T);
    assert!(approx_eq!(f64, forward.total.Eloss, (5.0 - projectile.T)*projectile.A, epsilon = 1E-9));
    assert!(forward.total.tof > 0.);
    assert!(forward.results.iter().all(|result| result.dEdxo > result.dEdxi));

    //Walking back from the exit energy recovers the entry energy
    let exit = projectile.T;
    let reverse = reverse_calculate_layers(&mut projectile, &layers, &StandardStopping, &config, &options).unwrap();
    assert!(((projectile.T - 5.0)/5.0).abs() < 1E-4, "Recovered T: {}", projectile.T);
    assert_eq!(reverse.results.len(), 3);
    assert_eq!(reverse.total.Eout, exit);
    assert_eq!(reverse.total.Ein, projectile.T);
    for (forward_layer, reverse_layer) in forward.results.iter().zip(&reverse.results) {
        assert!(((forward_layer.Eloss - reverse_layer.Eloss)/forward_layer.Eloss).abs() < 1E-2);
    }
}

#[test]
fn test_layer_chaining_stops_at_failure() {
    let mut thick = carbon_foil();
    thick.set_thickness(10.);
    let layers = Layers::from(carbon_foil()) + thick + carbon_foil();

    let mut projectile = proton(3.0);
    let result = calculate_layers(&mut projectile, &layers, &StandardStopping, &Config::default(), &IntegrationOptions::default());
    let error = result.unwrap_err();
    assert!(error.downcast_ref::<IntegrationError>().is_some());
    assert!(format!("{:#}", error).contains("Layer 1"));
}

#[test]
fn test_parse_input() {
    let input_toml = r#"
        [options]
        name = "test_"
        mode = "REVERSE"

        [projectile_parameters]
        N = [3, 2]
        A = [1.008, 4.0026]
        Z = [1, 2]
        T = [{POINT = 3.0}, {UNIFORM = {min = 1.0, max = 2.0}}]

        [[layers]]
        element = 6
        density = 2.23
        thickness = 500.0
        thickness_unit = "NM"

        [[layers]]
        components = [[0.0, 1, 2.0], [0.0, 8, 1.0]]
        density = 1.0
        thickness = 1.0
        thickness_unit = "MG_CM2"

        [integration]
        max_depth = 50

        [stopping]
        z_effective = "NONE"
    "#;

    let run = input::parse_input(input_toml).unwrap();

    assert_eq!(run.options.name, "test_");
    assert_eq!(run.options.mode, IntegrationMode::REVERSE);
    assert_eq!(run.options.num_threads, 1);
    assert_eq!(run.integration.max_depth, 50);
    assert_eq!(run.integration.max_fractional_step, 0.001);
    assert_eq!(run.config.z_effective, ZEffective::NONE);
    assert_eq!(run.config.electronic_stopping_mode, ElectronicStoppingMode::INTERPOLATED);

    assert_eq!(run.layers.num(), 2);
    assert!(approx_eq!(f64, run.layers[0].thickness(), 500E-7*2.23, epsilon = 1E-15));
    assert!(approx_eq!(f64, run.layers[1].thickness(), 1E-3, epsilon = 1E-15));
    assert!(approx_eq!(f64, run.layers[1].M(), 2.*1.008 + 15.999, epsilon = 1E-12));

    assert_eq!(run.projectiles.len(), 5);
    assert!(run.projectiles[..3].iter().all(|p| p.T == 3.0 && p.Z == 1 && p.Q == 1.));
    assert!(run.projectiles[3..].iter().all(|p| p.T >= 1.0 && p.T < 2.0 && p.Z == 2));
}

#[test]
fn test_parse_input_errors() {
    let header = r#"
        [options]
        name = "test_"

        [projectile_parameters]
        N = [1]
        A = [1.008]
        Z = [1]
        T = [{POINT = 3.0}]
    "#;

    //No layers
    assert!(input::parse_input(header).is_err());

    //Unknown thickness unit
    let bad_unit = format!("{}\n[[layers]]\nelement = 6\nthickness = 1.0\nthickness_unit = \"FURLONG\"\n", header);
    assert!(input::parse_input(&bad_unit).is_err());

    //Both element and components
    let ambiguous = format!("{}\n[[layers]]\nelement = 6\ncomponents = [[0.0, 6, 1.0]]\nthickness = 1.0\n", header);
    assert!(input::parse_input(&ambiguous).is_err());

    //Components need a density
    let no_density = format!("{}\n[[layers]]\ncomponents = [[0.0, 6, 1.0]]\nthickness = 1.0\n", header);
    assert!(input::parse_input(&no_density).is_err());

    //Element layers take the tabulated density
    let element = format!("{}\n[[layers]]\nelement = 6\nthickness = 1.0\n", header);
    let run = input::parse_input(&element).unwrap();
    assert_eq!(run.layers[0].density(), 2.0);

    //Energy units
    let kev = header.replace("Z = [1]", "Z = [1]\nenergy_unit = \"MEV\"").replace("A = [1.008]", "A = [2.0]");
    let run = input::parse_input(&format!("{}\n[[layers]]\nelement = 6\nthickness = 1.0\n", kev)).unwrap();
    assert_eq!(run.projectiles[0].T, 1.5);
}

#[test]
fn test_sample_energy() {
    assert_eq!(particle::sample_energy(&Distributions::POINT(2.5)).unwrap(), 2.5);
    for _ in 0..100 {
        let T = particle::sample_energy(&Distributions::UNIFORM{min: 1., max: 2.}).unwrap();
        assert!(T >= 1. && T < 2.);
    }
    assert!(particle::sample_energy(&Distributions::UNIFORM{min: 2., max: 1.}).is_err());
    assert!(particle::sample_energy(&Distributions::NORMAL{mean: 1., std: -1.}).is_err());
    assert!(particle::sample_energy(&Distributions::NORMAL{mean: 1., std: f64::NAN}).is_err());
    assert!(particle::sample_energy(&Distributions::NORMAL{mean: 1., std: f64::INFINITY}).is_err());
    assert_eq!(particle::sample_energy(&Distributions::NORMAL{mean: 1., std: 0.}).unwrap(), 1.);

    //A negative spread in the input file is rejected before sampling
    let input_toml = r#"
        [options]
        name = "test_"

        [projectile_parameters]
        N = [1]
        A = [1.008]
        Z = [1]
        T = [{NORMAL = {mean = 3.0, std = -1.0}}]

        [[layers]]
        element = 6
        thickness = 1E-3
    "#;
    let error = input::parse_input(input_toml).unwrap_err();
    assert!(format!("{:#}", error).contains("std >= 0"));
}

#[test]
fn test_single_projectile_and_summary() {
    let layers = Layers::from(carbon_foil());
    let input = particle::ProjectileInput {A: 1.008, Z: 1, Q: 1., T: 3.0};

    let outcome = physics::single_projectile(input, &layers, &StandardStopping, &Config::default(), &IntegrationOptions::default(), IntegrationMode::FORWARD);
    let result = outcome.result.as_ref().unwrap();
    assert_eq!(result.total.Ein, 3.0);
    assert!(outcome.projectile.T < 3.0);

    let mut thick = carbon_foil();
    thick.set_thickness(10.);
    let failed = physics::single_projectile(input, &Layers::from(thick), &StandardStopping, &Config::default(), &IntegrationOptions::default(), IntegrationMode::FORWARD);
    assert!(failed.result.is_err());

    let mut summary = output::Summary::new();
    summary.update(&outcome);
    summary.update(&failed);
    assert_eq!(summary.num_projectiles, 2);
    assert_eq!(summary.num_converged, 1);
    assert_eq!(summary.num_not_converged + summary.num_non_physical, 1);
    assert!(approx_eq!(f64, summary.mean_energy_loss, result.total.Eloss, epsilon = 1E-12));
}

#[test]
fn test_simple_eloss() {
    let result = simple_eloss(1.008, 1, 3.0, 0., 6, 1.115E-3, 2.23).unwrap();

    let mut projectile = proton(3.0);
    let loss = integrate_energyloss(&mut projectile, &carbon_foil(), &StandardStopping, &Config::default(), &IntegrationOptions::default()).unwrap();

    assert!(approx_eq!(f64, result.Eloss, loss, epsilon = 1E-12));
    assert!(approx_eq!(f64, result.Eout, projectile.T, epsilon = 1E-12));
    assert!(result.range > 1.115E-3);
    assert!(simple_eloss(0., 1, 3.0, 0., 6, 1E-3, 2.23).is_err());
    assert!(simple_eloss(1.008, 1, 3.0, 0., 120, 1E-3, 2.23).is_err());
}

#[test]
fn test_energy_straggling() {
    let config = Config::default();
    let options = IntegrationOptions::default();

    //Thin layer: the spread is the Bohr rate times the thickness
    let mut thin = carbon_foil();
    thin.set_thickness(1E-4);
    let bohr = (thin.energy_loss_variance(&proton(3.0), &config)*1E-4).sqrt();
    let result = calculate::calculate_layer(&mut proton(3.0), &thin, &StandardStopping, &config, &options).unwrap();
    assert!(((result.sigma_E - bohr)/bohr).abs() < 2E-2, "{} vs {}", result.sigma_E, bohr);

    //Spread grows with thickness
    let mut last = 0.;
    for thickness in vec![1E-4, 1E-3, 5E-3] {
        let mut carbon = carbon_foil();
        carbon.set_thickness(thickness);
        let result = calculate::calculate_layer(&mut proton(3.0), &carbon, &StandardStopping, &config, &options).unwrap();
        assert!(result.sigma_E > 2.*last, "sigma_E {} at {} g/cm2", result.sigma_E, thickness);
        last = result.sigma_E;
    }

    //Split foils combine to the spread of the whole foil
    let mut double = carbon_foil();
    double.set_thickness(2.*carbon_foil().thickness());
    let whole = calculate::calculate_layer(&mut proton(3.0), &double, &StandardStopping, &config, &options).unwrap();
    let split = calculate_layers(&mut proton(3.0), &(Layers::from(carbon_foil()) + carbon_foil()), &StandardStopping, &config, &options).unwrap();
    assert!(split.results.iter().all(|result| result.sigma_E < split.total.sigma_E));
    assert!(((split.total.sigma_E - whole.sigma_E)/whole.sigma_E).abs() < 1E-3, "{} vs {}", split.total.sigma_E, whole.sigma_E);

    //Reverse walks report the same spread for the same layer
    let mut projectile = proton(whole.Eout);
    let reverse = calculate::reverse_calculate_layer(&mut projectile, &double, &StandardStopping, &config, &options).unwrap();
    assert!(((reverse.sigma_E - whole.sigma_E)/whole.sigma_E).abs() < 1E-3);

    //Models without a straggling term report none
    let constant = |_: &Projectile, _: &Material, _: &Config| 10.;
    let result = calculate::calculate_layer(&mut proton(3.0), &carbon_foil(), &constant, &config, &options).unwrap();
    assert_eq!(result.sigma_E, 0.);
}

#[test]
fn test_reverse_walk_cost() {
    let calls = Cell::new(0_usize);
    let counting = |p: &Projectile, m: &Material, c: &Config| {
        calls.set(calls.get() + 1);
        StandardStopping.dedx(p, m, c)
    };
    let mut carbon = carbon_foil();
    carbon.set_thickness(2E-3);

    //The step set at the low-energy exit is kept for the rest of the layer
    let mut projectile = proton(0.01);
    let gain = reverse_integrate_energyloss(&mut projectile, &carbon, &counting, &Config::default(), &IntegrationOptions::default()).unwrap();
    assert!(gain > 0. && projectile.T > 0.01);
    assert!(calls.get() > 10_000 && calls.get() < 1_000_000, "calls: {}", calls.get());
}
