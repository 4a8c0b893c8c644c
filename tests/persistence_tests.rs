use glam::DVec2;
use springbox::{ActuatorKind, Handle, ImportError, Mass, Model, ScreenBounds, Spring};

fn sample_model() -> Model {
    let mut model = Model::new();
    model.environment_mut().gravity = DVec2::new(0.0, 9.81);
    model.environment_mut().drag = 0.25;
    model.environment_mut().add_boundary(DVec2::new(0.0, 2.0), DVec2::new(3.0, 2.5));
    model.environment_mut().screen = ScreenBounds {
        left: Some(0.0),
        top: Some(0.0),
        right: Some(8.0),
        bottom: Some(6.0),
    };

    let a = model.add_mass(Mass::new(DVec2::new(1.0, 1.0), 0.08, 0.16));
    model.mass_mut(a).unwrap().fixed = true;
    let b = model.add_mass(Mass::new(DVec2::new(2.0, 1.0), 0.05, 0.1));
    model.mass_mut(b).unwrap().collision_group = 2;
    model.mass_mut(b).unwrap().restitution = 0.4;
    model.add_spring(Spring::new(a, b, 1.0, 120.0, 3.0));

    model.attach_actuator(ActuatorKind::SpringMuscle, Handle::Spring(0), 0.1, 0.6, 1.0);
    model.attach_actuator(ActuatorKind::MassBalloon, Handle::Mass(b), 0.2, 0.5, 2.0);
    model
}

#[test]
fn round_trip_into_an_empty_model() {
    let source = sample_model();
    let json = source.export().expect("export is infallible for model state");

    let mut restored = Model::new();
    restored.import(&json).expect("own export must import");

    assert_eq!(restored.masses().len(), 2);
    assert_eq!(restored.springs().len(), 1);
    assert_eq!(restored.actuators().len(), 2);

    for (original, loaded) in source.masses().iter().zip(restored.masses()) {
        assert!((original.position - loaded.position).length() < 1e-12);
        assert!((original.previous - loaded.previous).length() < 1e-12);
        assert!((original.mass - loaded.mass).abs() < 1e-12);
        assert!((original.radius - loaded.radius).abs() < 1e-12);
        assert!((original.restitution - loaded.restitution).abs() < 1e-12);
        assert_eq!(original.collision_group, loaded.collision_group);
        assert_eq!(original.fixed, loaded.fixed);
    }

    let (original, loaded) = (&source.springs()[0], &restored.springs()[0]);
    assert_eq!((original.a, original.b), (loaded.a, loaded.b));
    assert!((original.rest_length - loaded.rest_length).abs() < 1e-12);
    assert!((original.stiffness - loaded.stiffness).abs() < 1e-12);
    assert!((original.damping - loaded.damping).abs() < 1e-12);

    for (original, loaded) in source.actuators().iter().zip(restored.actuators()) {
        assert_eq!(original.kind, loaded.kind);
        assert_eq!(original.acted, loaded.acted);
        assert!((original.phase - loaded.phase).abs() < 1e-12);
        assert!((original.sensitivity - loaded.sensitivity).abs() < 1e-12);
        assert!((original.multiplier - loaded.multiplier).abs() < 1e-12);
        assert!((original.default_value - loaded.default_value).abs() < 1e-12);
    }
}

#[test]
fn import_is_additive_with_offset_indices() {
    let json = sample_model().export().expect("export");

    let mut target = Model::new();
    target.add_mass(Mass::new(DVec2::ZERO, 0.05, 0.1));
    target.add_mass(Mass::new(DVec2::new(0.5, 0.0), 0.05, 0.1));
    target.add_spring(Spring::new(0, 1, 0.5, 10.0, 1.0));

    target.import(&json).expect("valid document");

    assert_eq!(target.masses().len(), 4);
    assert_eq!(target.springs().len(), 2);
    // The imported spring's endpoints shifted past the two existing masses.
    assert_eq!((target.springs()[1].a, target.springs()[1].b), (2, 3));
    // Spring actuator offsets by the spring count, mass actuator by masses.
    assert_eq!(target.actuators()[0].acted, 1);
    assert_eq!(target.actuators()[1].acted, 3);

    // A second import appends again.
    target.import(&json).expect("valid document");
    assert_eq!(target.masses().len(), 6);
    assert_eq!((target.springs()[2].a, target.springs()[2].b), (4, 5));
}

#[test]
fn import_rejects_out_of_range_spring_endpoint() {
    let mut doc: serde_json::Value =
        serde_json::from_str(&sample_model().export().expect("export")).expect("json");
    doc["springs"][0]["b"] = serde_json::json!(7);

    let mut model = Model::new();
    let err = model.import(&doc.to_string()).expect_err("must reject");
    assert!(matches!(
        err,
        ImportError::SpringEndpoint { spring: 0, index: 7, .. }
    ));
    // Atomic: nothing was appended.
    assert!(model.masses().is_empty());
    assert!(model.springs().is_empty());
    assert!(model.actuators().is_empty());
}

#[test]
fn import_rejects_out_of_range_actuator_target() {
    let mut doc: serde_json::Value =
        serde_json::from_str(&sample_model().export().expect("export")).expect("json");
    doc["actuators"][1]["acted"] = serde_json::json!(11);

    let mut model = Model::new();
    let err = model.import(&doc.to_string()).expect_err("must reject");
    assert!(matches!(err, ImportError::ActuatorTarget { actuator: 1, index: 11, .. }));
    assert!(model.masses().is_empty());
}

#[test]
fn import_rejects_non_positive_parameters() {
    let export = sample_model().export().expect("export");

    let mut doc: serde_json::Value = serde_json::from_str(&export).expect("json");
    doc["masses"][0]["mass"] = serde_json::json!(0.0);
    let mut model = Model::new();
    assert!(matches!(
        model.import(&doc.to_string()).expect_err("must reject"),
        ImportError::InvalidMass { mass: 0, .. }
    ));

    let mut doc: serde_json::Value = serde_json::from_str(&export).expect("json");
    doc["springs"][0]["rest_length"] = serde_json::json!(-1.0);
    assert!(matches!(
        model.import(&doc.to_string()).expect_err("must reject"),
        ImportError::InvalidRestLength { spring: 0, .. }
    ));

    assert!(model.masses().is_empty());
}

#[test]
fn import_rejects_malformed_json() {
    let mut model = Model::new();
    let err = model.import("{not json").expect_err("must reject");
    assert!(matches!(err, ImportError::Json(_)));
}

#[test]
fn exclusion_state_is_not_persisted() {
    let mut source = sample_model();
    source.set_highlight(Some(Handle::Mass(1)));
    source.select();
    assert!(source.masses()[1].excluded);

    let json = source.export().expect("export");
    let mut restored = Model::new();
    restored.import(&json).expect("valid document");
    assert!(!restored.masses()[1].excluded);
}

#[test]
fn imported_entities_simulate() {
    let json = sample_model().export().expect("export");
    let mut model = Model::new();
    model.environment_mut().gravity = DVec2::new(0.0, 9.81);
    model.import(&json).expect("valid document");

    for _ in 0..30 {
        model.update();
    }
    // The fixed anchor held still, the bob swung under gravity.
    assert_eq!(model.masses()[0].position, DVec2::new(1.0, 1.0));
    assert!(model.masses()[1].position != DVec2::new(2.0, 1.0));
}
