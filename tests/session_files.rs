use mandexing::config::Config;
use mandexing::io::script;
use mandexing::{MandexError, Session};
use std::fs;

#[test]
fn matrix_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix.dat");

    let mut session = Session::from_config(&Config::default()).unwrap();
    session.bring_axis_on_screen(&[1.0, 1.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
    session.save_matrix(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("rotation "));
    assert_eq!(text.split_whitespace().count(), 10);

    let mut other = Session::from_config(&Config::default()).unwrap();
    other.load_matrix(&path).unwrap();
    let diff = other.crystal().orientation().matrix() - session.crystal().orientation().matrix();
    assert!(diff.abs().max() < 1e-12);

    let ours = session.render_items();
    let theirs = other.render_items();
    assert_eq!(ours.len(), theirs.len());
    for (a, b) in ours.iter().zip(&theirs) {
        assert_eq!(a.hkl, b.hkl);
        assert!((a.pixel[0] - b.pixel[0]).abs() < 1e-6 && (a.pixel[1] - b.pixel[1]).abs() < 1e-6);
    }
}

#[test]
fn malformed_matrix_leaves_orientation_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.dat");
    fs::write(&path, "rotation 1 0 0 0 1 0").unwrap();

    let mut session = Session::from_config(&Config::default()).unwrap();
    let before = session.crystal().orientation().clone();
    assert!(matches!(session.load_matrix(&path), Err(MandexError::MatrixFile(_))));
    assert_eq!(session.crystal().orientation(), &before);
    assert!(session.drain_changes().is_empty());
}

#[test]
fn script_drives_a_full_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::from_config(&Config::default()).unwrap();

    // Watch the two strongest spots next to the beam, then refine
    let items = session.render_items();
    let spot = |hkl: (i32, i32, i32)| items.iter().find(|i| i.hkl == hkl).unwrap().pixel;
    let [x1, y1] = spot((2, 0, 0));
    let [x2, y2] = spot((0, 3, 0));

    let text = format!(
        "# bring c onto the detector, then put it back\n\
         degrees 90\n\
         rotate h\n\
         rotate h -\n\
         watch {x1} {y1}\n\
         watch {x2} {y2}\n\
         identify {x1} {y1}\n\
         refine\n\
         save refined.dat\n"
    );
    let path = dir.path().join("session.txt");
    fs::write(&path, text).unwrap();

    let output = script::run_file(&mut session, &path).unwrap();
    assert_eq!(output.identified.len(), 1);
    assert_eq!(output.identified[0].hkl, (2, 0, 0));
    assert!(output.identified[0].watched);
    assert_eq!(output.refinements.len(), 1);
    assert_eq!(output.refinements[0].watched, 2);
    assert!(output.misses.is_empty());
    assert!(dir.path().join("refined.dat").exists());
}

#[test]
fn config_file_controls_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut cfg = Config::default();
    cfg.resolution = 4.0;
    cfg.beam_centre = [1024.0, 1000.0];
    cfg.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    let session = Session::from_config(&loaded).unwrap();
    assert_eq!(session.detector().beam_centre(), [1024.0, 1000.0]);
    assert!(session.crystal().millers().iter().all(|m| m.d_spacing() >= 4.0 - 1e-9));

    let mut bad = Config::default();
    bad.wavelength = 0.0;
    assert!(Session::from_config(&bad).is_err());
}
