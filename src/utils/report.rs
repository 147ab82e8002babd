// src/utils/report.rs

use crate::physics::operations::RefinementReport;
use crate::state::{ReflectionReport, Session};

/// Geometry header plus a table of the strongest predicted spots.
pub fn prediction_summary(session: &Session, limit: usize) -> String {
    let crystal = session.crystal();
    let detector = session.detector();
    let [a, b, c, alpha, beta, gamma] = crystal.unit_cell().params();
    let beam = detector.beam_centre();

    let mut items = session.render_items();
    items.sort_by(|x, y| y.weight.total_cmp(&x.weight));

    let mut out = String::new();
    out.push_str(&format!(
        "Cell: {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} ({})\n",
        a,
        b,
        c,
        alpha,
        beta,
        gamma,
        crystal.bravais_lattice().symbol()
    ));
    out.push_str(&format!(
        "Resolution: {} Å   Wavelength: {} Å   rlp: {} Å⁻¹\n",
        crystal.resolution(),
        detector.wavelength(),
        crystal.rlp_size()
    ));
    out.push_str(&format!(
        "Beam centre: {:.1} {:.1}   Distance: {}\n",
        beam[0],
        beam[1],
        detector.distance()
    ));
    out.push_str(&format!(
        "Reflections: {}   On detector: {}\n",
        crystal.miller_count(),
        items.len()
    ));
    out.push_str("--------------------------------------------------\n");
    out.push_str(&format!(
        "{:>4} {:>4} {:>4} {:>10} {:>10} {:>8}\n",
        "h", "k", "l", "X", "Y", "Weight"
    ));
    out.push_str("--------------------------------------------------\n");

    for item in items.iter().take(limit) {
        let (h, k, l) = item.hkl;
        out.push_str(&format!(
            "{:>4} {:>4} {:>4} {:>10.1} {:>10.1} {:>8.3}{}\n",
            h,
            k,
            l,
            item.pixel[0],
            item.pixel[1],
            item.weight,
            if item.watched { " *" } else { "" }
        ));
    }

    if items.len() > limit {
        out.push_str(&format!("... and {} more spots.\n", items.len() - limit));
    }

    out
}

pub fn reflection_report(report: &ReflectionReport) -> String {
    let (h, k, l) = report.hkl;
    format!(
        "({} {} {})  d = {:.3} Å  weight {:.3}  closeness {:+.3}  at ({:.1}, {:.1}){}",
        h,
        k,
        l,
        report.d_spacing,
        report.weight,
        report.closeness,
        report.pixel[0],
        report.pixel[1],
        if report.watched { "  [watched]" } else { "" }
    )
}

pub fn refinement_report(report: &RefinementReport) -> String {
    let o = &report.outcome;
    format!(
        "Refined on {} spots: score {:.6} -> {:.6}, {} cycles{}, tilt {:+.4}° / {:+.4}°",
        report.watched,
        o.start_score,
        o.score,
        o.cycles,
        if o.converged { " (converged)" } else { "" },
        report.horizontal.to_degrees(),
        report.vertical.to_degrees()
    )
}
