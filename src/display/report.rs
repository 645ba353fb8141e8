use crate::effects::Decision;
use crate::engine::AnalysisSnapshot;
use crate::inference::Significance;
use std::fmt::Write;

const RULE: &str = "--------------------------------------------------";

/// Renders a snapshot as plain-text tables.
pub fn format_report(snapshot: &AnalysisSnapshot) -> String {
    let mut out = String::new();
    let p = &snapshot.provenance;

    let _ = writeln!(out, "PATH ANALYSIS REPORT");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "model rev {} | data {:016x} | {} respondents | {} resamples (seed {}, {} skipped)",
        p.model_revision,
        p.data_fingerprint,
        snapshot.respondents,
        snapshot.bootstrap.iterations,
        snapshot.bootstrap.seed,
        snapshot.bootstrap.skipped_resamples,
    );

    write_validity(&mut out, snapshot);
    write_equations(&mut out, snapshot);
    write_hypotheses(&mut out, snapshot);
    write_effects(&mut out, snapshot);
    write_mediation(&mut out, snapshot);
    out
}

fn write_validity(out: &mut String, snapshot: &AnalysisSnapshot) {
    let v = &snapshot.validity;
    let _ = writeln!(out, "\n[Indicator validity] threshold {:.3}", v.threshold);
    for row in &v.indicators {
        let mark = if row.valid { "ok" } else { "INVALID" };
        let _ = writeln!(out, "  {:<12} {:<12} r = {:>7.3}  {}", row.construct, row.indicator, row.correlation, mark);
    }
    if !snapshot.dropped_indicators.is_empty() {
        let _ = writeln!(out, "  dropped: {}", snapshot.dropped_indicators.join(", "));
    }
    for r in &v.reliability {
        let _ = writeln!(
            out,
            "  {:<12} alpha {}  CR {}  AVE {}",
            r.construct,
            opt(r.cronbach_alpha),
            opt(r.composite_reliability),
            opt(r.average_variance_extracted),
        );
    }
}

fn write_equations(out: &mut String, snapshot: &AnalysisSnapshot) {
    let _ = writeln!(out, "\n[Structural equations]");
    for eq in &snapshot.estimates.equations {
        let _ = writeln!(
            out,
            "  {} (R2 = {:.3}, adj {:.3}, df {}): intercept {:.4} (se {:.4})",
            eq.construct, eq.r_squared, eq.adj_r_squared, eq.df, eq.intercept, eq.intercept_se
        );
        for c in &eq.coefficients {
            let _ = writeln!(
                out,
                "    <- {:<12} b = {:>8.4}  se {:.4}  t {:>7.3}  p {:.4}",
                c.source, c.estimate, c.std_error, c.t_value, c.p_value
            );
        }
    }
}

fn write_hypotheses(out: &mut String, snapshot: &AnalysisSnapshot) {
    let _ = writeln!(out, "\n[Hypotheses] alpha {:.3}", snapshot.provenance.config.significance_level);
    for h in &snapshot.hypotheses {
        let decision = match h.decision {
            Decision::Supported => "supported",
            Decision::NotSupported => "not supported",
        };
        let _ = writeln!(
            out,
            "  {:<4} {} -> {}: b = {:.4}  t {:.3}  p {:.4}  {:?}, {}",
            h.label, h.source, h.target, h.estimate, h.t_value, h.p_value, h.direction, decision
        );
    }
}

fn write_effects(out: &mut String, snapshot: &AnalysisSnapshot) {
    let _ = writeln!(out, "\n[Effects]");
    for e in &snapshot.effects {
        let direct = e.direct.map_or_else(|| "-".to_string(), |d| format!("{d:.4}"));
        let _ = writeln!(
            out,
            "  {} -> {}: direct {}  indirect {:.4}{}  total {:.4}{}",
            e.source,
            e.target,
            direct,
            e.indirect,
            sig(e.indirect_significance.as_ref()),
            e.total,
            sig(e.total_significance.as_ref()),
        );
        for r in &e.routes {
            let _ = writeln!(out, "      via {} = {:.4}", r.constructs.join(" -> "), r.product);
        }
    }
}

fn write_mediation(out: &mut String, snapshot: &AnalysisSnapshot) {
    if snapshot.mediation.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n[Mediation]");
    for m in &snapshot.mediation {
        let _ = writeln!(out, "  {} -> {}: {} (direct p {:.4})", m.source, m.target, m.verdict, m.direct_p_value);
    }
}

fn opt(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.3}"))
}

fn sig(s: Option<&Significance>) -> String {
    s.map_or_else(String::new, |s| format!(" (p {:.4})", s.p_value))
}
