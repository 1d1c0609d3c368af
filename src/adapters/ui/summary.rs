//! Colored console summary of a report.
//! Deltas print green when positive and red when negative.

use crate::domain::{BenAgg, JocReport};
use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use std::io::{Stdout, Write, stdout};

const HEADING: Color = Color::Cyan;

fn delta_color(delta: f64) -> Color {
    if delta > 0.0 {
        Color::Green
    } else if delta < 0.0 {
        Color::Red
    } else {
        Color::Grey
    }
}

/// One table row: id, first, last, delta and delta cohort size.
fn row(id: &str, first: &BenAgg, last: &BenAgg, delta: &BenAgg) -> (String, Color) {
    (
        format!(
            "  {:<12} {:>8.2} {:>8.2} {:>+8.2}  (n={})\r\n",
            id,
            first.value,
            last.value,
            delta.value,
            delta.beneficiary_ids.len()
        ),
        delta_color(delta.value),
    )
}

fn heading(out: &mut Stdout, text: &str) {
    let _ = out.execute(SetForegroundColor(HEADING));
    let _ = out.execute(Print(format!("{}\r\n", text)));
    let _ = out.execute(ResetColor);
}

/// Print beneficiaries, aggregates, exclusions and warnings to stdout.
pub fn print_summary(report: &JocReport) {
    let mut out = stdout();

    heading(
        &mut out,
        &format!("Beneficiaries ({})", report.beneficiary_ids.len()),
    );
    let _ = out.execute(Print(format!("  {}\r\n", report.beneficiary_ids.join(", "))));

    let mut rows = Vec::new();
    let q = &report.question_aggregates;
    for ((f, l), d) in q.first.iter().zip(&q.last).zip(&q.delta) {
        rows.push(row(&f.question_id, &f.agg, &l.agg, &d.agg));
    }
    heading(&mut out, "Questions        first     last    delta");
    for (line, color) in rows.drain(..) {
        let _ = out.execute(SetForegroundColor(color));
        let _ = out.execute(Print(line));
        let _ = out.execute(ResetColor);
    }

    let c = &report.category_aggregates;
    for ((f, l), d) in c.first.iter().zip(&c.last).zip(&c.delta) {
        rows.push(row(&f.category_id, &f.agg, &l.agg, &d.agg));
    }
    heading(&mut out, "Categories       first     last    delta");
    for (line, color) in rows {
        let _ = out.execute(SetForegroundColor(color));
        let _ = out.execute(Print(line));
        let _ = out.execute(ResetColor);
    }

    let excluded = &report.excluded;
    if !excluded.question_ids.is_empty() || !excluded.category_ids.is_empty() {
        heading(&mut out, "Excluded");
        let _ = out.execute(Print(format!(
            "  questions: {}\r\n  categories: {}\r\n",
            excluded.question_ids.join(", "),
            excluded.category_ids.join(", ")
        )));
    }

    if !report.warnings.is_empty() {
        heading(&mut out, "Warnings");
        let _ = out.execute(SetForegroundColor(Color::Yellow));
        for w in &report.warnings {
            let _ = out.execute(Print(format!("  - {}\r\n", w)));
        }
        let _ = out.execute(ResetColor);
    }
    let _ = out.flush();
}
