use anyhow::{Error, Result};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::core::ReportRow;

pub const TABLE_HEADERS: [&str; 6] = [
    "Organization",
    "Space",
    "Application",
    "Buildpacks",
    "Total Memory",
    "Messages",
];

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "caused by:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "next:");
    let _ = writeln!(
        stderr,
        "  - check `cf target` and re-run `cf login` if the token has expired"
    );
    let _ = writeln!(
        stderr,
        "  - see `report-buildpacks --help` for commands and options"
    );
}

/// The six table cells of a row, list fields joined with `", "`.
pub fn table_cells(row: &ReportRow) -> [String; 6] {
    let messages: Vec<String> = row.messages().iter().map(ToString::to_string).collect();
    [
        row.organization().to_string(),
        row.space().to_string(),
        row.application().to_string(),
        row.buildpacks().join(", "),
        row.total_memory().to_string(),
        messages.join(", "),
    ]
}

pub fn render_json(out: &mut dyn Write, rows: &[ReportRow]) -> Result<()> {
    serde_json::to_writer(&mut *out, rows)?;
    out.write_all(b"\n")?;
    Ok(())
}

pub fn render_table(out: &mut dyn Write, rows: &[ReportRow]) -> io::Result<()> {
    let cells: Vec<[String; 6]> = rows.iter().map(table_cells).collect();

    let mut widths = TABLE_HEADERS.map(UnicodeWidthStr::width);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let border = border_line(&widths);
    writeln!(out, "{border}")?;
    write_cells(out, &TABLE_HEADERS, &widths)?;
    writeln!(out, "{border}")?;
    for row in &cells {
        write_cells(out, row, &widths)?;
    }
    if !cells.is_empty() {
        writeln!(out, "{border}")?;
    }
    Ok(())
}

fn border_line(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(w + 2));
        s.push('+');
    }
    s
}

fn write_cells<S: AsRef<str>>(out: &mut dyn Write, cells: &[S], widths: &[usize]) -> io::Result<()> {
    let mut line = String::from("|");
    for (cell, w) in cells.iter().zip(widths) {
        line.push(' ');
        line.push_str(&pad_end_display(cell.as_ref(), *w));
        line.push_str(" |");
    }
    writeln!(out, "{line}")
}

fn pad_end_display(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}
