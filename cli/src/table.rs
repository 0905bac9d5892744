// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write;

use colored::{Color, Colorize};

/// Renders rows as aligned columns with a bold header line.
pub struct Table<'a, T, C: Column<T>> {
    pub columns: Vec<C>,
    pub separator: &'static str,
    pub data: &'a [T],
}

impl<'a, T, C: Column<T>> Table<'a, T, C> {
    pub fn new(columns: Vec<C>, data: &'a [T]) -> Self {
        Self {
            columns,
            separator: "  ",
            data,
        }
    }

    pub fn render(&self) -> String {
        let header: Vec<String> = self.columns.iter().map(|c| c.header().to_string()).collect();
        let rows: Vec<Vec<String>> = self
            .data
            .iter()
            .map(|row| self.columns.iter().map(|col| col.format(row)).collect())
            .collect();
        let widths = column_widths(&header, &rows);

        let mut out = String::new();
        let last = self.columns.len().saturating_sub(1);
        for (i, cell) in header.iter().enumerate() {
            let cell = pad(cell, widths.get(i).copied(), i == last);
            let _ = write!(out, "{}", cell.bold());
            out.push_str(if i == last { "\n" } else { self.separator });
        }

        for (cells, row) in rows.iter().zip(self.data) {
            for (i, (col, cell)) in self.columns.iter().zip(cells).enumerate() {
                let cell = pad(cell, widths.get(i).copied(), i == last);
                match col.color(row) {
                    Some(color) => {
                        let _ = write!(out, "{}", cell.color(color));
                    }
                    None => out.push_str(&cell),
                }
                out.push_str(if i == last { "\n" } else { self.separator });
            }
        }
        out
    }
}

pub trait Column<T> {
    fn header(&self) -> &'static str;
    fn format(&self, data: &T) -> String;
    fn color(&self, data: &T) -> Option<Color>;
}

/// The last column is left unpadded so lines carry no trailing spaces.
fn pad(cell: &str, width: Option<usize>, last: bool) -> String {
    match width {
        Some(width) if !last => format!("{cell:<width$}"),
        _ => cell.to_string(),
    }
}

fn column_widths(header: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}
