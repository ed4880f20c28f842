use crate::domain::Expense;

/// Describes how a column should align its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// A single column in the rendered table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub header: String,
    pub min_width: usize,
    pub max_width: Option<usize>,
    pub alignment: Alignment,
}

impl TableColumn {
    fn new(header: &str, min_width: usize, max_width: Option<usize>, alignment: Alignment) -> Self {
        Self {
            header: header.to_string(),
            min_width,
            max_width,
            alignment,
        }
    }
}

/// Fixed-width text table.
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
    pub padding: usize,
}

impl Table {
    /// Column layout used by the expense report.
    pub fn for_expenses(expenses: &[Expense]) -> Self {
        let columns = vec![
            TableColumn::new("ID", 3, None, Alignment::Right),
            TableColumn::new("NAME", 13, Some(30), Alignment::Left),
            TableColumn::new("AMOUNT", 9, None, Alignment::Right),
            TableColumn::new("CATEGORY", 15, Some(30), Alignment::Left),
            TableColumn::new("DATE", 10, None, Alignment::Left),
        ];
        let rows = expenses
            .iter()
            .map(|expense| {
                vec![
                    expense.id.to_string(),
                    expense.name.clone(),
                    format!("{:.2}", expense.amount),
                    expense.category.clone(),
                    expense.date.clone(),
                ]
            })
            .collect();
        Self {
            columns,
            rows,
            padding: 0,
        }
    }

    /// Content width of each column from headers, rows and column limits.
    pub fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let mut width = column.header.chars().count().max(column.min_width);
                for row in &self.rows {
                    if let Some(cell) = row.get(idx) {
                        width = width.max(cell.chars().count());
                    }
                }
                if let Some(max_width) = column.max_width {
                    width = width.min(max_width);
                }
                width
            })
            .collect()
    }

    pub fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let text = row.get(idx).map(String::as_str).unwrap_or("");
                render_cell(text, widths[idx], column.alignment, self.padding)
            })
            .collect();
        cells.join(" ").trim_end().to_string()
    }

    /// Header, rule, then one line per row.
    pub fn render(&self) -> String {
        let widths = self.compute_widths();
        let header: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut lines = vec![
            self.render_row(&header, &widths),
            horizontal_rule(&widths, self.padding),
        ];
        lines.extend(self.rows.iter().map(|row| self.render_row(row, &widths)));
        lines.join("\n")
    }
}

fn truncate_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut fitted: String = text.chars().take(width - 1).collect();
    fitted.push('…');
    fitted
}

pub fn render_cell(text: &str, width: usize, alignment: Alignment, padding: usize) -> String {
    let fitted = truncate_text(text, width);
    let remaining = width.saturating_sub(fitted.chars().count());
    let (left, right) = match alignment {
        Alignment::Left => (0, remaining),
        Alignment::Right => (remaining, 0),
    };
    format!(
        "{pad}{}{fitted}{}{pad}",
        " ".repeat(left),
        " ".repeat(right),
        pad = " ".repeat(padding)
    )
}

pub fn horizontal_rule(widths: &[usize], padding: usize) -> String {
    let total: usize =
        widths.iter().map(|w| w + padding * 2).sum::<usize>() + widths.len().saturating_sub(1);
    "-".repeat(total)
}
