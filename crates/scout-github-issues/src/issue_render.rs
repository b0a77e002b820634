use crate::issue_types::GithubIssue;

const TABLE_HEADERS: [&str; 5] = ["#", "title", "state", "labels", "url"];

/// Renders the `issues list` output: a summary line plus a GitHub-flavoured
/// markdown table with one row per issue.
pub fn render_issue_table(repo_slug: &str, issues: &[GithubIssue]) -> String {
    let rows = issues
        .iter()
        .map(|issue| {
            [
                issue.number.to_string(),
                escape_cell(&issue.title),
                issue.state.clone(),
                escape_cell(&issue.label_names().collect::<Vec<_>>().join(",")),
                issue.html_url.clone(),
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = TABLE_HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![format!("{repo_slug} • {} issues", rows.len()), String::new()];
    lines.push(render_row(TABLE_HEADERS.iter().copied(), &widths));
    lines.push(format!(
        "|{}|",
        widths
            .iter()
            .map(|width| "-".repeat(width + 2))
            .collect::<Vec<_>>()
            .join("|")
    ));
    for row in &rows {
        lines.push(render_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let rendered = cells
        .zip(widths.iter())
        .map(|(cell, width)| {
            let padding = width.saturating_sub(cell.chars().count());
            format!(" {cell}{} ", " ".repeat(padding))
        })
        .collect::<Vec<_>>();
    format!("|{}|", rendered.join("|"))
}

fn escape_cell(raw: &str) -> String {
    raw.replace('|', "\\|").replace(['\n', '\r'], " ")
}
