//! Result printing: one line per row, or pretty JSON with --json

use anyhow::Result;
use bookstore_mongodb::{
    AuthorBookCount, DecadeBucket, ExplainSummary, GenreAveragePrice, ScriptReport,
};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy)]
pub struct Printer {
    json: bool,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Rows that know how to display themselves
    pub fn rows<T: Serialize + Display>(&self, rows: &[T]) -> Result<()> {
        if self.json {
            return self.json(rows);
        }
        if rows.is_empty() {
            println!("(no results)");
        }
        for row in rows {
            println!("{}", row);
        }
        Ok(())
    }

    /// A single value with an explicit text rendering
    pub fn value<T: Serialize + ?Sized>(&self, value: &T, text: impl Display) -> Result<()> {
        if self.json {
            return self.json(value);
        }
        println!("{}", text);
        Ok(())
    }

    pub fn genre_averages(&self, rows: &[GenreAveragePrice]) -> Result<()> {
        if self.json {
            return self.json(rows);
        }
        for row in rows {
            println!("{}", format_genre_average(row));
        }
        Ok(())
    }

    pub fn top_author(&self, top: Option<&AuthorBookCount>) -> Result<()> {
        let text = match top {
            Some(row) => format!(
                "{}: {} book(s)",
                row.author.as_deref().unwrap_or("(unknown author)"),
                row.book_count
            ),
            None => "(no books)".to_string(),
        };
        self.value(&top, text)
    }

    pub fn decades(&self, rows: &[DecadeBucket]) -> Result<()> {
        if self.json {
            return self.json(rows);
        }
        for row in rows {
            println!("{:>6}  {}", row.label.to_string(), row.count);
        }
        Ok(())
    }

    pub fn explain(&self, summary: &ExplainSummary, verbose: bool) -> Result<()> {
        if self.json {
            return if verbose {
                self.json(&summary.raw_json())
            } else {
                self.json(summary)
            };
        }
        println!("{}", format_explain(summary));
        if verbose {
            println!("{}", serde_json::to_string_pretty(&summary.raw_json())?);
        }
        Ok(())
    }

    pub fn report(&self, report: &ScriptReport) -> Result<()> {
        if self.json {
            return self.json(report);
        }
        for step in &report.steps {
            println!("[task {}] {:<32} {}", step.task, step.name, step.count);
        }
        Ok(())
    }
}

fn format_genre_average(row: &GenreAveragePrice) -> String {
    let genre = row.genre.as_deref().unwrap_or("(no genre)");
    match row.average_price {
        Some(price) => format!("{}: ${:.2}", genre, price),
        None => format!("{}: n/a", genre),
    }
}

fn format_explain(summary: &ExplainSummary) -> String {
    let plan = if summary.winning_stages.is_empty() {
        "(unknown plan)".to_string()
    } else {
        summary.winning_stages.join(" <- ")
    };
    let show = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string());
    format!(
        "plan: {}\nindex: {}\nreturned: {}  keys examined: {}  docs examined: {}  time: {} ms",
        plan,
        summary.index_name.as_deref().unwrap_or("(none)"),
        show(summary.n_returned),
        show(summary.total_keys_examined),
        show(summary.total_docs_examined),
        show(summary.execution_time_millis),
    )
}
