//! Descriptive box-plot rendering for an assembled dataset.
//!
//! The chart partitions one numeric column by the categories of another
//! column (optionally sub-grouped by a third) and emits a self-contained
//! HTML artifact. Nothing downstream consumes the chart; it is the run's
//! terminal output.

use std::collections::BTreeMap;
use std::path::Path;

use plotly::common::Title;
use plotly::layout::{Axis, BoxMode};
use plotly::{BoxPlot, Layout, Plot};
use tracing::{debug, instrument};

use reeltab_dataset::Dataset;
use reeltab_shared::{ReeltabError, Result, Value};

/// One box trace: a label and the numeric values it summarizes.
#[derive(Debug, Clone, PartialEq)]
struct Series {
    label: String,
    /// Per-value category labels, present only in grouped mode.
    x: Option<Vec<String>>,
    y: Vec<f64>,
}

/// Render a box-plot of `y_field` per `x_field` category.
///
/// With a `group_field`, each category is split into one colored box per
/// group value (plotly's grouped box mode). Rows whose x, y, or group cell
/// is the missing sentinel are skipped pairwise.
#[instrument(skip(dataset), fields(records = dataset.len()))]
pub fn render(
    dataset: &Dataset,
    x_field: &str,
    y_field: &str,
    group_field: Option<&str>,
) -> Result<Plot> {
    let series = series(dataset, x_field, y_field, group_field)?;
    let grouped = group_field.is_some();

    let mut plot = Plot::new();
    for s in series {
        match s.x {
            Some(xs) => plot.add_trace(BoxPlot::new_xy(xs, s.y).name(&s.label)),
            None => plot.add_trace(BoxPlot::new(s.y).name(&s.label)),
        }
    }

    let mut layout = Layout::new()
        .title(Title::with_text(format!("{y_field} by {x_field}")))
        .x_axis(Axis::new().title(Title::with_text(x_field)))
        .y_axis(Axis::new().title(Title::with_text(y_field)));

    if grouped {
        layout = layout.box_mode(BoxMode::Group);
    }

    plot.set_layout(layout);
    Ok(plot)
}

/// Write the plot as a self-contained HTML page.
pub fn write_html(plot: &Plot, path: &Path) -> Result<()> {
    let inline = plot.to_inline_html(Some("reeltab-chart"));
    let page = page_html(&inline);

    std::fs::write(path, page).map_err(|e| ReeltabError::io(path, e))?;
    debug!(path = %path.display(), "chart written");
    Ok(())
}

/// Partition y values into box traces.
fn series(
    dataset: &Dataset,
    x_field: &str,
    y_field: &str,
    group_field: Option<&str>,
) -> Result<Vec<Series>> {
    let missing_field = |name: &str| {
        ReeltabError::validation(format!("chart field '{name}' is not in the dataset"))
    };

    dataset.field(x_field).ok_or_else(|| missing_field(x_field))?;
    dataset.field(y_field).ok_or_else(|| missing_field(y_field))?;
    if let Some(g) = group_field {
        dataset.field(g).ok_or_else(|| missing_field(g))?;
    }

    // Group label -> (category labels, y values). Without a group field the
    // category label itself is the grouping key.
    let mut grouped: BTreeMap<String, (Vec<String>, Vec<f64>)> = BTreeMap::new();

    for record in dataset.records() {
        let x = match record.get(x_field) {
            Some(Value::Missing) | None => continue,
            Some(v) => v.to_string(),
        };

        let y = match record.get(y_field) {
            Some(Value::Number(n)) => *n,
            Some(Value::Missing) => continue,
            Some(Value::Text(_)) => {
                return Err(ReeltabError::validation(format!(
                    "chart y field '{y_field}' holds text at record {}",
                    record.index()
                )));
            }
            None => continue,
        };

        let key = match group_field {
            Some(g) => match record.get(g) {
                Some(Value::Missing) | None => continue,
                Some(v) => v.to_string(),
            },
            None => x.clone(),
        };

        let entry = grouped.entry(key).or_default();
        entry.0.push(x);
        entry.1.push(y);
    }

    let with_categories = group_field.is_some();
    Ok(grouped
        .into_iter()
        .map(|(label, (xs, ys))| Series {
            label,
            x: with_categories.then_some(xs),
            y: ys,
        })
        .collect())
}

/// Wrap inline plot markup in a minimal HTML document.
fn page_html(inline_plot: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <script src=\"https://cdn.plot.ly/plotly-latest.min.js\"></script>\n\
         </head>\n<body>\n{inline_plot}\n</body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reeltab_dataset::Dataset;

    fn sample() -> Dataset {
        Dataset::assemble(vec![
            (
                "year".into(),
                vec![
                    Value::Number(2015.0),
                    Value::Number(2016.0),
                    Value::Number(2016.0),
                    Value::Number(2015.0),
                ],
            ),
            (
                "rating".into(),
                vec![
                    Value::Number(8.1),
                    Value::Number(7.4),
                    Value::Missing,
                    Value::Number(6.8),
                ],
            ),
            (
                "genre".into(),
                vec![
                    Value::Text("Drama".into()),
                    Value::Text("Drama".into()),
                    Value::Text("Horror".into()),
                    Value::Text("Horror".into()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn series_partitions_by_category() {
        let ds = sample();
        let series = series(&ds, "year", "rating", None).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "2015");
        assert_eq!(series[0].y, vec![8.1, 6.8]);
        // The Missing rating row is skipped, leaving one 2016 value.
        assert_eq!(series[1].label, "2016");
        assert_eq!(series[1].y, vec![7.4]);
        assert!(series[0].x.is_none());
    }

    #[test]
    fn series_with_group_field_carries_categories() {
        let ds = sample();
        let series = series(&ds, "year", "rating", Some("genre")).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Drama");
        assert_eq!(series[0].x.as_deref(), Some(&["2015".to_string(), "2016".to_string()][..]));
        assert_eq!(series[0].y, vec![8.1, 7.4]);
        assert_eq!(series[1].label, "Horror");
        assert_eq!(series[1].y, vec![6.8]);
    }

    #[test]
    fn unknown_field_is_a_validation_error() {
        let ds = sample();
        let err = series(&ds, "decade", "rating", None).unwrap_err();
        assert!(matches!(err, ReeltabError::Validation { .. }));
        assert!(err.to_string().contains("decade"));
    }

    #[test]
    fn text_y_field_is_a_validation_error() {
        let ds = sample();
        let err = series(&ds, "year", "genre", None).unwrap_err();
        assert!(matches!(err, ReeltabError::Validation { .. }));
    }

    #[test]
    fn render_and_write_html_artifact() {
        let ds = sample();
        let plot = render(&ds, "year", "rating", None).unwrap();

        let dir = std::env::temp_dir().join(format!("reeltab-chart-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rating-by-year.html");

        write_html(&plot, &path).unwrap();
        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.contains("cdn.plot.ly"));
        assert!(page.contains("reeltab-chart"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
