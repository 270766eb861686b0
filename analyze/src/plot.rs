use abpp::{ResultTable, VolcanoPoint};
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

/// Number of most significant proteins labelled with their gene symbol
const LABELLED: usize = 10;

/// Symmetric x range and y ceiling with a little headroom, never smaller
/// than one unit in either direction
fn bounds(points: &[VolcanoPoint]) -> (f64, f64) {
    let x = points.iter().map(|p| p.x.abs()).fold(0.0, f64::max);
    let y = points.iter().map(|p| p.y).fold(0.0, f64::max);
    ((x * 1.1).max(1.0), (y * 1.1).max(1.0))
}

/// The `n` points with the smallest p-values, most significant first
fn most_significant<'a>(points: &[VolcanoPoint<'a>], n: usize) -> Vec<VolcanoPoint<'a>> {
    let mut v = points.to_vec();
    v.sort_by(|a, b| b.y.total_cmp(&a.y));
    v.truncate(n);
    v
}

/// Render a volcano plot of `table` as SVG. Proteins with at least one
/// imputed value are drawn in a second colour, and the most significant
/// ones are labelled
pub fn volcano<P: AsRef<Path>>(table: &ResultTable, label: &str, path: P) -> Result<()> {
    let points = table.volcano_points();
    let (x_lim, y_max) = bounds(&points);

    let root = SVGBackend::new(path.as_ref(), (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(label, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-x_lim..x_lim, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("log2 fold change")
        .y_desc("-log10(p-value)")
        .draw()?;

    chart
        .draw_series(
            points
                .iter()
                .filter(|p| !p.imputed)
                .map(|p| Circle::new((p.x, p.y), 3, BLUE.mix(0.6).filled())),
        )?
        .label("quantified")
        .legend(|(x, y)| Circle::new((x, y), 3, BLUE.filled()));

    chart
        .draw_series(
            points
                .iter()
                .filter(|p| p.imputed)
                .map(|p| Circle::new((p.x, p.y), 3, RED.mix(0.6).filled())),
        )?
        .label("imputed")
        .legend(|(x, y)| Circle::new((x, y), 3, RED.filled()));

    chart.draw_series(most_significant(&points, LABELLED).into_iter().map(|p| {
        Text::new(
            p.gene_symbol.to_string(),
            (p.x, p.y),
            ("sans-serif", 12).into_font().color(&BLACK),
        )
    }))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
