//! Bar chart of one numeric column against row position.
//!
//! Bars are plain divs whose height is relative to the largest absolute
//! value; missing cells leave an empty slot.

use leptos::*;

use crate::types::{BarChart, Visualization};

#[component]
pub fn BarChartView(chart: BarChart) -> impl IntoView {
    let scale = chart.scale();
    let column = chart.column.clone();

    let bars = chart
        .bars
        .into_iter()
        .map(|bar| {
            let (class, height, title) = match bar.value {
                Some(v) => {
                    let pct = if scale > 0.0 { v.abs() / scale * 100.0 } else { 0.0 };
                    let class = if v < 0.0 { "chart-bar negative" } else { "chart-bar" };
                    (class, pct, format!("#{}: {}", bar.position, v))
                }
                None => ("chart-bar missing", 0.0, format!("#{}: missing", bar.position)),
            };

            view! {
                <div class=class style=format!("height: {:.1}%", height) title=title></div>
            }
        })
        .collect_view();

    view! {
        <div class="chart">
            <div class="chart-title">{column}</div>
            <div class="chart-bars">{bars}</div>
            <div class="chart-axis">"row position"</div>
        </div>
    }
}

/// Chart or the warning explaining why there is none.
#[component]
pub fn VisualizationView(visualization: Visualization) -> impl IntoView {
    match visualization {
        Visualization::Chart { chart } => view! { <BarChartView chart=chart/> }.into_view(),
        Visualization::Skipped { warning } => view! {
            <div class="warning-message">"⚠️ " {warning}</div>
        }
        .into_view(),
    }
}
