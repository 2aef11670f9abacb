//! One panel per uploaded file.
//!
//! Shows the file info and preview, then the optional steps in order:
//! cleaning, visualization, column selection and conversion. Every action
//! goes through the backend session and the panel re-renders from the
//! summary the backend returns.

use leptos::*;

use crate::components::chart::VisualizationView;
use crate::components::logs::add_log;
use crate::services::*;
use crate::types::*;

#[component]
fn PreviewTable(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> impl IntoView {
    let header = columns.into_iter().map(|name| view! { <th>{name}</th> }).collect_view();
    let body = rows
        .into_iter()
        .map(|row| {
            let cells = row.iter().map(|v| view! { <td>{cell_text(v)}</td> }).collect_view();
            view! { <tr>{cells}</tr> }
        })
        .collect_view();

    view! {
        <div class="table-wrapper">
            <table class="preview-table">
                <thead><tr>{header}</tr></thead>
                <tbody>{body}</tbody>
            </table>
        </div>
    }
}

#[component]
pub fn FilePanel(
    session: String,
    file: FileSummary,
    set_files: WriteSignal<Vec<FileSummary>>,
    set_logs: WriteSignal<Vec<LogEntry>>,
) -> impl IntoView {
    let session = store_value(session);
    let panel_id = file.id.clone();
    let summary = create_rw_signal(file);

    let (busy, set_busy) = create_signal(false);
    let (show_clean, set_show_clean) = create_signal(false);
    let (show_chart, set_show_chart) = create_signal(false);
    let (chart_column, set_chart_column) = create_signal(None::<String>);
    let (visualization, set_visualization) = create_signal(None::<Visualization>);
    let (format, set_format) = create_signal(ExportFormat::Csv);
    let (download, set_download) = create_signal(None::<Download>);

    // Keep the app-level list in step with this panel
    let publish = move |file: FileSummary| {
        set_files.update(|files| {
            if let Some(slot) = files.iter_mut().find(|f| f.id == file.id) {
                *slot = file.clone();
            }
        });
        summary.set(file);
    };

    // A converted file is stale once the table changes
    let clear_download = move || {
        if let Some(previous) = download.get_untracked() {
            revoke_download(&previous);
        }
        set_download.set(None);
    };

    let load_chart = move || {
        let id = summary.with_untracked(|f| f.id.clone());
        let column = chart_column.get_untracked();
        spawn_local(async move {
            match fetch_chart(&session.get_value(), &id, column.as_deref()).await {
                Ok(result) => {
                    if let Visualization::Chart { ref chart } = result {
                        summary.update(|f| f.record(Stage::Visualized));
                        add_log(set_logs, LogLevel::Info, format!("📊 Chart of '{}'", chart.column));
                    }
                    set_visualization.set(Some(result));
                }
                Err(e) => add_log(set_logs, LogLevel::Error, format!("❌ {}", e)),
            }
        });
    };

    let after_change = move |file: FileSummary| {
        publish(file);
        clear_download();
        if show_chart.get_untracked() {
            load_chart();
        }
    };

    let on_dedup = move |_| {
        let (id, name) = summary.with_untracked(|f| (f.id.clone(), f.name.clone()));
        set_busy.set(true);
        spawn_local(async move {
            match remove_duplicates(&session.get_value(), &id).await {
                Ok(response) => {
                    add_log(
                        set_logs,
                        LogLevel::Success,
                        format!("🧽 {}: {} duplicate row(s) removed", name, response.removed),
                    );
                    after_change(response.file);
                }
                Err(e) => add_log(set_logs, LogLevel::Error, format!("❌ {}: {}", name, e)),
            }
            set_busy.set(false);
        });
    };

    let on_fill = move |_| {
        let (id, name) = summary.with_untracked(|f| (f.id.clone(), f.name.clone()));
        set_busy.set(true);
        spawn_local(async move {
            match fill_missing(&session.get_value(), &id).await {
                Ok(response) => {
                    add_log(
                        set_logs,
                        LogLevel::Success,
                        format!("🩹 {}: {} missing value(s) filled", name, response.report.total_filled()),
                    );
                    after_change(response.file);
                }
                Err(e) => add_log(set_logs, LogLevel::Error, format!("❌ {}: {}", name, e)),
            }
            set_busy.set(false);
        });
    };

    let on_reset = move |_| {
        let (id, name) = summary.with_untracked(|f| (f.id.clone(), f.name.clone()));
        set_busy.set(true);
        spawn_local(async move {
            match reset_file(&session.get_value(), &id).await {
                Ok(file) => {
                    add_log(set_logs, LogLevel::Info, format!("↩️ {} restored", name));
                    set_visualization.set(None);
                    after_change(file);
                }
                Err(e) => add_log(set_logs, LogLevel::Error, format!("❌ {}: {}", name, e)),
            }
            set_busy.set(false);
        });
    };

    let toggle_column = move |column: String, checked: bool| {
        let (id, mut selection) = summary.with_untracked(|f| (f.id.clone(), f.selected_columns.clone()));
        if checked {
            if !selection.contains(&column) {
                selection.push(column);
            }
        } else {
            selection.retain(|c| c != &column);
        }

        spawn_local(async move {
            match select_columns(&session.get_value(), &id, &selection).await {
                Ok(selected) => {
                    let mut file = summary.get_untracked();
                    file.selected_columns = selected;
                    file.record(Stage::Projected);
                    publish(file);
                    clear_download();
                }
                Err(e) => add_log(set_logs, LogLevel::Error, format!("❌ {}", e)),
            }
        });
    };

    let on_convert = move |_| {
        let file = summary.get_untracked();
        let target = format.get_untracked();
        set_busy.set(true);
        spawn_local(async move {
            match export_file(&session.get_value(), &file, target).await {
                Ok(converted) => {
                    add_log(
                        set_logs,
                        LogLevel::Success,
                        format!("💾 {} converted to {}", file.name, converted.file_name),
                    );
                    clear_download();
                    set_download.set(Some(converted));
                    summary.update(|f| f.record(Stage::Exported));
                }
                Err(e) => add_log(set_logs, LogLevel::Error, format!("❌ {}: {}", file.name, e)),
            }
            set_busy.set(false);
        });
    };

    let stages = move || {
        summary.with(|f| {
            f.stages
                .iter()
                .map(|stage| view! { <span class="stage-badge">{format!("{:?}", stage)}</span> })
                .collect_view()
        })
    };

    let preview = move || {
        summary.with(|f| {
            let columns = f
                .columns
                .iter()
                .map(|c| format!("{} ({})", c.name, c.kind.label()))
                .collect::<Vec<_>>();
            view! { <PreviewTable columns=columns rows=f.preview.clone()/> }
        })
    };

    let column_options = move || {
        summary.with(|f| {
            f.column_names()
                .into_iter()
                .map(|name| {
                    let checked = f.selected_columns.contains(&name);
                    let label = name.clone();
                    view! {
                        <label class="column-option">
                            <input
                                type="checkbox"
                                prop:checked=checked
                                on:change=move |ev| toggle_column(name.clone(), event_target_checked(&ev))
                            />
                            {label}
                        </label>
                    }
                })
                .collect_view()
        })
    };

    let selected_preview = move || {
        summary.with(|f| {
            let (columns, rows) = f.selected_preview();
            view! { <PreviewTable columns=columns rows=rows/> }
        })
    };

    let chart_options = move || {
        summary.with(|f| {
            f.numeric_columns
                .iter()
                .map(|name| {
                    let selected = chart_column.get().as_deref() == Some(name.as_str());
                    view! { <option value=name.clone() selected=selected>{name.clone()}</option> }
                })
                .collect_view()
        })
    };

    let format_radio = move |target: ExportFormat| {
        let group = format!("format-{}", panel_id);
        view! {
            <label class="format-option">
                <input
                    type="radio"
                    name=group
                    prop:checked=move || format.get() == target
                    on:change=move |_| set_format.set(target)
                />
                {target.label()}
            </label>
        }
    };

    view! {
        <div class="file-panel">
            <div class="file-header">
                <h3>"📄 " {move || summary.with(|f| f.name.clone())}</h3>
                <span class="file-meta">
                    {move || summary.with(|f| format!(
                        "{:.2} KB • {} rows • {}",
                        f.size_kb,
                        f.row_count,
                        f.encoding.clone().unwrap_or_else(|| f.format.clone())
                    ))}
                </span>
                <div class="stages">{stages}</div>
            </div>

            <h4>"🔍 Preview"</h4>
            {preview}

            <div class="step">
                <label>
                    <input
                        type="checkbox"
                        prop:checked=move || show_clean.get()
                        on:change=move |ev| set_show_clean.set(event_target_checked(&ev))
                    />
                    " Clean data"
                </label>
                <Show when=move || show_clean.get() fallback=|| view! {}>
                    <div class="step-actions">
                        <button on:click=on_dedup disabled=move || busy.get()>"Remove duplicates"</button>
                        <button on:click=on_fill disabled=move || busy.get()>"Fill missing values"</button>
                        <button class="secondary" on:click=on_reset disabled=move || busy.get()>"Reset"</button>
                    </div>
                </Show>
            </div>

            <div class="step">
                <label>
                    <input
                        type="checkbox"
                        prop:checked=move || show_chart.get()
                        on:change=move |ev| {
                            let checked = event_target_checked(&ev);
                            set_show_chart.set(checked);
                            if checked {
                                load_chart();
                            }
                        }
                    />
                    " Show visualization"
                </label>
                <Show when=move || show_chart.get() fallback=|| view! {}>
                    <Show
                        when=move || summary.with(|f| !f.numeric_columns.is_empty())
                        fallback=|| view! {}
                    >
                        <select on:change=move |ev| {
                            set_chart_column.set(Some(event_target_value(&ev)));
                            load_chart();
                        }>
                            {chart_options}
                        </select>
                    </Show>
                    {move || visualization.get().map(|v| view! { <VisualizationView visualization=v/> })}
                </Show>
            </div>

            <div class="step">
                <h4>"🎯 Select columns"</h4>
                <div class="column-options">{column_options}</div>
                {selected_preview}
            </div>

            <div class="step">
                <h4>"🔄 Conversion"</h4>
                <div class="format-options">
                    {format_radio(ExportFormat::Csv)}
                    {format_radio(ExportFormat::Excel)}
                </div>
                <button on:click=on_convert disabled=move || busy.get()>
                    {move || format!("Convert {}", summary.with(|f| f.name.clone()))}
                </button>
                {move || download.get().map(|d| view! {
                    <a class="download-link" href=d.url.clone() download=d.file_name.clone()>
                        "⬇️ Download " {d.file_name.clone()}
                    </a>
                })}
            </div>
        </div>
    }
}
