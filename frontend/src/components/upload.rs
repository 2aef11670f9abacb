//! File upload component.
//!
//! Accepts several CSV or Excel files at once, checks their size, sends
//! them in one request and reports each file's outcome.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, File, HtmlInputElement};

use crate::components::logs::add_log;
use crate::services::upload_files;
use crate::types::{FileSummary, LogEntry, LogLevel, UploadResult};
use crate::{ACCEPTED_EXTENSIONS, MAX_FILE_SIZE};

/// Split a selection into files small enough to send and size errors.
fn check_sizes(files: Vec<File>) -> (Vec<File>, Vec<String>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for file in files {
        if file.size() as usize > MAX_FILE_SIZE {
            rejected.push(format!(
                "{} is larger than {} MB",
                file.name(),
                MAX_FILE_SIZE / (1024 * 1024)
            ));
        } else {
            accepted.push(file);
        }
    }
    (accepted, rejected)
}

#[component]
pub fn UploadSection(
    session: ReadSignal<Option<String>>,
    set_files: WriteSignal<Vec<FileSummary>>,
    set_logs: WriteSignal<Vec<LogEntry>>,
) -> impl IntoView {
    let (is_uploading, set_is_uploading) = create_signal(false);
    let (error, set_error) = create_signal(None::<String>);

    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        let Some(list) = input.files() else { return };

        let selected: Vec<File> = (0..list.length()).filter_map(|i| list.get(i)).collect();
        // Allow picking the same files again
        input.set_value("");
        if selected.is_empty() {
            return;
        }

        let Some(session_id) = session.get_untracked() else {
            set_error.set(Some("No session yet, is the backend running?".to_string()));
            return;
        };

        let (accepted, rejected) = check_sizes(selected);
        for message in rejected {
            add_log(set_logs, LogLevel::Error, format!("❌ {}", message));
        }
        if accepted.is_empty() {
            return;
        }

        set_error.set(None);
        spawn_local(async move {
            set_is_uploading.set(true);
            add_log(set_logs, LogLevel::Info, format!("📤 Uploading {} file(s)...", accepted.len()));

            match upload_files(&session_id, &accepted).await {
                Ok(response) => {
                    for result in response.files {
                        match result {
                            UploadResult::Ok { file } => {
                                add_log(
                                    set_logs,
                                    LogLevel::Success,
                                    format!("✅ {} ({:.2} KB, {} rows)", file.name, file.size_kb, file.row_count),
                                );
                                set_files.update(|files| files.push(file));
                            }
                            UploadResult::Error { name, error } => {
                                add_log(set_logs, LogLevel::Error, format!("❌ {}: {}", name, error));
                            }
                        }
                    }
                }
                Err(e) => {
                    add_log(set_logs, LogLevel::Error, format!("❌ Upload failed: {}", e));
                    set_error.set(Some(e.to_string()));
                }
            }

            set_is_uploading.set(false);
        });
    };

    let trigger_file_input = move |_| {
        if let Some(input) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("fileInput"))
        {
            if let Some(html_input) = input.dyn_ref::<HtmlInputElement>() {
                html_input.click();
            }
        }
    };

    view! {
        <div class="upload-section" id="uploadZone" on:click=trigger_file_input>
            <div class="upload-icon">"📤"</div>
            <div class="upload-text">
                {move || if is_uploading.get() {
                    "⏳ Uploading and reading files..."
                } else {
                    "Upload your files (CSV or Excel)"
                }}
            </div>

            <Show when=move || !is_uploading.get() fallback=|| view! {}>
                <div class="upload-hint">"Click to select one or more files"</div>
            </Show>

            <Show when=move || error.get().is_some() fallback=|| view! {}>
                <div class="error-message">{move || error.get().unwrap_or_default()}</div>
            </Show>

            <input
                type="file"
                id="fileInput"
                accept=ACCEPTED_EXTENSIONS
                multiple=true
                style="display:none"
                on:click=|ev| ev.stop_propagation()
                on:change=on_file_change
            />
        </div>
    }
}
