//! Data Sweeper - Frontend Rust/Leptos Application
//!
//! A WebAssembly frontend for cleaning, charting and converting CSV and
//! Excel files through the Data Sweeper backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MainContent                                                 │
//! │  ├── Hero (title, description)                              │
//! │  ├── UploadSection (multi-file)                             │
//! │  ├── FilePanel per uploaded file                            │
//! │  │   preview → clean → chart → columns → convert            │
//! │  └── LogsPanel (SSE)                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Backend payloads, logs and errors
//! - [`components`] - UI components (Upload, FilePanel, Chart, etc.)
//! - [`services`] - Backend communication

use leptos::*;
use leptos_router::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // Files
    FileSummary, ColumnSummary, ColumnType, Stage,
    // Operations
    UploadResponse, UploadResult, DedupResponse, FillResponse, FillReport, Visualization, BarChart,
    ExportFormat, Download,
    // Logs
    LogEntry, LogLevel,
    // Errors
    AppError, AppResult,
};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application
// =============================================================================

#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn MainContent() -> impl IntoView {
    let (session, set_session) = create_signal(None::<String>);
    let (files, set_files) = create_signal(Vec::<FileSummary>::new());
    let (logs, set_logs) = create_signal(Vec::<LogEntry>::new());

    // Initialize SSE connection ONCE at app startup
    init_sse_logs(set_logs);

    spawn_local(async move {
        match create_session().await {
            Ok(id) => {
                log::info!("🧹 Session {}", id);
                set_session.set(Some(id));
            }
            Err(e) => add_log(set_logs, LogLevel::Error, format!("❌ Could not start a session: {}", e)),
        }
    });

    view! {
        <div class="container">
            <Hero/>

            <UploadSection session=session set_files=set_files set_logs=set_logs/>

            <For
                each=move || files.get()
                key=|file| file.id.clone()
                children=move |file| {
                    let session_id = session.get_untracked().unwrap_or_default();
                    view! {
                        <FilePanel session=session_id file=file set_files=set_files set_logs=set_logs/>
                    }
                }
            />

            <Show when=move || !files.get().is_empty() fallback=|| view! {}>
                <div class="success-message">"🎉 All files processed!"</div>
            </Show>

            <Show when=move || !logs.get().is_empty() fallback=|| view! {}>
                <LogsPanel logs=logs set_logs=set_logs/>
            </Show>
        </div>

        <Footer/>
    }
}
